use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::storage::TableRow;

/// 活动，id = name-category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "activities.ts")]
pub struct Activity {
    pub id: String,
    pub name: String,
    pub category: String,
}

impl TableRow for Activity {
    const TABLE: &'static str = "activity";
}

impl Activity {
    pub fn make_id(name: &str, category: &str) -> String {
        format!("{name}-{category}")
    }
}

/// 列表展示用，带是否已配置评估标准
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "activities.ts")]
pub struct ActivitySummary {
    pub id: String,
    pub name: String,
    pub category: String,
    pub has_assessment: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "activities.ts")]
pub enum Visibility {
    Public,
    Private,
}

impl std::str::FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            _ => Err(format!("Invalid visibility: {s}")),
        }
    }
}

/// 评估标准，id = name-activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "activities.ts")]
pub struct Assessment {
    pub id: String,
    pub name: String,
    pub activity: String,
    pub visibility: Visibility,
    pub max: f64,
}

impl TableRow for Assessment {
    const TABLE: &'static str = "assessment";
}

impl Assessment {
    pub fn make_id(name: &str, activity: &str) -> String {
        format!("{name}-{activity}")
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

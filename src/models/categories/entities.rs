use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::storage::TableRow;

/// 分组方案，id = name-nrc
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "categories.ts")]
pub struct Category {
    pub id: String,
    pub name: String,
    /// 创建时是否随机分组
    pub random: bool,
    pub nrc: i64,
    /// 每组人数上限
    pub max: i64,
}

impl TableRow for Category {
    const TABLE: &'static str = "category";
}

impl Category {
    pub fn make_id(name: &str, nrc: i64) -> String {
        format!("{name}-{nrc}")
    }
}

/// 组成员关系（`group` 表），id = category-student-number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "categories.ts")]
pub struct GroupMembership {
    pub id: String,
    pub number: i64,
    pub category: String,
    pub student: String,
}

impl TableRow for GroupMembership {
    const TABLE: &'static str = "group";
}

impl GroupMembership {
    pub fn new(number: i64, category: &str, student: &str) -> Self {
        Self {
            id: format!("{category}-{student}-{number}"),
            number,
            category: category.to_string(),
            student: student.to_string(),
        }
    }
}

/// 由成员关系聚合出的组
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "categories.ts")]
pub struct Group {
    pub number: i64,
    pub members: Vec<String>,
}

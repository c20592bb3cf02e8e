use serde::Deserialize;
use ts_rs::TS;

use super::Visibility;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "activities.ts")]
pub struct CreateActivityRequest {
    pub name: String,
    /// 同时创建默认评估标准
    #[serde(default)]
    pub with_default_assessments: bool,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "activities.ts")]
pub struct CreateAssessmentRequest {
    pub name: String,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub max: Option<f64>,
}

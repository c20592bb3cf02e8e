use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "categories.ts")]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub random: bool,
    pub max: i64,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "categories.ts")]
pub struct AddMemberRequest {
    pub number: i64,
    /// 缺省为当前用户
    #[serde(default)]
    pub student: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "categories.ts")]
pub struct MoveMemberRequest {
    #[serde(default)]
    pub student: Option<String>,
    pub from: i64,
    pub to: i64,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "categories.ts")]
pub struct ManualGroupRequest {
    pub number: i64,
    pub students: Vec<String>,
}

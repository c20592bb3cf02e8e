use serde::Serialize;
use ts_rs::TS;

use super::{Category, Group};

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "categories.ts")]
pub struct CategoryListResponse {
    pub items: Vec<Category>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "categories.ts")]
pub struct GroupListResponse {
    pub category: String,
    pub groups: Vec<Group>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "categories.ts")]
pub struct StudentGroupResponse {
    pub category: String,
    pub student: String,
    pub number: Option<i64>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "categories.ts")]
pub struct TeammatesResponse {
    pub number: i64,
    pub teammates: Vec<String>,
}

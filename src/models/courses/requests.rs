use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "courses.ts")]
pub struct CreateCourseRequest {
    pub nrc: i64,
    pub name: String,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "courses.ts")]
pub struct EnrollStudentRequest {
    /// 缺省为当前用户（学生自助加入）
    #[serde(default)]
    pub email: Option<String>,
}

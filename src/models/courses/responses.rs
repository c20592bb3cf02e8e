use serde::Serialize;
use ts_rs::TS;

use super::{Course, CourseRole};

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "courses.ts")]
pub struct CourseListResponse {
    pub teaching: Vec<Course>,
    pub enrolled: Vec<Course>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "courses.ts")]
pub struct CourseDetailResponse {
    pub course: Course,
    pub role: CourseRole,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "courses.ts")]
pub struct CourseStudentsResponse {
    pub nrc: i64,
    pub students: Vec<String>,
}

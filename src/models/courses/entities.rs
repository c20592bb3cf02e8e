use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::storage::TableRow;

/// 课程，NRC 唯一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "courses.ts")]
pub struct Course {
    pub nrc: i64,
    pub name: String,
    /// 教师邮箱
    pub teacher: String,
}

impl TableRow for Course {
    const TABLE: &'static str = "course";
}

/// 选课记录（`student` 表），id = email-nrc
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "courses.ts")]
pub struct Enrollment {
    pub id: String,
    pub email: String,
    pub nrc: i64,
}

impl TableRow for Enrollment {
    const TABLE: &'static str = "student";
}

impl Enrollment {
    pub fn new(email: &str, nrc: i64) -> Self {
        Self {
            id: Self::make_id(email, nrc),
            email: email.to_string(),
            nrc,
        }
    }

    pub fn make_id(email: &str, nrc: i64) -> String {
        format!("{email}-{nrc}")
    }
}

/// 用户在课程中的身份
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "courses.ts")]
pub enum CourseRole {
    Teacher,
    Student,
}

impl std::fmt::Display for CourseRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CourseRole::Teacher => write!(f, "teacher"),
            CourseRole::Student => write!(f, "student"),
        }
    }
}

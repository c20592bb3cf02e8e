//! 课程与选课

mod enrolment;

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use crate::config::PolicyConfig;
use crate::errors::{PeerEvalError, Result};
use crate::models::courses::{Course, CourseRole, Enrollment};
use crate::services::{cascade, lookup};
use crate::storage::{Filter, TableRow, TableStore, TableStoreExt};
use crate::utils::validate::validate_name;

#[derive(Clone)]
pub struct CourseService {
    store: Arc<dyn TableStore>,
    max_courses_per_teacher: usize,
}

impl CourseService {
    pub fn new(store: Arc<dyn TableStore>, policy: &PolicyConfig) -> Self {
        Self {
            store,
            max_courses_per_teacher: policy.max_courses_per_teacher,
        }
    }

    pub async fn add_course(&self, nrc: i64, name: &str, teacher: &str) -> Result<Course> {
        validate_name("Course name", name).map_err(PeerEvalError::validation)?;
        if nrc <= 0 {
            return Err(PeerEvalError::validation("NRC must be a positive number"));
        }

        let owned = self.teacher_courses(teacher).await?;
        if owned.len() >= self.max_courses_per_teacher {
            return Err(PeerEvalError::limit_reached(format!(
                "Teacher {teacher} already has {} courses",
                owned.len()
            )));
        }

        if self.find_course(nrc).await?.is_some() {
            return Err(PeerEvalError::already_exists(format!(
                "Course {nrc} already exists"
            )));
        }

        let course = Course {
            nrc,
            name: name.trim().to_string(),
            teacher: teacher.to_string(),
        };
        self.store.insert_row(&course).await?;
        info!("Course {} created by {}", nrc, teacher);
        Ok(course)
    }

    pub async fn find_course(&self, nrc: i64) -> Result<Option<Course>> {
        self.store
            .find_row::<Course>(&Filter::new().eq("nrc", nrc))
            .await
    }

    pub async fn get_course(&self, nrc: i64) -> Result<Course> {
        lookup::require_course(self.store.as_ref(), nrc).await
    }

    pub async fn teacher_courses(&self, email: &str) -> Result<Vec<Course>> {
        let courses = self
            .store
            .read_rows::<Course>(&Filter::new().eq("teacher", email))
            .await?;
        debug!("Teacher {} owns {} courses", email, courses.len());
        Ok(courses)
    }

    /// 删除课程及其下的全部数据
    pub async fn delete_course(&self, nrc: i64) -> Result<()> {
        self.get_course(nrc).await?;
        cascade::delete_course_tree(self.store.as_ref(), nrc).await
    }

    /// 用户在课程中的身份，无关用户返回 None
    pub async fn course_role(&self, nrc: i64, email: &str) -> Result<Option<CourseRole>> {
        let course = self.get_course(nrc).await?;
        if course.teacher == email {
            return Ok(Some(CourseRole::Teacher));
        }
        if self.is_enrolled(email, nrc).await? {
            return Ok(Some(CourseRole::Student));
        }
        Ok(None)
    }

    /// 要求是课程教师或已选课学生
    pub async fn require_member(&self, nrc: i64, email: &str) -> Result<CourseRole> {
        self.course_role(nrc, email).await?.ok_or_else(|| {
            PeerEvalError::authorization(format!("{email} is not a member of course {nrc}"))
        })
    }

    /// 要求是课程教师
    pub async fn require_teacher(&self, nrc: i64, email: &str) -> Result<()> {
        match self.course_role(nrc, email).await? {
            Some(CourseRole::Teacher) => Ok(()),
            _ => Err(PeerEvalError::authorization(format!(
                "Only the teacher of course {nrc} can do this"
            ))),
        }
    }

    pub(crate) fn enrollment_filter(email: &str, nrc: i64) -> Filter {
        Filter::by_id(Enrollment::make_id(email, nrc))
    }

    pub(crate) async fn delete_enrollment(&self, email: &str, nrc: i64) -> Result<()> {
        self.store
            .delete(
                Enrollment::TABLE,
                "id",
                &json!(Enrollment::make_id(email, nrc)),
            )
            .await
    }
}

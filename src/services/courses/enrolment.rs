use tracing::info;

use super::CourseService;
use crate::errors::{PeerEvalError, Result};
use crate::models::courses::{Course, Enrollment};
use crate::storage::{Filter, TableStoreExt};
use crate::utils::validate::validate_email;

impl CourseService {
    pub async fn enroll_student(&self, email: &str, nrc: i64) -> Result<Enrollment> {
        validate_email(email).map_err(PeerEvalError::validation)?;
        let course = self.get_course(nrc).await?;
        if course.teacher == email {
            return Err(PeerEvalError::validation(
                "The teacher cannot enrol in their own course",
            ));
        }

        if self.is_enrolled(email, nrc).await? {
            return Err(PeerEvalError::already_exists(format!(
                "Student {email} already exists in course {nrc}"
            )));
        }

        let enrollment = Enrollment::new(email, nrc);
        self.store.insert_row(&enrollment).await?;
        info!("Student {} enrolled in course {}", email, nrc);
        Ok(enrollment)
    }

    pub async fn remove_student(&self, email: &str, nrc: i64) -> Result<()> {
        if !self.is_enrolled(email, nrc).await? {
            return Err(PeerEvalError::not_found(format!(
                "Student {email} does not exist in course {nrc}"
            )));
        }
        self.delete_enrollment(email, nrc).await?;
        info!("Student {} removed from course {}", email, nrc);
        Ok(())
    }

    pub async fn is_enrolled(&self, email: &str, nrc: i64) -> Result<bool> {
        self.store
            .row_exists::<Enrollment>(&Self::enrollment_filter(email, nrc))
            .await
    }

    /// 课程学生邮箱，按字母排序
    pub async fn course_students(&self, nrc: i64) -> Result<Vec<String>> {
        let mut students: Vec<String> = self
            .store
            .read_rows::<Enrollment>(&Filter::new().eq("nrc", nrc))
            .await?
            .into_iter()
            .map(|e| e.email)
            .collect();
        students.sort();
        students.dedup();
        Ok(students)
    }

    pub async fn student_courses(&self, email: &str) -> Result<Vec<Course>> {
        let enrollments = self
            .store
            .read_rows::<Enrollment>(&Filter::new().eq("email", email))
            .await?;

        let mut courses = Vec::with_capacity(enrollments.len());
        for enrollment in enrollments {
            if let Some(course) = self.find_course(enrollment.nrc).await? {
                courses.push(course);
            }
        }
        Ok(courses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyConfig;
    use crate::models::courses::CourseRole;
    use crate::storage::memory::MemoryTableStore;
    use std::sync::Arc;

    fn service() -> CourseService {
        CourseService::new(Arc::new(MemoryTableStore::new()), &PolicyConfig::default())
    }

    #[tokio::test]
    async fn test_teacher_course_limit() {
        let courses = service();
        for nrc in 1001..1004 {
            courses.add_course(nrc, "Curso", "t@uni.edu").await.unwrap();
        }
        let err = courses
            .add_course(1004, "Curso", "t@uni.edu")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E017");

        // 其他教师不受影响
        courses.add_course(1004, "Curso", "u@uni.edu").await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_nrc() {
        let courses = service();
        courses.add_course(1001, "Moviles", "t@uni.edu").await.unwrap();
        let err = courses
            .add_course(1001, "Otra", "u@uni.edu")
            .await
            .unwrap_err();
        assert!(err.message().contains("already exists"));
    }

    #[tokio::test]
    async fn test_enrolment_lifecycle() {
        let courses = service();
        courses.add_course(1001, "Moviles", "t@uni.edu").await.unwrap();

        courses.enroll_student("b@uni.edu", 1001).await.unwrap();
        courses.enroll_student("a@uni.edu", 1001).await.unwrap();
        assert!(
            courses
                .enroll_student("a@uni.edu", 1001)
                .await
                .unwrap_err()
                .message()
                .contains("already exists")
        );
        assert_eq!(
            courses.enroll_student("a@uni.edu", 9999).await.unwrap_err().code(),
            "E008"
        );

        assert_eq!(
            courses.course_students(1001).await.unwrap(),
            vec!["a@uni.edu", "b@uni.edu"]
        );
        assert_eq!(courses.student_courses("a@uni.edu").await.unwrap().len(), 1);
        assert_eq!(
            courses.course_role(1001, "a@uni.edu").await.unwrap(),
            Some(CourseRole::Student)
        );
        assert_eq!(
            courses.course_role(1001, "t@uni.edu").await.unwrap(),
            Some(CourseRole::Teacher)
        );
        assert_eq!(courses.course_role(1001, "x@uni.edu").await.unwrap(), None);

        courses.remove_student("a@uni.edu", 1001).await.unwrap();
        assert!(
            courses
                .remove_student("a@uni.edu", 1001)
                .await
                .unwrap_err()
                .message()
                .contains("does not exist")
        );
        assert_eq!(courses.course_students(1001).await.unwrap(), vec!["b@uni.edu"]);
    }

    #[tokio::test]
    async fn test_access_helpers() {
        let courses = service();
        courses.add_course(1001, "Moviles", "t@uni.edu").await.unwrap();
        courses.enroll_student("a@uni.edu", 1001).await.unwrap();

        courses.require_teacher(1001, "t@uni.edu").await.unwrap();
        assert_eq!(
            courses.require_teacher(1001, "a@uni.edu").await.unwrap_err().code(),
            "E013"
        );
        assert_eq!(
            courses.require_member(1001, "a@uni.edu").await.unwrap(),
            CourseRole::Student
        );
        assert!(courses.require_member(1001, "z@uni.edu").await.is_err());
    }
}

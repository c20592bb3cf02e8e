pub mod entities;
pub mod requests;
pub mod responses;

pub use entities::{Course, CourseRole, Enrollment};
pub use requests::{CreateCourseRequest, EnrollStudentRequest};
pub use responses::{CourseDetailResponse, CourseListResponse, CourseStudentsResponse};

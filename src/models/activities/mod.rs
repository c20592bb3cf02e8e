pub mod entities;
pub mod requests;
pub mod responses;

pub use entities::{Activity, ActivitySummary, Assessment, Visibility};
pub use requests::{CreateActivityRequest, CreateAssessmentRequest};
pub use responses::{ActivityListResponse, AssessmentListResponse};

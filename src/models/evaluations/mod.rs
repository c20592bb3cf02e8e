pub mod entities;
pub mod requests;
pub mod responses;

pub use entities::{Evaluation, NewEvaluation};
pub use requests::{CreateEvaluationRequest, EvaluationQuery, ScoreEntry, SubmitScoresRequest};
pub use responses::{ActivityProgressResponse, EvaluationListResponse, EvaluationProgress};

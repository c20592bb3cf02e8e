pub mod activities;
pub mod auth;
pub mod cascade;
pub mod categories;
pub mod courses;
pub mod evaluations;
pub mod lookup;
pub mod results;

pub use activities::ActivityService;
pub use auth::AuthService;
pub use categories::CategoryService;
pub use courses::CourseService;
pub use evaluations::EvaluationService;
pub use results::ResultService;

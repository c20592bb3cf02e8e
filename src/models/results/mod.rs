pub mod responses;

pub use responses::{AverageResponse, CategoryReport, CriterionScore, GroupReport, StudentReport};

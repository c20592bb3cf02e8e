use serde::Serialize;
use ts_rs::TS;

use super::{ActivitySummary, Assessment};

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "activities.ts")]
pub struct ActivityListResponse {
    pub items: Vec<ActivitySummary>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "activities.ts")]
pub struct AssessmentListResponse {
    pub items: Vec<Assessment>,
}

use serde::Serialize;
use ts_rs::TS;

use super::Evaluation;

/// 学生在某个评估标准上的完成情况
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "evaluations.ts")]
pub struct EvaluationProgress {
    pub assessment: String,
    pub group: i64,
    /// 需要评分的队友（不含自己）
    pub members: Vec<String>,
    pub evaluated: Vec<String>,
    pub pending: Vec<String>,
    pub complete: bool,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "evaluations.ts")]
pub struct ActivityProgressResponse {
    pub activity: String,
    pub items: Vec<EvaluationProgress>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "evaluations.ts")]
pub struct EvaluationListResponse {
    pub items: Vec<Evaluation>,
}

use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "evaluations.ts")]
pub struct ScoreEntry {
    pub evaluated: String,
    pub score: f64,
}

/// 单条评分，评分人为当前用户
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "evaluations.ts")]
pub struct CreateEvaluationRequest {
    pub assessment: String,
    pub evaluated: String,
    pub score: f64,
}

/// 一次性提交对所有队友的评分
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "evaluations.ts")]
pub struct SubmitScoresRequest {
    pub scores: Vec<ScoreEntry>,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "evaluations.ts")]
pub struct EvaluationQuery {
    #[serde(default)]
    pub assessment: Option<String>,
    #[serde(default)]
    pub evaluator: Option<String>,
    #[serde(default)]
    pub evaluated: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub group: Option<i64>,
}

use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "results.ts")]
pub struct AverageResponse {
    pub average: f64,
    pub count: usize,
}

/// 单个评估标准的平均分
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "results.ts")]
pub struct CriterionScore {
    pub criterion: String,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "results.ts")]
pub struct StudentReport {
    pub email: String,
    pub average: f64,
    pub criteria: Vec<CriterionScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "results.ts")]
pub struct GroupReport {
    pub number: i64,
    pub average: f64,
    pub students: Vec<StudentReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "results.ts")]
pub struct CategoryReport {
    pub category: String,
    pub overall_average: f64,
    pub groups: Vec<GroupReport>,
}

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::storage::TableRow;

/// 一次同伴评分，id = assessment-evaluator-evaluated
///
/// 评分只插入和删除，不修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "evaluations.ts")]
pub struct Evaluation {
    pub id: String,
    pub assessment: String,
    pub evaluator: String,
    pub evaluated: String,
    pub group: i64,
    pub category: String,
    pub score: f64,
    /// 评估标准名；旧记录没有该字段
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub criterion: Option<String>,
}

impl TableRow for Evaluation {
    const TABLE: &'static str = "evaluation";
}

impl Evaluation {
    pub fn make_id(assessment: &str, evaluator: &str, evaluated: &str) -> String {
        format!("{assessment}-{evaluator}-{evaluated}")
    }

    /// 评估标准名，旧记录取 assessment id 的第一个 `-` 分段
    pub fn criterion_name(&self) -> &str {
        match self.criterion.as_deref() {
            Some(criterion) if !criterion.is_empty() => criterion,
            _ => self
                .assessment
                .split('-')
                .next()
                .unwrap_or(&self.assessment),
        }
    }
}

/// 待写入的评分，组号和分组方案由服务端根据评分人的成员关系确定
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvaluation {
    pub assessment: String,
    pub evaluator: String,
    pub evaluated: String,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluation(assessment: &str, criterion: Option<&str>) -> Evaluation {
        Evaluation {
            id: Evaluation::make_id(assessment, "a@uni.edu", "b@uni.edu"),
            assessment: assessment.to_string(),
            evaluator: "a@uni.edu".to_string(),
            evaluated: "b@uni.edu".to_string(),
            group: 1,
            category: "Proyecto-1001".to_string(),
            score: 8.0,
            criterion: criterion.map(str::to_string),
        }
    }

    #[test]
    fn test_criterion_prefers_stored_field() {
        let e = evaluation("Trabajo en-equipo-Sprint 1-Proyecto-1001", Some("Trabajo en-equipo"));
        assert_eq!(e.criterion_name(), "Trabajo en-equipo");
    }

    #[test]
    fn test_legacy_criterion_uses_first_segment() {
        let e = evaluation("Puntualidad-Sprint 1-Proyecto-1001", None);
        assert_eq!(e.criterion_name(), "Puntualidad");

        let e = evaluation("Actitud-Sprint 1", Some(""));
        assert_eq!(e.criterion_name(), "Actitud");
    }

    #[test]
    fn test_legacy_record_without_criterion_deserializes() {
        let e: Evaluation = serde_json::from_value(serde_json::json!({
            "id": "x", "assessment": "Puntualidad-S1", "evaluator": "a", "evaluated": "b",
            "group": 2, "category": "P-1", "score": 7.5
        }))
        .unwrap();
        assert_eq!(e.criterion, None);
        assert!(!serde_json::to_string(&e).unwrap().contains("criterion"));
    }
}

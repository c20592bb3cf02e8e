use std::collections::HashSet;

use tracing::info;

use super::{EvaluationService, check_score, self_evaluation_error};
use crate::errors::{PeerEvalError, Result};
use crate::models::evaluations::{Evaluation, EvaluationProgress, ScoreEntry};
use crate::services::lookup;
use crate::storage::TableStoreExt;

impl EvaluationService {
    /// 一次提交对全部待评队友的评分
    ///
    /// 所有条目在写入前整体校验；写入逐条进行，中途失败时已写入的评分保留。
    pub async fn submit_scores(
        &self,
        assessment: &str,
        evaluator: &str,
        scores: &[ScoreEntry],
    ) -> Result<EvaluationProgress> {
        let (assessment, _, category) =
            lookup::assessment_context(self.store.as_ref(), assessment).await?;
        let progress = self.evaluation_progress(&assessment.id, evaluator).await?;

        let mut seen = HashSet::new();
        for entry in scores {
            if entry.evaluated == evaluator {
                return Err(self_evaluation_error(evaluator));
            }
            check_score(entry.score, &assessment)?;
            if !progress.members.contains(&entry.evaluated) {
                return Err(PeerEvalError::validation(format!(
                    "{} is not a teammate of {evaluator}",
                    entry.evaluated
                )));
            }
            if !seen.insert(entry.evaluated.as_str()) {
                return Err(PeerEvalError::validation(format!(
                    "{} is scored more than once",
                    entry.evaluated
                )));
            }
            if progress.evaluated.contains(&entry.evaluated) {
                return Err(PeerEvalError::already_exists(format!(
                    "Evaluation of {} on {} already exists",
                    entry.evaluated, assessment.id
                )));
            }
        }

        let missing: Vec<&str> = progress
            .pending
            .iter()
            .map(String::as_str)
            .filter(|p| !seen.contains(p))
            .collect();
        if !missing.is_empty() {
            return Err(PeerEvalError::validation(format!(
                "Missing scores for: {}",
                missing.join(", ")
            )));
        }

        for entry in scores {
            let evaluation = Evaluation {
                id: Evaluation::make_id(&assessment.id, evaluator, &entry.evaluated),
                assessment: assessment.id.clone(),
                evaluator: evaluator.to_string(),
                evaluated: entry.evaluated.clone(),
                group: progress.group,
                category: category.id.clone(),
                score: entry.score,
                criterion: Some(assessment.name.clone()),
            };
            self.store.insert_row(&evaluation).await?;
        }
        info!(
            "{} submitted {} scores on {}",
            evaluator,
            scores.len(),
            assessment.id
        );

        self.evaluation_progress(&assessment.id, evaluator).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{ASSESSMENT, fixture, new_evaluation};
    use crate::models::evaluations::ScoreEntry;

    fn entry(evaluated: &str, score: f64) -> ScoreEntry {
        ScoreEntry {
            evaluated: evaluated.to_string(),
            score,
        }
    }

    #[tokio::test]
    async fn test_submit_requires_full_valid_batch() {
        let fx = fixture().await;
        let service = &fx.evaluations;

        let err = service
            .submit_scores(ASSESSMENT, "a@uni.edu", &[entry("b@uni.edu", 4.0)])
            .await
            .unwrap_err();
        assert!(err.message().contains("c@uni.edu"));

        let err = service
            .submit_scores(
                ASSESSMENT,
                "a@uni.edu",
                &[entry("b@uni.edu", 4.0), entry("d@uni.edu", 4.0)],
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E007");

        let err = service
            .submit_scores(
                ASSESSMENT,
                "a@uni.edu",
                &[entry("b@uni.edu", 4.0), entry("c@uni.edu", 9.0)],
            )
            .await
            .unwrap_err();
        assert!(err.message().contains("invalid score range"));

        let err = service
            .submit_scores(
                ASSESSMENT,
                "a@uni.edu",
                &[entry("b@uni.edu", 4.0), entry("b@uni.edu", 3.0)],
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E007");

        // 校验失败时不写入任何评分
        let progress = service
            .evaluation_progress(ASSESSMENT, "a@uni.edu")
            .await
            .unwrap();
        assert!(progress.evaluated.is_empty());

        let progress = service
            .submit_scores(
                ASSESSMENT,
                "a@uni.edu",
                &[entry("c@uni.edu", 3.5), entry("b@uni.edu", 4.0)],
            )
            .await
            .unwrap();
        assert!(progress.complete);
        assert!(progress.pending.is_empty());
    }

    #[tokio::test]
    async fn test_submit_only_needs_pending_teammates() {
        let fx = fixture().await;
        let service = &fx.evaluations;
        service
            .add_evaluation(new_evaluation("a@uni.edu", "b@uni.edu", 2.0))
            .await
            .unwrap();

        let err = service
            .submit_scores(
                ASSESSMENT,
                "a@uni.edu",
                &[entry("b@uni.edu", 4.0), entry("c@uni.edu", 4.0)],
            )
            .await
            .unwrap_err();
        assert!(err.message().contains("already exists"));

        let progress = service
            .submit_scores(ASSESSMENT, "a@uni.edu", &[entry("c@uni.edu", 4.0)])
            .await
            .unwrap();
        assert!(progress.complete);
    }

    #[tokio::test]
    async fn test_self_score_rejected() {
        let fx = fixture().await;
        let err = fx
            .evaluations
            .submit_scores(ASSESSMENT, "a@uni.edu", &[entry("a@uni.edu", 4.0)])
            .await
            .unwrap_err();
        assert!(err.message().contains("self-evaluation not allowed"));
    }
}

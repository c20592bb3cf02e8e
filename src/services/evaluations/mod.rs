//! 同伴评分
//!
//! 评分只插入和删除。完成情况每次都从评分记录重新计算，不做缓存。

mod submit;

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use crate::errors::{PeerEvalError, Result};
use crate::models::activities::Assessment;
use crate::models::evaluations::{Evaluation, EvaluationProgress, EvaluationQuery, NewEvaluation};
use crate::services::{CategoryService, lookup};
use crate::storage::{Filter, TableRow, TableStore, TableStoreExt};

#[derive(Clone)]
pub struct EvaluationService {
    store: Arc<dyn TableStore>,
    categories: CategoryService,
}

/// 每个队友都出现在 authored 的 evaluated 中即为完成；没有队友时视为完成
pub fn is_complete(members: &[String], authored: &[Evaluation]) -> bool {
    members
        .iter()
        .all(|member| authored.iter().any(|e| &e.evaluated == member))
}

/// 分数必须有限且在 [0, max] 内
pub(crate) fn check_score(score: f64, assessment: &Assessment) -> Result<()> {
    if !score.is_finite() || score < 0.0 || score > assessment.max {
        return Err(PeerEvalError::invalid_score(format!(
            "invalid score range: {score} is outside [0, {}] for {}",
            assessment.max, assessment.id
        )));
    }
    Ok(())
}

pub(crate) fn self_evaluation_error(evaluator: &str) -> PeerEvalError {
    PeerEvalError::self_evaluation(format!(
        "self-evaluation not allowed for {evaluator}"
    ))
}

impl EvaluationService {
    pub fn new(store: Arc<dyn TableStore>, categories: CategoryService) -> Self {
        Self { store, categories }
    }

    pub async fn add_evaluation(&self, new: NewEvaluation) -> Result<Evaluation> {
        if new.evaluator == new.evaluated {
            return Err(self_evaluation_error(&new.evaluator));
        }

        let id = Evaluation::make_id(&new.assessment, &new.evaluator, &new.evaluated);
        if self
            .store
            .row_exists::<Evaluation>(&Filter::by_id(id.as_str()))
            .await?
        {
            return Err(PeerEvalError::already_exists(format!(
                "Evaluation {id} already exists"
            )));
        }

        let (assessment, _, category) =
            lookup::assessment_context(self.store.as_ref(), &new.assessment).await?;
        check_score(new.score, &assessment)?;

        let group = self.evaluator_group(&category.id, &new.evaluator).await?;
        let members = self
            .categories
            .teammates(&category.id, group, &new.evaluator)
            .await?;
        if !members.contains(&new.evaluated) {
            return Err(PeerEvalError::validation(format!(
                "{} is not a teammate of {}",
                new.evaluated, new.evaluator
            )));
        }

        let evaluation = Evaluation {
            id,
            assessment: assessment.id,
            evaluator: new.evaluator,
            evaluated: new.evaluated,
            group,
            category: category.id,
            score: new.score,
            criterion: Some(assessment.name),
        };
        self.store.insert_row(&evaluation).await?;
        info!(
            "{} scored {} with {} on {}",
            evaluation.evaluator, evaluation.evaluated, evaluation.score, evaluation.assessment
        );
        Ok(evaluation)
    }

    /// 学生在分组方案中的组号，未分组时返回 NotFound
    async fn evaluator_group(&self, category: &str, evaluator: &str) -> Result<i64> {
        self.categories
            .student_group(category, evaluator)
            .await?
            .ok_or_else(|| {
                PeerEvalError::not_found(format!(
                    "Student {evaluator} does not exist in any group of {category}"
                ))
            })
    }

    /// evaluator 在某个评估标准上已写的评分
    pub async fn authored(&self, assessment: &str, evaluator: &str) -> Result<Vec<Evaluation>> {
        self.store
            .read_rows::<Evaluation>(
                &Filter::new()
                    .eq("assessment", assessment)
                    .eq("evaluator", evaluator),
            )
            .await
    }

    /// 学生在评估标准上的完成情况，学生必须已在该分组方案的某个组中
    pub async fn evaluation_progress(
        &self,
        assessment: &str,
        evaluator: &str,
    ) -> Result<EvaluationProgress> {
        let (assessment, _, category) =
            lookup::assessment_context(self.store.as_ref(), assessment).await?;

        let group = self.evaluator_group(&category.id, evaluator).await?;

        let members = self
            .categories
            .teammates(&category.id, group, evaluator)
            .await?;
        let authored = self.authored(&assessment.id, evaluator).await?;

        let complete = is_complete(&members, &authored);
        let mut evaluated: Vec<String> = authored.into_iter().map(|e| e.evaluated).collect();
        evaluated.sort();
        let pending = members
            .iter()
            .filter(|m| !evaluated.contains(*m))
            .cloned()
            .collect();

        debug!(
            "Progress of {} on {}: {}/{}",
            evaluator,
            assessment.id,
            evaluated.len(),
            members.len()
        );
        Ok(EvaluationProgress {
            assessment: assessment.id,
            group,
            members,
            evaluated,
            pending,
            complete,
        })
    }

    pub async fn activity_progress(
        &self,
        activity: &str,
        evaluator: &str,
    ) -> Result<Vec<EvaluationProgress>> {
        lookup::require_activity(self.store.as_ref(), activity).await?;
        let assessments = self
            .store
            .read_rows::<Assessment>(&Filter::new().eq("activity", activity))
            .await?;

        let mut items = Vec::with_capacity(assessments.len());
        for assessment in assessments {
            items.push(self.evaluation_progress(&assessment.id, evaluator).await?);
        }
        Ok(items)
    }

    pub async fn evaluations(&self, query: &EvaluationQuery) -> Result<Vec<Evaluation>> {
        let mut filter = Filter::new();
        if let Some(assessment) = &query.assessment {
            filter = filter.eq("assessment", assessment.as_str());
        }
        if let Some(evaluator) = &query.evaluator {
            filter = filter.eq("evaluator", evaluator.as_str());
        }
        if let Some(evaluated) = &query.evaluated {
            filter = filter.eq("evaluated", evaluated.as_str());
        }
        if let Some(category) = &query.category {
            filter = filter.eq("category", category.as_str());
        }
        if let Some(group) = query.group {
            filter = filter.eq("group", group);
        }
        self.store.read_rows::<Evaluation>(&filter).await
    }

    pub async fn get_evaluation(&self, id: &str) -> Result<Evaluation> {
        self.store
            .find_row::<Evaluation>(&Filter::by_id(id))
            .await?
            .ok_or_else(|| PeerEvalError::not_found(format!("Evaluation {id} does not exist")))
    }

    pub async fn delete_evaluation(&self, id: &str) -> Result<()> {
        self.get_evaluation(id).await?;
        self.store
            .delete(Evaluation::TABLE, "id", &json!(id))
            .await?;
        info!("Evaluation {} deleted", id);
        Ok(())
    }
}

//! 成绩汇总
//!
//! 全部为不加权的算术平均，空集合返回 0。
//! `public_only` 为真时（学生视角）私有评估标准上的评分不参与统计。

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::errors::Result;
use crate::models::activities::{Activity, Assessment};
use crate::models::evaluations::Evaluation;
use crate::models::results::{
    AverageResponse, CategoryReport, CriterionScore, GroupReport, StudentReport,
};
use crate::services::{CategoryService, lookup};
use crate::storage::{Filter, TableStore, TableStoreExt};

pub fn mean<I: IntoIterator<Item = f64>>(scores: I) -> f64 {
    let (sum, count) = scores
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), s| (sum + s, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

pub fn average_of<'a, I: IntoIterator<Item = &'a Evaluation>>(evaluations: I) -> AverageResponse {
    let scores: Vec<f64> = evaluations.into_iter().map(|e| e.score).collect();
    AverageResponse {
        average: mean(scores.iter().copied()),
        count: scores.len(),
    }
}

/// 按评估标准名分组求平均，按名称排序
pub fn criterion_averages<'a, I: IntoIterator<Item = &'a Evaluation>>(
    evaluations: I,
) -> Vec<CriterionScore> {
    let mut by_criterion: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for evaluation in evaluations {
        by_criterion
            .entry(evaluation.criterion_name())
            .or_default()
            .push(evaluation.score);
    }
    by_criterion
        .into_iter()
        .map(|(criterion, scores)| CriterionScore {
            criterion: criterion.to_string(),
            average: mean(scores),
        })
        .collect()
}

#[derive(Clone)]
pub struct ResultService {
    store: Arc<dyn TableStore>,
    categories: CategoryService,
}

impl ResultService {
    pub fn new(store: Arc<dyn TableStore>, categories: CategoryService) -> Self {
        Self { store, categories }
    }

    async fn assessment_ids(&self, activity: &str) -> Result<HashSet<String>> {
        Ok(self
            .store
            .read_rows::<Assessment>(&Filter::new().eq("activity", activity))
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect())
    }

    async fn category_evaluations(&self, category: &str) -> Result<Vec<Evaluation>> {
        self.store
            .read_rows::<Evaluation>(&Filter::new().eq("category", category))
            .await
    }

    /// 按条件读取评分，public_only 时去掉私有评估标准上的评分
    async fn visible_evaluations(
        &self,
        filter: &Filter,
        public_only: bool,
    ) -> Result<Vec<Evaluation>> {
        let mut evaluations = self.store.read_rows::<Evaluation>(filter).await?;
        if public_only {
            let visibility = self.visibility_of(&evaluations).await?;
            evaluations.retain(|e| visibility.get(&e.assessment).copied().unwrap_or(false));
        }
        Ok(evaluations)
    }

    /// 活动下所有评估标准的全部评分，按评估标准逐个读取
    pub async fn activity_average(&self, activity: &str) -> Result<AverageResponse> {
        let activity = lookup::require_activity(self.store.as_ref(), activity).await?;
        let mut evaluations = Vec::new();
        for assessment in self.assessment_ids(&activity.id).await? {
            evaluations.extend(
                self.store
                    .read_rows::<Evaluation>(&Filter::new().eq("assessment", assessment))
                    .await?,
            );
        }
        let average = average_of(&evaluations);
        debug!("Activity {} average {:?}", activity.id, average);
        Ok(average)
    }

    pub async fn group_average(
        &self,
        category: &str,
        group: i64,
        public_only: bool,
    ) -> Result<AverageResponse> {
        let evaluations = self
            .visible_evaluations(
                &Filter::new().eq("category", category).eq("group", group),
                public_only,
            )
            .await?;
        Ok(average_of(&evaluations))
    }

    pub async fn student_average(
        &self,
        email: &str,
        category: &str,
        public_only: bool,
    ) -> Result<AverageResponse> {
        let evaluations = self
            .visible_evaluations(
                &Filter::new()
                    .eq("category", category)
                    .eq("evaluated", email),
                public_only,
            )
            .await?;
        Ok(average_of(&evaluations))
    }

    /// 学生在各评估标准上的平均分
    pub async fn student_detailed_scores(
        &self,
        email: &str,
        category: &str,
        group: Option<i64>,
        public_only: bool,
    ) -> Result<Vec<CriterionScore>> {
        let mut filter = Filter::new()
            .eq("category", category)
            .eq("evaluated", email);
        if let Some(group) = group {
            filter = filter.eq("group", group);
        }
        let evaluations = self.visible_evaluations(&filter, public_only).await?;
        Ok(criterion_averages(&evaluations))
    }

    /// 评分引用的评估标准是否公开，已删除的视为不公开
    async fn visibility_of(&self, evaluations: &[Evaluation]) -> Result<HashMap<String, bool>> {
        let mut visibility = HashMap::new();
        for evaluation in evaluations {
            if visibility.contains_key(&evaluation.assessment) {
                continue;
            }
            let public = self
                .store
                .find_row::<Assessment>(&Filter::by_id(evaluation.assessment.as_str()))
                .await?
                .is_some_and(|a| a.is_public());
            visibility.insert(evaluation.assessment.clone(), public);
        }
        Ok(visibility)
    }

    /// 分组方案的完整成绩单（教师视角）
    pub async fn category_report(&self, category: &str) -> Result<CategoryReport> {
        let category = lookup::require_category(self.store.as_ref(), category).await?;
        let evaluations = self.category_evaluations(&category.id).await?;

        // 只统计已配置评估标准的活动
        let activities = self
            .store
            .read_rows::<Activity>(&Filter::new().eq("category", category.id.as_str()))
            .await?;
        let mut activity_averages = Vec::new();
        for activity in activities {
            let ids = self.assessment_ids(&activity.id).await?;
            if ids.is_empty() {
                continue;
            }
            activity_averages
                .push(average_of(evaluations.iter().filter(|e| ids.contains(&e.assessment))).average);
        }

        let mut groups = Vec::new();
        for group in self.categories.category_groups(&category.id).await? {
            let mut students: Vec<StudentReport> = group
                .members
                .iter()
                .map(|email| {
                    let received: Vec<&Evaluation> =
                        evaluations.iter().filter(|e| &e.evaluated == email).collect();
                    let in_group = received.iter().copied().filter(|e| e.group == group.number);
                    StudentReport {
                        email: email.clone(),
                        average: average_of(received.iter().copied()).average,
                        criteria: criterion_averages(in_group),
                    }
                })
                .collect();
            students.sort_by(|a, b| {
                b.average
                    .total_cmp(&a.average)
                    .then_with(|| a.email.cmp(&b.email))
            });

            groups.push(GroupReport {
                number: group.number,
                average: average_of(evaluations.iter().filter(|e| e.group == group.number))
                    .average,
                students,
            });
        }

        Ok(CategoryReport {
            category: category.id,
            overall_average: mean(activity_averages),
            groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activities::Visibility;
    use crate::models::evaluations::{NewEvaluation, ScoreEntry};
    use crate::services::evaluations::tests::{ASSESSMENT, CATEGORY, fixture};

    fn entry(evaluated: &str, score: f64) -> ScoreEntry {
        ScoreEntry {
            evaluated: evaluated.to_string(),
            score,
        }
    }

    #[test]
    fn test_mean_of_empty_is_zero() {
        assert_eq!(mean(Vec::new()), 0.0);
        assert_eq!(mean([1.0, 2.0, 4.5]), 2.5);
        assert_eq!(average_of(&[]).count, 0);
    }

    #[test]
    fn test_criterion_averages_use_legacy_fallback() {
        let make = |assessment: &str, criterion: Option<&str>, score: f64| Evaluation {
            id: String::new(),
            assessment: assessment.to_string(),
            evaluator: "a".to_string(),
            evaluated: "b".to_string(),
            group: 1,
            category: CATEGORY.to_string(),
            score,
            criterion: criterion.map(str::to_string),
        };
        let evaluations = vec![
            make("Puntualidad-Sprint 1", None, 4.0),
            make("Puntualidad-Sprint 2", Some("Puntualidad"), 2.0),
            make("Actitud-Sprint 1", Some("Actitud"), 5.0),
        ];

        assert_eq!(
            criterion_averages(&evaluations),
            vec![
                CriterionScore {
                    criterion: "Actitud".to_string(),
                    average: 5.0
                },
                CriterionScore {
                    criterion: "Puntualidad".to_string(),
                    average: 3.0
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_student_average_of_eight_and_six_is_seven() {
        let fx = fixture().await;
        fx.activities
            .add_assessment("Puntualidad", "Sprint 1-Proyecto-1001", Visibility::Public, 10.0)
            .await
            .unwrap();
        let puntualidad = "Puntualidad-Sprint 1-Proyecto-1001";
        for (evaluator, score) in [("a@uni.edu", 8.0), ("c@uni.edu", 6.0)] {
            fx.evaluations
                .add_evaluation(NewEvaluation {
                    assessment: puntualidad.to_string(),
                    evaluator: evaluator.to_string(),
                    evaluated: "b@uni.edu".to_string(),
                    score,
                })
                .await
                .unwrap();
        }

        let results = ResultService::new(fx.store.clone(), fx.categories.clone());
        let average = results
            .student_average("b@uni.edu", CATEGORY, false)
            .await
            .unwrap();
        assert_eq!(average.count, 2);
        assert_eq!(average.average, 7.0);
    }

    #[tokio::test]
    async fn test_activity_average_reads_every_assessment() {
        let fx = fixture().await;
        fx.evaluations
            .add_evaluation(NewEvaluation {
                assessment: ASSESSMENT.to_string(),
                evaluator: "a@uni.edu".to_string(),
                evaluated: "b@uni.edu".to_string(),
                score: 3.0,
            })
            .await
            .unwrap();

        let results = ResultService::new(fx.store.clone(), fx.categories.clone());
        let average = results.activity_average("Sprint 1-Proyecto-1001").await.unwrap();
        assert_eq!(average.count, 1);
        assert_eq!(average.average, 3.0);
    }

    #[tokio::test]
    async fn test_averages_and_report() {
        let fx = fixture().await;
        fx.activities
            .add_assessment(
                "Compromiso",
                "Sprint 1-Proyecto-1001",
                Visibility::Private,
                5.0,
            )
            .await
            .unwrap();
        let private = "Compromiso-Sprint 1-Proyecto-1001";

        let ev = &fx.evaluations;
        ev.submit_scores(ASSESSMENT, "a@uni.edu", &[entry("b@uni.edu", 4.0), entry("c@uni.edu", 2.0)])
            .await
            .unwrap();
        ev.submit_scores(ASSESSMENT, "b@uni.edu", &[entry("a@uni.edu", 5.0), entry("c@uni.edu", 3.0)])
            .await
            .unwrap();
        ev.submit_scores(private, "a@uni.edu", &[entry("b@uni.edu", 1.0), entry("c@uni.edu", 1.0)])
            .await
            .unwrap();

        let results = ResultService::new(fx.store.clone(), fx.categories.clone());

        let activity = results.activity_average("Sprint 1-Proyecto-1001").await.unwrap();
        assert_eq!(activity.count, 6);
        assert_eq!(activity.average, 16.0 / 6.0);

        assert_eq!(results.group_average(CATEGORY, 1, false).await.unwrap().count, 6);
        assert_eq!(results.group_average(CATEGORY, 1, true).await.unwrap().count, 4);
        assert_eq!(results.group_average(CATEGORY, 2, false).await.unwrap().average, 0.0);
        assert_eq!(
            results.student_average("c@uni.edu", CATEGORY, false).await.unwrap().average,
            2.0
        );
        // 私有的 Compromiso 给 c 的 1.0 不计入学生视角
        assert_eq!(
            results.student_average("c@uni.edu", CATEGORY, true).await.unwrap().average,
            2.5
        );

        let all = results
            .student_detailed_scores("b@uni.edu", CATEGORY, Some(1), false)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        let public = results
            .student_detailed_scores("b@uni.edu", CATEGORY, Some(1), true)
            .await
            .unwrap();
        assert_eq!(
            public,
            vec![CriterionScore {
                criterion: "Actitud".to_string(),
                average: 4.0
            }]
        );

        let report = results.category_report(CATEGORY).await.unwrap();
        assert_eq!(report.overall_average, 16.0 / 6.0);
        assert_eq!(report.groups.len(), 2);
        let emails: Vec<&str> = report.groups[0]
            .students
            .iter()
            .map(|s| s.email.as_str())
            .collect();
        // a=5.0，b=2.5，c=2.0
        assert_eq!(emails, vec!["a@uni.edu", "b@uni.edu", "c@uni.edu"]);
        assert_eq!(report.groups[1].students[0].average, 0.0);
    }
}

//! 活动与评估标准

mod assessments;

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::EvaluationConfig;
use crate::errors::{PeerEvalError, Result};
use crate::models::activities::{Activity, ActivitySummary, Assessment, Visibility};
use crate::services::{cascade, lookup};
use crate::storage::{Filter, TableStore, TableStoreExt};
use crate::utils::validate::validate_name;

#[derive(Clone)]
pub struct ActivityService {
    store: Arc<dyn TableStore>,
    default_criteria: Vec<String>,
    default_max: f64,
    default_visibility: Visibility,
}

impl ActivityService {
    pub fn new(store: Arc<dyn TableStore>, config: &EvaluationConfig) -> Self {
        let default_visibility = config
            .default_visibility
            .parse::<Visibility>()
            .unwrap_or_else(|e| {
                warn!("{}, falling back to public", e);
                Visibility::Public
            });

        Self {
            store,
            default_criteria: config.default_criteria.clone(),
            default_max: config.default_max,
            default_visibility,
        }
    }

    pub fn default_visibility(&self) -> Visibility {
        self.default_visibility
    }

    pub fn default_max(&self) -> f64 {
        self.default_max
    }

    pub async fn add_activity(&self, name: &str, category: &str) -> Result<Activity> {
        validate_name("Activity name", name).map_err(PeerEvalError::validation)?;
        let category = lookup::require_category(self.store.as_ref(), category).await?;

        let name = name.trim();
        let id = Activity::make_id(name, &category.id);
        if self
            .store
            .row_exists::<Activity>(&Filter::by_id(id.as_str()))
            .await?
        {
            return Err(PeerEvalError::already_exists(format!(
                "Activity {id} already exists"
            )));
        }

        let activity = Activity {
            id,
            name: name.to_string(),
            category: category.id,
        };
        self.store.insert_row(&activity).await?;
        info!("Activity {} created", activity.id);
        Ok(activity)
    }

    pub async fn get_activity(&self, id: &str) -> Result<Activity> {
        lookup::require_activity(self.store.as_ref(), id).await
    }

    /// 每次都从评估标准表重新计算 has_assessment
    pub async fn category_activities(&self, category: &str) -> Result<Vec<ActivitySummary>> {
        let activities = self
            .store
            .read_rows::<Activity>(&Filter::new().eq("category", category))
            .await?;

        let mut summaries = Vec::with_capacity(activities.len());
        for activity in activities {
            let has_assessment = self
                .store
                .row_exists::<Assessment>(&Filter::new().eq("activity", activity.id.as_str()))
                .await?;
            summaries.push(ActivitySummary {
                id: activity.id,
                name: activity.name,
                category: activity.category,
                has_assessment,
            });
        }
        Ok(summaries)
    }

    /// 删除活动及其评估标准与评分
    pub async fn delete_activity(&self, name: &str, category: &str) -> Result<()> {
        let id = Activity::make_id(name, category);
        self.get_activity(&id).await?;
        cascade::delete_activity_tree(self.store.as_ref(), &id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyConfig;
    use crate::services::{CategoryService, CourseService};
    use crate::storage::memory::MemoryTableStore;

    /// 课程 1001、分组方案 Proyecto-1001
    pub(super) async fn setup() -> (Arc<dyn TableStore>, ActivityService) {
        let store: Arc<dyn TableStore> = Arc::new(MemoryTableStore::new());
        CourseService::new(store.clone(), &PolicyConfig::default())
            .add_course(1001, "Moviles", "t@uni.edu")
            .await
            .unwrap();
        CategoryService::new(store.clone())
            .add_category("Proyecto", false, 1001, 3)
            .await
            .unwrap();
        let activities = ActivityService::new(store.clone(), &EvaluationConfig::default());
        (store, activities)
    }

    #[tokio::test]
    async fn test_hyphenated_names_can_share_a_composed_id() {
        let (store, activities) = setup().await;
        CategoryService::new(store.clone())
            .add_category("1-Proyecto", false, 1001, 3)
            .await
            .unwrap();

        let first = activities
            .add_activity("Sprint", "1-Proyecto-1001")
            .await
            .unwrap();
        assert_eq!(first.id, "Sprint-1-Proyecto-1001");

        // "Sprint-1" + "Proyecto-1001" 拼出同一个 id，按重复处理
        let err = activities
            .add_activity("Sprint-1", "Proyecto-1001")
            .await
            .unwrap_err();
        assert!(err.message().contains("already exists"));
    }

    #[tokio::test]
    async fn test_activity_requires_category() {
        let (_, activities) = setup().await;
        let activity = activities
            .add_activity("Sprint 1", "Proyecto-1001")
            .await
            .unwrap();
        assert_eq!(activity.id, "Sprint 1-Proyecto-1001");

        assert!(
            activities
                .add_activity("Sprint 1", "Proyecto-1001")
                .await
                .unwrap_err()
                .message()
                .contains("already exists")
        );
        assert!(
            activities
                .add_activity("Sprint 1", "Nada-1001")
                .await
                .unwrap_err()
                .message()
                .contains("does not exist")
        );
    }

    #[tokio::test]
    async fn test_has_assessment_flag_follows_assessments() {
        let (_, activities) = setup().await;
        activities
            .add_activity("Sprint 1", "Proyecto-1001")
            .await
            .unwrap();

        let listed = activities.category_activities("Proyecto-1001").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(!listed[0].has_assessment);

        activities
            .add_assessment("Actitud", "Sprint 1-Proyecto-1001", Visibility::Public, 5.0)
            .await
            .unwrap();
        assert!(
            activities.category_activities("Proyecto-1001").await.unwrap()[0].has_assessment
        );

        activities
            .delete_assessment("Actitud-Sprint 1-Proyecto-1001")
            .await
            .unwrap();
        assert!(
            !activities.category_activities("Proyecto-1001").await.unwrap()[0].has_assessment
        );
    }

    #[test]
    fn test_bad_default_visibility_falls_back_to_public() {
        let config = EvaluationConfig {
            default_visibility: "secret".to_string(),
            ..EvaluationConfig::default()
        };
        let service = ActivityService::new(Arc::new(MemoryTableStore::new()), &config);
        assert_eq!(service.default_visibility, Visibility::Public);
    }
}

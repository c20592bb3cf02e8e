use tracing::info;

use super::ActivityService;
use crate::errors::{PeerEvalError, Result};
use crate::models::activities::{Assessment, Visibility};
use crate::services::{cascade, lookup};
use crate::storage::{Filter, TableStoreExt};
use crate::utils::validate::validate_name;

impl ActivityService {
    pub async fn add_assessment(
        &self,
        name: &str,
        activity: &str,
        visibility: Visibility,
        max: f64,
    ) -> Result<Assessment> {
        validate_name("Assessment name", name).map_err(PeerEvalError::validation)?;
        if !max.is_finite() || max <= 0.0 {
            return Err(PeerEvalError::validation(
                "Maximum score must be greater than 0",
            ));
        }
        let activity = self.get_activity(activity).await?;

        let name = name.trim();
        let id = Assessment::make_id(name, &activity.id);
        if self
            .store
            .row_exists::<Assessment>(&Filter::by_id(id.as_str()))
            .await?
        {
            return Err(PeerEvalError::already_exists(format!(
                "Assessment {id} already exists"
            )));
        }

        let assessment = Assessment {
            id,
            name: name.to_string(),
            activity: activity.id,
            visibility,
            max,
        };
        self.store.insert_row(&assessment).await?;
        info!("Assessment {} created", assessment.id);
        Ok(assessment)
    }

    /// 用配置的默认可见性和满分创建
    pub async fn add_default_assessment(&self, name: &str, activity: &str) -> Result<Assessment> {
        self.add_assessment(name, activity, self.default_visibility, self.default_max)
            .await
    }

    pub async fn get_assessment(&self, id: &str) -> Result<Assessment> {
        lookup::require_assessment(self.store.as_ref(), id).await
    }

    pub async fn activity_assessments(&self, activity: &str) -> Result<Vec<Assessment>> {
        self.store
            .read_rows::<Assessment>(&Filter::new().eq("activity", activity))
            .await
    }

    /// 创建默认评估标准，已存在的跳过；返回本次新建的部分
    pub async fn initialize_assessments(&self, activity: &str) -> Result<Vec<Assessment>> {
        let activity = self.get_activity(activity).await?;
        let existing: Vec<String> = self
            .activity_assessments(&activity.id)
            .await?
            .into_iter()
            .map(|a| a.name)
            .collect();

        let mut created = Vec::new();
        for criterion in &self.default_criteria {
            if existing.contains(criterion) {
                continue;
            }
            created.push(self.add_default_assessment(criterion, &activity.id).await?);
        }

        info!(
            "Initialized {} default assessments for {}",
            created.len(),
            activity.id
        );
        Ok(created)
    }

    /// 删除评估标准及其评分
    pub async fn delete_assessment(&self, id: &str) -> Result<()> {
        self.get_assessment(id).await?;
        cascade::delete_assessment_tree(self.store.as_ref(), id).await
    }
}

//! 按 id 取记录，不存在时返回 "does not exist"

use crate::errors::{PeerEvalError, Result};
use crate::models::activities::{Activity, Assessment};
use crate::models::categories::Category;
use crate::models::courses::Course;
use crate::storage::{Filter, TableStore, TableStoreExt};

pub async fn require_course(store: &dyn TableStore, nrc: i64) -> Result<Course> {
    store
        .find_row::<Course>(&Filter::new().eq("nrc", nrc))
        .await?
        .ok_or_else(|| PeerEvalError::not_found(format!("Course {nrc} does not exist")))
}

pub async fn require_category(store: &dyn TableStore, id: &str) -> Result<Category> {
    store
        .find_row::<Category>(&Filter::by_id(id))
        .await?
        .ok_or_else(|| PeerEvalError::not_found(format!("Category {id} does not exist")))
}

pub async fn require_activity(store: &dyn TableStore, id: &str) -> Result<Activity> {
    store
        .find_row::<Activity>(&Filter::by_id(id))
        .await?
        .ok_or_else(|| PeerEvalError::not_found(format!("Activity {id} does not exist")))
}

pub async fn require_assessment(store: &dyn TableStore, id: &str) -> Result<Assessment> {
    store
        .find_row::<Assessment>(&Filter::by_id(id))
        .await?
        .ok_or_else(|| PeerEvalError::not_found(format!("Assessment {id} does not exist")))
}

/// 评估标准所属的活动与分组方案
pub async fn assessment_context(
    store: &dyn TableStore,
    id: &str,
) -> Result<(Assessment, Activity, Category)> {
    let assessment = require_assessment(store, id).await?;
    let activity = require_activity(store, &assessment.activity).await?;
    let category = require_category(store, &activity.category).await?;
    Ok((assessment, activity, category))
}

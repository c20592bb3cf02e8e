//! 自上而下的级联删除
//!
//! 课程 → 选课记录、分组方案；分组方案 → 组成员、活动；活动 → 评估标准；评估标准 → 评分。
//! 每一步都是独立的存储调用，中途失败时已删除的部分不会恢复。

use serde_json::json;
use tracing::info;

use crate::errors::Result;
use crate::models::activities::{Activity, Assessment};
use crate::models::categories::{Category, GroupMembership};
use crate::models::courses::{Course, Enrollment};
use crate::models::evaluations::Evaluation;
use crate::storage::{Filter, TableStore, TableStoreExt};

pub async fn delete_assessment_tree(store: &dyn TableStore, assessment_id: &str) -> Result<()> {
    store.delete_rows::<Evaluation>("assessment", json!(assessment_id)).await?;
    store.delete_rows::<Assessment>("id", json!(assessment_id)).await?;
    info!("Deleted assessment {} with its evaluations", assessment_id);
    Ok(())
}

pub async fn delete_activity_tree(store: &dyn TableStore, activity_id: &str) -> Result<()> {
    let assessments = store
        .read_rows::<Assessment>(&Filter::new().eq("activity", activity_id))
        .await?;
    for assessment in assessments {
        delete_assessment_tree(store, &assessment.id).await?;
    }
    store.delete_rows::<Activity>("id", json!(activity_id)).await?;
    info!("Deleted activity {}", activity_id);
    Ok(())
}

pub async fn delete_category_tree(store: &dyn TableStore, category_id: &str) -> Result<()> {
    let activities = store
        .read_rows::<Activity>(&Filter::new().eq("category", category_id))
        .await?;
    for activity in activities {
        delete_activity_tree(store, &activity.id).await?;
    }
    store.delete_rows::<GroupMembership>("category", json!(category_id)).await?;
    store.delete_rows::<Category>("id", json!(category_id)).await?;
    info!("Deleted category {}", category_id);
    Ok(())
}

pub async fn delete_course_tree(store: &dyn TableStore, nrc: i64) -> Result<()> {
    let categories = store
        .read_rows::<Category>(&Filter::new().eq("nrc", nrc))
        .await?;
    for category in categories {
        delete_category_tree(store, &category.id).await?;
    }
    store.delete_rows::<Enrollment>("nrc", json!(nrc)).await?;
    store.delete_rows::<Course>("nrc", json!(nrc)).await?;
    info!("Deleted course {}", nrc);
    Ok(())
}

//! HTTP 路由层
//!
//! 处理函数只做参数提取和访问控制，业务逻辑在 `services` 中。
//! 服务返回的 `PeerEvalError` 经 `?` 转成统一的 `ApiResponse` 错误响应。

pub mod activities;
pub mod assessments;
pub mod auth;
pub mod categories;
pub mod courses;
pub mod evaluations;
pub mod results;
pub mod system;

pub use activities::configure_activities_routes;
pub use assessments::configure_assessments_routes;
pub use auth::configure_auth_routes;
pub use categories::configure_categories_routes;
pub use courses::configure_courses_routes;
pub use evaluations::configure_evaluations_routes;
pub use results::configure_results_routes;
pub use system::configure_system_routes;

use crate::errors::Result;
use crate::models::activities::{Activity, Assessment};
use crate::models::categories::Category;
use crate::models::courses::CourseRole;
use crate::services::lookup;
use crate::state::AppState;

/// 分组方案及当前用户在其课程中的身份
pub(crate) async fn category_access(
    state: &AppState,
    category: &str,
    email: &str,
) -> Result<(Category, CourseRole)> {
    let category = state.categories.get_category(category).await?;
    let role = state.courses.require_member(category.nrc, email).await?;
    Ok((category, role))
}

pub(crate) async fn activity_access(
    state: &AppState,
    activity: &str,
    email: &str,
) -> Result<(Activity, Category, CourseRole)> {
    let activity = state.activities.get_activity(activity).await?;
    let (category, role) = category_access(state, &activity.category, email).await?;
    Ok((activity, category, role))
}

pub(crate) async fn assessment_access(
    state: &AppState,
    assessment: &str,
    email: &str,
) -> Result<(Assessment, Category, CourseRole)> {
    let (assessment, _, category) =
        lookup::assessment_context(state.store.as_ref(), assessment).await?;
    let role = state.courses.require_member(category.nrc, email).await?;
    Ok((assessment, category, role))
}

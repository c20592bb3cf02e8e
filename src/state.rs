//! 应用共享状态
//!
//! 启动时构造一次，通过 `web::Data<AppState>` 注入所有处理函数。

use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::config::AppConfig;
use crate::models::AppStartTime;
use crate::services::{
    ActivityService, AuthService, CategoryService, CourseService, EvaluationService,
    ResultService,
};
use crate::storage::TableStore;
use crate::utils::jwt::JwtUtils;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TableStore>,
    pub cache: Arc<dyn ObjectCache>,
    pub start_time: AppStartTime,
    pub auth: AuthService,
    pub courses: CourseService,
    pub categories: CategoryService,
    pub activities: ActivityService,
    pub evaluations: EvaluationService,
    pub results: ResultService,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn TableStore>,
        cache: Arc<dyn ObjectCache>,
    ) -> Self {
        let jwt = Arc::new(JwtUtils::new(&config.jwt, config.is_production()));
        let categories = CategoryService::new(store.clone());

        Self {
            auth: AuthService::new(store.clone(), cache.clone(), jwt, config.argon2.clone()),
            courses: CourseService::new(store.clone(), &config.policy),
            activities: ActivityService::new(store.clone(), &config.evaluation),
            evaluations: EvaluationService::new(store.clone(), categories.clone()),
            results: ResultService::new(store.clone(), categories.clone()),
            categories,
            start_time: AppStartTime {
                start_datetime: chrono::Utc::now(),
            },
            store,
            cache,
        }
    }
}

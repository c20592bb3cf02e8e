//! 分组方案与组成员

mod groups;

use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::info;

use crate::errors::{PeerEvalError, Result};
use crate::models::categories::{Category, GroupMembership};
use crate::models::courses::Enrollment;
use crate::services::{cascade, lookup};
use crate::storage::{Filter, TableStore, TableStoreExt};
use crate::utils::validate::validate_name;

#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn TableStore>,
}

/// 按顺序每 `max` 人一组
pub fn deal_groups(students: &[String], max: usize) -> Vec<Vec<String>> {
    students.chunks(max.max(1)).map(|c| c.to_vec()).collect()
}

impl CategoryService {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// 创建分组方案；random 时立即把已选课学生随机分组
    pub async fn add_category(
        &self,
        name: &str,
        random: bool,
        nrc: i64,
        max: i64,
    ) -> Result<Category> {
        validate_name("Category name", name).map_err(PeerEvalError::validation)?;
        if max < 1 {
            return Err(PeerEvalError::validation(
                "Group size must be at least 1",
            ));
        }
        lookup::require_course(self.store.as_ref(), nrc).await?;

        let name = name.trim();
        let id = Category::make_id(name, nrc);
        if self.find_category(&id).await?.is_some() {
            return Err(PeerEvalError::already_exists(format!(
                "Category {id} already exists"
            )));
        }

        let category = Category {
            id,
            name: name.to_string(),
            random,
            nrc,
            max,
        };
        self.store.insert_row(&category).await?;
        info!("Category {} created in course {}", category.id, nrc);

        if random {
            let mut students: Vec<String> = self
                .store
                .read_rows::<Enrollment>(&Filter::new().eq("nrc", nrc))
                .await?
                .into_iter()
                .map(|e| e.email)
                .collect();
            students.shuffle(&mut rand::rng());

            let category_id = category.id.as_str();
            let memberships: Vec<GroupMembership> = deal_groups(&students, max as usize)
                .iter()
                .enumerate()
                .flat_map(|(index, members)| {
                    members.iter().map(move |student| {
                        GroupMembership::new(index as i64 + 1, category_id, student)
                    })
                })
                .collect();

            if !memberships.is_empty() {
                self.store.insert_rows(&memberships).await?;
            }
            info!(
                "Dealt {} students into groups of {} for {}",
                students.len(),
                max,
                category.id
            );
        }

        Ok(category)
    }

    pub async fn find_category(&self, id: &str) -> Result<Option<Category>> {
        self.store.find_row::<Category>(&Filter::by_id(id)).await
    }

    pub async fn get_category(&self, id: &str) -> Result<Category> {
        lookup::require_category(self.store.as_ref(), id).await
    }

    pub async fn course_categories(&self, nrc: i64) -> Result<Vec<Category>> {
        self.store
            .read_rows::<Category>(&Filter::new().eq("nrc", nrc))
            .await
    }

    /// 删除分组方案及其组成员、活动
    pub async fn delete_category(&self, id: &str) -> Result<()> {
        self.get_category(id).await?;
        cascade::delete_category_tree(self.store.as_ref(), id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyConfig;
    use crate::services::CourseService;
    use crate::storage::memory::MemoryTableStore;

    pub(super) async fn setup(students: &[&str]) -> (CourseService, CategoryService) {
        let store: Arc<dyn TableStore> = Arc::new(MemoryTableStore::new());
        let courses = CourseService::new(store.clone(), &PolicyConfig::default());
        courses.add_course(1001, "Moviles", "t@uni.edu").await.unwrap();
        for student in students {
            courses.enroll_student(student, 1001).await.unwrap();
        }
        (courses, CategoryService::new(store))
    }

    #[test]
    fn test_deal_groups_fills_in_order() {
        let students: Vec<String> = (1..=7).map(|i| format!("s{i}")).collect();
        let groups = deal_groups(&students, 3);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0], vec!["s1", "s2", "s3"]);
        assert_eq!(groups[2], vec!["s7"]);
        assert!(deal_groups(&[], 3).is_empty());
    }

    #[tokio::test]
    async fn test_random_category_deals_every_student() {
        let (_, categories) = setup(&[
            "a@uni.edu", "b@uni.edu", "c@uni.edu", "d@uni.edu", "e@uni.edu",
        ])
        .await;

        let category = categories
            .add_category("Proyecto", true, 1001, 2)
            .await
            .unwrap();
        assert_eq!(category.id, "Proyecto-1001");

        let groups = categories.category_groups(&category.id).await.unwrap();
        assert_eq!(
            groups.iter().map(|g| g.number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(
            groups.iter().map(|g| g.members.len()).collect::<Vec<_>>(),
            vec![2, 2, 1]
        );
        let mut everyone: Vec<String> = groups.into_iter().flat_map(|g| g.members).collect();
        everyone.sort();
        assert_eq!(everyone.len(), 5);
        everyone.dedup();
        assert_eq!(everyone.len(), 5);
    }

    #[tokio::test]
    async fn test_category_validation() {
        let (_, categories) = setup(&[]).await;
        assert_eq!(
            categories
                .add_category("Proyecto", false, 1001, 0)
                .await
                .unwrap_err()
                .code(),
            "E007"
        );
        assert_eq!(
            categories
                .add_category("Proyecto", false, 4242, 3)
                .await
                .unwrap_err()
                .code(),
            "E008"
        );

        categories
            .add_category("Proyecto", false, 1001, 3)
            .await
            .unwrap();
        assert!(
            categories
                .add_category("Proyecto", false, 1001, 3)
                .await
                .unwrap_err()
                .message()
                .contains("already exists")
        );
        assert_eq!(categories.course_categories(1001).await.unwrap().len(), 1);
    }
}

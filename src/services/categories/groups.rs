use std::collections::BTreeMap;

use serde_json::json;
use tracing::{debug, info};

use super::CategoryService;
use crate::errors::{PeerEvalError, Result};
use crate::models::categories::{Category, Group, GroupMembership};
use crate::models::courses::Enrollment;
use crate::storage::{Filter, TableRow, TableStoreExt};

impl CategoryService {
    async fn memberships(&self, filter: Filter) -> Result<Vec<GroupMembership>> {
        self.store.read_rows::<GroupMembership>(&filter).await
    }

    /// 按组号聚合成员，组号升序，成员按邮箱排序
    pub async fn category_groups(&self, category: &str) -> Result<Vec<Group>> {
        self.get_category(category).await?;

        let mut groups: BTreeMap<i64, Vec<String>> = BTreeMap::new();
        for membership in self
            .memberships(Filter::new().eq("category", category))
            .await?
        {
            groups
                .entry(membership.number)
                .or_default()
                .push(membership.student);
        }

        Ok(groups
            .into_iter()
            .map(|(number, mut members)| {
                members.sort();
                members.dedup();
                Group { number, members }
            })
            .collect())
    }

    pub async fn group_members(&self, category: &str, number: i64) -> Result<Vec<String>> {
        let mut members: Vec<String> = self
            .memberships(
                Filter::new()
                    .eq("category", category)
                    .eq("number", number),
            )
            .await?
            .into_iter()
            .map(|m| m.student)
            .collect();
        members.sort();
        members.dedup();
        Ok(members)
    }

    async fn ensure_capacity(&self, category: &Category, number: i64) -> Result<()> {
        let count = self.group_members(&category.id, number).await?.len() as i64;
        if count >= category.max {
            return Err(PeerEvalError::group_full(format!(
                "Group {number} of {} already has {} members",
                category.id, category.max
            )));
        }
        Ok(())
    }

    pub async fn add_member(
        &self,
        number: i64,
        category: &str,
        student: &str,
    ) -> Result<GroupMembership> {
        if number < 1 {
            return Err(PeerEvalError::validation("Group number must be at least 1"));
        }
        let category = self.get_category(category).await?;

        let enrolled = self
            .store
            .row_exists::<Enrollment>(&Filter::by_id(Enrollment::make_id(student, category.nrc)))
            .await?;
        if !enrolled {
            return Err(PeerEvalError::not_found(format!(
                "Student {student} does not exist in course {}",
                category.nrc
            )));
        }

        if let Some(current) = self.student_group(&category.id, student).await? {
            return Err(PeerEvalError::already_exists(format!(
                "Student {student} already exists in group {current} of {}",
                category.id
            )));
        }
        self.ensure_capacity(&category, number).await?;

        let membership = GroupMembership::new(number, &category.id, student);
        self.store.insert_row(&membership).await?;
        info!("Student {} joined group {} of {}", student, number, category.id);
        Ok(membership)
    }

    pub async fn remove_member(&self, number: i64, category: &str, student: &str) -> Result<()> {
        let id = GroupMembership::new(number, category, student).id;
        if !self
            .store
            .row_exists::<GroupMembership>(&Filter::by_id(id.as_str()))
            .await?
        {
            return Err(PeerEvalError::not_found(format!(
                "Student {student} does not exist in group {number} of {category}"
            )));
        }

        self.store
            .delete(GroupMembership::TABLE, "id", &json!(id))
            .await?;
        info!("Student {} left group {} of {}", student, number, category);
        Ok(())
    }

    /// 先校验目标组容量再移除，移除与加入之间不保证原子性
    pub async fn move_member(
        &self,
        student: &str,
        category: &str,
        from: i64,
        to: i64,
    ) -> Result<GroupMembership> {
        if to < 1 {
            return Err(PeerEvalError::validation("Group number must be at least 1"));
        }
        let category_row = self.get_category(category).await?;
        if from == to {
            return Err(PeerEvalError::validation(format!(
                "Student {student} is already in group {to}"
            )));
        }
        self.ensure_capacity(&category_row, to).await?;

        self.remove_member(from, category, student).await?;
        self.add_member(to, category, student).await
    }

    /// 逐个加入，遇到第一个失败即停止
    pub async fn create_manual_group(
        &self,
        category: &str,
        number: i64,
        students: &[String],
    ) -> Result<Group> {
        for student in students {
            self.add_member(number, category, student).await?;
        }
        Ok(Group {
            number,
            members: self.group_members(category, number).await?,
        })
    }

    pub async fn student_group(&self, category: &str, student: &str) -> Result<Option<i64>> {
        let number = self
            .memberships(
                Filter::new()
                    .eq("category", category)
                    .eq("student", student),
            )
            .await?
            .into_iter()
            .map(|m| m.number)
            .min();
        debug!("Student {} in {}: group {:?}", student, category, number);
        Ok(number)
    }

    pub async fn is_student_in_group(&self, category: &str, student: &str) -> Result<bool> {
        Ok(self.student_group(category, student).await?.is_some())
    }

    /// 同组其他成员
    pub async fn teammates(&self, category: &str, number: i64, student: &str) -> Result<Vec<String>> {
        Ok(self
            .group_members(category, number)
            .await?
            .into_iter()
            .filter(|member| member != student)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::setup;

    #[tokio::test]
    async fn test_membership_rules() {
        let (_, categories) = setup(&["a@uni.edu", "b@uni.edu", "c@uni.edu"]).await;
        categories
            .add_category("Taller", false, 1001, 2)
            .await
            .unwrap();
        let id = "Taller-1001";

        categories.add_member(1, id, "b@uni.edu").await.unwrap();
        categories.add_member(1, id, "a@uni.edu").await.unwrap();

        let err = categories.add_member(1, id, "c@uni.edu").await.unwrap_err();
        assert_eq!(err.code(), "E016");

        let err = categories.add_member(2, id, "a@uni.edu").await.unwrap_err();
        assert!(err.message().contains("already exists"));

        let err = categories.add_member(2, id, "z@uni.edu").await.unwrap_err();
        assert_eq!(err.code(), "E008");

        assert_eq!(categories.add_member(0, id, "c@uni.edu").await.unwrap_err().code(), "E007");

        assert_eq!(
            categories.group_members(id, 1).await.unwrap(),
            vec!["a@uni.edu", "b@uni.edu"]
        );
        assert_eq!(
            categories.teammates(id, 1, "a@uni.edu").await.unwrap(),
            vec!["b@uni.edu"]
        );
        assert_eq!(categories.student_group(id, "a@uni.edu").await.unwrap(), Some(1));
        assert!(!categories.is_student_in_group(id, "c@uni.edu").await.unwrap());
    }

    #[tokio::test]
    async fn test_move_and_remove() {
        let (_, categories) = setup(&["a@uni.edu", "b@uni.edu", "c@uni.edu"]).await;
        categories
            .add_category("Taller", false, 1001, 1)
            .await
            .unwrap();
        let id = "Taller-1001";
        categories.add_member(1, id, "a@uni.edu").await.unwrap();
        categories.add_member(2, id, "b@uni.edu").await.unwrap();

        // 目标组已满，原成员关系保持不变
        let err = categories
            .move_member("a@uni.edu", id, 1, 2)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E016");
        assert_eq!(categories.student_group(id, "a@uni.edu").await.unwrap(), Some(1));

        categories.move_member("a@uni.edu", id, 1, 3).await.unwrap();
        let groups = categories.category_groups(id).await.unwrap();
        assert_eq!(
            groups.iter().map(|g| g.number).collect::<Vec<_>>(),
            vec![2, 3]
        );

        categories.remove_member(3, id, "a@uni.edu").await.unwrap();
        assert!(
            categories
                .remove_member(3, id, "a@uni.edu")
                .await
                .unwrap_err()
                .message()
                .contains("does not exist")
        );
    }

    #[tokio::test]
    async fn test_manual_group_and_category_cascade() {
        let (_, categories) = setup(&["a@uni.edu", "b@uni.edu"]).await;
        categories
            .add_category("Taller", false, 1001, 4)
            .await
            .unwrap();
        let id = "Taller-1001";

        let group = categories
            .create_manual_group(id, 5, &["b@uni.edu".to_string(), "a@uni.edu".to_string()])
            .await
            .unwrap();
        assert_eq!(group.number, 5);
        assert_eq!(group.members, vec!["a@uni.edu", "b@uni.edu"]);

        categories.delete_category(id).await.unwrap();
        assert_eq!(categories.get_category(id).await.unwrap_err().code(), "E008");
        assert_eq!(categories.student_group(id, "a@uni.edu").await.unwrap(), None);
    }
}

//! In-memory store standing in for a real database.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, Task, TaskPatch, TaskStore, User, UserStore};

/// Process-local store. Every mutation takes the write lock, so two requests
/// racing on the same user's records cannot lose updates.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        // uniqueness check and insert under one lock
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        users.insert(user.id, user);
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert(&self, task: Task) -> Result<(), StoreError> {
        self.tasks.write().await.insert(task.id, task);
        Ok(())
    }

    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.read().await;
        let mut items: Vec<Task> = tasks
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        // newest first, id as tiebreak so the order is total
        items.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(items)
    }

    async fn find_by_id_and_owner(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Task>, StoreError> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(&id).filter(|t| t.user_id == user_id).cloned())
    }

    async fn update(&self, id: Uuid, user_id: Uuid, patch: TaskPatch) -> Result<Task, StoreError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(&id)
            .filter(|t| t.user_id == user_id)
            .ok_or(StoreError::NotFound)?;

        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        task.updated_at = OffsetDateTime::now_utc();

        Ok(task.clone())
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), StoreError> {
        let mut tasks = self.tasks.write().await;
        match tasks.get(&id) {
            Some(t) if t.user_id == user_id => {
                tasks.remove(&id);
                Ok(())
            }
            _ => Err(StoreError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Priority;

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test".into(),
            email: email.into(),
            password_hash: "$argon2id$fake".into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn task(user_id: Uuid, title: &str, created_at: OffsetDateTime) -> Task {
        Task {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            description: String::new(),
            priority: Priority::Medium,
            completed: false,
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_and_leaves_one_record() {
        let store = MemoryStore::new();
        UserStore::insert(&store, user("a@example.com"))
            .await
            .expect("first insert");
        let err = UserStore::insert(&store, user("a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
        assert_eq!(store.users.read().await.len(), 1);
    }

    #[tokio::test]
    async fn email_match_is_case_sensitive() {
        let store = MemoryStore::new();
        UserStore::insert(&store, user("a@example.com"))
            .await
            .expect("insert");
        let found = store.find_by_email("A@example.com").await.expect("lookup");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn list_is_owner_scoped_and_newest_first() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();

        let older = task(alice, "older", now - time::Duration::minutes(2));
        let newer = task(alice, "newer", now);
        let other = task(bob, "bob's", now);
        TaskStore::insert(&store, older.clone()).await.unwrap();
        TaskStore::insert(&store, newer.clone()).await.unwrap();
        TaskStore::insert(&store, other).await.unwrap();

        let listed = store.list_by_owner(alice).await.expect("list");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
    }

    #[tokio::test]
    async fn cross_owner_update_and_delete_report_not_found() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let t = task(alice, "mine", OffsetDateTime::now_utc());
        TaskStore::insert(&store, t.clone()).await.unwrap();

        let err = store.update(t.id, bob, TaskPatch::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));

        let err = store.delete(t.id, bob).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));

        // the record survived both attempts
        let found = store.find_by_id_and_owner(t.id, alice).await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn update_merges_fields_and_refreshes_updated_at() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let created = OffsetDateTime::now_utc() - time::Duration::seconds(5);
        let t = task(alice, "write tests", created);
        TaskStore::insert(&store, t.clone()).await.unwrap();

        let patch = TaskPatch {
            completed: Some(true),
            ..TaskPatch::default()
        };
        let updated = store.update(t.id, alice, patch).await.expect("update");

        assert!(updated.completed);
        assert_eq!(updated.title, "write tests");
        assert_eq!(updated.created_at, created);
        assert!(updated.updated_at > created);
    }

    #[tokio::test]
    async fn delete_removes_only_the_matched_record() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let keep = task(alice, "keep", OffsetDateTime::now_utc());
        let gone = task(alice, "drop", OffsetDateTime::now_utc());
        TaskStore::insert(&store, keep.clone()).await.unwrap();
        TaskStore::insert(&store, gone.clone()).await.unwrap();

        store.delete(gone.id, alice).await.expect("delete");

        let listed = store.list_by_owner(alice).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, keep.id);
    }
}

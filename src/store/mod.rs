pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Credential record. Immutable after signup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Partial update merged over an existing task; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("record not found")]
    NotFound,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user. Fails with `DuplicateEmail` when the email is
    /// already registered (exact, case-sensitive match).
    async fn insert(&self, user: User) -> Result<(), StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
}

/// Owner-scoped task storage. Every lookup that can mutate or remove a record
/// matches on (id, owner) jointly, so a task belonging to someone else is
/// indistinguishable from a task that does not exist.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, task: Task) -> Result<(), StoreError>;

    /// Tasks owned by `user_id`, newest first.
    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError>;

    async fn find_by_id_and_owner(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Task>, StoreError>;

    /// Applies `patch` over the record found by (id, owner) and refreshes
    /// `updated_at`, whether or not any field changed.
    async fn update(&self, id: Uuid, user_id: Uuid, patch: TaskPatch) -> Result<Task, StoreError>;

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), StoreError>;
}

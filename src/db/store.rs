//! Persistence interface shared by the SQLite repository and the in-memory store.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{AuditLog, Message, RevisionInfo, Role, Task, User};

/// CRUD access to every record kind plus a global revision counter.
///
/// Every write to users, roles, tasks or messages increments the revision.
/// Audit log writes do not. Updates are last-write-wins.
#[async_trait]
pub trait Store: Send + Sync {
    async fn revision_info(&self) -> Result<RevisionInfo, AppError>;

    async fn revision_id(&self) -> Result<i64, AppError> {
        Ok(self.revision_info().await?.revision_id)
    }

    /// All users ordered by full name.
    async fn list_users(&self) -> Result<Vec<User>, AppError>;
    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn insert_user(&self, user: &User) -> Result<(), AppError>;
    /// Fails with `NotFound` if the user does not exist.
    async fn update_user(&self, user: &User) -> Result<(), AppError>;
    /// Returns false if nothing was deleted.
    async fn delete_user(&self, id: &str) -> Result<bool, AppError>;

    /// All roles ordered by name.
    async fn list_roles(&self) -> Result<Vec<Role>, AppError>;
    async fn insert_role(&self, role: &Role) -> Result<(), AppError>;

    /// All tasks, newest first.
    async fn list_tasks(&self) -> Result<Vec<Task>, AppError>;
    async fn get_task(&self, id: &str) -> Result<Option<Task>, AppError>;
    async fn insert_task(&self, task: &Task) -> Result<(), AppError>;
    /// Fails with `NotFound` if the task does not exist.
    async fn update_task(&self, task: &Task) -> Result<(), AppError>;

    /// All messages, oldest first.
    async fn list_messages(&self) -> Result<Vec<Message>, AppError>;
    async fn insert_message(&self, message: &Message) -> Result<(), AppError>;

    /// All audit entries, newest first.
    async fn list_audit_logs(&self) -> Result<Vec<AuditLog>, AppError>;
    async fn insert_audit_log(&self, log: &AuditLog) -> Result<(), AppError>;

    /// Wipe every collection and replace roles and users with the given records.
    async fn reset(&self, roles: &[Role], users: &[User]) -> Result<(), AppError>;
}

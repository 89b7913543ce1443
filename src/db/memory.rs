//! In-process store with the same semantics as the SQLite repository.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::Store;
use crate::errors::AppError;
use crate::models::{AuditLog, Message, RevisionInfo, Role, Task, User};

#[derive(Default)]
struct Collections {
    revision_id: i64,
    generated_at: String,
    users: Vec<User>,
    roles: Vec<Role>,
    tasks: Vec<Task>,
    messages: Vec<Message>,
    audit_logs: Vec<AuditLog>,
}

impl Collections {
    fn bump(&mut self) {
        self.revision_id += 1;
        self.generated_at = Utc::now().to_rfc3339();
    }
}

/// Store kept entirely in memory. Records are lost when it is dropped.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Collections {
                generated_at: Utc::now().to_rfc3339(),
                ..Default::default()
            }),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn revision_info(&self) -> Result<RevisionInfo, AppError> {
        let data = self.inner.read().await;
        Ok(RevisionInfo {
            revision_id: data.revision_id,
            generated_at: data.generated_at.clone(),
        })
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let mut users = self.inner.read().await.users.clone();
        users.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(users)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let data = self.inner.read().await;
        Ok(data.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let data = self.inner.read().await;
        Ok(data.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let mut data = self.inner.write().await;
        if data.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Validation(format!(
                "Email {} is already registered",
                user.email
            )));
        }
        data.users.push(user.clone());
        data.bump();
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), AppError> {
        let mut data = self.inner.write().await;
        let slot = data
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| AppError::NotFound(format!("Staff member {} not found", user.id)))?;
        *slot = user.clone();
        data.bump();
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<bool, AppError> {
        let mut data = self.inner.write().await;
        let before = data.users.len();
        data.users.retain(|u| u.id != id);
        if data.users.len() == before {
            return Ok(false);
        }
        data.bump();
        Ok(true)
    }

    async fn list_roles(&self) -> Result<Vec<Role>, AppError> {
        let mut roles = self.inner.read().await.roles.clone();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn insert_role(&self, role: &Role) -> Result<(), AppError> {
        let mut data = self.inner.write().await;
        data.roles.push(role.clone());
        data.bump();
        Ok(())
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, AppError> {
        let data = self.inner.read().await;
        Ok(data.tasks.iter().rev().cloned().collect())
    }

    async fn get_task(&self, id: &str) -> Result<Option<Task>, AppError> {
        let data = self.inner.read().await;
        Ok(data.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn insert_task(&self, task: &Task) -> Result<(), AppError> {
        let mut data = self.inner.write().await;
        data.tasks.push(task.clone());
        data.bump();
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> Result<(), AppError> {
        let mut data = self.inner.write().await;
        let slot = data
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| AppError::NotFound(format!("Task {} not found", task.id)))?;
        *slot = task.clone();
        data.bump();
        Ok(())
    }

    async fn list_messages(&self) -> Result<Vec<Message>, AppError> {
        Ok(self.inner.read().await.messages.clone())
    }

    async fn insert_message(&self, message: &Message) -> Result<(), AppError> {
        let mut data = self.inner.write().await;
        data.messages.push(message.clone());
        data.bump();
        Ok(())
    }

    async fn list_audit_logs(&self) -> Result<Vec<AuditLog>, AppError> {
        let data = self.inner.read().await;
        Ok(data.audit_logs.iter().rev().cloned().collect())
    }

    async fn insert_audit_log(&self, log: &AuditLog) -> Result<(), AppError> {
        self.inner.write().await.audit_logs.push(log.clone());
        Ok(())
    }

    async fn reset(&self, roles: &[Role], users: &[User]) -> Result<(), AppError> {
        let mut data = self.inner.write().await;
        data.messages.clear();
        data.tasks.clear();
        data.audit_logs.clear();
        data.roles = roles.to_vec();
        data.users = users.to_vec();
        data.bump();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccessLevel;

    fn user(id: &str, name: &str, email: &str) -> User {
        User {
            id: id.to_string(),
            full_name: name.to_string(),
            email: email.to_string(),
            password: "pw".to_string(),
            access_level: AccessLevel::Staff,
            role: None,
            job_title: None,
            avatar_url: String::new(),
            status: "Active".to_string(),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    #[tokio::test]
    async fn test_writes_bump_revision() {
        let store = MemoryStore::new();
        assert_eq!(store.revision_id().await.unwrap(), 0);

        store.insert_user(&user("u1", "Zed", "z@x.io")).await.unwrap();
        store.insert_user(&user("u2", "Amy", "a@x.io")).await.unwrap();
        assert_eq!(store.revision_id().await.unwrap(), 2);

        let names: Vec<_> = store
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.full_name)
            .collect();
        assert_eq!(names, vec!["Amy", "Zed"]);

        assert!(store.delete_user("u1").await.unwrap());
        assert!(!store.delete_user("u1").await.unwrap());
        assert_eq!(store.revision_id().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store.insert_user(&user("u1", "A", "a@x.io")).await.unwrap();
        let err = store
            .insert_user(&user("u2", "B", "a@x.io"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_audit_log_does_not_bump_revision() {
        let store = MemoryStore::new();
        store
            .insert_audit_log(&AuditLog {
                id: "l1".to_string(),
                action: "Seeded".to_string(),
                details: None,
                actor_id: None,
                created_at: Utc::now().to_rfc3339(),
            })
            .await
            .unwrap();
        assert_eq!(store.revision_id().await.unwrap(), 0);
        assert_eq!(store.list_audit_logs().await.unwrap().len(), 1);
    }
}

//! SQLite repository for CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Row, SqlitePool};

use super::Store;
use crate::errors::AppError;
use crate::models::{
    AccessLevel, AuditLog, Message, Priority, ProofStatus, RevisionInfo, Role, Task, TaskStatus,
    User,
};

const USER_COLUMNS: &str = "id, full_name, email, password, access_level, role, job_title, avatar_url, status, created_at";
const TASK_COLUMNS: &str = "id, title, description, status, priority, due_date, assigned_to, proof_url, proof_status, created_by, created_at, updated_at";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Bump the revision inside the caller's transaction.
async fn bump_revision(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
        .bind(&now)
        .execute(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl Store for Repository {
    async fn revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    async fn revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    // ==================== USER OPERATIONS ====================

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users ORDER BY full_name",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO users (id, full_name, email, password, access_level, role, job_title, avatar_url, status, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.access_level.as_str())
        .bind(&user.role)
        .bind(&user.job_title)
        .bind(&user.avatar_url)
        .bind(&user.status)
        .bind(&user.created_at)
        .execute(&mut *tx)
        .await?;

        bump_revision(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE users SET full_name = ?, email = ?, password = ?, access_level = ?, role = ?, job_title = ?, avatar_url = ?, status = ? WHERE id = ?"
        )
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.access_level.as_str())
        .bind(&user.role)
        .bind(&user.job_title)
        .bind(&user.avatar_url)
        .bind(&user.status)
        .bind(&user.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Staff member {} not found", user.id)));
        }

        bump_revision(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        bump_revision(&mut tx).await?;
        tx.commit().await?;
        Ok(true)
    }

    // ==================== ROLE OPERATIONS ====================

    async fn list_roles(&self) -> Result<Vec<Role>, AppError> {
        let rows = sqlx::query("SELECT id, name, color FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(role_from_row).collect())
    }

    async fn insert_role(&self, role: &Role) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO roles (id, name, color) VALUES (?, ?, ?)")
            .bind(&role.id)
            .bind(&role.name)
            .bind(&role.color)
            .execute(&mut *tx)
            .await?;

        bump_revision(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    // ==================== TASK OPERATIONS ====================

    async fn list_tasks(&self) -> Result<Vec<Task>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM tasks ORDER BY created_at DESC, rowid DESC",
            TASK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(task_from_row).collect())
    }

    async fn get_task(&self, id: &str) -> Result<Option<Task>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(task_from_row))
    }

    async fn insert_task(&self, task: &Task) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO tasks (id, title, description, status, priority, due_date, assigned_to, proof_url, proof_status, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(&task.due_date)
        .bind(&task.assigned_to)
        .bind(&task.proof_url)
        .bind(task.proof_status.as_str())
        .bind(&task.created_by)
        .bind(&task.created_at)
        .bind(&task.updated_at)
        .execute(&mut *tx)
        .await?;

        bump_revision(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE tasks SET title = ?, description = ?, status = ?, priority = ?, due_date = ?, assigned_to = ?, proof_url = ?, proof_status = ?, updated_at = ? WHERE id = ?"
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(&task.due_date)
        .bind(&task.assigned_to)
        .bind(&task.proof_url)
        .bind(task.proof_status.as_str())
        .bind(&task.updated_at)
        .bind(&task.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Task {} not found", task.id)));
        }

        bump_revision(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    // ==================== MESSAGE OPERATIONS ====================

    async fn list_messages(&self) -> Result<Vec<Message>, AppError> {
        let rows = sqlx::query(
            "SELECT id, content, sender_id, channel_id, created_at FROM messages ORDER BY created_at, rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(message_from_row).collect())
    }

    async fn insert_message(&self, message: &Message) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO messages (id, content, sender_id, channel_id, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&message.id)
        .bind(&message.content)
        .bind(&message.sender_id)
        .bind(&message.channel_id)
        .bind(&message.created_at)
        .execute(&mut *tx)
        .await?;

        bump_revision(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    // ==================== AUDIT LOG OPERATIONS ====================

    async fn list_audit_logs(&self) -> Result<Vec<AuditLog>, AppError> {
        let rows = sqlx::query(
            "SELECT id, action, details, actor_id, created_at FROM audit_logs ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(audit_log_from_row).collect())
    }

    async fn insert_audit_log(&self, log: &AuditLog) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO audit_logs (id, action, details, actor_id, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&log.id)
        .bind(&log.action)
        .bind(&log.details)
        .bind(&log.actor_id)
        .bind(&log.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn reset(&self, roles: &[Role], users: &[User]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for table in ["messages", "tasks", "users", "roles", "audit_logs"] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&mut *tx)
                .await?;
        }

        for role in roles {
            sqlx::query("INSERT INTO roles (id, name, color) VALUES (?, ?, ?)")
                .bind(&role.id)
                .bind(&role.name)
                .bind(&role.color)
                .execute(&mut *tx)
                .await?;
        }

        for user in users {
            sqlx::query(
                "INSERT INTO users (id, full_name, email, password, access_level, role, job_title, avatar_url, status, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
            )
            .bind(&user.id)
            .bind(&user.full_name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(user.access_level.as_str())
            .bind(&user.role)
            .bind(&user.job_title)
            .bind(&user.avatar_url)
            .bind(&user.status)
            .bind(&user.created_at)
            .execute(&mut *tx)
            .await?;
        }

        // One revision bump for the whole reseed
        bump_revision(&mut tx).await?;

        tx.commit().await?;
        Ok(())
    }
}

// Helper functions for row conversion

fn user_from_row(row: &SqliteRow) -> User {
    let access_level: String = row.get("access_level");
    User {
        id: row.get("id"),
        full_name: row.get("full_name"),
        email: row.get("email"),
        password: row.get("password"),
        access_level: AccessLevel::parse(&access_level).unwrap_or_default(),
        role: row.get("role"),
        job_title: row.get("job_title"),
        avatar_url: row.get("avatar_url"),
        status: row.get("status"),
        created_at: row.get("created_at"),
    }
}

fn role_from_row(row: &SqliteRow) -> Role {
    Role {
        id: row.get("id"),
        name: row.get("name"),
        color: row.get("color"),
    }
}

fn task_from_row(row: &SqliteRow) -> Task {
    let status: String = row.get("status");
    let priority: String = row.get("priority");
    let proof_status: String = row.get("proof_status");

    Task {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        status: TaskStatus::parse(&status).unwrap_or(TaskStatus::Todo),
        priority: Priority::parse(&priority).unwrap_or_default(),
        due_date: row.get("due_date"),
        assigned_to: row.get("assigned_to"),
        proof_url: row.get("proof_url"),
        proof_status: ProofStatus::parse(&proof_status).unwrap_or_default(),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn message_from_row(row: &SqliteRow) -> Message {
    Message {
        id: row.get("id"),
        content: row.get("content"),
        sender_id: row.get("sender_id"),
        channel_id: row.get("channel_id"),
        created_at: row.get("created_at"),
    }
}

fn audit_log_from_row(row: &SqliteRow) -> AuditLog {
    AuditLog {
        id: row.get("id"),
        action: row.get("action"),
        details: row.get("details"),
        actor_id: row.get("actor_id"),
        created_at: row.get("created_at"),
    }
}

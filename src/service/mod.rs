//! Dashboard data-access layer.
//!
//! Composes the store, authorization, the review workflow, joins, audit logging
//! and change notifications. Handlers call into this and nothing else.

mod chat;
mod staff;
mod tasks;

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};

use crate::auth::verify_password;
use crate::authz::{authorize, Action};
use crate::db::Store;
use crate::errors::AppError;
use crate::events::{Collection, EventBus};
use crate::models::{
    AccessLevel, AuditLog, DashboardStats, LoginRequest, ProofStatus, RevisionInfo, Role,
    SessionProfile, TaskStatus, User,
};

pub const SEED_ADMIN_NAME: &str = "Admin User";
pub const SEED_ADMIN_EMAIL: &str = "admin@staffnet.com";
pub const SEED_ADMIN_PASSWORD: &str = "password123";

/// RFC 3339 timestamp with fixed precision so stored values sort lexically.
pub(crate) fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(crate) fn default_avatar(seed: &str) -> String {
    format!("https://i.pravatar.cc/150?u={}", seed)
}

/// Emails are matched case-insensitively.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// The dashboard's operations over an injected store.
pub struct Dashboard {
    store: Arc<dyn Store>,
    events: EventBus,
}

impl Dashboard {
    pub fn new(store: Arc<dyn Store>, events: EventBus) -> Self {
        Self { store, events }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub async fn revision_id(&self) -> Result<i64, AppError> {
        self.store.revision_id().await
    }

    pub async fn revision_info(&self) -> Result<RevisionInfo, AppError> {
        self.store.revision_info().await
    }

    // ==================== SESSION ====================

    /// Check credentials against the stored user record.
    pub async fn login(&self, request: &LoginRequest) -> Result<SessionProfile, AppError> {
        let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

        let email = normalize_email(&request.email);
        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&request.password, &user.password) {
            tracing::warn!(email = %email, "Login failed");
            return Err(invalid());
        }

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(SessionProfile::from(user))
    }

    /// Resolve the session user id into the acting user.
    pub async fn resolve_actor(&self, user_id: &str) -> Result<User, AppError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Session user no longer exists".to_string()))
    }

    // ==================== DASHBOARD ====================

    pub async fn stats(&self) -> Result<DashboardStats, AppError> {
        let users = self.store.list_users().await?;
        let tasks = self.store.list_tasks().await?;

        Ok(DashboardStats {
            total_staff: users.len(),
            active_tasks: tasks
                .iter()
                .filter(|t| t.status != TaskStatus::Done)
                .count(),
            pending_reviews: tasks
                .iter()
                .filter(|t| t.proof_status == ProofStatus::Pending)
                .count(),
        })
    }

    /// Audit trail, newest first. Admins only.
    pub async fn list_audit_logs(&self, actor: &User) -> Result<Vec<AuditLog>, AppError> {
        authorize(actor, Action::ViewAuditLog).into_result()?;
        self.store.list_audit_logs().await
    }

    // ==================== SEED ====================

    /// Wipe every collection and recreate the default roles and admin user.
    pub async fn seed(&self) -> Result<(), AppError> {
        let roles: Vec<Role> = [
            ("Admin", "bg-red-600"),
            ("Manager", "bg-purple-600"),
            ("Staff", "bg-blue-600"),
        ]
        .into_iter()
        .map(|(name, color)| Role {
            id: new_id(),
            name: name.to_string(),
            color: color.to_string(),
        })
        .collect();

        let admin = User {
            id: new_id(),
            full_name: SEED_ADMIN_NAME.to_string(),
            email: SEED_ADMIN_EMAIL.to_string(),
            password: SEED_ADMIN_PASSWORD.to_string(),
            access_level: AccessLevel::Admin,
            role: Some("Admin".to_string()),
            job_title: Some("Administrator".to_string()),
            avatar_url: default_avatar("admin"),
            status: "Active".to_string(),
            created_at: now(),
        };

        self.store.reset(&roles, std::slice::from_ref(&admin)).await?;
        tracing::warn!("Database wiped and reseeded");

        self.audit(
            &admin,
            "Seeded database".to_string(),
            format!("Default roles recreated and {} restored", SEED_ADMIN_EMAIL),
        )
        .await;
        for collection in [
            Collection::Staff,
            Collection::Roles,
            Collection::Tasks,
            Collection::Messages,
        ] {
            self.publish(collection).await;
        }
        Ok(())
    }

    /// Seed only when there are no users yet. Returns whether seeding happened.
    pub async fn seed_if_empty(&self) -> Result<bool, AppError> {
        if !self.store.list_users().await?.is_empty() {
            return Ok(false);
        }
        self.seed().await?;
        Ok(true)
    }

    // ==================== HELPERS ====================

    /// Record an audit entry. Failure here does not undo the action being audited.
    async fn audit(&self, actor: &User, action: String, details: String) {
        let log = AuditLog {
            id: new_id(),
            action,
            details: Some(details),
            actor_id: Some(actor.id.clone()),
            created_at: now(),
        };
        if let Err(e) = self.store.insert_audit_log(&log).await {
            tracing::warn!("Failed to write audit log '{}': {}", log.action, e);
        }
    }

    /// Announce that a collection changed at the current revision.
    async fn publish(&self, collection: Collection) {
        match self.store.revision_id().await {
            Ok(revision_id) => self.events.publish(collection, revision_id),
            Err(e) => tracing::warn!(
                "Failed to read revision for {} change event: {}",
                collection.as_str(),
                e
            ),
        }
    }
}

//! Staff directory and role administration.

use super::{default_avatar, new_id, normalize_email, now, Dashboard};
use crate::authz::{authorize, Action};
use crate::errors::AppError;
use crate::events::Collection;
use crate::join::join_staff;
use crate::models::{
    CreateRoleRequest, CreateUserRequest, Role, StaffView, UpdateUserRequest, User,
    DEFAULT_ROLE_COLOR,
};

impl Dashboard {
    /// All staff joined with their role badges.
    pub async fn list_staff(&self) -> Result<Vec<StaffView>, AppError> {
        let users = self.store.list_users().await?;
        let roles = self.store.list_roles().await?;
        Ok(join_staff(users, &roles))
    }

    pub async fn get_staff(&self, id: &str) -> Result<StaffView, AppError> {
        let user = self
            .store
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Staff member {} not found", id)))?;
        self.staff_view(user).await
    }

    pub async fn create_user(
        &self,
        actor: &User,
        request: CreateUserRequest,
    ) -> Result<StaffView, AppError> {
        authorize(actor, Action::CreateStaff).into_result()?;

        let full_name = request.full_name.trim();
        if full_name.is_empty() {
            return Err(AppError::Validation("Full name is required".to_string()));
        }
        let email = normalize_email(&request.email);
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::Validation("A valid email is required".to_string()));
        }
        if request.password.is_empty() {
            return Err(AppError::Validation("Password is required".to_string()));
        }
        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::Validation(format!(
                "Email {} is already registered",
                email
            )));
        }

        let id = new_id();
        let access_level = request.access_level.unwrap_or_default();
        let user = User {
            avatar_url: request
                .avatar_url
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| default_avatar(&id)),
            id,
            full_name: full_name.to_string(),
            email,
            password: request.password,
            access_level,
            role: non_blank(request.role).or_else(|| Some(access_level.as_str().to_string())),
            job_title: non_blank(request.job_title),
            status: "Active".to_string(),
            created_at: now(),
        };

        self.store.insert_user(&user).await?;
        tracing::info!(user_id = %user.id, actor_id = %actor.id, "Staff member created");
        self.audit(
            actor,
            format!("Added staff: {}", user.full_name),
            format!("{} joined as {}", user.email, user.access_level.as_str()),
        )
        .await;
        self.publish(Collection::Staff).await;

        self.staff_view(user).await
    }

    /// Change name, access level, role label, job title or avatar.
    pub async fn update_user(
        &self,
        actor: &User,
        id: &str,
        request: UpdateUserRequest,
    ) -> Result<StaffView, AppError> {
        authorize(actor, Action::UpdateStaff).into_result()?;

        let mut user = self
            .store
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Staff member {} not found", id)))?;

        if let Some(full_name) = request.full_name {
            let full_name = full_name.trim();
            if full_name.is_empty() {
                return Err(AppError::Validation("Full name cannot be empty".to_string()));
            }
            user.full_name = full_name.to_string();
        }
        if let Some(level) = request.access_level {
            user.access_level = level;
        }
        if request.role.is_some() {
            user.role = non_blank(request.role);
        }
        if request.job_title.is_some() {
            user.job_title = non_blank(request.job_title);
        }
        if let Some(avatar) = non_blank(request.avatar_url) {
            user.avatar_url = avatar;
        }

        self.store.update_user(&user).await?;
        tracing::info!(user_id = %user.id, actor_id = %actor.id, "Staff member updated");
        self.audit(
            actor,
            format!("Updated staff: {}", user.full_name),
            format!(
                "{} is {} with role {}",
                user.email,
                user.access_level.as_str(),
                user.role.as_deref().unwrap_or("none")
            ),
        )
        .await;
        self.publish(Collection::Staff).await;

        self.staff_view(user).await
    }

    /// Remove a staff member. Their tasks and messages stay and show placeholders.
    pub async fn fire_staff(&self, actor: &User, id: &str) -> Result<(), AppError> {
        authorize(actor, Action::FireStaff { target_id: id }).into_result()?;

        let user = self
            .store
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Staff member {} not found", id)))?;

        if !self.store.delete_user(id).await? {
            return Err(AppError::NotFound(format!("Staff member {} not found", id)));
        }

        tracing::info!(user_id = %id, actor_id = %actor.id, "Staff member fired");
        self.audit(
            actor,
            format!("Deleted staff: {}", user.full_name),
            format!("{} removed; their tasks and messages are kept", user.email),
        )
        .await;
        self.publish(Collection::Staff).await;
        Ok(())
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>, AppError> {
        self.store.list_roles().await
    }

    pub async fn create_role(
        &self,
        actor: &User,
        request: CreateRoleRequest,
    ) -> Result<Role, AppError> {
        authorize(actor, Action::CreateRole).into_result()?;

        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Role name is required".to_string()));
        }
        let roles = self.store.list_roles().await?;
        if roles.iter().any(|r| r.name.eq_ignore_ascii_case(name)) {
            return Err(AppError::Validation(format!("Role {} already exists", name)));
        }

        let role = Role {
            id: new_id(),
            name: name.to_string(),
            color: non_blank(request.color).unwrap_or_else(|| DEFAULT_ROLE_COLOR.to_string()),
        };

        self.store.insert_role(&role).await?;
        self.audit(
            actor,
            format!("Created role: {}", role.name),
            format!("Badge color {}", role.color),
        )
        .await;
        self.publish(Collection::Roles).await;
        Ok(role)
    }

    async fn staff_view(&self, user: User) -> Result<StaffView, AppError> {
        let roles = self.store.list_roles().await?;
        let mut views = join_staff(vec![user], &roles);
        views
            .pop()
            .ok_or_else(|| AppError::Internal("Staff join produced no rows".to_string()))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

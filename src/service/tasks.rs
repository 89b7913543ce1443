//! Task creation, listing and the proof-of-work review transitions.

use chrono::NaiveDate;

use super::{new_id, now, Dashboard};
use crate::authz::{authorize, Action};
use crate::errors::AppError;
use crate::events::Collection;
use crate::join::join_tasks;
use crate::models::{
    CreateTaskRequest, ProofStatus, ReviewDecision, Task, TaskFilter, TaskStatus, TaskView, User,
};
use crate::workflow;

impl Dashboard {
    /// Tasks joined with their assignees, newest first.
    pub async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<TaskView>, AppError> {
        let mut tasks = self.store.list_tasks().await?;
        if let Some(status) = filter.status {
            tasks.retain(|t| t.status == status);
        }
        let staff = self.store.list_users().await?;
        Ok(join_tasks(tasks, &staff))
    }

    pub async fn get_task(&self, id: &str) -> Result<TaskView, AppError> {
        let task = self.load_task(id).await?;
        self.task_view(task).await
    }

    pub async fn create_task(
        &self,
        actor: &User,
        request: CreateTaskRequest,
    ) -> Result<TaskView, AppError> {
        authorize(actor, Action::CreateTask).into_result()?;

        let title = request.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Task title is required".to_string()));
        }

        let due_date = match request.due_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                    AppError::Validation(format!("Due date must be YYYY-MM-DD, got '{}'", raw))
                })?;
                Some(date.format("%Y-%m-%d").to_string())
            }
        };

        let assigned_to = match request.assigned_to.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(id) => {
                if self.store.get_user(id).await?.is_none() {
                    return Err(AppError::Validation(format!(
                        "Assignee {} does not exist",
                        id
                    )));
                }
                Some(id.to_string())
            }
        };

        let created_at = now();
        let task = Task {
            id: new_id(),
            title: title.to_string(),
            description: request
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            status: TaskStatus::Todo,
            priority: request.priority.unwrap_or_default(),
            due_date,
            assigned_to,
            proof_url: None,
            proof_status: ProofStatus::None,
            created_by: Some(actor.id.clone()),
            updated_at: created_at.clone(),
            created_at,
        };

        self.store.insert_task(&task).await?;
        tracing::info!(task_id = %task.id, actor_id = %actor.id, "Task created");
        self.audit(
            actor,
            format!("Created task: {}", task.title),
            format!(
                "Task {} assigned to {}",
                task.id,
                task.assigned_to.as_deref().unwrap_or("nobody")
            ),
        )
        .await;
        self.publish(Collection::Tasks).await;

        self.task_view(task).await
    }

    /// Assignee submits a proof-of-work link, moving the task to review.
    pub async fn submit_proof(
        &self,
        actor: &User,
        task_id: &str,
        proof_url: &str,
    ) -> Result<TaskView, AppError> {
        self.transition(actor, task_id, "submit_proof", Some("Submitted proof"), |task, now| {
            workflow::submit_proof(task, actor, proof_url, now)
        })
        .await
    }

    /// Manager approves or rejects the pending proof.
    pub async fn review_task(
        &self,
        actor: &User,
        task_id: &str,
        decision: ReviewDecision,
    ) -> Result<TaskView, AppError> {
        let label = match decision {
            ReviewDecision::Approved => "Approved task",
            ReviewDecision::Rejected => "Rejected task",
        };
        self.transition(actor, task_id, "review", Some(label), |task, now| {
            workflow::review(task, actor, decision, now)
        })
        .await
    }

    pub async fn complete_task(&self, actor: &User, task_id: &str) -> Result<TaskView, AppError> {
        self.transition(actor, task_id, "complete", Some("Completed task"), |task, now| {
            workflow::complete(task, actor, now)
        })
        .await
    }

    pub async fn set_task_progress(
        &self,
        actor: &User,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<TaskView, AppError> {
        self.transition(actor, task_id, "set_progress", None, |task, now| {
            workflow::set_progress(task, actor, status, now)
        })
        .await
    }

    /// Load a task, apply one workflow step and persist the result.
    /// Nothing is written when the step is refused. Steps with an audit label
    /// are recorded in the audit trail.
    async fn transition<F>(
        &self,
        actor: &User,
        task_id: &str,
        step: &'static str,
        audit_label: Option<&'static str>,
        apply: F,
    ) -> Result<TaskView, AppError>
    where
        F: FnOnce(&Task, &str) -> Result<Task, AppError>,
    {
        let task = self.load_task(task_id).await?;
        let timestamp = now();

        let next = match apply(&task, timestamp.as_str()) {
            Ok(next) => next,
            Err(e) => {
                if matches!(e, AppError::Forbidden(_)) {
                    tracing::warn!(task_id, actor_id = %actor.id, step, "Task transition refused: {}", e);
                }
                return Err(e);
            }
        };

        self.store.update_task(&next).await?;
        tracing::info!(
            task_id,
            actor_id = %actor.id,
            step,
            from = task.status.as_str(),
            to = next.status.as_str(),
            "Task transitioned"
        );
        if let Some(label) = audit_label {
            self.audit(
                actor,
                format!("{}: {}", label, next.title),
                format!(
                    "Task {} moved from {} to {}",
                    next.id,
                    task.status.as_str(),
                    next.status.as_str()
                ),
            )
            .await;
        }
        self.publish(Collection::Tasks).await;

        self.task_view(next).await
    }

    async fn load_task(&self, id: &str) -> Result<Task, AppError> {
        self.store
            .get_task(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Task {} not found", id)))
    }

    async fn task_view(&self, task: Task) -> Result<TaskView, AppError> {
        let staff = self.store.list_users().await?;
        join_tasks(vec![task], &staff)
            .pop()
            .ok_or_else(|| AppError::Internal("Task join produced no rows".to_string()))
    }
}

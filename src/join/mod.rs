//! In-process joins between collections.
//!
//! Each collection is fetched on its own, indexed by primary key, and related
//! records are attached to their parents. A reference that does not resolve
//! gets a placeholder instead of an error.

use std::collections::HashMap;

use crate::models::{
    Message, MessageView, Role, RoleBadge, StaffSummary, StaffView, Task, TaskView, User,
    DEFAULT_ROLE_COLOR,
};

pub const UNASSIGNED_NAME: &str = "Unassigned";
pub const UNKNOWN_SENDER_NAME: &str = "Unknown";
pub const NO_ROLE_NAME: &str = "No Role";
pub const PLACEHOLDER_AVATAR: &str = "https://i.pravatar.cc/150?u=unknown";

/// Records addressable by a primary key.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for User {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Role {
    fn key(&self) -> &str {
        &self.name
    }
}

/// Borrowed index over a collection.
pub struct Lookup<'a, T> {
    by_key: HashMap<&'a str, &'a T>,
}

impl<'a, T: Keyed> Lookup<'a, T> {
    pub fn new(records: &'a [T]) -> Self {
        Self {
            by_key: records.iter().map(|r| (r.key(), r)).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&'a T> {
        self.by_key.get(key).copied()
    }
}

fn placeholder_summary(id: Option<&str>, name: &str) -> StaffSummary {
    StaffSummary {
        id: id.map(str::to_string),
        full_name: name.to_string(),
        avatar_url: PLACEHOLDER_AVATAR.to_string(),
        placeholder: true,
    }
}

/// Attach the assignee to each task. Missing or dangling assignees become "Unassigned".
pub fn join_tasks(tasks: Vec<Task>, staff: &[User]) -> Vec<TaskView> {
    let lookup = Lookup::new(staff);
    tasks
        .into_iter()
        .map(|task| {
            let assignee = match task.assigned_to.as_deref() {
                Some(id) => lookup
                    .get(id)
                    .map(StaffSummary::from)
                    .unwrap_or_else(|| placeholder_summary(Some(id), UNASSIGNED_NAME)),
                None => placeholder_summary(None, UNASSIGNED_NAME),
            };
            TaskView { task, assignee }
        })
        .collect()
}

/// Attach the sender to each message. Deleted senders become "Unknown".
pub fn join_messages(messages: Vec<Message>, staff: &[User]) -> Vec<MessageView> {
    let lookup = Lookup::new(staff);
    messages
        .into_iter()
        .map(|message| {
            let sender = lookup
                .get(&message.sender_id)
                .map(StaffSummary::from)
                .unwrap_or_else(|| {
                    placeholder_summary(Some(&message.sender_id), UNKNOWN_SENDER_NAME)
                });
            MessageView { message, sender }
        })
        .collect()
}

/// Attach the role badge to each staff member, matching the role label against role names.
pub fn join_staff(staff: Vec<User>, roles: &[Role]) -> Vec<StaffView> {
    let lookup = Lookup::new(roles);
    staff
        .into_iter()
        .map(|user| {
            let role_badge = match user.role.as_deref().and_then(|name| lookup.get(name)) {
                Some(role) => RoleBadge {
                    name: role.name.clone(),
                    color: role.color.clone(),
                },
                None => RoleBadge {
                    name: user
                        .role
                        .clone()
                        .unwrap_or_else(|| NO_ROLE_NAME.to_string()),
                    color: DEFAULT_ROLE_COLOR.to_string(),
                },
            };
            StaffView { user, role_badge }
        })
        .collect()
}

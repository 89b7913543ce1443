//! Data models for the StaffNet dashboard.
//!
//! Field names serialize in camelCase to match what the dashboard frontend reads.

mod audit;
mod message;
mod role;
mod task;
mod user;
mod views;

pub use audit::*;
pub use message::*;
pub use role::*;
pub use task::*;
pub use user::*;
pub use views::*;

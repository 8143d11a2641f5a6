//! This crate provides the to-do list of the MyPsico app, and its reminders.
//!
//! The tasks of a user live in a remote store, that is reached through the [`TaskStore`](traits::TaskStore) trait.
//! The hosted backend is implemented by the [`client`] module, and an in-memory store is available in the [`memory_store`] module.
//!
//! A [`TaskProvider`] keeps the task list of a user, and only changes it once the remote store has confirmed a change. \
//! Every change is published, so that a [`Scheduler`](scheduler::Scheduler) can keep one deferred callback per pending push reminder.
//! When a callback fires, the [`Notifier`](notifier::Notifier) shows a local notification, if the user allowed it.

pub mod traits;

mod task;
pub use task::{NewTask, ReminderType, Task, TaskId, TaskPatch, UserId};
mod error;
pub use error::{Error, Result};
mod session;
pub use session::Session;
pub mod provider;
pub use provider::TaskProvider;

pub mod client;
pub mod memory_store;
pub mod mock_behaviour;
pub mod scheduler;
pub mod notifier;
pub mod cache;

pub mod config;
pub mod utils;

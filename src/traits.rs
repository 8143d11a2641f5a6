//! The seams between this crate and the outside world

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::task::{NewTask, Task, TaskId, TaskPatch, UserId};

/// A remote store of tasks (usually the hosted backend, see [`Client`](crate::client::Client))
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Returns every task owned by `owner`, in the order the store sends them
    async fn list(&self, owner: &UserId) -> Result<Vec<Task>>;
    /// Insert a new task, and return it as stored (i.e. with its id)
    async fn insert(&self, task: NewTask) -> Result<Task>;
    /// Apply a patch to an existing task, and return the updated record
    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task>;
    /// Delete a task
    async fn delete(&self, id: &TaskId) -> Result<()>;
}

/// Identifies a callback registered in a [`Timer`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// A deferred-callback primitive
pub trait Timer: Send + Sync {
    /// Run `callback` once, after `delay`
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce() + Send + 'static>) -> TimerHandle;
    /// Make sure a callback will not run. Cancelling a callback that already ran is a no-op
    fn cancel(&self, handle: TimerHandle);
}

/// Whether the user allowed local notifications
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    /// The user has not been asked yet
    Default,
    Granted,
    Denied,
}

/// Something able to display local notifications
#[async_trait]
pub trait NotificationBackend: Send + Sync {
    fn permission(&self) -> Permission;
    /// Prompt the user. Returns their answer
    async fn request_permission(&self) -> Permission;
    fn show(&self, title: &str, body: &str);
}

//! This modules holds the task list of a user, and keeps it in line with the remote store
//!
//! Every mutation is sent to the remote store first, and only reflected in the local list once confirmed.
//! There is thus nothing to roll back when a call fails.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::task::{NewTask, ReminderType, Task, TaskId, TaskPatch, UserId};
use crate::traits::TaskStore;

pub mod list_watch;
use list_watch::{ListChange, ListReceiver, ListSender, TaskList};

/// The local state, behind a mutex that is never held across an `.await`
#[derive(Debug, Default)]
struct LocalState {
    tasks: Vec<Task>,
    /// For every task, the stamps of the latest reflected mutation of each field
    reflected: HashMap<TaskId, FieldStamps>,
    /// Stamp of the load that produced `tasks`. Replies to mutations issued before it are ignored
    loaded: u64,
}

#[derive(Clone, Copy, Debug, Default)]
struct FieldStamps {
    text: u64,
    completed: u64,
    reminder: u64,
}

impl FieldStamps {
    /// The fields of `patch` that no later-issued mutation has reflected yet, with the values the remote store confirmed in `record`.
    /// Their stamps are moved to `stamp`.
    fn claim(&mut self, stamp: u64, patch: &TaskPatch, record: &Task) -> TaskPatch {
        let mut confirmed = TaskPatch::default();
        if patch.text.is_some() && stamp > self.text {
            self.text = stamp;
            confirmed.text = Some(record.text().to_string());
        }
        if patch.completed.is_some() && stamp > self.completed {
            self.completed = stamp;
            confirmed.completed = Some(record.completed());
        }
        if (patch.reminder_at.is_some() || patch.reminder_type.is_some()) && stamp > self.reminder {
            self.reminder = stamp;
            confirmed.reminder_at = Some(record.reminder_at().cloned());
            confirmed.reminder_type = Some(record.reminder_type());
        }
        confirmed
    }
}

/// The task list of a user, backed by a remote store.
///
/// `remote` is usually a [`Client`](crate::client::Client). \
/// Methods take `&self`, so that several operations can be in flight at the same time (e.g. a double click on a checkbox).
/// In that case, each confirmed reply only updates the fields its mutation changed.
/// When two mutations change the same field, the one that was issued last wins, whatever the order the replies arrive in.
/// A reload wins over every mutation issued before it.
pub struct TaskProvider<R: TaskStore> {
    remote: R,
    owner: UserId,
    settings: Settings,

    local: Mutex<LocalState>,
    list_sender: ListSender,
    next_stamp: AtomicU64,
}

impl<R: TaskStore> TaskProvider<R> {
    /// Create a provider for the tasks of `owner`. Nothing is loaded until [`Self::load`] is called
    pub fn new(remote: R, owner: UserId, settings: Settings) -> Self {
        let (list_sender, _) = list_watch::list_channel();
        Self {
            remote,
            owner,
            settings,
            local: Mutex::new(LocalState::default()),
            list_sender,
            next_stamp: AtomicU64::new(0),
        }
    }

    /// Returns the remote store.
    ///
    /// Apart from tests, there are very few (if any) reasons to access `remote` directly.
    pub fn remote(&self) -> &R { &self.remote }
    pub fn owner(&self) -> &UserId { &self.owner }
    pub fn settings(&self) -> &Settings { &self.settings }

    /// Returns a copy of the current task list
    pub fn tasks(&self) -> Vec<Task> {
        self.local.lock().unwrap().tasks.clone()
    }

    pub fn task(&self, id: &TaskId) -> Option<Task> {
        self.local.lock().unwrap().tasks.iter()
            .find(|task| task.id() == id)
            .cloned()
    }

    /// Get notified of every change of the task list
    pub fn subscribe(&self) -> ListReceiver {
        self.list_sender.subscribe()
    }

    /// Fetch every task of the owner, and replace the local list with them.
    ///
    /// On failure, the local list is left untouched. Nothing is retried.
    pub async fn load(&self) -> Result<()> {
        let stamp = self.next_stamp();
        let tasks = self.remote_call("load", self.remote.list(&self.owner)).await?;
        log::info!("Loaded {} tasks for {}", tasks.len(), self.owner);

        let mut local = self.local.lock().unwrap();
        if stamp < local.loaded {
            log::debug!("Ignoring load #{}, load #{} is already reflected", stamp, local.loaded);
            return Ok(());
        }
        local.tasks = tasks;
        local.loaded = stamp;
        local.reflected.clear();
        let count = local.tasks.len();
        self.publish(&local, ListChange::Loaded{ count });
        Ok(())
    }

    /// Create a task, and append it to the list. Returns its id
    pub async fn add(&self, text: &str) -> Result<TaskId> {
        let text = non_empty(text)?;
        let new_task = NewTask::new(text.to_string(), self.owner.clone());
        let stored = self.remote_call("add", self.remote.insert(new_task)).await?;
        let id = stored.id().clone();

        let mut local = self.local.lock().unwrap();
        local.tasks.push(stored);
        self.publish(&local, ListChange::Added(id.clone()));
        Ok(id)
    }

    /// Mark a task as completed (or not). Setting the current value again does nothing
    pub async fn set_completed(&self, id: &TaskId, completed: bool) -> Result<()> {
        let current = self.existing(id)?;
        if current.completed() == completed {
            return Ok(());
        }
        self.update(id, TaskPatch::completed(completed)).await
    }

    /// Rename a task.
    ///
    /// Empty texts are refused, renaming a completed task is refused, and setting the same text again does nothing.
    pub async fn set_text(&self, id: &TaskId, text: &str) -> Result<()> {
        let text = non_empty(text)?;
        let current = self.existing(id)?;
        if current.completed() {
            return Err(Error::CompletedTask(id.clone()));
        }
        if current.text() == text {
            return Ok(());
        }
        self.update(id, TaskPatch::text(text.to_string())).await
    }

    /// Set the reminder of a task.
    ///
    /// `at == None` clears both the timestamp and the type. A reminder without a type is a push reminder.
    pub async fn set_reminder(&self, id: &TaskId, at: Option<DateTime<Utc>>, reminder_type: Option<ReminderType>) -> Result<()> {
        self.existing(id)?;
        self.update(id, TaskPatch::reminder(at, reminder_type)).await
    }

    /// Delete a task from the remote store, then from the list
    pub async fn remove(&self, id: &TaskId) -> Result<()> {
        self.existing(id)?;
        self.remote_call("remove", self.remote.delete(id)).await?;

        let mut local = self.local.lock().unwrap();
        local.tasks.retain(|task| task.id() != id);
        local.reflected.remove(id);
        self.publish(&local, ListChange::Removed(id.clone()));
        Ok(())
    }


    async fn update(&self, id: &TaskId, patch: TaskPatch) -> Result<()> {
        let stamp = self.next_stamp();
        let updated = self.remote_call("update", self.remote.update(id, &patch)).await?;
        self.reflect_update(stamp, &patch, updated);
        Ok(())
    }

    /// Copy the fields changed by mutation `stamp` from what the remote store confirmed, unless a later mutation (or a later load) has already been reflected
    fn reflect_update(&self, stamp: u64, patch: &TaskPatch, updated: Task) {
        let mut local = self.local.lock().unwrap();
        let id = updated.id().clone();

        if stamp < local.loaded {
            log::debug!("Ignoring the reply to mutation #{} of task {}, the list has been reloaded since", stamp, id);
            return;
        }
        let index = match local.tasks.iter().position(|task| task.id() == &id) {
            None => {
                log::debug!("Task {} has been removed in the meantime, ignoring its update", id);
                return;
            },
            Some(index) => index,
        };

        let confirmed = local.reflected.entry(id.clone()).or_default().claim(stamp, patch, &updated);
        if confirmed.is_empty() {
            log::debug!("Ignoring a stale reply for task {} (mutation #{})", id, stamp);
            return;
        }
        local.tasks[index].apply(&confirmed);
        self.publish(&local, ListChange::Updated(id));
    }

    fn next_stamp(&self) -> u64 {
        self.next_stamp.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn existing(&self, id: &TaskId) -> Result<Task> {
        self.task(id).ok_or_else(|| Error::UnknownTask(id.clone()))
    }

    /// Publish the list while the lock is still held, so that listeners see changes in the order they were applied
    fn publish(&self, local: &LocalState, change: ListChange) {
        log::debug!("{}", change);
        self.list_sender.send_replace(TaskList {
            tasks: local.tasks.clone(),
            last_change: change,
        });
    }

    /// Run a remote call, giving up after the configured timeout
    async fn remote_call<T, F>(&self, operation: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.settings.timeout, call).await {
            Err(_elapsed) => {
                log::warn!("Remote {} did not complete within {:?}", operation, self.settings.timeout);
                Err(Error::Timeout(self.settings.timeout))
            },
            Ok(Err(err)) => {
                log::warn!("Remote {} failed: {}", operation, err);
                Err(err)
            },
            Ok(Ok(value)) => Ok(value),
        }
    }
}

fn non_empty(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyText);
    }
    Ok(trimmed)
}

//! Turns reminder timestamps into deferred callbacks
//!
//! The schedule is rebuilt from scratch every time the task list changes: every registered callback is cancelled,
//! then one callback is registered per task that has a pending push reminder.
//! Users have tens of tasks, not thousands, so there is no need to compute differences.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::notifier::Notifier;
use crate::provider::list_watch::ListReceiver;
use crate::task::{Task, TaskId};
use crate::traits::{Timer, TimerHandle};

/// Keeps exactly one callback per task that has a pending push reminder
pub struct Scheduler<T: Timer> {
    timer: T,
    notifier: Arc<Notifier>,
    registered: HashMap<TaskId, TimerHandle>,
}

impl<T: Timer> Scheduler<T> {
    pub fn new(timer: T, notifier: Arc<Notifier>) -> Self {
        Self {
            timer,
            notifier,
            registered: HashMap::new(),
        }
    }

    pub fn timer(&self) -> &T { &self.timer }

    /// Returns the handle of the callback registered for a task, if any
    pub fn scheduled(&self, id: &TaskId) -> Option<TimerHandle> {
        self.registered.get(id).copied()
    }

    /// How many callbacks are currently registered
    pub fn n_scheduled(&self) -> usize {
        self.registered.len()
    }

    /// Rebuild the schedule for `tasks`, as of now
    pub fn rebuild(&mut self, tasks: &[Task]) {
        self.rebuild_at(tasks, Utc::now())
    }

    /// Rebuild the schedule for `tasks`, as if the current time was `now`
    pub fn rebuild_at(&mut self, tasks: &[Task], now: DateTime<Utc>) {
        self.cancel_all();

        for task in tasks {
            if task.has_pending_push_reminder(&now) == false {
                continue;
            }
            let delay = match task.reminder_at().map(|at| (*at - now).to_std()) {
                Some(Ok(delay)) => delay,
                _ => continue,
            };

            let notifier = Arc::clone(&self.notifier);
            let body = task.text().to_string();
            let handle = self.timer.schedule(delay, Box::new(move || {
                notifier.notify(&body);
            }));
            log::debug!("Reminder for task {} scheduled in {:?}", task.id(), delay);
            self.registered.insert(task.id().clone(), handle);
        }
    }

    /// Cancel every outstanding callback
    pub fn shutdown(&mut self) {
        self.cancel_all();
    }

    fn cancel_all(&mut self) {
        for (_id, handle) in self.registered.drain() {
            self.timer.cancel(handle);
        }
    }

    /// Follow a task list: rebuild the schedule now, then after every change.
    ///
    /// This returns (and cancels everything) once the sending side of the list is dropped.
    pub async fn watch_list(mut self, mut receiver: ListReceiver) {
        loop {
            let tasks = receiver.borrow_and_update().tasks.clone();
            self.rebuild(&tasks);

            if receiver.changed().await.is_err() {
                break;
            }
        }
        log::debug!("Task list closed, cancelling {} reminders", self.n_scheduled());
        self.shutdown();
    }
}

impl<T: Timer> Drop for Scheduler<T> {
    fn drop(&mut self) {
        self.cancel_all();
    }
}


/// A [`Timer`] that runs each callback in its own tokio task
pub struct TokioTimer {
    runtime: Handle,
    next_handle: AtomicU64,
    pending: Mutex<HashMap<TimerHandle, JoinHandle<()>>>,
}

impl TokioTimer {
    /// Create a timer that spawns its tasks on the current tokio runtime
    ///
    /// # Panics
    /// Panics if called outside of a tokio runtime
    pub fn new() -> Self {
        Self::with_runtime(Handle::current())
    }

    pub fn with_runtime(runtime: Handle) -> Self {
        Self {
            runtime,
            next_handle: AtomicU64::new(0),
            pending: Mutex::new(HashMap::new()),
        }
    }
}

impl Timer for TokioTimer {
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce() + Send + 'static>) -> TimerHandle {
        let handle = TimerHandle(self.next_handle.fetch_add(1, Ordering::SeqCst));
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });

        let mut pending = self.pending.lock().unwrap();
        pending.retain(|_, task| task.is_finished() == false);
        pending.insert(handle, task);
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some(task) = self.pending.lock().unwrap().remove(&handle) {
            task.abort();
        }
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            for (_, task) in pending.drain() {
                task.abort();
            }
        }
    }
}

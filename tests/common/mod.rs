//! Test doubles shared by the integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use mypsico_tasks::traits::{NotificationBackend, Permission, Timer, TimerHandle};

/// A timer that never fires, and only remembers what is currently registered
#[derive(Default)]
pub struct RecordingTimer {
    next_handle: AtomicU64,
    live: Mutex<HashMap<TimerHandle, Duration>>,
    n_scheduled: AtomicU64,
}

impl RecordingTimer {
    /// How many callbacks are registered and not cancelled
    pub fn n_live(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    /// How many callbacks have ever been registered
    pub fn n_scheduled(&self) -> u64 {
        self.n_scheduled.load(Ordering::SeqCst)
    }

    pub fn delay_of(&self, handle: TimerHandle) -> Option<Duration> {
        self.live.lock().unwrap().get(&handle).copied()
    }
}

impl Timer for RecordingTimer {
    fn schedule(&self, delay: Duration, _callback: Box<dyn FnOnce() + Send + 'static>) -> TimerHandle {
        let handle = TimerHandle(self.next_handle.fetch_add(1, Ordering::SeqCst));
        self.n_scheduled.fetch_add(1, Ordering::SeqCst);
        self.live.lock().unwrap().insert(handle, delay);
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        self.live.lock().unwrap().remove(&handle);
    }
}


/// A notification backend that remembers every notification body
#[derive(Clone, Default)]
pub struct RecordingBackend {
    pub shown: Arc<Mutex<Vec<String>>>,
}

impl RecordingBackend {
    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationBackend for RecordingBackend {
    fn permission(&self) -> Permission { Permission::Granted }
    async fn request_permission(&self) -> Permission { Permission::Granted }
    fn show(&self, _title: &str, body: &str) {
        self.shown.lock().unwrap().push(body.to_string());
    }
}

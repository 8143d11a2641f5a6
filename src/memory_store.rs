//! An in-memory [`TaskStore`], used when no backend is configured and to mock the backend in tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::mock_behaviour::MockBehaviour;
use crate::task::{NewTask, Task, TaskId, TaskPatch, UserId};
use crate::traits::TaskStore;

/// A task store that keeps everything in memory, and that can be told to fail or to be slow
#[derive(Debug, Default)]
pub struct MemoryStore {
    tasks: Mutex<Vec<Task>>,
    behaviour: Mutex<MockBehaviour>,
    n_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already contains some tasks
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            ..Self::default()
        }
    }

    pub fn set_mock_behaviour(&self, behaviour: MockBehaviour) {
        *self.behaviour.lock().unwrap() = behaviour;
    }

    /// How many calls (successful or not) this store has received
    pub fn n_calls(&self) -> usize {
        self.n_calls.load(Ordering::SeqCst)
    }

    /// Returns a copy of the stored tasks, whoever owns them
    pub fn all_tasks(&self) -> Vec<Task> {
        self.tasks.lock().unwrap().clone()
    }

    async fn enter(&self) {
        self.n_calls.fetch_add(1, Ordering::SeqCst);
        let latency = self.behaviour.lock().unwrap().latency();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list(&self, owner: &UserId) -> Result<Vec<Task>> {
        self.enter().await;
        self.behaviour.lock().unwrap().can_list()?;

        Ok(self.tasks.lock().unwrap().iter()
            .filter(|task| task.owner() == owner)
            .cloned()
            .collect()
        )
    }

    async fn insert(&self, task: NewTask) -> Result<Task> {
        self.enter().await;
        self.behaviour.lock().unwrap().can_insert()?;

        let id = TaskId::from(Uuid::new_v4().to_hyphenated().to_string());
        let stored = Task::new(id, task.text, task.completed, task.owner)
            .with_creation_date(Utc::now());
        self.tasks.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task> {
        self.enter().await;
        self.behaviour.lock().unwrap().can_update()?;

        let mut tasks = self.tasks.lock().unwrap();
        match tasks.iter_mut().find(|task| task.id() == id) {
            None => Err(Error::remote(format!("no task matches id {}", id))),
            Some(task) => {
                task.apply(patch);
                Ok(task.clone())
            },
        }
    }

    async fn delete(&self, id: &TaskId) -> Result<()> {
        self.enter().await;
        self.behaviour.lock().unwrap().can_delete()?;

        let mut tasks = self.tasks.lock().unwrap();
        let len_before = tasks.len();
        tasks.retain(|task| task.id() != id);
        if tasks.len() == len_before {
            return Err(Error::remote(format!("no task matches id {}", id)));
        }
        Ok(())
    }
}

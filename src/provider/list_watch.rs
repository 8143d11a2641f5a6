//! Utilities to observe the cached task list

use std::fmt::{Display, Error, Formatter};

use crate::task::{Task, TaskId};

/// The last thing that happened to the task list
#[derive(Clone, Debug, PartialEq)]
pub enum ListChange {
    /// The list has not been loaded yet
    NotLoaded,
    /// The whole list has been (re)loaded from the remote store
    Loaded{ count: usize },
    Added(TaskId),
    Updated(TaskId),
    Removed(TaskId),
}

impl Display for ListChange {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            ListChange::NotLoaded => write!(f, "Not loaded"),
            ListChange::Loaded{count} => write!(f, "{} tasks loaded", count),
            ListChange::Added(id) => write!(f, "Task {} added", id),
            ListChange::Updated(id) => write!(f, "Task {} updated", id),
            ListChange::Removed(id) => write!(f, "Task {} removed", id),
        }
    }
}

impl Default for ListChange {
    fn default() -> Self {
        Self::NotLoaded
    }
}


/// A snapshot of the task list, as published after every confirmed change
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskList {
    pub tasks: Vec<Task>,
    pub last_change: ListChange,
}


/// See [`list_channel`]
pub type ListSender = tokio::sync::watch::Sender<TaskList>;
/// See [`list_channel`]
pub type ListReceiver = tokio::sync::watch::Receiver<TaskList>;

/// Create a channel that always holds the latest task list.
/// This is how the [`Scheduler`](crate::scheduler::Scheduler) learns about changes
pub fn list_channel() -> (ListSender, ListReceiver) {
    tokio::sync::watch::channel(TaskList::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_descriptions() {
        assert_eq!(ListChange::default().to_string(), "Not loaded");
        assert_eq!(ListChange::Loaded{ count: 3 }.to_string(), "3 tasks loaded");
        assert_eq!(ListChange::Removed(TaskId::from("t1")).to_string(), "Task t1 removed");
    }
}

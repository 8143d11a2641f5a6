//! To-do tasks and their reminders

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The identifier of a task, as assigned by the remote store
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId {
    content: String,
}

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.content
    }
}

impl From<String> for TaskId {
    fn from(content: String) -> Self {
        Self { content }
    }
}
impl From<&str> for TaskId {
    fn from(content: &str) -> Self {
        Self { content: content.to_string() }
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content)
    }
}

/// Used to support serde
impl Serialize for TaskId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.content)
    }
}
/// Used to support serde.
/// Depending on the table definition, the backend sends ids either as strings (UUIDs) or as integers
impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D>(deserializer: D) -> Result<TaskId, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TaskIdVisitor)
    }
}

struct TaskIdVisitor;

impl<'de> Visitor<'de> for TaskIdVisitor {
    type Value = TaskId;

    fn expecting(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "a string or an integer task id")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<TaskId, E> {
        Ok(TaskId::from(v))
    }
    fn visit_string<E: de::Error>(self, v: String) -> Result<TaskId, E> {
        Ok(TaskId::from(v))
    }
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<TaskId, E> {
        Ok(TaskId::from(v.to_string()))
    }
    fn visit_i64<E: de::Error>(self, v: i64) -> Result<TaskId, E> {
        Ok(TaskId::from(v.to_string()))
    }
}


/// The identifier of a user (the owner of a task)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}


/// How a reminder reaches the user
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderType {
    /// A local notification, fired by the [`Scheduler`](crate::scheduler::Scheduler)
    Push,
    /// An email, sent by a server-side process
    Email,
}

impl Default for ReminderType {
    fn default() -> Self {
        ReminderType::Push
    }
}

impl Display for ReminderType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Push => write!(f, "push"),
            Self::Email => write!(f, "email"),
        }
    }
}


/// A to-do task
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    text: String,
    #[serde(default)]
    completed: bool,
    /// The user who created this task
    #[serde(rename = "user_id")]
    owner: UserId,
    #[serde(default)]
    reminder_at: Option<DateTime<Utc>>,
    /// Tasks created before this column existed have no value here. See [`Task::effective_reminder_type`]
    #[serde(default)]
    reminder_type: Option<ReminderType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a Task instance, usually to mirror a record of the remote store
    pub fn new(id: TaskId, text: String, completed: bool, owner: UserId) -> Self {
        Self {
            id,
            text,
            completed,
            owner,
            reminder_at: None,
            reminder_type: None,
            created_at: None,
        }
    }

    /// Builder-style setter for the reminder fields
    pub fn with_reminder(mut self, at: Option<DateTime<Utc>>, reminder_type: Option<ReminderType>) -> Self {
        self.reminder_at = at;
        self.reminder_type = reminder_type;
        self
    }

    pub fn with_creation_date(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn id(&self) -> &TaskId     { &self.id        }
    pub fn text(&self) -> &str      { &self.text      }
    pub fn completed(&self) -> bool { self.completed  }
    pub fn owner(&self) -> &UserId  { &self.owner     }
    pub fn reminder_at(&self) -> Option<&DateTime<Utc>>     { self.reminder_at.as_ref() }
    pub fn reminder_type(&self) -> Option<ReminderType>     { self.reminder_type }
    pub fn creation_date(&self) -> Option<&DateTime<Utc>>   { self.created_at.as_ref() }

    /// The channel this task's reminder is delivered through.
    ///
    /// Records written before reminder types existed have a `reminder_at` but no type. They are push reminders.
    pub fn effective_reminder_type(&self) -> Option<ReminderType> {
        self.reminder_at.map(|_| self.reminder_type.unwrap_or_default())
    }

    /// Whether a local notification should be scheduled for this task at `now`
    pub fn has_pending_push_reminder(&self, now: &DateTime<Utc>) -> bool {
        match (self.completed, self.reminder_at, self.effective_reminder_type()) {
            (false, Some(at), Some(ReminderType::Push)) => at > *now,
            _ => false,
        }
    }

    /// Apply a confirmed patch (i.e. the remote store has already accepted it)
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(at) = patch.reminder_at {
            self.reminder_at = at;
        }
        if let Some(reminder_type) = patch.reminder_type {
            self.reminder_type = reminder_type;
        }
    }
}


/// A task that the user submitted, but that the remote store has not assigned an id to yet
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewTask {
    pub text: String,
    pub completed: bool,
    #[serde(rename = "user_id")]
    pub owner: UserId,
}

impl NewTask {
    pub fn new(text: String, owner: UserId) -> Self {
        Self { text, completed: false, owner }
    }
}


/// A partial update of a task. `None` fields are left untouched.
///
/// The reminder fields are doubly optional: `Some(None)` is serialized as a JSON `null` and clears the column.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_at: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_type: Option<Option<ReminderType>>,
}

impl TaskPatch {
    pub fn text(text: String) -> Self {
        Self { text: Some(text), ..Self::default() }
    }

    pub fn completed(completed: bool) -> Self {
        Self { completed: Some(completed), ..Self::default() }
    }

    /// Set (or clear, when `at` is `None`) both reminder fields at once
    pub fn reminder(at: Option<DateTime<Utc>>, reminder_type: Option<ReminderType>) -> Self {
        let reminder_type = match at {
            None => None,
            Some(_) => Some(reminder_type.unwrap_or_default()),
        };
        Self {
            reminder_at: Some(at),
            reminder_type: Some(reminder_type),
            ..Self::default()
        }
    }

    /// Whether this patch changes nothing
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

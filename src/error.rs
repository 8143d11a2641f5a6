//! Errors returned by the task store, the provider and the HTTP client

use std::time::Duration;

use crate::config::Locale;
use crate::task::TaskId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote store did not answer in time
    #[error("the server did not answer within {0:?}")]
    Timeout(Duration),

    /// The remote store refused or failed the operation.
    /// `message` is the human-readable explanation it sent back, if any
    #[error("remote store error: {}", .message.as_deref().unwrap_or("no details"))]
    Remote { message: Option<String> },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("missing configuration value {0}")]
    MissingConfig(String),

    /// Task texts cannot be empty or only made of whitespace
    #[error("task text cannot be empty")]
    EmptyText,

    /// Completed tasks cannot be renamed
    #[error("task {0} is completed and cannot be edited")]
    CompletedTask(TaskId),

    #[error("no task with id {0}")]
    UnknownTask(TaskId),
}

impl Error {
    pub fn remote<S: ToString>(message: S) -> Self {
        Error::Remote { message: Some(message.to_string()) }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }

    /// The string to display next to the control that triggered the failed operation.
    ///
    /// Apart from timeouts, errors are not told apart: the underlying message is shown when there is one,
    /// otherwise a generic "operation failed" string.
    pub fn user_message(&self, locale: Locale) -> String {
        match self {
            Error::Timeout(_) => match locale {
                Locale::Es => "El servidor tardó demasiado en responder. Inténtalo de nuevo.".to_string(),
                Locale::En => "The server took too long to respond. Please try again.".to_string(),
            },
            Error::EmptyText => match locale {
                Locale::Es => "La tarea no puede estar vacía.".to_string(),
                Locale::En => "The task cannot be empty.".to_string(),
            },
            Error::CompletedTask(_) => match locale {
                Locale::Es => "No se puede editar una tarea completada.".to_string(),
                Locale::En => "A completed task cannot be edited.".to_string(),
            },
            Error::Remote { message: Some(message) } if !message.trim().is_empty() => message.clone(),
            Error::Http(err) => err.to_string(),
            _ => fallback_message(locale).to_string(),
        }
    }
}

fn fallback_message(locale: Locale) -> &'static str {
    match locale {
        Locale::Es => "No se pudo completar la operación.",
        Locale::En => "The operation could not be completed.",
    }
}

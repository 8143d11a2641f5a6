//! Support for library configuration options

use std::env;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use once_cell::sync::Lazy;

/// Title of every reminder notification. The body is the task text.
/// Feel free to override it when initing this library.
pub static NOTIFICATION_TITLE: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("MyPsico - Recordatorio".to_string())));

/// How long a remote call may take before it is considered failed
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// The language user-facing messages are produced in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Locale {
    Es,
    En,
}

impl Default for Locale {
    fn default() -> Self {
        Locale::Es
    }
}

impl Locale {
    /// Parse a language tag such as `es`, `en-US` or `es_AR`.
    /// Unknown languages fall back to the default locale
    pub fn from_tag(tag: &str) -> Self {
        let lang = tag.split(|c: char| c == '-' || c == '_').next().unwrap_or("");
        match lang.to_ascii_lowercase().as_str() {
            "en" => Locale::En,
            "es" => Locale::Es,
            other => {
                log::warn!("Unsupported locale {:?}, using the default one", other);
                Locale::default()
            },
        }
    }
}

/// Tunables of a [`TaskProvider`](crate::provider::TaskProvider)
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Every remote call is aborted after this delay
    pub timeout: Duration,
    /// Language of the messages returned by [`Error::user_message`](crate::Error::user_message)
    pub locale: Locale,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            locale: Locale::default(),
        }
    }
}

impl Settings {
    /// Read `MYPSICO_TIMEOUT_SECS` and `MYPSICO_LOCALE`, keeping defaults for missing or invalid values
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Ok(secs) = env::var("MYPSICO_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(secs) if secs > 0 => settings.timeout = Duration::from_secs(secs),
                _ => log::warn!("Invalid MYPSICO_TIMEOUT_SECS value {:?}, using {:?}", secs, settings.timeout),
            }
        }
        if let Ok(tag) = env::var("MYPSICO_LOCALE") {
            settings.locale = Locale::from_tag(&tag);
        }

        settings
    }
}

/// Returns the current notification title
pub fn notification_title() -> String {
    match NOTIFICATION_TITLE.lock() {
        Ok(title) => title.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

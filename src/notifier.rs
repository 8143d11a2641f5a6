//! Best-effort local notifications

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::config;
use crate::traits::{NotificationBackend, Permission};

/// Shows reminder notifications, provided the user allowed them.
///
/// Nothing is ever reported back: a notification that cannot be shown is simply dropped.
pub struct Notifier {
    backend: Box<dyn NotificationBackend>,
    permission: Mutex<Permission>,
    prompted: AtomicBool,
}

impl Notifier {
    pub fn new(backend: Box<dyn NotificationBackend>) -> Self {
        let permission = backend.permission();
        Self {
            backend,
            permission: Mutex::new(permission),
            prompted: AtomicBool::new(false),
        }
    }

    pub fn permission(&self) -> Permission {
        *self.permission.lock().unwrap()
    }

    /// Ask for permission if the user has never been asked.
    ///
    /// The user is prompted at most once per `Notifier`, whatever they answer.
    pub async fn init(&self) -> Permission {
        if self.permission() != Permission::Default || self.prompted.swap(true, Ordering::SeqCst) {
            return self.permission();
        }

        let answer = self.backend.request_permission().await;
        log::info!("Notification permission: {:?}", answer);
        *self.permission.lock().unwrap() = answer;
        answer
    }

    /// Show a reminder with `body` as its text. Returns whether it has been shown
    pub fn notify(&self, body: &str) -> bool {
        if self.permission() != Permission::Granted {
            log::debug!("Notifications are not allowed, dropping reminder {:?}", body);
            return false;
        }
        self.backend.show(&config::notification_title(), body);
        true
    }
}


/// A backend that writes notifications to the log. It needs no permission
#[derive(Clone, Copy, Debug, Default)]
pub struct LogBackend;

#[async_trait]
impl NotificationBackend for LogBackend {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    fn show(&self, title: &str, body: &str) {
        log::info!("[{}] {}", title, body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    /// Answers prompts with a fixed answer, and counts what happens
    struct Prompted {
        answer: Permission,
        prompts: AtomicUsize,
        shown: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl NotificationBackend for Arc<Prompted> {
        fn permission(&self) -> Permission { Permission::Default }
        async fn request_permission(&self) -> Permission {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            self.answer
        }
        fn show(&self, title: &str, body: &str) {
            self.shown.lock().unwrap().push((title.to_string(), body.to_string()));
        }
    }

    fn prompted(answer: Permission) -> Arc<Prompted> {
        Arc::new(Prompted { answer, prompts: AtomicUsize::new(0), shown: Mutex::new(Vec::new()) })
    }

    #[tokio::test]
    async fn denied_permission_is_asked_once() {
        let backend = prompted(Permission::Denied);
        let notifier = Notifier::new(Box::new(Arc::clone(&backend)));
        assert_eq!(notifier.permission(), Permission::Default);

        assert_eq!(notifier.init().await, Permission::Denied);
        assert_eq!(notifier.init().await, Permission::Denied);
        assert_eq!(backend.prompts.load(Ordering::SeqCst), 1);

        assert!(!notifier.notify("Take a walk"));
        assert!(backend.shown.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn granted_permission_shows_notifications() {
        let backend = prompted(Permission::Granted);
        let notifier = Notifier::new(Box::new(Arc::clone(&backend)));

        // Not asked yet
        assert!(!notifier.notify("Take a walk"));

        notifier.init().await;
        assert!(notifier.notify("Take a walk"));
        let shown = backend.shown.lock().unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].0, config::notification_title());
        assert_eq!(shown[0].1, "Take a walk");
    }

    #[tokio::test]
    async fn log_backend_never_prompts() {
        let notifier = Notifier::new(Box::new(LogBackend));
        assert_eq!(notifier.init().await, Permission::Granted);
        assert!(notifier.notify("Hydrate"));
    }
}

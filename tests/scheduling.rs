//! How reminders are turned into deferred callbacks

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use mypsico_tasks::memory_store::MemoryStore;
use mypsico_tasks::notifier::{LogBackend, Notifier};
use mypsico_tasks::scheduler::{Scheduler, TokioTimer};
use mypsico_tasks::config::Settings;
use mypsico_tasks::{ReminderType, Task, TaskId, TaskProvider, UserId};

mod common;
use common::{RecordingBackend, RecordingTimer};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

fn task(id: &str, completed: bool, reminder_in_ms: Option<i64>, reminder_type: Option<ReminderType>) -> Task {
    Task::new(TaskId::from(id), format!("Task {}", id), completed, UserId::from("u1"))
        .with_reminder(reminder_in_ms.map(|ms| now() + chrono::Duration::milliseconds(ms)), reminder_type)
}

fn scheduler() -> Scheduler<RecordingTimer> {
    let notifier = Arc::new(Notifier::new(Box::new(LogBackend)));
    Scheduler::new(RecordingTimer::default(), notifier)
}

#[test]
fn past_reminders_are_never_scheduled() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut scheduler = scheduler();

    let tasks = vec![
        task("t1", false, Some(-1), Some(ReminderType::Push)),
        task("t2", false, Some(-3_600_000), None),
        task("t3", false, Some(0), Some(ReminderType::Push)),
    ];
    scheduler.rebuild_at(&tasks, now());

    assert_eq!(scheduler.n_scheduled(), 0);
    assert_eq!(scheduler.timer().n_scheduled(), 0);
}

#[test]
fn completed_tasks_are_never_scheduled() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut scheduler = scheduler();

    let tasks = vec![
        task("t1", true, Some(60_000), Some(ReminderType::Push)),
        task("t2", true, Some(1), None),
    ];
    scheduler.rebuild_at(&tasks, now());

    assert_eq!(scheduler.n_scheduled(), 0);
    assert_eq!(scheduler.timer().n_live(), 0);
}

#[test]
fn one_minute_push_reminder() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut scheduler = scheduler();

    scheduler.rebuild_at(&[task("t1", false, Some(60_000), Some(ReminderType::Push))], now());

    assert_eq!(scheduler.n_scheduled(), 1);
    let handle = scheduler.scheduled(&TaskId::from("t1")).unwrap();
    assert_eq!(scheduler.timer().delay_of(handle), Some(Duration::from_millis(60_000)));
}

#[test]
fn email_reminders_are_left_to_the_server() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut scheduler = scheduler();

    let tasks = vec![
        task("email", false, Some(60_000), Some(ReminderType::Email)),
        task("legacy", false, Some(60_000), None),
        task("no-reminder", false, None, None),
    ];
    scheduler.rebuild_at(&tasks, now());

    assert_eq!(scheduler.n_scheduled(), 1);
    assert!(scheduler.scheduled(&TaskId::from("legacy")).is_some());
    assert!(scheduler.scheduled(&TaskId::from("email")).is_none());
}

#[test]
fn rebuilding_does_not_leak_callbacks() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut scheduler = scheduler();

    let tasks = vec![
        task("t1", false, Some(60_000), Some(ReminderType::Push)),
        task("t2", false, Some(120_000), None),
        task("t3", false, Some(180_000), Some(ReminderType::Push)),
    ];
    scheduler.rebuild_at(&tasks, now());
    let first: Vec<_> = tasks.iter().map(|t| scheduler.scheduled(t.id()).unwrap()).collect();
    scheduler.rebuild_at(&tasks, now());

    assert_eq!(scheduler.n_scheduled(), 3);
    assert_eq!(scheduler.timer().n_live(), 3);
    assert_eq!(scheduler.timer().n_scheduled(), 6);
    for (task, old_handle) in tasks.iter().zip(first) {
        let new_handle = scheduler.scheduled(task.id()).unwrap();
        assert_ne!(new_handle, old_handle);
        assert_eq!(scheduler.timer().delay_of(old_handle), None);
    }

    scheduler.shutdown();
    assert_eq!(scheduler.n_scheduled(), 0);
    assert_eq!(scheduler.timer().n_live(), 0);
}

#[test]
fn stale_and_completed_together_schedule_nothing() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut scheduler = scheduler();

    let tasks = vec![
        task("done", true, Some(60_000), Some(ReminderType::Push)),
        task("late", false, Some(-60_000), Some(ReminderType::Push)),
    ];
    scheduler.rebuild_at(&tasks, now());

    assert_eq!(scheduler.n_scheduled(), 0);
}

#[tokio::test]
async fn clearing_a_reminder_unschedules_it() {
    let _ = env_logger::builder().is_test(true).try_init();

    let store = MemoryStore::new();
    let provider = TaskProvider::new(store, UserId::from("u1"), Settings::default());
    let id = provider.add("Evening reflection").await.unwrap();
    provider.set_reminder(&id, Some(Utc::now() + chrono::Duration::hours(1)), Some(ReminderType::Push)).await.unwrap();

    let mut scheduler = scheduler();
    scheduler.rebuild(&provider.tasks());
    assert!(scheduler.scheduled(&id).is_some());

    provider.set_reminder(&id, None, None).await.unwrap();
    let task = provider.task(&id).unwrap();
    assert_eq!(task.reminder_at(), None);
    assert_eq!(task.reminder_type(), None);

    scheduler.rebuild(&provider.tasks());
    assert!(scheduler.scheduled(&id).is_none());
    assert_eq!(scheduler.timer().n_live(), 0);
}

#[tokio::test(start_paused = true)]
async fn scheduler_follows_the_task_list() {
    let _ = env_logger::builder().is_test(true).try_init();

    let backend = RecordingBackend::default();
    let notifier = Arc::new(Notifier::new(Box::new(backend.clone())));
    notifier.init().await;

    let provider = TaskProvider::new(MemoryStore::new(), UserId::from("u1"), Settings::default());
    let scheduler = Scheduler::new(TokioTimer::new(), notifier);
    let scheduling = tokio::spawn(scheduler.watch_list(provider.subscribe()));

    let breathe = provider.add("Breathe").await.unwrap();
    let walk = provider.add("Walk").await.unwrap();
    provider.set_reminder(&breathe, Some(Utc::now() + chrono::Duration::seconds(60)), None).await.unwrap();
    provider.set_reminder(&walk, Some(Utc::now() + chrono::Duration::seconds(90)), Some(ReminderType::Push)).await.unwrap();

    // Completing "Walk" before its reminder must cancel it
    provider.set_completed(&walk, true).await.unwrap();

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(backend.shown(), vec!["Breathe".to_string()]);

    // Closing the list tears the scheduler down
    provider.set_reminder(&breathe, Some(Utc::now() + chrono::Duration::seconds(60)), None).await.unwrap();
    tokio::task::yield_now().await;
    drop(provider);
    scheduling.await.unwrap();
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(backend.shown(), vec!["Breathe".to_string()]);
}

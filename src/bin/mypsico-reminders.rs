//! Loads the tasks of a user and fires their push reminders until Ctrl-C is pressed.
//!
//! The backend is configured with the `MYPSICO_URL`, `MYPSICO_API_KEY`, `MYPSICO_USER_ID` and `MYPSICO_ACCESS_TOKEN` variables.
//! Without them, an in-memory store with a demo task is used instead.

use std::sync::Arc;

use chrono::{Duration, Utc};

use mypsico_tasks::cache::Cache;
use mypsico_tasks::client::Client;
use mypsico_tasks::config::Settings;
use mypsico_tasks::memory_store::MemoryStore;
use mypsico_tasks::notifier::{LogBackend, Notifier};
use mypsico_tasks::scheduler::{Scheduler, TokioTimer};
use mypsico_tasks::traits::TaskStore;
use mypsico_tasks::{ReminderType, Session, TaskProvider, UserId};


#[tokio::main]
async fn main() {
    env_logger::init();

    let settings = Settings::from_env();
    let cache_path = Cache::cache_file();
    let mut cache = match Cache::from_file(&cache_path) {
        Ok(cache) => cache,
        Err(err) => {
            log::warn!("Invalid cache file: {}. Using a default cache", err);
            Cache::new(&cache_path)
        }
    };

    match Session::from_env() {
        Ok(session) => {
            let owner = session.user_id().clone();
            let client = match Client::new(session) {
                Ok(client) => client,
                Err(err) => {
                    eprintln!("Unable to create a client: {}", err);
                    return;
                },
            };
            run(TaskProvider::new(client, owner, settings), &mut cache).await;
        },
        Err(err) => {
            log::warn!("No backend configured ({}). Using an in-memory store", err);
            let provider = TaskProvider::new(MemoryStore::new(), UserId::from("demo"), settings);
            if let Err(err) = add_demo_task(&provider).await {
                eprintln!("{}", err.user_message(provider.settings().locale));
            }
            run(provider, &mut cache).await;
        },
    }
}

async fn add_demo_task(provider: &TaskProvider<MemoryStore>) -> mypsico_tasks::Result<()> {
    let id = provider.add("Five minutes of mindful breathing").await?;
    provider.set_reminder(&id, Some(Utc::now() + Duration::seconds(5)), Some(ReminderType::Push)).await
}

async fn run<R: TaskStore>(provider: TaskProvider<R>, cache: &mut Cache) {
    println!("---- Cached tasks -----");
    mypsico_tasks::utils::print_task_list(cache.tasks_of(provider.owner()));

    let notifier = Arc::new(Notifier::new(Box::new(LogBackend)));
    notifier.init().await;

    let receiver = provider.subscribe();
    let scheduler = Scheduler::new(TokioTimer::new(), Arc::clone(&notifier));
    let scheduling = tokio::spawn(scheduler.watch_list(receiver));

    match provider.load().await {
        Err(err) => eprintln!("{}", err.user_message(provider.settings().locale)),
        Ok(()) => {
            cache.replace_tasks(provider.owner(), provider.tasks());
            cache.save_to_file();
        },
    }

    println!("---- Tasks -----");
    mypsico_tasks::utils::print_task_list(&provider.tasks());
    println!("Waiting for reminders. Press Ctrl-C to quit.");

    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Unable to listen for Ctrl-C: {}", err);
    }

    // Dropping the provider closes the task list, which cancels the pending reminders
    drop(provider);
    if let Err(err) = scheduling.await {
        log::error!("Scheduler stopped abnormally: {}", err);
    }
}

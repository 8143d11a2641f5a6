//! This module provides a local cache of the task list, so that it can be displayed before the backend answers

use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{Task, UserId};

/// A snapshot of the task list of a user, stored in a local JSON file
#[derive(Debug, PartialEq)]
pub struct Cache {
    backing_file: PathBuf,
    data: CachedData,
}

#[derive(Default, Debug, PartialEq, Serialize, Deserialize)]
struct CachedData {
    owner: Option<UserId>,
    tasks: Vec<Task>,
    last_load: Option<DateTime<Utc>>,
}

impl Cache {
    /// Get the path to the cache file (`MYPSICO_CACHE_FILE`, or a file in the current folder)
    pub fn cache_file() -> PathBuf {
        match env::var("MYPSICO_CACHE_FILE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => PathBuf::from("mypsico-tasks-cache.json"),
        }
    }

    /// Initialize a cache from the content of a valid backing file if it exists.
    /// Returns an error otherwise
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let data = match std::fs::File::open(path) {
            Err(err) => {
                return Err(format!("Unable to open file {:?}: {}", path, err).into());
            },
            Ok(file) => serde_json::from_reader(file)?,
        };

        Ok(Self{
            backing_file: PathBuf::from(path),
            data,
        })
    }

    /// Initialize an empty cache
    pub fn new(path: &Path) -> Self {
        Self{
            backing_file: PathBuf::from(path),
            data: CachedData::default(),
        }
    }

    /// Store the current Cache to its backing file
    pub fn save_to_file(&self) {
        let path = &self.backing_file;
        let file = match std::fs::File::create(path) {
            Err(err) => {
                log::warn!("Unable to save file {:?}: {}", path, err);
                return;
            },
            Ok(f) => f,
        };

        if let Err(err) = serde_json::to_writer(file, &self.data) {
            log::warn!("Unable to serialize: {}", err);
        };
    }

    /// Replace the cached tasks with a freshly loaded list
    pub fn replace_tasks(&mut self, owner: &UserId, tasks: Vec<Task>) {
        self.data.owner = Some(owner.clone());
        self.data.tasks = tasks;
        self.data.last_load = Some(Utc::now());
    }

    /// The cached tasks of `owner`. A cache written for another user is ignored
    pub fn tasks_of(&self, owner: &UserId) -> &[Task] {
        match &self.data.owner {
            Some(cached_owner) if cached_owner == owner => self.data.tasks.as_slice(),
            _ => &[],
        }
    }

    pub fn owner(&self) -> Option<&UserId> {
        self.data.owner.as_ref()
    }

    /// The last time the cached list was loaded from the backend (or None in case it has never been)
    pub fn last_load(&self) -> Option<DateTime<Utc>> {
        self.data.last_load
    }
}

//! JSON export of the whole database.

use crate::config::PathsConfig;
use crate::models::Message;
use crate::store::Store;
use crate::{Result, ThreadsError};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDump {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadDump {
    pub id: i64,
    pub creator_id: Option<i64>,
    pub participants: Vec<i64>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Users (without password hashes), threads and messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseDump {
    pub users: Vec<UserDump>,
    pub threads: Vec<ThreadDump>,
    pub messages: Vec<Message>,
}

impl DatabaseDump {
    pub fn collect(store: &Store) -> Result<Self> {
        let users = store
            .list_users()?
            .into_iter()
            .map(|u| UserDump {
                id: u.id,
                username: u.username,
                email: u.email,
                is_staff: u.is_staff,
                is_superuser: u.is_superuser,
                date_joined: u.date_joined,
            })
            .collect();

        let mut threads = Vec::new();
        for thread in store.list_threads()? {
            threads.push(ThreadDump {
                id: thread.id,
                creator_id: store.thread_creator(thread.id)?,
                participants: thread.participants.iter().map(|p| p.id).collect(),
                created: thread.created,
                updated: thread.updated,
            });
        }

        Ok(Self {
            users,
            threads,
            messages: store.list_messages()?,
        })
    }
}

/// `db_dump_YYYYMMDD_HHMMSS.json` in local time.
pub fn default_dump_name() -> String {
    format!(
        "{}{}.json",
        PathsConfig::DUMP_FILE_PREFIX,
        Local::now().format("%Y%m%d_%H%M%S")
    )
}

/// Write a dump to `dir/output`, creating `dir` if needed.
pub fn write_dump(store: &Store, dir: &Path, output: Option<&str>) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| ThreadsError::io_with_path(e, dir))?;

    let name = match output {
        Some(name) => name.to_string(),
        None => default_dump_name(),
    };
    let path = dir.join(name);

    let dump = DatabaseDump::collect(store)?;
    let json = serde_json::to_string_pretty(&dump)?;
    std::fs::write(&path, json).map_err(|e| ThreadsError::io_with_path(e, &path))?;

    info!(
        "Wrote dump of {} users, {} threads, {} messages to {}",
        dump.users.len(),
        dump.threads.len(),
        dump.messages.len(),
        path.display()
    );
    Ok(path)
}

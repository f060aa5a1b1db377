use super::{placeholders, timestamp_column, timestamp_to_sql, Store};
use crate::models::{pair_key, Thread, ThreadRead, UserSummary};
use crate::ordering::Ordering;
use crate::pagination::{Page, PageRequest};
use crate::{Result, ThreadsError};
use chrono::Utc;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior,
};
use std::collections::HashMap;
use tracing::debug;

const THREAD_COLUMNS: &str = "t.id, t.creator_id, t.created, t.updated";

fn thread_from_row(row: &Row<'_>) -> rusqlite::Result<Thread> {
    Ok(Thread {
        id: row.get(0)?,
        creator_id: row.get(1)?,
        created: timestamp_column(row, 2)?,
        updated: timestamp_column(row, 3)?,
    })
}

/// Participants of each thread, ordered by user id.
fn participants_for(
    conn: &Connection,
    thread_ids: &[i64],
) -> Result<HashMap<i64, Vec<UserSummary>>> {
    let mut by_thread: HashMap<i64, Vec<UserSummary>> = HashMap::new();
    if thread_ids.is_empty() {
        return Ok(by_thread);
    }

    let sql = format!(
        "SELECT p.thread_id, u.id, u.username
         FROM thread_participants p
         JOIN users u ON u.id = p.user_id
         WHERE p.thread_id IN ({})
         ORDER BY p.thread_id, u.id",
        placeholders(thread_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(thread_ids.iter()), |row| {
        Ok((
            row.get::<_, i64>(0)?,
            UserSummary {
                id: row.get(1)?,
                username: row.get(2)?,
            },
        ))
    })?;
    for row in rows {
        let (thread_id, user) = row?;
        by_thread.entry(thread_id).or_default().push(user);
    }
    Ok(by_thread)
}

fn with_participants(conn: &Connection, threads: Vec<Thread>) -> Result<Vec<ThreadRead>> {
    let ids: Vec<i64> = threads.iter().map(|t| t.id).collect();
    let mut participants = participants_for(conn, &ids)?;
    Ok(threads
        .into_iter()
        .map(|t| ThreadRead {
            id: t.id,
            participants: participants.remove(&t.id).unwrap_or_default(),
            created: t.created,
            updated: t.updated,
        })
        .collect())
}

fn insert_participants(conn: &Connection, thread_id: i64, a: i64, b: i64) -> Result<()> {
    for user_id in [a, b] {
        conn.execute(
            "INSERT INTO thread_participants (thread_id, user_id) VALUES (?1, ?2)",
            params![thread_id, user_id],
        )?;
    }
    Ok(())
}

fn load_thread(conn: &Connection, id: i64) -> Result<Option<ThreadRead>> {
    let thread = conn
        .query_row(
            &format!("SELECT {THREAD_COLUMNS} FROM threads t WHERE t.id = ?1"),
            [id],
            thread_from_row,
        )
        .optional()?;
    match thread {
        Some(thread) => Ok(with_participants(conn, vec![thread])?.pop()),
        None => Ok(None),
    }
}

impl Store {
    /// The thread shared by two users, if one exists.
    pub fn find_thread_between(&self, a: i64, b: i64) -> Result<Option<ThreadRead>> {
        let conn = self.conn()?;
        let id: Option<i64> = conn
            .query_row(
                "SELECT id FROM threads WHERE pair_key = ?1",
                [pair_key(a, b)],
                |row| row.get(0),
            )
            .optional()?;
        match id {
            Some(id) => load_thread(&conn, id),
            None => Ok(None),
        }
    }

    /// Create a thread between two distinct users in one transaction.
    pub fn create_thread(&self, creator_id: Option<i64>, a: i64, b: i64) -> Result<ThreadRead> {
        if a == b {
            return Err(ThreadsError::validation(
                "participant_id",
                "Cannot create thread with yourself",
            ));
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO threads (pair_key, creator_id, created, updated) VALUES (?1, ?2, ?3, ?3)",
            params![pair_key(a, b), creator_id, timestamp_to_sql(&Utc::now())],
        )?;
        let thread_id = tx.last_insert_rowid();
        insert_participants(&tx, thread_id, a, b)?;
        tx.commit()?;
        debug!("Inserted thread {} for pair {}", thread_id, pair_key(a, b));

        load_thread(&conn, thread_id)?.ok_or(ThreadsError::ThreadNotFound { thread_id })
    }

    /// The thread between two users, created if the pair has none.
    ///
    /// Lookup and insert share one lock and transaction, and the insert
    /// yields to an existing `pair_key` row, so concurrent callers for the
    /// same pair all get the same thread. The flag is true when this call
    /// created it.
    pub fn get_or_create_thread(
        &self,
        creator_id: Option<i64>,
        a: i64,
        b: i64,
    ) -> Result<(ThreadRead, bool)> {
        if a == b {
            return Err(ThreadsError::validation(
                "participant_id",
                "Cannot create thread with yourself",
            ));
        }

        let key = pair_key(a, b);
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let inserted = tx.execute(
            "INSERT INTO threads (pair_key, creator_id, created, updated) VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(pair_key) DO NOTHING",
            params![key, creator_id, timestamp_to_sql(&Utc::now())],
        )?;
        let thread_id = if inserted > 0 {
            let thread_id = tx.last_insert_rowid();
            insert_participants(&tx, thread_id, a, b)?;
            debug!("Inserted thread {} for pair {}", thread_id, key);
            thread_id
        } else {
            tx.query_row("SELECT id FROM threads WHERE pair_key = ?1", [&key], |row| {
                row.get(0)
            })?
        };
        tx.commit()?;

        let thread =
            load_thread(&conn, thread_id)?.ok_or(ThreadsError::ThreadNotFound { thread_id })?;
        Ok((thread, inserted > 0))
    }

    pub fn get_thread(&self, id: i64) -> Result<Option<ThreadRead>> {
        let conn = self.conn()?;
        load_thread(&conn, id)
    }

    pub fn thread_exists(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM threads WHERE id = ?1)",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Participants of one thread, ordered by user id.
    pub fn thread_participants(&self, thread_id: i64) -> Result<Vec<UserSummary>> {
        let conn = self.conn()?;
        let mut participants = participants_for(&conn, &[thread_id])?;
        Ok(participants.remove(&thread_id).unwrap_or_default())
    }

    pub fn is_participant(&self, thread_id: i64, user_id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let exists = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM thread_participants WHERE thread_id = ?1 AND user_id = ?2
             )",
            params![thread_id, user_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// One page of the threads a user participates in.
    pub fn list_user_threads(
        &self,
        user_id: i64,
        ordering: Ordering,
        page: PageRequest,
    ) -> Result<Page<ThreadRead>> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM thread_participants WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;

        let sql = format!(
            "SELECT {THREAD_COLUMNS}
             FROM threads t
             JOIN thread_participants p ON p.thread_id = t.id
             WHERE p.user_id = ?1
             ORDER BY {}
             LIMIT ?2 OFFSET ?3",
            ordering.order_clause("t")
        );
        let mut stmt = conn.prepare(&sql)?;
        let threads = stmt
            .query_map(
                params![user_id, page.limit as i64, page.offset as i64],
                thread_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Page {
            count: count as usize,
            results: with_participants(&conn, threads)?,
        })
    }

    /// Every thread ordered by id.
    pub fn list_threads(&self) -> Result<Vec<ThreadRead>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {THREAD_COLUMNS} FROM threads t ORDER BY t.id"
        ))?;
        let threads = stmt
            .query_map([], thread_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        with_participants(&conn, threads)
    }

    /// Creator of a thread, if it was recorded.
    pub fn thread_creator(&self, thread_id: i64) -> Result<Option<i64>> {
        let conn = self.conn()?;
        let creator = conn
            .query_row(
                "SELECT creator_id FROM threads WHERE id = ?1",
                [thread_id],
                |row| row.get::<_, Option<i64>>(0),
            )
            .optional()?;
        Ok(creator.flatten())
    }

    /// Delete a thread and, through cascades, its messages.
    pub fn delete_thread(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM threads WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }
}

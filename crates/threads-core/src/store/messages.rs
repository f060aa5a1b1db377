use super::{placeholders, timestamp_column, timestamp_to_sql, Store};
use crate::models::{Message, MessageRead, UserSummary};
use crate::ordering::Ordering;
use crate::pagination::{Page, PageRequest};
use crate::{Result, ThreadsError};
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::debug;

const MESSAGE_READ_COLUMNS: &str =
    "m.id, m.sender_id, u.username, m.text, m.thread_id, m.created, m.is_read";

fn message_read_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRead> {
    Ok(MessageRead {
        id: row.get(0)?,
        sender: UserSummary {
            id: row.get(1)?,
            username: row.get(2)?,
        },
        text: row.get(3)?,
        thread_id: row.get(4)?,
        created: timestamp_column(row, 5)?,
        is_read: row.get(6)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        thread_id: row.get(1)?,
        sender_id: row.get(2)?,
        text: row.get(3)?,
        is_read: row.get(4)?,
        created: timestamp_column(row, 5)?,
    })
}

fn load_message_read(conn: &Connection, id: i64) -> Result<Option<MessageRead>> {
    let message = conn
        .query_row(
            &format!(
                "SELECT {MESSAGE_READ_COLUMNS}
                 FROM messages m JOIN users u ON u.id = m.sender_id
                 WHERE m.id = ?1"
            ),
            [id],
            message_read_from_row,
        )
        .optional()?;
    Ok(message)
}

impl Store {
    /// Insert a message. Callers validate membership and text beforehand.
    pub fn create_message(&self, thread_id: i64, sender_id: i64, text: &str) -> Result<MessageRead> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO messages (thread_id, sender_id, text, is_read, created)
             VALUES (?1, ?2, ?3, 0, ?4)",
            params![thread_id, sender_id, text, timestamp_to_sql(&Utc::now())],
        )?;
        let message_id = conn.last_insert_rowid();
        debug!("Inserted message {} into thread {}", message_id, thread_id);

        load_message_read(&conn, message_id)?.ok_or(ThreadsError::MessageNotFound { message_id })
    }

    pub fn get_message(&self, id: i64) -> Result<Option<Message>> {
        let conn = self.conn()?;
        let message = conn
            .query_row(
                "SELECT id, thread_id, sender_id, text, is_read, created FROM messages WHERE id = ?1",
                [id],
                message_from_row,
            )
            .optional()?;
        Ok(message)
    }

    /// One page of a thread's messages with their senders.
    pub fn list_thread_messages(
        &self,
        thread_id: i64,
        ordering: Ordering,
        page: PageRequest,
    ) -> Result<Page<MessageRead>> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE thread_id = ?1",
            [thread_id],
            |row| row.get(0),
        )?;

        let sql = format!(
            "SELECT {MESSAGE_READ_COLUMNS}
             FROM messages m JOIN users u ON u.id = m.sender_id
             WHERE m.thread_id = ?1
             ORDER BY {}
             LIMIT ?2 OFFSET ?3",
            ordering.order_clause("m")
        );
        let mut stmt = conn.prepare(&sql)?;
        let results = stmt
            .query_map(
                params![thread_id, page.limit as i64, page.offset as i64],
                message_read_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Page {
            count: count as usize,
            results,
        })
    }

    /// Every message ordered by id.
    pub fn list_messages(&self) -> Result<Vec<Message>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, thread_id, sender_id, text, is_read, created FROM messages ORDER BY id",
        )?;
        let messages = stmt
            .query_map([], message_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(messages)
    }

    /// Unread messages in a thread that were not sent by `user_id`.
    pub fn unread_message_ids(&self, thread_id: i64, user_id: i64) -> Result<Vec<i64>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id FROM messages
             WHERE thread_id = ?1 AND is_read = 0 AND sender_id != ?2
             ORDER BY id",
        )?;
        let ids = stmt
            .query_map(params![thread_id, user_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    /// Mark messages read on behalf of a recipient.
    ///
    /// Only unread messages in threads the user participates in, and not sent
    /// by the user, are changed. Returns the number of rows updated.
    pub fn mark_read(&self, user_id: i64, message_ids: &[i64]) -> Result<usize> {
        if message_ids.is_empty() {
            return Ok(0);
        }

        let conn = self.conn()?;
        let sql = format!(
            "UPDATE messages SET is_read = 1
             WHERE id IN ({})
               AND is_read = 0
               AND sender_id != ?
               AND thread_id IN (SELECT thread_id FROM thread_participants WHERE user_id = ?)",
            placeholders(message_ids.len())
        );
        let mut values: Vec<Value> = message_ids.iter().map(|id| Value::Integer(*id)).collect();
        values.push(Value::Integer(user_id));
        values.push(Value::Integer(user_id));

        let updated = conn.execute(&sql, params_from_iter(values))?;
        debug!("User {} marked {} messages read", user_id, updated);
        Ok(updated)
    }

    /// Set the read flag on messages regardless of recipient.
    pub fn set_read_flag(&self, message_ids: &[i64], is_read: bool) -> Result<usize> {
        if message_ids.is_empty() {
            return Ok(0);
        }

        let conn = self.conn()?;
        let sql = format!(
            "UPDATE messages SET is_read = ? WHERE id IN ({}) AND is_read != ?",
            placeholders(message_ids.len())
        );
        let mut values: Vec<Value> = vec![Value::Integer(is_read as i64)];
        values.extend(message_ids.iter().map(|id| Value::Integer(*id)));
        values.push(Value::Integer(is_read as i64));

        let updated = conn.execute(&sql, params_from_iter(values))?;
        Ok(updated)
    }

    /// Unread messages addressed to a user across all their threads.
    pub fn unread_count(&self, user_id: i64) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*)
             FROM messages m
             JOIN thread_participants p ON p.thread_id = m.thread_id AND p.user_id = ?1
             WHERE m.is_read = 0 AND m.sender_id != ?1",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;

    struct Fixture {
        store: Store,
        user1: i64,
        user2: i64,
        user3: i64,
        thread_id: i64,
    }

    fn fixture() -> Fixture {
        let store = Store::open_in_memory().unwrap();
        let mut ids = Vec::new();
        for name in ["user1", "user2", "user3"] {
            let user = store
                .create_user(&NewUser {
                    username: name.into(),
                    password_hash: "!".into(),
                    ..NewUser::default()
                })
                .unwrap();
            ids.push(user.id);
        }
        let thread = store.create_thread(Some(ids[0]), ids[0], ids[1]).unwrap();
        Fixture {
            store,
            user1: ids[0],
            user2: ids[1],
            user3: ids[2],
            thread_id: thread.id,
        }
    }

    #[test]
    fn test_create_and_list_messages() {
        let f = fixture();
        let first = f.store.create_message(f.thread_id, f.user1, "Hello").unwrap();
        let second = f.store.create_message(f.thread_id, f.user2, "Hi").unwrap();
        assert_eq!(first.sender.username, "user1");
        assert!(!first.is_read);

        let page = f
            .store
            .list_thread_messages(f.thread_id, Ordering::CreatedAsc, PageRequest::new(20, 0))
            .unwrap();
        assert_eq!(page.count, 2);
        assert_eq!(page.results[0].id, first.id);

        let page = f
            .store
            .list_thread_messages(f.thread_id, Ordering::CreatedDesc, PageRequest::new(1, 0))
            .unwrap();
        assert_eq!(page.count, 2);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].id, second.id);
    }

    #[test]
    fn test_mark_read_skips_own_and_foreign() {
        let f = fixture();
        let from_user1 = f.store.create_message(f.thread_id, f.user1, "a").unwrap();
        let from_user2 = f.store.create_message(f.thread_id, f.user2, "b").unwrap();

        // Sender cannot mark their own message.
        assert_eq!(f.store.mark_read(f.user1, &[from_user1.id]).unwrap(), 0);
        // Outsider cannot mark anything.
        assert_eq!(f.store.mark_read(f.user3, &[from_user1.id, from_user2.id]).unwrap(), 0);
        // Recipient can, once.
        assert_eq!(f.store.mark_read(f.user2, &[from_user1.id]).unwrap(), 1);
        assert_eq!(f.store.mark_read(f.user2, &[from_user1.id]).unwrap(), 0);

        assert!(f.store.get_message(from_user1.id).unwrap().unwrap().is_read);
        assert!(!f.store.get_message(from_user2.id).unwrap().unwrap().is_read);
    }

    #[test]
    fn test_unread_count_and_ids() {
        let f = fixture();
        f.store.create_message(f.thread_id, f.user1, "a").unwrap();
        f.store.create_message(f.thread_id, f.user1, "b").unwrap();
        f.store.create_message(f.thread_id, f.user2, "c").unwrap();

        assert_eq!(f.store.unread_count(f.user2).unwrap(), 2);
        assert_eq!(f.store.unread_count(f.user1).unwrap(), 1);
        assert_eq!(f.store.unread_count(f.user3).unwrap(), 0);
        assert_eq!(
            f.store.unread_message_ids(f.thread_id, f.user2).unwrap().len(),
            2
        );
    }

    #[test]
    fn test_set_read_flag() {
        let f = fixture();
        let message = f.store.create_message(f.thread_id, f.user1, "a").unwrap();
        assert_eq!(f.store.set_read_flag(&[message.id], true).unwrap(), 1);
        assert_eq!(f.store.set_read_flag(&[message.id], true).unwrap(), 0);
        assert_eq!(f.store.set_read_flag(&[message.id], false).unwrap(), 1);
        assert_eq!(f.store.set_read_flag(&[], true).unwrap(), 0);
    }

    #[test]
    fn test_messages_removed_with_thread() {
        let f = fixture();
        let message = f.store.create_message(f.thread_id, f.user1, "a").unwrap();
        f.store.delete_thread(f.thread_id).unwrap();
        assert!(f.store.get_message(message.id).unwrap().is_none());
    }
}

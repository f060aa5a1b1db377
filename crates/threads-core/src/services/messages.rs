//! Posting, listing and read-tracking of thread messages.

use crate::config::MessageConfig;
use crate::models::{preview, Message, MessageRead, User};
use crate::ordering::Ordering;
use crate::pagination::{Page, PageRequest};
use crate::store::Store;
use crate::{Result, ThreadsError};
use tracing::{debug, info};

/// Trim message text and enforce length bounds.
pub fn validate_text(text: &str) -> Result<&str> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ThreadsError::validation("text", "This field may not be blank."));
    }
    if text.chars().count() > MessageConfig::MAX_TEXT_LENGTH {
        return Err(ThreadsError::validation(
            "text",
            format!(
                "Ensure this field has no more than {} characters.",
                MessageConfig::MAX_TEXT_LENGTH
            ),
        ));
    }
    Ok(text)
}

pub struct MessageService<'a> {
    store: &'a Store,
}

impl<'a> MessageService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    fn require_thread(&self, thread_id: i64) -> Result<()> {
        if self.store.thread_exists(thread_id)? {
            Ok(())
        } else {
            Err(ThreadsError::ThreadNotFound { thread_id })
        }
    }

    pub fn check_thread_participant(&self, thread_id: i64, user_id: i64) -> Result<bool> {
        self.store.is_participant(thread_id, user_id)
    }

    /// Post a message as `sender_id`.
    pub fn create_message(&self, sender_id: i64, thread_id: i64, text: &str) -> Result<MessageRead> {
        self.require_thread(thread_id)?;
        if !self.check_thread_participant(thread_id, sender_id)? {
            return Err(ThreadsError::PermissionDenied(
                "You don't have permission to send messages to this thread".to_string(),
            ));
        }
        let text = validate_text(text)?;

        let message = self.store.create_message(thread_id, sender_id, text)?;
        info!(
            "Created new message {} in thread {}: {:?}",
            message.id,
            thread_id,
            preview(text, MessageConfig::PREVIEW_LENGTH)
        );
        Ok(message)
    }

    /// Messages of a thread, visible to its participants and to staff.
    pub fn thread_messages(
        &self,
        user: &User,
        thread_id: i64,
        ordering: Ordering,
        page: PageRequest,
    ) -> Result<Page<MessageRead>> {
        self.require_thread(thread_id)?;
        if !user.is_staff && !self.check_thread_participant(thread_id, user.id)? {
            return Err(ThreadsError::PermissionDenied(
                "You don't have permission to view messages in this thread".to_string(),
            ));
        }
        self.store.list_thread_messages(thread_id, ordering, page)
    }

    /// Mark every unread message addressed to `user_id` in a thread.
    pub fn mark_all_read(&self, user_id: i64, thread_id: i64) -> Result<usize> {
        self.require_thread(thread_id)?;
        if !self.check_thread_participant(thread_id, user_id)? {
            return Err(ThreadsError::PermissionDenied(
                "You don't have permission to mark messages in this thread".to_string(),
            ));
        }

        let ids = self.store.unread_message_ids(thread_id, user_id)?;
        let updated = self.store.mark_read(user_id, &ids)?;
        debug!("Marked {} messages read in thread {}", updated, thread_id);
        Ok(updated)
    }

    /// Mark one message read. The message must belong to `thread_id`.
    pub fn mark_message_read(&self, user: &User, thread_id: i64, message_id: i64) -> Result<()> {
        let message = self
            .store
            .get_message(message_id)?
            .ok_or(ThreadsError::MessageNotFound { message_id })?;

        if message.thread_id != thread_id {
            return Err(ThreadsError::NotFound(
                "Message does not belong to this thread".to_string(),
            ));
        }
        if !self.can_mark_message_as_read(user, &message)? {
            return Err(ThreadsError::PermissionDenied(
                "You don't have permission to mark this message as read".to_string(),
            ));
        }

        if user.is_staff && !self.check_thread_participant(thread_id, user.id)? {
            self.store.set_read_flag(&[message_id], true)?;
        } else {
            self.store.mark_read(user.id, &[message_id])?;
        }
        Ok(())
    }

    /// Staff, or a participant who did not send the message.
    pub fn can_mark_message_as_read(&self, user: &User, message: &Message) -> Result<bool> {
        if user.is_staff {
            return Ok(true);
        }
        Ok(message.sender_id != user.id
            && self.check_thread_participant(message.thread_id, user.id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_text() {
        assert_eq!(validate_text("  hi  ").unwrap(), "hi");
        assert!(validate_text("   ").is_err());
        assert!(validate_text(&"x".repeat(1000)).is_ok());
        assert!(validate_text(&"x".repeat(1001)).is_err());
        assert!(validate_text(&"ї".repeat(1000)).is_ok());
    }
}

//! Staff-only bulk actions.

use crate::models::User;
use crate::store::Store;
use crate::{Result, ThreadsError};
use tracing::info;

pub struct AdminService<'a> {
    store: &'a Store,
}

impl<'a> AdminService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Force the read flag on a set of messages. Returns how many changed.
    pub fn set_messages_read(&self, requester: &User, ids: &[i64], is_read: bool) -> Result<usize> {
        if !requester.is_staff {
            return Err(ThreadsError::PermissionDenied(
                "You do not have permission to perform this action.".to_string(),
            ));
        }
        let updated = self.store.set_read_flag(ids, is_read)?;
        info!(
            "{} messages marked as {} by {}",
            updated,
            if is_read { "read" } else { "unread" },
            requester.username
        );
        Ok(updated)
    }
}

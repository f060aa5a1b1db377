//! Per-user views, restricted to the user themselves or staff.

use crate::models::{ThreadRead, User};
use crate::ordering::Ordering;
use crate::pagination::{Page, PageRequest};
use crate::store::Store;
use crate::{Result, ThreadsError};

pub struct UserService<'a> {
    store: &'a Store,
}

impl<'a> UserService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Scope is checked before existence.
    pub fn authorize_user_scope(&self, requester: &User, user_id: i64) -> Result<()> {
        if requester.id != user_id && !requester.is_staff {
            return Err(ThreadsError::PermissionDenied(
                "You do not have permission to perform this action.".to_string(),
            ));
        }
        if !self.store.user_exists(user_id)? {
            return Err(ThreadsError::UserNotFound { user_id });
        }
        Ok(())
    }

    pub fn user_threads(
        &self,
        requester: &User,
        user_id: i64,
        ordering: Ordering,
        page: PageRequest,
    ) -> Result<Page<ThreadRead>> {
        self.authorize_user_scope(requester, user_id)?;
        self.store.list_user_threads(user_id, ordering, page)
    }

    pub fn unread_messages_count(&self, requester: &User, user_id: i64) -> Result<usize> {
        self.authorize_user_scope(requester, user_id)?;
        self.store.unread_count(user_id)
    }
}

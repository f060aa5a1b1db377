//! Thread lifecycle: get-or-create between two users, listing, deletion.

use crate::models::ThreadRead;
use crate::ordering::Ordering;
use crate::pagination::{Page, PageRequest};
use crate::store::Store;
use crate::{Result, ThreadsError};
use tracing::info;

pub struct ThreadService<'a> {
    store: &'a Store,
}

impl<'a> ThreadService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Return the thread between `user_id` and `participant_id`, creating it
    /// when the pair has none yet.
    pub fn get_or_create_thread(&self, user_id: i64, participant_id: i64) -> Result<ThreadRead> {
        if participant_id == user_id {
            return Err(ThreadsError::validation(
                "participant_id",
                "Cannot create thread with yourself",
            ));
        }
        if !self.store.user_exists(participant_id)? {
            return Err(ThreadsError::NotFound("Participant not found".to_string()));
        }

        let (thread, created) = self
            .store
            .get_or_create_thread(Some(user_id), user_id, participant_id)?;
        if created {
            info!(
                "Created new thread {} between users {} and {}",
                thread.id, user_id, participant_id
            );
        }
        Ok(thread)
    }

    /// Threads the user participates in, most recently updated first unless
    /// another ordering is requested.
    pub fn user_threads(
        &self,
        user_id: i64,
        ordering: Ordering,
        page: PageRequest,
    ) -> Result<Page<ThreadRead>> {
        self.store.list_user_threads(user_id, ordering, page)
    }

    /// Delete a thread the user participates in.
    pub fn delete_thread(&self, user_id: i64, thread_id: i64) -> Result<()> {
        if !self.store.thread_exists(thread_id)? {
            return Err(ThreadsError::ThreadNotFound { thread_id });
        }
        if !self.store.is_participant(thread_id, user_id)? {
            return Err(ThreadsError::PermissionDenied(
                "You don't have permission to delete this thread".to_string(),
            ));
        }

        self.store.delete_thread(thread_id)?;
        info!("User {} deleted thread {}", user_id, thread_id);
        Ok(())
    }
}

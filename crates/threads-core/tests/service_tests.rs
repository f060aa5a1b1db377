//! Integration tests for the service layer.
//!
//! These walk the same scenarios as the HTTP suite but call the services
//! directly against an on-disk store.

use tempfile::TempDir;
use threads_core::{
    AdminService, MessageService, NewUser, Ordering, PageRequest, Store, ThreadService,
    ThreadsError, User, UserService,
};

struct TestEnv {
    store: Store,
    admin: User,
    user1: User,
    user2: User,
    user3: User,
    _temp: TempDir,
}

/// Create a store with an admin and three regular users.
fn create_test_env() -> TestEnv {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = Store::open(temp_dir.path().join("threads.db")).unwrap();
    store.migrate().unwrap();

    let make = |username: &str, staff: bool| {
        store
            .create_user(&NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: "!".to_string(),
                is_staff: staff,
                is_superuser: staff,
            })
            .unwrap()
    };

    let admin = make("admin", true);
    let user1 = make("user1", false);
    let user2 = make("user2", false);
    let user3 = make("user3", false);

    TestEnv {
        store,
        admin,
        user1,
        user2,
        user3,
        _temp: temp_dir,
    }
}

fn page() -> PageRequest {
    PageRequest::new(20, 0)
}

#[test]
fn test_get_or_create_thread_reuses_pair() {
    let env = create_test_env();
    let threads = ThreadService::new(&env.store);

    let created = threads.get_or_create_thread(env.user1.id, env.user2.id).unwrap();
    assert!(created.has_participant(env.user1.id));
    assert!(created.has_participant(env.user2.id));

    let again = threads.get_or_create_thread(env.user2.id, env.user1.id).unwrap();
    assert_eq!(again.id, created.id);
}

#[test]
fn test_concurrent_get_or_create_thread_shares_one_thread() {
    use std::sync::{Arc, Barrier};
    use std::thread;

    let env = create_test_env();

    for round in 0..25 {
        let make = |username: String| {
            env.store
                .create_user(&NewUser {
                    username,
                    email: String::new(),
                    password_hash: "!".to_string(),
                    is_staff: false,
                    is_superuser: false,
                })
                .unwrap()
        };
        let a = make(format!("left{round}"));
        let b = make(format!("right{round}"));

        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = [(a.id, b.id), (b.id, a.id)]
            .into_iter()
            .map(|(user_id, participant_id)| {
                let store = env.store.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    ThreadService::new(&store).get_or_create_thread(user_id, participant_id)
                })
            })
            .collect();

        let ids: Vec<i64> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap().unwrap().id)
            .collect();
        assert_eq!(ids[0], ids[1], "round {round} produced two threads");

        let thread = env.store.get_thread(ids[0]).unwrap().unwrap();
        assert_eq!(thread.participants.len(), 2);
    }
}

#[test]
fn test_thread_with_self_or_unknown_user() {
    let env = create_test_env();
    let threads = ThreadService::new(&env.store);

    let err = threads
        .get_or_create_thread(env.user1.id, env.user1.id)
        .unwrap_err();
    assert_eq!(err.status_code(), 400);

    let err = threads.get_or_create_thread(env.user1.id, 9999).unwrap_err();
    assert_eq!(err.to_string(), "Participant not found");
    assert_eq!(err.status_code(), 404);
}

#[test]
fn test_delete_thread_requires_participant() {
    let env = create_test_env();
    let threads = ThreadService::new(&env.store);
    let thread = threads.get_or_create_thread(env.user1.id, env.user2.id).unwrap();

    let err = threads.delete_thread(env.user3.id, thread.id).unwrap_err();
    assert!(matches!(err, ThreadsError::PermissionDenied(_)));

    threads.delete_thread(env.user1.id, thread.id).unwrap();
    let err = threads.delete_thread(env.user1.id, thread.id).unwrap_err();
    assert!(matches!(err, ThreadsError::ThreadNotFound { .. }));
}

#[test]
fn test_message_flow() {
    let env = create_test_env();
    let thread = ThreadService::new(&env.store)
        .get_or_create_thread(env.user1.id, env.user2.id)
        .unwrap();
    let messages = MessageService::new(&env.store);

    let message = messages
        .create_message(env.user1.id, thread.id, "Test message")
        .unwrap();
    assert_eq!(message.text, "Test message");
    assert_eq!(message.sender.id, env.user1.id);

    // Outsiders can neither post nor read.
    let err = messages
        .create_message(env.user3.id, thread.id, "hi")
        .unwrap_err();
    assert_eq!(err.status_code(), 403);
    let err = messages
        .thread_messages(&env.user3, thread.id, Ordering::CreatedAsc, page())
        .unwrap_err();
    assert_eq!(err.status_code(), 403);

    // Staff can read.
    let listed = messages
        .thread_messages(&env.admin, thread.id, Ordering::CreatedAsc, page())
        .unwrap();
    assert_eq!(listed.count, 1);
}

#[test]
fn test_mark_message_read_rules() {
    let env = create_test_env();
    let thread = ThreadService::new(&env.store)
        .get_or_create_thread(env.user1.id, env.user2.id)
        .unwrap();
    let messages = MessageService::new(&env.store);
    let message = messages
        .create_message(env.user1.id, thread.id, "Test message")
        .unwrap();

    // Sender cannot mark their own message.
    let err = messages
        .mark_message_read(&env.user1, thread.id, message.id)
        .unwrap_err();
    assert_eq!(err.status_code(), 403);

    // Wrong thread is reported as not found.
    let other = ThreadService::new(&env.store)
        .get_or_create_thread(env.user2.id, env.user3.id)
        .unwrap();
    let err = messages
        .mark_message_read(&env.user2, other.id, message.id)
        .unwrap_err();
    assert_eq!(err.to_string(), "Message does not belong to this thread");

    messages
        .mark_message_read(&env.user2, thread.id, message.id)
        .unwrap();
    assert!(env.store.get_message(message.id).unwrap().unwrap().is_read);
}

#[test]
fn test_admin_marks_message_read() {
    let env = create_test_env();
    let thread = ThreadService::new(&env.store)
        .get_or_create_thread(env.user1.id, env.user2.id)
        .unwrap();
    let messages = MessageService::new(&env.store);
    let message = messages.create_message(env.user1.id, thread.id, "x").unwrap();

    messages
        .mark_message_read(&env.admin, thread.id, message.id)
        .unwrap();
    assert!(env.store.get_message(message.id).unwrap().unwrap().is_read);
}

#[test]
fn test_mark_all_read_and_unread_count() {
    let env = create_test_env();
    let thread = ThreadService::new(&env.store)
        .get_or_create_thread(env.user1.id, env.user2.id)
        .unwrap();
    let messages = MessageService::new(&env.store);
    messages.create_message(env.user1.id, thread.id, "one").unwrap();
    messages.create_message(env.user1.id, thread.id, "two").unwrap();
    messages.create_message(env.user2.id, thread.id, "three").unwrap();

    let users = UserService::new(&env.store);
    assert_eq!(users.unread_messages_count(&env.user2, env.user2.id).unwrap(), 2);

    assert_eq!(messages.mark_all_read(env.user2.id, thread.id).unwrap(), 2);
    assert_eq!(users.unread_messages_count(&env.user2, env.user2.id).unwrap(), 0);
    assert_eq!(users.unread_messages_count(&env.user1, env.user1.id).unwrap(), 1);

    let err = messages.mark_all_read(env.user3.id, thread.id).unwrap_err();
    assert_eq!(err.status_code(), 403);
    let err = messages.mark_all_read(env.user2.id, 9999).unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[test]
fn test_user_scope() {
    let env = create_test_env();
    ThreadService::new(&env.store)
        .get_or_create_thread(env.user1.id, env.user2.id)
        .unwrap();
    let users = UserService::new(&env.store);

    let own = users
        .user_threads(&env.user1, env.user1.id, Ordering::UpdatedDesc, page())
        .unwrap();
    assert_eq!(own.count, 1);

    let err = users
        .user_threads(&env.user1, env.user2.id, Ordering::UpdatedDesc, page())
        .unwrap_err();
    assert_eq!(err.status_code(), 403);

    let as_admin = users
        .user_threads(&env.admin, env.user1.id, Ordering::UpdatedDesc, page())
        .unwrap();
    assert_eq!(as_admin.count, 1);

    let err = users.unread_messages_count(&env.admin, 9999).unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[test]
fn test_admin_bulk_read_flag() {
    let env = create_test_env();
    let thread = ThreadService::new(&env.store)
        .get_or_create_thread(env.user1.id, env.user2.id)
        .unwrap();
    let message = MessageService::new(&env.store)
        .create_message(env.user1.id, thread.id, "x")
        .unwrap();
    let admin = AdminService::new(&env.store);

    assert!(admin.set_messages_read(&env.user1, &[message.id], true).is_err());
    assert_eq!(admin.set_messages_read(&env.admin, &[message.id], true).unwrap(), 1);
    assert_eq!(admin.set_messages_read(&env.admin, &[message.id], false).unwrap(), 1);
}

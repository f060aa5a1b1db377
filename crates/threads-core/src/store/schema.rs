//! Schema migrations, applied in order and recorded in `schema_migrations`.

pub(crate) struct Migration {
    pub name: &'static str,
    pub sql: &'static str,
}

pub(crate) const MIGRATIONS: &[Migration] = &[Migration {
    name: "0001_initial",
    sql: "
        CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL DEFAULT '',
            password_hash TEXT NOT NULL,
            is_staff INTEGER NOT NULL DEFAULT 0,
            is_superuser INTEGER NOT NULL DEFAULT 0,
            date_joined TEXT NOT NULL
        );

        CREATE TABLE threads (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            pair_key TEXT NOT NULL UNIQUE,
            creator_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
            created TEXT NOT NULL,
            updated TEXT NOT NULL
        );

        CREATE TABLE thread_participants (
            thread_id INTEGER NOT NULL REFERENCES threads(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            PRIMARY KEY (thread_id, user_id)
        );

        CREATE TABLE messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            thread_id INTEGER NOT NULL REFERENCES threads(id) ON DELETE CASCADE,
            sender_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            text TEXT NOT NULL,
            is_read INTEGER NOT NULL DEFAULT 0,
            created TEXT NOT NULL
        );

        CREATE INDEX idx_participants_user ON thread_participants(user_id);
        CREATE INDEX idx_threads_updated ON threads(updated);
        CREATE INDEX idx_messages_thread ON messages(thread_id, created);
        CREATE INDEX idx_messages_unread ON messages(is_read, sender_id);
    ",
}];

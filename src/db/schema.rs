//! Database schema migrations for ripple.
//!
//! Each entry is one migration, applied in order inside a transaction and
//! recorded in the `schema_version` table.

/// All schema migrations, in order.
pub const MIGRATIONS: &[&str] = &[
    // v1: users and password reset tokens
    r#"
    CREATE TABLE users (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        username        TEXT NOT NULL UNIQUE,
        email           TEXT NOT NULL UNIQUE,
        password        TEXT NOT NULL,
        profile_picture TEXT NOT NULL DEFAULT 'default_avatar.png',
        created_at      TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE password_resets (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        email       TEXT NOT NULL UNIQUE,
        token       TEXT NOT NULL UNIQUE,
        expires_at  TEXT NOT NULL,
        created_at  TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    // v2: dependent content tables; rows cascade on account deletion
    r#"
    CREATE TABLE posts (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        content     TEXT NOT NULL,
        image       TEXT,
        created_at  TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE INDEX idx_posts_user ON posts(user_id);

    CREATE TABLE messages (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        sender_id   INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        receiver_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        body        TEXT NOT NULL,
        is_read     INTEGER NOT NULL DEFAULT 0,
        created_at  TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE INDEX idx_messages_receiver ON messages(receiver_id);
    "#,
];

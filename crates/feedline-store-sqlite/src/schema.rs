//! SQL schema for the Feedline SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// `AUTOINCREMENT` keeps ids strictly increasing and never reused, which the
/// keyset pagination relies on.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    username        TEXT NOT NULL UNIQUE,
    email           TEXT NOT NULL UNIQUE,
    credential_hash TEXT NOT NULL,
    image_url       TEXT,
    role            TEXT NOT NULL DEFAULT 'user',   -- 'user' | 'admin'
    created_at      TEXT NOT NULL,                  -- RFC 3339 UTC
    updated_at      TEXT NOT NULL,
    deleted_at      TEXT                            -- soft delete
);

CREATE TABLE IF NOT EXISTS posts (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    author_id  INTEGER NOT NULL REFERENCES users(id),
    title      TEXT NOT NULL,
    body       TEXT NOT NULL,
    image_url  TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE TABLE IF NOT EXISTS comments (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id    INTEGER NOT NULL REFERENCES posts(id),
    author_id  INTEGER NOT NULL REFERENCES users(id),
    body       TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

-- Likes are hard-deleted; existence is the only state.
CREATE TABLE IF NOT EXISTS likes (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id    INTEGER NOT NULL REFERENCES posts(id),
    user_id    INTEGER NOT NULL REFERENCES users(id),
    created_at TEXT NOT NULL,
    UNIQUE (post_id, user_id)
);

-- Follow edges are hard-deleted on unfollow.
CREATE TABLE IF NOT EXISTS follows (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    follower_id INTEGER NOT NULL REFERENCES users(id),
    followee_id INTEGER NOT NULL REFERENCES users(id),
    created_at  TEXT NOT NULL,
    UNIQUE (follower_id, followee_id),
    CHECK  (follower_id != followee_id)
);

CREATE INDEX IF NOT EXISTS posts_author_idx     ON posts(author_id, id);
CREATE INDEX IF NOT EXISTS comments_post_idx    ON comments(post_id, id);
CREATE INDEX IF NOT EXISTS likes_user_idx       ON likes(user_id, post_id);
CREATE INDEX IF NOT EXISTS follows_followee_idx ON follows(followee_id, id);

PRAGMA user_version = 1;
";

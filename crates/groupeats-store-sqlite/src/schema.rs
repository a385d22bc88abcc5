//! SQL schema for the GroupEats SQLite store.
//!
//! Executed as one idempotent batch at connection startup. The trailing
//! `PRAGMA user_version` stamps the schema revision so external tooling can
//! tell which layout a database file carries.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS reviews (
    review_id         TEXT PRIMARY KEY,
    author_id         TEXT NOT NULL,
    author_name       TEXT NOT NULL,
    author_avatar_url TEXT NOT NULL DEFAULT '',
    place_id          TEXT NOT NULL,   -- opaque external place key
    place_name        TEXT NOT NULL,
    place_address     TEXT NOT NULL,
    place_tags        TEXT NOT NULL DEFAULT '[]',  -- JSON array of strings
    description       TEXT NOT NULL,
    rating            REAL NOT NULL,
    photo_url         TEXT NOT NULL DEFAULT '',
    latitude          REAL NOT NULL,
    longitude         REAL NOT NULL,
    created_at        TEXT NOT NULL,   -- RFC 3339 UTC, fixed micro-second
                                       -- width so text order = time order
    likes             TEXT NOT NULL DEFAULT '[]'   -- JSON array of user ids
);

CREATE TABLE IF NOT EXISTS profiles (
    user_id    TEXT PRIMARY KEY,       -- assigned by the auth provider
    name       TEXT NOT NULL,
    email      TEXT NOT NULL,
    avatar_url TEXT NOT NULL DEFAULT '',
    friends    TEXT NOT NULL DEFAULT '[]',         -- JSON array of user ids
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS reviews_place_idx   ON reviews(place_id);
CREATE INDEX IF NOT EXISTS reviews_author_idx  ON reviews(author_id);
CREATE INDEX IF NOT EXISTS reviews_created_idx ON reviews(created_at DESC, review_id DESC);

PRAGMA user_version = 1;
";

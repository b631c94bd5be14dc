//! SQL schema for the local cache.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per namespace; `value` is the JSON map of date -> day record.
CREATE TABLE IF NOT EXISTS cache_entries (
    namespace   TEXT PRIMARY KEY,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL    -- RFC 3339 UTC
);

-- Dates whose latest local write has not reached the remote store.
CREATE TABLE IF NOT EXISTS pending_sync (
    namespace   TEXT NOT NULL,
    date        TEXT NOT NULL,   -- YYYY-MM-DD
    marked_at   TEXT NOT NULL,
    PRIMARY KEY (namespace, date)
);

PRAGMA user_version = 1;
";

//! SQL schema for the rota SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS worker (
    id        INTEGER PRIMARY KEY,
    email     TEXT NOT NULL UNIQUE,  -- exact, case-sensitive match
    name      TEXT NOT NULL,
    is_admin  INTEGER NOT NULL DEFAULT 0,
    password  TEXT NOT NULL          -- argon2 PHC string; only read by authenticate
);

CREATE TABLE IF NOT EXISTS shift (
    id          INTEGER PRIMARY KEY,
    start_time  TEXT NOT NULL,       -- RFC 3339, UTC
    end_time    TEXT NOT NULL,
    capacity    INTEGER NOT NULL
);

-- Deleting a worker or a shift takes its assignments with it.
CREATE TABLE IF NOT EXISTS shift_assignment (
    id         INTEGER PRIMARY KEY,
    worker_id  INTEGER NOT NULL REFERENCES worker(id) ON DELETE CASCADE,
    shift_id   INTEGER NOT NULL REFERENCES shift(id)  ON DELETE CASCADE,
    UNIQUE (worker_id, shift_id)
);

CREATE INDEX IF NOT EXISTS shift_assignment_shift_idx ON shift_assignment(shift_id);
CREATE INDEX IF NOT EXISTS shift_start_idx            ON shift(start_time);

PRAGMA user_version = 1;
";

//! SQL schema for the Screams SQLite store.
//!
//! Column names are PascalCase because clients pass them as sort keys.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS Users (
    ID           INTEGER PRIMARY KEY AUTOINCREMENT,
    DisplayName  TEXT NOT NULL UNIQUE COLLATE NOCASE,
    PasswordHash TEXT NOT NULL,
    DateJoined   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS Screams (
    ID          INTEGER PRIMARY KEY AUTOINCREMENT,
    Body        TEXT    NOT NULL,
    DateCreated TEXT    NOT NULL,   -- RFC 3339 UTC; never updated
    DateEdited  TEXT,
    ParentID    INTEGER NOT NULL DEFAULT 0,
    ReplyToID   INTEGER NOT NULL DEFAULT 0,
    SourceAppID INTEGER NOT NULL DEFAULT 0,
    TotalViews  INTEGER NOT NULL DEFAULT 0,
    UserID      INTEGER NOT NULL
);

-- Snapshots are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
-- ScreamID has no foreign key; snapshots remain after their scream is deleted.
CREATE TABLE IF NOT EXISTS ScreamHistory (
    ID           INTEGER PRIMARY KEY AUTOINCREMENT,
    ScreamID     INTEGER NOT NULL,
    Body         TEXT    NOT NULL,
    DateCreated  TEXT    NOT NULL,
    DateEdited   TEXT,
    DateRecorded TEXT    NOT NULL,
    ParentID     INTEGER NOT NULL DEFAULT 0,
    ReplyToID    INTEGER NOT NULL DEFAULT 0,
    SourceAppID  INTEGER NOT NULL DEFAULT 0,
    TotalViews   INTEGER NOT NULL DEFAULT 0,
    UserID       INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS screams_user_idx   ON Screams(UserID);
CREATE INDEX IF NOT EXISTS history_scream_idx ON ScreamHistory(ScreamID);

PRAGMA user_version = 1;
";

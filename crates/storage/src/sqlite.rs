// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite backend
//!
//! The production store. `update` runs read-mutate-write inside one
//! IMMEDIATE transaction, so concurrent writers serialize on the
//! database writer lock and a failed mutator rolls everything back.
//! `write` is authoritative-replace for the profile table and
//! append-only merge for the audit table.

use crate::gateway::{Mutator, StorageGateway, StoreError};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use vw_core::{AuditEntry, Profile, StorageDocument, StorageSection};

/// How long a writer waits on the database lock before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed document store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path.as_ref())?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let store = Self { conn };
        store.migrate()?;
        debug!(path = %path.as_ref().display(), "sqlite store opened");
        Ok(store)
    }

    /// Open an in-memory store (unit tests)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;

            CREATE TABLE IF NOT EXISTS storage_singleton (
              id INTEGER PRIMARY KEY CHECK (id = 1),
              active_profile_id TEXT NOT NULL,
              updated_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS profiles (
              id TEXT PRIMARY KEY,
              name TEXT NOT NULL,
              state TEXT NOT NULL,
              profile TEXT NOT NULL,
              history TEXT NOT NULL,
              responsibilities TEXT NOT NULL,
              created_at INTEGER NOT NULL,
              updated_at INTEGER NOT NULL,
              version INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS audit_log (
              id TEXT PRIMARY KEY,
              profile_id TEXT NOT NULL,
              timestamp TEXT NOT NULL,
              user_id TEXT NOT NULL,
              version INTEGER NOT NULL,
              changes TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_audit_log_profile_id ON audit_log(profile_id);
            CREATE INDEX IF NOT EXISTS idx_audit_log_timestamp ON audit_log(timestamp);
            "#,
        )?;
        Ok(())
    }
}

impl StorageGateway for SqliteStore {
    fn read(&mut self) -> Result<StorageDocument, StoreError> {
        read_document(&self.conn)
    }

    fn write(&mut self, document: &StorageDocument) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        write_document(&tx, document)?;
        tx.commit()?;
        Ok(())
    }

    fn update(&mut self, mutate: Mutator<'_>) -> Result<StorageDocument, StoreError> {
        // IMMEDIATE takes the writer lock up front, so the read below
        // already sees the state the commit will build on.
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current = read_document(&tx)?;
        let next = mutate(current)?;
        write_document(&tx, &next)?;
        tx.commit()?;
        Ok(next)
    }

    fn is_transactional(&self) -> bool {
        true
    }
}

fn read_document(conn: &Connection) -> Result<StorageDocument, StoreError> {
    let active_profile_id = conn
        .query_row(
            "SELECT active_profile_id FROM storage_singleton WHERE id = 1",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()?;

    // No singleton row means the store has never been written.
    let Some(active_profile_id) = active_profile_id else {
        return Ok(StorageDocument::skeleton());
    };

    let mut profiles = BTreeMap::new();
    let mut stmt = conn.prepare(
        "SELECT id, name, state, profile, history, responsibilities,
                created_at, updated_at, version
         FROM profiles",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(ProfileRow {
            id: row.get(0)?,
            name: row.get(1)?,
            state: row.get(2)?,
            profile: row.get(3)?,
            history: row.get(4)?,
            responsibilities: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
            version: row.get(8)?,
        })
    })?;
    for row in rows {
        let profile = row?.into_profile()?;
        profiles.insert(profile.id.clone(), profile);
    }

    let mut stmt = conn.prepare(
        "SELECT id, profile_id, timestamp, user_id, version, changes
         FROM audit_log
         ORDER BY timestamp, id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(AuditRow {
            id: row.get(0)?,
            profile_id: row.get(1)?,
            timestamp: row.get(2)?,
            user_id: row.get(3)?,
            version: row.get(4)?,
            changes: row.get(5)?,
        })
    })?;
    let mut audit_log = Vec::new();
    for row in rows {
        audit_log.push(row?.into_entry()?);
    }

    Ok(StorageDocument {
        storage: StorageSection {
            active_profile_id,
            profiles,
        },
        audit_log,
    })
}

fn write_document(conn: &Connection, document: &StorageDocument) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO storage_singleton (id, active_profile_id, updated_at)
         VALUES (1, ?1, ?2)
         ON CONFLICT(id) DO UPDATE SET
           active_profile_id = excluded.active_profile_id,
           updated_at = excluded.updated_at",
        params![
            document.storage.active_profile_id,
            Utc::now().timestamp_millis()
        ],
    )?;

    // Authoritative replace: the profile table mirrors the in-memory
    // document exactly after every write.
    conn.execute("DELETE FROM profiles", [])?;
    let mut stmt = conn.prepare(
        "INSERT INTO profiles
           (id, name, state, profile, history, responsibilities,
            created_at, updated_at, version)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    for profile in document.storage.profiles.values() {
        stmt.execute(params![
            profile.id,
            profile.name,
            serde_json::to_string(&profile.state)?,
            serde_json::to_string(&profile.profile)?,
            serde_json::to_string(&profile.history)?,
            serde_json::to_string(&profile.responsibilities)?,
            profile.created_at.timestamp_millis(),
            profile.updated_at.timestamp_millis(),
            profile.version,
        ])?;
    }

    // Audit rows are immutable: unknown ids insert, known ids stay as
    // first written. Nothing is ever updated or deleted here.
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO audit_log
           (id, profile_id, timestamp, user_id, version, changes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for entry in &document.audit_log {
        stmt.execute(params![
            entry.id,
            entry.profile_id,
            // Fixed-width millis keep lexicographic TEXT order equal
            // to chronological order.
            entry.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            entry.user_id,
            entry.version,
            serde_json::to_string(&entry.changes)?,
        ])?;
    }

    Ok(())
}

struct ProfileRow {
    id: String,
    name: String,
    state: String,
    profile: String,
    history: String,
    responsibilities: String,
    created_at: i64,
    updated_at: i64,
    version: u32,
}

impl ProfileRow {
    fn into_profile(self) -> Result<Profile, StoreError> {
        Ok(Profile {
            created_at: millis_to_datetime(self.created_at)?,
            updated_at: millis_to_datetime(self.updated_at)?,
            state: parse_column(&self.state, &self.id, "state")?,
            profile: parse_column(&self.profile, &self.id, "profile")?,
            history: parse_column(&self.history, &self.id, "history")?,
            responsibilities: parse_column(&self.responsibilities, &self.id, "responsibilities")?,
            id: self.id,
            name: self.name,
            version: self.version,
        })
    }
}

struct AuditRow {
    id: String,
    profile_id: String,
    timestamp: String,
    user_id: String,
    version: u32,
    changes: String,
}

impl AuditRow {
    fn into_entry(self) -> Result<AuditEntry, StoreError> {
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map_err(|e| {
                StoreError::Malformed(format!("audit entry {}: bad timestamp: {e}", self.id))
            })?
            .with_timezone(&Utc);
        Ok(AuditEntry {
            changes: parse_column(&self.changes, &self.id, "changes")?,
            id: self.id,
            profile_id: self.profile_id,
            timestamp,
            user_id: self.user_id,
            version: self.version,
        })
    }
}

fn parse_column<T: serde::de::DeserializeOwned>(
    text: &str,
    id: &str,
    column: &str,
) -> Result<T, StoreError> {
    serde_json::from_str(text)
        .map_err(|e| StoreError::Malformed(format!("row {id}: bad {column} column: {e}")))
}

fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StoreError::Malformed(format!("timestamp out of range: {millis}")))
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;

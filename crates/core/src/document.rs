// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The persisted document model
//!
//! A single `StorageDocument` aggregate holds the active-profile
//! pointer, every wizard profile, and the append-only audit trail.
//! Pure data; diffing lives in [`crate::diff`] and persistence in the
//! storage crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Sentinel change field recorded when a profile first appears
pub const FIELD_CREATED: &str = "__created__";
/// Sentinel change field recorded when a profile is removed
pub const FIELD_DELETED: &str = "__deleted__";

/// Profile id used before any caller has saved anything
pub const DEFAULT_PROFILE_ID: &str = "default";

/// The whole persisted aggregate: storage section plus audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageDocument {
    pub storage: StorageSection,
    #[serde(default)]
    pub audit_log: Vec<AuditEntry>,
}

impl StorageDocument {
    /// The skeleton persisted stores start from when nothing has been
    /// written yet
    pub fn skeleton() -> Self {
        Self {
            storage: StorageSection::default(),
            audit_log: Vec::new(),
        }
    }
}

impl Default for StorageDocument {
    fn default() -> Self {
        Self::skeleton()
    }
}

/// Active-profile pointer plus the profile map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageSection {
    pub active_profile_id: String,
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            active_profile_id: DEFAULT_PROFILE_ID.to_string(),
            profiles: BTreeMap::new(),
        }
    }
}

/// One named, versioned unit of wizard input state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    /// Module-keyed wizard input tree; opaque below the module key
    #[serde(default)]
    pub state: BTreeMap<String, Value>,
    /// Flat boolean-or-null scoping flags
    #[serde(default)]
    pub profile: BTreeMap<String, Option<bool>>,
    /// Module-keyed edit history
    #[serde(default)]
    pub history: BTreeMap<String, Vec<Revision>>,
    /// Module-keyed responsibility assignments
    #[serde(default)]
    pub responsibilities: BTreeMap<String, Vec<Responsibility>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u32,
}

impl Profile {
    /// Create an empty profile at version 1
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            state: BTreeMap::new(),
            profile: BTreeMap::new(),
            history: BTreeMap::new(),
            responsibilities: BTreeMap::new(),
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }
}

/// One recorded edit of a module field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    pub id: String,
    pub field: String,
    pub timestamp: DateTime<Utc>,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

/// One responsibility assignment inside a module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Responsibility {
    pub path: String,
    pub value: Value,
}

/// One immutable record of a single save's effect on a single profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: String,
    pub profile_id: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    /// The profile's version after this change
    pub version: u32,
    pub changes: Vec<Change>,
}

/// One field-level difference between two profile states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub field: String,
    pub previous: Value,
    pub next: Value,
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Audit entry construction

use crate::clock::Clock;
use crate::document::{AuditEntry, Change};
use crate::id::IdGen;

/// Build one immutable audit entry for a profile-level change set.
///
/// Callers skip this for ordinary updates whose diff came back empty;
/// creation and deletion always carry exactly one sentinel change.
pub fn build_entry(
    id_gen: &impl IdGen,
    clock: &impl Clock,
    profile_id: &str,
    user_id: &str,
    version: u32,
    changes: Vec<Change>,
) -> AuditEntry {
    AuditEntry {
        id: format!("{}-{}", profile_id, id_gen.next()),
        profile_id: profile_id.to_string(),
        timestamp: clock.now(),
        user_id: user_id.to_string(),
        version,
        changes,
    }
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;

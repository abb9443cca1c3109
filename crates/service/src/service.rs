// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The wizard persistence service
//!
//! `save` accepts a full desired storage snapshot, diffs it per
//! profile against the persisted document, derives versions, stamps
//! history authorship, appends audit entries, and reconciles the
//! active-profile pointer. The whole pipeline runs inside one gateway
//! `update`, so with a transactional backend a failed save leaves the
//! document exactly as it was.

use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};
use vw_core::{
    build_entry, compute_changes, next_version, Change, Clock, IdGen, Profile, StorageDocument,
    StorageSection, SystemClock, UuidIdGen, FIELD_DELETED,
};
use vw_storage::{StorageGateway, StoreError};

/// Errors surfaced by the persistence service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller-supplied shape errors, rejected before any diff work
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Sole writer for the shared storage document
pub struct WizardService<S, I = UuidIdGen, C = SystemClock> {
    store: S,
    id_gen: I,
    clock: C,
}

impl<S: StorageGateway> WizardService<S> {
    /// Service with production defaults: random audit tokens, system clock
    pub fn new(store: S) -> Self {
        Self {
            store,
            id_gen: UuidIdGen,
            clock: SystemClock,
        }
    }
}

impl<S: StorageGateway, I: IdGen, C: Clock> WizardService<S, I, C> {
    /// Service with injected token source and clock (tests)
    pub fn with_deps(store: S, id_gen: I, clock: C) -> Self {
        Self {
            store,
            id_gen,
            clock,
        }
    }

    /// Read the current document; takes no lock and has no business logic
    pub fn load(&mut self) -> Result<StorageDocument, ServiceError> {
        Ok(self.store.read()?)
    }

    /// Apply one full desired storage snapshot on behalf of `user_id`
    /// and return the updated document.
    pub fn save(
        &mut self,
        next: StorageSection,
        user_id: &str,
    ) -> Result<StorageDocument, ServiceError> {
        if user_id.is_empty() {
            return Err(ServiceError::InvalidRequest(
                "userId must not be empty".to_string(),
            ));
        }
        for (key, profile) in &next.profiles {
            if key != &profile.id {
                return Err(ServiceError::InvalidRequest(format!(
                    "profile key {key} does not match profile id {}",
                    profile.id
                )));
            }
        }

        let id_gen = self.id_gen.clone();
        let clock = self.clock.clone();
        let user = user_id.to_string();
        let document = self
            .store
            .update(&mut |current| Ok(apply_save(current, &next, &user, &id_gen, &clock)))?;

        info!(
            user = %user_id,
            profiles = document.storage.profiles.len(),
            audit_entries = document.audit_log.len(),
            "storage saved"
        );
        Ok(document)
    }
}

/// Pure save pipeline: previous document + desired section -> next document
fn apply_save(
    current: StorageDocument,
    next: &StorageSection,
    user_id: &str,
    id_gen: &impl IdGen,
    clock: &impl Clock,
) -> StorageDocument {
    let StorageDocument { storage, audit_log } = current;
    let previous_profiles = storage.profiles;
    let previous_active = storage.active_profile_id;
    let mut audit_log = audit_log;
    let now = clock.now();

    let mut profiles = BTreeMap::new();
    for (id, submitted) in &next.profiles {
        let previous = previous_profiles.get(id);
        let changes = compute_changes(previous, submitted);
        let has_changes = !changes.is_empty();
        let version = next_version(previous, has_changes);

        let mut stored = submitted.clone();
        stored.version = version;
        stored.created_at = previous.map_or(now, |p| p.created_at);
        stored.updated_at = if has_changes {
            now
        } else {
            previous.map_or(now, |p| p.updated_at)
        };
        stamp_history(&mut stored, user_id);

        if has_changes {
            debug!(profile = %id, version, changes = changes.len(), "profile changed");
            audit_log.push(build_entry(id_gen, clock, id, user_id, version, changes));
        }
        profiles.insert(id.clone(), stored);
    }

    // Profiles absent from the submission are removed outright, each
    // leaving one synthetic deletion entry. No tombstone rows.
    for (id, previous) in &previous_profiles {
        if next.profiles.contains_key(id) {
            continue;
        }
        debug!(profile = %id, "profile deleted");
        let deleted = vec![Change {
            field: FIELD_DELETED.to_string(),
            previous: serde_json::to_value(previous).unwrap_or(Value::Null),
            next: Value::Null,
        }];
        audit_log.push(build_entry(
            id_gen,
            clock,
            id,
            user_id,
            previous.version + 1,
            deleted,
        ));
    }

    let active_profile_id = resolve_active(&next.active_profile_id, &profiles, &previous_active);

    StorageDocument {
        storage: StorageSection {
            active_profile_id,
            profiles,
        },
        audit_log,
    }
}

/// Stamp authorship on any revision that does not carry one yet.
/// Existing authorship is never overwritten.
fn stamp_history(profile: &mut Profile, user_id: &str) {
    for revisions in profile.history.values_mut() {
        for revision in revisions.iter_mut() {
            if revision.updated_by.is_none() {
                revision.updated_by = Some(user_id.to_string());
            }
        }
    }
}

/// Requested id if it survived, else any remaining profile, else the
/// previous pointer (possibly dangling when every profile was deleted —
/// accepted, not corrected).
fn resolve_active(
    requested: &str,
    profiles: &BTreeMap<String, Profile>,
    previous: &str,
) -> String {
    if profiles.contains_key(requested) {
        return requested.to_string();
    }
    profiles
        .keys()
        .next()
        .map_or_else(|| previous.to_string(), Clone::clone)
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Field-level diffing and version derivation
//!
//! Both functions are pure. The service feeds them the stored and the
//! submitted profile and persists whatever they decide; nothing here
//! touches storage or the clock.

use crate::document::{Change, Profile, FIELD_CREATED};
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Compute the ordered list of field-level changes between the stored
/// profile and the submitted one.
///
/// A missing previous profile yields exactly one `__created__` change
/// carrying the whole submitted profile. Otherwise comparison runs in
/// a fixed order — `name`, then `state` module keys, then `profile`
/// flags, then `responsibilities` module keys — so audit entries come
/// out deterministic. Map keys absent on one side compare as null.
/// `version`, `history`, and the timestamps never participate.
pub fn compute_changes(previous: Option<&Profile>, next: &Profile) -> Vec<Change> {
    let Some(previous) = previous else {
        return vec![Change {
            field: FIELD_CREATED.to_string(),
            previous: Value::Null,
            next: serde_json::to_value(next).unwrap_or(Value::Null),
        }];
    };

    let mut changes = Vec::new();

    if previous.name != next.name {
        changes.push(Change {
            field: "name".to_string(),
            previous: Value::String(previous.name.clone()),
            next: Value::String(next.name.clone()),
        });
    }

    // Nested module state is opaque below the module key: compare each
    // module subtree as one value.
    for key in key_union(&previous.state, &next.state) {
        let before = previous.state.get(key).cloned().unwrap_or(Value::Null);
        let after = next.state.get(key).cloned().unwrap_or(Value::Null);
        if before != after {
            changes.push(Change {
                field: format!("state.{key}"),
                previous: before,
                next: after,
            });
        }
    }

    for key in key_union(&previous.profile, &next.profile) {
        let before = previous.profile.get(key).copied().flatten();
        let after = next.profile.get(key).copied().flatten();
        if before != after {
            changes.push(Change {
                field: format!("profile.{key}"),
                previous: flag_value(before),
                next: flag_value(after),
            });
        }
    }

    for key in key_union(&previous.responsibilities, &next.responsibilities) {
        let before = previous.responsibilities.get(key);
        let after = next.responsibilities.get(key);
        if before != after {
            changes.push(Change {
                field: format!("responsibilities.{key}"),
                previous: opaque_value(before),
                next: opaque_value(after),
            });
        }
    }

    changes
}

/// Derive the version the submitted profile will be stored at.
///
/// Creation is always version 1; an update bumps by exactly 1 when any
/// diffable field changed and otherwise leaves the version alone.
pub fn next_version(previous: Option<&Profile>, has_changes: bool) -> u32 {
    match previous {
        None => 1,
        Some(p) if has_changes => p.version + 1,
        Some(p) => p.version,
    }
}

fn key_union<'a, V>(a: &'a BTreeMap<String, V>, b: &'a BTreeMap<String, V>) -> BTreeSet<&'a String> {
    a.keys().chain(b.keys()).collect()
}

fn flag_value(flag: Option<bool>) -> Value {
    flag.map_or(Value::Null, Value::Bool)
}

fn opaque_value<T: serde::Serialize>(value: Option<&T>) -> Value {
    value
        .and_then(|v| serde_json::to_value(v).ok())
        .unwrap_or(Value::Null)
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;

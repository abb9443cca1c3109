//! vw-core: Core library for the Verdant Wizard (vw) reporting backend
//!
//! This crate provides:
//! - The persisted document model (profiles, audit trail)
//! - Pure diff and version-derivation functions
//! - The audit entry builder
//! - Clock and token-generation abstractions

pub mod clock;
pub mod id;

pub mod audit;
pub mod diff;
pub mod document;

// Re-exports
pub use audit::build_entry;
pub use clock::{Clock, FakeClock, SystemClock};
pub use diff::{compute_changes, next_version};
pub use document::{
    AuditEntry, Change, Profile, Responsibility, Revision, StorageDocument, StorageSection,
    DEFAULT_PROFILE_ID, FIELD_CREATED, FIELD_DELETED,
};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};

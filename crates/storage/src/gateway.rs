// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The storage gateway contract

use thiserror::Error;
use vw_core::StorageDocument;

/// Errors that can occur in gateway operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The persisted payload exists but cannot be interpreted as a
    /// storage document. Never silently defaulted.
    #[error("malformed document: {0}")]
    Malformed(String),
    /// A mutator refused the update; transactional backends roll back.
    #[error("update aborted: {0}")]
    Aborted(String),
}

/// A document transformation applied inside [`StorageGateway::update`]
pub type Mutator<'a> = &'a mut dyn FnMut(StorageDocument) -> Result<StorageDocument, StoreError>;

/// Persistence contract for the single shared storage document
pub trait StorageGateway {
    /// Read the current document. A store that has never been written
    /// yields the default skeleton; a present-but-uninterpretable
    /// payload fails with [`StoreError::Malformed`].
    fn read(&mut self) -> Result<StorageDocument, StoreError>;

    /// Replace the entire persisted document.
    ///
    /// Authoritative-replace, not merge: the SQLite backend drops and
    /// reinserts every profile row on each call. Only the audit table
    /// is append/merge — rows with known ids are left untouched.
    fn write(&mut self, document: &StorageDocument) -> Result<(), StoreError>;

    /// Read, transform, and persist the document in one step.
    ///
    /// Transactional backends run the whole cycle under an exclusive
    /// writer lock and roll back when the mutator fails, so concurrent
    /// callers serialize and each sees the prior committer's state as
    /// its baseline. Check [`StorageGateway::is_transactional`] before
    /// relying on that.
    fn update(&mut self, mutate: Mutator<'_>) -> Result<StorageDocument, StoreError>;

    /// Whether `update` is atomic. The file backend reads, mutates,
    /// and rewrites with no lock and answers `false` here.
    fn is_transactional(&self) -> bool;
}

impl<T: StorageGateway + ?Sized> StorageGateway for Box<T> {
    fn read(&mut self) -> Result<StorageDocument, StoreError> {
        (**self).read()
    }

    fn write(&mut self, document: &StorageDocument) -> Result<(), StoreError> {
        (**self).write(document)
    }

    fn update(&mut self, mutate: Mutator<'_>) -> Result<StorageDocument, StoreError> {
        (**self).update(mutate)
    }

    fn is_transactional(&self) -> bool {
        (**self).is_transactional()
    }
}

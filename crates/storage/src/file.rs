// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-file JSON backend
//!
//! Persists the whole document as one pretty-printed JSON file,
//! read-whole/write-whole. Intended for local development only:
//! `update` is read-mutate-rewrite with no locking, so concurrent
//! writers race and the last write wins outright.

use crate::gateway::{Mutator, StorageGateway, StoreError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use vw_core::StorageDocument;

/// JSON file-backed document store
#[derive(Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store backed by the given file path. Nothing is
    /// touched on disk until the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageGateway for FileStore {
    fn read(&mut self) -> Result<StorageDocument, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no document file yet, returning skeleton");
            return Ok(StorageDocument::skeleton());
        }
        let text = fs::read_to_string(&self.path)?;
        serde_json::from_str(&text).map_err(|e| StoreError::Malformed(e.to_string()))
    }

    fn write(&mut self, document: &StorageDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(document)?;
        fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), "document written");
        Ok(())
    }

    fn update(&mut self, mutate: Mutator<'_>) -> Result<StorageDocument, StoreError> {
        // Known limitation: another writer can slip in between the
        // read and the write. Single-developer/local use only.
        let current = self.read()?;
        let next = mutate(current)?;
        self.write(&next)?;
        Ok(next)
    }

    fn is_transactional(&self) -> bool {
        false
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;

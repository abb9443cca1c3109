//! vw-storage: Storage gateway for the wizard document
//!
//! One [`StorageGateway`] contract, two backends: a single JSON file
//! for local development and a SQLite store for production. The file
//! backend trades away atomic updates for simplicity; the SQLite
//! backend serializes writers behind an exclusive transaction.

pub mod file;
pub mod gateway;
pub mod sqlite;

pub use file::FileStore;
pub use gateway::{Mutator, StorageGateway, StoreError};
pub use sqlite::SqliteStore;

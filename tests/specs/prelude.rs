//! Shared helpers for the behavioral specs.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use vw_core::{FakeClock, Profile, SequentialIdGen, StorageSection};
use vw_service::WizardService;
use vw_storage::{FileStore, SqliteStore, StorageGateway};

pub type SpecService = WizardService<Box<dyn StorageGateway>, SequentialIdGen, FakeClock>;

/// One backend under test, with its clock handle and temp dir kept alive
pub struct Backend {
    pub name: &'static str,
    pub service: SpecService,
    pub clock: FakeClock,
    _dir: tempfile::TempDir,
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 13, 12, 0, 0).unwrap()
}

/// Both backends, each in its own temp directory
pub fn backends() -> Vec<Backend> {
    let file_dir = tempfile::tempdir().unwrap();
    let file_store: Box<dyn StorageGateway> =
        Box::new(FileStore::new(file_dir.path().join("wizard-storage.json")));

    let sqlite_dir = tempfile::tempdir().unwrap();
    let sqlite_store: Box<dyn StorageGateway> =
        Box::new(SqliteStore::open(sqlite_dir.path().join("wizard.db")).unwrap());

    vec![
        backend("file", file_store, file_dir),
        backend("sqlite", sqlite_store, sqlite_dir),
    ]
}

fn backend(name: &'static str, store: Box<dyn StorageGateway>, dir: tempfile::TempDir) -> Backend {
    let clock = FakeClock::at(start_time());
    Backend {
        name,
        service: WizardService::with_deps(store, SequentialIdGen::new("tok"), clock.clone()),
        clock,
        _dir: dir,
    }
}

/// A profile the way the wizard submits one: module-keyed state tree,
/// scoping flags, no history yet
pub fn submitted_profile(id: &str) -> Profile {
    let mut profile = Profile::new(id, "Main site");
    profile.created_at = start_time();
    profile.updated_at = start_time();
    profile.state.insert(
        "B1".to_string(),
        json!({
            "electricityConsumptionKwh": 100,
            "renewableShare": 0.25
        }),
    );
    profile.profile.insert("governance".to_string(), Some(true));
    profile
}

pub fn section(active: &str, profiles: Vec<Profile>) -> StorageSection {
    StorageSection {
        active_profile_id: active.to_string(),
        profiles: profiles.into_iter().map(|p| (p.id.clone(), p)).collect(),
    }
}

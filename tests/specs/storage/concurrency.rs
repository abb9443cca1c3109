//! Concurrent saves against the SQLite backend serialize on the
//! writer lock; neither caller's change is silently dropped.

use crate::prelude::*;
use serde_json::json;
use vw_core::{FakeClock, SequentialIdGen};
use vw_service::WizardService;
use vw_storage::SqliteStore;

#[test]
fn concurrent_saves_serialize_and_both_surface_in_the_audit_log() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wizard.db");

    // Seed p1 at version 1
    let store = SqliteStore::open(&path).unwrap();
    let mut service =
        WizardService::with_deps(store, SequentialIdGen::new("seed"), FakeClock::at(start_time()));
    service
        .save(section("p1", vec![submitted_profile("p1")]), "seeder")
        .unwrap();

    // Two writers race to update the same profile with different values
    let handles: Vec<_> = [("alice", 250), ("bob", 300)]
        .into_iter()
        .map(|(user, kwh)| {
            let path = path.clone();
            std::thread::spawn(move || {
                let store = SqliteStore::open(&path).unwrap();
                let mut service = WizardService::with_deps(
                    store,
                    SequentialIdGen::new(user),
                    FakeClock::at(start_time()),
                );
                let mut profile = submitted_profile("p1");
                profile.state.insert(
                    "B1".to_string(),
                    json!({"electricityConsumptionKwh": kwh, "renewableShare": 0.25}),
                );
                service
                    .save(section("p1", vec![profile]), user)
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let doc = service.load().unwrap();
    // The second committer diffed against the first committer's state,
    // so both updates produced their own version and audit entry.
    assert_eq!(doc.storage.profiles["p1"].version, 3);
    assert_eq!(doc.audit_log.len(), 3);
    let users: Vec<&str> = doc.audit_log.iter().map(|e| e.user_id.as_str()).collect();
    assert!(users.contains(&"seeder"));
    assert!(users.contains(&"alice"));
    assert!(users.contains(&"bob"));
    let versions: Vec<u32> = {
        let mut v: Vec<u32> = doc.audit_log.iter().map(|e| e.version).collect();
        v.sort_unstable();
        v
    };
    assert_eq!(versions, vec![1, 2, 3]);
}

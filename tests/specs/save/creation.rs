//! First save of a profile: version forced to 1, one creation entry.

use crate::prelude::*;
use serde_json::json;
use vw_core::FIELD_CREATED;

#[test]
fn first_save_creates_profile_at_version_one() {
    for mut backend in backends() {
        let mut profile = submitted_profile("p1");
        profile.history.insert(
            "B1".to_string(),
            vec![vw_core::Revision {
                id: "rev-1".to_string(),
                field: "electricityConsumptionKwh".to_string(),
                timestamp: start_time(),
                summary: "initial entry".to_string(),
                updated_by: None,
            }],
        );

        let doc = backend
            .service
            .save(section("p1", vec![profile]), "tester")
            .unwrap();

        assert_eq!(doc.storage.profiles["p1"].version, 1, "{}", backend.name);
        assert_eq!(doc.audit_log.len(), 1, "{}", backend.name);
        let entry = &doc.audit_log[0];
        assert_eq!(entry.user_id, "tester");
        assert_eq!(entry.version, 1);
        assert!(entry.changes.iter().any(|c| c.field == FIELD_CREATED));
        assert_eq!(entry.changes[0].previous, serde_json::Value::Null);

        // The submitted state tree is stored untouched
        assert_eq!(
            doc.storage.profiles["p1"].state["B1"]["electricityConsumptionKwh"],
            json!(100)
        );
        // Unauthored history picked up the acting user
        assert_eq!(
            doc.storage.profiles["p1"].history["B1"][0]
                .updated_by
                .as_deref(),
            Some("tester")
        );
    }
}

#[test]
fn created_document_is_what_load_returns() {
    for mut backend in backends() {
        let saved = backend
            .service
            .save(section("p1", vec![submitted_profile("p1")]), "tester")
            .unwrap();
        let loaded = backend.service.load().unwrap();
        similar_asserts::assert_eq!(saved, loaded, "{}", backend.name);
    }
}

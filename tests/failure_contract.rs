//! Contract Test: Failure Semantics
//!
//! Constraints verified:
//! - Invalid requests are rejected before the server is contacted
//! - Ineligible or missing zones fail without any mutation
//! - A failed lookup is never mistaken for a missing zone
//! - A failed mutation reports the steps already applied and stops
//!
//! If this test fails, callers can no longer trust `changed` on errors.

mod common;

use common::*;
use pdns_auth_zone::zone::{MetadataKey, MetadataValue, ZoneKind};
use pdns_auth_zone::{ZoneError, converge};
use serde_json::json;

#[tokio::test]
async fn invalid_requests_never_reach_the_server() {
    let server = MockPowerDns::new().with_zone("d1.example.", "Native");
    let cases = [
        json!({ "name": "" }),
        json!({ "name": "bad..example." }),
        json!({ "name": "-bad.example." }),
        json!({
            "name": "d1.example.",
            "properties": { "kind": "Native", "masters": ["1.1.1.1"] }
        }),
        json!({
            "name": "d1.example.",
            "properties": { "kind": "Slave", "nameservers": ["ns1.example."] }
        }),
        json!({
            "name": "d1.example.",
            "properties": { "kind": "Slave", "masters": ["not an address"] }
        }),
        json!({ "name": "d1.example.", "metadata": { "allow_axfr": ["AUTO-NS"] } }),
        json!({ "name": "d1.example.", "metadata": { "ixfr": "maybe" } }),
        json!({ "name": "d1.example.", "metadata": { "soa_edit_dnsupdate": "SOMETIMES" } }),
        json!({ "name": "d1.example.", "metadata": { "lua_axfr_script": "/etc/x.lua" } }),
    ];

    for case in cases {
        let err = converge(&server, &request(case.clone()))
            .await
            .expect_err("request must be rejected");
        assert_eq!(err.kind(), "validation", "{case}: {err}");
        assert!(!err.changed());
    }
    assert!(server.calls().is_empty(), "{:?}", server.calls());
}

#[tokio::test]
async fn notify_and_retrieve_need_an_existing_zone() {
    let server = MockPowerDns::new();
    for state in ["notify", "retrieve"] {
        let err = converge(&server, &request(json!({ "name": "d9.example.", "state": state })))
            .await
            .expect_err("missing zone");
        assert!(matches!(err, ZoneError::NotFound(ref name) if name == "d9.example."), "{err}");
    }
    assert!(server.mutating_calls().is_empty());
}

#[tokio::test]
async fn notify_on_native_and_retrieve_on_master_are_refused() {
    let server = MockPowerDns::new()
        .with_zone("d1.example.", "Native")
        .with_zone("d2.example.", "Master");

    let err = converge(&server, &request(json!({ "name": "d1.example.", "state": "notify" })))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_eligible");
    assert!(err.to_string().contains("Native"));

    let err = converge(&server, &request(json!({ "name": "d2.example.", "state": "retrieve" })))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_eligible");
    assert!(err.to_string().contains("Slave"));

    assert!(server.mutating_calls().is_empty());
}

#[tokio::test]
async fn lookup_failure_is_not_absence() {
    let server = MockPowerDns::new().with_zone("d1.example.", "Native");
    server.fail_on("get_zone");

    for state in ["exists", "present", "absent"] {
        let err = converge(&server, &request(json!({ "name": "d1.example.", "state": state })))
            .await
            .expect_err("lookup failed");
        assert_eq!(err.kind(), "transport", "{state}: {err}");
        assert!(!err.changed());
    }
    assert!(server.mutating_calls().is_empty());
    assert!(server.zone("d1.example.").is_some());
}

#[tokio::test]
async fn failed_mutation_lists_what_was_applied() {
    let server = MockPowerDns::new().with_zone("d1.example.", "Native");
    server.fail_on("set_metadata");

    let err = converge(
        &server,
        &request(json!({
            "name": "d1.example.",
            "properties": { "kind": "Master" },
            "metadata": { "axfr_source": "10.0.0.1", "ixfr": true }
        })),
    )
    .await
    .expect_err("metadata write fails");

    let ZoneError::Mutation { mutation, applied, .. } = &err else {
        panic!("expected a mutation error, got {err:?}");
    };
    assert_eq!(mutation, "set metadata axfr_source = \"10.0.0.1\"");
    assert_eq!(applied, &vec!["set kind Master".to_string()]);
    assert!(err.changed());

    let report = err.to_report();
    assert!(report.failed);
    assert!(report.changed);
    assert_eq!(report.error, "mutation");

    // Nothing after the failed step is attempted, nothing before it is undone.
    assert_eq!(
        server.mutating_calls(),
        vec![
            Call::SetKind("d1.example.".into(), ZoneKind::Master),
            Call::SetMetadata(
                "d1.example.".into(),
                MetadataKey::AxfrSource,
                MetadataValue::Text("10.0.0.1".into())
            ),
        ]
    );
    assert_eq!(server.zone("d1.example.").unwrap().kind, "Master");
}

#[tokio::test]
async fn failed_first_mutation_is_not_a_change() {
    let server = MockPowerDns::new();
    server.fail_on("create_zone");

    let err = converge(&server, &request(json!({ "name": "d4.example." })))
        .await
        .expect_err("create fails");
    assert_eq!(err.kind(), "mutation");
    assert!(!err.changed());
    assert!(server.zone("d4.example.").is_none());
}

#[tokio::test]
async fn failed_delete_is_reported() {
    let server = MockPowerDns::new().with_zone("d1.example.", "Native");
    server.fail_on("delete_zone");

    let err = converge(&server, &request(json!({ "name": "d1.example.", "state": "absent" })))
        .await
        .expect_err("delete fails");
    assert!(matches!(
        err,
        ZoneError::Mutation { ref mutation, .. } if mutation == "delete zone d1.example."
    ));
}

#[tokio::test]
async fn failed_read_back_counts_every_write_as_applied() {
    let server = MockPowerDns::new().with_zone("d1.example.", "Native");
    // The first lookup succeeds; the one after the writes does not.
    server.fail_on_call("get_zone", 2);

    let err = converge(
        &server,
        &request(json!({
            "name": "d1.example.",
            "properties": { "kind": "Master" },
            "metadata": { "ixfr": true }
        })),
    )
    .await
    .expect_err("read back fails");

    let ZoneError::Mutation { mutation, applied, .. } = &err else {
        panic!("expected a mutation error, got {err:?}");
    };
    assert_eq!(mutation, "read back zone d1.example.");
    assert_eq!(
        applied,
        &vec!["set kind Master".to_string(), "set metadata ixfr = true".to_string()]
    );
    assert!(err.changed());
    assert!(err.to_report().changed);

    let stored = server.zone("d1.example.").unwrap();
    assert_eq!(stored.kind, "Master");
    assert_eq!(stored.metadata["IXFR"], vec!["1"]);
}

#[tokio::test]
async fn failed_read_back_after_create_lists_the_create() {
    let server = MockPowerDns::new();
    server.fail_on_call("get_zone", 2);

    let err = converge(
        &server,
        &request(json!({ "name": "d4.example.", "metadata": { "slave_renotify": false } })),
    )
    .await
    .expect_err("read back fails");

    let ZoneError::Mutation { applied, .. } = &err else {
        panic!("expected a mutation error, got {err:?}");
    };
    assert_eq!(
        applied,
        &vec![
            "create Native zone d4.example.".to_string(),
            "set metadata slave_renotify = false".to_string(),
        ]
    );
    assert!(err.changed());
    assert!(server.zone("d4.example.").is_some());
}

#[tokio::test]
async fn serial_mismatch_stops_before_any_mutation() {
    let server = MockPowerDns::new().with_zone("d1.example.", "Native");

    for state in ["present", "absent", "notify"] {
        let err = converge(
            &server,
            &request(json!({
                "name": "d1.example.",
                "state": state,
                "properties": { "kind": "Master" },
                "if_serial": 5
            })),
        )
        .await
        .expect_err("serial differs");
        assert!(
            matches!(
                err,
                ZoneError::PreconditionFailed { expected: 5, actual: 2024010101, .. }
            ),
            "{state}: {err}"
        );
    }
    assert!(server.mutating_calls().is_empty());

    // Exists only reports, so the guard does not apply.
    let report = converge(
        &server,
        &request(json!({ "name": "d1.example.", "state": "exists", "if_serial": 5 })),
    )
    .await
    .unwrap();
    assert!(report.zone.exists());
}

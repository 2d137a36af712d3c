//! Happy-path call flow: batching, ordering, and state mutation.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]


use bytes::Bytes;
use mocks::*;

use waypoint_proto::envelope::LogicalRequest;
use waypoint_proto::messages::{decode_body, encode_body, CreatureActionRequest, DownloadSettingsRequest, GetInventoryRequest, InventoryDelta, InventoryItem};
use waypoint_proto::request::RequestType;

#[tokio::test]
async fn fresh_session_sends_six_requests_with_hashless_settings() {
    let session = test_session();
    seed_ticket(&session);
    let transport = ScriptedTransport::new(vec![Step::Respond(ok_response(
        default_ok_payloads(b"player"),
    ))]);
    let reauth = CountingReauth::new();
    let client = build_client(session, transport.clone(), reauth);

    let primary = client
        .call(LogicalRequest::bare(RequestType::GetPlayer))
        .await
        .unwrap();
    assert_eq!(primary, Bytes::from_static(b"player"));

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    let envelope = &sent[0].1;
    assert_eq!(envelope.requests.len(), 6);
    assert_eq!(envelope.requests[0].request_type, RequestType::GetPlayer);
    assert_eq!(envelope.signature, Bytes::from_static(b"mock-sig"));

    // No prior hash: the settings request asks for a full fetch.
    let settings: DownloadSettingsRequest =
        decode_body(envelope.requests[5].body.as_ref().unwrap()).unwrap();
    assert!(settings.hash.is_none());
}

#[tokio::test]
async fn request_ids_strictly_increase_across_calls() {
    let session = test_session();
    seed_ticket(&session);
    let transport = ScriptedTransport::new(vec![
        Step::Respond(ok_response(default_ok_payloads(b"a"))),
        Step::Respond(ok_response(default_ok_payloads(b"b"))),
        Step::Respond(ok_response(default_ok_payloads(b"c"))),
    ]);
    let client = build_client(session, transport.clone(), CountingReauth::new());

    for _ in 0..3 {
        client
            .call(LogicalRequest::bare(RequestType::GetPlayer))
            .await
            .unwrap();
    }

    let ids: Vec<u64> = transport.sent().iter().map(|(_, e)| e.request_id).collect();
    assert!(ids[0] > 0);
    assert!(ids.windows(2).all(|w| w[1] > w[0]), "ids not increasing: {ids:?}");
}

#[tokio::test]
async fn raw_batch_gets_no_default_requests() {
    let session = test_session();
    seed_ticket(&session);
    let transport = ScriptedTransport::new(vec![Step::Respond(ok_response(vec![
        Bytes::from_static(b"r1"),
        Bytes::from_static(b"r2"),
    ]))]);
    let client = build_client(session, transport.clone(), CountingReauth::new());

    let primary = client
        .call_batch(vec![
            LogicalRequest::bare(RequestType::GetPlayer),
            LogicalRequest::bare(RequestType::GetMapObjects),
        ])
        .await
        .unwrap();

    assert_eq!(primary, Bytes::from_static(b"r1"));
    assert_eq!(transport.sent()[0].1.requests.len(), 2);
}

#[tokio::test]
async fn fresh_inventory_delta_merges_and_advances_timestamp() {
    let session = test_session();
    seed_ticket(&session);

    let mut payloads = default_ok_payloads(b"player");
    payloads[3] = json_bytes(serde_json::json!({
        "new_timestamp_ms": 500,
        "items": [{ "id": 42, "kind": "ball", "count": 3 }]
    }));
    let transport = ScriptedTransport::new(vec![Step::Respond(ok_response(payloads))]);
    let client = build_client(session.clone(), transport.clone(), CountingReauth::new());

    client
        .call(LogicalRequest::bare(RequestType::GetPlayer))
        .await
        .unwrap();

    assert_eq!(session.inventory_timestamp_ms(), 500);
    assert_eq!(session.inventory_item(42).map(|i| i.count), Some(3));

    // The next inventory request carries the advanced timestamp.
    let transport2 = ScriptedTransport::new(vec![Step::Respond(ok_response(
        default_ok_payloads(b"p"),
    ))]);
    let client2 = build_client(session, transport2.clone(), CountingReauth::new());
    client2
        .call(LogicalRequest::bare(RequestType::GetPlayer))
        .await
        .unwrap();
    let inv: GetInventoryRequest =
        decode_body(transport2.sent()[0].1.requests[3].body.as_ref().unwrap()).unwrap();
    assert_eq!(inv.last_timestamp_ms, 500);
}

#[tokio::test]
async fn stale_inventory_delta_leaves_state_unchanged() {
    let session = test_session();
    seed_ticket(&session);
    session.apply_inventory_delta(InventoryDelta {
        new_timestamp_ms: 1000,
        items: vec![InventoryItem {
            id: 1,
            kind: "ball".into(),
            count: 9,
        }],
    });

    let mut payloads = default_ok_payloads(b"player");
    payloads[3] = json_bytes(serde_json::json!({
        "new_timestamp_ms": 400,
        "items": [{ "id": 1, "kind": "ball", "count": 0 }]
    }));
    let transport = ScriptedTransport::new(vec![Step::Respond(ok_response(payloads))]);
    let client = build_client(session.clone(), transport, CountingReauth::new());

    client
        .call(LogicalRequest::bare(RequestType::GetPlayer))
        .await
        .unwrap();

    assert_eq!(session.inventory_timestamp_ms(), 1000);
    assert_eq!(session.inventory_item(1).map(|i| i.count), Some(9));
}

#[tokio::test]
async fn settings_response_replaces_object_and_hash() {
    let session = test_session();
    seed_ticket(&session);

    let mut payloads = default_ok_payloads(b"player");
    payloads[5] = json_bytes(serde_json::json!({
        "hash": "h-2024",
        "settings": { "map_refresh_seconds": 30 }
    }));
    let transport = ScriptedTransport::new(vec![Step::Respond(ok_response(payloads))]);
    let client = build_client(session.clone(), transport, CountingReauth::new());

    client
        .call(LogicalRequest::bare(RequestType::GetPlayer))
        .await
        .unwrap();

    let settings = session.settings().unwrap();
    assert_eq!(settings.hash, "h-2024");
    assert_eq!(settings.value["map_refresh_seconds"], 30);
}

#[tokio::test]
async fn settings_error_retains_existing_settings() {
    let session = test_session();
    seed_ticket(&session);
    session.replace_settings(waypoint_client::session::SettingsState {
        value: serde_json::json!({ "v": 1 }),
        hash: "old".into(),
    });

    let mut payloads = default_ok_payloads(b"player");
    payloads[5] = json_bytes(serde_json::json!({ "error": "try later" }));
    let transport = ScriptedTransport::new(vec![Step::Respond(ok_response(payloads))]);
    let client = build_client(session.clone(), transport, CountingReauth::new());

    client
        .call(LogicalRequest::bare(RequestType::GetPlayer))
        .await
        .unwrap();

    assert_eq!(session.settings().unwrap().hash, "old");
}

#[tokio::test]
async fn release_removes_entity_from_inventory() {
    let session = test_session();
    seed_ticket(&session);
    session.apply_inventory_delta(InventoryDelta {
        new_timestamp_ms: 1,
        items: vec![InventoryItem {
            id: 77,
            kind: "creature".into(),
            count: 1,
        }],
    });

    let mut payloads = default_ok_payloads(br#"{"status":"success"}"#);
    payloads[3] = json_bytes(serde_json::json!({ "new_timestamp_ms": 1, "items": [] }));
    let transport = ScriptedTransport::new(vec![Step::Respond(ok_response(payloads))]);
    let client = build_client(session.clone(), transport, CountingReauth::new());

    let body = encode_body(&CreatureActionRequest { creature_id: 77 }).unwrap();
    client
        .call(LogicalRequest::new(RequestType::ReleaseCreature, body))
        .await
        .unwrap();

    assert!(session.inventory_item(77).is_none());
}

#[tokio::test]
async fn already_handled_action_still_removes_entity() {
    let session = test_session();
    seed_ticket(&session);
    session.apply_inventory_delta(InventoryDelta {
        new_timestamp_ms: 1,
        items: vec![InventoryItem {
            id: 5,
            kind: "creature".into(),
            count: 1,
        }],
    });

    let payloads = default_ok_payloads(br#"{"status":"already_handled"}"#);
    let transport = ScriptedTransport::new(vec![Step::Respond(ok_response(payloads))]);
    let client = build_client(session.clone(), transport, CountingReauth::new());

    let body = encode_body(&CreatureActionRequest { creature_id: 5 }).unwrap();
    client
        .call(LogicalRequest::new(RequestType::EvolveCreature, body))
        .await
        .unwrap();

    assert!(session.inventory_item(5).is_none());
}

#[tokio::test]
async fn map_fetch_records_position_and_call_time() {
    let session = test_session();
    seed_ticket(&session);
    let transport = ScriptedTransport::new(vec![Step::Respond(ok_response(
        default_ok_payloads(b"map"),
    ))]);
    let client = build_client(session.clone(), transport, CountingReauth::new());

    assert!(session.last_map_fetch().is_none());
    client
        .call(LogicalRequest::bare(RequestType::GetMapObjects))
        .await
        .unwrap();

    let fetched_at = session.last_map_fetch().unwrap();
    assert_eq!(fetched_at.latitude, test_position().latitude);
    assert!(session.last_call_ms() > 0);
}

#[tokio::test]
async fn mutator_parse_failure_does_not_cost_the_primary_result() {
    let session = test_session();
    seed_ticket(&session);

    let mut payloads = default_ok_payloads(b"player");
    payloads[3] = Bytes::from_static(b"definitely not json");
    let transport = ScriptedTransport::new(vec![Step::Respond(ok_response(payloads))]);
    let client = build_client(session.clone(), transport, CountingReauth::new());

    let primary = client
        .call(LogicalRequest::bare(RequestType::GetPlayer))
        .await
        .unwrap();
    assert_eq!(primary, Bytes::from_static(b"player"));
    assert_eq!(session.inventory_timestamp_ms(), 0);
}

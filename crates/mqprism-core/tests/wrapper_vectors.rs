//! Wrapper chain vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use mqprism_core::carrier::QueueMessage;
use mqprism_core::pool::PoolScope;
use mqprism_core::wrappers::{unwrap_payload, QUICK_MATCH_WINDOW};

use vector_loader::TestVector;

fn load(name: &str) -> TestVector {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}

#[test]
fn wrapper_vectors() {
    let files = [
        "notification_object.json",
        "notification_stringified.json",
        "notification_missing_required.json",
        "eventbus_object.json",
        "eventbus_stringified.json",
        "eventbus_bad_time.json",
        "bare_envelope.json",
        "not_json.json",
        "nested_sentinels.json",
    ];

    for f in files {
        let v = load(f);
        let body = v.body_text();
        let carrier = QueueMessage {
            message_id: Some("q-mid".into()),
            receipt_handle: Some("q-rh".into()),
            body: body.clone(),
            attributes: Default::default(),
        };
        let scope = PoolScope::new(true);
        let unwrapped = unwrap_payload(body.as_bytes(), &carrier, &scope, QUICK_MATCH_WINDOW);

        assert_eq!(
            unwrapped.wrapper_name(),
            v.expect.wrapper,
            "vector={}",
            v.description
        );

        // Queue metadata is populated on every delivery.
        assert_eq!(unwrapped.queue.message_id.as_deref(), Some("q-mid"), "vector={}", v.description);
        assert_eq!(unwrapped.queue.receipt_handle.as_deref(), Some("q-rh"), "vector={}", v.description);

        let inner = std::str::from_utf8(&unwrapped.inner).unwrap();
        for needle in &v.expect.inner_contains {
            assert!(inner.contains(needle), "vector={} needle={needle}", v.description);
        }

        if let Some(expected) = &v.expect.topic_arn {
            let meta = unwrapped.notification.as_ref().expect("notification metadata");
            assert_eq!(&meta.topic_arn, expected, "vector={}", v.description);
        }
        if let Some(expected) = &v.expect.message_id {
            let meta = unwrapped.notification.as_ref().expect("notification metadata");
            assert_eq!(&meta.message_id, expected, "vector={}", v.description);
        }
        if let Some(expected) = &v.expect.detail_type {
            let meta = unwrapped.event_bus.as_ref().expect("event-bus metadata");
            assert_eq!(&meta.detail_type, expected, "vector={}", v.description);
        }
        if let Some(expected) = &v.expect.event_id {
            let meta = unwrapped.event_bus.as_ref().expect("event-bus metadata");
            assert_eq!(meta.event_id.as_deref(), Some(expected.as_str()), "vector={}", v.description);
        }
        if let Some(expected) = &v.expect.region {
            let meta = unwrapped.event_bus.as_ref().expect("event-bus metadata");
            assert_eq!(meta.region.as_deref(), Some(expected.as_str()), "vector={}", v.description);
        }
    }
}

/// Sentinels past the scan window: quick-match misses, the retry pass
/// still recognizes the wrapper.
#[test]
fn sentinels_beyond_scan_window_still_parse() {
    let padding = "x".repeat(4096);
    let body = serde_json::json!({
        "Padding": padding,
        "Type": "Notification",
        "MessageId": "mid-9",
        "TopicArn": "arn:aws:sns:us-east-1:000000000000:late",
        "Message": {"id": "id-9", "type": "t"},
    })
    .to_string();
    let carrier = QueueMessage {
        body: body.clone(),
        ..Default::default()
    };
    let scope = PoolScope::new(true);

    // The sentinel fields sit after 4 KiB of padding.
    let unwrapped = unwrap_payload(body.as_bytes(), &carrier, &scope, 64);
    assert_eq!(unwrapped.wrapper_name(), "notification");
    assert_eq!(
        unwrapped.notification.as_ref().unwrap().topic_arn,
        "arn:aws:sns:us-east-1:000000000000:late"
    );
}

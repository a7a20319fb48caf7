//! Round-trip property suites over the full serializer pipeline.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use chrono::DateTime;
use proptest::collection::vec;
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use mqprism_bus::config::SerializationConfig;
use mqprism_bus::registry::MessageRegistryBuilder;
use mqprism_bus::runtime::{Clock, FixedSourceProvider, IdGenerator};
use mqprism_bus::EnvelopeSerializer;
use mqprism_core::carrier::QueueMessage;
use mqprism_core::envelope::RESERVED_PROPERTIES;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct AddressInfo {
    #[serde(rename = "Street")]
    street: String,
    #[serde(rename = "Unit")]
    unit: u32,
    #[serde(rename = "ZipCode")]
    zip_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct AddressInfoList {
    #[serde(rename = "Items")]
    items: Vec<AddressInfo>,
}

struct FixedClock(DateTime<chrono::FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<chrono::FixedOffset> {
        self.0
    }
}

struct FixedIds;

impl IdGenerator for FixedIds {
    fn next_id(&self) -> String {
        "prop-id".into()
    }
}

fn serializer() -> EnvelopeSerializer {
    let config = SerializationConfig::default();
    let registry = MessageRegistryBuilder::new()
        .publish::<AddressInfoList>("addressInfoList")
        .subscribe::<AddressInfoList>("addressInfoList")
        .build(&config);
    EnvelopeSerializer::new(Arc::new(registry), config)
        .with_clock(Arc::new(FixedClock(
            DateTime::parse_from_rfc3339("2023-10-01T12:00:00+00:00").unwrap(),
        )))
        .with_id_generator(Arc::new(FixedIds))
        .with_source_provider(Arc::new(FixedSourceProvider("/backend/service".into())))
}

fn address_info() -> impl Strategy<Value = AddressInfo> {
    ("[a-zA-Z0-9 ]{0,12}", any::<u32>(), "[0-9]{5}").prop_map(|(street, unit, zip_code)| {
        AddressInfo {
            street,
            unit,
            zip_code,
        }
    })
}

fn metadata_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(|n| json!(n)),
        any::<bool>().prop_map(|b| json!(b)),
        "[a-z ]{0,10}".prop_map(|s| json!(s)),
        vec(any::<u8>(), 0..4).prop_map(|v| json!(v)),
    ]
}

fn metadata_key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,10}".prop_filter("reserved property names are excluded", |k| {
        !RESERVED_PROPERTIES.contains(&k.as_str())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// serialize -> convert preserves the seven known fields, every
    /// metadata entry, and the message itself.
    #[test]
    fn round_trip_preserves_envelope(
        items in vec(address_info(), 0..4),
        metadata in vec((metadata_key(), metadata_value()), 0..4),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(async {
            let s = serializer();
            let message = AddressInfoList { items };
            let mut env = s.create_envelope(message.clone()).unwrap();
            for (k, v) in &metadata {
                env.metadata.insert(k.clone(), v.clone());
            }

            let wire = s.serialize(&env).await.unwrap();
            let carrier = QueueMessage { body: wire, ..Default::default() };
            let (received, _) = s.convert_to_envelope(&carrier).await.unwrap();

            assert_eq!(received.id, env.id);
            assert_eq!(received.source, env.source);
            assert_eq!(received.spec_version, env.spec_version);
            assert_eq!(received.type_id, env.type_id);
            assert_eq!(received.time, env.time);
            assert_eq!(received.metadata, env.metadata);

            let typed = received.downcast::<AddressInfoList>().unwrap();
            assert_eq!(typed.message.unwrap(), message);
        });
    }

    /// The emitted property order is always the canonical one, with
    /// metadata trailing in insertion order, reserved collisions dropped.
    #[test]
    fn emitted_property_order_is_canonical(
        metadata in vec((metadata_key(), metadata_value()), 0..4),
        reserved in proptest::sample::select(RESERVED_PROPERTIES.to_vec()),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(async {
            let s = serializer();
            let mut env = s.create_envelope(AddressInfoList { items: vec![] }).unwrap();
            for (k, v) in &metadata {
                env.metadata.insert(k.clone(), v.clone());
            }
            // A colliding key must never be emitted twice.
            env.metadata.insert(reserved.to_string(), json!("shadow"));

            let wire = s.serialize(&env).await.unwrap();
            let parsed: serde_json::Map<String, Value> = serde_json::from_str(&wire).unwrap();

            let mut expected: Vec<String> =
                RESERVED_PROPERTIES.iter().map(|p| p.to_string()).collect();
            // Dedup: later metadata inserts overwrite earlier ones in the map.
            for (k, _) in &metadata {
                if !expected.iter().any(|e| e == k) {
                    expected.push(k.clone());
                }
            }
            let keys: Vec<String> = parsed.keys().cloned().collect();
            assert_eq!(keys, expected);
            assert_ne!(parsed.get(reserved), Some(&json!("shadow")));
        });
    }
}

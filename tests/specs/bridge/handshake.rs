// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handshake specs
//!
//! Verify the interceptor connects, authenticates through the shared key and
//! retrieves the listener set the orchestrator published.

use crate::prelude::*;

#[test]
fn handshake_retrieves_listeners_in_published_order() {
    init_tracing();
    let log = CallLog::new();
    let fake = orchestrator(&["first", "second", "third"], &log);

    let dispatcher = bootstrap(&fake.descriptor(), &ChannelSlot::new()).unwrap();
    dispatcher.build_started(&sample_event("core")).unwrap();

    assert_eq!(dispatcher.listener_count(), 3);
    let labels: Vec<String> = log.sequence().into_iter().map(|(label, _)| label).collect();
    assert_eq!(labels, ["first", "second", "third"]);
}

#[test]
fn mismatched_keys_never_complete_the_handshake() {
    init_tracing();
    let fake = FakeOrchestrator::start_with(&[1u8; 16], |builder| {
        builder.export_listeners(LISTENERS_PROPERTY, Vec::new())
    })
    .unwrap();
    let wrong_key = write_key_file(&[2u8; 16]).unwrap();
    let descriptor =
        ConnectionDescriptor { port: fake.port(), key_path: wrong_key.path().to_path_buf() };

    let err = bootstrap(&descriptor, &ChannelSlot::new()).unwrap_err();

    assert!(matches!(err, BootstrapError::Handshake(HandshakeError::Channel(_))), "got {err:?}");
}

#[test]
fn orchestrator_without_listener_property_is_rejected() {
    init_tracing();
    let fake = FakeOrchestrator::start_with(&[0u8; 16], |builder| {
        builder.property("SomethingElse", serde_json::json!([]))
    })
    .unwrap();

    let err = bootstrap(&fake.descriptor(), &ChannelSlot::new()).unwrap_err();

    assert_eq!(
        err.to_string(),
        format!("listener handshake failed: peer has not published {LISTENERS_PROPERTY:?}")
    );
}

#[test]
fn one_channel_per_slot() {
    init_tracing();
    let log = CallLog::new();
    let fake = orchestrator(&["only"], &log);
    let slot = ChannelSlot::new();

    bootstrap(&fake.descriptor(), &slot).unwrap();
    let again = bootstrap(&fake.descriptor(), &slot);

    assert!(matches!(again, Err(BootstrapError::AlreadyConnected)));
    assert_eq!(fake.connections(), 1);
}

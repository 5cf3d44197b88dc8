// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inert mode specs
//!
//! Verify that a build without remote reporting configured runs unaffected.

use crate::prelude::*;

#[test]
#[serial]
fn unset_connector_accepts_every_event() {
    init_tracing();
    let slot = ChannelSlot::new();

    let dispatcher = with_connector(None, || connect(&slot)).unwrap();

    for (method, event) in build_lifecycle() {
        method.invoke(&dispatcher, &event).unwrap();
    }
    assert!(dispatcher.is_inert());
    assert!(!slot.is_connected());
}

#[test]
#[serial]
fn single_token_connector_is_treated_as_unset() {
    init_tracing();
    let slot = ChannelSlot::new();

    let dispatcher = with_connector(Some("4555"), || connect(&slot)).unwrap();

    assert!(dispatcher.is_inert());
    assert!(!dispatcher.is_connected());
    assert!(!slot.is_connected());
}

#[test]
#[serial]
fn non_numeric_port_fails_construction() {
    init_tracing();
    let err = with_connector(Some("port|/tmp/key.bin"), || connect(&ChannelSlot::new())).unwrap_err();

    assert!(matches!(err, BootstrapError::Descriptor(_)), "got {err:?}");
}

#[test]
#[serial]
fn unreadable_key_fails_construction() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let connector = format!("4555|{}", dir.path().join("absent.key").display());

    let err = with_connector(Some(&connector), || connect(&ChannelSlot::new())).unwrap_err();

    assert!(matches!(err, BootstrapError::KeyMaterial { .. }), "got {err:?}");
}

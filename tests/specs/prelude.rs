// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared imports and helpers for the bridge specs.

#![allow(unused_imports)]

use std::sync::Once;

pub use std::sync::Arc;

pub use anttap_core::test_support::{sample_event, CallLog, RecordingListener};
pub use anttap_core::{BuildEvent, BuildListener, ListenerError, ListenerMethod};
pub use anttap_interceptor::test_support::{write_key_file, FakeOrchestrator};
pub use anttap_interceptor::{
    bootstrap, connect, process_channel, register, BootstrapError, ChannelSlot,
    ConnectionDescriptor, EventDispatcher, HandshakeError, CONNECTOR_VAR, LISTENERS_PROPERTY,
};
pub use serial_test::serial;

static TRACING: Once = Once::new();

/// Route interceptor logs through the test harness's captured output.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Run `f` with the connector variable set to `value`, or unset for `None`.
pub fn with_connector<T>(value: Option<&str>, f: impl FnOnce() -> T) -> T {
    match value {
        Some(v) => std::env::set_var(CONNECTOR_VAR, v),
        None => std::env::remove_var(CONNECTOR_VAR),
    }
    let result = f();
    std::env::remove_var(CONNECTOR_VAR);
    result
}

/// Start an orchestrator publishing one recording listener per label.
pub fn orchestrator(labels: &[&str], log: &CallLog) -> FakeOrchestrator {
    let listeners = labels.iter().map(|l| RecordingListener::new(l, log).shared()).collect();
    FakeOrchestrator::start(listeners).unwrap()
}

/// The seven lifecycle events of a small build, in host order.
pub fn build_lifecycle() -> Vec<(ListenerMethod, BuildEvent)> {
    let build = BuildEvent::new("core");
    let target = build.clone().with_target("compile");
    let task = target.clone().with_task("javac");
    vec![
        (ListenerMethod::BuildStarted, build.clone()),
        (ListenerMethod::TargetStarted, target.clone()),
        (ListenerMethod::TaskStarted, task.clone()),
        (ListenerMethod::MessageLogged, task.clone().with_message("Compiling 12 source files", 2)),
        (ListenerMethod::TaskFinished, task),
        (ListenerMethod::TargetFinished, target),
        (ListenerMethod::BuildFinished, build.with_error("compilation failed")),
    ]
}

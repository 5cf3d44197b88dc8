// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{BuildEvent, BuildListener, FakeClock, ListenerError, ListenerMethod};

/// One recorded listener invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerCall {
    pub listener: String,
    pub method: ListenerMethod,
    pub event: BuildEvent,
}

/// Call log shared by several listeners so cross-listener order is visible.
#[derive(Clone, Default)]
pub struct CallLog {
    inner: Arc<Mutex<Vec<ListenerCall>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ListenerCall> {
        self.inner.lock().clone()
    }

    /// `(listener, method)` pairs in call order
    pub fn sequence(&self) -> Vec<(String, ListenerMethod)> {
        self.inner.lock().iter().map(|c| (c.listener.clone(), c.method)).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    fn push(&self, listener: &str, method: ListenerMethod, event: &BuildEvent) {
        self.inner.lock().push(ListenerCall {
            listener: listener.to_string(),
            method,
            event: event.clone(),
        });
    }
}

/// Listener that records every call into a [`CallLog`].
///
/// When `fail_on` is set, the listener records the call and then fails.
pub struct RecordingListener {
    label: String,
    log: CallLog,
    fail_on: Option<ListenerMethod>,
}

impl RecordingListener {
    pub fn new(label: &str, log: &CallLog) -> Self {
        Self { label: label.to_string(), log: log.clone(), fail_on: None }
    }

    /// A listener that fails every time `method` is invoked.
    pub fn failing(label: &str, log: &CallLog, method: ListenerMethod) -> Self {
        Self { label: label.to_string(), log: log.clone(), fail_on: Some(method) }
    }

    pub fn shared(self) -> Arc<dyn BuildListener> {
        Arc::new(self)
    }

    fn record(&self, method: ListenerMethod, event: &BuildEvent) -> Result<(), ListenerError> {
        self.log.push(&self.label, method, event);
        if self.fail_on == Some(method) {
            return Err(ListenerError::Failed(format!("{} rejected {}", self.label, method)));
        }
        Ok(())
    }
}

impl BuildListener for RecordingListener {
    fn build_started(&self, event: &BuildEvent) -> Result<(), ListenerError> {
        self.record(ListenerMethod::BuildStarted, event)
    }

    fn build_finished(&self, event: &BuildEvent) -> Result<(), ListenerError> {
        self.record(ListenerMethod::BuildFinished, event)
    }

    fn target_started(&self, event: &BuildEvent) -> Result<(), ListenerError> {
        self.record(ListenerMethod::TargetStarted, event)
    }

    fn target_finished(&self, event: &BuildEvent) -> Result<(), ListenerError> {
        self.record(ListenerMethod::TargetFinished, event)
    }

    fn task_started(&self, event: &BuildEvent) -> Result<(), ListenerError> {
        self.record(ListenerMethod::TaskStarted, event)
    }

    fn task_finished(&self, event: &BuildEvent) -> Result<(), ListenerError> {
        self.record(ListenerMethod::TaskFinished, event)
    }

    fn message_logged(&self, event: &BuildEvent) -> Result<(), ListenerError> {
        self.record(ListenerMethod::MessageLogged, event)
    }
}

/// Event factory with fixed field values.
pub fn sample_event(project: &str) -> BuildEvent {
    BuildEvent::stamped(project, &FakeClock::new()).with_target("compile")
}

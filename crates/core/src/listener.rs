// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The seven-method build listener contract.
//!
//! The host invokes it on the interceptor, the interceptor invokes it on each
//! remote listener, and the orchestrator implements it for real.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::BuildEvent;

/// Errors raised by a listener while handling an event
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The listener itself rejected or failed on the event
    #[error("listener failed: {0}")]
    Failed(String),

    /// A listener on the far side of the channel failed
    #[error("remote listener failed: {0}")]
    Remote(String),

    /// The event could not be delivered to a remote listener
    #[error("listener transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ListenerError {
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(err))
    }
}

/// One capability of the listener contract.
///
/// Travels on the wire to name the method a remote invocation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerMethod {
    BuildStarted,
    BuildFinished,
    TargetStarted,
    TargetFinished,
    TaskStarted,
    TaskFinished,
    MessageLogged,
}

impl ListenerMethod {
    pub const ALL: [ListenerMethod; 7] = [
        ListenerMethod::BuildStarted,
        ListenerMethod::BuildFinished,
        ListenerMethod::TargetStarted,
        ListenerMethod::TargetFinished,
        ListenerMethod::TaskStarted,
        ListenerMethod::TaskFinished,
        ListenerMethod::MessageLogged,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ListenerMethod::BuildStarted => "build_started",
            ListenerMethod::BuildFinished => "build_finished",
            ListenerMethod::TargetStarted => "target_started",
            ListenerMethod::TargetFinished => "target_finished",
            ListenerMethod::TaskStarted => "task_started",
            ListenerMethod::TaskFinished => "task_finished",
            ListenerMethod::MessageLogged => "message_logged",
        }
    }

    /// Call the method this value names on `listener`.
    pub fn invoke(
        self,
        listener: &dyn BuildListener,
        event: &BuildEvent,
    ) -> Result<(), ListenerError> {
        match self {
            ListenerMethod::BuildStarted => listener.build_started(event),
            ListenerMethod::BuildFinished => listener.build_finished(event),
            ListenerMethod::TargetStarted => listener.target_started(event),
            ListenerMethod::TargetFinished => listener.target_finished(event),
            ListenerMethod::TaskStarted => listener.task_started(event),
            ListenerMethod::TaskFinished => listener.task_finished(event),
            ListenerMethod::MessageLogged => listener.message_logged(event),
        }
    }
}

impl fmt::Display for ListenerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Receiver of build lifecycle events.
///
/// Every method defaults to a no-op so implementations only override what
/// they care about. Calls are synchronous: a method returns once the event
/// has been handled.
pub trait BuildListener: Send + Sync {
    fn build_started(&self, _event: &BuildEvent) -> Result<(), ListenerError> {
        Ok(())
    }

    fn build_finished(&self, _event: &BuildEvent) -> Result<(), ListenerError> {
        Ok(())
    }

    fn target_started(&self, _event: &BuildEvent) -> Result<(), ListenerError> {
        Ok(())
    }

    fn target_finished(&self, _event: &BuildEvent) -> Result<(), ListenerError> {
        Ok(())
    }

    fn task_started(&self, _event: &BuildEvent) -> Result<(), ListenerError> {
        Ok(())
    }

    fn task_finished(&self, _event: &BuildEvent) -> Result<(), ListenerError> {
        Ok(())
    }

    fn message_logged(&self, _event: &BuildEvent) -> Result<(), ListenerError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;

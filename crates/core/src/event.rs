// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build lifecycle event record.
//!
//! The bridge never interprets these fields; an event is routed whole to
//! whichever listener method the host invoked.

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};

/// A single build lifecycle occurrence as reported by the host build tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildEvent {
    /// Name of the project being built
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Target the event belongs to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Task the event belongs to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    /// Logged message text (message events)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Host-defined message priority
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    /// Failure description for finished events that ended in error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock time the host emitted the event
    #[serde(default)]
    pub timestamp_ms: u64,
}

impl BuildEvent {
    /// Create an event for `project`, stamped with the current time.
    pub fn new(project: impl Into<String>) -> Self {
        Self::stamped(project, &SystemClock)
    }

    /// Create an event for `project`, stamped by `clock`.
    pub fn stamped(project: impl Into<String>, clock: &impl Clock) -> Self {
        Self { project: Some(project.into()), timestamp_ms: clock.epoch_ms(), ..Self::default() }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = Some(task.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>, priority: i32) -> Self {
        self.message = Some(message.into());
        self.priority = Some(priority);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

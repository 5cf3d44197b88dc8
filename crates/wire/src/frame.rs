// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anttap_core::{BuildEvent, ListenerMethod};
use serde::{Deserialize, Serialize};

/// Reference to an object exported by the sending side of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub oid: u64,
}

/// Unit of traffic on a channel, in either direction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    /// A call the peer must answer with a `Response` carrying the same id
    Request { id: u64, call: Call },

    /// Answer to an earlier `Request`
    Response { id: u64, reply: Reply },
}

/// Operations a peer can ask for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Call {
    /// Look up a value the peer published under `name`
    GetProperty { name: String },

    /// Invoke a listener method on an object the peer exported
    Invoke { target: ObjectRef, method: ListenerMethod, event: BuildEvent },
}

/// Answers to a [`Call`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    /// Property lookup result; `None` when nothing is published under the name
    Property {
        #[serde(default)]
        value: Option<serde_json::Value>,
    },

    /// Invocation completed
    Done,

    /// Invocation raised an error on the peer
    Failed { message: String },
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;

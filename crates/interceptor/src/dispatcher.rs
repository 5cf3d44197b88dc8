// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fan-out of host build events to the retrieved listener set.

use std::fmt;
use std::sync::Arc;

use anttap_channel::{Channel, ChannelError};
use anttap_core::{BuildEvent, BuildListener, ListenerError, ListenerMethod};
use anttap_wire::ObjectRef;
use thiserror::Error;
use tracing::debug;

/// Errors from retrieving the listener set over the channel
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("property lookup failed: {0}")]
    Channel(#[from] ChannelError),

    #[error("peer has not published {0:?}")]
    MissingProperty(String),

    #[error("{property:?} is not a list of object references: {source}")]
    InvalidShape {
        property: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Ordered, immutable set of listeners. Forwarding order is insertion order.
#[derive(Clone, Default)]
pub struct ListenerSet {
    listeners: Vec<Arc<dyn BuildListener>>,
}

impl ListenerSet {
    pub fn new(listeners: Vec<Arc<dyn BuildListener>>) -> Self {
        Self { listeners }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up `property` on the peer and wrap each referenced object in a
    /// remote proxy, keeping the published order.
    pub fn fetch(channel: &Channel, property: &str) -> Result<Self, HandshakeError> {
        let value = channel
            .remote_property(property)?
            .ok_or_else(|| HandshakeError::MissingProperty(property.to_string()))?;
        let refs: Vec<ObjectRef> = serde_json::from_value(value).map_err(|source| {
            HandshakeError::InvalidShape { property: property.to_string(), source }
        })?;

        Ok(Self::new(
            refs.into_iter()
                .map(|target| Arc::new(channel.remote_listener(target)) as Arc<dyn BuildListener>)
                .collect(),
        ))
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn BuildListener>> {
        self.listeners.iter()
    }
}

impl fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet").field("len", &self.listeners.len()).finish()
    }
}

/// The listener the host registers. Forwards every event to each listener in
/// the set, in order, on the calling thread.
///
/// A failing listener stops delivery of that event to the listeners after it
/// and the error is returned to the host. The failed listener stays in the set
/// and receives the next event.
///
/// Remote listeners block the calling thread for the round trip. Called from
/// inside a tokio runtime they fail with [`ListenerError::Transport`] instead.
pub struct EventDispatcher {
    listeners: ListenerSet,
    // NOTE(lifetime): keeps the socket and worker pool alive for the remote proxies
    channel: Option<Arc<Channel>>,
}

impl EventDispatcher {
    /// Dispatcher for when remote reporting is not configured. Every event is
    /// accepted and dropped.
    pub fn inert() -> Self {
        Self { listeners: ListenerSet::empty(), channel: None }
    }

    pub fn new(channel: Arc<Channel>, listeners: ListenerSet) -> Self {
        Self { listeners, channel: Some(channel) }
    }

    /// Dispatcher over listeners that need no channel.
    pub fn with_listeners(listeners: ListenerSet) -> Self {
        Self { listeners, channel: None }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// True when no listener will ever see an event.
    pub fn is_inert(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    pub fn channel(&self) -> Option<&Arc<Channel>> {
        self.channel.as_ref()
    }

    fn forward(&self, method: ListenerMethod, event: &BuildEvent) -> Result<(), ListenerError> {
        for (index, listener) in self.listeners.iter().enumerate() {
            if let Err(e) = method.invoke(listener.as_ref(), event) {
                debug!(%method, index, error = %e, "listener failed, skipping the rest");
                return Err(e);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .field("connected", &self.channel.is_some())
            .finish()
    }
}

impl BuildListener for EventDispatcher {
    fn build_started(&self, event: &BuildEvent) -> Result<(), ListenerError> {
        self.forward(ListenerMethod::BuildStarted, event)
    }

    fn build_finished(&self, event: &BuildEvent) -> Result<(), ListenerError> {
        self.forward(ListenerMethod::BuildFinished, event)
    }

    fn target_started(&self, event: &BuildEvent) -> Result<(), ListenerError> {
        self.forward(ListenerMethod::TargetStarted, event)
    }

    fn target_finished(&self, event: &BuildEvent) -> Result<(), ListenerError> {
        self.forward(ListenerMethod::TargetFinished, event)
    }

    fn task_started(&self, event: &BuildEvent) -> Result<(), ListenerError> {
        self.forward(ListenerMethod::TaskStarted, event)
    }

    fn task_finished(&self, event: &BuildEvent) -> Result<(), ListenerError> {
        self.forward(ListenerMethod::TaskFinished, event)
    }

    fn message_logged(&self, event: &BuildEvent) -> Result<(), ListenerError> {
        self.forward(ListenerMethod::MessageLogged, event)
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-time channel setup and listener handshake.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use anttap_channel::{Channel, ChannelError};
use anttap_wire::{CipherError, SecureTransport, SymmetricKey};
use parking_lot::{const_mutex, Mutex};
use thiserror::Error;
use tracing::info;

use crate::dispatcher::{EventDispatcher, HandshakeError, ListenerSet};
use crate::env::{ConnectionDescriptor, DescriptorError};

/// Property under which the orchestrator publishes its listener set
pub const LISTENERS_PROPERTY: &str = "AntListeners";

/// Channel name; also prefixes the worker pool's thread names
pub const CHANNEL_NAME: &str = "anttap";

/// Errors that abort interceptor construction.
///
/// Unset or malformed configuration never gets here; it yields an inert
/// dispatcher instead.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error("failed to read key material from {path:?}: {source}")]
    KeyMaterial {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cipher initialization failed: {0}")]
    Cipher(#[from] CipherError),

    #[error("failed to connect to orchestrator on port {port}: {source}")]
    Connect {
        port: u16,
        #[source]
        source: ChannelError,
    },

    #[error("listener handshake failed: {0}")]
    Handshake(#[from] HandshakeError),

    #[error("a channel is already established for this process")]
    AlreadyConnected,
}

/// Holder for the single channel a process may own.
///
/// Written once by a successful bootstrap, read-only afterwards. Bootstraps
/// against the same slot run one at a time.
pub struct ChannelSlot {
    init: Mutex<()>,
    channel: OnceLock<Arc<Channel>>,
}

impl ChannelSlot {
    pub const fn new() -> Self {
        Self { init: const_mutex(()), channel: OnceLock::new() }
    }

    pub fn get(&self) -> Option<&Arc<Channel>> {
        self.channel.get()
    }

    pub fn is_connected(&self) -> bool {
        self.channel.get().is_some()
    }

    fn install(&self, channel: Arc<Channel>) -> Result<(), BootstrapError> {
        self.channel.set(channel).map_err(|_| BootstrapError::AlreadyConnected)
    }
}

impl Default for ChannelSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Connect to the orchestrator described by `descriptor`, fetch its listeners
/// and return a dispatcher over them.
///
/// The key is read and both cipher directions are initialized before the
/// socket is opened. A slot that already holds a channel is rejected without
/// any I/O. Concurrent calls on one slot are serialized, so at most one of
/// them ever connects.
///
/// Must be called from outside any tokio runtime; from inside one it fails
/// with a [`BootstrapError::Connect`] wrapping `ChannelError::AsyncContext`.
pub fn bootstrap(
    descriptor: &ConnectionDescriptor,
    slot: &ChannelSlot,
) -> Result<EventDispatcher, BootstrapError> {
    let _init = slot.init.lock();
    if slot.is_connected() {
        return Err(BootstrapError::AlreadyConnected);
    }

    let key = SymmetricKey::read(&descriptor.key_path).map_err(|source| {
        BootstrapError::KeyMaterial { path: descriptor.key_path.clone(), source }
    })?;
    let transport = SecureTransport::new(&key)?;

    let channel = Channel::builder(CHANNEL_NAME)
        .connect(descriptor.port, transport)
        .map_err(|source| BootstrapError::Connect { port: descriptor.port, source })?;
    info!(port = descriptor.port, "connected to orchestrator");

    let listeners = ListenerSet::fetch(&channel, LISTENERS_PROPERTY)?;
    info!(listeners = listeners.len(), "retrieved remote listeners");

    let channel = Arc::new(channel);
    slot.install(Arc::clone(&channel))?;
    Ok(EventDispatcher::new(channel, listeners))
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod tests;

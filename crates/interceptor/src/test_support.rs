// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake orchestrator for exercising the interceptor over real sockets.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use std::io::{self, Write};
use std::net::TcpListener;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anttap_channel::{Channel, ChannelBuilder};
use anttap_core::BuildListener;
use anttap_wire::{SecureTransport, SymmetricKey, KEY_LEN};
use parking_lot::Mutex;
use tempfile::NamedTempFile;

use crate::bootstrap::{CHANNEL_NAME, LISTENERS_PROPERTY};
use crate::env::{ConnectionDescriptor, DELIMITER};

/// Write `bytes` to a fresh temp file, for use as key material.
pub fn write_key_file(bytes: &[u8]) -> io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file)
}

/// Orchestrator side of the channel, listening on an ephemeral local port.
///
/// The first accepted connection is served with the configured properties and
/// exports. Later connections are counted and closed.
pub struct FakeOrchestrator {
    port: u16,
    key_file: NamedTempFile,
    connections: Arc<AtomicUsize>,
    channel: Arc<Mutex<Option<Channel>>>,
}

impl FakeOrchestrator {
    /// Publish `listeners` under the listener property with an all-zero key.
    pub fn start(listeners: Vec<Arc<dyn BuildListener>>) -> io::Result<Self> {
        Self::start_with(&[0u8; KEY_LEN], move |builder| {
            builder.export_listeners(LISTENERS_PROPERTY, listeners)
        })
    }

    /// Start with `key` and whatever `configure` publishes on the channel.
    pub fn start_with<F>(key: &[u8], configure: F) -> io::Result<Self>
    where
        F: FnOnce(ChannelBuilder) -> ChannelBuilder + Send + 'static,
    {
        let transport = SecureTransport::new(&SymmetricKey::from_bytes(key.to_vec()))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let key_file = write_key_file(key)?;
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();

        let connections = Arc::new(AtomicUsize::new(0));
        let channel = Arc::new(Mutex::new(None));
        let accepted = Arc::clone(&connections);
        let slot = Arc::clone(&channel);

        std::thread::spawn(move || {
            let mut first = Some((configure, transport));
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                accepted.fetch_add(1, Ordering::SeqCst);
                let Some((configure, transport)) = first.take() else { continue };

                let builder = configure(Channel::builder(format!("{CHANNEL_NAME}-orchestrator")));
                if let Ok(served) = builder.attach(stream, transport) {
                    *slot.lock() = Some(served);
                }
            }
        });

        Ok(Self { port, key_file, connections, channel })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn key_path(&self) -> &Path {
        self.key_file.path()
    }

    pub fn descriptor(&self) -> ConnectionDescriptor {
        ConnectionDescriptor { port: self.port, key_path: self.key_path().to_path_buf() }
    }

    /// Value for the connector variable pointing at this orchestrator.
    pub fn connector_value(&self) -> String {
        format!("{}{}{}", self.port, DELIMITER, self.key_path().display())
    }

    /// Connections accepted so far.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Drop the served channel, closing the socket.
    ///
    /// Waits briefly for the accept thread to finish installing it.
    pub fn disconnect(&self) {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let served = self.channel.lock().take();
            if served.is_some() || Instant::now() >= deadline {
                drop(served);
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }
}

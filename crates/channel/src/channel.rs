// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bidirectional call channel over an encrypted TCP stream.
//!
//! Both ends run the same code. Each side can publish named properties and
//! export listener objects; the peer can look properties up and invoke
//! methods on exported objects. A reader task and a writer task own the
//! socket halves; callers block on a oneshot until their reply arrives.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anttap_core::BuildListener;
use anttap_wire::{
    read_frame, write_frame, Call, Frame, ObjectRef, ProtocolError, Reply, SecureTransport,
};
use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::runtime::{Handle, Runtime};
use tokio::sync::{mpsc, oneshot, Notify};
use tracing::{debug, warn};

use crate::pool::worker_pool;
use crate::RemoteListener;

/// Errors from channel setup and calls
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("channel closed")]
    Closed,

    #[error("blocking channel operation attempted inside an async runtime")]
    AsyncContext,

    #[error("unexpected reply to {call}: {reply}")]
    UnexpectedReply { call: &'static str, reply: String },
}

impl ChannelError {
    pub(crate) fn unexpected(call: &'static str, reply: &Reply) -> Self {
        Self::UnexpectedReply { call, reply: format!("{:?}", reply) }
    }
}

/// Objects this side has exported, keyed by oid.
#[derive(Default)]
struct ExportTable {
    next_oid: u64,
    objects: HashMap<u64, Arc<dyn BuildListener>>,
}

impl ExportTable {
    fn insert(&mut self, listener: Arc<dyn BuildListener>) -> ObjectRef {
        self.next_oid += 1;
        self.objects.insert(self.next_oid, listener);
        ObjectRef { oid: self.next_oid }
    }

    fn get(&self, target: ObjectRef) -> Option<Arc<dyn BuildListener>> {
        self.objects.get(&target.oid).cloned()
    }
}

/// Reply slots for calls in flight.
#[derive(Default)]
struct Pending {
    closed: bool,
    waiters: HashMap<u64, oneshot::Sender<Reply>>,
}

/// State shared by the channel handle, its tasks and remote proxies.
pub(crate) struct Shared {
    name: String,
    outbound: mpsc::UnboundedSender<Frame>,
    next_id: AtomicU64,
    pending: Mutex<Pending>,
    properties: Mutex<HashMap<String, Value>>,
    exports: Mutex<ExportTable>,
    // Stops the writer so the peer sees EOF even while handles are alive
    shutdown: Notify,
}

impl Shared {
    /// Send `call` to the peer and block until it answers.
    ///
    /// Fails with `AsyncContext` when called from any tokio runtime context,
    /// where blocking on the reply would panic.
    pub(crate) fn call(&self, call: Call) -> Result<Reply, ChannelError> {
        reject_async_context()?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock();
            if pending.closed {
                return Err(ChannelError::Closed);
            }
            pending.waiters.insert(id, tx);
        }

        if self.outbound.send(Frame::Request { id, call }).is_err() {
            self.pending.lock().waiters.remove(&id);
            return Err(ChannelError::Closed);
        }

        rx.blocking_recv().map_err(|_| ChannelError::Closed)
    }

    fn send(&self, frame: Frame) {
        if self.outbound.send(frame).is_err() {
            debug!(channel = %self.name, "writer gone, dropping frame");
        }
    }

    fn complete(&self, id: u64, reply: Reply) {
        let waiter = self.pending.lock().waiters.remove(&id);
        match waiter {
            // Receiver may have been dropped; nothing left to notify
            Some(tx) => {
                let _ = tx.send(reply);
            }
            None => warn!(channel = %self.name, id, "reply for unknown call"),
        }
    }

    /// Mark the channel closed and release every blocked caller.
    fn close(&self) {
        let waiters = {
            let mut pending = self.pending.lock();
            pending.closed = true;
            std::mem::take(&mut pending.waiters)
        };
        self.shutdown.notify_one();
        if !waiters.is_empty() {
            debug!(channel = %self.name, count = waiters.len(), "failing calls in flight");
        }
    }

    fn is_closed(&self) -> bool {
        self.pending.lock().closed
    }

    /// Answer an inbound call.
    fn serve(&self, call: Call) -> Reply {
        match call {
            Call::GetProperty { name } => {
                Reply::Property { value: self.properties.lock().get(&name).cloned() }
            }
            Call::Invoke { target, method, event } => {
                let listener = self.exports.lock().get(target);
                let Some(listener) = listener else {
                    return Reply::Failed {
                        message: format!("no exported object with oid {}", target.oid),
                    };
                };
                match method.invoke(listener.as_ref(), &event) {
                    Ok(()) => Reply::Done,
                    Err(e) => {
                        debug!(channel = %self.name, %method, error = %e, "exported listener failed");
                        Reply::Failed { message: e.to_string() }
                    }
                }
            }
        }
    }
}

/// Configures what this side publishes before any traffic flows.
pub struct ChannelBuilder {
    name: String,
    properties: HashMap<String, Value>,
    exports: ExportTable,
}

impl ChannelBuilder {
    pub fn property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Export `listeners` and publish their references, in order, under
    /// `property`.
    pub fn export_listeners(
        mut self,
        property: impl Into<String>,
        listeners: Vec<Arc<dyn BuildListener>>,
    ) -> Self {
        let refs = listeners.into_iter().map(|l| self.exports.insert(l)).collect();
        self.property(property, refs_value(refs))
    }

    /// Connect to `127.0.0.1:<port>` as the initiating side.
    ///
    /// Blocks until connected, so it fails with `AsyncContext` inside a runtime.
    pub fn connect(self, port: u16, transport: SecureTransport) -> Result<Channel, ChannelError> {
        reject_async_context()?;
        let runtime = worker_pool(&self.name)?;
        let stream = runtime.block_on(TcpStream::connect((Ipv4Addr::LOCALHOST, port)))?;
        debug!(channel = %self.name, port, "connected");
        Ok(self.start(runtime, stream, transport))
    }

    /// Run the channel over an already-accepted socket.
    pub fn attach(
        self,
        stream: std::net::TcpStream,
        transport: SecureTransport,
    ) -> Result<Channel, ChannelError> {
        let runtime = worker_pool(&self.name)?;
        stream.set_nonblocking(true)?;
        let stream = {
            let _guard = runtime.enter();
            TcpStream::from_std(stream)?
        };
        Ok(self.start(runtime, stream, transport))
    }

    fn start(self, runtime: Runtime, stream: TcpStream, transport: SecureTransport) -> Channel {
        let (read_half, write_half) = stream.into_split();
        let (reader, writer) = transport.wrap(read_half, write_half);
        let (outbound, outbound_rx) = mpsc::unbounded_channel();

        let shared = Arc::new(Shared {
            name: self.name,
            outbound,
            next_id: AtomicU64::new(1),
            pending: Mutex::new(Pending::default()),
            properties: Mutex::new(self.properties),
            exports: Mutex::new(self.exports),
            shutdown: Notify::new(),
        });

        runtime.spawn(write_loop(BufWriter::new(writer), outbound_rx, Arc::clone(&shared)));
        runtime.spawn(read_loop(BufReader::new(reader), Arc::clone(&shared)));

        Channel { shared, runtime: Some(runtime) }
    }
}

fn reject_async_context() -> Result<(), ChannelError> {
    match Handle::try_current() {
        Ok(_) => Err(ChannelError::AsyncContext),
        Err(_) => Ok(()),
    }
}

fn refs_value(refs: Vec<ObjectRef>) -> Value {
    Value::Array(refs.into_iter().map(|r| serde_json::json!({ "oid": r.oid })).collect())
}

/// An established channel. Dropping it closes the socket and stops the pool.
pub struct Channel {
    shared: Arc<Shared>,
    runtime: Option<Runtime>,
}

impl Channel {
    pub fn builder(name: impl Into<String>) -> ChannelBuilder {
        ChannelBuilder {
            name: name.into(),
            properties: HashMap::new(),
            exports: ExportTable::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// True once either direction of the stream has failed or the peer hung up.
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Publish `value` under `name` for the peer to look up.
    pub fn set_property(&self, name: impl Into<String>, value: Value) {
        self.shared.properties.lock().insert(name.into(), value);
    }

    /// Export a listener so the peer can invoke it through the returned reference.
    pub fn export(&self, listener: Arc<dyn BuildListener>) -> ObjectRef {
        self.shared.exports.lock().insert(listener)
    }

    /// Look up what the peer published under `name`. Blocks for the round trip.
    pub fn remote_property(&self, name: &str) -> Result<Option<Value>, ChannelError> {
        match self.shared.call(Call::GetProperty { name: name.to_string() })? {
            Reply::Property { value } => Ok(value),
            other => Err(ChannelError::unexpected("get_property", &other)),
        }
    }

    /// Proxy for an object the peer exported.
    pub fn remote_listener(&self, target: ObjectRef) -> RemoteListener {
        RemoteListener::new(target, Arc::clone(&self.shared))
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.shared.close();
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

async fn read_loop<R>(mut reader: R, shared: Arc<Shared>)
where
    R: AsyncRead + Unpin,
{
    loop {
        match read_frame(&mut reader).await {
            Ok(Frame::Request { id, call }) => {
                let shared = Arc::clone(&shared);
                tokio::task::spawn_blocking(move || {
                    let reply = shared.serve(call);
                    shared.send(Frame::Response { id, reply });
                });
            }
            Ok(Frame::Response { id, reply }) => shared.complete(id, reply),
            Err(ProtocolError::ConnectionClosed) => {
                debug!(channel = %shared.name, "peer closed channel");
                break;
            }
            Err(e) => {
                warn!(channel = %shared.name, error = %e, "channel read failed");
                break;
            }
        }
    }
    shared.close();
}

async fn write_loop<W>(mut writer: W, mut outbound: mpsc::UnboundedReceiver<Frame>, shared: Arc<Shared>)
where
    W: AsyncWrite + Unpin,
{
    loop {
        let frame = tokio::select! {
            frame = outbound.recv() => frame,
            _ = shared.shutdown.notified() => None,
        };
        let Some(frame) = frame else { break };
        if let Err(e) = write_frame(&mut writer, &frame).await {
            warn!(channel = %shared.name, error = %e, "channel write failed");
            break;
        }
    }
    shared.close();
    // Shuts down our half of the socket so the peer sees EOF
    drop(writer);
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;

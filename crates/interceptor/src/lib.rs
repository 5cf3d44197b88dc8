// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! anttap-interceptor: the build-side listener that relays lifecycle events
//! to an orchestrator over an encrypted local channel.

mod bootstrap;
mod dispatcher;
pub mod env;
mod register;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use bootstrap::{bootstrap, BootstrapError, ChannelSlot, CHANNEL_NAME, LISTENERS_PROPERTY};
pub use dispatcher::{EventDispatcher, HandshakeError, ListenerSet};
pub use env::{ConnectionDescriptor, DescriptorError, CONNECTOR_VAR};
pub use register::{connect, process_channel, register, EventSource};

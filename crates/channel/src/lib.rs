// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! anttap-channel: encrypted call channel with remote properties and remote
//! listener invocation.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod channel;
mod pool;
mod remote;

pub use channel::{Channel, ChannelBuilder, ChannelError};
pub use remote::RemoteListener;

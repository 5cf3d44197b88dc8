// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! anttap-core: build lifecycle events and the listener contract shared by
//! the build host, the interceptor and the orchestrator.

pub mod clock;
pub mod event;
pub mod listener;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use event::BuildEvent;
pub use listener::{BuildListener, ListenerError, ListenerMethod};

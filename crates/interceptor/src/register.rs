// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry point for build hosts.
//!
//! The host calls [`register`] once at startup with its event source and gets
//! back the dispatcher it now feeds.

use std::sync::Arc;

use anttap_channel::Channel;
use anttap_core::BuildListener;

use crate::bootstrap::{bootstrap, BootstrapError, ChannelSlot};
use crate::dispatcher::EventDispatcher;
use crate::env;

/// Anything that emits build events to registered listeners.
pub trait EventSource {
    fn add_listener(&mut self, listener: Arc<dyn BuildListener>);
}

impl EventSource for Vec<Arc<dyn BuildListener>> {
    fn add_listener(&mut self, listener: Arc<dyn BuildListener>) {
        self.push(listener);
    }
}

static PROCESS_CHANNEL: ChannelSlot = ChannelSlot::new();

/// Build a dispatcher from the environment, using `slot` for the channel.
///
/// Unconfigured reporting gives an inert dispatcher and opens no connection.
pub fn connect(slot: &ChannelSlot) -> Result<EventDispatcher, BootstrapError> {
    match env::connector()? {
        Some(descriptor) => bootstrap(&descriptor, slot),
        None => Ok(EventDispatcher::inert()),
    }
}

/// Connect using the process-wide channel slot and attach the dispatcher to
/// `source`.
pub fn register<S>(source: &mut S) -> Result<Arc<EventDispatcher>, BootstrapError>
where
    S: EventSource + ?Sized,
{
    let dispatcher = Arc::new(connect(&PROCESS_CHANNEL)?);
    source.add_listener(dispatcher.clone());
    Ok(dispatcher)
}

/// The channel established by [`register`], if any.
pub fn process_channel() -> Option<&'static Arc<Channel>> {
    PROCESS_CHANNEL.get()
}

#[cfg(test)]
#[path = "register_tests.rs"]
mod tests;

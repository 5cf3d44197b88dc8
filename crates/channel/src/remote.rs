// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local proxy for a listener exported by the peer.

use std::fmt;
use std::sync::Arc;

use anttap_core::{BuildEvent, BuildListener, ListenerError, ListenerMethod};
use anttap_wire::{Call, ObjectRef, Reply};

use crate::channel::{ChannelError, Shared};

/// Each method is a blocking round trip to the peer: the call returns once
/// the remote listener has handled the event, or with its error.
pub struct RemoteListener {
    target: ObjectRef,
    shared: Arc<Shared>,
}

impl RemoteListener {
    pub(crate) fn new(target: ObjectRef, shared: Arc<Shared>) -> Self {
        Self { target, shared }
    }

    fn invoke(&self, method: ListenerMethod, event: &BuildEvent) -> Result<(), ListenerError> {
        let call = Call::Invoke { target: self.target, method, event: event.clone() };
        match self.shared.call(call) {
            Ok(Reply::Done) => Ok(()),
            Ok(Reply::Failed { message }) => Err(ListenerError::Remote(message)),
            Ok(other) => Err(ListenerError::transport(ChannelError::unexpected("invoke", &other))),
            Err(e) => Err(ListenerError::transport(e)),
        }
    }
}

impl fmt::Debug for RemoteListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteListener").field("oid", &self.target.oid).finish()
    }
}

impl BuildListener for RemoteListener {
    fn build_started(&self, event: &BuildEvent) -> Result<(), ListenerError> {
        self.invoke(ListenerMethod::BuildStarted, event)
    }

    fn build_finished(&self, event: &BuildEvent) -> Result<(), ListenerError> {
        self.invoke(ListenerMethod::BuildFinished, event)
    }

    fn target_started(&self, event: &BuildEvent) -> Result<(), ListenerError> {
        self.invoke(ListenerMethod::TargetStarted, event)
    }

    fn target_finished(&self, event: &BuildEvent) -> Result<(), ListenerError> {
        self.invoke(ListenerMethod::TargetFinished, event)
    }

    fn task_started(&self, event: &BuildEvent) -> Result<(), ListenerError> {
        self.invoke(ListenerMethod::TaskStarted, event)
    }

    fn task_finished(&self, event: &BuildEvent) -> Result<(), ListenerError> {
        self.invoke(ListenerMethod::TaskFinished, event)
    }

    fn message_logged(&self, event: &BuildEvent) -> Result<(), ListenerError> {
        self.invoke(ListenerMethod::MessageLogged, event)
    }
}

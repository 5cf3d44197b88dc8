// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the interceptor.

use std::env::VarError;
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

/// Variable the orchestrator sets to enable remote reporting
pub const CONNECTOR_VAR: &str = "JENKINS_ANT_CONNECTOR";

/// Token separator inside [`CONNECTOR_VAR`]
pub const DELIMITER: char = '|';

/// Errors from parsing a connector descriptor
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("expected at least 2 '|'-separated tokens, found {found}")]
    TooFewTokens { found: usize },

    #[error("invalid port {token:?}: {source}")]
    InvalidPort {
        token: String,
        #[source]
        source: ParseIntError,
    },
}

/// Where the orchestrator listens and where the shared key lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pub port: u16,
    pub key_path: PathBuf,
}

impl ConnectionDescriptor {
    /// Parse `<port>|<key-file-path>[|...]`. Tokens after the second are
    /// reserved and ignored.
    pub fn parse(raw: &str) -> Result<Self, DescriptorError> {
        let tokens: Vec<&str> = raw.split(DELIMITER).collect();
        let [port, key_path, ..] = tokens.as_slice() else {
            return Err(DescriptorError::TooFewTokens { found: tokens.len() });
        };

        let port = port
            .parse::<u16>()
            .map_err(|source| DescriptorError::InvalidPort { token: port.to_string(), source })?;

        Ok(Self { port, key_path: PathBuf::from(*key_path) })
    }
}

/// Resolve the connector descriptor from the environment.
///
/// Returns `Ok(None)` when remote reporting is not configured: the variable is
/// unset, not valid unicode, or has too few tokens. Each case logs one warning.
/// A descriptor whose port does not parse is returned as an error.
pub fn connector() -> Result<Option<ConnectionDescriptor>, DescriptorError> {
    let raw = match std::env::var(CONNECTOR_VAR) {
        Ok(raw) => raw,
        Err(VarError::NotPresent) => {
            warn!("{} is not set, build events will not be reported", CONNECTOR_VAR);
            return Ok(None);
        }
        Err(VarError::NotUnicode(_)) => {
            warn!("Ignoring {} because it is not valid unicode", CONNECTOR_VAR);
            return Ok(None);
        }
    };

    match ConnectionDescriptor::parse(&raw) {
        Ok(descriptor) => Ok(Some(descriptor)),
        Err(e @ DescriptorError::TooFewTokens { .. }) => {
            warn!("Ignoring malformed {}: {}", CONNECTOR_VAR, e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Channel wire layer: stream encryption and message framing.
//!
//! Byte stream: AES-128/CFB8 in both directions.
//! Inside it: 4-byte length prefix (big-endian) + JSON `Frame`.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod cipher;
mod frame;
mod wire;

pub use cipher::{
    CipherError, DecryptingReader, Decryptor, EncryptingWriter, Encryptor, SecureTransport,
    SymmetricKey, KEY_LEN,
};
pub use frame::{Call, Frame, ObjectRef, Reply};
pub use wire::{
    decode, encode, read_frame, read_message, write_frame, write_message, ProtocolError,
    MAX_MESSAGE_LEN,
};

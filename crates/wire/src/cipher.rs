// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Symmetric stream encryption for the channel's byte streams.
//!
//! AES-128 in CFB-8 mode without padding: every plaintext byte maps to exactly
//! one ciphertext byte, so a frame is visible to the peer as soon as it is
//! flushed instead of waiting for a full cipher block.
//!
//! The raw key bytes double as the IV, in both directions. Key/IV reuse is a
//! known weakness. The peer derives its ciphers the same way and the key is
//! generated fresh for every build, so the scheme is kept for wire
//! compatibility.

use std::fmt;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use aes::Aes128;
use cfb8::cipher::generic_array::GenericArray;
use cfb8::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Key length accepted by the cipher. The key is also the IV, so it must match
/// the AES block size as well.
pub const KEY_LEN: usize = 16;

/// Errors from cipher initialization
#[derive(Debug, Error)]
pub enum CipherError {
    #[error("invalid key length: {len} bytes (AES/CFB8 needs exactly {expected})")]
    InvalidKeyLength { len: usize, expected: usize },
}

/// Raw key material, used verbatim.
///
/// No length check happens here; an unusable key is rejected when a cipher is
/// built from it.
#[derive(Clone, PartialEq, Eq)]
pub struct SymmetricKey {
    bytes: Vec<u8>,
}

impl SymmetricKey {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: bytes.into() }
    }

    /// Read the whole file at `path` as key material.
    pub fn read(path: &Path) -> io::Result<Self> {
        Ok(Self::from_bytes(std::fs::read(path)?))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn invalid(&self) -> CipherError {
        CipherError::InvalidKeyLength { len: self.bytes.len(), expected: KEY_LEN }
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymmetricKey({} bytes)", self.bytes.len())
    }
}

/// Encrypting half of the stream cipher. Keeps feedback state across calls.
pub struct Encryptor(cfb8::Encryptor<Aes128>);

impl Encryptor {
    pub fn new(key: &SymmetricKey) -> Result<Self, CipherError> {
        cfb8::Encryptor::<Aes128>::new_from_slices(&key.bytes, &key.bytes)
            .map(Self)
            .map_err(|_| key.invalid())
    }

    /// Encrypt `buf` in place.
    pub fn apply(&mut self, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            self.0.encrypt_block_mut(GenericArray::from_mut_slice(std::slice::from_mut(byte)));
        }
    }
}

/// Decrypting half of the stream cipher. Keeps feedback state across calls.
pub struct Decryptor(cfb8::Decryptor<Aes128>);

impl Decryptor {
    pub fn new(key: &SymmetricKey) -> Result<Self, CipherError> {
        cfb8::Decryptor::<Aes128>::new_from_slices(&key.bytes, &key.bytes)
            .map(Self)
            .map_err(|_| key.invalid())
    }

    /// Decrypt `buf` in place.
    pub fn apply(&mut self, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            self.0.decrypt_block_mut(GenericArray::from_mut_slice(std::slice::from_mut(byte)));
        }
    }
}

/// Both cipher directions, validated before any stream exists.
pub struct SecureTransport {
    encryptor: Encryptor,
    decryptor: Decryptor,
}

impl SecureTransport {
    pub fn new(key: &SymmetricKey) -> Result<Self, CipherError> {
        Ok(Self { encryptor: Encryptor::new(key)?, decryptor: Decryptor::new(key)? })
    }

    /// Wrap the raw halves of a duplex stream.
    pub fn wrap<R, W>(self, reader: R, writer: W) -> (DecryptingReader<R>, EncryptingWriter<W>) {
        (
            DecryptingReader::new(reader, self.decryptor),
            EncryptingWriter::new(writer, self.encryptor),
        )
    }
}

/// `AsyncRead` adapter that decrypts everything read from `inner`.
pub struct DecryptingReader<R> {
    inner: R,
    cipher: Decryptor,
}

impl<R> DecryptingReader<R> {
    pub fn new(inner: R, cipher: Decryptor) -> Self {
        Self { inner, cipher }
    }

    pub fn with_key(key: &SymmetricKey, inner: R) -> Result<Self, CipherError> {
        Ok(Self::new(inner, Decryptor::new(key)?))
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for DecryptingReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let start = buf.filled().len();
        ready!(Pin::new(&mut this.inner).poll_read(cx, buf))?;
        this.cipher.apply(&mut buf.filled_mut()[start..]);
        Poll::Ready(Ok(()))
    }
}

/// `AsyncWrite` adapter that encrypts everything written to `inner`.
///
/// Accepted bytes are encrypted immediately; ciphertext the inner writer has
/// not taken yet is held in `pending` and drained before the next write and on
/// every flush, so after a flush the inner writer has seen exactly as many
/// bytes as were written.
pub struct EncryptingWriter<W> {
    inner: W,
    cipher: Encryptor,
    pending: Vec<u8>,
    drained: usize,
}

impl<W> EncryptingWriter<W> {
    pub fn new(inner: W, cipher: Encryptor) -> Self {
        Self { inner, cipher, pending: Vec::new(), drained: 0 }
    }

    pub fn with_key(key: &SymmetricKey, inner: W) -> Result<Self, CipherError> {
        Ok(Self::new(inner, Encryptor::new(key)?))
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: AsyncWrite + Unpin> EncryptingWriter<W> {
    fn poll_drain(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        while self.drained < self.pending.len() {
            let n =
                ready!(Pin::new(&mut self.inner).poll_write(cx, &self.pending[self.drained..]))?;
            if n == 0 {
                return Poll::Ready(Err(io::ErrorKind::WriteZero.into()));
            }
            self.drained += n;
        }
        self.pending.clear();
        self.drained = 0;
        Poll::Ready(Ok(()))
    }
}

impl<W: AsyncWrite + Unpin> AsyncWrite for EncryptingWriter<W> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        ready!(this.poll_drain(cx))?;
        this.pending.extend_from_slice(buf);
        this.cipher.apply(&mut this.pending);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        ready!(this.poll_drain(cx))?;
        Pin::new(&mut this.inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        ready!(this.poll_drain(cx))?;
        Pin::new(&mut this.inner).poll_shutdown(cx)
    }
}

#[cfg(test)]
#[path = "cipher_tests.rs"]
mod tests;

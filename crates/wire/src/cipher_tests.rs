// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write as _;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn zero_key() -> SymmetricKey {
    SymmetricKey::from_bytes(vec![0u8; KEY_LEN])
}

fn counting_key() -> SymmetricKey {
    SymmetricKey::from_bytes((0..KEY_LEN as u8).collect::<Vec<u8>>())
}

#[yare::parameterized(
    empty      = { 0 },
    one_short  = { 15 },
    one_long   = { 17 },
    aes_192    = { 24 },
    aes_256    = { 32 },
)]
fn wrong_key_length_fails_at_construction(len: usize) {
    let key = SymmetricKey::from_bytes(vec![7u8; len]);

    let err = SecureTransport::new(&key).err().unwrap();
    assert!(matches!(err, CipherError::InvalidKeyLength { len: l, expected: KEY_LEN } if l == len));
    assert!(Encryptor::new(&key).is_err());
    assert!(Decryptor::new(&key).is_err());
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// Reference values from `openssl enc -aes-128-cfb8` with the key as IV
#[yare::parameterized(
    zero_key     = { super::zero_key(), b"BUILD STARTED: core", "24f85f64b5bc1902b9027dd91f5b66770362d0" },
    counting_key = { super::counting_key(), b"hello",               "62bfe8a32e" },
)]
fn ciphertext_matches_reference_vectors(key: SymmetricKey, plain: &[u8], expected: &str) {
    let mut buf = plain.to_vec();
    Encryptor::new(&key).unwrap().apply(&mut buf);
    assert_eq!(hex(&buf), expected);

    let mut enc = Encryptor::new(&key).unwrap();
    let mut chunked = plain.to_vec();
    for byte in chunked.chunks_mut(3) {
        enc.apply(byte);
    }
    assert_eq!(hex(&chunked), expected);

    Decryptor::new(&key).unwrap().apply(&mut buf);
    assert_eq!(buf, plain);
}

#[tokio::test]
async fn writer_emits_reference_ciphertext() {
    let mut writer = EncryptingWriter::with_key(&zero_key(), Vec::new()).unwrap();
    writer.write_all(b"BUILD ").await.unwrap();
    writer.write_all(b"STARTED: core").await.unwrap();
    writer.flush().await.unwrap();

    assert_eq!(hex(&writer.into_inner()), "24f85f64b5bc1902b9027dd91f5b66770362d0");
}

#[test]
fn sixteen_byte_key_is_accepted() {
    assert!(SecureTransport::new(&zero_key()).is_ok());
}

#[test]
fn ciphertext_has_plaintext_length_and_differs() {
    let plain = b"BUILD STARTED: core".to_vec();
    let mut buf = plain.clone();
    Encryptor::new(&zero_key()).unwrap().apply(&mut buf);

    assert_eq!(buf.len(), plain.len());
    assert_ne!(buf, plain);
}

#[test]
fn chunked_encryption_matches_one_shot() {
    let plain: Vec<u8> = (0..200u16).map(|i| (i * 7 % 251) as u8).collect();

    let mut whole = plain.clone();
    Encryptor::new(&counting_key()).unwrap().apply(&mut whole);

    let mut chunked = plain.clone();
    let mut enc = Encryptor::new(&counting_key()).unwrap();
    for chunk in chunked.chunks_mut(13) {
        enc.apply(chunk);
    }

    assert_eq!(whole, chunked);
}

#[test]
fn decrypting_with_another_key_does_not_recover_plaintext() {
    let plain = b"secret listener traffic".to_vec();
    let mut buf = plain.clone();
    Encryptor::new(&zero_key()).unwrap().apply(&mut buf);
    Decryptor::new(&counting_key()).unwrap().apply(&mut buf);
    assert_ne!(buf, plain);
}

#[test]
fn key_is_read_verbatim_and_debug_hides_bytes() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[0xAB; 5]).unwrap();

    let key = SymmetricKey::read(file.path()).unwrap();
    assert_eq!(key.len(), 5);
    assert_eq!(format!("{:?}", key), "SymmetricKey(5 bytes)");
    assert!(SecureTransport::new(&key).is_err());
}

#[test]
fn missing_key_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SymmetricKey::read(&dir.path().join("absent.key")).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
}

#[tokio::test]
async fn writer_output_length_tracks_input_at_every_flush() {
    let mut writer = EncryptingWriter::with_key(&zero_key(), Vec::new()).unwrap();
    let chunks: [&[u8]; 4] = [b"a", b"bc", b"defghijklmnopqrstuvwxyz", b"0123"];

    let mut total = 0;
    for chunk in chunks {
        writer.write_all(chunk).await.unwrap();
        writer.flush().await.unwrap();
        total += chunk.len();
        assert_eq!(writer.get_ref().len(), total);
    }
}

#[tokio::test]
async fn stream_roundtrip_through_wrappers() {
    let plain: Vec<u8> = (0..1000u32).map(|i| (i % 256) as u8).collect();

    let mut writer = EncryptingWriter::with_key(&counting_key(), Vec::new()).unwrap();
    for chunk in plain.chunks(37) {
        writer.write_all(chunk).await.unwrap();
    }
    writer.shutdown().await.unwrap();
    let ciphertext = writer.into_inner();
    assert_eq!(ciphertext.len(), plain.len());

    let mut reader = DecryptingReader::with_key(&counting_key(), ciphertext.as_slice()).unwrap();
    let mut decrypted = Vec::new();
    reader.read_to_end(&mut decrypted).await.unwrap();

    assert_eq!(decrypted, plain);
}

#[tokio::test]
async fn transport_pair_talks_over_duplex() {
    let (client, server) = tokio::io::duplex(64);
    let (client_read, client_write) = tokio::io::split(client);
    let (server_read, server_write) = tokio::io::split(server);

    let (_, mut tx) = SecureTransport::new(&zero_key()).unwrap().wrap(client_read, client_write);
    let (mut rx, _) = SecureTransport::new(&zero_key()).unwrap().wrap(server_read, server_write);

    tx.write_all(b"hello orchestrator").await.unwrap();
    tx.flush().await.unwrap();

    let mut buf = [0u8; 18];
    rx.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"hello orchestrator");
}

#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! SHA-1 content hashing for modsync
//!
//! Module manifests publish a 160-bit SHA-1 digest per file. This crate wraps
//! that digest in a [`Hash`] value and provides streaming helpers used by the
//! verifier (hash an on-disk file) and the downloader (hash while writing).
//! SHA-1 is used here for corruption detection only.

use modsync_errors::{Error, ManifestError};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Size of chunks for streaming hash computation
const CHUNK_SIZE: usize = 64 * 1024;

/// Digest length in bytes
pub const HASH_LEN: usize = 20;

/// A SHA-1 hash value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash {
    bytes: [u8; HASH_LEN],
}

impl Hash {
    /// Create a hash from raw bytes
    #[must_use]
    pub fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.bytes
    }

    /// Lowercase hex encoding, as written in manifests
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parse from hex string (either case)
    ///
    /// # Errors
    /// Returns an error if the input is not valid hexadecimal or is not exactly 40 characters.
    pub fn from_hex(s: &str) -> Result<Self, Error> {
        let invalid = || ManifestError::InvalidHash {
            path: String::new(),
            value: s.to_string(),
        };

        let bytes = hex::decode(s.trim()).map_err(|_| invalid())?;
        let bytes: [u8; HASH_LEN] = bytes.try_into().map_err(|_| invalid())?;
        Ok(Self::from_bytes(bytes))
    }

    /// Compute hash of a byte slice
    #[must_use]
    pub fn from_data(data: &[u8]) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(data);
        hasher.finalize()
    }

    /// Compute hash and length of a file
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or read.
    pub async fn hash_file(path: &Path) -> Result<(Self, u64), Error> {
        let file = File::open(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;
        Self::hash_and_copy(file, tokio::io::sink()).await
    }

    /// Compute hash while copying data to a writer
    ///
    /// # Errors
    /// Returns an error if reading from the reader or writing to the writer fails.
    pub async fn hash_and_copy<R, W>(mut reader: R, mut writer: W) -> Result<(Self, u64), Error>
    where
        R: AsyncReadExt + Unpin,
        W: AsyncWriteExt + Unpin,
    {
        let mut hasher = Hasher::new();
        let mut buffer = vec![0; CHUNK_SIZE];

        loop {
            let n = reader.read(&mut buffer).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
            writer.write_all(&buffer[..n]).await?;
        }

        writer.flush().await?;
        let total = hasher.bytes_hashed();
        Ok((hasher.finalize(), total))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for Hash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Incremental hasher for data arriving in chunks
#[derive(Clone, Default)]
pub struct Hasher {
    inner: Sha1,
    len: u64,
}

impl Hasher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.inner.update(chunk);
        self.len += chunk.len() as u64;
    }

    /// Number of bytes fed so far
    #[must_use]
    pub fn bytes_hashed(&self) -> u64 {
        self.len
    }

    #[must_use]
    pub fn finalize(self) -> Hash {
        Hash::from_bytes(self.inner.finalize().into())
    }
}

impl fmt::Debug for Hasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hasher").field("len", &self.len).finish()
    }
}

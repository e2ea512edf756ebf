//! # Key Material
//!
//! Account key pairs. The private half zeroizes on drop and never prints.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::errors::SignerError;

/// A private key that zeroizes on drop.
///
/// Serialized as lowercase hex, which is the pool file format.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    inner: Vec<u8>,
}

impl PrivateKey {
    /// Wrap raw scalar bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { inner: bytes }
    }

    /// Parse from hex (an optional `0x` prefix is accepted).
    pub fn from_hex(s: &str) -> Result<Self, SignerError> {
        decode_hex(s).map(Self::new)
    }

    /// Raw scalar bytes (use carefully!).
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }

    /// Hex encoding, as written to the pool file.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.inner)
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey(***)")
    }
}

impl Serialize for PrivateKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PrivateKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Asymmetric key pair owned by exactly one account.
///
/// `public` is the hex of the uncompressed curve point without the SEC1
/// `04` prefix (x || y).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    /// Public key hex.
    pub public: String,
    /// Private key.
    pub private: PrivateKey,
}

impl KeyPair {
    /// Create a key pair from its parts.
    pub fn new(public: impl Into<String>, private: PrivateKey) -> Self {
        Self {
            public: public.into(),
            private,
        }
    }

    /// Decoded public key bytes.
    pub fn public_key_bytes(&self) -> Result<Vec<u8>, SignerError> {
        decode_hex(&self.public)
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>, SignerError> {
    let trimmed = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(trimmed).map_err(|e| SignerError::InvalidEncoding(e.to_string()))
}

//! # ECDSA P-256 Signer
//!
//! Default `MessageSigner` and `KeyGenerator`.
//!
//! Messages are hashed with SHA3-256 and the digest is signed as a prehash,
//! which is the ledger's `ECDSA_P256` + `SHA3_256` key scheme. Signatures are
//! the 64-byte `r || s` encoding.

use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use sha3::{Digest, Sha3_256};

use crate::domain::{KeyPair, PrivateKey, SignerError};
use crate::ports::outbound::{KeyGenerator, MessageSigner};

/// Scalar length in bytes.
const SCALAR_LEN: usize = 32;

/// ECDSA over NIST P-256 with SHA3-256 message hashing.
#[derive(Clone, Copy, Debug, Default)]
pub struct P256Signer;

impl P256Signer {
    /// Create a signer.
    pub fn new() -> Self {
        Self
    }

    /// Verify `signature` (r || s) over `message` against a public key in
    /// pool format (hex of x || y).
    pub fn verify(
        public_key_hex: &str,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), SignerError> {
        let raw = hex::decode(public_key_hex.trim_start_matches("0x"))
            .map_err(|e| SignerError::InvalidEncoding(e.to_string()))?;

        let mut sec1 = Vec::with_capacity(raw.len() + 1);
        sec1.push(0x04);
        sec1.extend_from_slice(&raw);

        let verifying_key =
            VerifyingKey::from_sec1_bytes(&sec1).map_err(|_| SignerError::InvalidPublicKey)?;
        let sig = Signature::from_slice(signature)
            .map_err(|e| SignerError::SigningFailed(e.to_string()))?;

        verifying_key
            .verify_prehash(&Sha3_256::digest(message), &sig)
            .map_err(|e| SignerError::SigningFailed(e.to_string()))
    }

    fn signing_key(key: &PrivateKey) -> Result<SigningKey, SignerError> {
        let bytes = key.as_bytes();
        if bytes.is_empty() || bytes.len() > SCALAR_LEN {
            return Err(SignerError::InvalidPrivateKey);
        }

        // Hex round-trips may drop leading zero bytes.
        let mut scalar = [0u8; SCALAR_LEN];
        scalar[SCALAR_LEN - bytes.len()..].copy_from_slice(bytes);
        let result = SigningKey::from_slice(&scalar).map_err(|_| SignerError::InvalidPrivateKey);
        zeroize::Zeroize::zeroize(&mut scalar);
        result
    }

    fn public_key_hex(signing_key: &SigningKey) -> String {
        let point = signing_key.verifying_key().as_affine().to_encoded_point(false);
        // Drop the SEC1 0x04 tag.
        hex::encode(&point.as_bytes()[1..])
    }
}

impl MessageSigner for P256Signer {
    fn sign(&self, key: &PrivateKey, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        let signing_key = Self::signing_key(key)?;
        let digest = Sha3_256::digest(message);
        let signature: Signature = signing_key
            .sign_prehash(&digest)
            .map_err(|e| SignerError::SigningFailed(e.to_string()))?;
        Ok(signature.to_bytes().to_vec())
    }
}

impl KeyGenerator for P256Signer {
    fn generate(&self) -> Result<KeyPair, SignerError> {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let public = Self::public_key_hex(&signing_key);
        let private = PrivateKey::new(signing_key.to_bytes().to_vec());
        Ok(KeyPair::new(public, private))
    }
}

//! # RLP Public-Key Encoder
//!
//! Default `PublicKeyEncoder`: `rlp([public_key, sign_algo, hash_algo, weight])`,
//! the layout `addPublicKey` decodes.

use crate::domain::{HashAlgorithm, SignatureAlgorithm};
use crate::ports::outbound::PublicKeyEncoder;

/// RLP account-key encoder.
#[derive(Clone, Copy, Debug, Default)]
pub struct RlpKeyEncoder;

impl RlpKeyEncoder {
    /// Create an encoder.
    pub fn new() -> Self {
        Self
    }
}

impl PublicKeyEncoder for RlpKeyEncoder {
    fn encode(
        &self,
        public_key: &[u8],
        sign_algo: SignatureAlgorithm,
        hash_algo: HashAlgorithm,
        weight: u32,
    ) -> Vec<u8> {
        let mut stream = rlp::RlpStream::new_list(4);
        stream.append(&public_key.to_vec());
        stream.append(&sign_algo.id());
        stream.append(&hash_algo.id());
        stream.append(&weight);
        stream.out().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FULL_KEY_WEIGHT;

    #[test]
    fn test_encode_account_key_layout() {
        let public_key = [0xABu8; 64];
        let encoded = RlpKeyEncoder::new().encode(
            &public_key,
            SignatureAlgorithm::EcdsaP256,
            HashAlgorithm::Sha3_256,
            FULL_KEY_WEIGHT,
        );

        // list(71) = [bytes(64), 0x02, 0x03, 0x03e8]
        assert_eq!(&encoded[..2], &[0xf8, 0x47]);
        assert_eq!(&encoded[2..4], &[0xb8, 0x40]);
        assert_eq!(&encoded[4..68], &public_key[..]);
        assert_eq!(&encoded[68..], &[0x02, 0x03, 0x82, 0x03, 0xe8]);
    }

    #[test]
    fn test_encode_decodes_back() {
        let encoded = RlpKeyEncoder::new().encode(
            &[1, 2, 3],
            SignatureAlgorithm::EcdsaSecp256k1,
            HashAlgorithm::Sha2_256,
            500,
        );

        let rlp = rlp::Rlp::new(&encoded);
        assert_eq!(rlp.item_count().unwrap(), 4);
        assert_eq!(rlp.val_at::<Vec<u8>>(0).unwrap(), vec![1, 2, 3]);
        assert_eq!(rlp.val_at::<u8>(1).unwrap(), 3);
        assert_eq!(rlp.val_at::<u8>(2).unwrap(), 1);
        assert_eq!(rlp.val_at::<u32>(3).unwrap(), 500);
    }
}

//! BIP-32 hierarchical deterministic private keys.
//!
//! An extended private key couples a secp256k1 scalar with a 32-byte chain
//! code plus the position metadata (depth, child index, parent
//! fingerprint) that the `xprv` serialization carries. Child derivation
//! follows BIP-32: HMAC-SHA-512 over the serialized parent public point
//! (normal children) or the padded private scalar (hardened children),
//! with the left half added to the parent scalar modulo the curve order.
//!
//! Derivation is not constant-time; chain codes and fingerprints are not
//! uniformly secret, and the hash layer underneath is public-data code.

use crate::{
    arithmetic::{projective::ProjectivePoint, uint256::Uint256, CURVE_ORDER},
    hashes,
};
use subtle::{Choice, ConstantTimeLess};

#[cfg(feature = "alloc")]
use crate::{base58check, Error, Result};
#[cfg(feature = "alloc")]
use alloc::string::String;

/// Child indices at or above this value derive hardened keys.
pub const HARDEN: u32 = 0x8000_0000;

/// Serialization header for mainnet extended private keys (`xprv`).
const XPRV_HEADER: [u8; 4] = [0x04, 0x88, 0xAD, 0xE4];

/// Length of the serialized `xprv` payload before the checksum.
const XPRV_PAYLOAD_LEN: usize = 78;

/// A BIP-32 extended private key.
#[derive(Clone, Copy, Debug)]
pub struct ExtendedPrivateKey {
    private_key: Uint256,
    public_key: ProjectivePoint,
    chain_code: [u8; 32],
    depth: u8,
    index: u32,
    parent_fingerprint: [u8; 4],
}

impl ExtendedPrivateKey {
    /// Constructs an extended key from all of its parts.
    ///
    /// `private_key` must be in `[1, n)` (debug-asserted); the public point
    /// is computed here.
    pub fn new(
        private_key: Uint256,
        chain_code: [u8; 32],
        depth: u8,
        index: u32,
        parent_fingerprint: [u8; 4],
    ) -> Self {
        Self {
            private_key,
            public_key: ProjectivePoint::mul_base(&private_key),
            chain_code,
            depth,
            index,
            parent_fingerprint,
        }
    }

    /// Constructs a depth-zero master key from a private scalar and chain
    /// code.
    pub fn master(private_key: Uint256, chain_code: [u8; 32]) -> Self {
        Self::new(private_key, chain_code, 0, 0, [0u8; 4])
    }

    /// The private scalar.
    pub fn private_key(&self) -> &Uint256 {
        &self.private_key
    }

    /// The normalized public point `d·G`.
    pub fn public_key(&self) -> &ProjectivePoint {
        &self.public_key
    }

    /// The chain code.
    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// Number of derivation steps from the master key.
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// The child index this key was derived with (0 for a master key).
    pub fn index(&self) -> u32 {
        self.index
    }

    /// First four bytes of the parent public key's HASH160.
    pub fn parent_fingerprint(&self) -> &[u8; 4] {
        &self.parent_fingerprint
    }

    /// Derives the child key at `index`; hardened iff `index >= HARDEN`.
    ///
    /// Returns `None` when the HMAC left half falls at or above the curve
    /// order, or the child scalar works out to zero. Both events have
    /// negligible probability; BIP-32 tells the caller to move on to the
    /// next index.
    pub fn derive_child(&self, index: u32) -> Option<Self> {
        let mut msg = [0u8; 37];
        if index < HARDEN {
            msg[..33].copy_from_slice(&self.public_key.to_compressed_point());
        } else {
            msg[0] = 0;
            msg[1..33].copy_from_slice(&self.private_key.to_be_bytes());
        }
        msg[33..].copy_from_slice(&index.to_be_bytes());
        let hash = hashes::hmac_sha512(&self.chain_code, &msg);

        let mut left = [0u8; 32];
        left.copy_from_slice(&hash[..32]);
        let mut child_key = Uint256::from_be_bytes(&left);
        if !bool::from(child_key.ct_lt(&CURVE_ORDER)) {
            return None;
        }
        let carry = child_key.conditional_add_assign(&self.private_key, Choice::from(1));
        child_key
            .conditional_sub_assign(&CURVE_ORDER, carry | !child_key.ct_lt(&CURVE_ORDER));
        if bool::from(child_key.is_zero()) {
            return None;
        }

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&hash[32..]);
        let fingerprint_src = hashes::hash160(&self.public_key.to_compressed_point());
        let mut fingerprint = [0u8; 4];
        fingerprint.copy_from_slice(&fingerprint_src[..4]);
        Some(Self::new(
            child_key,
            chain_code,
            self.depth.wrapping_add(1),
            index,
            fingerprint,
        ))
    }

    /// Serializes as a Base58Check `xprv` string, always 111 characters.
    #[cfg(feature = "alloc")]
    #[cfg_attr(docsrs, doc(cfg(feature = "alloc")))]
    pub fn to_xprv(&self) -> String {
        let mut payload = [0u8; XPRV_PAYLOAD_LEN];
        payload[..4].copy_from_slice(&XPRV_HEADER);
        payload[4] = self.depth;
        payload[5..9].copy_from_slice(&self.parent_fingerprint);
        payload[9..13].copy_from_slice(&self.index.to_be_bytes());
        payload[13..45].copy_from_slice(&self.chain_code);
        payload[45] = 0x00;
        payload[46..].copy_from_slice(&self.private_key.to_be_bytes());
        base58check::encode_raw_check(&payload)
    }

    /// Parses a Base58Check `xprv` string.
    ///
    /// Rejects bad checksums, wrong lengths, a wrong header, a nonzero key
    /// padding byte, and private scalars outside `[1, n)`. The public point
    /// is recomputed from the scalar.
    #[cfg(feature = "alloc")]
    #[cfg_attr(docsrs, doc(cfg(feature = "alloc")))]
    pub fn from_xprv(xprv: &str) -> Result<Self> {
        let payload = base58check::decode_raw_check(xprv)?;
        if payload.len() != XPRV_PAYLOAD_LEN
            || payload[..4] != XPRV_HEADER
            || payload[45] != 0x00
        {
            return Err(Error);
        }

        let mut key_bytes = [0u8; 32];
        key_bytes.copy_from_slice(&payload[46..]);
        let private_key = Uint256::from_be_bytes(&key_bytes);
        if bool::from(private_key.is_zero())
            || !bool::from(private_key.ct_lt(&CURVE_ORDER))
        {
            return Err(Error);
        }

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&payload[13..45]);
        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&payload[5..9]);
        let mut index_bytes = [0u8; 4];
        index_bytes.copy_from_slice(&payload[9..13]);
        Ok(Self::new(
            private_key,
            chain_code,
            payload[4],
            u32::from_be_bytes(index_bytes),
            parent_fingerprint,
        ))
    }
}

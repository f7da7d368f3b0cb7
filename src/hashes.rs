//! Byte-oriented adapter over the hash primitives the rest of the crate
//! consumes.
//!
//! All functions here are total, deterministic, and side-effect free. None
//! of them is constant-time: hash inputs and outputs are public data in
//! every protocol this crate implements. SHA-2 per FIPS 180-4, RIPEMD-160
//! per ISO/IEC 10118-3, and Keccak-256 with the original 0x01 Keccak
//! padding (not NIST SHA-3).

use core::fmt;
use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};
use sha3::Keccak256;
use subtle::{Choice, ConstantTimeEq};

/// SHA-256 of the given bytes.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(data));
    out
}

/// SHA-256 applied twice, Bitcoin's workhorse hash.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// HMAC-SHA-256 of `msg` under `key`.
pub fn hmac_sha256(key: &[u8], msg: &[u8]) -> [u8; 32] {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(msg);
    let mut out = [0u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

/// SHA-512 of the given bytes.
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let mut out = [0u8; 64];
    out.copy_from_slice(&Sha512::digest(data));
    out
}

/// HMAC-SHA-512 of `msg` under `key`.
pub fn hmac_sha512(key: &[u8], msg: &[u8]) -> [u8; 64] {
    let mut mac = Hmac::<Sha512>::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(msg);
    let mut out = [0u8; 64];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

/// RIPEMD-160 of the given bytes.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    let mut out = [0u8; 20];
    out.copy_from_slice(&Ripemd160::digest(data));
    out
}

/// Keccak-256 (pre-NIST padding) of the given bytes.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(data));
    out
}

/// RIPEMD-160 of SHA-256: the Bitcoin public-key-hash composition.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}

/// A 32-byte SHA-256 hash value.
///
/// By Bitcoin convention, SHA-256 hash *strings* (transaction ids, block
/// hashes) are written in byte-reversed order. This type stores the native
/// byte order and confines the reversal to [`from_display_hex`]
/// [Self::from_display_hex]; these three spellings denote the same value:
///
/// - bigint `0x0102…3132`
/// - bytes `[0x01, 0x02, …, 0x31, 0x32]`
/// - display hex `"3231…0201"`
#[derive(Clone, Copy, Debug)]
pub struct Sha256Hash([u8; 32]);

impl Sha256Hash {
    /// Length of the hash in bytes.
    pub const LEN: usize = 32;

    /// Wraps 32 raw bytes in native order.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parses a 64-character byte-reversed hexadecimal string, the order
    /// Bitcoin uses to display transaction and block hashes.
    pub fn from_display_hex(s: &str) -> Option<Self> {
        if s.len() != Self::LEN * 2 || !s.is_ascii() {
            return None;
        }
        let mut bytes = [0u8; 32];
        let digits = s.as_bytes();
        for (i, byte) in bytes.iter_mut().rev().enumerate() {
            let hi = (digits[i * 2] as char).to_digit(16)?;
            let lo = (digits[i * 2 + 1] as char).to_digit(16)?;
            *byte = ((hi << 4) | lo) as u8;
        }
        Some(Self(bytes))
    }

    /// The hash bytes in native order.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl ConstantTimeEq for Sha256Hash {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl PartialEq for Sha256Hash {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Sha256Hash {}

impl fmt::Display for Sha256Hash {
    /// Formats in the byte-reversed display convention.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter().rev() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

//! Pure Rust implementation of Bitcoin key and signature cryptography.
//!
//! The crate is built from three layers:
//!
//! - [`arithmetic`]: a fixed-width 256-bit integer ([`Uint256`]), the
//!   secp256k1 base field ([`FieldElement`]), and projective group
//!   operations on the curve ([`ProjectivePoint`]). Everything in this
//!   layer that touches secret data runs in constant time: fixed loop
//!   counts, masked conditional updates, and table lookups by linear scan.
//! - [`ecdsa`]: signing and verification over secp256k1, with BIP-62
//!   low-S normalization and optional HMAC-SHA-256 nonce derivation.
//! - Encodings and key derivation on top: [`bip32`] child keys,
//!   [`base58check`] addresses/WIF/`xprv` strings, and [`bech32`] segwit
//!   addresses (the latter two require the `alloc` feature).
//!
//! Hash primitives (SHA-256, SHA-512, RIPEMD-160, Keccak-256 and the HMAC
//! construction) are consumed from the RustCrypto crates through the thin
//! byte-oriented adapter in [`hashes`].
//!
//! # Example
//!
//! ```
//! use bitkey::{ecdsa, hashes, Uint256};
//!
//! // The discrete logarithm of the public key: an integer in [1, n).
//! let private_key = Uint256::from_hex(
//!     "0000000000000000000000000000000000000000000000000000000000000001",
//! )
//! .unwrap();
//! let public_key = bitkey::ProjectivePoint::mul_base(&private_key);
//!
//! let msg_hash = hashes::Sha256Hash::new(hashes::sha256(b"hello"));
//! let signature = ecdsa::sign_with_hmac_nonce(&private_key, &msg_hash).unwrap();
//! assert!(ecdsa::verify(&public_key, &msg_hash, &signature));
//! ```
//!
//! # Security notes
//!
//! This crate contains no random number generator; nonce material is the
//! caller's responsibility. Only timing invariance over secret inputs is
//! targeted; resistance against power or EM side channels is out of scope.

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;
#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod arithmetic;
#[cfg(feature = "alloc")]
#[cfg_attr(docsrs, doc(cfg(feature = "alloc")))]
pub mod base58check;
#[cfg(feature = "alloc")]
#[cfg_attr(docsrs, doc(cfg(feature = "alloc")))]
pub mod bech32;
pub mod bip32;
pub mod ecdsa;
pub mod hashes;

pub use crate::{
    arithmetic::{
        field::FieldElement, projective::ProjectivePoint, uint256::Uint256, CURVE_ORDER,
    },
    hashes::Sha256Hash,
};

use core::fmt;

/// Opaque error for fallible parsing and decoding operations.
///
/// Carrying no detail is deliberate: for decoders whose inputs may be
/// attacker-controlled, reporting *why* a string failed to parse gives away
/// more than callers need.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Error;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("cryptographic encoding error")
    }
}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl std::error::Error for Error {}

/// Result type with the crate-local [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

//! Constant-time arithmetic for secp256k1.
//!
//! Layered bottom-up: [`uint256`] provides the raw 256-bit integer with
//! enable-gated word operations, [`field`] the prime field modulo
//! p = 2^256 - 2^32 - 977, and [`projective`] the curve group.

pub mod field;
pub mod projective;
pub mod uint256;

use self::uint256::Uint256;

/// Order of the secp256k1 base point:
/// n = FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFE BAAEDCE6 AF48A03B BFD25E8C D0364141.
pub const CURVE_ORDER: Uint256 = Uint256::from_words([
    0xD036_4141,
    0xBFD2_5E8C,
    0xAF48_A03B,
    0xBAAE_DCE6,
    0xFFFF_FFFE,
    0xFFFF_FFFF,
    0xFFFF_FFFF,
    0xFFFF_FFFF,
]);

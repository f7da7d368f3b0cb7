//! Base58Check encoding of Bitcoin addresses, WIF private keys, and raw
//! check-summed payloads.
//!
//! Base58Check wraps a payload as `version ‖ payload ‖ checksum`, where the
//! checksum is the first four bytes of SHA-256d over everything before it,
//! and converts the result to base 58 with one leading `'1'` per leading
//! zero byte. The bignum-in-base-58 bookkeeping is delegated to the `bs58`
//! crate; this module owns the Bitcoin object shapes on top of it.
//!
//! Nothing here is constant-time: encoded keys and addresses are destined
//! for clipboards and block explorers, and decoding handles
//! attacker-supplied strings whose contents are not secrets this library
//! can protect.

use crate::{arithmetic::uint256::Uint256, Error, Result};
use alloc::{string::String, vec::Vec};

/// The 58-character alphabet, in value order.
pub const ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Version byte for mainnet pay-to-pubkey-hash addresses.
pub const VERSION_P2PKH: u8 = 0x00;

/// Version byte for mainnet WIF private keys.
pub const VERSION_WIF: u8 = 0x80;

/// WIF marker byte indicating a compressed public key.
const WIF_COMPRESSED_MARKER: u8 = 0x01;

/// A WIF string decoded into its parts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DecodedWif {
    /// The version prefix byte (0x80 on mainnet).
    pub version: u8,
    /// The raw private scalar. May lie outside the valid key range `[1, n)`;
    /// range checking is the caller's decision.
    pub private_key: Uint256,
    /// Whether the key should produce a compressed public point.
    pub compressed: bool,
}

/// Encodes `version ‖ payload` with the 4-byte SHA-256d checksum.
pub fn encode_check(version: u8, payload: &[u8]) -> String {
    bs58::encode(payload)
        .with_check_version(version)
        .into_string()
}

/// Decodes a Base58Check string into its version byte and payload.
///
/// Rejects non-alphabet characters, checksum mismatches, and strings too
/// short to hold a version and checksum.
pub fn decode_check(s: &str) -> Result<(u8, Vec<u8>)> {
    let decoded = bs58::decode(s)
        .with_check(None)
        .into_vec()
        .map_err(|_| Error)?;
    match decoded.split_first() {
        Some((&version, payload)) => Ok((version, payload.to_vec())),
        None => Err(Error),
    }
}

/// Encodes a check-summed payload whose leading bytes are not a separate
/// version (the BIP-32 `xprv` shape).
pub(crate) fn encode_raw_check(payload: &[u8]) -> String {
    bs58::encode(payload).with_check().into_string()
}

/// Inverse of [`encode_raw_check`]: full payload with the checksum verified
/// and stripped.
pub(crate) fn decode_raw_check(s: &str) -> Result<Vec<u8>> {
    bs58::decode(s).with_check(None).into_vec().map_err(|_| Error)
}

/// Encodes a 20-byte public key hash as a Base58Check address.
///
/// The output is 25 to 35 characters long; for the mainnet version 0x00 it
/// starts with `'1'`.
pub fn pubkey_hash_to_address(pubkey_hash: &[u8; 20], version: u8) -> String {
    encode_check(version, pubkey_hash)
}

/// Parses a Base58Check address into its version byte and 20-byte public
/// key hash.
pub fn address_to_pubkey_hash(addr: &str) -> Result<(u8, [u8; 20])> {
    let (version, payload) = decode_check(addr)?;
    if payload.len() != 20 {
        return Err(Error);
    }
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&payload);
    Ok((version, hash))
}

/// Encodes a private key in Wallet Import Format.
///
/// `compressed` should almost always be true; the uncompressed form exists
/// for legacy applications. Output is 38–52 characters; the mainnet
/// compressed form is 52 characters starting with `'K'` or `'L'`.
pub fn private_key_to_wif(private_key: &Uint256, version: u8, compressed: bool) -> String {
    let mut payload = [0u8; 33];
    payload[..32].copy_from_slice(&private_key.to_be_bytes());
    if compressed {
        payload[32] = WIF_COMPRESSED_MARKER;
        encode_check(version, &payload)
    } else {
        encode_check(version, &payload[..32])
    }
}

/// Parses a WIF string.
///
/// Rejects bad checksums, payloads that are not exactly a 32-byte key plus
/// an optional compression marker, and marker bytes other than 0x01.
pub fn wif_to_private_key(wif: &str) -> Result<DecodedWif> {
    let (version, payload) = decode_check(wif)?;
    let compressed = match payload.len() {
        32 => false,
        33 if payload[32] == WIF_COMPRESSED_MARKER => true,
        _ => return Err(Error),
    };
    let mut key_bytes = [0u8; 32];
    key_bytes.copy_from_slice(&payload[..32]);
    Ok(DecodedWif {
        version,
        private_key: Uint256::from_be_bytes(&key_bytes),
        compressed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn known_payloads() {
        // Fixtures shared with the reference implementation's test suite.
        assert_eq!(encode_raw_check(b""), "3QJmnh");
        assert_eq!(encode_raw_check(&hex!("ff")), "VrZDWwe");
        assert_eq!(encode_raw_check(&hex!("00")), "1Wh4bh");
        assert_eq!(encode_raw_check(&hex!("0000")), "112edB6q");
        assert_eq!(
            encode_check(0x00, &hex!("010966776006953D5567439E5E39F86A0D273BEE")),
            "16UwLL9Risc3QfPqBUvKofHmBQ7wMtjvM"
        );
    }

    #[test]
    fn address_roundtrip() {
        let hash = hex!("010966776006953D5567439E5E39F86A0D273BEE");
        let addr = pubkey_hash_to_address(&hash, VERSION_P2PKH);
        assert!(addr.starts_with('1'));
        assert!((25..=35).contains(&addr.len()));
        assert_eq!(address_to_pubkey_hash(&addr).unwrap(), (VERSION_P2PKH, hash));
    }

    #[test]
    fn decode_rejects_corruption() {
        let addr = pubkey_hash_to_address(&[0x5A; 20], VERSION_P2PKH);
        let mut corrupted = addr.clone();
        // Swap the final character for a different alphabet member.
        let last = corrupted.pop().unwrap();
        corrupted.push(if last == '2' { '3' } else { '2' });
        assert!(address_to_pubkey_hash(&corrupted).is_err());
        // Non-alphabet characters ('0', 'O', 'I', 'l') never decode.
        assert!(decode_check("0OIl").is_err());
    }

    #[test]
    fn decode_rejects_wrong_length() {
        let s = encode_check(VERSION_P2PKH, &[1u8; 19]);
        assert!(address_to_pubkey_hash(&s).is_err());
        assert!(decode_check("").is_err());
    }

    #[test]
    fn roundtrip_every_version_and_length() {
        for version in [0x00u8, 0x05, 0x6F, 0x80, 0xFF] {
            for len in 0..=40usize {
                let payload: alloc::vec::Vec<u8> =
                    (0..len).map(|i| (i as u8).wrapping_mul(37).wrapping_add(version)).collect();
                let encoded = encode_check(version, &payload);
                let (v, p) = decode_check(&encoded).unwrap();
                assert_eq!(v, version);
                assert_eq!(p, payload);
            }
        }
    }

    #[test]
    fn wif_roundtrip_compressed_and_not() {
        let key = Uint256::from_hex(
            "0C28FCA386C7A227600B2FE50B7CAE11EC86D3BF1FBE471BE89827E19D72AA1D",
        )
        .unwrap();
        for compressed in [true, false] {
            let wif = private_key_to_wif(&key, VERSION_WIF, compressed);
            assert!((38..=52).contains(&wif.len()));
            let decoded = wif_to_private_key(&wif).unwrap();
            assert_eq!(decoded.version, VERSION_WIF);
            assert_eq!(decoded.compressed, compressed);
            assert_eq!(decoded.private_key, key);
        }
    }

    #[test]
    fn known_uncompressed_wif() {
        // The canonical example key from the Bitcoin wiki.
        let key = Uint256::from_hex(
            "0C28FCA386C7A227600B2FE50B7CAE11EC86D3BF1FBE471BE89827E19D72AA1D",
        )
        .unwrap();
        assert_eq!(
            private_key_to_wif(&key, VERSION_WIF, false),
            "5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqvbTLvyTJ"
        );
    }

    #[test]
    fn wif_rejects_bad_marker() {
        let mut payload = [0u8; 33];
        payload[32] = 0x02;
        let bad = encode_check(VERSION_WIF, &payload);
        assert!(wif_to_private_key(&bad).is_err());
    }
}

//! Bech32 segwit addresses (BIP-173).
//!
//! A bech32 string is `hrp ‖ '1' ‖ data ‖ checksum`, where the data part
//! carries 5-bit groups in the charset below and the 6-character checksum
//! is a BCH code over the expanded human-readable part and the data.
//! Segwit addresses put the witness version in the first group and the
//! regrouped witness program in the rest.
//!
//! Everything here is variable-time; addresses are public.

use crate::{Error, Result};
use alloc::{string::String, vec::Vec};

/// The bech32 data charset, in value order.
const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Generator coefficients of the BCH checksum.
const GENERATOR: [u32; 5] = [
    0x3B6A_57B2,
    0x2650_8E6D,
    0x1EA1_19FA,
    0x3D42_33DD,
    0x2A14_62B3,
];

/// Longest legal bech32 string.
const MAX_LEN: usize = 90;

const CHECKSUM_LEN: usize = 6;

fn polymod(values: &[u8]) -> u32 {
    let mut chk: u32 = 1;
    for &value in values {
        let top = chk >> 25;
        chk = ((chk & 0x01FF_FFFF) << 5) ^ (value as u32);
        for (i, generator) in GENERATOR.iter().enumerate() {
            if ((top >> i) & 1) == 1 {
                chk ^= generator;
            }
        }
    }
    chk
}

/// The human-readable part, expanded to its high and low 5-bit halves with
/// a zero separator, as fed into the checksum.
fn expand_hrp(hrp: &str) -> Vec<u8> {
    let bytes = hrp.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() * 2 + 1);
    out.extend(bytes.iter().map(|b| b >> 5));
    out.push(0);
    out.extend(bytes.iter().map(|b| b & 31));
    out
}

fn hrp_is_valid(hrp: &str) -> bool {
    !hrp.is_empty()
        && hrp.len() <= 83
        && hrp
            .bytes()
            .all(|b| (33..=126).contains(&b) && !b.is_ascii_uppercase())
}

/// Regroups a bit stream between group sizes.
///
/// Encoding pads the final partial group with zeros; decoding rejects
/// nonzero padding or a leftover group, per BIP-173.
fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Result<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let max = (1u32 << to) - 1;
    let mut out = Vec::new();
    for &value in data {
        if (value as u32) >> from != 0 {
            return Err(Error);
        }
        acc = (acc << from) | value as u32;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & max) as u8);
        }
    }
    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & max) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & max) != 0 {
        return Err(Error);
    }
    Ok(out)
}

/// Encodes a human-readable part and 5-bit data groups as a bech32 string.
fn encode(hrp: &str, data: &[u8]) -> Result<String> {
    if !hrp_is_valid(hrp) || data.iter().any(|&b| b >> 5 != 0) {
        return Err(Error);
    }
    if hrp.len() + 1 + data.len() + CHECKSUM_LEN > MAX_LEN {
        return Err(Error);
    }

    let mut values = expand_hrp(hrp);
    values.extend_from_slice(data);
    values.extend_from_slice(&[0u8; CHECKSUM_LEN]);
    let checksum = polymod(&values) ^ 1;

    let mut out = String::with_capacity(hrp.len() + 1 + data.len() + CHECKSUM_LEN);
    out.push_str(hrp);
    out.push('1');
    for &value in data {
        out.push(CHARSET[value as usize] as char);
    }
    for i in 0..CHECKSUM_LEN {
        let group = (checksum >> ((CHECKSUM_LEN - 1 - i) * 5)) & 31;
        out.push(CHARSET[group as usize] as char);
    }
    Ok(out)
}

/// Decodes a bech32 string into its human-readable part and 5-bit data
/// groups (checksum verified and stripped).
fn decode(s: &str) -> Result<(String, Vec<u8>)> {
    if s.len() > MAX_LEN || !s.is_ascii() {
        return Err(Error);
    }
    let has_lower = s.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = s.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(Error);
    }
    let lowered = s.to_ascii_lowercase();

    let sep = lowered.rfind('1').ok_or(Error)?;
    let (hrp, data_part) = lowered.split_at(sep);
    let data_part = &data_part[1..];
    if !hrp_is_valid(hrp) || data_part.len() < CHECKSUM_LEN {
        return Err(Error);
    }

    let mut values = Vec::with_capacity(data_part.len());
    for c in data_part.bytes() {
        let value = CHARSET.iter().position(|&x| x == c).ok_or(Error)?;
        values.push(value as u8);
    }

    let mut check = expand_hrp(hrp);
    check.extend_from_slice(&values);
    if polymod(&check) != 1 {
        return Err(Error);
    }

    values.truncate(values.len() - CHECKSUM_LEN);
    Ok((String::from(hrp), values))
}

/// Encodes a segwit output (witness version plus program) as a bech32
/// address under the given human-readable part (`"bc"` for mainnet).
pub fn segwit_to_bech32(hrp: &str, witness_version: u8, program: &[u8]) -> Result<String> {
    if witness_version > 16 || !(2..=40).contains(&program.len()) {
        return Err(Error);
    }
    if witness_version == 0 && program.len() != 20 && program.len() != 32 {
        return Err(Error);
    }
    let mut data = Vec::with_capacity(1 + (program.len() * 8 + 4) / 5);
    data.push(witness_version);
    data.extend_from_slice(&convert_bits(program, 8, 5, true)?);
    encode(hrp, &data)
}

/// Decodes a segwit bech32 address into its human-readable part, witness
/// version, and witness program.
pub fn bech32_to_segwit(addr: &str) -> Result<(String, u8, Vec<u8>)> {
    let (hrp, data) = decode(addr)?;
    let (&witness_version, groups) = data.split_first().ok_or(Error)?;
    if witness_version > 16 {
        return Err(Error);
    }
    let program = convert_bits(groups, 5, 8, false)?;
    if !(2..=40).contains(&program.len()) {
        return Err(Error);
    }
    if witness_version == 0 && program.len() != 20 && program.len() != 32 {
        return Err(Error);
    }
    Ok((hrp, witness_version, program))
}

#[cfg(test)]
mod tests {
    use super::{bech32_to_segwit, decode, segwit_to_bech32};
    use hex_literal::hex;

    #[test]
    fn valid_checksums() {
        // From the BIP-173 test vector list.
        for valid in [
            "A12UEL5L",
            "an83characterlonghumanreadablepartthatcontainsthenumber1andtheexcludedcharactersbio1tt5tgs",
            "abcdef1qpzry9x8gf2tvdw0s3jn54khce6mua7lmqqqxw",
            "split1checkupstagehandshakeupstreamerranterredcaperred2y9e3w",
        ] {
            assert!(decode(valid).is_ok());
        }
    }

    #[test]
    fn invalid_strings() {
        for invalid in [
            "split1checkupstagehandshakeupstreamerranterredcaperred2y9e2w", // bad checksum
            "s lit1checkupstagehandshakeupstreamerranterredcaperredp8hs2p", // bad hrp char
            "split1cheo2y9e2w",                                             // bad data char
            "1checkupstagehandshakeupstreamerranterredcaperred2y9e3w",      // empty hrp
            "pzry9x0s3jn54khce6mua7l",                                      // no separator
            "Abc1qpzry9x8gf2tvdw0s3jn54khce6mua7lMqqqxw",                   // mixed case
        ] {
            assert!(decode(invalid).is_err(), "accepted {:?}", invalid);
        }
    }

    #[test]
    fn segwit_v0_p2wpkh_mainnet() {
        let program = hex!("751e76e8199196d454941c45d1b3a323f1433bd6");
        let addr = segwit_to_bech32("bc", 0, &program).unwrap();
        assert_eq!(addr, "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4");

        let (hrp, version, decoded) = bech32_to_segwit("BC1QW508D6QEJXTDG4Y5R3ZARVARY0C5XW7KV8F3T4").unwrap();
        assert_eq!(hrp, "bc");
        assert_eq!(version, 0);
        assert_eq!(decoded, program);
    }

    #[test]
    fn segwit_v0_p2wsh_testnet() {
        let program = hex!("1863143c14c5166804bd19203356da136c985678cd4d27a1b8c6329604903262");
        let addr = segwit_to_bech32("tb", 0, &program).unwrap();
        assert_eq!(
            addr,
            "tb1qrp33g0q5c5txsp9arysrx4k6zdkfs4nce4xj0gdcccefvpysxf3q0sl5k7"
        );
        let (_, version, decoded) = bech32_to_segwit(&addr).unwrap();
        assert_eq!(version, 0);
        assert_eq!(decoded, program);
    }

    #[test]
    fn segwit_rejects_bad_programs() {
        assert!(segwit_to_bech32("bc", 0, &[0u8; 25]).is_err());
        assert!(segwit_to_bech32("bc", 17, &[0u8; 20]).is_err());
        assert!(segwit_to_bech32("bc", 1, &[0u8; 41]).is_err());
        assert!(segwit_to_bech32("bc", 1, &[0u8; 1]).is_err());
    }
}

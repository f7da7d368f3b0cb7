//! Elliptic Curve Digital Signature Algorithm (ECDSA) over secp256k1.
//!
//! Signing runs in constant time with respect to the private key, the
//! message hash, and the nonce on every successful path; the early `None`
//! returns only reveal that *some* rejection rule fired, which the caller
//! must already handle by choosing a fresh nonce. Verification handles
//! public data only and is free to run in variable time.
//!
//! Nonces are the caller's problem. [`sign`] consumes one explicitly;
//! [`sign_with_hmac_nonce`] derives one as a single
//! HMAC-SHA-256(key = private key, message = hash). Note that the latter is
//! *not* RFC 6979: there is no retry loop, so the vanishingly rare nonce
//! rejection surfaces as `None` instead of being absorbed.

use crate::{
    arithmetic::{projective::ProjectivePoint, uint256::Uint256, CURVE_ORDER},
    hashes::{self, Sha256Hash},
    FieldElement,
};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, ConstantTimeLess};

/// An ECDSA/secp256k1 signature: the pair (r, s), both in `[1, n)`.
///
/// This is the raw scalar pair; DER framing is the caller's responsibility.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Signature {
    r: Uint256,
    s: Uint256,
}

impl Signature {
    /// The r component.
    pub fn r(&self) -> &Uint256 {
        &self.r
    }

    /// The s component.
    pub fn s(&self) -> &Uint256 {
        &self.s
    }

    /// Serializes as the 64-byte fixed encoding r ‖ s, big-endian.
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.r.to_be_bytes());
        bytes[32..].copy_from_slice(&self.s.to_be_bytes());
        bytes
    }

    /// Parses the 64-byte fixed encoding, rejecting components outside
    /// `[1, n)`.
    pub fn from_bytes(bytes: &[u8; 64]) -> Option<Self> {
        let mut r_bytes = [0u8; 32];
        let mut s_bytes = [0u8; 32];
        r_bytes.copy_from_slice(&bytes[..32]);
        s_bytes.copy_from_slice(&bytes[32..]);
        let r = Uint256::from_be_bytes(&r_bytes);
        let s = Uint256::from_be_bytes(&s_bytes);
        let valid = !r.is_zero()
            & r.ct_lt(&CURVE_ORDER)
            & !s.is_zero()
            & s.ct_lt(&CURVE_ORDER);
        bool::from(valid).then_some(Self { r, s })
    }
}

/// Signs a message hash with the given private key and nonce.
///
/// `private_key` must be in `[1, n)` (debug-asserted). Returns `None` when
/// the nonce is outside `[1, n)`, or in the negligible-probability event
/// that r or s comes out zero; the caller must retry with another nonce.
/// The emitted s is normalized to the lower half-range per BIP 62.
pub fn sign(private_key: &Uint256, msg_hash: &Sha256Hash, nonce: &Uint256) -> Option<Signature> {
    debug_assert!(bool::from(
        !private_key.is_zero() & private_key.ct_lt(&CURVE_ORDER)
    ));

    /*
     * if (nonce outside range [1, order-1]) return None
     * p = nonce * G
     * r = p.x % order;  if (r == 0) return None
     * s = nonce^-1 * (msgHash + r * privateKey) % order
     * if (s == 0) return None
     * s = min(s, order - s)
     */
    if bool::from(nonce.is_zero()) || !bool::from(nonce.ct_lt(&CURVE_ORDER)) {
        return None;
    }

    let p = ProjectivePoint::mul_base(nonce);
    let mut r = Uint256::from(p.x);
    let reduce = !r.ct_lt(&CURVE_ORDER);
    r.conditional_sub_assign(&CURVE_ORDER, reduce);
    if bool::from(r.is_zero()) {
        return None;
    }

    let z = Uint256::from_be_bytes(msg_hash.as_bytes());
    let mut s = r;
    mul_mod_order(&mut s, private_key);
    let carry = s.conditional_add_assign(&z, Choice::from(1));
    s.conditional_sub_assign(&CURVE_ORDER, carry | !s.ct_lt(&CURVE_ORDER));

    let mut k_inv = *nonce;
    k_inv.invert_mod_assign(&CURVE_ORDER);
    mul_mod_order(&mut s, &k_inv);
    if bool::from(s.is_zero()) {
        return None;
    }

    let mut neg_s = CURVE_ORDER;
    neg_s.conditional_sub_assign(&s, Choice::from(1));
    // Keep the smaller of s and n - s (BIP 62 low-S rule).
    s.conditional_assign(&neg_s, neg_s.ct_lt(&s));
    Some(Signature { r, s })
}

/// Signs a message hash with a nonce derived deterministically as
/// HMAC-SHA-256 of the hash under the big-endian private key.
///
/// A pure function of `(private_key, msg_hash)`. This is *not* full
/// RFC 6979: a single HMAC invocation with no retry on rejection. If
/// [`sign`] rejects the derived nonce, the `None` propagates.
pub fn sign_with_hmac_nonce(private_key: &Uint256, msg_hash: &Sha256Hash) -> Option<Signature> {
    let key = private_key.to_be_bytes();
    let mac = hashes::hmac_sha256(&key, msg_hash.as_bytes());
    let nonce = Uint256::from_be_bytes(&mac);
    sign(private_key, msg_hash, &nonce)
}

/// Checks a signature over a message hash against a public key.
///
/// The public key must be normalized (`Z = 1`). Rejects the identity,
/// off-curve points, points whose order does not divide n, and signature
/// components outside `[1, n)`. Not constant-time: every input is public.
pub fn verify(public_key: &ProjectivePoint, msg_hash: &Sha256Hash, signature: &Signature) -> bool {
    /*
     * if (pubKey == identity || !(pubKey is normalized) ||
     *     !(pubKey on curve) || n * pubKey != identity) return false
     * if (!(0 < r, s < order)) return false
     * w = s^-1 % order
     * u1 = (msgHash * w) % order
     * u2 = (r * w) % order
     * p = u1 * G + u2 * pubKey
     * return r == p.x % order
     */
    let r = &signature.r;
    let s = &signature.s;
    if bool::from(r.is_zero()) || !bool::from(r.ct_lt(&CURVE_ORDER)) {
        return false;
    }
    if bool::from(s.is_zero()) || !bool::from(s.ct_lt(&CURVE_ORDER)) {
        return false;
    }
    if bool::from(public_key.is_identity()) || public_key.z != FieldElement::ONE {
        return false;
    }
    if !bool::from(public_key.is_on_curve()) {
        return false;
    }
    if !bool::from(public_key.mul_scalar(&CURVE_ORDER).is_identity()) {
        return false;
    }

    let mut w = *s;
    w.invert_mod_assign(&CURVE_ORDER);
    let z = Uint256::from_be_bytes(msg_hash.as_bytes());
    let mut u1 = w;
    mul_mod_order(&mut u1, &z);
    let mut u2 = w;
    mul_mod_order(&mut u2, r);

    let p = ProjectivePoint::GENERATOR
        .mul_scalar(&u1)
        .add(&public_key.mul_scalar(&u2))
        .normalize();
    let mut rx = Uint256::from(p.x);
    let reduce = !rx.ct_lt(&CURVE_ORDER);
    rx.conditional_sub_assign(&CURVE_ORDER, reduce);
    bool::from(r.ct_eq(&rx))
}

/// Computes `x ← x·y mod n` by Russian-peasant multiplication with a
/// modular reduction at each of the 256 fixed steps.
///
/// Requires `x < n`; `y` is unrestricted. Constant-time in both values.
pub(crate) fn mul_mod_order(x: &mut Uint256, y: &Uint256) {
    debug_assert!(bool::from(x.ct_lt(&CURVE_ORDER)));

    let copy = *x;
    *x = Uint256::ZERO;
    for i in (0..256).rev() {
        let carry = x.shl1_assign();
        x.conditional_sub_assign(&CURVE_ORDER, carry | !x.ct_lt(&CURVE_ORDER));
        let carry = x.conditional_add_assign(&copy, y.bit(i));
        x.conditional_sub_assign(&CURVE_ORDER, carry | !x.ct_lt(&CURVE_ORDER));
        debug_assert!(bool::from(x.ct_lt(&CURVE_ORDER)));
    }
}

#[cfg(test)]
mod tests {
    use super::{mul_mod_order, sign, sign_with_hmac_nonce, verify, Signature};
    use crate::{
        arithmetic::{projective::ProjectivePoint, uint256::Uint256, CURVE_ORDER},
        hashes::{self, Sha256Hash},
        FieldElement,
    };
    use num_bigint::BigUint;
    use proptest::prelude::*;
    use subtle::ConstantTimeLess;

    fn msg_hash() -> Sha256Hash {
        Sha256Hash::new(hashes::sha256(b"The quick brown fox jumps over the lazy dog"))
    }

    fn key_one() -> Uint256 {
        Uint256::ONE
    }

    #[test]
    fn sign_rejects_bad_nonces() {
        let hash = msg_hash();
        assert!(sign(&key_one(), &hash, &Uint256::ZERO).is_none());
        assert!(sign(&key_one(), &hash, &CURVE_ORDER).is_none());
    }

    #[test]
    fn sign_then_verify() {
        let private_key = Uint256::from_hex(
            "69EC59EAA1F4F2E36B639716B7C30CA86D9A5375C7B38D8918BD9C0EBC80BA64",
        )
        .unwrap();
        let public_key = ProjectivePoint::mul_base(&private_key);
        let hash = msg_hash();
        let nonce = Uint256::from_hex(
            "49A0D7B786EC9CDE0D0721D72804BEFD06571C974B191EFB42ECF322BA9DDD9A",
        )
        .unwrap();

        let signature = sign(&private_key, &hash, &nonce).unwrap();
        assert!(verify(&public_key, &hash, &signature));

        // A flipped message hash must not verify.
        let mut other = *hash.as_bytes();
        other[0] ^= 1;
        assert!(!verify(&public_key, &Sha256Hash::new(other), &signature));
    }

    #[test]
    fn signatures_are_low_s() {
        let hash = msg_hash();
        for k in 1..=16u32 {
            let private_key = Uint256::from_words([k, 0, 0, 0, 0, 0, 0, 0]);
            let signature = sign_with_hmac_nonce(&private_key, &hash).unwrap();
            let mut doubled = *signature.s();
            let carry = doubled.shl1_assign();
            // 2s never wraps and stays below n, i.e. s <= (n-1)/2.
            assert_eq!(carry.unwrap_u8(), 0);
            assert!(bool::from(doubled.ct_lt(&CURVE_ORDER)));
        }
    }

    #[test]
    fn hmac_nonce_is_deterministic() {
        let hash = msg_hash();
        let a = sign_with_hmac_nonce(&key_one(), &hash).unwrap();
        let b = sign_with_hmac_nonce(&key_one(), &hash).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn verify_rejects_out_of_range_components() {
        let hash = msg_hash();
        let public_key = ProjectivePoint::mul_base(&key_one());
        let good = sign_with_hmac_nonce(&key_one(), &hash).unwrap();

        let mut bytes = good.to_bytes();
        bytes[32..].copy_from_slice(&CURVE_ORDER.to_be_bytes());
        assert!(Signature::from_bytes(&bytes).is_none());

        bytes[32..].copy_from_slice(&[0u8; 32]);
        assert!(Signature::from_bytes(&bytes).is_none());
    }

    #[test]
    fn verify_rejects_identity_and_denormalized_keys() {
        let hash = msg_hash();
        let signature = sign_with_hmac_nonce(&key_one(), &hash).unwrap();
        assert!(!verify(&ProjectivePoint::IDENTITY, &hash, &signature));

        // The right group element (G, the public key of d = 1) in a scaled
        // projective representation: rejected because Z != 1.
        let g = ProjectivePoint::GENERATOR;
        let lambda = FieldElement::from_hex(
            "0000000000000000000000000000000000000000000000000000000000000002",
        )
        .unwrap();
        let denormalized = ProjectivePoint {
            x: g.x.mul(&lambda),
            y: g.y.mul(&lambda),
            z: lambda,
        };
        assert!(verify(&g, &hash, &signature));
        assert!(!verify(&denormalized, &hash, &signature));
    }

    #[test]
    fn signature_byte_roundtrip() {
        let hash = msg_hash();
        let signature = sign_with_hmac_nonce(&key_one(), &hash).unwrap();
        let recovered = Signature::from_bytes(&signature.to_bytes()).unwrap();
        assert_eq!(recovered, signature);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn mul_mod_order_matches_reference(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
            let n = CURVE_ORDER.to_biguint();
            let xv = BigUint::from_bytes_be(&a) % &n;
            let y = Uint256::from_be_bytes(&b);
            let yv = y.to_biguint();
            let mut x = Uint256::from_biguint(&xv);
            mul_mod_order(&mut x, &y);
            prop_assert_eq!(x.to_biguint(), (xv * yv) % n);
        }
    }
}

//! Projective points on the secp256k1 curve.

use super::{field::FieldElement, uint256::Uint256, CURVE_ORDER};
use core::ops::{Add, AddAssign, Mul};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, ConstantTimeLess, CtOption};

/// b = 7 in the curve equation y² = x³ + 7.
pub(crate) const CURVE_EQUATION_B: FieldElement =
    FieldElement::from_words_unchecked([7, 0, 0, 0, 0, 0, 0, 0]);

/// A point on the secp256k1 curve in projective coordinates.
///
/// `(X : Y : Z)` represents the affine point `(X/Z, Y/Z)` whenever `Z ≠ 0`.
/// The group identity (point at infinity) is encoded as `(0, 1, 0)` and
/// nothing else; that single encoding is what lets [`is_identity`]
/// [Self::is_identity] be a plain field-equality test instead of a real
/// projective test.
///
/// Every operation is constant-time in the coordinate values: special cases
/// (identity operands, doubling, inverse pairs) are handled by computing all
/// candidate results and selecting with data-oblivious masks.
#[derive(Clone, Copy, Debug)]
pub struct ProjectivePoint {
    pub(crate) x: FieldElement,
    pub(crate) y: FieldElement,
    pub(crate) z: FieldElement,
}

impl ProjectivePoint {
    /// Additive identity of the group: the point at infinity.
    pub const IDENTITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ONE,
        z: FieldElement::ZERO,
    };

    /// Base point of secp256k1.
    ///
    /// ```text
    /// Gₓ = 79be667e f9dcbbac 55a06295 ce870b07 029bfcdb 2dce28d9 59f2815b 16f81798
    /// Gᵧ = 483ada77 26a3c465 5da4fbfc 0e1108a8 fd17b448 a6855419 9c47d08f fb10d4b8
    /// ```
    pub const GENERATOR: Self = Self {
        x: FieldElement::from_words_unchecked([
            0x16F8_1798,
            0x59F2_815B,
            0x2DCE_28D9,
            0x029B_FCDB,
            0xCE87_0B07,
            0x55A0_6295,
            0xF9DC_BBAC,
            0x79BE_667E,
        ]),
        y: FieldElement::from_words_unchecked([
            0xFB10_D4B8,
            0x9C47_D08F,
            0xA685_5419,
            0xFD17_B448,
            0x0E11_08A8,
            0x5DA4_FBFC,
            0x26A3_C465,
            0x483A_DA77,
        ]),
        z: FieldElement::ONE,
    };

    /// Constructs a point from affine coordinates (sets `Z = 1`). The
    /// coordinates are not checked against the curve equation.
    pub const fn from_affine(x: FieldElement, y: FieldElement) -> Self {
        Self {
            x,
            y,
            z: FieldElement::ONE,
        }
    }

    /// Tests whether this is the point at infinity.
    ///
    /// Only the canonical `(0, 1, 0)` encoding qualifies; any other value
    /// with `Z = 0` is outside the type's invariant.
    pub fn is_identity(&self) -> Choice {
        self.x.is_zero() & !self.y.is_zero() & self.z.is_zero()
    }

    /// Tests whether this (normalized) point satisfies y² = x³ + 7.
    /// The identity is not considered on-curve.
    pub fn is_on_curve(&self) -> Choice {
        let lhs = self.y.square();
        let rhs = self.x.square().mul(&self.x).add(&CURVE_EQUATION_B);
        lhs.ct_eq(&rhs) & !self.is_identity()
    }

    /// Returns `self + other`.
    ///
    /// All special cases are folded in by masked selection:
    /// either operand may be the identity, the operands may be equal
    /// (doubling) or inverses of each other (identity result).
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let self_zero = self.is_identity();
        let other_zero = other.is_identity();

        // Candidate for the non-generic cases: 2P when the operands collide,
        // otherwise whichever operand is not the identity.
        let mut fallback = self.double();
        fallback.conditional_assign(other, self_zero);
        fallback.conditional_assign(self, other_zero);

        // Cross products; equal u means equal affine x, equal t equal affine y.
        let u0 = self.x.mul(&other.z);
        let u1 = other.x.mul(&self.z);
        let t0 = self.y.mul(&other.z);
        let t1 = other.y.mul(&self.z);
        let same_x = u0.ct_eq(&u1);
        let same_y = t0.ct_eq(&t1);

        // Generic addition formula over standard projective coordinates.
        let t = t0.sub(&t1);
        let u = u0.sub(&u1);
        let u2 = u.square();
        let v = self.z.mul(&other.z);
        let w = t.square().mul(&v).sub(&u2.mul(&u0.add(&u1)));
        let u3 = u.mul(&u2);
        let result = Self {
            x: u.mul(&w),
            y: t.mul(&u0.mul(&u2).sub(&w)).sub(&t0.mul(&u3)),
            z: v.mul(&u3),
        };

        let mut out = result;
        out.conditional_assign(&fallback, self_zero | other_zero | same_x);
        // P + (-P) = identity.
        out.conditional_assign(
            &Self::IDENTITY,
            !self_zero & !other_zero & same_x & !same_y,
        );
        out
    }

    /// Returns `2·self`, using the a = 0 doubling formula.
    #[must_use]
    pub fn double(&self) -> Self {
        let zero_result = self.is_identity() | self.y.is_zero();

        let u = self.y.mul(&self.z).double();
        let v = u.mul(&self.x).mul(&self.y).double();
        let x2 = self.x.square();
        let t = x2.double().add(&x2);
        let w = t.square().sub(&v.double());
        let uy = u.mul(&self.y);
        let result = Self {
            x: u.mul(&w),
            y: t.mul(&v.sub(&w)).sub(&uy.square().double()),
            z: u.square().mul(&u),
        };

        let mut out = result;
        out.conditional_assign(&Self::IDENTITY, zero_result);
        out
    }

    /// Returns `scalar · self` by a fixed 4-bit windowed method.
    ///
    /// The 16-entry table is walked with a constant-time linear scan for
    /// every window, so neither memory accesses nor timing depend on the
    /// scalar. Constant-time in the point as well.
    #[must_use]
    pub fn mul_scalar(&self, scalar: &Uint256) -> Self {
        // table[i] = i·self
        let mut table = [Self::IDENTITY; 16];
        table[1] = *self;
        table[2] = self.double();
        for i in 3..16 {
            table[i] = table[i - 1].add(self);
        }

        let words = scalar.to_words();
        let mut acc = Self::IDENTITY;
        let mut i = 256 - 4;
        loop {
            let window = (words[i >> 5] >> (i & 31)) & 15;
            let mut entry = Self::IDENTITY;
            for (j, candidate) in table.iter().enumerate() {
                entry.conditional_assign(candidate, (window as u8).ct_eq(&(j as u8)));
            }
            acc = acc.add(&entry);
            if i == 0 {
                break;
            }
            for _ in 0..4 {
                acc = acc.double();
            }
            i -= 4;
        }
        acc
    }

    /// Returns the normalized form of this point: `Z = 1` with the same
    /// affine coordinates, or the identity unchanged.
    ///
    /// Degenerate inputs with `Z = 0` that are not the canonical identity
    /// have no affine meaning; their nonzero coordinates are collapsed to 1
    /// so the operation stays total. Constant-time.
    #[must_use]
    pub fn normalize(&self) -> Self {
        let z_inv = self.z.invert();
        let norm = Self {
            x: self.x.mul(&z_inv),
            y: self.y.mul(&z_inv),
            z: FieldElement::ONE,
        };

        let mut out = *self;
        out.x
            .conditional_assign(&FieldElement::ONE, !out.x.is_zero());
        out.y
            .conditional_assign(&FieldElement::ONE, !out.y.is_zero());
        out.conditional_assign(&norm, !self.z.is_zero());
        out
    }

    /// Serializes this normalized point in 33-byte SEC1 compressed form:
    /// a parity tag of `0x02 | (y & 1)` followed by the big-endian x
    /// coordinate.
    pub fn to_compressed_point(&self) -> [u8; 33] {
        debug_assert!(bool::from(
            self.z.ct_eq(&FieldElement::ONE) | self.is_identity()
        ));
        let mut out = [0u8; 33];
        out[0] = 0x02 | self.y.is_odd().unwrap_u8();
        out[1..].copy_from_slice(&self.x.to_bytes());
        out
    }

    /// Parses a 33-byte compressed encoding, recovering the y coordinate by
    /// a modular square root. Returns `None` for a bad tag byte, an
    /// out-of-range x, or an x not on the curve.
    pub fn decompress(bytes: &[u8; 33]) -> CtOption<Self> {
        let tag = bytes[0];
        let tag_ok = Choice::from(((tag & 0xFE) == 0x02) as u8);
        let y_is_odd = Choice::from(tag & 1);
        let mut x_bytes = [0u8; 32];
        x_bytes.copy_from_slice(&bytes[1..]);

        FieldElement::from_bytes(&x_bytes).and_then(|x| {
            let alpha = x.square().mul(&x).add(&CURVE_EQUATION_B);
            alpha.sqrt().and_then(|beta| {
                let y = FieldElement::conditional_select(
                    &beta.negate(),
                    &beta,
                    !(beta.is_odd() ^ y_is_odd),
                );
                CtOption::new(Self::from_affine(x, y), tag_ok)
            })
        })
    }

    /// Computes the normalized public point `d·G` for a private exponent
    /// `d`, which must be in `[1, n)` (debug-asserted).
    pub fn mul_base(exponent: &Uint256) -> Self {
        debug_assert!(bool::from(
            !exponent.is_zero() & exponent.ct_lt(&CURVE_ORDER)
        ));
        Self::GENERATOR.mul_scalar(exponent).normalize()
    }
}

impl ConditionallySelectable for ProjectivePoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            z: FieldElement::conditional_select(&a.z, &b.z, choice),
        }
    }
}

impl ConstantTimeEq for ProjectivePoint {
    /// Coordinate-wise equality; meaningful on normalized points, where the
    /// representation of each group element (including the identity) is
    /// unique.
    fn ct_eq(&self, other: &Self) -> Choice {
        self.x.ct_eq(&other.x) & self.y.ct_eq(&other.y) & self.z.ct_eq(&other.z)
    }
}

impl PartialEq for ProjectivePoint {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for ProjectivePoint {}

impl Add<&ProjectivePoint> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::add(self, other)
    }
}

impl Add<&ProjectivePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::add(&self, other)
    }
}

impl AddAssign<&ProjectivePoint> for ProjectivePoint {
    fn add_assign(&mut self, rhs: &ProjectivePoint) {
        *self = ProjectivePoint::add(self, rhs);
    }
}

impl Mul<&Uint256> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn mul(self, scalar: &Uint256) -> ProjectivePoint {
        self.mul_scalar(scalar)
    }
}

#[cfg(test)]
mod tests {
    use super::ProjectivePoint;
    use crate::arithmetic::{uint256::Uint256, CURVE_ORDER};
    use proptest::prelude::*;
    use subtle::ConditionallySelectable;

    /// 2G in affine coordinates.
    const DOUBLE_GENERATOR_X: &str =
        "c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5";
    const DOUBLE_GENERATOR_Y: &str =
        "1ae168fea63dc339a3c58419466ceaeef7f632653266d0e1236431a950cfe52a";

    fn small_scalar(k: u32) -> Uint256 {
        Uint256::from_words([k, 0, 0, 0, 0, 0, 0, 0])
    }

    #[test]
    fn generator_is_on_curve() {
        assert!(bool::from(ProjectivePoint::GENERATOR.is_on_curve()));
    }

    #[test]
    fn identity_encoding() {
        let id = ProjectivePoint::IDENTITY;
        assert!(bool::from(id.is_identity()));
        assert!(!bool::from(id.is_on_curve()));
        // normalize() leaves the identity untouched.
        assert_eq!(id.normalize(), id);
    }

    #[test]
    fn identity_addition() {
        let g = ProjectivePoint::GENERATOR;
        assert_eq!(ProjectivePoint::IDENTITY.add(&g), g);
        assert_eq!(g.add(&ProjectivePoint::IDENTITY), g);
        assert!(bool::from(
            ProjectivePoint::IDENTITY
                .add(&ProjectivePoint::IDENTITY)
                .is_identity()
        ));
    }

    #[test]
    fn add_vs_double() {
        let g = ProjectivePoint::GENERATOR;
        let sum = g.add(&g).normalize();
        let twice = g.double().normalize();
        assert_eq!(sum, twice);
        assert_eq!(hex::encode(twice.x.to_bytes()), DOUBLE_GENERATOR_X);
        assert_eq!(hex::encode(twice.y.to_bytes()), DOUBLE_GENERATOR_Y);
    }

    #[test]
    fn inverse_pair_sums_to_identity() {
        let g = ProjectivePoint::GENERATOR;
        let neg_g = ProjectivePoint {
            x: g.x,
            y: g.y.negate(),
            z: g.z,
        };
        assert!(bool::from(g.add(&neg_g).is_identity()));
    }

    #[test]
    fn scalar_multiples_match_repeated_addition() {
        let g = ProjectivePoint::GENERATOR;
        let mut expected = ProjectivePoint::IDENTITY;
        for k in 0..=20u32 {
            let got = g.mul_scalar(&small_scalar(k));
            assert_eq!(got.normalize(), expected.normalize());
            expected = expected.add(&g);
        }
    }

    #[test]
    fn order_times_generator_is_identity() {
        let result = ProjectivePoint::GENERATOR.mul_scalar(&CURVE_ORDER);
        assert!(bool::from(result.is_identity()));
    }

    #[test]
    fn mul_base_small_exponents() {
        let g1 = ProjectivePoint::mul_base(&Uint256::ONE);
        assert_eq!(g1, ProjectivePoint::GENERATOR);
        let g2 = ProjectivePoint::mul_base(&small_scalar(2));
        assert_eq!(hex::encode(g2.x.to_bytes()), DOUBLE_GENERATOR_X);
        assert_eq!(hex::encode(g2.y.to_bytes()), DOUBLE_GENERATOR_Y);
    }

    #[test]
    fn compressed_roundtrip() {
        for k in 1..=10u32 {
            let p = ProjectivePoint::mul_base(&small_scalar(k));
            let compressed = p.to_compressed_point();
            let recovered = ProjectivePoint::decompress(&compressed).unwrap();
            assert_eq!(recovered, p);
        }
    }

    #[test]
    fn decompress_rejects_bad_tag() {
        let mut compressed = ProjectivePoint::GENERATOR.to_compressed_point();
        compressed[0] = 0x04;
        assert!(bool::from(
            ProjectivePoint::decompress(&compressed).is_none()
        ));
    }

    #[test]
    fn conditional_select_works() {
        let a = ProjectivePoint::IDENTITY;
        let b = ProjectivePoint::GENERATOR;
        assert_eq!(
            ProjectivePoint::conditional_select(&a, &b, 0u8.into()),
            a
        );
        assert_eq!(
            ProjectivePoint::conditional_select(&a, &b, 1u8.into()),
            b
        );
    }

    proptest! {
        // Keep the case count small: every case runs several full
        // constant-time scalar multiplications.
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn scalar_mul_distributes_over_addition(k in 1u32..1000, m in 1u32..1000) {
            let g = ProjectivePoint::GENERATOR;
            let lhs = g.mul_scalar(&small_scalar(k + m));
            let rhs = g.mul_scalar(&small_scalar(k)).add(&g.mul_scalar(&small_scalar(m)));
            prop_assert_eq!(lhs.normalize(), rhs.normalize());
        }

        #[test]
        fn on_curve_preserved(k in 1u32..1000) {
            let p = ProjectivePoint::GENERATOR.mul_scalar(&small_scalar(k));
            prop_assert!(bool::from(p.normalize().is_on_curve()));
            prop_assert!(bool::from(p.double().normalize().is_on_curve()));
        }
    }
}

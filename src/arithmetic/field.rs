//! Field arithmetic modulo the secp256k1 prime.

use super::uint256::{Uint256, NUM_WORDS};
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use subtle::{
    Choice, ConditionallySelectable, ConstantTimeEq, ConstantTimeGreater, ConstantTimeLess,
    CtOption,
};

/// The secp256k1 base-field prime, p = 2^256 - 2^32 - 977.
pub const MODULUS: Uint256 = Uint256::from_words([
    0xFFFF_FC2F,
    0xFFFF_FFFE,
    0xFFFF_FFFF,
    0xFFFF_FFFF,
    0xFFFF_FFFF,
    0xFFFF_FFFF,
    0xFFFF_FFFF,
    0xFFFF_FFFF,
]);

/// Low part of 2^256 - p = 2^32 + 977, as used by the Barrett reduction.
const MODULUS_COMPLEMENT_LOW: u64 = 0x3D1;

/// (p + 1) / 4. Since p ≡ 3 (mod 4), raising to this exponent computes a
/// square root of any quadratic residue.
const SQRT_EXPONENT: Uint256 = Uint256::from_words([
    0xBFFF_FF0C,
    0xFFFF_FFFF,
    0xFFFF_FFFF,
    0xFFFF_FFFF,
    0xFFFF_FFFF,
    0xFFFF_FFFF,
    0xFFFF_FFFF,
    0x3FFF_FFFF,
]);

/// An element of the secp256k1 base field.
///
/// The wrapped integer is always in the range `[0, p)`; every constructor
/// and every public operation re-establishes that invariant before
/// returning. All operations are constant-time in the operand values; the
/// trailing "reduce if out of range" steps are data-oblivious conditional
/// subtractions, never branches.
#[derive(Clone, Copy, Debug, Default)]
pub struct FieldElement(pub(crate) Uint256);

impl FieldElement {
    /// The additive identity.
    pub const ZERO: Self = Self(Uint256::ZERO);

    /// The multiplicative identity.
    pub const ONE: Self = Self(Uint256::ONE);

    /// Constructs a field element from little-endian words without checking
    /// the range invariant. For compile-time constants known to be in range.
    pub(crate) const fn from_words_unchecked(words: [u32; NUM_WORDS]) -> Self {
        Self(Uint256::from_words(words))
    }

    /// Attempts to parse a big-endian byte encoding of a field element.
    ///
    /// Returns `None` (in constant time) if the value is not below `p`.
    pub fn from_bytes(bytes: &[u8; 32]) -> CtOption<Self> {
        let inner = Uint256::from_be_bytes(bytes);
        CtOption::new(Self(inner), inner.ct_lt(&MODULUS))
    }

    /// Constructs a field element from an arbitrary 256-bit integer,
    /// reducing it modulo `p`.
    ///
    /// Any `Uint256` is at most `2p - 1`, so a single conditional
    /// subtraction restores the invariant.
    pub fn from_uint_reduced(value: Uint256) -> Self {
        let mut inner = value;
        let ge = !inner.ct_lt(&MODULUS);
        inner.conditional_sub_assign(&MODULUS, ge);
        Self(inner)
    }

    /// Parses a 64-character big-endian hexadecimal string, rejecting values
    /// not below `p`. Not constant-time.
    pub fn from_hex(s: &str) -> Option<Self> {
        let inner = Uint256::from_hex(s)?;
        if bool::from(inner.ct_lt(&MODULUS)) {
            Some(Self(inner))
        } else {
            None
        }
    }

    /// Returns the big-endian byte encoding of this element.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_be_bytes()
    }

    /// Tests whether this element is zero.
    pub fn is_zero(&self) -> Choice {
        self.0.is_zero()
    }

    /// Tests whether this element is an odd integer.
    pub fn is_odd(&self) -> Choice {
        self.0.is_odd()
    }

    /// Returns `self + rhs mod p`.
    #[must_use]
    pub fn add(&self, rhs: &Self) -> Self {
        let mut out = self.0;
        let carry = out.conditional_add_assign(&rhs.0, Choice::from(1));
        let reduce = carry | !out.ct_lt(&MODULUS);
        out.conditional_sub_assign(&MODULUS, reduce);
        Self(out)
    }

    /// Returns `self - rhs mod p`.
    #[must_use]
    pub fn sub(&self, rhs: &Self) -> Self {
        let mut out = self.0;
        let borrow = out.conditional_sub_assign(&rhs.0, Choice::from(1));
        out.conditional_add_assign(&MODULUS, borrow);
        Self(out)
    }

    /// Returns `2·self mod p`.
    #[must_use]
    pub fn double(&self) -> Self {
        let mut out = self.0;
        let carry = out.shl1_assign();
        let reduce = carry | !out.ct_lt(&MODULUS);
        out.conditional_sub_assign(&MODULUS, reduce);
        Self(out)
    }

    /// Returns `-self mod p`.
    #[must_use]
    pub fn negate(&self) -> Self {
        let mut out = MODULUS;
        out.conditional_sub_assign(&self.0, Choice::from(1));
        // p - 0 = p must fold back onto the canonical zero.
        out.conditional_assign(&Uint256::ZERO, self.0.is_zero());
        Self(out)
    }

    /// Returns `self² mod p`.
    #[must_use]
    pub fn square(&self) -> Self {
        self.mul(self)
    }

    /// Returns `self · rhs mod p` using Barrett reduction.
    ///
    /// The raw 512-bit product is multiplied by ⌊2^512 / p⌋, which for this
    /// prime is exactly 2^256 + 2^32 + 977; the high 256 bits of that
    /// 768-bit value, times p, subtracted from the raw product, leave a
    /// 257-bit value in `[0, 2p)` that one conditional subtraction
    /// canonicalizes.
    #[must_use]
    pub fn mul(&self, rhs: &Self) -> Self {
        let a = &self.0 .0;
        let b = &rhs.0 .0;

        // Raw product of the two 256-bit operands, by 8×8 long
        // multiplication of 32-bit words.
        let mut product0 = [0u32; NUM_WORDS * 2];
        for i in 0..NUM_WORDS {
            let mut carry = 0u64;
            for j in 0..NUM_WORDS {
                let t = (a[i] as u64) * (b[j] as u64) + (product0[i + j] as u64) + carry;
                product0[i + j] = t as u32;
                carry = t >> 32;
            }
            product0[i + NUM_WORDS] = carry as u32;
        }

        // product1 = product0 · (2^256 + 2^32 + 977), fits in 768 bits.
        let mut product1 = [0u32; NUM_WORDS * 3];
        let mut carry = 0u32;
        for (i, out) in product1.iter_mut().enumerate() {
            let mut sum = carry as u64;
            if i < NUM_WORDS * 2 {
                sum += (product0[i] as u64) * MODULUS_COMPLEMENT_LOW;
            }
            if i >= 1 && i < NUM_WORDS * 2 + 1 {
                sum += product0[i - 1] as u64;
            }
            if i >= NUM_WORDS {
                sum += product0[i - NUM_WORDS] as u64;
            }
            *out = sum as u32;
            carry = (sum >> 32) as u32;
        }
        debug_assert_eq!(carry, 0);

        // product2 = (product1 >> 512) · p. Because p = 2^256 - 2^32 - 977,
        // this is a shift minus two small convolution terms; fits 512 bits.
        let p1_shifted = &product1[NUM_WORDS * 2..];
        let mut product2 = [0u32; NUM_WORDS * 2];
        let mut borrow = 0u32;
        for (i, out) in product2.iter_mut().enumerate() {
            let mut diff = (borrow as u64).wrapping_neg();
            if i < NUM_WORDS {
                diff = diff.wrapping_sub((p1_shifted[i] as u64) * MODULUS_COMPLEMENT_LOW);
            }
            if i >= 1 && i < NUM_WORDS + 1 {
                diff = diff.wrapping_sub(p1_shifted[i - 1] as u64);
            }
            if i >= NUM_WORDS {
                diff = diff.wrapping_add(p1_shifted[i - NUM_WORDS] as u64);
            }
            *out = diff as u32;
            borrow = ((diff >> 32) as u32).wrapping_neg();
        }
        debug_assert_eq!(borrow, 0);

        // difference = product0 - product2 fits in 257 bits and is congruent
        // to the product modulo p.
        let mut difference = [0u32; NUM_WORDS + 1];
        let mut borrow = 0u32;
        for (i, out) in difference.iter_mut().enumerate() {
            let diff = (product0[i] as u64)
                .wrapping_sub(product2[i] as u64)
                .wrapping_sub(borrow as u64);
            *out = diff as u32;
            borrow = ((diff >> 32) as u32).wrapping_neg();
        }

        let mut words = [0u32; NUM_WORDS];
        words.copy_from_slice(&difference[..NUM_WORDS]);
        let mut out = Uint256::from_words(words);
        let reduce = !difference[NUM_WORDS].ct_eq(&0) | !out.ct_lt(&MODULUS);
        out.conditional_sub_assign(&MODULUS, reduce);
        Self(out)
    }

    /// Returns the multiplicative inverse of this element, or zero when the
    /// element is zero. Delegates to the fixed-iteration binary GCD.
    #[must_use]
    pub fn invert(&self) -> Self {
        let mut out = self.0;
        out.invert_mod_assign(&MODULUS);
        Self(out)
    }

    /// Returns a square root of this element, if one exists.
    pub fn sqrt(&self) -> CtOption<Self> {
        // Fixed square-and-multiply ladder over the public exponent
        // (p + 1) / 4.
        let mut result = Self::ONE;
        let mut i = NUM_WORDS * 32;
        while i > 0 {
            i -= 1;
            result = result.square();
            if bool::from(SQRT_EXPONENT.bit(i)) {
                result = result.mul(self);
            }
        }
        CtOption::new(result, result.square().ct_eq(self))
    }
}

impl From<FieldElement> for Uint256 {
    /// Forgets the field structure, keeping the canonical representative.
    fn from(fe: FieldElement) -> Uint256 {
        fe.0
    }
}

impl ConditionallySelectable for FieldElement {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self(Uint256::conditional_select(&a.0, &b.0, choice))
    }
}

impl ConstantTimeEq for FieldElement {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl ConstantTimeGreater for FieldElement {
    fn ct_gt(&self, other: &Self) -> Choice {
        self.0.ct_gt(&other.0)
    }
}

impl ConstantTimeLess for FieldElement {
    fn ct_lt(&self, other: &Self) -> Choice {
        self.0.ct_lt(&other.0)
    }
}

impl PartialEq for FieldElement {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for FieldElement {}

impl Add<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    fn add(self, other: &FieldElement) -> FieldElement {
        FieldElement::add(self, other)
    }
}

impl Add<&FieldElement> for FieldElement {
    type Output = FieldElement;

    fn add(self, other: &FieldElement) -> FieldElement {
        FieldElement::add(&self, other)
    }
}

impl AddAssign<&FieldElement> for FieldElement {
    fn add_assign(&mut self, other: &FieldElement) {
        *self = FieldElement::add(self, other);
    }
}

impl Sub<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    fn sub(self, other: &FieldElement) -> FieldElement {
        FieldElement::sub(self, other)
    }
}

impl Sub<&FieldElement> for FieldElement {
    type Output = FieldElement;

    fn sub(self, other: &FieldElement) -> FieldElement {
        FieldElement::sub(&self, other)
    }
}

impl SubAssign<&FieldElement> for FieldElement {
    fn sub_assign(&mut self, other: &FieldElement) {
        *self = FieldElement::sub(self, other);
    }
}

impl Mul<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    fn mul(self, other: &FieldElement) -> FieldElement {
        FieldElement::mul(self, other)
    }
}

impl Mul<&FieldElement> for FieldElement {
    type Output = FieldElement;

    fn mul(self, other: &FieldElement) -> FieldElement {
        FieldElement::mul(&self, other)
    }
}

impl MulAssign<&FieldElement> for FieldElement {
    fn mul_assign(&mut self, other: &FieldElement) {
        *self = FieldElement::mul(self, other);
    }
}

impl Neg for FieldElement {
    type Output = FieldElement;

    fn neg(self) -> FieldElement {
        self.negate()
    }
}

//! Fixed-width 256-bit unsigned integer arithmetic.

use subtle::{
    Choice, ConditionallySelectable, ConstantTimeEq, ConstantTimeGreater, ConstantTimeLess,
};
use zeroize::DefaultIsZeroes;

/// Number of 32-bit words in a [`Uint256`].
pub(crate) const NUM_WORDS: usize = 8;

/// An unsigned 256-bit integer, represented as eight 32-bit words in
/// little-endian order.
///
/// All arithmetic is performed modulo 2^256 with standard unsigned wrapping;
/// every bit pattern is a valid value. Operations taking an `enable`
/// [`Choice`] run their full fixed word loop whether or not the flag is set,
/// so execution time depends only on the word count, never on operand values
/// or the flag.
///
/// For example, the integer
/// `0x0123456789ABCDEF000000001111111122222222333333334444444455555555`
/// is represented by the words
/// `[0x55555555, 0x44444444, 0x33333333, 0x22222222, 0x11111111, 0x00000000,
/// 0x89ABCDEF, 0x01234567]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Uint256(pub(crate) [u32; NUM_WORDS]);

impl Uint256 {
    /// The value 0.
    pub const ZERO: Self = Self([0; NUM_WORDS]);

    /// The value 1.
    pub const ONE: Self = Self([1, 0, 0, 0, 0, 0, 0, 0]);

    /// Constructs an integer from little-endian 32-bit words.
    pub const fn from_words(words: [u32; NUM_WORDS]) -> Self {
        Self(words)
    }

    /// Returns the little-endian words of this integer.
    pub const fn to_words(self) -> [u32; NUM_WORDS] {
        self.0
    }

    /// Parses a 64-character big-endian hexadecimal string.
    ///
    /// Returns `None` on any other length or any non-hex character.
    /// Not constant-time; intended for constants and test fixtures.
    pub fn from_hex(s: &str) -> Option<Self> {
        if s.len() != NUM_WORDS * 8 || !s.is_ascii() {
            return None;
        }
        let mut words = [0u32; NUM_WORDS];
        for (i, c) in s.bytes().rev().enumerate() {
            let digit = (c as char).to_digit(16)?;
            words[i >> 3] |= digit << ((i & 7) << 2);
        }
        Some(Self(words))
    }

    /// Constructs an integer from 32 big-endian bytes.
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        let mut words = [0u32; NUM_WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            let j = (NUM_WORDS - 1 - i) * 4;
            *word = u32::from_be_bytes([bytes[j], bytes[j + 1], bytes[j + 2], bytes[j + 3]]);
        }
        Self(words)
    }

    /// Writes this integer as 32 big-endian bytes.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (i, word) in self.0.iter().enumerate() {
            let j = (NUM_WORDS - 1 - i) * 4;
            bytes[j..j + 4].copy_from_slice(&word.to_be_bytes());
        }
        bytes
    }

    /// Tests whether this integer is zero.
    pub fn is_zero(&self) -> Choice {
        self.ct_eq(&Self::ZERO)
    }

    /// Tests whether this integer is odd.
    pub fn is_odd(&self) -> Choice {
        Choice::from((self.0[0] & 1) as u8)
    }

    /// Returns the given bit (0 = least significant) as a [`Choice`].
    pub(crate) fn bit(&self, index: usize) -> Choice {
        debug_assert!(index < NUM_WORDS * 32);
        Choice::from(((self.0[index >> 5] >> (index & 31)) & 1) as u8)
    }

    /// Adds `other` into `self` modulo 2^256 when `enable` is set, returning
    /// the carry-out bit. When `enable` is clear, `self` is unchanged and the
    /// carry is zero; the full word loop runs either way.
    pub fn conditional_add_assign(&mut self, other: &Self, enable: Choice) -> Choice {
        let mut carry = 0u32;
        for i in 0..NUM_WORDS {
            let addend = u32::conditional_select(&0, &other.0[i], enable);
            let sum = (self.0[i] as u64) + (addend as u64) + (carry as u64);
            self.0[i] = sum as u32;
            carry = (sum >> 32) as u32;
        }
        Choice::from(carry as u8)
    }

    /// Subtracts `other` from `self` modulo 2^256 when `enable` is set,
    /// returning the borrow-out bit. Constant-time like
    /// [`conditional_add_assign`][Self::conditional_add_assign].
    pub fn conditional_sub_assign(&mut self, other: &Self, enable: Choice) -> Choice {
        let mut borrow = 0u32;
        for i in 0..NUM_WORDS {
            let subtrahend = u32::conditional_select(&0, &other.0[i], enable);
            let diff = (self.0[i] as u64)
                .wrapping_sub(subtrahend as u64)
                .wrapping_sub(borrow as u64);
            self.0[i] = diff as u32;
            borrow = ((diff >> 32) as u32).wrapping_neg();
        }
        Choice::from(borrow as u8)
    }

    /// Shifts this integer left by one bit modulo 2^256 and returns the old
    /// top bit.
    pub fn shl1_assign(&mut self) -> Choice {
        let mut prev = 0u32;
        for i in 0..NUM_WORDS {
            let cur = self.0[i];
            self.0[i] = (cur << 1) | (prev >> 31);
            prev = cur;
        }
        Choice::from((prev >> 31) as u8)
    }

    /// Shifts this integer right by one bit (flooring halve) when `enable`
    /// is set. Does not leak the flag through timing.
    pub fn conditional_shr1_assign(&mut self, enable: Choice) {
        let mut cur = self.0[0];
        for i in 0..NUM_WORDS - 1 {
            let next = self.0[i + 1];
            let shifted = (cur >> 1) | (next << 31);
            self.0[i] = u32::conditional_select(&cur, &shifted, enable);
            cur = next;
        }
        self.0[NUM_WORDS - 1] = u32::conditional_select(&cur, &(cur >> 1), enable);
    }

    /// Replaces `self` with its multiplicative inverse modulo `modulus`.
    ///
    /// `modulus` must be odd and greater than one, and `self` must be less
    /// than `modulus`; these are contract preconditions checked only by debug
    /// assertions. A zero input stays zero.
    ///
    /// Extended binary GCD, driven for a fixed 512 iterations so that the
    /// running time is independent of both operand values. Loop invariant:
    /// `x = a·self mod modulus` and `y = b·self mod modulus`, with `x` odd
    /// throughout.
    pub fn invert_mod_assign(&mut self, modulus: &Self) {
        debug_assert!(bool::from(modulus.is_odd()));
        debug_assert!(bool::from(Self::ONE.ct_lt(modulus)));
        debug_assert!(bool::from(self.ct_lt(modulus)));

        let mut x = *modulus;
        let mut y = *self;
        let mut a = Self::ZERO;
        let mut b = Self::ONE;
        let mut half_modulus = *modulus;
        half_modulus.conditional_add_assign(&Self::ONE, Choice::from(1));
        half_modulus.conditional_shr1_assign(Choice::from(1));

        for _ in 0..NUM_WORDS * 32 * 2 {
            // Try to strip a trailing zero of y. Pseudocode:
            // if (y % 2 == 0) {
            //     y /= 2
            //     b = b % 2 == 0 ? b / 2 : modulus - (modulus - b) / 2
            // }
            debug_assert!(bool::from(x.is_odd()));
            let y_even = !y.is_odd();
            let b_odd = b.is_odd();
            y.conditional_shr1_assign(y_even);
            b.conditional_shr1_assign(y_even);
            b.conditional_add_assign(&half_modulus, y_even & b_odd);

            // If allowed, order the pairs so that y >= x, then reduce y by x.
            // Pseudocode:
            // if (y % 2 == 1) {
            //     if (x > y) {
            //         x, y = y, x
            //         a, b = b, a
            //     }
            //     y -= x
            //     b -= a
            //     b %= modulus
            // }
            let enable = y.is_odd();
            let doswap = enable & x.ct_gt(&y);
            Self::conditional_swap(&mut x, &mut y, doswap);
            y.conditional_sub_assign(&x, enable);
            Self::conditional_swap(&mut a, &mut b, doswap);
            let borrow = b.conditional_sub_assign(&a, enable);
            b.conditional_add_assign(modulus, borrow);
        }

        // x = 1 iff gcd(self, modulus) = 1; the only other possibility under
        // the preconditions is self = 0, which leaves x = modulus and a = 0.
        debug_assert!(bool::from(x.ct_eq(&Self::ONE) | x.ct_eq(modulus)));
        let nonzero = !self.is_zero();
        self.conditional_assign(&a, nonzero);
    }
}

/// Constant-time "less than" over the word arrays, scanning from the least
/// significant word up so that the highest differing word decides.
fn ct_lt_words(lhs: &Uint256, rhs: &Uint256) -> Choice {
    let mut result = Choice::from(0);
    for i in 0..NUM_WORDS {
        let eq = lhs.0[i].ct_eq(&rhs.0[i]);
        result = Choice::conditional_select(&lhs.0[i].ct_lt(&rhs.0[i]), &result, eq);
    }
    result
}

impl ConditionallySelectable for Uint256 {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        let mut words = [0u32; NUM_WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            *word = u32::conditional_select(&a.0[i], &b.0[i], choice);
        }
        Self(words)
    }
}

impl ConstantTimeEq for Uint256 {
    fn ct_eq(&self, other: &Self) -> Choice {
        let mut diff = 0u32;
        for i in 0..NUM_WORDS {
            diff |= self.0[i] ^ other.0[i];
        }
        diff.ct_eq(&0)
    }
}

impl ConstantTimeGreater for Uint256 {
    fn ct_gt(&self, other: &Self) -> Choice {
        ct_lt_words(other, self)
    }
}

impl ConstantTimeLess for Uint256 {
    fn ct_lt(&self, other: &Self) -> Choice {
        ct_lt_words(self, other)
    }
}

impl PartialEq for Uint256 {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Uint256 {}

impl DefaultIsZeroes for Uint256 {}

/// Bridges to the reference big-integer type, for test oracles only.
#[cfg(test)]
impl Uint256 {
    pub(crate) fn to_biguint(&self) -> num_bigint::BigUint {
        num_bigint::BigUint::from_bytes_be(&self.to_be_bytes())
    }

    /// Panics if the value does not fit in 256 bits.
    pub(crate) fn from_biguint(value: &num_bigint::BigUint) -> Self {
        let digits = value.to_bytes_be();
        assert!(digits.len() <= 32);
        let mut bytes = [0u8; 32];
        bytes[32 - digits.len()..].copy_from_slice(&digits);
        Self::from_be_bytes(&bytes)
    }
}

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// 192-bit unsigned integer stored as 3 little-endian u64 limbs.
///
/// Wide enough to accumulate cumulative proof-of-work over the lifetime of
/// the DAG without the allocation cost of an arbitrary-precision type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Uint192([u64; 3]);

impl Uint192 {
    pub const ZERO: Uint192 = Uint192([0, 0, 0]);
    pub const MAX: Uint192 = Uint192([u64::MAX; 3]);

    pub const fn from_limbs(limbs: [u64; 3]) -> Self {
        Self(limbs)
    }

    pub const fn as_limbs(&self) -> &[u64; 3] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0, 0, 0]
    }

    /// Returns little-endian bytes (24 bytes)
    pub fn to_le_bytes(&self) -> [u8; 24] {
        let mut out = [0u8; 24];
        out[0..8].copy_from_slice(&self.0[0].to_le_bytes());
        out[8..16].copy_from_slice(&self.0[1].to_le_bytes());
        out[16..24].copy_from_slice(&self.0[2].to_le_bytes());
        out
    }

    pub fn from_le_bytes(bytes: [u8; 24]) -> Self {
        Self([
            u64::from_le_bytes(bytes[0..8].try_into().unwrap()),
            u64::from_le_bytes(bytes[8..16].try_into().unwrap()),
            u64::from_le_bytes(bytes[16..24].try_into().unwrap()),
        ])
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        let mut limbs = [0u64; 3];
        let mut carry = false;
        for i in 0..3 {
            let (sum, overflow_a) = self.0[i].overflowing_add(rhs.0[i]);
            let (sum, overflow_b) = sum.overflowing_add(carry as u64);
            limbs[i] = sum;
            carry = overflow_a | overflow_b;
        }
        if carry {
            None
        } else {
            Some(Self(limbs))
        }
    }
}

impl From<u64> for Uint192 {
    fn from(value: u64) -> Self {
        Self([value, 0, 0])
    }
}

impl PartialOrd for Uint192 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Uint192 {
    fn cmp(&self, other: &Self) -> Ordering {
        // Compare from the most significant limb down
        for i in (0..3).rev() {
            match self.0[i].cmp(&other.0[i]) {
                Ordering::Equal => continue,
                ordering => return ordering,
            }
        }
        Ordering::Equal
    }
}

impl AddAssign for Uint192 {
    fn add_assign(&mut self, rhs: Self) {
        *self = self.checked_add(rhs).expect("cumulative work cannot overflow 192 bits");
    }
}

impl Add for Uint192 {
    type Output = Uint192;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl Sum for Uint192 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, item| acc + item)
    }
}

impl fmt::Display for Uint192 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Big-endian hex without leading zero limbs, lowercase
        let bytes = self.to_le_bytes();
        let mut seen_nonzero = false;
        for byte in bytes.iter().rev() {
            if !seen_nonzero && *byte == 0 {
                continue;
            }
            if seen_nonzero {
                write!(f, "{byte:02x}")?;
            } else {
                write!(f, "{byte:x}")?;
                seen_nonzero = true;
            }
        }
        if !seen_nonzero {
            write!(f, "0")?;
        }
        Ok(())
    }
}

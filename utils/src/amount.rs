use std::fmt;

/// Number of sompi in one VEXA coin
pub const SOMPI_PER_VEXA: u64 = 100_000_000;

/// Upper bound on circulating supply, in sompi
pub const MAX_SOMPI: u64 = 2_900_000_000_000_000;

/// A monetary amount counted in sompi, the base unit (10^-8 of one coin)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_sompi(sompi: u64) -> Self {
        Self(sompi)
    }

    pub const fn from_vexa(coins: u64) -> Self {
        Self(coins * SOMPI_PER_VEXA)
    }

    pub const fn sompi(&self) -> u64 {
        self.0
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).filter(|total| *total <= MAX_SOMPI).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let coins = self.0 / SOMPI_PER_VEXA;
        let fraction = self.0 % SOMPI_PER_VEXA;
        if fraction == 0 {
            write!(f, "{coins} VEXA")
        } else {
            let text = format!("{fraction:08}");
            write!(f, "{coins}.{} VEXA", text.trim_end_matches('0'))
        }
    }
}

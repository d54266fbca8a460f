/// Current block version
pub const BLOCK_VERSION: u16 = 1;

/// Number of sompi (base units) in one Vexa coin
pub const SOMPI_PER_VEXA: u64 = 100_000_000;

/// Upper bound on circulating supply, in sompi
pub const MAX_SOMPI: u64 = 2_900_000_000_000_000;

/// Initial block subsidy, in sompi
pub const INITIAL_SUBSIDY: u64 = 50 * SOMPI_PER_VEXA;

/// Number of DAA score units a coinbase output must age before it is spendable
pub const COINBASE_MATURITY: u64 = 100;

/// Size in bytes of a subnetwork identifier
pub const SUBNETWORK_ID_SIZE: usize = 20;

use crate::config::genesis::{GenesisBlock, DEVNET_GENESIS, GENESIS, SIMNET_GENESIS, TESTNET_GENESIS};
use crate::{BlockLevel, KType};
use once_cell::sync::Lazy;

/// Consensus parameters. Chain constants are grouped here so a network is
/// fully described by one value.
#[derive(Clone, Debug)]
pub struct Params {
    /// Network name, also the address prefix
    pub network_name: &'static str,
    /// GHOSTDAG K: the maximum anticone size of a blue block
    pub ghostdag_k: KType,
    pub max_block_parents: usize,
    /// Upper bound on a block's merge set; blocks over it are invalid
    pub mergeset_size_limit: u64,
    /// Number of selected-chain blocks feeding the difficulty window
    pub difficulty_window_size: usize,
    /// Expected time between blocks, in milliseconds
    pub target_time_per_block: u64,
    /// Number of selected-chain timestamps feeding the median-time rule
    pub past_median_time_window_size: usize,
    /// How far ahead of wall clock a timestamp may be, in milliseconds
    pub max_block_time_offset: u64,
    pub max_block_level: BlockLevel,
    pub max_block_mass: u64,
    pub mass_per_tx_byte: u64,
    pub mass_per_script_pub_key_byte: u64,
    pub mass_per_sig_op: u64,
    pub genesis: GenesisBlock,
}

impl Params {
    pub fn mainnet() -> Self {
        Self {
            network_name: "vexa",
            ghostdag_k: 18,
            max_block_parents: 10,
            mergeset_size_limit: 180,
            difficulty_window_size: 264,
            target_time_per_block: 1000,
            past_median_time_window_size: 11,
            max_block_time_offset: 2 * 3600 * 1000,
            max_block_level: 225,
            max_block_mass: 500_000,
            mass_per_tx_byte: 1,
            mass_per_script_pub_key_byte: 10,
            mass_per_sig_op: 1000,
            genesis: GENESIS,
        }
    }

    pub fn testnet() -> Self {
        Self { network_name: "vexatest", genesis: TESTNET_GENESIS, ..Self::mainnet() }
    }

    pub fn devnet() -> Self {
        Self { network_name: "vexadev", max_block_level: 250, genesis: DEVNET_GENESIS, ..Self::mainnet() }
    }

    /// Simulation network: maximal-ease PoW so tests can mine inline
    pub fn simnet() -> Self {
        Self { network_name: "vexasim", max_block_level: 250, genesis: SIMNET_GENESIS, ..Self::mainnet() }
    }
}

pub static MAINNET_PARAMS: Lazy<Params> = Lazy::new(Params::mainnet);
pub static TESTNET_PARAMS: Lazy<Params> = Lazy::new(Params::testnet);
pub static DEVNET_PARAMS: Lazy<Params> = Lazy::new(Params::devnet);
pub static SIMNET_PARAMS: Lazy<Params> = Lazy::new(Params::simnet);

pub mod address;
pub mod amount;

pub use serde_bytes;

pub mod hex {
    /// Small ToHex trait used by the consensus core for debug output
    pub trait ToHex {
        fn to_hex(&self) -> String;
    }

    impl ToHex for Vec<u8> {
        fn to_hex(&self) -> String {
            hex::encode(self)
        }
    }

    impl ToHex for [u8] {
        fn to_hex(&self) -> String {
            hex::encode(self)
        }
    }
}

pub mod mem_size {
    /// Trait to estimate the memory footprint of cached values
    pub trait MemSizeEstimator {
        fn estimate_mem_bytes(&self) -> usize {
            std::mem::size_of_val(self)
        }
    }
}

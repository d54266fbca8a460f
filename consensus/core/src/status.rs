use serde::{Deserialize, Serialize};

/// The validation state of a block, persisted as a single byte.
///
/// A block enters as `HeaderOnly`, moves to `UtxoPendingVerification` once
/// its body is accepted, and settles as `Valid` or `Disqualified`. `Invalid`
/// is terminal and bars resubmission. Apart from the pending transition the
/// status is append-once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlockStatus {
    HeaderOnly = 1,
    UtxoPendingVerification = 2,
    Valid = 3,
    Disqualified = 4,
    Invalid = 5,
}

impl BlockStatus {
    pub fn has_block_body(self) -> bool {
        matches!(self, Self::UtxoPendingVerification | Self::Valid | Self::Disqualified)
    }

    pub fn is_invalid(self) -> bool {
        self == Self::Invalid
    }

    /// Whether the block participates in consensus (its header was accepted)
    pub fn is_valid(self) -> bool {
        self != Self::Invalid
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::HeaderOnly),
            2 => Some(Self::UtxoPendingVerification),
            3 => Some(Self::Valid),
            4 => Some(Self::Disqualified),
            5 => Some(Self::Invalid),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BlockStatus;

    #[test]
    fn byte_codec_roundtrip() {
        for status in [
            BlockStatus::HeaderOnly,
            BlockStatus::UtxoPendingVerification,
            BlockStatus::Valid,
            BlockStatus::Disqualified,
            BlockStatus::Invalid,
        ] {
            assert_eq!(BlockStatus::from_u8(status.to_u8()), Some(status));
        }
        assert_eq!(BlockStatus::from_u8(0), None);
        assert_eq!(BlockStatus::from_u8(6), None);
    }
}

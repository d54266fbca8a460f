use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// The version of a script public key, selecting the script semantics
pub type ScriptPublicKeyVersion = u16;

/// Inline capacity covers a standard pay-to-pubkey script plus opcodes
pub const SCRIPT_VECTOR_SIZE: usize = 36;

/// Script bytes; standard scripts stay on the stack
pub type ScriptVec = SmallVec<[u8; SCRIPT_VECTOR_SIZE]>;

/// A script paired with the version that defines how to interpret it.
/// Scripts are opaque to the consensus core; execution lives behind the
/// script-engine seam.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptPublicKey {
    version: ScriptPublicKeyVersion,
    script: ScriptVec,
}

impl ScriptPublicKey {
    pub fn new(version: ScriptPublicKeyVersion, script: ScriptVec) -> Self {
        Self { version, script }
    }

    pub fn from_vec(version: ScriptPublicKeyVersion, script: Vec<u8>) -> Self {
        Self { version, script: ScriptVec::from_vec(script) }
    }

    pub fn version(&self) -> ScriptPublicKeyVersion {
        self.version
    }

    pub fn script(&self) -> &[u8] {
        &self.script
    }
}

impl fmt::Display for ScriptPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.version, hex::encode(&self.script))
    }
}

// SmallVec carries no borsh support, so the script round-trips through a
// length-prefixed byte vector.
impl BorshSerialize for ScriptPublicKey {
    fn serialize<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        BorshSerialize::serialize(&self.version, writer)?;
        BorshSerialize::serialize(&(self.script.len() as u32), writer)?;
        writer.write_all(&self.script)
    }
}

impl BorshDeserialize for ScriptPublicKey {
    fn deserialize_reader<R: std::io::Read>(reader: &mut R) -> std::io::Result<Self> {
        let version = ScriptPublicKeyVersion::deserialize_reader(reader)?;
        let len = u32::deserialize_reader(reader)? as usize;
        let mut script = vec![0u8; len];
        reader.read_exact(&mut script)?;
        Ok(Self { version, script: ScriptVec::from_vec(script) })
    }
}

/// Helper mirroring `vec!` for script byte vectors
pub fn scriptvec(slice: &[u8]) -> ScriptVec {
    ScriptVec::from_slice(slice)
}

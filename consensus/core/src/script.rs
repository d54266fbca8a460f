//! The script-execution seam
//!
//! Script semantics are not part of the consensus core: scripts are opaque
//! byte strings validated through this trait by an injected engine.

use crate::tx::{ScriptPublicKey, Transaction};

/// Everything an engine may need to verify one input
pub struct ScriptContext<'a> {
    pub tx: &'a Transaction,
    pub input_index: usize,
    pub block_daa_score: u64,
}

pub trait ScriptEngine: Send + Sync {
    /// Returns true iff the signature script satisfies the script public key
    fn verify(&self, script_public_key: &ScriptPublicKey, signature_script: &[u8], ctx: &ScriptContext<'_>) -> bool;
}

/// An engine that accepts every script. Used when transaction scripts are
/// validated elsewhere or not at all (header-only consensus, tests).
pub struct PermissiveScriptEngine;

impl ScriptEngine for PermissiveScriptEngine {
    fn verify(&self, _script_public_key: &ScriptPublicKey, _signature_script: &[u8], _ctx: &ScriptContext<'_>) -> bool {
        true
    }
}

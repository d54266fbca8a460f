//! Block body validation
//!
//! Structural checks over the transaction list: coinbase placement,
//! duplicates, the merkle commitment and the mass cap. Script execution is
//! out of consensus scope; `validate_scripts` runs the injected engine
//! when the caller can resolve spent outputs.

use consensus_core::block::Block;
use consensus_core::errors::RuleError;
use consensus_core::mass::MassCalculator;
use consensus_core::script::{ScriptContext, ScriptEngine};
use consensus_core::tx::{TransactionOutpoint, UtxoEntry};
use consensus_core::BlockHashSet;
use std::sync::Arc;

pub struct BlockValidator {
    mass_calculator: MassCalculator,
    max_block_mass: u64,
    script_engine: Arc<dyn ScriptEngine>,
}

impl BlockValidator {
    pub fn new(mass_calculator: MassCalculator, max_block_mass: u64, script_engine: Arc<dyn ScriptEngine>) -> Self {
        Self { mass_calculator, max_block_mass, script_engine }
    }

    /// Context-free body checks. Populates every transaction's mass as a
    /// side effect.
    pub fn validate_body_in_isolation(&self, block: &Block) -> Result<(), RuleError> {
        if block.transactions.is_empty() {
            return Err(RuleError::NoTransactions);
        }
        if !block.transactions[0].is_coinbase() {
            return Err(RuleError::FirstTxNotCoinbase);
        }
        if let Some(index) = block.transactions.iter().skip(1).position(|tx| tx.is_coinbase()) {
            return Err(RuleError::MultipleCoinbases(index + 1));
        }

        let mut seen = BlockHashSet::default();
        for tx in &block.transactions {
            if !seen.insert(tx.id()) {
                return Err(RuleError::DuplicateTransaction(tx.id()));
            }
        }

        let computed = block.expected_merkle_root();
        if computed != block.header.hash_merkle_root {
            return Err(RuleError::BadMerkleRoot { declared: block.header.hash_merkle_root, computed });
        }

        let mut block_mass: u64 = 0;
        for tx in &block.transactions {
            self.mass_calculator.populate_mass(tx);
            block_mass = block_mass.saturating_add(tx.mass());
            if block_mass > self.max_block_mass {
                return Err(RuleError::ExceedsBlockMassLimit { got: block_mass, max: self.max_block_mass });
            }
        }

        Ok(())
    }

    /// Runs the script engine over every non-coinbase input. The caller
    /// provides UTXO resolution; script semantics stay behind the engine.
    pub fn validate_scripts(
        &self,
        block: &Block,
        resolve_utxo: impl Fn(&TransactionOutpoint) -> Option<UtxoEntry>,
    ) -> Result<(), RuleError> {
        for tx in block.transactions.iter().filter(|tx| !tx.is_coinbase()) {
            for (input_index, input) in tx.inputs.iter().enumerate() {
                let Some(entry) = resolve_utxo(&input.previous_outpoint) else {
                    continue;
                };
                let ctx = ScriptContext { tx, input_index, block_daa_score: block.header.daa_score };
                if !self.script_engine.verify(&entry.script_public_key, &input.signature_script, &ctx) {
                    return Err(RuleError::ScriptFailure { tx: tx.id(), input: input_index });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_core::header::Header;
    use consensus_core::merkle::calc_merkle_root;
    use consensus_core::script::PermissiveScriptEngine;
    use consensus_core::subnets::{SUBNETWORK_ID_COINBASE, SUBNETWORK_ID_NATIVE};
    use consensus_core::tx::{ScriptPublicKey, Transaction, TransactionInput, TransactionOutput};
    use consensus_core::Hash;

    fn validator(max_mass: u64) -> BlockValidator {
        BlockValidator::new(MassCalculator::new(1, 10, 1000), max_mass, Arc::new(PermissiveScriptEngine))
    }

    fn coinbase() -> Transaction {
        Transaction::new(0, vec![], vec![], 0, SUBNETWORK_ID_COINBASE, 0, b"cb".to_vec())
    }

    fn payment(n: u64) -> Transaction {
        Transaction::new(
            0,
            vec![TransactionInput::new(
                consensus_core::tx::TransactionOutpoint::new(Hash::from_le_u64([n, 0, 0, 0]), 0),
                vec![1, 2],
                0,
                1,
            )],
            vec![TransactionOutput::new(n, ScriptPublicKey::from_vec(0, vec![0xaa]))],
            0,
            SUBNETWORK_ID_NATIVE,
            0,
            vec![],
        )
    }

    fn sealed_block(transactions: Vec<Transaction>) -> Block {
        let mut header = Header::from_precomputed_hash(Hash::from_le_u64([50, 0, 0, 0]), vec![Hash::from_le_u64([1, 0, 0, 0])]);
        header.hash_merkle_root = calc_merkle_root(transactions.iter().map(|tx| tx.id()));
        Block::new(header, transactions)
    }

    #[test]
    fn valid_body_passes_and_mass_is_populated() {
        let block = sealed_block(vec![coinbase(), payment(1)]);
        validator(u64::MAX).validate_body_in_isolation(&block).unwrap();
        assert!(block.transactions[1].mass() > 0);
    }

    #[test]
    fn empty_body_and_coinbase_rules() {
        let validator = validator(u64::MAX);
        assert_eq!(validator.validate_body_in_isolation(&sealed_block(vec![])), Err(RuleError::NoTransactions));
        assert_eq!(
            validator.validate_body_in_isolation(&sealed_block(vec![payment(1)])),
            Err(RuleError::FirstTxNotCoinbase)
        );
        assert_eq!(
            validator.validate_body_in_isolation(&sealed_block(vec![coinbase(), coinbase()])),
            Err(RuleError::MultipleCoinbases(1))
        );
        assert_eq!(
            validator.validate_body_in_isolation(&sealed_block(vec![coinbase(), payment(1), payment(1)])),
            Err(RuleError::DuplicateTransaction(payment(1).id()))
        );
    }

    #[test]
    fn tampered_transactions_break_the_merkle_commitment() {
        let mut block = sealed_block(vec![coinbase(), payment(1)]);
        block.transactions[1] = payment(2);
        assert!(matches!(
            validator(u64::MAX).validate_body_in_isolation(&block),
            Err(RuleError::BadMerkleRoot { .. })
        ));
    }

    #[test]
    fn mass_cap_is_enforced() {
        let block = sealed_block(vec![coinbase(), payment(1)]);
        assert!(matches!(
            validator(10).validate_body_in_isolation(&block),
            Err(RuleError::ExceedsBlockMassLimit { .. })
        ));
    }

    #[test]
    fn failing_scripts_surface_with_their_input() {
        struct RejectAll;
        impl ScriptEngine for RejectAll {
            fn verify(&self, _: &ScriptPublicKey, _: &[u8], _: &ScriptContext<'_>) -> bool {
                false
            }
        }

        let block = sealed_block(vec![coinbase(), payment(1)]);
        let validator = BlockValidator::new(MassCalculator::new(1, 10, 1000), u64::MAX, Arc::new(RejectAll));
        let resolve = |_: &TransactionOutpoint| {
            Some(UtxoEntry::new(5, ScriptPublicKey::from_vec(0, vec![0xaa]), 0, false))
        };
        assert!(matches!(validator.validate_scripts(&block, resolve), Err(RuleError::ScriptFailure { input: 0, .. })));
    }
}

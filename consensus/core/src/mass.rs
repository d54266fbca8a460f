//! Transaction mass
//!
//! Mass is the unit the network throttles throughput with: a linear
//! combination of serialized size, script public key size, and signature
//! operation count.

use crate::config::params::Params;
use crate::constants::SUBNETWORK_ID_SIZE;
use crate::tx::{Transaction, TransactionInput, TransactionOutput};
use crate::HASH_SIZE;

#[derive(Clone)]
pub struct MassCalculator {
    mass_per_tx_byte: u64,
    mass_per_script_pub_key_byte: u64,
    mass_per_sig_op: u64,
}

impl MassCalculator {
    pub fn new(mass_per_tx_byte: u64, mass_per_script_pub_key_byte: u64, mass_per_sig_op: u64) -> Self {
        Self { mass_per_tx_byte, mass_per_script_pub_key_byte, mass_per_sig_op }
    }

    pub fn calc_tx_mass(&self, tx: &Transaction) -> u64 {
        let size = transaction_estimated_serialized_size(tx);
        let script_pub_key_size: u64 =
            tx.outputs.iter().map(|output| 2 + 8 + output.script_public_key.script().len() as u64).sum();
        let sig_ops: u64 = tx.inputs.iter().map(|input| input.sig_op_count as u64).sum();

        size * self.mass_per_tx_byte
            + script_pub_key_size * self.mass_per_script_pub_key_byte
            + sig_ops * self.mass_per_sig_op
    }

    /// Computes the mass and stores it on the transaction itself
    pub fn populate_mass(&self, tx: &Transaction) {
        tx.set_mass(self.calc_tx_mass(tx));
    }
}

impl From<&Params> for MassCalculator {
    fn from(params: &Params) -> Self {
        Self::new(params.mass_per_tx_byte, params.mass_per_script_pub_key_byte, params.mass_per_sig_op)
    }
}

/// The estimated size of a transaction in serialized form. Deterministic,
/// not necessarily byte-accurate; used only as the size component of mass.
pub fn transaction_estimated_serialized_size(tx: &Transaction) -> u64 {
    let mut size: u64 = 0;
    size += 2; // Tx version (u16)
    size += 8; // Number of inputs (u64)
    size += tx.inputs.iter().map(transaction_input_estimated_serialized_size).sum::<u64>();

    size += 8; // Number of outputs (u64)
    size += tx.outputs.iter().map(transaction_output_estimated_serialized_size).sum::<u64>();

    size += 8; // Lock time (u64)
    size += SUBNETWORK_ID_SIZE as u64;
    size += 8; // Gas (u64)
    size += HASH_SIZE as u64; // Payload hash

    size += 8; // Length of the payload (u64)
    size += tx.payload.len() as u64;
    size
}

fn transaction_input_estimated_serialized_size(input: &TransactionInput) -> u64 {
    let mut size: u64 = 0;
    size += outpoint_estimated_serialized_size();

    size += 8; // Length of signature script (u64)
    size += input.signature_script.len() as u64;

    size += 8; // Sequence (u64)
    size
}

const fn outpoint_estimated_serialized_size() -> u64 {
    HASH_SIZE as u64 // Previous tx ID
        + 4 // Index (u32)
}

fn transaction_output_estimated_serialized_size(output: &TransactionOutput) -> u64 {
    let mut size: u64 = 0;
    size += 8; // Value (u64)
    size += 2; // ScriptPublicKey version (u16)
    size += 8; // Length of script public key (u64)
    size += output.script_public_key.script().len() as u64;
    size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subnets::SUBNETWORK_ID_NATIVE;
    use crate::tx::{ScriptPublicKey, TransactionOutpoint};
    use crate::Hash;

    fn sample_tx() -> Transaction {
        Transaction::new(
            0,
            vec![TransactionInput::new(
                TransactionOutpoint::new(Hash::from_le_u64([1, 0, 0, 0]), 0),
                vec![0u8; 10],
                0,
                2,
            )],
            vec![TransactionOutput::new(5000, ScriptPublicKey::from_vec(0, vec![0u8; 20]))],
            0,
            SUBNETWORK_ID_NATIVE,
            0,
            vec![],
        )
    }

    #[test]
    fn estimated_size_counts_every_field() {
        let tx = sample_tx();
        // Fixed header: 2 + 8 + 8 + 8 + 20 + 8 + 32 + 8 = 94
        // Input: 32 + 4 + 8 + 10 + 8 = 62; output: 8 + 2 + 8 + 20 = 38
        assert_eq!(transaction_estimated_serialized_size(&tx), 94 + 62 + 38);
    }

    #[test]
    fn populate_mass_applies_the_linear_combination() {
        let tx = sample_tx();
        let calculator = MassCalculator::new(1, 10, 1000);
        calculator.populate_mass(&tx);
        let expected = (94 + 62 + 38) + 10 * (2 + 8 + 20) + 1000 * 2;
        assert_eq!(tx.mass(), expected);
    }
}

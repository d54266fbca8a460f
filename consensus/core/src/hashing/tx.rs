use crate::tx::Transaction;
use crate::Hash;
use crypto_hashes::HashWriter;
use std::io::Write;

/// Computes the transaction ID. Signature scripts are excluded so that
/// witness malleation cannot change the ID.
pub fn id(tx: &Transaction) -> Hash {
    let mut writer = HashWriter::tagged(b"TransactionID");
    writer.write_all(&tx.version.to_le_bytes()).unwrap();

    writer.write_all(&(tx.inputs.len() as u64).to_le_bytes()).unwrap();
    for input in &tx.inputs {
        writer.write_all(input.previous_outpoint.transaction_id.as_bytes()).unwrap();
        writer.write_all(&input.previous_outpoint.index.to_le_bytes()).unwrap();
        writer.write_all(&input.sequence.to_le_bytes()).unwrap();
    }

    writer.write_all(&(tx.outputs.len() as u64).to_le_bytes()).unwrap();
    for output in &tx.outputs {
        writer.write_all(&output.value.to_le_bytes()).unwrap();
        writer.write_all(&output.script_public_key.version().to_le_bytes()).unwrap();
        writer.write_all(&(output.script_public_key.script().len() as u64).to_le_bytes()).unwrap();
        writer.write_all(output.script_public_key.script()).unwrap();
    }

    writer.write_all(&tx.lock_time.to_le_bytes()).unwrap();
    writer.write_all(tx.subnetwork_id.as_bytes()).unwrap();
    writer.write_all(&tx.gas.to_le_bytes()).unwrap();
    writer.write_all(&(tx.payload.len() as u64).to_le_bytes()).unwrap();
    writer.write_all(&tx.payload).unwrap();

    writer.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subnets::SUBNETWORK_ID_NATIVE;
    use crate::tx::{ScriptPublicKey, TransactionOutput};

    #[test]
    fn payload_affects_id() {
        let make = |payload: Vec<u8>| {
            Transaction::new(
                0,
                vec![],
                vec![TransactionOutput::new(5, ScriptPublicKey::from_vec(0, vec![]))],
                0,
                SUBNETWORK_ID_NATIVE,
                0,
                payload,
            )
        };
        assert_ne!(make(vec![1]).id(), make(vec![2]).id());
    }
}

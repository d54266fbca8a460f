use crate::header::Header;
use crate::Hash;
use crypto_hashes::HashWriter;
use std::io::Write;

/// Computes the hash of a sealed block header
pub fn hash(header: &Header) -> Hash {
    let mut writer = HashWriter::tagged(b"BlockHash");
    write_header(&mut writer, header, header.nonce, header.timestamp);
    writer.finalize()
}

/// Computes the header hash with the nonce and timestamp fields overridden.
/// PoW routines use this with both set to zero to obtain the pre-PoW hash.
pub fn hash_override_nonce_time(header: &Header, nonce: u64, timestamp: u64) -> Hash {
    let mut writer = HashWriter::tagged(b"BlockHash");
    write_header(&mut writer, header, nonce, timestamp);
    writer.finalize()
}

/// Canonical header serialization: fixed-width little-endian integers and
/// u64 length prefixes on the parent lists, no padding.
fn write_header(writer: &mut HashWriter, header: &Header, nonce: u64, timestamp: u64) {
    writer.write_all(&header.version.to_le_bytes()).unwrap();
    writer.write_all(&(header.parents_by_level.len() as u64).to_le_bytes()).unwrap();
    for level_parents in &header.parents_by_level {
        writer.write_all(&(level_parents.len() as u64).to_le_bytes()).unwrap();
        for parent in level_parents {
            writer.write_all(parent.as_bytes()).unwrap();
        }
    }
    writer.write_all(header.hash_merkle_root.as_bytes()).unwrap();
    writer.write_all(header.accepted_id_merkle_root.as_bytes()).unwrap();
    writer.write_all(header.utxo_commitment.as_bytes()).unwrap();
    writer.write_all(&timestamp.to_le_bytes()).unwrap();
    writer.write_all(&header.bits.to_le_bytes()).unwrap();
    writer.write_all(&nonce.to_le_bytes()).unwrap();
    writer.write_all(&header.daa_score.to_le_bytes()).unwrap();
    writer.write_all(&header.blue_score.to_le_bytes()).unwrap();
    writer.write_all(&header.blue_work.to_le_bytes()).unwrap();
    writer.write_all(header.pruning_point.as_bytes()).unwrap();
}

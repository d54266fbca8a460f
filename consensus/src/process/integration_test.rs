//! Full-pipeline integration tests: template mining, submission, queries
//! and sync support over a simnet consensus instance.

use crate::consensus::types::RejectReason;
use crate::consensus::Consensus;
use consensus_core::block::Block;
use consensus_core::config::params::Params;
use consensus_core::status::BlockStatus;
use consensus_core::tx::ScriptPublicKey;
use consensus_core::Hash;
use database::Database;
use std::sync::Arc;
use tempfile::TempDir;

fn setup() -> (TempDir, Arc<Consensus>) {
    let tmp = TempDir::new().unwrap();
    let db = Arc::new(Database::open(tmp.path()).unwrap());
    let consensus = Consensus::new(db, Params::simnet()).unwrap();
    (tmp, consensus)
}

fn miner_script() -> ScriptPublicKey {
    ScriptPublicKey::from_vec(0, vec![0xaa; 32])
}

/// Builds a template over the current virtual and solves its PoW inline.
/// Simnet targets pass roughly every other nonce, so the loop is short.
fn mine_next(consensus: &Consensus) -> Block {
    let template = consensus.build_block_template(miner_script(), b"it".to_vec(), vec![]).unwrap();
    let mut block = template.block;
    let state = template_state_solve(&mut block);
    assert!(state, "no nonce found within the search bound");
    block
}

fn template_state_solve(block: &mut Block) -> bool {
    let state = consensus_pow::State::new(&block.header);
    for nonce in 0..100_000u64 {
        if state.check_pow(nonce).0 {
            block.header.nonce = nonce;
            block.header.finalize();
            return true;
        }
    }
    false
}

#[test]
fn genesis_only_node_answers_queries() {
    let (_tmp, consensus) = setup();
    let genesis = consensus.params().genesis.hash();

    let info = consensus.get_block_info(genesis).unwrap().unwrap();
    assert_eq!(info.status, BlockStatus::Valid);
    assert_eq!(info.blue_score, 0);
    assert_eq!(info.blue_work, 0u64.into());
    assert_eq!(info.selected_parent, None);
    assert!(info.mergeset_blues.is_empty() && info.mergeset_reds.is_empty());

    assert!(consensus.is_chain_block(genesis).unwrap());
    assert_eq!(consensus.virtual_state().parents, vec![genesis]);

    let sync_info = consensus.get_sync_info().unwrap();
    assert_eq!(sync_info.header_count, 1);
    assert_eq!(sync_info.block_count, 1);
}

#[test]
fn linear_chain_of_ten_blocks() {
    let (_tmp, consensus) = setup();
    let genesis = consensus.params().genesis.hash();
    let unit_work = consensus_core::difficulty::calc_work(consensus.params().genesis.bits);

    let mut chain = vec![genesis];
    for _ in 0..10 {
        let block = mine_next(&consensus);
        consensus.submit_block(block.clone()).unwrap();
        chain.push(block.hash());
    }

    let mut expected_work = 0u64.into();
    for (i, hash) in chain.iter().enumerate() {
        let info = consensus.get_block_info(*hash).unwrap().unwrap();
        assert_eq!(info.blue_score, i as u64, "blue score of block {i}");
        assert_eq!(info.blue_work, expected_work, "blue work of block {i}");
        assert!(consensus.is_chain_block(*hash).unwrap(), "chain membership of block {i}");
        expected_work += unit_work;
    }

    // Parent/child relations form the chain
    let (parents, children) = consensus.get_block_relations(chain[5]).unwrap().unwrap();
    assert_eq!(parents, vec![chain[4]]);
    assert_eq!(children, vec![chain[6]]);

    let sync_info = consensus.get_sync_info().unwrap();
    assert_eq!(sync_info.header_count, 11);
    assert_eq!(sync_info.block_count, 11);
    assert!(sync_info.is_synced);
}

#[test]
fn natural_fork_resolves_deterministically() {
    let (_tmp, consensus) = setup();
    let genesis = consensus.params().genesis.hash();

    // Two competing blocks over genesis: both templates see only genesis
    let first = mine_next(&consensus);
    let second = {
        // Build the sibling before submitting the first, then submit both
        let template = consensus.build_block_template(miner_script(), b"sibling".to_vec(), vec![]).unwrap();
        let mut block = template.block;
        assert!(template_state_solve(&mut block));
        block
    };
    assert_ne!(first.hash(), second.hash());

    consensus.submit_block(first.clone()).unwrap();
    consensus.submit_block(second.clone()).unwrap();

    // Both are tips now; the merging block adopts them both
    let mut tips = consensus.virtual_state().parents.clone();
    tips.sort();
    let mut expected = vec![first.hash(), second.hash()];
    expected.sort();
    assert_eq!(tips, expected);

    let merge = mine_next(&consensus);
    assert_eq!(merge.header.direct_parents().len(), 2);
    consensus.submit_block(merge.clone()).unwrap();

    let info = consensus.get_block_info(merge.hash()).unwrap().unwrap();
    assert_eq!(info.mergeset_blues.len(), 2);
    assert!(info.mergeset_reds.is_empty());
    // The selected parent is the tie-break winner (identical blue work)
    let winner = first.hash().max(second.hash());
    assert_eq!(info.selected_parent, Some(winner));
    assert_eq!(info.blue_score, 3);

    // The losing sibling is blue but off-chain
    let loser = first.hash().min(second.hash());
    assert!(consensus.is_chain_block(winner).unwrap());
    assert!(!consensus.is_chain_block(loser).unwrap());
    assert!(consensus.is_chain_block(genesis).unwrap());
}

#[test]
fn pow_failure_rejects_without_consensus_state() {
    let (_tmp, consensus) = setup();
    let template = consensus.build_block_template(miner_script(), vec![], vec![]).unwrap();
    let mut block = template.block;

    // Find a nonce that fails the target
    let state = consensus_pow::State::new(&block.header);
    let bad_nonce = (0..100_000u64).find(|nonce| !state.check_pow(*nonce).0).unwrap();
    block.header.nonce = bad_nonce;
    block.header.finalize();
    let hash = block.hash();

    match consensus.submit_block(block.clone()) {
        Err(RejectReason::PowInvalid) => {}
        other => panic!("expected PoW rejection, got {other:?}"),
    }

    // No consensus data for the block; only the invalid verdict remains
    let info = consensus.get_block_info(hash).unwrap().unwrap();
    assert_eq!(info.status, BlockStatus::Invalid);
    assert!(consensus.get_block_relations(hash).unwrap().is_none());
    assert_eq!(consensus.get_sync_info().unwrap().header_count, 1);

    // And resubmission is barred outright
    assert!(matches!(consensus.submit_block(block), Err(RejectReason::KnownInvalid)));
}

#[test]
fn duplicates_and_orphans_are_discriminated() {
    let (_tmp, consensus) = setup();
    let block = mine_next(&consensus);
    consensus.submit_block(block.clone()).unwrap();
    assert!(matches!(consensus.submit_block(block.clone()), Err(RejectReason::Duplicate)));

    // Rewire a fresh template onto an unknown parent
    let template = consensus.build_block_template(miner_script(), vec![], vec![]).unwrap();
    let mut orphan = template.block;
    let ghost = Hash::from_le_u64([0xdead, 0xbeef, 0, 1]);
    orphan.header.parents_by_level = vec![vec![ghost]];
    orphan.header.finalize();
    match consensus.submit_block(orphan.clone()) {
        Err(RejectReason::MissingParents(missing)) => assert_eq!(missing, vec![ghost]),
        other => panic!("expected orphan signal, got {other:?}"),
    }
    // Orphans are not persisted at all
    assert!(consensus.get_block_info(orphan.hash()).unwrap().is_none());
}

#[test]
fn ibd_gate_rejects_rpc_submissions() {
    let (_tmp, consensus) = setup();
    let block = mine_next(&consensus);

    consensus.set_ibd_running(true);
    assert!(matches!(consensus.submit_block(block.clone()), Err(RejectReason::InIbd)));
    assert!(!consensus.get_sync_info().unwrap().is_synced);

    // The sync path itself bypasses the gate
    consensus.validate_and_insert_block(block).unwrap();
    consensus.set_ibd_running(false);
    assert_eq!(consensus.get_sync_info().unwrap().header_count, 2);
}

#[test]
fn block_locator_spacing_doubles_after_the_initial_run() {
    let (_tmp, consensus) = setup();
    let genesis = consensus.params().genesis.hash();

    let mut chain = vec![genesis];
    for _ in 0..12 {
        let block = mine_next(&consensus);
        consensus.submit_block(block.clone()).unwrap();
        chain.push(block.hash());
    }

    let locator = consensus.build_block_locator(genesis, chain[12]).unwrap();
    // Heights: 12, 11, 10, 9, then gaps 2, 4, then the final jump to low
    let expected: Vec<Hash> = vec![chain[12], chain[11], chain[10], chain[9], chain[7], chain[3], chain[0]];
    assert_eq!(locator, expected);

    // Degenerate locator: low == high
    assert_eq!(consensus.build_block_locator(chain[12], chain[12]).unwrap(), vec![chain[12]]);

    // Off-chain bounds are refused
    let err = consensus.build_block_locator(chain[5], chain[3]);
    assert!(err.is_err());
}

#[test]
fn populate_mass_fills_the_cell() {
    let (_tmp, consensus) = setup();
    let tx = consensus_core::tx::Transaction::new(
        0,
        vec![],
        vec![consensus_core::tx::TransactionOutput::new(5, miner_script())],
        0,
        consensus_core::subnets::SUBNETWORK_ID_NATIVE,
        0,
        vec![],
    );
    assert_eq!(tx.mass(), 0);
    consensus.populate_mass(&tx);
    assert!(tx.mass() > 0);
}

#[test]
fn header_only_blocks_are_tracked_separately() {
    let (_tmp, consensus) = setup();
    let block = mine_next(&consensus);
    let header_only = Block::from_header(block.header.clone());
    consensus.submit_block(header_only).unwrap();

    let info = consensus.get_block_info(block.hash()).unwrap().unwrap();
    assert_eq!(info.status, BlockStatus::HeaderOnly);
    let sync_info = consensus.get_sync_info().unwrap();
    assert_eq!(sync_info.header_count, 2);
    assert_eq!(sync_info.block_count, 1);

    // A full block over a bodiless parent is accepted but cannot progress
    // past header-only either
    let child = mine_next(&consensus);
    assert_eq!(child.header.direct_parents(), vec![block.hash()]);
    consensus.submit_block(child.clone()).unwrap();
    let child_info = consensus.get_block_info(child.hash()).unwrap().unwrap();
    assert_eq!(child_info.status, BlockStatus::HeaderOnly);
    assert_eq!(consensus.get_sync_info().unwrap().block_count, 1);
}

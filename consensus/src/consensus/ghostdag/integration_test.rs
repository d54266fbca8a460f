//! GHOSTDAG protocol scenarios over committed storage: forks, merges,
//! k-cluster reds, and cross-node determinism.

use super::GhostdagManager;
use crate::consensus::dag::{DagTopology, ReachabilityManager, RelationsService};
use consensus_core::difficulty::calc_work;
use consensus_core::header::Header;
use consensus_core::{Hash, KType};
use database::stores::GhostdagData;
use database::{ConsensusStorage, Database, StagingArea};
use std::sync::Arc;
use tempfile::TempDir;

fn hash(n: u64) -> Hash {
    Hash::from_le_u64([n, 0, 0, 0])
}

const TEST_BITS: u32 = 0x207fffff;

struct TestDag {
    _tmp: TempDir,
    storage: Arc<ConsensusStorage>,
    relations: Arc<RelationsService>,
    reachability: Arc<ReachabilityManager>,
    ghostdag: Arc<GhostdagManager>,
}

impl TestDag {
    fn new(k: KType) -> Self {
        let tmp = TempDir::new().unwrap();
        let storage = Arc::new(ConsensusStorage::new(Arc::new(Database::open(tmp.path()).unwrap())));
        let relations = Arc::new(RelationsService::new(storage.clone()));
        let reachability = Arc::new(ReachabilityManager::new(storage.clone()));
        let topology = Arc::new(DagTopology::new(storage.clone(), relations.clone(), reachability.clone()));
        let ghostdag = Arc::new(GhostdagManager::new(k, hash(0), 180, storage.clone(), topology));

        let dag = Self { _tmp: tmp, storage, relations, reachability, ghostdag };
        dag.insert(hash(0), vec![]);
        dag
    }

    fn insert(&self, block: Hash, parents: Vec<Hash>) -> GhostdagData {
        let mut staging = StagingArea::new();
        let data = self.ghostdag.ghostdag(&staging, &parents).unwrap();

        let mut header = Header::from_precomputed_hash(block, parents.clone());
        header.bits = TEST_BITS;
        staging.stage_header(block, Arc::new(header));
        self.relations.add_block(&mut staging, block, parents).unwrap();
        match data.selected_parent {
            Some(selected_parent) => self.reachability.add_block(&mut staging, block, selected_parent).unwrap(),
            None => self.reachability.init(&mut staging, block).unwrap(),
        }
        staging.stage_ghostdag(block, data.clone());
        staging.commit(&self.storage).unwrap();
        data
    }

    fn data(&self, block: Hash) -> Arc<GhostdagData> {
        self.storage.ghostdag.get(&block).unwrap().unwrap()
    }
}

#[test]
fn genesis_data_is_all_zero() {
    let dag = TestDag::new(18);
    let data = dag.data(hash(0));
    assert_eq!(data.blue_score, 0);
    assert_eq!(data.blue_work, 0u64.into());
    assert_eq!(data.selected_parent, None);
    assert!(data.mergeset_blues.is_empty());
    assert!(data.mergeset_reds.is_empty());
}

#[test]
fn linear_chain_accumulates_score_and_work() {
    let dag = TestDag::new(18);
    let unit_work = calc_work(TEST_BITS);

    let mut expected_work = 0u64.into();
    for i in 1..=10u64 {
        let data = dag.insert(hash(i), vec![hash(i - 1)]);
        expected_work += unit_work;
        assert_eq!(data.blue_score, i);
        assert_eq!(data.blue_work, expected_work);
        assert_eq!(data.selected_parent, Some(hash(i - 1)));
        assert_eq!(data.mergeset_blues, vec![hash(i - 1)]);
        assert!(data.mergeset_reds.is_empty());
    }
}

#[test]
fn fork_and_merge_selects_the_higher_hash_on_ties() {
    let dag = TestDag::new(18);
    // T <- A, T <- B (same work), then C merges both
    let tip = dag.insert(hash(1), vec![hash(0)]);
    dag.insert(hash(2), vec![hash(1)]);
    dag.insert(hash(3), vec![hash(1)]);
    let merged = dag.insert(hash(4), vec![hash(2), hash(3)]);

    // Equal blue work: the lexicographically larger hash wins
    assert_eq!(merged.selected_parent, Some(hash(3)));
    assert_eq!(merged.mergeset_blues, vec![hash(3), hash(2)]);
    assert!(merged.mergeset_reds.is_empty());
    // Invariant: blue score = selected parent's score + number of blues
    assert_eq!(merged.blue_score, dag.data(hash(3)).blue_score + 2);
    assert_eq!(merged.blue_score, tip.blue_score + 3);
}

#[test]
fn fan_wider_than_k_goes_partially_red() {
    let k: KType = 3;
    let dag = TestDag::new(k);
    // A fan of 5 mutually-concurrent blocks over the same parent
    let fan: Vec<Hash> = (1..=5u64).map(|i| hash(i)).collect();
    for block in &fan {
        dag.insert(*block, vec![hash(0)]);
    }
    let merged = dag.insert(hash(10), fan.clone());

    // The highest hash is selected; k more fit in the blues, the last
    // candidate exceeds the cap and goes red
    assert_eq!(merged.selected_parent, Some(hash(5)));
    assert_eq!(merged.mergeset_blues.len(), k as usize + 1);
    assert_eq!(merged.mergeset_reds.len(), 1);
    // Selected parent sits at blue score 1 (genesis below it)
    assert_eq!(merged.blue_score, 1 + k as u64 + 1);

    // No recorded blue anticone size may exceed k
    for (_, size) in merged.blues_anticone_sizes.iter() {
        assert!(*size <= k);
    }
    assert_eq!(merged.mergeset_blues.len() + merged.mergeset_reds.len(), 5);
}

#[test]
fn two_nodes_reach_identical_views() {
    let build = || {
        let dag = TestDag::new(4);
        dag.insert(hash(1), vec![hash(0)]);
        dag.insert(hash(2), vec![hash(0)]);
        dag.insert(hash(3), vec![hash(1), hash(2)]);
        dag.insert(hash(4), vec![hash(1)]);
        dag.insert(hash(5), vec![hash(3), hash(4)]);
        dag.insert(hash(6), vec![hash(5)]);
        dag
    };

    let first = build();
    let second = build();
    for block in 0..=6u64 {
        assert_eq!(*first.data(hash(block)), *second.data(hash(block)), "diverged on block {block}");
    }
}

#[test]
fn blues_cap_at_k_plus_one() {
    let k: KType = 2;
    let dag = TestDag::new(k);
    let fan: Vec<Hash> = (1..=6u64).map(hash).collect();
    for block in &fan {
        dag.insert(*block, vec![hash(0)]);
    }
    let merged = dag.insert(hash(10), fan);
    assert_eq!(merged.mergeset_blues.len() as u64, k as u64 + 1);
    assert_eq!(merged.mergeset_reds.len(), 3);
}

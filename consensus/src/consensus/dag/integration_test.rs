//! DAG-level integration tests: the reachability index under stress and
//! topology queries over committed state.

use super::reachability::ReachabilityManager;
use super::relations::RelationsService;
use super::topology::DagTopology;
use crate::consensus::ghostdag::GhostdagManager;
use consensus_core::header::Header;
use consensus_core::Hash;
use database::{ConsensusStorage, Database, StagingArea};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tempfile::TempDir;

fn hash(n: u64) -> Hash {
    Hash::from_le_u64([n, 0, 0, 0])
}

/// A DAG fixture driving the managers directly, without header validation
struct TestDag {
    _tmp: TempDir,
    storage: Arc<ConsensusStorage>,
    relations: Arc<RelationsService>,
    reachability: Arc<ReachabilityManager>,
    topology: Arc<DagTopology>,
    ghostdag: Arc<GhostdagManager>,
}

impl TestDag {
    fn new(k: u8, reindex_depth: u64, reindex_slack: u64) -> Self {
        let tmp = TempDir::new().unwrap();
        let storage = Arc::new(ConsensusStorage::new(Arc::new(Database::open(tmp.path()).unwrap())));
        let relations = Arc::new(RelationsService::new(storage.clone()));
        let reachability = Arc::new(ReachabilityManager::with_params(storage.clone(), reindex_depth, reindex_slack));
        let topology = Arc::new(DagTopology::new(storage.clone(), relations.clone(), reachability.clone()));
        let ghostdag = Arc::new(GhostdagManager::new(k, hash(0), 180, storage.clone(), topology.clone()));

        let dag = Self { _tmp: tmp, storage, relations, reachability, topology, ghostdag };
        dag.insert(hash(0), vec![]);
        dag
    }

    /// Runs GHOSTDAG for the block and commits everything it needs
    fn insert(&self, block: Hash, parents: Vec<Hash>) {
        let mut staging = StagingArea::new();
        let data = self.ghostdag.ghostdag(&staging, &parents).unwrap();

        let mut header = Header::from_precomputed_hash(block, parents.clone());
        header.bits = 0x207fffff;
        staging.stage_header(block, Arc::new(header));
        self.relations.add_block(&mut staging, block, parents).unwrap();
        match data.selected_parent {
            Some(selected_parent) => self.reachability.add_block(&mut staging, block, selected_parent).unwrap(),
            None => self.reachability.init(&mut staging, block).unwrap(),
        }
        let selected_parent = data.selected_parent;
        staging.stage_ghostdag(block, data);
        if let Some(selected_parent) = selected_parent {
            // Keep the reindex root trailing the growing chain
            self.reachability.try_advancing_reindex_root(&mut staging, selected_parent).unwrap();
        }
        staging.commit(&self.storage).unwrap();
    }

    fn is_chain_ancestor(&self, ancestor: Hash, descendant: Hash) -> bool {
        self.reachability.is_chain_ancestor_of(&StagingArea::new(), ancestor, descendant).unwrap()
    }

    fn is_dag_ancestor(&self, ancestor: Hash, descendant: Hash) -> bool {
        self.topology.is_dag_ancestor_of(&StagingArea::new(), ancestor, descendant).unwrap()
    }
}

#[test]
fn long_chain_reindexes_and_keeps_every_ancestor_query_correct() {
    // Aggressively small reindex parameters so thousands of rebalances run
    let dag = TestDag::new(18, 10, 32);
    let depth = 10_000u64;
    for i in 1..=depth {
        dag.insert(hash(i), vec![hash(i - 1)]);
    }

    // The reindex root must have advanced off genesis along the chain
    let root = dag.storage.metadata.reindex_root().unwrap().unwrap();
    assert_ne!(root, hash(0));

    // Sampled pairs: ancestry iff index order
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..2_000 {
        let a = rng.gen_range(0..=depth);
        let b = rng.gen_range(0..=depth);
        assert_eq!(dag.is_chain_ancestor(hash(a), hash(b)), a <= b, "pair ({a}, {b})");
    }
}

#[test]
fn random_dag_matches_naive_ancestry() {
    let dag = TestDag::new(18, 20, 64);
    let mut rng = StdRng::seed_from_u64(42);

    // Grow a random DAG; track edges for a naive reference
    let count = 250u64;
    let mut parents_of: Vec<Vec<u64>> = vec![vec![]];
    for i in 1..count {
        let parent_count = rng.gen_range(1..=3.min(i)).min(3) as usize;
        let mut parents = Vec::new();
        while parents.len() < parent_count {
            let candidate = rng.gen_range(0..i);
            if !parents.contains(&candidate) {
                parents.push(candidate);
            }
        }
        dag.insert(hash(i), parents.iter().map(|p| hash(*p)).collect());
        parents_of.push(parents);
    }

    let naive_is_ancestor = |a: u64, b: u64| -> bool {
        let mut stack = vec![b];
        let mut seen = vec![false; count as usize];
        while let Some(current) = stack.pop() {
            if current == a {
                return true;
            }
            for &parent in &parents_of[current as usize] {
                if !seen[parent as usize] {
                    seen[parent as usize] = true;
                    stack.push(parent);
                }
            }
        }
        false
    };

    for _ in 0..1_500 {
        let a = rng.gen_range(0..count);
        let b = rng.gen_range(0..count);
        assert_eq!(dag.is_dag_ancestor(hash(a), hash(b)), naive_is_ancestor(a, b), "pair ({a}, {b})");
    }
}

#[test]
fn anticone_of_a_fork_block() {
    let dag = TestDag::new(18, 100, 1 << 12);
    // 0 <- 1 <- 2 and 0 <- 10, then 3 merges {2, 10}
    dag.insert(hash(1), vec![hash(0)]);
    dag.insert(hash(2), vec![hash(1)]);
    dag.insert(hash(10), vec![hash(0)]);
    dag.insert(hash(3), vec![hash(2), hash(10)]);

    let staging = StagingArea::new();
    let mut anticone = dag.topology.anticone(&staging, hash(10), &[hash(3)]).unwrap();
    anticone.sort();
    assert_eq!(anticone, vec![hash(1), hash(2)]);

    let past = dag.topology.past(&staging, hash(3)).unwrap();
    assert_eq!(past.len(), 4);
    assert!(past.contains(&hash(10)) && past.contains(&hash(0)));
}

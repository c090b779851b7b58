//! Shared test utilities for `rmodularity-core`.

use std::{
    collections::BTreeMap,
    num::NonZeroUsize,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use proptest::prelude::*;
use rand::{Rng, SeedableRng, rngs::SmallRng};
pub(crate) use rmodularity_test_support::proptest_config::suite_config as suite_proptest_config;

use crate::{
    detector::{BlockModelDetector, BlockPartition, DetectionRequest, ModularityDetector},
    error::DetectorError,
    network::Network,
};

/// Small networks with loops, repeats and isolated nodes.
pub(crate) fn arbitrary_network() -> impl Strategy<Value = Network> {
    (1_usize..24, any::<bool>()).prop_flat_map(|(node_count, directed)| {
        prop::collection::vec((0..node_count, 0..node_count), 0..48).prop_map(move |edges| {
            Network::new(node_count, edges, directed).expect("generated endpoints are in range")
        })
    })
}

/// Undirected cycle over `node_count` nodes.
pub(crate) fn ring(node_count: usize) -> Network {
    let edges = (0..node_count).map(|node| (node, (node + 1) % node_count)).collect();
    Network::new(node_count, edges, false).expect("ring must be valid")
}

/// Seeded G(n, p) random graph.
pub(crate) fn erdos_renyi(node_count: usize, probability: f64, seed: u64) -> Network {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut edges = Vec::new();
    for source in 0..node_count {
        for target in (source + 1)..node_count {
            if rng.gen_bool(probability) {
                edges.push((source, target));
            }
        }
    }
    Network::new(node_count, edges, false).expect("random graph must be valid")
}

fn alternating(node_count: usize) -> Vec<usize> {
    (0..node_count).map(|node| node % 2).collect()
}

/// Returns the same partition for every request.
pub(crate) struct FixedDetector {
    partition: BlockPartition,
}

impl FixedDetector {
    pub(crate) fn new(partition: BlockPartition) -> Self {
        Self { partition }
    }
}

impl BlockModelDetector for FixedDetector {
    fn name(&self) -> &str {
        "fixed"
    }

    fn minimize_blocks(
        &self,
        _request: &DetectionRequest<'_>,
    ) -> Result<BlockPartition, DetectorError> {
        Ok(self.partition.clone())
    }
}

/// Collapses to one block iff the request's probability reaches `threshold`;
/// otherwise splits nodes by parity.
pub(crate) struct StepDetector {
    threshold: f64,
}

impl StepDetector {
    pub(crate) fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl BlockModelDetector for StepDetector {
    fn name(&self) -> &str {
        "step"
    }

    fn minimize_blocks(
        &self,
        request: &DetectionRequest<'_>,
    ) -> Result<BlockPartition, DetectorError> {
        let nodes = request.network().node_count();
        if request.probability() >= self.threshold {
            Ok(BlockPartition::new(vec![0; nodes], 10.0, 10.0))
        } else {
            Ok(BlockPartition::new(alternating(nodes), 8.0, 10.0))
        }
    }
}

/// Always returns the single-block partition.
pub(crate) struct ConstantTrivial;

impl BlockModelDetector for ConstantTrivial {
    fn name(&self) -> &str {
        "constant-trivial"
    }

    fn minimize_blocks(
        &self,
        request: &DetectionRequest<'_>,
    ) -> Result<BlockPartition, DetectorError> {
        Ok(BlockPartition::new(vec![0; request.network().node_count()], 5.0, 5.0))
    }
}

/// Always reports a failure.
pub(crate) struct FailingDetector;

impl BlockModelDetector for FailingDetector {
    fn name(&self) -> &str {
        "failing"
    }

    fn minimize_blocks(
        &self,
        _request: &DetectionRequest<'_>,
    ) -> Result<BlockPartition, DetectorError> {
        Err(DetectorError::failed("boom"))
    }
}

/// Panics once rewiring starts.
pub(crate) struct PanickingDetector;

impl BlockModelDetector for PanickingDetector {
    fn name(&self) -> &str {
        "panicking"
    }

    fn minimize_blocks(
        &self,
        request: &DetectionRequest<'_>,
    ) -> Result<BlockPartition, DetectorError> {
        assert!(request.probability() == 0.0, "detector crashed");
        Ok(BlockPartition::new(alternating(request.network().node_count()), 1.0, 2.0))
    }
}

/// Never trivial; records every thread limit it receives.
#[derive(Default)]
pub(crate) struct RecordingThreads {
    calls: Mutex<Vec<Option<NonZeroUsize>>>,
}

impl RecordingThreads {
    pub(crate) fn calls(&self) -> Vec<Option<NonZeroUsize>> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl BlockModelDetector for RecordingThreads {
    fn name(&self) -> &str {
        "recording"
    }

    fn minimize_blocks(
        &self,
        request: &DetectionRequest<'_>,
    ) -> Result<BlockPartition, DetectorError> {
        Ok(BlockPartition::new(alternating(request.network().node_count()), 1.0, 2.0))
    }

    fn set_internal_threads(&self, limit: Option<NonZeroUsize>) {
        self.calls.lock().expect("calls lock").push(limit);
    }
}

/// Returns the given scores in turn, wrapping around.
pub(crate) struct FixedModularity {
    scores: Vec<f64>,
    next: AtomicUsize,
}

impl FixedModularity {
    pub(crate) fn cycling(scores: Vec<f64>) -> Self {
        Self {
            scores,
            next: AtomicUsize::new(0),
        }
    }
}

impl ModularityDetector for FixedModularity {
    fn name(&self) -> &str {
        "fixed-modularity"
    }

    fn maximize_modularity(&self, _network: &Network) -> Result<f64, DetectorError> {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.scores.len();
        Ok(self.scores[index])
    }
}

/// Single-level greedy modularity maximiser (Louvain local moving).
pub(crate) struct LocalMovingModularity;

impl ModularityDetector for LocalMovingModularity {
    fn name(&self) -> &str {
        "local-moving"
    }

    fn maximize_modularity(&self, network: &Network) -> Result<f64, DetectorError> {
        let node_count = network.node_count();
        let edges = network
            .edges()
            .iter()
            .copied()
            .filter(|(source, target)| source != target)
            .collect::<Vec<_>>();
        if edges.is_empty() {
            return Ok(0.0);
        }

        let mut adjacency = vec![Vec::new(); node_count];
        for &(source, target) in &edges {
            adjacency[source].push(target);
            adjacency[target].push(source);
        }
        let degrees = adjacency
            .iter()
            .map(|neighbours| neighbours.len() as f64)
            .collect::<Vec<_>>();
        let m = edges.len() as f64;

        let mut communities = (0..node_count).collect::<Vec<_>>();
        let mut totals = degrees.clone();
        for _ in 0..100 {
            let mut moved = false;
            for node in 0..node_count {
                let current = communities[node];
                let degree = degrees[node];
                totals[current] -= degree;

                let mut links = BTreeMap::new();
                for &neighbour in &adjacency[node] {
                    *links.entry(communities[neighbour]).or_insert(0.0) += 1.0;
                }
                let gain = |community: usize, inside: f64| {
                    inside / m - totals[community] * degree / (2.0 * m * m)
                };
                let inside_current = links.get(&current).copied().unwrap_or(0.0);
                let mut best = (current, gain(current, inside_current));
                for (&community, &inside) in &links {
                    let candidate = gain(community, inside);
                    if candidate > best.1 + 1e-12 {
                        best = (community, candidate);
                    }
                }

                communities[node] = best.0;
                totals[best.0] += degree;
                moved |= best.0 != current;
            }
            if !moved {
                break;
            }
        }

        let mut inside = vec![0.0; node_count];
        for &(source, target) in &edges {
            if communities[source] == communities[target] {
                inside[communities[source]] += 1.0;
            }
        }
        Ok(inside
            .iter()
            .zip(&totals)
            .map(|(&inside, &total)| inside / m - (total / (2.0 * m)).powi(2))
            .sum())
    }
}

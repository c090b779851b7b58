use rmodularity_core::{
    BlockModelDetector, BlockPartition, DetectionRequest, DetectorError, Network,
};

/// Undirected cycle over `node_count` nodes.
#[must_use]
pub fn ring(node_count: usize) -> Network {
    let edges = (0..node_count).map(|node| (node, (node + 1) % node_count)).collect();
    Network::new(node_count, edges, false).expect("ring must be valid")
}

/// Splits nodes by parity until the rewiring probability reaches `threshold`,
/// then returns a single block.
pub struct Step {
    threshold: f64,
}

impl Step {
    #[must_use]
    pub fn at(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl BlockModelDetector for Step {
    fn name(&self) -> &str {
        "step"
    }

    fn minimize_blocks(
        &self,
        request: &DetectionRequest<'_>,
    ) -> Result<BlockPartition, DetectorError> {
        let nodes = request.network().node_count();
        if request.probability() >= self.threshold {
            Ok(BlockPartition::new(vec![0; nodes], 12.0, 12.0))
        } else {
            Ok(BlockPartition::new((0..nodes).map(|node| node % 2).collect(), 9.0, 12.0))
        }
    }
}

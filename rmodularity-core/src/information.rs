//! Information modularity: the description-length saving of the detected
//! block structure over a single block.

use tracing::{info, instrument};

use crate::{
    Result,
    detector::{BlockModelDetector, DetectionRequest, detect_blocks, detector_failure},
    error::DetectorError,
    network::Network,
};

/// Returns `1 - dl_detected / dl_trivial` for one detector run on `network`.
///
/// The network is used as given, without giant-component reduction.
///
/// # Errors
/// Returns [`crate::RModularityError::Detector`] when the detector fails,
/// returns a malformed partition, or reports a trivial description length of
/// zero.
///
/// # Examples
/// ```
/// use rmodularity_core::{
///     BlockModelDetector, BlockPartition, DetectionRequest, DetectorError, Network,
///     information_modularity,
/// };
///
/// struct Halves;
///
/// impl BlockModelDetector for Halves {
///     fn name(&self) -> &str { "halves" }
///     fn minimize_blocks(
///         &self,
///         request: &DetectionRequest<'_>,
///     ) -> Result<BlockPartition, DetectorError> {
///         let nodes = request.network().node_count();
///         Ok(BlockPartition::new((0..nodes).map(|node| node * 2 / nodes).collect(), 30.0, 40.0))
///     }
/// }
///
/// let network = Network::new(4, vec![(0, 1), (2, 3), (1, 2)], false)?;
/// let score = information_modularity(&network, &Halves, true)?;
/// assert!((score - 0.25).abs() < 1e-12);
/// # Ok::<(), rmodularity_core::RModularityError>(())
/// ```
#[instrument(
    name = "rmodularity.information_modularity",
    err,
    skip(network, detector),
    fields(
        nodes = network.node_count(),
        edges = network.edge_count(),
        detector = %detector.name()
    ),
)]
pub fn information_modularity<D>(
    network: &Network,
    detector: &D,
    degree_corrected: bool,
) -> Result<f64>
where
    D: BlockModelDetector + ?Sized,
{
    let partition = detect_blocks(detector, &DetectionRequest::new(network, degree_corrected))?;
    if partition.dl_trivial() == 0.0 {
        return Err(detector_failure(detector.name(), DetectorError::ZeroTrivialLength));
    }
    let value = 1.0 - partition.dl_detected() / partition.dl_trivial();
    info!(value, blocks = partition.block_count(), "information modularity computed");
    Ok(value)
}

//! Community-detection capabilities consumed by the estimators.
//!
//! Detectors are black boxes: they may be nondeterministic and are only
//! expected to be best-effort optimisers. This module defines the two call
//! contracts the estimators rely on and validates every result before the
//! sampling logic sees it.

use std::{collections::HashSet, num::NonZeroUsize, sync::Arc};

use crate::{
    Result,
    error::{DescriptionLength, DetectorError, RModularityError},
    network::Network,
};

/// Input handed to a [`BlockModelDetector`].
///
/// Besides the network it records the rewiring probability the network was
/// produced at. Real detectors have no use for it; it exists for logging and
/// for deterministic test doubles.
#[derive(Clone, Copy, Debug)]
pub struct DetectionRequest<'a> {
    network: &'a Network,
    degree_corrected: bool,
    probability: f64,
}

impl<'a> DetectionRequest<'a> {
    /// Creates a request for an unperturbed network.
    #[must_use]
    pub fn new(network: &'a Network, degree_corrected: bool) -> Self {
        Self {
            network,
            degree_corrected,
            probability: 0.0,
        }
    }

    /// Records the rewiring probability that produced the network.
    #[must_use]
    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    /// Network to partition.
    #[must_use]
    #[rustfmt::skip]
    pub fn network(&self) -> &'a Network { self.network }

    /// Whether the degree-corrected block model should be used.
    #[must_use]
    #[rustfmt::skip]
    pub fn degree_corrected(&self) -> bool { self.degree_corrected }

    /// Rewiring probability the network was produced at.
    #[must_use]
    #[rustfmt::skip]
    pub fn probability(&self) -> f64 { self.probability }
}

/// Result of a block-model minimisation.
///
/// # Examples
/// ```
/// use rmodularity_core::BlockPartition;
///
/// let partition = BlockPartition::new(vec![3, 3, 7], 10.0, 12.5);
/// assert_eq!(partition.block_count(), 2);
/// assert!(!partition.is_trivial());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BlockPartition {
    blocks: Vec<usize>,
    dl_detected: f64,
    dl_trivial: f64,
}

impl BlockPartition {
    /// Wraps a block assignment with its description lengths.
    ///
    /// Block labels need not be contiguous.
    #[must_use]
    pub fn new(blocks: Vec<usize>, dl_detected: f64, dl_trivial: f64) -> Self {
        Self {
            blocks,
            dl_detected,
            dl_trivial,
        }
    }

    /// Block label of every node.
    #[must_use]
    #[rustfmt::skip]
    pub fn blocks(&self) -> &[usize] { &self.blocks }

    /// Description length of the detected partition.
    #[must_use]
    #[rustfmt::skip]
    pub fn dl_detected(&self) -> f64 { self.dl_detected }

    /// Description length of the single-block partition.
    #[must_use]
    #[rustfmt::skip]
    pub fn dl_trivial(&self) -> f64 { self.dl_trivial }

    /// Number of distinct block labels.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.iter().collect::<HashSet<_>>().len()
    }

    /// Whether every node landed in the same block.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.block_count() == 1
    }
}

/// Stochastic block-model minimiser.
///
/// Implementations are called concurrently from worker threads and must not
/// share mutable state across calls.
///
/// # Examples
/// ```
/// use rmodularity_core::{BlockModelDetector, BlockPartition, DetectionRequest, DetectorError};
///
/// struct OneBlock;
///
/// impl BlockModelDetector for OneBlock {
///     fn name(&self) -> &str { "one-block" }
///     fn minimize_blocks(
///         &self,
///         request: &DetectionRequest<'_>,
///     ) -> Result<BlockPartition, DetectorError> {
///         let nodes = request.network().node_count();
///         Ok(BlockPartition::new(vec![0; nodes], 1.0, 1.0))
///     }
/// }
/// ```
pub trait BlockModelDetector: Sync {
    /// Human-readable name used in diagnostics.
    fn name(&self) -> &str;

    /// Finds a low-description-length block assignment for the request.
    ///
    /// # Errors
    /// Implementations return [`DetectorError::Failed`] when they cannot
    /// produce a partition.
    fn minimize_blocks(
        &self,
        request: &DetectionRequest<'_>,
    ) -> core::result::Result<BlockPartition, DetectorError>;

    /// Limits the detector's own worker threads. `None` lifts the limit.
    ///
    /// Estimators call this with one thread while their worker pool is
    /// active and with `None` once it is released.
    fn set_internal_threads(&self, _limit: Option<NonZeroUsize>) {}
}

/// Modularity maximiser.
///
/// Implementations are called concurrently from worker threads and must not
/// share mutable state across calls.
pub trait ModularityDetector: Sync {
    /// Human-readable name used in diagnostics.
    fn name(&self) -> &str;

    /// Returns the modularity of the best partition found.
    ///
    /// # Errors
    /// Implementations return [`DetectorError::Failed`] when they cannot
    /// produce a partition.
    fn maximize_modularity(&self, network: &Network) -> core::result::Result<f64, DetectorError>;

    /// Limits the detector's own worker threads. `None` lifts the limit.
    fn set_internal_threads(&self, _limit: Option<NonZeroUsize>) {}
}

/// Runs `detector` once and validates the result.
pub(crate) fn detect_blocks<D: BlockModelDetector + ?Sized>(
    detector: &D,
    request: &DetectionRequest<'_>,
) -> Result<BlockPartition> {
    detector
        .minimize_blocks(request)
        .and_then(|partition| validate_partition(request.network(), partition))
        .map_err(|error| detector_failure(detector.name(), error))
}

/// Best modularity over `trials` detector runs.
pub(crate) fn best_modularity<M: ModularityDetector + ?Sized>(
    detector: &M,
    network: &Network,
    trials: NonZeroUsize,
) -> Result<f64> {
    let mut best = f64::NEG_INFINITY;
    for _ in 0..trials.get() {
        best = best.max(modularity_score(detector, network)?);
    }
    Ok(best)
}

/// Runs `detector` once and validates the score.
pub(crate) fn modularity_score<M: ModularityDetector + ?Sized>(
    detector: &M,
    network: &Network,
) -> Result<f64> {
    detector
        .maximize_modularity(network)
        .and_then(|score| {
            if score.is_finite() {
                Ok(score)
            } else {
                Err(DetectorError::NonFiniteModularity { value: score })
            }
        })
        .map_err(|error| detector_failure(detector.name(), error))
}

pub(crate) fn detector_failure(detector: &str, error: DetectorError) -> RModularityError {
    RModularityError::Detector {
        detector: Arc::from(detector),
        error,
    }
}

fn validate_partition(
    network: &Network,
    partition: BlockPartition,
) -> core::result::Result<BlockPartition, DetectorError> {
    if partition.blocks.len() != network.node_count() {
        return Err(DetectorError::AssignmentLengthMismatch {
            expected: network.node_count(),
            got: partition.blocks.len(),
        });
    }
    for (which, value) in [
        (DescriptionLength::Detected, partition.dl_detected),
        (DescriptionLength::Trivial, partition.dl_trivial),
    ] {
        if !value.is_finite() {
            return Err(DetectorError::NonFiniteDescriptionLength { which, value });
        }
    }
    Ok(partition)
}

//! Fixed-grid Robustness Modularity estimator.
//!
//! The trivial-partition ratio is sampled at evenly spaced rewiring
//! probabilities and integrated with the trapezoid rule.

use std::{iter, sync::Arc};

use tracing::{debug, info, instrument};

use crate::{
    Result,
    detector::BlockModelDetector,
    executor::TrialExecutor,
    integrate::{linspace, trapezoid},
    network::Network,
    params::GridParams,
    trial::{TrialOutcome, TrialRunner, TrivialTally},
};

/// TPR curve sampled on the grid together with the raw description lengths.
///
/// `dl_detected[row]` and `dl_trivial[row]` hold one value per detector run at
/// `probabilities[row]`.
#[derive(Clone, Debug, PartialEq)]
pub struct TprCurves {
    /// Grid probabilities in increasing order.
    pub probabilities: Vec<f64>,
    /// Trivial partition ratio at each probability.
    pub tpr: Vec<f64>,
    /// Detected description lengths per probability.
    pub dl_detected: Vec<Vec<f64>>,
    /// Trivial description lengths per probability.
    pub dl_trivial: Vec<Vec<f64>>,
}

impl TprCurves {
    /// Mean detected description length of each row.
    #[must_use]
    pub fn mean_dl_detected(&self) -> Vec<f64> {
        self.dl_detected.iter().map(|row| mean(row)).collect()
    }

    /// Mean trivial description length of each row.
    #[must_use]
    pub fn mean_dl_trivial(&self) -> Vec<f64> {
        self.dl_trivial.iter().map(|row| mean(row)).collect()
    }

    /// Population standard deviation of the detected description lengths in
    /// each row.
    #[must_use]
    pub fn std_dl_detected(&self) -> Vec<f64> {
        self.dl_detected.iter().map(|row| std_dev(row)).collect()
    }

    /// Population standard deviation of the trivial description lengths in
    /// each row.
    #[must_use]
    pub fn std_dl_trivial(&self) -> Vec<f64> {
        self.dl_trivial.iter().map(|row| std_dev(row)).collect()
    }

    /// Mean of `(trivial - detected) / trivial` over each row.
    ///
    /// Runs whose trivial description length is zero contribute a gap of
    /// zero.
    #[must_use]
    pub fn mean_relative_dl_gap(&self) -> Vec<f64> {
        self.relative_dl_gaps().map(|gaps| mean(&gaps)).collect()
    }

    /// Population standard deviation of the relative gaps in each row.
    #[must_use]
    pub fn std_relative_dl_gap(&self) -> Vec<f64> {
        self.relative_dl_gaps().map(|gaps| std_dev(&gaps)).collect()
    }

    fn relative_dl_gaps(&self) -> impl Iterator<Item = Vec<f64>> + '_ {
        self.dl_detected
            .iter()
            .zip(&self.dl_trivial)
            .map(|(detected, trivial)| {
                detected
                    .iter()
                    .zip(trivial)
                    .map(|(&detected, &trivial)| {
                        if trivial == 0.0 {
                            0.0
                        } else {
                            (trivial - detected) / trivial
                        }
                    })
                    .collect()
            })
    }

    fn push_row(&mut self, probability: f64, tally: TrivialTally, row: &[TrialOutcome]) {
        self.probabilities.push(probability);
        self.tpr.push(tally.ratio());
        let trials = row.iter().flat_map(|outcome| &outcome.trials);
        self.dl_detected.push(trials.clone().map(|trial| trial.dl_detected).collect());
        self.dl_trivial.push(trials.map(|trial| trial.dl_trivial).collect());
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "row lengths are far below the f64 mantissa limit"
)]
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "row lengths are far below the f64 mantissa limit"
)]
fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let centre = mean(values);
    let variance = values
        .iter()
        .map(|value| (value - centre).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// Output of [`r_modularity`].
#[derive(Clone, Debug, PartialEq)]
pub struct RobustnessEstimate {
    /// Robustness Modularity in `[0, 1]`.
    pub value: f64,
    /// Sampled curves, present when requested through
    /// [`GridParams::with_output_curves`].
    pub curves: Option<TprCurves>,
}

/// Estimates Robustness Modularity on a fixed probability grid.
///
/// The network is reduced to its giant component; then, for each of the
/// `rewire_resolution` probabilities, `perturbation_count` perturbed networks
/// are each partitioned `detection_trials` times.
///
/// # Errors
/// Returns [`crate::RModularityError::DegenerateNetwork`] when the giant
/// component has fewer than two nodes, and propagates detector and worker
/// failures.
///
/// # Examples
/// ```
/// use rmodularity_core::{
///     BlockModelDetector, BlockPartition, DetectionRequest, DetectorError, ExecutionStrategy,
///     GridParams, Network, r_modularity,
/// };
///
/// // Collapses to one block once half of the edges are rewired.
/// struct Step;
///
/// impl BlockModelDetector for Step {
///     fn name(&self) -> &str { "step" }
///     fn minimize_blocks(
///         &self,
///         request: &DetectionRequest<'_>,
///     ) -> Result<BlockPartition, DetectorError> {
///         let nodes = request.network().node_count();
///         let blocks = if request.probability() >= 0.5 {
///             vec![0; nodes]
///         } else {
///             (0..nodes).map(|node| node % 2).collect()
///         };
///         Ok(BlockPartition::new(blocks, 1.0, 1.0))
///     }
/// }
///
/// let ring = Network::new(4, vec![(0, 1), (1, 2), (2, 3), (3, 0)], false)?;
/// let params = GridParams::new(1, 1, 3)?.with_execution(ExecutionStrategy::Sequential);
/// let estimate = r_modularity(&ring, &Step, &params)?;
/// assert!((estimate.value - 0.25).abs() < 1e-12);
/// # Ok::<(), rmodularity_core::RModularityError>(())
/// ```
#[instrument(
    name = "rmodularity.grid",
    err,
    skip(network, detector, params),
    fields(
        nodes = network.node_count(),
        edges = network.edge_count(),
        detector = %detector.name(),
        resolution = params.rewire_resolution().get(),
        strategy = ?params.execution()
    ),
)]
pub fn r_modularity<D>(
    network: &Network,
    detector: &D,
    params: &GridParams,
) -> Result<RobustnessEstimate>
where
    D: BlockModelDetector + ?Sized,
{
    let giant = Arc::new(network.sampling_component()?);
    let executor = TrialExecutor::new(params.execution())?;
    let _threads = executor.limit_detector_threads(|limit| detector.set_internal_threads(limit));
    let runner = TrialRunner::new(
        &executor,
        detector,
        giant,
        params.detection_trials(),
        params.degree_corrected(),
    );

    let probabilities = linspace(params.rewire_resolution().get());
    let per_row = params.perturbation_count().get();
    let batch = probabilities
        .iter()
        .flat_map(|&probability| iter::repeat_n(probability, per_row))
        .collect::<Vec<_>>();
    let outcomes = runner.run_batch(&batch)?;

    let mut curves = TprCurves {
        probabilities: Vec::with_capacity(probabilities.len()),
        tpr: Vec::with_capacity(probabilities.len()),
        dl_detected: Vec::with_capacity(probabilities.len()),
        dl_trivial: Vec::with_capacity(probabilities.len()),
    };
    for (&probability, row) in probabilities.iter().zip(outcomes.chunks(per_row)) {
        let tally = TrivialTally::from_outcomes(row);
        debug!(probability, tpr = tally.ratio(), runs = tally.runs, "grid row sampled");
        curves.push_row(probability, tally, row);
    }

    let value = 1.0 - trapezoid(&curves.probabilities, &curves.tpr)?;
    info!(value, "robustness modularity estimated");
    Ok(RobustnessEstimate {
        value,
        curves: params.output_curves().then_some(curves),
    })
}

//! Adaptive Robustness Modularity estimators.
//!
//! Both estimators first look for the plateau boundary `p*`, the smallest
//! rewiring probability from which every detection is trivial, and then
//! sample below it until the estimate stops moving.
//!
//! [`r_modularity_fast`] bisects to `p*` up front and then refines
//! `p* (1 - TPR)` with uniform Monte-Carlo batches over `[0, p*]`.
//! [`r_modularity_fast_curve`] interleaves the two phases and integrates the
//! accumulated TPR curve instead.

mod state;


use std::{num::NonZeroUsize, sync::Arc};

use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::{debug, info, instrument, warn};

use crate::{
    Result,
    detector::BlockModelDetector,
    error::{AdaptivePhase, RModularityError},
    executor::TrialExecutor,
    network::Network,
    params::AdaptiveParams,
    trial::{TrialRunner, TrivialTally},
};

pub use self::state::{ConvergenceState, CurveAccumulator, CurvePoint, relative_change};

/// Output of [`r_modularity_fast_curve`].
#[derive(Clone, Debug, PartialEq)]
pub struct CurveEstimate {
    /// Robustness Modularity in `[0, 1]`.
    pub value: f64,
    /// Upper end of the bisection interval when the loop stopped.
    pub plateau_boundary: f64,
    /// Every sampled point, sorted by probability.
    pub curve: Vec<CurvePoint>,
}

/// Estimates Robustness Modularity with bisection followed by Monte-Carlo
/// refinement.
///
/// Returns `0.0` straight away when the unperturbed network already collapses
/// to one block in every run.
///
/// # Errors
/// Returns [`RModularityError::DegenerateNetwork`] for inputs whose giant
/// component has fewer than two nodes,
/// [`RModularityError::ConvergenceNotReached`] when either phase exhausts its
/// iteration bound, and propagates detector and worker failures.
#[instrument(
    name = "rmodularity.fast",
    err,
    skip(network, detector, params),
    fields(
        nodes = network.node_count(),
        edges = network.edge_count(),
        detector = %detector.name(),
        strategy = ?params.execution()
    ),
)]
pub fn r_modularity_fast<D>(
    network: &Network,
    detector: &D,
    params: &AdaptiveParams,
) -> Result<f64>
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
    let repetitions = params.perturbation_count();

    if runner.tally_at(0.0, repetitions)?.is_all_trivial() {
        warn!("unperturbed network is already trivial; robustness is zero");
        return Ok(0.0);
    }

    let state = plateau_boundary(&runner, params)?;
    let (_, boundary) = state.probability_range();
    debug!(plateau_boundary = boundary, "coarse phase finished");

    let state = refine(&runner, params, state)?;
    let value = state.last_estimate().unwrap_or(boundary);
    info!(value, plateau_boundary = boundary, "robustness modularity estimated");
    Ok(value)
}

/// Estimates Robustness Modularity by integrating an adaptively sampled TPR
/// curve.
///
/// Each iteration performs at most one bisection step towards the plateau
/// boundary and one Monte-Carlo probe below it. The stability streak only
/// counts once the bisection has converged.
///
/// # Errors
/// As for [`r_modularity_fast`]. Bisection shares the `max_fine_batches`
/// loop, so running out of batches before the plateau boundary converges is
/// reported against the coarse phase.
#[instrument(
    name = "rmodularity.fast_curve",
    err,
    skip(network, detector, params),
    fields(
        nodes = network.node_count(),
        edges = network.edge_count(),
        detector = %detector.name(),
        strategy = ?params.execution()
    ),
)]
pub fn r_modularity_fast_curve<D>(
    network: &Network,
    detector: &D,
    params: &AdaptiveParams,
) -> Result<CurveEstimate>
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
    let repetitions = params.perturbation_count();

    let mut curve = CurveAccumulator::default();
    let at_zero = runner.tally_at(0.0, repetitions)?;
    curve.insert(CurvePoint::from_tally(0.0, at_zero));
    if at_zero.is_all_trivial() {
        warn!("unperturbed network is already trivial; robustness is zero");
        return Ok(CurveEstimate {
            value: 0.0,
            plateau_boundary: 0.0,
            curve: curve.into_points(),
        });
    }

    let at_one = runner.tally_at(1.0, repetitions)?;
    curve.insert(CurvePoint::from_tally(1.0, at_one));
    let mut bisecting = params.use_coarse_step() && at_one.is_all_trivial();
    let mut coarse_iterations = 0;
    let mut state = ConvergenceState::new();
    let mut rng = SmallRng::from_entropy();

    for batch in 1..=params.max_fine_batches().get() {
        if bisecting {
            if coarse_iterations == params.max_coarse_iterations().get() {
                return Err(not_converged(AdaptivePhase::Coarse, coarse_iterations));
            }
            let (next, point) = bisect_step(&runner, repetitions, state)?;
            curve.insert(point);
            state = next;
            coarse_iterations += 1;
            bisecting = !state.coarse_converged(params.coarse_error());
        }

        let (_, high) = state.probability_range();
        let probability = rng.gen_range(0.0..=high);
        let tally = runner.tally_at(probability, repetitions)?;
        curve.insert(CurvePoint::from_tally(probability, tally));

        let estimate = curve.estimate()?;
        state = state.observe(estimate, params.fine_error());
        if bisecting {
            state = state.restart_streak();
        }
        debug!(
            batch,
            probability,
            estimate,
            plateau_boundary = high,
            stable = state.consecutive_stable(),
            "curve batch sampled"
        );

        if state.is_stable(params.min_similar_trials()) {
            info!(value = estimate, plateau_boundary = high, "robustness modularity estimated");
            return Ok(CurveEstimate {
                value: estimate,
                plateau_boundary: high,
                curve: curve.into_points(),
            });
        }
    }

    if bisecting {
        return Err(not_converged(AdaptivePhase::Coarse, coarse_iterations));
    }
    Err(not_converged(AdaptivePhase::Fine, params.max_fine_batches().get()))
}

/// Locates the plateau boundary and returns it as the upper end of the
/// state's probability range.
///
/// When the coarse step is disabled, or when even full rewiring leaves some
/// runs non-trivial, the boundary is `1`.
fn plateau_boundary<D>(
    runner: &TrialRunner<'_, D>,
    params: &AdaptiveParams,
) -> Result<ConvergenceState>
where
    D: BlockModelDetector + ?Sized,
{
    let mut state = ConvergenceState::new();
    if !params.use_coarse_step() {
        return Ok(state);
    }
    let repetitions = params.perturbation_count();
    if !runner.tally_at(1.0, repetitions)?.is_all_trivial() {
        debug!("fully rewired network is not always trivial; searching all of [0, 1]");
        return Ok(state);
    }

    let mut iterations = 0;
    while !state.coarse_converged(params.coarse_error()) {
        if iterations == params.max_coarse_iterations().get() {
            return Err(not_converged(AdaptivePhase::Coarse, iterations));
        }
        (state, _) = bisect_step(runner, repetitions, state)?;
        iterations += 1;
    }
    Ok(state)
}

/// Evaluates the midpoint of the state's range and halves the range towards
/// the plateau boundary.
fn bisect_step<D>(
    runner: &TrialRunner<'_, D>,
    repetitions: NonZeroUsize,
    state: ConvergenceState,
) -> Result<(ConvergenceState, CurvePoint)>
where
    D: BlockModelDetector + ?Sized,
{
    let (low, high) = state.probability_range();
    let middle = (low + high) / 2.0;
    let tally = runner.tally_at(middle, repetitions)?;
    debug!(probability = middle, tpr = tally.ratio(), "bisection step");
    let next = if tally.is_all_trivial() {
        state.with_range(low, middle)
    } else {
        state.with_range(middle, high)
    };
    Ok((next, CurvePoint::from_tally(middle, tally)))
}

/// Draws batches of uniform probabilities below the plateau boundary until
/// the estimate `p* (1 - TPR)` is stable.
fn refine<D>(
    runner: &TrialRunner<'_, D>,
    params: &AdaptiveParams,
    mut state: ConvergenceState,
) -> Result<ConvergenceState>
where
    D: BlockModelDetector + ?Sized,
{
    let (_, boundary) = state.probability_range();
    let mut rng = SmallRng::from_entropy();
    let mut tally = TrivialTally::default();

    for batch in 1..=params.max_fine_batches().get() {
        let probabilities = (0..params.perturbation_count().get())
            .map(|_| rng.gen_range(0.0..=boundary))
            .collect::<Vec<_>>();
        tally = tally.add(runner.tally_each(&probabilities)?);
        let estimate = boundary * (1.0 - tally.ratio());
        state = state.observe(estimate, params.fine_error());
        debug!(
            batch,
            estimate,
            tpr = tally.ratio(),
            stable = state.consecutive_stable(),
            "refinement batch sampled"
        );
        if state.is_stable(params.min_similar_trials()) {
            return Ok(state);
        }
    }

    Err(not_converged(AdaptivePhase::Fine, params.max_fine_batches().get()))
}

fn not_converged(phase: AdaptivePhase, iterations: usize) -> RModularityError {
    warn!(%phase, iterations, "adaptive estimator did not converge");
    RModularityError::ConvergenceNotReached { phase, iterations }
}

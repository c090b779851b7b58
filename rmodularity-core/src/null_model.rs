//! Modularity of a network relative to degree-preserving random graphs.

use rand::{Rng, seq::SliceRandom};
use tracing::{debug, info, instrument};

use crate::{
    Result,
    detector::{ModularityDetector, best_modularity, modularity_score},
    error::RModularityError,
    executor::TrialExecutor,
    network::Network,
    params::NullModelParams,
};

/// Draws an undirected multigraph with the given degree sequence by random
/// stub matching.
///
/// The result may contain self-loops and repeated edges; its
/// [`Network::degrees`] equal `degrees` exactly.
///
/// # Errors
/// Returns [`RModularityError::InvalidParameters`] when the degrees sum to an
/// odd number and [`RModularityError::EmptyNetwork`] when `degrees` is empty.
///
/// # Examples
/// ```
/// use rand::{SeedableRng, rngs::SmallRng};
/// use rmodularity_core::configuration_model;
///
/// let mut rng = SmallRng::seed_from_u64(1);
/// let network = configuration_model(&[2, 1, 1], &mut rng)?;
/// assert_eq!(network.degrees(), vec![2, 1, 1]);
/// # Ok::<(), rmodularity_core::RModularityError>(())
/// ```
pub fn configuration_model<R: Rng + ?Sized>(degrees: &[usize], rng: &mut R) -> Result<Network> {
    let total: usize = degrees.iter().sum();
    if total % 2 != 0 {
        return Err(RModularityError::invalid_parameters(format!(
            "degree sequence sums to {total}, which is odd"
        )));
    }

    let mut stubs = degrees
        .iter()
        .enumerate()
        .flat_map(|(node, &degree)| std::iter::repeat_n(node, degree))
        .collect::<Vec<_>>();
    stubs.shuffle(rng);
    let edges = stubs.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect();
    Network::new(degrees.len(), edges, false)
}

/// Observed maximum modularity minus the mean maximum modularity of
/// configuration-model realisations sharing its degree sequence.
///
/// The observed network is reduced to its giant component. Directed inputs
/// contribute their total degrees and the realisations are undirected; each
/// realisation is simplified and reduced to its giant component before
/// detection.
///
/// # Errors
/// Returns [`RModularityError::DegenerateNetwork`] when the giant component
/// has fewer than two nodes and propagates detector and worker failures.
#[instrument(
    name = "rmodularity.modularity_difference",
    err,
    skip(network, detector, params),
    fields(
        nodes = network.node_count(),
        edges = network.edge_count(),
        detector = %detector.name(),
        null_models = params.nullmodel_count().get(),
        strategy = ?params.execution()
    ),
)]
pub fn modularity_difference<M>(
    network: &Network,
    detector: &M,
    params: &NullModelParams,
) -> Result<f64>
where
    M: ModularityDetector + ?Sized,
{
    let giant = network.sampling_component()?;
    let executor = TrialExecutor::new(params.execution())?;
    let _threads = executor.limit_detector_threads(|limit| detector.set_internal_threads(limit));

    let observed = executor
        .dispatch(vec![(); params.detection_trials().get()], |(), _rng| {
            modularity_score(detector, &giant)
        })?
        .into_iter()
        .fold(f64::NEG_INFINITY, f64::max);
    debug!(observed, "observed modularity computed");

    let degrees = giant.degrees();
    let null_scores = executor.dispatch(vec![(); params.nullmodel_count().get()], |(), rng| {
        let realisation = configuration_model(&degrees, rng)?.giant_component();
        best_modularity(detector, &realisation, params.detection_trials_null_model())
    })?;
    let null_mean = mean(&null_scores);

    let difference = observed - null_mean;
    info!(observed, null_mean, difference, "modularity difference computed");
    Ok(difference)
}

#[expect(
    clippy::cast_precision_loss,
    reason = "realisation counts are far below the f64 mantissa limit"
)]
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

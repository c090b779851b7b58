//! Random edge rewiring.
//!
//! Each edge is independently replaced, with probability `p`, by an edge
//! between two uniformly drawn nodes. Self-loops and repeated edges are
//! allowed in the output; the giant-component reduction that follows removes
//! them.

use rand::Rng;

use crate::{
    Result,
    error::RModularityError,
    network::{Edge, Network},
};

/// Rewires each edge of `network` with probability `probability`.
///
/// The returned list has the same length and order as the input. With
/// `probability == 0.0` it equals the input; with `probability == 1.0` every
/// edge is freshly drawn.
///
/// # Errors
/// Returns [`RModularityError::InvalidProbability`] when `probability` is not
/// within `[0, 1]`.
///
/// # Examples
/// ```
/// use rand::{SeedableRng, rngs::SmallRng};
/// use rmodularity_core::{Network, rewire};
///
/// let network = Network::new(3, vec![(0, 1), (1, 2)], false)?;
/// let mut rng = SmallRng::seed_from_u64(7);
/// assert_eq!(rewire(&network, 0.0, &mut rng)?, network.edges());
/// assert_eq!(rewire(&network, 1.0, &mut rng)?.len(), 2);
/// # Ok::<(), rmodularity_core::RModularityError>(())
/// ```
pub fn rewire<R: Rng + ?Sized>(
    network: &Network,
    probability: f64,
    rng: &mut R,
) -> Result<Vec<Edge>> {
    validate_probability(probability)?;
    if probability == 0.0 {
        return Ok(network.edges().to_vec());
    }

    let node_count = network.node_count();
    Ok(network
        .edges()
        .iter()
        .map(|&edge| {
            if rng.gen_bool(probability) {
                (rng.gen_range(0..node_count), rng.gen_range(0..node_count))
            } else {
                edge
            }
        })
        .collect())
}

/// Rewires `network` and wraps the result as a network with the same node
/// count and directedness.
///
/// # Errors
/// Returns [`RModularityError::InvalidProbability`] when `probability` is not
/// within `[0, 1]`.
pub fn perturb<R: Rng + ?Sized>(
    network: &Network,
    probability: f64,
    rng: &mut R,
) -> Result<Network> {
    let edges = rewire(network, probability, rng)?;
    Network::new(network.node_count(), edges, network.is_directed())
}

pub(crate) fn validate_probability(probability: f64) -> Result<()> {
    if (0.0..=1.0).contains(&probability) {
        Ok(())
    } else {
        Err(RModularityError::InvalidProbability { probability })
    }
}

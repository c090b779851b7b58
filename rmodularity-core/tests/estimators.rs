//! End-to-end behaviour of the public estimators.

mod common;

use std::num::NonZeroUsize;

use common::{Step, ring};
use rmodularity_core::{
    AdaptiveParams, BlockModelDetector, BlockPartition, DetectionRequest, DetectorError, ErrorKind,
    ExecutionStrategy, GridParams, Network, NullModelParams, information_modularity,
    modularity_difference, r_modularity, r_modularity_fast, r_modularity_fast_curve,
};
use rstest::rstest;

struct AlwaysTrivial;

impl BlockModelDetector for AlwaysTrivial {
    fn name(&self) -> &str {
        "always-trivial"
    }

    fn minimize_blocks(
        &self,
        request: &DetectionRequest<'_>,
    ) -> Result<BlockPartition, DetectorError> {
        Ok(BlockPartition::new(vec![0; request.network().node_count()], 3.0, 3.0))
    }
}

struct WrongLength;

impl BlockModelDetector for WrongLength {
    fn name(&self) -> &str {
        "wrong-length"
    }

    fn minimize_blocks(
        &self,
        _request: &DetectionRequest<'_>,
    ) -> Result<BlockPartition, DetectorError> {
        Ok(BlockPartition::new(vec![0], 1.0, 1.0))
    }
}

fn parallel() -> ExecutionStrategy {
    ExecutionStrategy::with_threads(NonZeroUsize::new(3).expect("non-zero"))
}

#[rstest]
#[case::sequential(ExecutionStrategy::Sequential)]
#[case::parallel(parallel())]
fn four_node_ring_with_step_at_half_is_exactly_a_quarter(#[case] strategy: ExecutionStrategy) {
    let params = GridParams::new(1, 1, 3)
        .expect("parameters must be valid")
        .with_execution(strategy);
    let estimate = r_modularity(&ring(4), &Step::at(0.5), &params).expect("estimate must succeed");
    assert!((estimate.value - 0.25).abs() < 1e-12, "estimate {}", estimate.value);
}

#[rstest]
#[case(0.0)]
#[case(0.2)]
#[case(0.7)]
#[case(1.5)]
fn grid_estimate_stays_in_unit_interval(#[case] threshold: f64) {
    let params = GridParams::new(2, 2, 6)
        .expect("parameters must be valid")
        .with_execution(parallel());
    let value = r_modularity(&ring(16), &Step::at(threshold), &params)
        .expect("estimate must succeed")
        .value;
    assert!((0.0..=1.0).contains(&value), "estimate {value}");
}

#[test]
fn never_trivial_below_one_leaves_only_the_last_grid_cell() {
    let params = GridParams::new(2, 1, 51)
        .expect("parameters must be valid")
        .with_execution(parallel());
    let value = r_modularity(&ring(16), &Step::at(1.0), &params)
        .expect("estimate must succeed")
        .value;
    assert!((value - 0.99).abs() < 1e-9, "estimate {value}");
}

#[test]
fn always_trivial_detector_has_no_robustness() {
    let network = ring(12);
    let grid = r_modularity(&network, &AlwaysTrivial, &GridParams::default())
        .expect("estimate must succeed");
    assert!(grid.value.abs() < 1e-12);
    let fast = r_modularity_fast(&network, &AlwaysTrivial, &AdaptiveParams::default())
        .expect("estimate must succeed");
    assert!(fast.abs() < 1e-12);
}

#[test]
fn curves_are_shaped_per_row() {
    let params = GridParams::new(5, 2, 4)
        .expect("parameters must be valid")
        .with_output_curves(true)
        .with_execution(parallel());
    let curves = r_modularity(&ring(10), &Step::at(0.5), &params)
        .expect("estimate must succeed")
        .curves
        .expect("curves requested");
    assert_eq!(curves.probabilities.len(), 4);
    assert_eq!(curves.tpr.len(), 4);
    assert_eq!(curves.dl_detected.len(), 4);
    assert!(curves.dl_detected.iter().chain(&curves.dl_trivial).all(|row| row.len() == 10));
    assert_eq!(curves.tpr.first().copied(), Some(0.0));
    assert_eq!(curves.tpr.last().copied(), Some(1.0));
    assert_eq!(curves.mean_dl_detected().last().copied(), Some(12.0));
}

#[test]
fn adaptive_estimators_agree_with_the_grid() {
    let network = ring(40);
    let detector = Step::at(0.4);
    let grid = r_modularity(
        &network,
        &detector,
        &GridParams::new(2, 1, 101).expect("parameters must be valid"),
    )
    .expect("estimate must succeed")
    .value;
    let fast = r_modularity_fast(&network, &detector, &AdaptiveParams::default())
        .expect("estimate must converge");
    let curve = r_modularity_fast_curve(&network, &detector, &AdaptiveParams::default())
        .expect("estimate must converge")
        .value;
    assert!((grid - 0.4).abs() < 0.02, "grid {grid}");
    assert!((fast - 0.4).abs() < 0.03, "fast {fast}");
    assert!((curve - 0.4).abs() < 0.03, "curve {curve}");
}

#[test]
fn malformed_partitions_are_oracle_failures() {
    let params = GridParams::new(1, 1, 2)
        .expect("parameters must be valid")
        .with_execution(ExecutionStrategy::Sequential);
    let err = r_modularity(&ring(5), &WrongLength, &params)
        .expect_err("short assignment must be rejected");
    assert_eq!(err.kind(), ErrorKind::OracleFailure);
    assert_eq!(
        err.to_string(),
        "detector `wrong-length` failed: block assignment has length 1 but the network has 5 nodes"
    );
}

#[test]
fn directed_input_is_reduced_before_sampling() {
    // 0 <-> 1 -> 2 plus the isolated node 3.
    let network =
        Network::new(4, vec![(0, 1), (1, 0), (1, 2)], true).expect("network must be valid");
    let params = GridParams::new(1, 1, 3)
        .expect("parameters must be valid")
        .with_execution(ExecutionStrategy::Sequential);
    let estimate = r_modularity(&network, &Step::at(0.5), &params).expect("estimate must succeed");
    assert!((estimate.value - 0.25).abs() < 1e-12);
}

#[test]
fn information_modularity_uses_the_raw_network() {
    let score =
        information_modularity(&ring(6), &Step::at(1.0), true).expect("score must be computed");
    assert!((score - 0.25).abs() < 1e-12);
}

#[test]
fn modularity_difference_rejects_degenerate_networks() {
    struct Unused;

    impl rmodularity_core::ModularityDetector for Unused {
        fn name(&self) -> &str {
            "unused"
        }

        fn maximize_modularity(&self, _network: &Network) -> Result<f64, DetectorError> {
            Err(DetectorError::failed("must not be called"))
        }
    }

    let edgeless = Network::new(2, Vec::new(), false).expect("network must be valid");
    let err = modularity_difference(&edgeless, &Unused, &NullModelParams::default())
        .expect_err("edgeless network must be rejected");
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

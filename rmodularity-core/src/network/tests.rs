//! Unit and property tests for the network model.

use proptest::prelude::*;
use rstest::rstest;

use crate::test_utils::{arbitrary_network, suite_proptest_config};

use super::Network;
use crate::RModularityError;

#[test]
fn rejects_empty_network() {
    let err = Network::new(0, Vec::new(), false).expect_err("zero nodes must be rejected");
    assert_eq!(err, RModularityError::EmptyNetwork);
}

#[rstest]
#[case(vec![(0, 3)], 0, 3)]
#[case(vec![(0, 1), (7, 1)], 1, 7)]
fn rejects_out_of_range_endpoints(
    #[case] edges: Vec<(usize, usize)>,
    #[case] index: usize,
    #[case] node: usize,
) {
    let err = Network::new(3, edges, false).expect_err("endpoint must be rejected");
    assert_eq!(
        err,
        RModularityError::EdgeOutOfRange {
            index,
            node,
            node_count: 3
        }
    );
}

#[test]
fn giant_component_drops_loops_and_duplicates() {
    let network = Network::new(3, vec![(0, 1), (1, 0), (1, 1), (1, 2), (0, 1)], false)
        .expect("network must be valid");
    let giant = network.giant_component();
    assert_eq!(giant.node_count(), 3);
    assert_eq!(giant.edges(), &[(0, 1), (1, 2)]);
}

#[test]
fn directed_giant_component_keeps_reciprocal_edges() {
    let network =
        Network::new(3, vec![(0, 1), (1, 0), (2, 1), (2, 1)], true).expect("network must be valid");
    let giant = network.giant_component();
    assert!(giant.is_directed());
    assert_eq!(giant.edges(), &[(0, 1), (1, 0), (2, 1)]);
}

#[test]
fn giant_component_ignores_direction_for_connectivity() {
    // 0 -> 1 <- 2 is weakly connected even though 0 cannot reach 2.
    let network = Network::new(4, vec![(0, 1), (2, 1)], true).expect("network must be valid");
    let giant = network.giant_component();
    assert_eq!(giant.node_count(), 3);
    assert_eq!(giant.edges(), &[(0, 1), (2, 1)]);
}

#[test]
fn giant_component_remaps_nodes_densely() {
    let network =
        Network::new(7, vec![(6, 4), (4, 5), (0, 1)], false).expect("network must be valid");
    let giant = network.giant_component();
    assert_eq!(giant.node_count(), 3);
    assert_eq!(giant.edges(), &[(0, 2), (0, 1)]);
}

#[test]
fn giant_component_breaks_ties_by_smallest_node() {
    let network =
        Network::new(6, vec![(4, 5), (1, 2), (3, 3)], false).expect("network must be valid");
    let giant = network.giant_component();
    assert_eq!(giant.node_count(), 2);
    assert_eq!(giant.edges(), &[(0, 1)]);
}

#[test]
fn giant_component_of_edgeless_network_is_a_single_node() {
    let network = Network::new(4, Vec::new(), false).expect("network must be valid");
    let giant = network.giant_component();
    assert_eq!(giant.node_count(), 1);
    assert!(giant.edges().is_empty());
    assert_eq!(
        network.sampling_component(),
        Err(RModularityError::DegenerateNetwork { nodes: 1 })
    );
}

#[test]
fn degrees_count_self_loops_twice() {
    let network = Network::new(2, vec![(0, 0), (0, 1)], false).expect("network must be valid");
    assert_eq!(network.degrees(), vec![3, 1]);
}

proptest! {
    #![proptest_config(suite_proptest_config(128))]

    #[test]
    fn giant_component_is_idempotent(network in arbitrary_network()) {
        let once = network.giant_component();
        let twice = once.giant_component();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn giant_component_edges_stay_in_range(network in arbitrary_network()) {
        let giant = network.giant_component();
        prop_assert!(giant.node_count() >= 1);
        prop_assert!(giant.node_count() <= network.node_count());
        for &(source, target) in giant.edges() {
            prop_assert!(source < giant.node_count());
            prop_assert!(target < giant.node_count());
            prop_assert_ne!(source, target);
        }
    }

    #[test]
    fn giant_component_is_connected(network in arbitrary_network()) {
        let giant = network.giant_component();
        let mut sets = super::union_find::DisjointSet::new(giant.node_count());
        for &(source, target) in giant.edges() {
            sets.union(source, target);
        }
        let root = sets.find(0);
        prop_assert_eq!(sets.root_size(root), giant.node_count());
    }
}

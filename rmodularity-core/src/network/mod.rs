//! Network representation and giant-component extraction.
//!
//! A [`Network`] is an immutable edge list over dense node indices. Every
//! estimator reduces its input to the giant component before sampling, and
//! every perturbed network is reduced again before detection.

mod union_find;

#[cfg(test)]
mod tests;

use std::collections::HashSet;

use crate::{Result, error::RModularityError};

use self::union_find::DisjointSet;

/// An edge between two node indices, read as `source -> target` when the
/// network is directed.
pub type Edge = (usize, usize);

/// Immutable network over the nodes `0..node_count`.
///
/// # Examples
/// ```
/// use rmodularity_core::Network;
///
/// let ring = Network::new(4, vec![(0, 1), (1, 2), (2, 3), (3, 0)], false)?;
/// assert_eq!(ring.node_count(), 4);
/// assert_eq!(ring.edge_count(), 4);
/// assert!(!ring.is_directed());
/// # Ok::<(), rmodularity_core::RModularityError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Network {
    node_count: usize,
    edges: Vec<Edge>,
    directed: bool,
}

impl Network {
    /// Builds a network after checking every edge endpoint.
    ///
    /// Self-loops and repeated edges are accepted here; they are removed by
    /// [`Network::giant_component`].
    ///
    /// # Errors
    /// Returns [`RModularityError::EmptyNetwork`] when `node_count` is zero and
    /// [`RModularityError::EdgeOutOfRange`] when an endpoint is not below
    /// `node_count`.
    ///
    /// # Examples
    /// ```
    /// use rmodularity_core::{Network, RModularityError};
    ///
    /// let err = Network::new(2, vec![(0, 2)], false).expect_err("node 2 does not exist");
    /// assert!(matches!(
    ///     err,
    ///     RModularityError::EdgeOutOfRange { index: 0, node: 2, node_count: 2 }
    /// ));
    /// ```
    pub fn new(node_count: usize, edges: Vec<Edge>, directed: bool) -> Result<Self> {
        if node_count == 0 {
            return Err(RModularityError::EmptyNetwork);
        }
        for (index, &(source, target)) in edges.iter().enumerate() {
            for node in [source, target] {
                if node >= node_count {
                    return Err(RModularityError::EdgeOutOfRange {
                        index,
                        node,
                        node_count,
                    });
                }
            }
        }
        Ok(Self {
            node_count,
            edges,
            directed,
        })
    }

    /// Number of nodes, including isolated ones.
    #[must_use]
    #[rustfmt::skip]
    pub fn node_count(&self) -> usize { self.node_count }

    /// Edges in insertion order.
    #[must_use]
    #[rustfmt::skip]
    pub fn edges(&self) -> &[Edge] { &self.edges }

    /// Number of edges, counting repeats and self-loops.
    #[must_use]
    #[rustfmt::skip]
    pub fn edge_count(&self) -> usize { self.edges.len() }

    /// Whether edges carry a direction.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_directed(&self) -> bool { self.directed }

    /// Total degree of every node. A self-loop adds two to its node, so the
    /// degrees always sum to twice the edge count.
    ///
    /// # Examples
    /// ```
    /// use rmodularity_core::Network;
    ///
    /// let path = Network::new(3, vec![(0, 1), (1, 2)], true)?;
    /// assert_eq!(path.degrees(), vec![1, 2, 1]);
    /// # Ok::<(), rmodularity_core::RModularityError>(())
    /// ```
    #[must_use]
    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.node_count];
        for &(source, target) in &self.edges {
            degrees[source] += 1;
            degrees[target] += 1;
        }
        degrees
    }

    /// Returns the simplified largest weakly connected component.
    ///
    /// Self-loops and duplicate edges are dropped first. For undirected
    /// networks `(u, v)` and `(v, u)` are the same edge and are emitted as
    /// `(min, max)`; directed networks keep both orientations. Nodes of the
    /// chosen component are renumbered densely in ascending original order and
    /// edges keep the order of their first occurrence. When several components
    /// share the largest size the one holding the smallest node index wins.
    ///
    /// # Examples
    /// ```
    /// use rmodularity_core::Network;
    ///
    /// let network = Network::new(5, vec![(3, 4), (4, 3), (0, 0), (1, 2)], false)?;
    /// let giant = network.giant_component();
    /// assert_eq!(giant.node_count(), 2);
    /// assert_eq!(giant.edges(), &[(0, 1)]);
    /// # Ok::<(), rmodularity_core::RModularityError>(())
    /// ```
    #[must_use]
    pub fn giant_component(&self) -> Self {
        let edges = self.simplified_edges();
        let mut sets = DisjointSet::new(self.node_count);
        for &(source, target) in &edges {
            sets.union(source, target);
        }

        let mut giant_root = sets.find(0);
        for node in 1..self.node_count {
            let root = sets.find(node);
            if sets.root_size(root) > sets.root_size(giant_root) {
                giant_root = root;
            }
        }

        let mut remap = vec![None; self.node_count];
        let mut next = 0;
        for node in 0..self.node_count {
            if sets.find(node) == giant_root {
                remap[node] = Some(next);
                next += 1;
            }
        }

        let edges = edges
            .into_iter()
            .filter_map(|(source, target)| Some((remap[source]?, remap[target]?)))
            .collect();

        Self {
            node_count: next,
            edges,
            directed: self.directed,
        }
    }

    /// Giant component of a network about to be sampled.
    ///
    /// # Errors
    /// Returns [`RModularityError::DegenerateNetwork`] when the component has
    /// fewer than two nodes.
    pub(crate) fn sampling_component(&self) -> Result<Self> {
        let giant = self.giant_component();
        if giant.node_count < 2 {
            return Err(RModularityError::DegenerateNetwork {
                nodes: giant.node_count,
            });
        }
        Ok(giant)
    }

    fn simplified_edges(&self) -> Vec<Edge> {
        let mut seen = HashSet::with_capacity(self.edges.len());
        self.edges
            .iter()
            .filter_map(|&(source, target)| {
                if source == target {
                    return None;
                }
                let edge = if self.directed {
                    (source, target)
                } else {
                    (source.min(target), source.max(target))
                };
                seen.insert(edge).then_some(edge)
            })
            .collect()
    }
}

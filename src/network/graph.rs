//! Connectivity graph and the annotated graph wrapper used by search.

use std::collections::VecDeque;
use smallvec::SmallVec;

use super::{AnnotatedAdjacency, Street, StreetRef};
use crate::{Error, Result};

/// Unweighted adjacency lists derived from an [`AnnotatedAdjacency`].
///
/// A grid junction has at most four streets, so neighbour lists stay inline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectivityGraph {
    neighbors: Vec<SmallVec<[usize; 4]>>,
}

impl ConnectivityGraph {
    /// O(N²) scan of the matrix; neighbours are listed in ascending order.
    pub fn from_adjacency(adjacency: &AnnotatedAdjacency) -> Self {
        let neighbors = adjacency
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter_map(|(j, cell)| cell.as_ref().map(|_| j))
                    .collect()
            })
            .collect();
        Self { neighbors }
    }

    pub fn node_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Neighbours of `node`; empty when out of range.
    pub fn neighbors(&self, node: usize) -> &[usize] {
        self.neighbors.get(node).map(|n| n.as_slice()).unwrap_or(&[])
    }

    pub fn degree(&self, node: usize) -> usize {
        self.neighbors(node).len()
    }

    pub fn are_neighbors(&self, a: usize, b: usize) -> bool {
        self.neighbors(a).contains(&b)
    }

    /// Hop distance from every node to `target` (`None` when unreachable).
    ///
    /// Streets are undirected, so a BFS from `target` gives distances to it.
    pub fn distances_to(&self, target: usize) -> Vec<Option<usize>> {
        let mut dist = vec![None; self.node_count()];
        if target >= dist.len() {
            return dist;
        }
        dist[target] = Some(0);
        let mut queue = VecDeque::from([target]);
        while let Some(v) = queue.pop_front() {
            let next = dist[v].map_or(0, |d| d + 1);
            for &u in self.neighbors(v) {
                if dist[u].is_none() {
                    dist[u] = Some(next);
                    queue.push_back(u);
                }
            }
        }
        dist
    }

    /// Single-pair hop distance.
    pub fn distance(&self, from: usize, to: usize) -> Option<usize> {
        self.distances_to(to).get(from).copied().flatten()
    }
}

/// An [`AnnotatedAdjacency`] together with its derived connectivity.
///
/// The two are built together and never mutated apart, so they cannot drift.
#[derive(Debug, Clone)]
pub struct AnnotatedGraph {
    adjacency: AnnotatedAdjacency,
    connectivity: ConnectivityGraph,
}

impl AnnotatedGraph {
    /// Validate the matrix shape (and, in strict mode, the mirror invariant)
    /// and derive connectivity.
    pub fn new(adjacency: AnnotatedAdjacency, strict: bool) -> Result<Self> {
        adjacency.check_square()?;
        if strict {
            adjacency.check_symmetry()?;
        }
        let connectivity = ConnectivityGraph::from_adjacency(&adjacency);
        tracing::debug!(
            junctions = adjacency.len(),
            streets = adjacency.street_count(),
            "annotated graph built"
        );
        Ok(Self { adjacency, connectivity })
    }

    pub fn adjacency(&self) -> &AnnotatedAdjacency {
        &self.adjacency
    }

    pub fn connectivity(&self) -> &ConnectivityGraph {
        &self.connectivity
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn neighbors(&self, node: usize) -> Result<&[usize]> {
        self.check_index(node)?;
        Ok(self.connectivity.neighbors(node))
    }

    /// The street from `a` towards `b`, failing when either index is out of
    /// range or the junctions are not joined.
    pub fn validate_street(&self, a: usize, b: usize) -> Result<&Street> {
        self.check_index(a)?;
        self.check_index(b)?;
        self.adjacency.get(a, b).ok_or(Error::NotNeighbors { a, b })
    }

    pub fn street(&self, a: usize, b: usize) -> Option<&Street> {
        self.adjacency.get(a, b)
    }

    /// Every street once as a [`StreetRef`] with `a < b`.
    pub fn street_refs(&self) -> Vec<StreetRef> {
        self.adjacency.streets().map(|(i, j, _)| StreetRef::new(i, j)).collect()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.node_count() {
            return Err(Error::OutOfRange { index, len: self.node_count() });
        }
        Ok(())
    }
}

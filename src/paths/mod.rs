//! Path enumeration between a source street and a receiver street.
//!
//! For each of the four (source end, receiver end) combinations the
//! enumerator lists every walk whose hop count stays within
//! `shortest + threshold`, where `shortest` is the minimum hop distance
//! over the reachable combinations. Walks may revisit junctions.

use serde::{Deserialize, Serialize};
use crate::network::{AnnotatedGraph, StreetRef};
use crate::{Error, Result};

/// A junction sequence from the apparent source to the apparent receiver.
///
/// The first junction is the far end of the source street and the last is
/// the far end of the receiver street, so the first and last hops are the
/// source and receiver streets themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Walk {
    junctions: Vec<usize>,
}

impl Walk {
    pub fn new(junctions: Vec<usize>) -> Self {
        Self { junctions }
    }

    /// Wrap a raw search result with the apparent source and receiver.
    pub fn between(raw: &[usize], source: StreetRef, receiver: StreetRef) -> Self {
        let mut junctions = Vec::with_capacity(raw.len() + 2);
        if let (Some(&first), Some(&last)) = (raw.first(), raw.last()) {
            junctions.push(if first == source.a { source.b } else { source.a });
            junctions.extend_from_slice(raw);
            junctions.push(if last == receiver.a { receiver.b } else { receiver.a });
        }
        Self { junctions }
    }

    pub fn junctions(&self) -> &[usize] {
        &self.junctions
    }

    /// Number of streets traversed.
    pub fn hops(&self) -> usize {
        self.junctions.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.junctions.is_empty()
    }

    /// Consecutive `(from, to)` junction pairs.
    pub fn segments(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.junctions.windows(2).map(|w| (w[0], w[1]))
    }

    /// `(previous, current, following)` for every interior junction.
    pub fn turns(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.junctions.windows(3).map(|w| (w[0], w[1], w[2]))
    }
}

impl std::fmt::Display for Walk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.junctions.iter().map(|j| j.to_string()).collect();
        write!(f, "[{}]", parts.join(" -> "))
    }
}

pub struct PathEnumerator<'g> {
    graph: &'g AnnotatedGraph,
}

impl<'g> PathEnumerator<'g> {
    pub fn new(graph: &'g AnnotatedGraph) -> Self {
        Self { graph }
    }

    /// All walks from `source` to `receiver` within the hop budget.
    ///
    /// Walks found for different end combinations are kept separately even
    /// when they coincide. Identical source and receiver streets yield no
    /// walks.
    pub fn enumerate(
        &self,
        source: StreetRef,
        receiver: StreetRef,
        threshold: usize,
    ) -> Result<Vec<Walk>> {
        self.graph.validate_street(source.a, source.b)?;
        self.graph.validate_street(receiver.a, receiver.b)?;
        if source.same_street(&receiver) {
            return Ok(Vec::new());
        }

        let connectivity = self.graph.connectivity();
        let distances = receiver.ends().map(|r| connectivity.distances_to(r));

        let mut combinations = Vec::with_capacity(4);
        for s in source.ends() {
            for (k, r) in receiver.ends().into_iter().enumerate() {
                if let Some(d) = distances[k][s] {
                    combinations.push((s, r, k, d));
                }
            }
        }
        let shortest = combinations
            .iter()
            .map(|&(_, _, _, d)| d)
            .min()
            .ok_or(Error::NoPath { from: source, to: receiver })?;
        let cutoff = shortest + threshold;
        tracing::trace!(%source, %receiver, shortest, cutoff, "enumerating walks");

        let mut walks = Vec::new();
        for (s, r, k, _) in combinations {
            for raw in self.walks_between(s, r, cutoff + 1, &distances[k]) {
                walks.push(Walk::between(&raw, source, receiver));
            }
        }
        Ok(walks)
    }

    /// Raw walks from `start` to `target`, depth-first with an explicit stack.
    ///
    /// A junction `v` reached with budget `n` is expanded only while
    /// `dist(v, target) < n`; with the initial budget `cutoff + 1` this
    /// admits walks of at most `cutoff` hops. Reaching `target` always
    /// records a walk, and the search carries on past it.
    pub fn walks_between(
        &self,
        start: usize,
        target: usize,
        budget: usize,
        dist: &[Option<usize>],
    ) -> Vec<Vec<usize>> {
        let connectivity = self.graph.connectivity();
        let expandable = |v: usize, n: usize| n > 0 && dist.get(v).copied().flatten().is_some_and(|d| d < n);

        let mut found = Vec::new();
        let mut path = vec![start];
        if start == target {
            found.push(path.clone());
        }
        // (junction, remaining budget, next neighbour index)
        let mut stack: Vec<(usize, usize, usize)> = Vec::new();
        if expandable(start, budget) {
            stack.push((start, budget, 0));
        }

        while let Some(frame) = stack.last_mut() {
            let (v, n, cursor) = *frame;
            let Some(&u) = connectivity.neighbors(v).get(cursor) else {
                stack.pop();
                path.pop();
                continue;
            };
            frame.2 += 1;
            path.push(u);
            if u == target {
                found.push(path.clone());
            }
            if expandable(u, n - 1) {
                stack.push((u, n - 1, 0));
            } else {
                path.pop();
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::GridBuilder;
    use pretty_assertions::assert_eq;

    fn grid(rows: usize, cols: usize) -> AnnotatedGraph {
        let net = GridBuilder::new(rows, cols, 100.0).build(10.0, 0.5, 0.0).unwrap();
        AnnotatedGraph::new(net.adjacency, true).unwrap()
    }

    #[test]
    fn test_single_shortest_walk() {
        // 0 - 1 - 2
        // |   |   |
        // 3 - 4 - 5
        let g = grid(2, 3);
        let walks = PathEnumerator::new(&g)
            .enumerate(StreetRef::new(0, 1), StreetRef::new(4, 5), 0)
            .unwrap();
        assert_eq!(walks, vec![Walk::new(vec![0, 1, 4, 5])]);
    }

    #[test]
    fn test_two_shortest_walks() {
        let g = grid(2, 3);
        let walks = PathEnumerator::new(&g)
            .enumerate(StreetRef::new(0, 3), StreetRef::new(2, 5), 0)
            .unwrap();
        assert_eq!(walks, vec![Walk::new(vec![3, 0, 1, 2, 5]), Walk::new(vec![0, 3, 4, 5, 2])]);
    }

    #[test]
    fn test_same_street_yields_nothing() {
        let g = grid(2, 3);
        let walks = PathEnumerator::new(&g)
            .enumerate(StreetRef::new(0, 1), StreetRef::new(1, 0), 3)
            .unwrap();
        assert!(walks.is_empty());
    }

    #[test]
    fn test_disconnected_is_no_path() {
        let net = GridBuilder::new(1, 4, 100.0)
            .remove_street(1, 2)
            .unwrap()
            .build(10.0, 0.5, 0.0)
            .unwrap();
        let g = AnnotatedGraph::new(net.adjacency, true).unwrap();
        let err = PathEnumerator::new(&g)
            .enumerate(StreetRef::new(0, 1), StreetRef::new(2, 3), 0)
            .unwrap_err();
        assert!(matches!(err, Error::NoPath { .. }));
    }

    #[test]
    fn test_invalid_streets_rejected() {
        let g = grid(2, 3);
        let e = PathEnumerator::new(&g);
        assert!(matches!(
            e.enumerate(StreetRef::new(0, 2), StreetRef::new(4, 5), 0),
            Err(Error::NotNeighbors { a: 0, b: 2 })
        ));
        assert!(matches!(
            e.enumerate(StreetRef::new(0, 1), StreetRef::new(5, 6), 0),
            Err(Error::OutOfRange { index: 6, .. })
        ));
    }

    #[test]
    fn test_walks_are_connected_and_bounded() {
        let g = grid(3, 3);
        let walks = PathEnumerator::new(&g)
            .enumerate(StreetRef::new(0, 1), StreetRef::new(7, 8), 2)
            .unwrap();
        assert!(!walks.is_empty());
        // shortest raw distance is 2 (1 -> 4 -> 7), so raw walks have <= 4 hops
        for walk in &walks {
            assert!(walk.hops() <= 4 + 2, "walk too long: {walk}");
            for (a, b) in walk.segments() {
                assert!(g.connectivity().are_neighbors(a, b), "{walk} jumps {a} -> {b}");
            }
        }
    }

    #[test]
    fn test_walk_passes_through_receiver() {
        // Line 0 - 1 - 2 - 3: from junction 1 to junction 2 with budget 4
        // includes 1 -> 2 -> 3 -> 2 and 1 -> 2 -> 1 -> 2.
        let g = grid(1, 4);
        let dist = g.connectivity().distances_to(2);
        let raw = PathEnumerator::new(&g).walks_between(1, 2, 4, &dist);
        assert!(raw.contains(&vec![1, 2]));
        assert!(raw.contains(&vec![1, 2, 3, 2]));
        assert!(raw.contains(&vec![1, 2, 1, 2]));
        assert!(raw.iter().all(|w| w.len() - 1 <= 3));
    }
}

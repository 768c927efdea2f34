//! Property tests for network, search and junction invariants.

use proptest::prelude::*;
use proptest::sample::Index;
use std::f64::consts::FRAC_PI_2;

use streetwave::{
    AnnotatedGraph, ConnectivityGraph, JunctionDescriptor, PathEnumerator, RelativeDirection,
    GridBuilder, StreetRef,
};
use streetwave::network::AnnotatedAdjacency;

/// A grid with some per-street width/absorption customisation applied.
fn customised_grid() -> impl Strategy<Value = AnnotatedAdjacency> {
    (2usize..5, 2usize..5, prop::collection::vec((any::<Index>(), 1.0f64..40.0, 0.0f64..=1.0, 0.0f64..=1.0), 0..6))
        .prop_map(|(rows, cols, edits)| {
            let mut adjacency = GridBuilder::new(rows, cols, 100.0).build(10.0, 0.5, 0.0).unwrap().adjacency;
            let streets: Vec<(usize, usize)> = adjacency.streets().map(|(i, j, _)| (i, j)).collect();
            for (index, width, alpha, beta) in edits {
                let (i, j) = streets[index.index(streets.len())];
                adjacency.set_width(j, i, width).unwrap();
                adjacency.set_alpha(i, j, alpha).unwrap();
                adjacency.set_beta(j, i, beta).unwrap();
            }
            adjacency
        })
}

proptest! {
    #[test]
    fn prop_adjacency_stays_mirrored(adjacency in customised_grid()) {
        prop_assert!(adjacency.check_symmetry().is_ok());
        for (i, j, street) in adjacency.streets() {
            let mirror = adjacency.get(j, i).unwrap();
            prop_assert_eq!(street.width, mirror.width);
            prop_assert_eq!(street.alpha, mirror.alpha);
            prop_assert_eq!(street.beta, mirror.beta);
            prop_assert_eq!(mirror.orientation.value(), (street.orientation.value() + 2) % 4);
        }
    }

    #[test]
    fn prop_connectivity_rebuild_is_idempotent(adjacency in customised_grid()) {
        let first = ConnectivityGraph::from_adjacency(&adjacency);
        let second = ConnectivityGraph::from_adjacency(&adjacency);
        prop_assert_eq!(&first, &second);
        for i in 0..adjacency.len() {
            for &j in first.neighbors(i) {
                prop_assert!(first.are_neighbors(j, i));
            }
        }
    }

    #[test]
    fn prop_walk_count_monotone_in_threshold(
        rows in 2usize..4,
        cols in 2usize..4,
        source in any::<Index>(),
        receiver in any::<Index>(),
    ) {
        let adjacency = GridBuilder::new(rows, cols, 100.0).build(10.0, 0.5, 0.0).unwrap().adjacency;
        let graph = AnnotatedGraph::new(adjacency, true).unwrap();
        let streets = graph.street_refs();
        let s = streets[source.index(streets.len())];
        let r = streets[receiver.index(streets.len())];
        let enumerator = PathEnumerator::new(&graph);

        let mut previous = 0;
        for threshold in 0..3 {
            let walks = enumerator.enumerate(s, r, threshold).unwrap();
            prop_assert!(walks.len() >= previous, "threshold {}: {} < {}", threshold, walks.len(), previous);
            for walk in &walks {
                for (a, b) in walk.segments() {
                    prop_assert!(graph.connectivity().are_neighbors(a, b));
                }
                let first = walk.junctions()[0];
                let last = *walk.junctions().last().unwrap();
                prop_assert!(s.other_end(first).is_some());
                prop_assert!(r.other_end(last).is_some());
            }
            previous = walks.len();
        }
    }

    #[test]
    fn prop_symmetric_junction_functions_are_probabilities(
        theta in 0.0f64..FRAC_PI_2,
        entry in 1.0f64..50.0,
        side in 1.0f64..50.0,
        exit in 0usize..4,
    ) {
        let next = RelativeDirection::ALL[exit];
        let cross = JunctionDescriptor::new(0, entry, Some(entry), Some(side), Some(side), next);
        let value = cross.classify().unwrap().evaluate(theta);
        prop_assert!((0.0..=1.0).contains(&value), "{}", value);

        if next != RelativeDirection::Forward {
            let t = JunctionDescriptor::new(0, entry, None, Some(side), Some(side), next);
            let value = t.classify().unwrap().evaluate(theta);
            prop_assert!((0.0..=1.0).contains(&value), "{}", value);
        }
    }

    #[test]
    fn prop_same_street_has_no_walks(rows in 2usize..4, cols in 2usize..4, pick in any::<Index>()) {
        let adjacency = GridBuilder::new(rows, cols, 100.0).build(10.0, 0.5, 0.0).unwrap().adjacency;
        let graph = AnnotatedGraph::new(adjacency, true).unwrap();
        let streets = graph.street_refs();
        let s = streets[pick.index(streets.len())];
        let reversed = StreetRef::new(s.b, s.a);
        prop_assert!(PathEnumerator::new(&graph).enumerate(s, reversed, 2).unwrap().is_empty());
    }
}

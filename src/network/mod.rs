//! # Street Network Model
//!
//! Junctions are indices `0..N`; streets are typed cells of an N×N
//! [`AnnotatedAdjacency`]. [`AnnotatedGraph`] pairs the matrix with the
//! unweighted [`ConnectivityGraph`] that path search walks over.
//!
//! This module is pure data: no I/O, no global state.

pub mod street;
pub mod adjacency;
pub mod graph;
pub mod grid;

pub use street::{Orientation, Street, StreetRef};
pub use adjacency::AnnotatedAdjacency;
pub use graph::{AnnotatedGraph, ConnectivityGraph};
pub use grid::{GridBuilder, Network, Point};

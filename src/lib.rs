//! # streetwave — Wave Energy Propagation Through Street Networks
//!
//! Estimates the fraction of energy emitted in one street that arrives in
//! another, for a street network laid out as a planar grid.
//!
//! ## Design Principles
//!
//! 1. **Typed streets**: every adjacency cell is `Option<Street>`, never an ad hoc map
//! 2. **Pure junction functions**: redirection probabilities are a tagged value
//!    evaluated by dispatch, not closures over captured state
//! 3. **Search owns nothing**: path enumeration only reads the connectivity graph
//! 4. **Explicit configuration**: `Model` hands out a `Solver` only once
//!    adjacency, source and threshold are in place
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use streetwave::{GridBuilder, Model};
//!
//! # fn example() -> streetwave::Result<()> {
//! let network = GridBuilder::new(2, 3, 100.0).build(10.0, 0.5, 0.0)?;
//!
//! let mut model = Model::new();
//! model.set_adjacency(network.adjacency.clone())?;
//! model.set_source(0, 1)?;
//! model.set_receiver(4, 5)?;
//! model.set_threshold(2)?;
//!
//! let outcome = model.solve()?;
//! println!("{:.3} % ± {:.3} %", outcome.percent(), outcome.error * 100.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! | Stage | Module | Produces |
//! |-------|--------|----------|
//! | Graph | `network` | `AnnotatedGraph` (adjacency + connectivity) |
//! | Search | `paths` | `Walk`s between apparent source and receiver |
//! | Junctions | `junction` | `JunctionFunction` per interior junction |
//! | Integration | `integrate` | per-walk energy and error estimate |
//! | Orchestration | `model` | `SolveOutcome`, `FieldPoint` sweeps |

// ============================================================================
// Modules
// ============================================================================

pub mod network;
pub mod paths;
pub mod junction;
pub mod integrate;
pub mod model;
pub mod config;

// ============================================================================
// Re-exports: Network (the DTOs)
// ============================================================================

pub use network::{
    AnnotatedAdjacency, AnnotatedGraph, ConnectivityGraph,
    GridBuilder, Network, Orientation, Point, Street, StreetRef,
};

// ============================================================================
// Re-exports: Search, junctions, integration
// ============================================================================

pub use paths::{PathEnumerator, Walk};
pub use junction::{
    JunctionDescriptor, JunctionFunction, RelativeDirection, Topology,
    crossing, turning,
};
pub use integrate::{
    Contribution, PropagationIntegrator, Quadrature, QuadratureResult, WalkProfile,
};

// ============================================================================
// Re-exports: Orchestration
// ============================================================================

pub use model::{CancellationToken, FieldPoint, Model, ModelState, SolveOutcome, Solver};
pub use config::SolverConfig;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid graph: {0}")]
    InvalidGraph(String),

    #[error("Junction {index} out of range (network has {len} junctions)")]
    OutOfRange { index: usize, len: usize },

    #[error("Junctions {a} and {b} are not neighbours")]
    NotNeighbors { a: usize, b: usize },

    #[error("Model not configured: {0} not set")]
    NotConfigured(&'static str),

    #[error("Invalid threshold {0}: must be a non-negative integer")]
    InvalidThreshold(i64),

    #[error("Unknown junction type at junction {junction}: {streets} incident streets")]
    UnknownJunctionType { junction: usize, streets: usize },

    #[error("Unsupported junction geometry at junction {junction}: {reason}")]
    UnsupportedJunctionGeometry { junction: usize, reason: String },

    #[error("Invalid segment ({from}, {to}): width {width} must be positive")]
    InvalidSegment { from: usize, to: usize, width: f64 },

    #[error("Street ({from}, {to}): {name} = {value} outside [0, 1]")]
    InvalidAbsorption { from: usize, to: usize, name: &'static str, value: f64 },

    #[error("No path between source street {from} and receiver street {to}")]
    NoPath { from: StreetRef, to: StreetRef },

    #[error("Computation cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration parse error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

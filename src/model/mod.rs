//! # Model
//!
//! Owns the network, source, receiver and threshold, and hands out a
//! [`Solver`] once enough of them are set:
//!
//! ```text
//! Unconfigured → AdjacencySet → SourceSet → ReceiverSet → Solvable
//! ```
//!
//! `solve()` needs every field; `solve_all()` sweeps all receivers and so
//! needs everything but the receiver.

pub mod cancel;
pub mod solver;

pub use cancel::CancellationToken;
pub use solver::{FieldPoint, SolveOutcome, Solver};

use serde::{Deserialize, Serialize};
use crate::config::SolverConfig;
use crate::network::{AnnotatedAdjacency, AnnotatedGraph, Point, StreetRef};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelState {
    Unconfigured,
    AdjacencySet,
    SourceSet,
    ReceiverSet,
    /// Threshold set as well: `solve()` is available.
    Solvable,
}

#[derive(Debug, Default)]
pub struct Model {
    config: SolverConfig,
    graph: Option<AnnotatedGraph>,
    source: Option<StreetRef>,
    receiver: Option<StreetRef>,
    threshold: Option<usize>,
    cancel: CancellationToken,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, ..Self::default() })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn state(&self) -> ModelState {
        match (&self.graph, self.source, self.receiver, self.threshold) {
            (None, ..) => ModelState::Unconfigured,
            (Some(_), None, ..) => ModelState::AdjacencySet,
            (Some(_), Some(_), None, _) => ModelState::SourceSet,
            (Some(_), Some(_), Some(_), None) => ModelState::ReceiverSet,
            (Some(_), Some(_), Some(_), Some(_)) => ModelState::Solvable,
        }
    }

    /// Replace the network. Source and receiver survive only if they are
    /// still streets of the new network.
    pub fn set_adjacency(&mut self, adjacency: AnnotatedAdjacency) -> Result<()> {
        let graph = AnnotatedGraph::new(adjacency, self.config.strict_symmetry)?;
        for (name, slot) in [("source", &mut self.source), ("receiver", &mut self.receiver)] {
            if let Some(street) = *slot {
                if graph.validate_street(street.a, street.b).is_err() {
                    tracing::debug!(%street, name, "street dropped with new adjacency");
                    *slot = None;
                }
            }
        }
        self.graph = Some(graph);
        Ok(())
    }

    pub fn set_source(&mut self, a: usize, b: usize) -> Result<()> {
        self.source = Some(self.checked_street(a, b)?);
        Ok(())
    }

    pub fn set_receiver(&mut self, a: usize, b: usize) -> Result<()> {
        self.receiver = Some(self.checked_street(a, b)?);
        Ok(())
    }

    /// Extra hops allowed beyond the shortest walk.
    pub fn set_threshold(&mut self, threshold: i64) -> Result<()> {
        let t = usize::try_from(threshold).map_err(|_| Error::InvalidThreshold(threshold))?;
        self.threshold = Some(t);
        Ok(())
    }

    pub fn graph(&self) -> Option<&AnnotatedGraph> {
        self.graph.as_ref()
    }

    pub fn source(&self) -> Result<StreetRef> {
        self.source.ok_or(Error::NotConfigured("source"))
    }

    pub fn receiver(&self) -> Result<StreetRef> {
        self.receiver.ok_or(Error::NotConfigured("receiver"))
    }

    pub fn threshold(&self) -> Result<usize> {
        self.threshold.ok_or(Error::NotConfigured("threshold"))
    }

    /// A token that aborts running solves of this model when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Borrow the configured model for solving.
    pub fn solver(&self) -> Result<Solver<'_>> {
        Ok(Solver {
            graph: self.graph.as_ref().ok_or(Error::NotConfigured("adjacency"))?,
            source: self.source()?,
            threshold: self.threshold()?,
            integrator: self.config.integrator(),
            parallel: self.config.parallel,
            cancel: &self.cancel,
        })
    }

    /// Power from the source street to the receiver street.
    pub fn solve(&self) -> Result<SolveOutcome> {
        let solver = self.solver()?;
        solver.solve(self.receiver()?)
    }

    /// Power at the midpoint of every street other than the source, plus
    /// the source midpoint at power 1.0.
    pub fn solve_all(&self, positions: &[Point]) -> Result<Vec<FieldPoint>> {
        self.solver()?.solve_all(positions)
    }

    /// Candidate receivers for [`Model::solve_all`].
    pub fn receivers(&self) -> Result<Vec<StreetRef>> {
        Ok(self.solver()?.receivers())
    }

    fn checked_street(&self, a: usize, b: usize) -> Result<StreetRef> {
        let graph = self.graph.as_ref().ok_or(Error::NotConfigured("adjacency"))?;
        graph.validate_street(a, b)?;
        Ok(StreetRef::new(a, b))
    }
}

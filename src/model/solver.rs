//! Solving: enumerate walks, integrate each, sum.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::CancellationToken;
use crate::integrate::PropagationIntegrator;
use crate::network::{AnnotatedGraph, Point, StreetRef};
use crate::paths::{PathEnumerator, Walk};
use crate::{Error, Result};

/// Result of one source → receiver solve.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SolveOutcome {
    /// Fraction of emitted energy reaching the receiver.
    pub power: f64,
    /// Sum of the per-walk quadrature error estimates.
    pub error: f64,
    pub walks: Vec<Walk>,
}

impl SolveOutcome {
    pub fn walk_count(&self) -> usize {
        self.walks.len()
    }

    /// Power as a percentage of emitted energy.
    pub fn percent(&self) -> f64 {
        self.power * 100.0
    }
}

/// A receiver street's midpoint and the power arriving there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldPoint {
    pub x: f64,
    pub y: f64,
    pub power: f64,
}

/// A fully configured model, borrowed read-only for the duration of a solve.
#[derive(Debug, Clone, Copy)]
pub struct Solver<'m> {
    pub(super) graph: &'m AnnotatedGraph,
    pub(super) source: StreetRef,
    pub(super) threshold: usize,
    pub(super) integrator: PropagationIntegrator,
    pub(super) parallel: bool,
    pub(super) cancel: &'m CancellationToken,
}

impl<'m> Solver<'m> {
    pub fn source(&self) -> StreetRef {
        self.source
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Total power from the source street to `receiver`, summed over all
    /// walks within the threshold.
    pub fn solve(&self, receiver: StreetRef) -> Result<SolveOutcome> {
        let walks = PathEnumerator::new(self.graph).enumerate(self.source, receiver, self.threshold)?;

        let mut power = 0.0;
        let mut error = 0.0;
        for walk in &walks {
            self.cancel.check()?;
            let contribution = self.integrator.integrate_walk(self.graph, walk)?;
            power += contribution.energy;
            error += contribution.error;
        }

        tracing::info!(
            source = %self.source,
            %receiver,
            power,
            error,
            walks = walks.len(),
            "solved"
        );
        Ok(SolveOutcome { power, error, walks })
    }

    /// Every street except the source street, each once with `a < b`.
    pub fn receivers(&self) -> Vec<StreetRef> {
        self.graph
            .street_refs()
            .into_iter()
            .filter(|r| !r.same_street(&self.source))
            .collect()
    }

    /// Solve every candidate receiver and report the power at each
    /// receiver midpoint. The source midpoint is appended last with power
    /// 1.0 as the reference level.
    ///
    /// Receivers unreachable from the source get power 0; any other
    /// failure aborts the sweep.
    pub fn solve_all(&self, positions: &[Point]) -> Result<Vec<FieldPoint>> {
        if positions.len() != self.graph.node_count() {
            return Err(Error::InvalidGraph(format!(
                "{} positions for {} junctions",
                positions.len(),
                self.graph.node_count()
            )));
        }
        let span = tracing::info_span!("solve_all", source = %self.source, threshold = self.threshold);
        let _guard = span.enter();

        let receivers = self.receivers();
        let solve_one = |receiver: &StreetRef| -> Result<FieldPoint> {
            self.cancel.check()?;
            let power = match self.solve(*receiver) {
                Ok(outcome) => outcome.power,
                Err(Error::NoPath { .. }) => {
                    tracing::debug!(%receiver, "receiver unreachable");
                    0.0
                }
                Err(e) => return Err(e),
            };
            let mid = positions[receiver.a].midpoint(&positions[receiver.b]);
            Ok(FieldPoint { x: mid.x, y: mid.y, power })
        };

        let mut field: Vec<FieldPoint> = if self.parallel {
            receivers.par_iter().map(solve_one).collect::<Result<_>>()?
        } else {
            receivers.iter().map(solve_one).collect::<Result<_>>()?
        };

        let mid = positions[self.source.a].midpoint(&positions[self.source.b]);
        field.push(FieldPoint { x: mid.x, y: mid.y, power: 1.0 });
        tracing::info!(receivers = receivers.len(), "sweep finished");
        Ok(field)
    }
}

//! Per-walk energy integration.
//!
//! A walk is first flattened into a [`WalkProfile`]: one [`Segment`] per
//! street (source and receiver streets at half length, since energy enters
//! and leaves at their midpoints) and one junction function per interior
//! junction. The contribution of the walk is then
//!
//! ```text
//! E = ∫_0^{π/2} C · Π_i wall_i(a_i) · air_i(a_i) · Π_k J_k(a_k) dθ
//! wall_i(a) = (1 - α_i)^(l_i / w_i · tan a)
//! air_i(a)  = exp(-β_i · l_i / cos a)
//! a_i       = θ or π/2 - θ depending on the accumulated turn parity
//! ```
//!
//! with `C = 1/π` in the plane. When a source/receiver height is set the
//! integrand uses `C = 2h/π` and is divided by `1 + Σ l_i / cos a_i`.

use std::f64::consts::{FRAC_PI_2, PI};
use serde::{Deserialize, Serialize};

use super::quadrature::Quadrature;
use crate::junction::{JunctionDescriptor, JunctionFunction};
use crate::network::AnnotatedGraph;
use crate::paths::Walk;
use crate::{Error, Result};

/// One street along a walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: usize,
    pub to: usize,
    pub length: f64,
    pub width: f64,
    pub alpha: f64,
    pub beta: f64,
    /// Accumulated number of quarter-turn frame rotations, mod 2.
    pub parity: u8,
}

impl Segment {
    /// The angle this segment sees for integration variable `theta`.
    pub fn angle(&self, theta: f64) -> f64 {
        if self.parity == 1 { FRAC_PI_2 - theta } else { theta }
    }

    /// Wall and air attenuation along the segment at ray angle `angle`.
    pub fn attenuation(&self, angle: f64) -> f64 {
        if self.length == 0.0 {
            return 1.0;
        }
        let wall = if self.alpha == 0.0 {
            1.0
        } else {
            (1.0 - self.alpha).powf(self.length / self.width * angle.tan())
        };
        let air = if self.beta == 0.0 {
            1.0
        } else {
            (-self.beta * self.length / angle.cos()).exp()
        };
        wall * air
    }

    /// Distance travelled along the segment at ray angle `angle`.
    pub fn path_length(&self, angle: f64) -> f64 {
        self.length / angle.cos()
    }

    fn check(&self) -> Result<()> {
        if !(self.width > 0.0) {
            return Err(Error::InvalidSegment { from: self.from, to: self.to, width: self.width });
        }
        for (name, value) in [("alpha", self.alpha), ("beta", self.beta)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidAbsorption { from: self.from, to: self.to, name, value });
            }
        }
        Ok(())
    }
}

/// A walk flattened into segments and junction functions.
///
/// `junctions[k]` sits between `segments[k]` and `segments[k + 1]` and is
/// evaluated at the angle of the segment the walk arrives on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkProfile {
    pub walk: Walk,
    pub segments: Vec<Segment>,
    pub junctions: Vec<JunctionFunction>,
}

impl WalkProfile {
    /// Read segment attributes from the graph and classify every interior
    /// junction of `walk`.
    pub fn build(graph: &AnnotatedGraph, walk: &Walk) -> Result<Self> {
        if walk.hops() == 0 {
            return Err(Error::InvalidGraph(format!("walk {walk} has no streets")));
        }

        for (from, to) in walk.segments() {
            graph.validate_street(from, to)?.validate(from, to)?;
        }

        let mut segments = Vec::with_capacity(walk.hops());
        let mut junctions = Vec::with_capacity(walk.hops() - 1);
        let mut parity = 0u8;

        let mut steps = walk.segments().peekable();
        let mut turns = walk.turns();
        while let Some((from, to)) = steps.next() {
            let street = graph.validate_street(from, to)?;
            segments.push(Segment {
                from,
                to,
                length: street.length,
                width: street.width,
                alpha: street.alpha,
                beta: street.beta,
                parity,
            });
            if steps.peek().is_some() {
                if let Some((previous, current, following)) = turns.next() {
                    let function = JunctionDescriptor::from_step(graph, previous, current, following)?
                        .classify()?;
                    parity ^= function.parity();
                    junctions.push(function);
                }
            }
        }

        if let Some(first) = segments.first_mut() {
            first.length /= 2.0;
        }
        if let Some(last) = segments.last_mut() {
            last.length /= 2.0;
        }
        Ok(Self { walk: walk.clone(), segments, junctions })
    }

    pub fn validate(&self) -> Result<()> {
        self.segments.iter().try_for_each(Segment::check)
    }

    /// Integrand without the leading constant.
    pub fn evaluate(&self, theta: f64) -> f64 {
        let mut value = 1.0;
        for (k, segment) in self.segments.iter().enumerate() {
            let angle = segment.angle(theta);
            value *= segment.attenuation(angle);
            if let Some(junction) = self.junctions.get(k) {
                value *= junction.evaluate(angle);
            }
            if value == 0.0 {
                break;
            }
        }
        value
    }

    /// `1 + Σ l_i / cos a_i`.
    pub fn path_length(&self, theta: f64) -> f64 {
        1.0 + self
            .segments
            .iter()
            .map(|s| s.path_length(s.angle(theta)))
            .sum::<f64>()
    }

    /// Breaking points of the junction functions, mapped into `theta`.
    pub fn breaking_points(&self) -> Vec<f64> {
        self.junctions
            .iter()
            .zip(&self.segments)
            .filter_map(|(junction, segment)| {
                junction.breaking_point().map(|bp| segment.angle(bp))
            })
            .collect()
    }

    /// Whether some junction blocks the walk outright.
    pub fn is_blocked(&self) -> bool {
        self.junctions.iter().any(JunctionFunction::is_zero)
    }
}

/// Energy reaching the receiver along one walk.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Contribution {
    pub energy: f64,
    pub error: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PropagationIntegrator {
    quadrature: Quadrature,
    height: Option<f64>,
}

impl PropagationIntegrator {
    pub fn new(quadrature: Quadrature, height: Option<f64>) -> Self {
        Self { quadrature, height }
    }

    pub fn height(&self) -> Option<f64> {
        self.height
    }

    /// Build the profile for `walk` and integrate it.
    pub fn integrate_walk(&self, graph: &AnnotatedGraph, walk: &Walk) -> Result<Contribution> {
        let profile = WalkProfile::build(graph, walk)?;
        self.integrate(&profile)
    }

    pub fn integrate(&self, profile: &WalkProfile) -> Result<Contribution> {
        profile.validate()?;
        if profile.is_blocked() {
            return Ok(Contribution::default());
        }

        let points = profile.breaking_points();
        let result = match self.height {
            None => self.quadrature.integrate(
                |theta| profile.evaluate(theta) / PI,
                0.0,
                FRAC_PI_2,
                &points,
            ),
            Some(h) => {
                // TODO: validate the path-length normalisation against
                // measured 3D street-canyon data.
                let c = 2.0 * h / PI;
                self.quadrature.integrate(
                    |theta| c * profile.evaluate(theta) / profile.path_length(theta),
                    0.0,
                    FRAC_PI_2,
                    &points,
                )
            }
        };

        tracing::debug!(
            walk = %profile.walk,
            energy = result.value,
            error = result.error,
            intervals = result.intervals,
            "walk contribution"
        );
        Ok(Contribution { energy: result.value, error: result.error })
    }
}

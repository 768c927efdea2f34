//! Junction classification and redirection-probability functions.
//!
//! A walk arriving at a junction sees its streets relative to the entry
//! direction: `backward` is the street it came in on, `forward` the one
//! straight across, `left`/`right` the perpendicular ones. The set of
//! streets present decides the topology; the topology and the exit
//! direction pick one of the closed forms below, built from two
//! primitive densities:
//!
//! ```text
//! crossing(θ, r) = max(1 - r·tan θ, 0)
//! turning(θ, r)  = 0.5 · min(r·tan θ, 1)
//! ```
//!
//! | Topology    | exit backward        | exit forward          | exit left/right          |
//! |-------------|----------------------|-----------------------|--------------------------|
//! | bend        | crossing(θ, r)       | —                     | 2·turning(θ, r)          |
//! | t-junction  | crossing(θ, 2r)      | —                     | turning(θ, 2r)           |
//! | side-street | 0                    | crossing(θ, r/2)      | 2·turning(θ, r/2)        |
//! | crossroads  | 0                    | crossing(θ, r)        | turning(θ, r)            |
//!
//! with `r = exit width / entry width`. The closed forms only hold when
//! opposite streets have equal widths; other geometries are rejected.

use serde::{Deserialize, Serialize};
use crate::network::{AnnotatedGraph, Orientation};
use crate::{Error, Result};

/// Relative widths closer than this are treated as equal.
const WIDTH_TOLERANCE: f64 = 1e-9;

/// "Continue straight" density.
pub fn crossing(theta: f64, ratio: f64) -> f64 {
    (1.0 - ratio * theta.tan()).max(0.0)
}

/// "Turn" density.
pub fn turning(theta: f64, ratio: f64) -> f64 {
    0.5 * (ratio * theta.tan()).min(1.0)
}

/// Direction of a street relative to the entry street at a junction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeDirection {
    Backward,
    Right,
    Forward,
    Left,
}

impl RelativeDirection {
    pub const ALL: [RelativeDirection; 4] = [
        RelativeDirection::Backward,
        RelativeDirection::Right,
        RelativeDirection::Forward,
        RelativeDirection::Left,
    ];

    /// Relative direction of `street`, given the orientation of the entry
    /// street at the same junction. Right is one quarter turn from backward.
    pub fn between(entry: Orientation, street: Orientation) -> Self {
        Self::ALL[entry.turns_to(street) as usize]
    }

    fn index(self) -> usize {
        self as usize
    }

    /// 1 when leaving this way rotates the angular frame by 90°.
    pub fn parity(self) -> u8 {
        match self {
            RelativeDirection::Left | RelativeDirection::Right => 1,
            RelativeDirection::Forward | RelativeDirection::Backward => 0,
        }
    }
}

impl std::fmt::Display for RelativeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RelativeDirection::Backward => "backward",
            RelativeDirection::Right => "right",
            RelativeDirection::Forward => "forward",
            RelativeDirection::Left => "left",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    Bend,
    TJunction,
    SideStreet,
    Crossroads,
}

impl std::fmt::Display for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Topology::Bend => "bend",
            Topology::TJunction => "t-junction",
            Topology::SideStreet => "side-street",
            Topology::Crossroads => "crossroads",
        };
        f.write_str(name)
    }
}

/// Incident street widths at one junction, rotated into the frame of the
/// street a walk arrives on, plus the direction the walk leaves in.
#[derive(Debug, Clone, PartialEq)]
pub struct JunctionDescriptor {
    pub junction: usize,
    widths: [Option<f64>; 4],
    /// Far end of each incident street, when built from a graph.
    neighbors: [Option<usize>; 4],
    pub next: RelativeDirection,
}

impl JunctionDescriptor {
    /// Build from explicit widths (`backward` is mandatory).
    pub fn new(
        junction: usize,
        backward: f64,
        forward: Option<f64>,
        left: Option<f64>,
        right: Option<f64>,
        next: RelativeDirection,
    ) -> Self {
        Self { junction, widths: [Some(backward), right, forward, left], neighbors: [None; 4], next }
    }

    /// The junction `current` as seen by a walk `previous -> current -> following`.
    pub fn from_step(
        graph: &AnnotatedGraph,
        previous: usize,
        current: usize,
        following: usize,
    ) -> Result<Self> {
        let entry = graph.validate_street(current, previous)?.orientation;
        graph.validate_street(current, following)?;

        let mut widths = [None; 4];
        let mut neighbors = [None; 4];
        let mut next = None;
        for &neighbor in graph.neighbors(current)? {
            let street = graph.validate_street(current, neighbor)?;
            let direction = RelativeDirection::between(entry, street.orientation);
            widths[direction.index()] = Some(street.width);
            neighbors[direction.index()] = Some(neighbor);
            if neighbor == following {
                next = Some(direction);
            }
        }
        let next = next.ok_or(Error::NotNeighbors { a: current, b: following })?;
        Ok(Self { junction: current, widths, neighbors, next })
    }

    pub fn width(&self, direction: RelativeDirection) -> Option<f64> {
        self.widths[direction.index()]
    }

    /// Number of streets other than the entry street.
    pub fn extra_streets(&self) -> usize {
        [RelativeDirection::Forward, RelativeDirection::Left, RelativeDirection::Right]
            .into_iter()
            .filter(|&d| self.width(d).is_some())
            .count()
    }

    pub fn topology(&self) -> Result<Topology> {
        let has = |d| self.width(d).is_some();
        match self.extra_streets() {
            1 => Ok(Topology::Bend),
            2 if has(RelativeDirection::Left) && has(RelativeDirection::Right) => Ok(Topology::TJunction),
            2 => Ok(Topology::SideStreet),
            3 => Ok(Topology::Crossroads),
            n => Err(Error::UnknownJunctionType { junction: self.junction, streets: n + 1 }),
        }
    }

    /// Pick the closed-form redirection function for this junction and exit.
    pub fn classify(&self) -> Result<JunctionFunction> {
        let topology = self.topology()?;
        let entry = self.width(RelativeDirection::Backward).ok_or_else(|| self.unsupported("no entry street"))?;
        let exit = self.width(self.next).ok_or_else(|| self.unsupported("exit street missing"))?;
        for (direction, width) in [(RelativeDirection::Backward, entry), (self.next, exit)] {
            if !(width > 0.0) {
                return Err(Error::InvalidSegment {
                    from: self.junction,
                    to: self.neighbors[direction.index()].unwrap_or(self.junction),
                    width,
                });
            }
        }

        match topology {
            Topology::TJunction => self.require_matching(RelativeDirection::Left, RelativeDirection::Right)?,
            Topology::SideStreet => self.require_matching(RelativeDirection::Backward, RelativeDirection::Forward)?,
            Topology::Crossroads => {
                self.require_matching(RelativeDirection::Backward, RelativeDirection::Forward)?;
                self.require_matching(RelativeDirection::Left, RelativeDirection::Right)?;
            }
            Topology::Bend => {
                if self.next == RelativeDirection::Forward {
                    return Err(self.unsupported("straight pass-through has no bend function"));
                }
            }
        }

        Ok(JunctionFunction { topology, exit: self.next, ratio: exit / entry })
    }

    fn require_matching(&self, a: RelativeDirection, b: RelativeDirection) -> Result<()> {
        match (self.width(a), self.width(b)) {
            (Some(wa), Some(wb)) if widths_match(wa, wb) => Ok(()),
            (wa, wb) => Err(self.unsupported(&format!(
                "{a} width {} differs from {b} width {}",
                fmt_width(wa),
                fmt_width(wb)
            ))),
        }
    }

    fn unsupported(&self, reason: &str) -> Error {
        Error::UnsupportedJunctionGeometry { junction: self.junction, reason: reason.to_string() }
    }
}

fn widths_match(a: f64, b: f64) -> bool {
    (a - b).abs() <= WIDTH_TOLERANCE * a.abs().max(b.abs())
}

fn fmt_width(w: Option<f64>) -> String {
    w.map_or_else(|| "none".to_string(), |w| w.to_string())
}

/// A redirection-probability function, tagged by what selects its closed form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JunctionFunction {
    pub topology: Topology,
    pub exit: RelativeDirection,
    /// Exit street width over entry street width.
    pub ratio: f64,
}

/// Shape of a junction function: `scale · density(θ, effective ratio)`.
enum Shape {
    Zero,
    Crossing { ratio: f64 },
    Turning { scale: f64, ratio: f64 },
}

impl JunctionFunction {
    fn shape(&self) -> Shape {
        use RelativeDirection::*;
        let r = self.ratio;
        match (self.topology, self.exit) {
            (Topology::Bend, Backward) => Shape::Crossing { ratio: r },
            (Topology::Bend, Left | Right) => Shape::Turning { scale: 2.0, ratio: r },
            (Topology::TJunction, Backward) => Shape::Crossing { ratio: 2.0 * r },
            (Topology::TJunction, Left | Right) => Shape::Turning { scale: 1.0, ratio: 2.0 * r },
            (Topology::SideStreet, Forward) => Shape::Crossing { ratio: 0.5 * r },
            (Topology::SideStreet, Left | Right) => Shape::Turning { scale: 2.0, ratio: 0.5 * r },
            (Topology::Crossroads, Forward) => Shape::Crossing { ratio: r },
            (Topology::Crossroads, Left | Right) => Shape::Turning { scale: 1.0, ratio: r },
            // Back-reflection through side-streets and crossroads is not
            // modelled, nor are exits the topology does not have.
            _ => Shape::Zero,
        }
    }

    pub fn evaluate(&self, theta: f64) -> f64 {
        match self.shape() {
            Shape::Zero => 0.0,
            Shape::Crossing { ratio } => crossing(theta, ratio),
            Shape::Turning { scale, ratio } => scale * turning(theta, ratio),
        }
    }

    /// The angle where the function switches branch (`tan θ = 1 / ratio`).
    pub fn breaking_point(&self) -> Option<f64> {
        match self.shape() {
            Shape::Zero => None,
            Shape::Crossing { ratio } | Shape::Turning { ratio, .. } => {
                (ratio > 0.0).then(|| (1.0 / ratio).atan())
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self.shape(), Shape::Zero)
    }

    /// 1 when the exit rotates the angular frame by 90°.
    pub fn parity(&self) -> u8 {
        self.exit.parity()
    }
}

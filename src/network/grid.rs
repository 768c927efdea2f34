//! Programmatic grid construction.
//!
//! Lays out a `rows`×`cols` lattice of junctions, lets streets be removed,
//! then annotates every remaining street with uniform attributes. Length
//! and orientation are derived from junction positions.

use serde::{Deserialize, Serialize};
use super::{AnnotatedAdjacency, Orientation, Street};
use crate::{Error, Result};

/// Junction position in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// A built network: annotated streets plus junction positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub adjacency: AnnotatedAdjacency,
    pub positions: Vec<Point>,
}

#[derive(Debug, Clone)]
pub struct GridBuilder {
    rows: usize,
    cols: usize,
    positions: Vec<Point>,
    /// Unannotated street list, `i < j`.
    links: Vec<(usize, usize)>,
}

impl GridBuilder {
    /// Junction `row * cols + col` sits at `(col * spacing, row * spacing)`
    /// until a removal merges junctions away.
    pub fn new(rows: usize, cols: usize, spacing: f64) -> Self {
        let positions = (0..rows * cols)
            .map(|i| Point::new((i % cols) as f64 * spacing, (i / cols) as f64 * spacing))
            .collect();
        let mut links = Vec::new();
        for i in 0..rows * cols {
            if (i + 1) % cols != 0 {
                links.push((i, i + 1));
            }
            if i + cols < rows * cols {
                links.push((i, i + cols));
            }
        }
        Self { rows, cols, positions, links }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    /// Drop the street between `i` and `j`.
    ///
    /// An endpoint left with exactly two collinear streets is merged away:
    /// its streets are joined into one and the junctions after it are
    /// renumbered down by one.
    pub fn remove_street(mut self, i: usize, j: usize) -> Result<Self> {
        for index in [i, j] {
            if index >= self.node_count() {
                return Err(Error::OutOfRange { index, len: self.node_count() });
            }
        }
        let key = (i.min(j), i.max(j));
        let before = self.links.len();
        self.links.retain(|&link| link != key);
        if self.links.len() == before {
            return Err(Error::NotNeighbors { a: i, b: j });
        }

        let mut merged = Vec::new();
        for junction in [i, j] {
            if let Some((a, b)) = self.straight_neighbors(junction) {
                self.links.retain(|&(x, y)| x != junction && y != junction);
                let joined = (a.min(b), a.max(b));
                if !self.links.contains(&joined) {
                    self.links.push(joined);
                }
                tracing::debug!(junction, a, b, "merged straight junction");
                merged.push(junction);
            }
        }

        merged.sort_unstable_by(|x, y| y.cmp(x));
        for junction in merged {
            self.positions.remove(junction);
            let shift = |v: usize| if v > junction { v - 1 } else { v };
            for link in &mut self.links {
                *link = (shift(link.0), shift(link.1));
            }
        }
        Ok(self)
    }

    /// The two neighbours of `junction` if it has exactly two and they lie
    /// on one line through it.
    fn straight_neighbors(&self, junction: usize) -> Option<(usize, usize)> {
        let mut neighbors = self.links.iter().filter_map(|&(x, y)| {
            if x == junction {
                Some(y)
            } else if y == junction {
                Some(x)
            } else {
                None
            }
        });
        let (a, b) = (neighbors.next()?, neighbors.next()?);
        if neighbors.next().is_some() {
            return None;
        }
        let (p, pa, pb) = (self.positions[junction], self.positions[a], self.positions[b]);
        let vertical = p.x == pa.x && p.x == pb.x;
        let horizontal = p.y == pa.y && p.y == pb.y;
        (vertical || horizontal).then_some((a, b))
    }

    /// Annotate every street with the given width and absorption coefficients.
    pub fn build(&self, width: f64, alpha: f64, beta: f64) -> Result<Network> {
        let mut adjacency = AnnotatedAdjacency::empty(self.node_count());
        for &(i, j) in &self.links {
            let (length, orientation) = layout(&self.positions[i], &self.positions[j])
                .ok_or_else(|| Error::InvalidGraph(format!(
                    "junctions {i} and {j} are coincident or not axis-aligned"
                )))?;
            let street = Street::new(width, length, alpha, beta, orientation);
            street.validate(i, j)?;
            adjacency.insert(i, j, street)?;
        }
        Ok(Network { adjacency, positions: self.positions.clone() })
    }
}

/// Length and orientation of the street from `from` towards `to`.
fn layout(from: &Point, to: &Point) -> Option<(f64, Orientation)> {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    match (dx == 0.0, dy == 0.0) {
        (false, true) if dx > 0.0 => Some((dx, Orientation::POS_X)),
        (false, true) => Some((-dx, Orientation::NEG_X)),
        (true, false) if dy > 0.0 => Some((dy, Orientation::POS_Y)),
        (true, false) => Some((-dy, Orientation::NEG_Y)),
        _ => None,
    }
}

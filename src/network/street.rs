//! Street (edge) record and compass orientation.

use serde::{Deserialize, Serialize};
use super::adjacency::check_unit;
use crate::{Error, Result};

/// One of the four grid directions a street can leave a junction in.
///
/// `0` points along +x, `1` along +y, `2` along −x, `3` along −y.
/// The value seen from the other end of the same street is always
/// [`Orientation::opposite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Orientation(u8);

impl Orientation {
    pub const POS_X: Orientation = Orientation(0);
    pub const POS_Y: Orientation = Orientation(1);
    pub const NEG_X: Orientation = Orientation(2);
    pub const NEG_Y: Orientation = Orientation(3);

    pub fn new(value: u8) -> Option<Self> {
        (value < 4).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn opposite(self) -> Self {
        self.rotate(2)
    }

    /// Rotate by `quarter_turns` steps of 90°.
    pub fn rotate(self, quarter_turns: u8) -> Self {
        Self((self.0 + quarter_turns % 4) % 4)
    }

    /// Number of quarter turns needed to get from `self` to `other`.
    pub fn turns_to(self, other: Orientation) -> u8 {
        (other.0 + 4 - self.0) % 4
    }
}

impl TryFrom<u8> for Orientation {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Orientation::new(value).ok_or_else(|| format!("orientation {value} not in 0..4"))
    }
}

impl From<Orientation> for u8 {
    fn from(o: Orientation) -> u8 {
        o.0
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Physical attributes of a street, as seen from one of its ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Street {
    pub width: f64,
    /// Distance between the two junction positions.
    pub length: f64,
    /// Wall absorption coefficient.
    pub alpha: f64,
    /// Air absorption coefficient.
    #[serde(default)]
    pub beta: f64,
    pub orientation: Orientation,
}

impl Street {
    pub fn new(width: f64, length: f64, alpha: f64, beta: f64, orientation: Orientation) -> Self {
        Self { width, length, alpha, beta, orientation }
    }

    /// The same street seen from its other end.
    pub fn mirrored(&self) -> Self {
        Self { orientation: self.orientation.opposite(), ..*self }
    }

    /// Reject non-positive widths and absorption coefficients outside [0, 1].
    pub fn validate(&self, from: usize, to: usize) -> Result<()> {
        if !(self.width > 0.0) {
            return Err(Error::InvalidSegment { from, to, width: self.width });
        }
        check_unit("alpha", from, to, self.alpha)?;
        check_unit("beta", from, to, self.beta)
    }

    /// Whether `other` is a valid mirror cell of `self`.
    pub fn mirrors(&self, other: &Street) -> bool {
        self.width == other.width
            && self.length == other.length
            && self.alpha == other.alpha
            && self.beta == other.beta
            && self.orientation.opposite() == other.orientation
    }
}

/// An undirected street identified by its two end junctions.
///
/// Source and receiver are streets, not junctions: energy enters and
/// leaves the network halfway along them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreetRef {
    pub a: usize,
    pub b: usize,
}

impl StreetRef {
    pub fn new(a: usize, b: usize) -> Self {
        Self { a, b }
    }

    pub fn ends(&self) -> [usize; 2] {
        [self.a, self.b]
    }

    /// The end that is not `junction`, if `junction` is an end at all.
    pub fn other_end(&self, junction: usize) -> Option<usize> {
        if junction == self.a { Some(self.b) }
        else if junction == self.b { Some(self.a) }
        else { None }
    }

    /// Same street regardless of which end is named first.
    pub fn same_street(&self, other: &StreetRef) -> bool {
        (self.a == other.a && self.b == other.b) || (self.a == other.b && self.b == other.a)
    }
}

impl std::fmt::Display for StreetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.a, self.b)
    }
}

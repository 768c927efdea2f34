//! Numerical integration of walk contributions.

pub mod quadrature;
pub mod propagation;

pub use quadrature::{Quadrature, QuadratureResult};
pub use propagation::{Contribution, PropagationIntegrator, Segment, WalkProfile};

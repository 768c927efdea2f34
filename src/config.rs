//! Solver configuration.

use serde::{Deserialize, Serialize};
use crate::integrate::{PropagationIntegrator, Quadrature};
use crate::{Error, Result};

/// Tunables for a [`Model`](crate::Model).
///
/// ```rust
/// let config = streetwave::SolverConfig::from_json(r#"{"height": 1.5, "parallel": true}"#).unwrap();
/// assert_eq!(config.max_subdivisions, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Absolute quadrature tolerance.
    pub epsabs: f64,
    /// Relative quadrature tolerance.
    pub epsrel: f64,
    /// Maximum number of subintervals per walk integral.
    pub max_subdivisions: usize,
    /// Source/receiver elevation; enables the 3D integrand.
    pub height: Option<f64>,
    /// Solve receivers of a sweep on the rayon thread pool.
    pub parallel: bool,
    /// Reject adjacency matrices whose mirror cells disagree.
    pub strict_symmetry: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            epsabs: 1.49e-8,
            epsrel: 1.49e-8,
            max_subdivisions: 50,
            height: None,
            parallel: false,
            strict_symmetry: true,
        }
    }
}

impl SolverConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SolverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.epsabs > 0.0) && !(self.epsrel > 0.0) {
            return Err(Error::InvalidConfig("at least one quadrature tolerance must be positive".into()));
        }
        if self.epsabs < 0.0 || self.epsrel < 0.0 {
            return Err(Error::InvalidConfig("quadrature tolerances must not be negative".into()));
        }
        if self.max_subdivisions == 0 {
            return Err(Error::InvalidConfig("max_subdivisions must be at least 1".into()));
        }
        if let Some(h) = self.height {
            if !(h > 0.0) {
                return Err(Error::InvalidConfig(format!("height {h} must be positive")));
            }
        }
        Ok(())
    }

    pub fn quadrature(&self) -> Quadrature {
        Quadrature::new(self.epsabs, self.epsrel, self.max_subdivisions)
    }

    pub fn integrator(&self) -> PropagationIntegrator {
        PropagationIntegrator::new(self.quadrature(), self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_from_empty_json() {
        assert_eq!(SolverConfig::from_json("{}").unwrap(), SolverConfig::default());
    }

    #[test]
    fn test_round_trip_json() {
        let config = SolverConfig { height: Some(3.0), parallel: true, ..Default::default() };
        let parsed = SolverConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(matches!(SolverConfig::from_json(r#"{"hieght": 2.0}"#), Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(SolverConfig::from_json(r#"{"height": 0.0}"#).is_err());
        assert!(SolverConfig::from_json(r#"{"max_subdivisions": 0}"#).is_err());
        assert!(SolverConfig::from_json(r#"{"epsabs": 0.0, "epsrel": 0.0}"#).is_err());
        assert!(SolverConfig::from_json(r#"{"epsabs": -1.0}"#).is_err());
    }
}

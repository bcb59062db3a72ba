//! Solver settings that can be read from a TOML file.
//!
//! ```toml
//! eps = 1e-6
//! iters_limit = 500
//! x_limits = [-5.0, 5.0]
//! loglevel = "debug"
//! ```
//! Every missing key keeps its default.
use crate::error::{CompMathError, CompMathResult};
use serde::Deserialize;
use std::path::Path;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverConfig {
    /// stopping tolerance of every iterative method
    pub eps: f64,
    pub iters_limit: usize,
    /// plot window of snapshots
    pub x_limits: (f64, f64),
    pub y_limits: (f64, f64),
    /// sampling step of drawn curves
    pub curve_step: f64,
    /// longer tables keep only their first and last row
    pub table_row_cap: usize,
    /// above this many subintervals quadrature draws one filled curve instead of shapes
    pub max_drawn_subintervals: usize,
    pub max_snapshots: usize,
    /// Gauss-Legendre nodes per panel of the reference integrator
    pub quad_degree: usize,
    pub quad_panels: usize,
    pub loglevel: String,
    pub log_to_file: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            eps: 1e-4,
            iters_limit: 100,
            x_limits: (-10.0, 10.0),
            y_limits: (-10.0, 10.0),
            curve_step: 0.1,
            table_row_cap: 1000,
            max_drawn_subintervals: 100,
            max_snapshots: 10,
            quad_degree: 20,
            quad_panels: 64,
            loglevel: "info".to_string(),
            log_to_file: false,
        }
    }
}

impl SolverConfig {
    pub fn from_toml_str(text: &str) -> CompMathResult<Self> {
        let config: SolverConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> CompMathResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> CompMathResult<()> {
        if !(self.eps > 0.0) {
            return Err(CompMathError::Config(format!("eps must be positive, got {}", self.eps)));
        }
        if self.iters_limit == 0 {
            return Err(CompMathError::Config("iters_limit must be positive".to_string()));
        }
        if !(self.curve_step > 0.0) {
            return Err(CompMathError::Config(format!(
                "curve_step must be positive, got {}",
                self.curve_step
            )));
        }
        if self.quad_degree < 2 || self.quad_panels == 0 {
            return Err(CompMathError::Config(format!(
                "quadrature needs at least 2 nodes and 1 panel, got {} and {}",
                self.quad_degree, self.quad_panels
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_for_missing_keys() {
        let config = SolverConfig::from_toml_str("eps = 1e-6\nx_limits = [-5.0, 5.0]").unwrap();
        assert_eq!(config.eps, 1e-6);
        assert_eq!(config.x_limits, (-5.0, 5.0));
        assert_eq!(config.iters_limit, 100);
        assert_eq!(config.y_limits, (-10.0, 10.0));
        assert_eq!(config.loglevel, "info");
        assert_eq!(SolverConfig::from_toml_str("").unwrap(), SolverConfig::default());
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            SolverConfig::from_toml_str("eps = -1.0"),
            Err(CompMathError::Config(_))
        ));
        assert!(matches!(
            SolverConfig::from_toml_str("iters_limit = 0"),
            Err(CompMathError::Config(_))
        ));
        assert!(matches!(
            SolverConfig::from_toml_str("curve_step = 0.0"),
            Err(CompMathError::Config(_))
        ));
        assert!(matches!(
            SolverConfig::from_toml_str("eps = \"small\""),
            Err(CompMathError::Toml(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "iters_limit = 7\nloglevel = \"debug\"").unwrap();
        let config = SolverConfig::from_file(file.path()).unwrap();
        assert_eq!(config.iters_limit, 7);
        assert_eq!(config.loglevel, "debug");
        assert!(matches!(
            SolverConfig::from_file("/definitely/not/here.toml"),
            Err(CompMathError::Io(_))
        ));
    }
}

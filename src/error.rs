//! Crate-wide error type.
//!
//! Only input validation problems are reported through `Err`. Algorithmic failures (ill-conditioned
//! matrix, convergence condition not met, optimizer failure) come back inside the solver result as a
//! sentinel value plus a log line, and hitting the iteration cap is a regular outcome.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompMathError {
    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    #[error("no function given")]
    NoFunctionGiven,

    #[error("no limits given")]
    NoLimitsGiven,

    #[error("exactly one of fx or fy must be given")]
    AmbiguousFunction,

    #[error("invalid interval: left bound {a} must be less than right bound {b}")]
    InvalidInterval { a: f64, b: f64 },

    #[error("no root in interval [{a}, {b}]: f(a) and f(b) have the same sign")]
    NoRootInInterval { a: f64, b: f64 },

    #[error("iteration precondition failed: |f(a)| = {fa_abs} and |f(b)| = {fb_abs} must not exceed 1")]
    IterationPreconditionFailed { fa_abs: f64, fb_abs: f64 },

    #[error("subinterval count must be even, got {0}")]
    OddSubintervalCount(usize),

    #[error("invalid subinterval count: {0}")]
    InvalidSubintervalCount(String),

    #[error("integral diverges: the integrand has a pole at x = {at}")]
    DivergentIntegral { at: f64 },

    #[error("only two-equation systems supported, got {0} equations")]
    WrongEquationCount(usize),

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("not enough points: {0}")]
    NotEnoughPoints(String),

    #[error("polynomial degree must be between 2 and 4, got {0}")]
    InvalidDegree(usize),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CompMathResult<T> = Result<T, CompMathError>;

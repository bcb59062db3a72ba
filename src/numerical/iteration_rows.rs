//! Row types of the iteration tables. Every solver family fills one of them per step.
use crate::Utils::tables::{TableRowView, fmt_num};
use itertools::Itertools;

/// One step of a scalar root finder. `width = |a - b|`.
///
/// For Newton-tangent and simple iteration `a` holds the previous and `b` the new estimate.
#[derive(Clone, Debug, PartialEq)]
pub struct RootRow {
    pub iter: usize,
    pub x: f64,
    pub fx: f64,
    pub a: f64,
    pub fa: f64,
    pub b: f64,
    pub fb: f64,
    pub width: f64,
}

impl TableRowView for RootRow {
    fn headers() -> Vec<String> {
        ["iter", "x", "f(x)", "a", "f(a)", "b", "f(b)", "|a-b|"]
            .iter()
            .map(|h| h.to_string())
            .collect()
    }

    fn cells(&self) -> Vec<String> {
        let mut cells = vec![self.iter.to_string()];
        cells.extend(
            [self.x, self.fx, self.a, self.fa, self.b, self.fb, self.width]
                .into_iter()
                .map(fmt_num),
        );
        cells
    }
}

/// One step of a system solver: the current vector and the max-abs change.
#[derive(Clone, Debug, PartialEq)]
pub struct SystemRow {
    pub iter: usize,
    pub vector: Vec<f64>,
    pub delta: f64,
}

impl TableRowView for SystemRow {
    fn headers() -> Vec<String> {
        vec!["iter".to_string(), "vector".to_string(), "delta".to_string()]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.iter.to_string(),
            format!("[{}]", self.vector.iter().map(|v| fmt_num(*v)).join(", ")),
            fmt_num(self.delta),
        ]
    }
}

/// One subinterval (or node, for Simpson rules) of a quadrature sum.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadratureRow {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl TableRowView for QuadratureRow {
    fn headers() -> Vec<String> {
        vec!["i".to_string(), "x".to_string(), "f(x)".to_string(), "contribution".to_string()]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.index.to_string(),
            fmt_num(self.x),
            fmt_num(self.y),
            fmt_num(self.value),
        ]
    }
}

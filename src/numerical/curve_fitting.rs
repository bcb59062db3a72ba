//! Approximation and interpolation of tabulated points.
//!
//! [`approximation::CurveFitSolver`] is the entry point: it owns the sorted points and the plot
//! window and returns one [`approximation::FitResult`] per regression model or one
//! [`approximation::InterpolationResult`] per interpolant. The other modules hold the bare
//! numerics and can be used on their own.
pub mod approximation;
pub mod lagrange;
pub mod lm_fit;
pub mod regression;
pub mod splines;


use crate::error::{CompMathError, CompMathResult};

/// Points sorted by `x`; at least two, all finite.
pub(crate) fn sorted_points(points: &[(f64, f64)]) -> CompMathResult<Vec<(f64, f64)>> {
    if points.len() < 2 {
        return Err(CompMathError::NotEnoughPoints(format!(
            "at least 2 points required, got {}",
            points.len()
        )));
    }
    if let Some(bad) = points.iter().find(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return Err(CompMathError::Validation(format!("point {:?} is not finite", bad)));
    }
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(sorted)
}

/// Sorted points with repeated `x` removed; the first occurrence wins.
pub(crate) fn distinct_points(points: &[(f64, f64)]) -> CompMathResult<Vec<(f64, f64)>> {
    let mut sorted = sorted_points(points)?;
    sorted.dedup_by(|next, kept| next.0 == kept.0);
    if sorted.len() < 2 {
        return Err(CompMathError::NotEnoughPoints(
            "at least 2 distinct x values required".to_string(),
        ));
    }
    Ok(sorted)
}

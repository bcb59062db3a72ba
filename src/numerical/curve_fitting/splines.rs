use crate::error::CompMathResult;
use crate::numerical::curve_fitting::distinct_points;
use itertools::Itertools;
use splines::{Interpolation, Key, Spline};
use strum_macros::{Display, EnumIter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
pub enum SplineKind {
    #[strum(serialize = "Cubic spline")]
    Cubic,
    #[strum(serialize = "Quadratic spline")]
    Quadratic,
    #[strum(serialize = "Linear spline")]
    Linear,
}

/// Piece `i` is `sum_k coeffs[i][k] (x - breaks[i])^k` on `[breaks[i], breaks[i + 1]]`.
#[derive(Clone, Debug, PartialEq)]
pub struct PiecewisePolynomial {
    pub breaks: Vec<f64>,
    pub coeffs: Vec<Vec<f64>>,
}

impl PiecewisePolynomial {
    /// Outside the breaks the first or last piece is extended.
    pub fn value(&self, x: f64) -> f64 {
        let last = self.coeffs.len() - 1;
        let i = self.breaks.partition_point(|&b| b <= x).saturating_sub(1).min(last);
        let t = x - self.breaks[i];
        self.coeffs[i].iter().rev().fold(0.0, |acc, c| acc * t + c)
    }

    pub fn describe(&self) -> Vec<String> {
        self.coeffs
            .iter()
            .zip(self.breaks.windows(2))
            .map(|(c, w)| {
                format!("[{}, {}]: {}", w[0], w[1], c.iter().map(|v| format!("{:.6}", v)).join(", "))
            })
            .collect()
    }
}

pub enum Interpolant {
    Piecewise(PiecewisePolynomial),
    /// linear keys; the end chords extend it outside the data
    Linear(Spline<f64, f64>),
}

impl Interpolant {
    pub fn value(&self, x: f64) -> f64 {
        match self {
            Interpolant::Piecewise(poly) => poly.value(x),
            Interpolant::Linear(spline) => {
                let keys = spline.keys();
                let (first, last) = (&keys[0], &keys[keys.len() - 1]);
                if x < first.t {
                    chord(first, &keys[1], x)
                } else if x > last.t {
                    chord(&keys[keys.len() - 2], last, x)
                } else {
                    spline.clamped_sample(x).unwrap_or(f64::NAN)
                }
            }
        }
    }

    pub fn describe(&self) -> Vec<String> {
        match self {
            Interpolant::Piecewise(poly) => poly.describe(),
            Interpolant::Linear(spline) => spline
                .keys()
                .windows(2)
                .map(|w| {
                    let slope = (w[1].value - w[0].value) / (w[1].t - w[0].t);
                    format!("[{}, {}]: {:.6}, {:.6}", w[0].t, w[1].t, w[0].value, slope)
                })
                .collect(),
        }
    }
}

fn chord(k0: &Key<f64, f64>, k1: &Key<f64, f64>, x: f64) -> f64 {
    k0.value + (k1.value - k0.value) * (x - k0.t) / (k1.t - k0.t)
}

/// Natural cubic spline: second derivatives vanish at both ends.
pub fn natural_cubic(points: &[(f64, f64)]) -> PiecewisePolynomial {
    let n = points.len() - 1;
    let h: Vec<f64> = points.windows(2).map(|w| w[1].0 - w[0].0).collect();
    let chords: Vec<f64> = points
        .windows(2)
        .zip(&h)
        .map(|(w, h)| (w[1].1 - w[0].1) / h)
        .collect();

    // tridiagonal system for the inner second derivatives, Thomas algorithm
    let mut m = vec![0.0; n + 1];
    if n > 1 {
        let inner = n - 1;
        let mut diag: Vec<f64> = (0..inner).map(|i| 2.0 * (h[i] + h[i + 1])).collect();
        let mut rhs: Vec<f64> = (0..inner).map(|i| 6.0 * (chords[i + 1] - chords[i])).collect();
        for i in 1..inner {
            let w = h[i] / diag[i - 1];
            diag[i] -= w * h[i];
            rhs[i] -= w * rhs[i - 1];
        }
        m[inner] = rhs[inner - 1] / diag[inner - 1];
        for i in (0..inner - 1).rev() {
            m[i + 1] = (rhs[i] - h[i + 1] * m[i + 2]) / diag[i];
        }
    }

    let coeffs = (0..n)
        .map(|i| {
            vec![
                points[i].1,
                chords[i] - h[i] * (2.0 * m[i] + m[i + 1]) / 6.0,
                m[i] / 2.0,
                (m[i + 1] - m[i]) / (6.0 * h[i]),
            ]
        })
        .collect();
    PiecewisePolynomial {
        breaks: points.iter().map(|p| p.0).collect(),
        coeffs,
    }
}

/// C¹ quadratic spline whose first piece starts with the slope of the first chord.
pub fn quadratic(points: &[(f64, f64)]) -> PiecewisePolynomial {
    let mut slope = (points[1].1 - points[0].1) / (points[1].0 - points[0].0);
    let coeffs = points
        .windows(2)
        .map(|w| {
            let h = w[1].0 - w[0].0;
            let chord = (w[1].1 - w[0].1) / h;
            let c = (chord - slope) / h;
            let piece = vec![w[0].1, slope, c];
            slope = 2.0 * chord - slope;
            piece
        })
        .collect();
    PiecewisePolynomial {
        breaks: points.iter().map(|p| p.0).collect(),
        coeffs,
    }
}

pub fn linear(points: &[(f64, f64)]) -> Spline<f64, f64> {
    Spline::from_vec(
        points
            .iter()
            .map(|&(x, y)| Key::new(x, y, Interpolation::Linear))
            .collect(),
    )
}

/// Interpolant of `kind` through the sorted points with distinct `x`.
pub fn build_interpolant(points: &[(f64, f64)], kind: SplineKind) -> CompMathResult<Interpolant> {
    let points = distinct_points(points)?;
    Ok(match kind {
        SplineKind::Cubic => Interpolant::Piecewise(natural_cubic(&points)),
        SplineKind::Quadratic => Interpolant::Piecewise(quadratic(&points)),
        SplineKind::Linear => Interpolant::Linear(linear(&points)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use strum::IntoEnumIterator;

    fn data() -> Vec<(f64, f64)> {
        vec![(0.0, 1.0), (1.0, 2.0), (2.0, 0.0), (4.0, 3.0), (5.0, 2.5)]
    }

    #[test]
    fn test_every_kind_interpolates_nodes() {
        for kind in SplineKind::iter() {
            let spline = build_interpolant(&data(), kind).unwrap();
            for (x, y) in data() {
                assert_relative_eq!(spline.value(x), y, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_natural_cubic_properties() {
        let spline = natural_cubic(&data());
        // zero curvature at both ends
        assert_eq!(spline.coeffs[0][2], 0.0);
        let last = spline.coeffs.last().unwrap();
        let h = 1.0;
        assert_relative_eq!(2.0 * last[2] + 6.0 * last[3] * h, 0.0, epsilon = 1e-10);
        // C² at an inner break
        let (p0, p1) = (&spline.coeffs[1], &spline.coeffs[2]);
        let h = 1.0;
        assert_relative_eq!(p0[1] + 2.0 * p0[2] * h + 3.0 * p0[3] * h * h, p1[1], epsilon = 1e-10);
        assert_relative_eq!(2.0 * p0[2] + 6.0 * p0[3] * h, 2.0 * p1[2], epsilon = 1e-10);
    }

    #[test]
    fn test_cubic_reproduces_line() {
        let points: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, 3.0 * i as f64 - 1.0)).collect();
        let spline = natural_cubic(&points);
        assert_relative_eq!(spline.value(2.5), 6.5, epsilon = 1e-12);
        assert_relative_eq!(spline.value(-1.0), -4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_quadratic_slopes() {
        let spline = quadratic(&data());
        // first piece is the first chord
        assert_eq!(spline.coeffs[0], vec![1.0, 1.0, 0.0]);
        // C¹ at x = 1: the slope of piece 1 is 2*chord_0 - slope_0 = 1
        assert_relative_eq!(spline.coeffs[1][1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(spline.value(1.5), 2.0 + 0.5 - 3.0 * 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_extrapolates() {
        let spline = build_interpolant(&data(), SplineKind::Linear).unwrap();
        assert_relative_eq!(spline.value(0.5), 1.5, epsilon = 1e-12);
        assert_relative_eq!(spline.value(3.0), 1.5, epsilon = 1e-12);
        assert_relative_eq!(spline.value(-1.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(spline.value(6.0), 2.0, epsilon = 1e-12);
        assert_eq!(spline.describe().len(), 4);
    }

    #[test]
    fn test_duplicates_and_too_few_points() {
        let spline = build_interpolant(&[(1.0, 5.0), (0.0, 0.0), (1.0, 7.0)], SplineKind::Linear).unwrap();
        assert_relative_eq!(spline.value(1.0), 5.0, epsilon = 1e-12);
        assert!(build_interpolant(&[(1.0, 1.0), (1.0, 2.0)], SplineKind::Cubic).is_err());
        assert!(build_interpolant(&[(1.0, 1.0)], SplineKind::Quadratic).is_err());
    }
}

use crate::error::{CompMathError, CompMathResult};
use itertools::Itertools;
use nalgebra::{DMatrix, DVector};

const SVD_EPS: f64 = 1e-12;

/// `f(x) = a0 + a1 x` with the Pearson correlation of the data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearFit {
    pub a0: f64,
    pub a1: f64,
    pub r: f64,
}

impl LinearFit {
    pub fn value(&self, x: f64) -> f64 {
        self.a0 + self.a1 * x
    }
}

/// Closed-form least squares line.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> CompMathResult<LinearFit> {
    check_lengths(xs, ys)?;
    let n = xs.len() as f64;
    let sum_x: f64 = xs.iter().sum();
    let sum_y: f64 = ys.iter().sum();
    let sum_x2: f64 = xs.iter().map(|x| x * x).sum();
    let sum_y2: f64 = ys.iter().map(|y| y * y).sum();
    let sum_xy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();
    let sxx = n * sum_x2 - sum_x * sum_x;
    if sxx == 0.0 {
        return Err(CompMathError::NotEnoughPoints(
            "linear regression needs at least two distinct x values".to_string(),
        ));
    }
    let sxy = n * sum_xy - sum_x * sum_y;
    let a1 = sxy / sxx;
    let a0 = (sum_y - a1 * sum_x) / n;
    let r = sxy / (sxx * (n * sum_y2 - sum_y * sum_y)).sqrt();
    Ok(LinearFit { a0, a1, r })
}

/// `sum (y - f(x))^2`
pub fn sum_of_squares(xs: &[f64], ys: &[f64], f: impl Fn(f64) -> f64) -> f64 {
    xs.iter().zip(ys).map(|(&x, &y)| (y - f(x)).powi(2)).sum()
}

/// Correlation index `sqrt(1 - SSE / SST)`; NaN when the data is constant.
pub fn correlation_index(xs: &[f64], ys: &[f64], f: impl Fn(f64) -> f64) -> f64 {
    let mean = ys.iter().sum::<f64>() / ys.len() as f64;
    let sst: f64 = ys.iter().map(|y| (y - mean).powi(2)).sum();
    (1.0 - sum_of_squares(xs, ys, f) / sst).sqrt()
}

/// Least squares coefficients of `sum_k c_k basis_k(x)` through an SVD of the design matrix.
pub fn basis_fit(xs: &[f64], ys: &[f64], basis: &[fn(f64) -> f64]) -> CompMathResult<DVector<f64>> {
    check_lengths(xs, ys)?;
    let design = DMatrix::from_fn(xs.len(), basis.len(), |i, k| basis[k](xs[i]));
    let rhs = DVector::from_column_slice(ys);
    design
        .svd(true, true)
        .solve(&rhs, SVD_EPS)
        .map_err(|e| CompMathError::Validation(format!("least squares failed: {}", e)))
}

/// Polynomial coefficients in ascending powers, fitted on the Vandermonde matrix.
pub fn polyfit(xs: &[f64], ys: &[f64], degree: usize) -> CompMathResult<DVector<f64>> {
    check_lengths(xs, ys)?;
    let vandermonde = DMatrix::from_fn(xs.len(), degree + 1, |i, k| xs[i].powi(k as i32));
    vandermonde
        .svd(true, true)
        .solve(&DVector::from_column_slice(ys), SVD_EPS)
        .map_err(|e| CompMathError::Validation(format!("least squares failed: {}", e)))
}

/// Horner evaluation of ascending coefficients.
pub fn polyval(coefficients: &DVector<f64>, x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// `A_ij = sum x^(i+j)`, `b_i = sum y x^i`, both of size `degree + 1`.
pub fn normal_equations(xs: &[f64], ys: &[f64], degree: usize) -> (DMatrix<f64>, DVector<f64>) {
    let size = degree + 1;
    let a = DMatrix::from_fn(size, size, |i, j| xs.iter().map(|x| x.powi((i + j) as i32)).sum::<f64>());
    let b = DVector::from_fn(size, |i, _| {
        xs.iter().zip(ys).map(|(x, y)| y * x.powi(i as i32)).sum::<f64>()
    });
    (a, b)
}

/// `c0 + c1*x + c2*x^2 ...`
pub fn format_polynomial(coefficients: &DVector<f64>) -> String {
    coefficients
        .iter()
        .enumerate()
        .map(|(k, c)| match k {
            0 => format!("{}", c),
            1 => format!("{}*x", c),
            _ => format!("{}*x^{}", c, k),
        })
        .join(" + ")
}

fn check_lengths(xs: &[f64], ys: &[f64]) -> CompMathResult<()> {
    if xs.len() != ys.len() {
        return Err(CompMathError::DimensionMismatch(format!(
            "{} x values and {} y values",
            xs.len(),
            ys.len()
        )));
    }
    if xs.len() < 2 {
        return Err(CompMathError::NotEnoughPoints(format!(
            "at least 2 points required, got {}",
            xs.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::linear_systems::gauss::gauss_solve;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_fit_exact_line() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x - 1.0).collect();
        let fit = linear_fit(&xs, &ys).unwrap();
        assert_relative_eq!(fit.a1, 2.0, epsilon = 1e-12);
        assert_relative_eq!(fit.a0, -1.0, epsilon = 1e-12);
        assert_relative_eq!(fit.r, 1.0, epsilon = 1e-12);
        assert_relative_eq!(sum_of_squares(&xs, &ys, |x| fit.value(x)), 0.0, epsilon = 1e-20);
    }

    #[test]
    fn test_linear_fit_noisy() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [1.0, 3.0, 2.0, 4.0];
        let fit = linear_fit(&xs, &ys).unwrap();
        // sxy = 4*29 - 10*10 = 16, sxx = 4*30 - 100 = 20
        assert_relative_eq!(fit.a1, 0.8, epsilon = 1e-12);
        assert_relative_eq!(fit.a0, 0.5, epsilon = 1e-12);
        assert_relative_eq!(fit.r, 0.8, epsilon = 1e-12);
        assert!(linear_fit(&[1.0, 1.0], &[0.0, 2.0]).is_err());
    }

    #[test]
    fn test_polyfit_recovers_parabola() {
        let xs = [-2.0, -1.0, 0.0, 1.0, 2.0, 3.0];
        let ys: Vec<f64> = xs.iter().map(|x| 0.5 * x * x - x + 2.0).collect();
        let c = polyfit(&xs, &ys, 2).unwrap();
        assert_relative_eq!(c, DVector::from_vec(vec![2.0, -1.0, 0.5]), epsilon = 1e-9);
        assert_relative_eq!(polyval(&c, 4.0), 6.0, epsilon = 1e-9);
        assert_relative_eq!(correlation_index(&xs, &ys, |x| polyval(&c, x)), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_normal_equations_agree_with_svd() {
        let xs = [0.0, 0.5, 1.0, 1.5, 2.0, 2.5];
        let ys = [1.0, 1.4, 2.1, 2.2, 3.5, 4.1];
        let svd = polyfit(&xs, &ys, 3).unwrap();
        let (a, b) = normal_equations(&xs, &ys, 3);
        assert_eq!(a.shape(), (4, 4));
        assert_relative_eq!(a[(0, 0)], 6.0);
        let gauss = gauss_solve(&a, &b).unwrap().unwrap();
        assert_relative_eq!(gauss.solution, svd, epsilon = 1e-6);
    }

    #[test]
    fn test_basis_fit() {
        let basis: [fn(f64) -> f64; 3] = [|_| 1.0, |t| t, |t| t.powi(3)];
        let xs = [-1.0, -0.5, 0.0, 0.5, 1.0];
        let ys: Vec<f64> = xs.iter().map(|t: &f64| 1.0 + 2.0 * t - t.powi(3)).collect();
        let c = basis_fit(&xs, &ys, &basis).unwrap();
        assert_relative_eq!(c, DVector::from_vec(vec![1.0, 2.0, -1.0]), epsilon = 1e-9);
    }

    #[test]
    fn test_format_polynomial() {
        let c = DVector::from_vec(vec![1.0, -2.0, 3.0]);
        assert_eq!(format_polynomial(&c), "1 + -2*x + 3*x^2");
    }
}

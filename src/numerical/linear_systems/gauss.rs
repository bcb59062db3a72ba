use crate::error::{CompMathError, CompMathResult};
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

/// Output of [`gauss_solve`].
#[derive(Clone, Debug, PartialEq)]
pub struct GaussSolution {
    pub solution: DVector<f64>,
    /// `b - A x` on the untouched input
    pub residual: DVector<f64>,
    /// `[U | b']` after forward elimination
    pub triangular: DMatrix<f64>,
    /// `[A | b]` as given
    pub augmented_original: DMatrix<f64>,
}

/// `[A | b]`
pub fn augment(a: &DMatrix<f64>, b: &DVector<f64>) -> DMatrix<f64> {
    let n = a.ncols();
    let mut augmented = a.clone().insert_column(n, 0.0);
    augmented.set_column(n, b);
    augmented
}

pub(crate) fn check_square_system(a: &DMatrix<f64>, b: &DVector<f64>) -> CompMathResult<()> {
    if a.nrows() == 0 || a.nrows() != a.ncols() {
        return Err(CompMathError::DimensionMismatch(format!(
            "matrix must be square and non-empty, got {}x{}",
            a.nrows(),
            a.ncols()
        )));
    }
    if b.len() != a.nrows() {
        return Err(CompMathError::DimensionMismatch(format!(
            "right-hand side has {} entries, matrix has {} rows",
            b.len(),
            a.nrows()
        )));
    }
    Ok(())
}

/// Gaussian elimination without partial pivoting.
///
/// A row is swapped in only when the pivot is exactly zero: the first row below with a nonzero
/// entry in that column. `Ok(None)` means no such row exists, the system is ill-conditioned.
/// # Examples
/// ```
/// use nalgebra::{DMatrix, DVector};
/// use CompMath::numerical::linear_systems::gauss::gauss_solve;
/// let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
/// let b = DVector::from_vec(vec![3.0, 5.0]);
/// let solved = gauss_solve(&a, &b).unwrap().unwrap();
/// assert!((solved.solution[0] - 0.8).abs() < 1e-12);
/// ```
pub fn gauss_solve(a: &DMatrix<f64>, b: &DVector<f64>) -> CompMathResult<Option<GaussSolution>> {
    check_square_system(a, b)?;
    let n = a.nrows();
    let mut m = a.clone();
    let mut rhs = b.clone();

    for k in 0..n {
        if m[(k, k)] == 0.0 {
            match (k + 1..n).find(|&i| m[(i, k)] != 0.0) {
                Some(i) => {
                    debug!("zero pivot in column {}, swap rows {} and {}", k, k, i);
                    m.swap_rows(k, i);
                    rhs.swap_rows(k, i);
                }
                None => {
                    warn!("no nonzero pivot in column {}, the system is ill-conditioned", k);
                    return Ok(None);
                }
            }
        }
        for i in k + 1..n {
            let q = m[(i, k)] / m[(k, k)];
            for j in k..n {
                m[(i, j)] -= q * m[(k, j)];
            }
            rhs[i] -= q * rhs[k];
        }
    }

    let mut x = DVector::zeros(n);
    for i in (0..n).rev() {
        let s: f64 = (i + 1..n).map(|j| m[(i, j)] * x[j]).sum();
        x[i] = (rhs[i] - s) / m[(i, i)];
    }
    if x.iter().any(|v| !v.is_finite()) {
        warn!("back substitution produced a non-finite value");
        return Ok(None);
    }
    let residual = b - a * &x;
    Ok(Some(GaussSolution {
        solution: x,
        residual,
        triangular: augment(&m, &rhs),
        augmented_original: augment(a, b),
    }))
}

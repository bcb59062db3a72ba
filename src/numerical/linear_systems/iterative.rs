use crate::error::{CompMathError, CompMathResult};
use crate::numerical::iteration_rows::SystemRow;
use crate::numerical::linear_systems::gauss::check_square_system;
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

/// Output of [`jacobi`] and [`seidel`].
#[derive(Clone, Debug, PartialEq)]
pub struct IterativeOutcome {
    /// `None` when a diagonal entry is zero
    pub solution: Option<DVector<f64>>,
    pub iterations: usize,
    pub converged: bool,
    pub rows: Vec<SystemRow>,
    pub log: Vec<String>,
}

fn prepare(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    x0: Option<&DVector<f64>>,
    eps: f64,
    iters_limit: usize,
) -> CompMathResult<DVector<f64>> {
    check_square_system(a, b)?;
    if !(eps > 0.0) || iters_limit == 0 {
        return Err(CompMathError::Validation(format!(
            "eps must be positive and iters_limit nonzero, got {} and {}",
            eps, iters_limit
        )));
    }
    match x0 {
        Some(x0) if x0.len() != b.len() => Err(CompMathError::DimensionMismatch(format!(
            "initial guess has {} entries, system has {} unknowns",
            x0.len(),
            b.len()
        ))),
        Some(x0) => Ok(x0.clone()),
        None => Ok(DVector::zeros(b.len())),
    }
}

fn iterate(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    x0: Option<&DVector<f64>>,
    eps: f64,
    iters_limit: usize,
    use_updated: bool,
) -> CompMathResult<IterativeOutcome> {
    let mut x = prepare(a, b, x0, eps, iters_limit)?;
    let n = b.len();
    if let Some(i) = (0..n).find(|&i| a[(i, i)] == 0.0) {
        let line = format!("zero diagonal entry a[{},{}], the method is not applicable", i + 1, i + 1);
        warn!("{}", line);
        return Ok(IterativeOutcome {
            solution: None,
            iterations: 0,
            converged: false,
            rows: vec![],
            log: vec![line],
        });
    }

    let mut rows = Vec::new();
    let mut iter = 0;
    loop {
        iter += 1;
        let x_prev = x.clone();
        for i in 0..n {
            let s: f64 = (0..n)
                .filter(|&j| j != i)
                .map(|j| a[(i, j)] * if use_updated { x[j] } else { x_prev[j] })
                .sum();
            x[i] = (b[i] - s) / a[(i, i)];
        }
        let delta = (&x - &x_prev).amax();
        debug!("iter {}: delta = {}", iter, delta);
        rows.push(SystemRow {
            iter,
            vector: x.iter().cloned().collect(),
            delta,
        });
        let finite = x.iter().all(|v| v.is_finite());
        let converged = finite && delta <= eps;
        if converged || iter >= iters_limit || !finite {
            let line = if converged {
                format!("converged in {} iterations", iter)
            } else if !finite {
                warn!("the iteration diverged at step {}", iter);
                format!("diverged at iteration {}", iter)
            } else {
                format!("stopped after {} iterations, delta = {}", iter, delta)
            };
            return Ok(IterativeOutcome {
                solution: Some(x),
                iterations: iter,
                converged,
                rows,
                log: vec![line],
            });
        }
    }
}

/// Simple iteration: every component is updated from the previous vector only.
pub fn jacobi(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    x0: Option<&DVector<f64>>,
    eps: f64,
    iters_limit: usize,
) -> CompMathResult<IterativeOutcome> {
    iterate(a, b, x0, eps, iters_limit, false)
}

/// Gauss-Seidel: components `j < i` already hold their new values.
pub fn seidel(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    x0: Option<&DVector<f64>>,
    eps: f64,
    iters_limit: usize,
) -> CompMathResult<IterativeOutcome> {
    iterate(a, b, x0, eps, iters_limit, true)
}

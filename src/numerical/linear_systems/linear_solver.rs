use crate::Utils::config::SolverConfig;
use crate::Utils::tables::capped_table;
use crate::error::{CompMathError, CompMathResult};
use crate::numerical::iteration_rows::SystemRow;
use crate::numerical::linear_systems::gauss::{check_square_system, gauss_solve};
use crate::numerical::linear_systems::iterative::{jacobi, seidel};
use crate::numerical::linear_systems::matrix_transforms::{
    dominance_report, format_augmented, format_matrix, is_diagonally_dominant, normalize_system, transform_to_dominant,
};
use log::info;
use nalgebra::{DMatrix, DVector};
use strum_macros::{Display, EnumIter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
pub enum LinearMethod {
    #[strum(serialize = "Gauss method")]
    Gauss,
    #[strum(serialize = "Simple iteration method")]
    Jacobi,
    #[strum(serialize = "Seidel method")]
    Seidel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
pub enum SystemVariant {
    #[strum(serialize = "Original matrix")]
    Original,
    #[strum(serialize = "Transformed matrix")]
    Transformed,
    #[strum(serialize = "Normalized matrix")]
    Normalized,
}

/// One of the three systems solved side by side.
#[derive(Clone, Debug, PartialEq)]
pub struct VariantResult {
    pub variant: SystemVariant,
    pub matrix: DMatrix<f64>,
    pub rhs: DVector<f64>,
    /// `None` on ill-conditioning or a zero diagonal
    pub solution: Option<DVector<f64>>,
    /// `rhs - matrix * solution`
    pub residual: Option<DVector<f64>>,
    /// 0 for Gauss
    pub iterations: usize,
    pub table: Vec<SystemRow>,
    pub log: Vec<String>,
    pub title: String,
}

/// Solves `A x = b` on the original, the dominance-transformed and the normalized system.
///
/// # Examples
/// ```rust, ignore
/// let mut solver = LinearSystemSolver::from_rows(LinearMethod::Seidel, vec![vec![4.0, 1.0], vec![1.0, 3.0]], vec![1.0, 2.0])?;
/// solver.set_params(1e-6, 100)?;
/// let [original, transformed, normalized] = solver.solve()?;
/// ```
pub struct LinearSystemSolver {
    pub method: LinearMethod,
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
    pub eps: f64,
    pub iters_limit: usize,
    pub x0: Option<DVector<f64>>,
    table_row_cap: usize,
}

impl LinearSystemSolver {
    pub fn new(method: LinearMethod, a: DMatrix<f64>, b: DVector<f64>) -> Self {
        let config = SolverConfig::default();
        LinearSystemSolver {
            method,
            a,
            b,
            eps: config.eps,
            iters_limit: config.iters_limit,
            x0: None,
            table_row_cap: config.table_row_cap,
        }
    }

    /// Row-major nested input; every row must have as many entries as there are rows.
    pub fn from_rows(method: LinearMethod, rows: Vec<Vec<f64>>, b: Vec<f64>) -> CompMathResult<Self> {
        let n = rows.len();
        if let Some(bad) = rows.iter().find(|row| row.len() != n) {
            return Err(CompMathError::DimensionMismatch(format!(
                "row of length {} in a {}-row matrix",
                bad.len(),
                n
            )));
        }
        let a = DMatrix::from_row_iterator(n, n, rows.into_iter().flatten());
        let b = DVector::from_vec(b);
        check_square_system(&a, &b)?;
        Ok(Self::new(method, a, b))
    }

    pub fn with_config(mut self, config: &SolverConfig) -> Self {
        self.eps = config.eps;
        self.iters_limit = config.iters_limit;
        self.table_row_cap = config.table_row_cap;
        self
    }

    pub fn set_params(&mut self, eps: f64, iters_limit: usize) -> CompMathResult<()> {
        if !(eps > 0.0) || iters_limit == 0 {
            return Err(CompMathError::Validation(format!(
                "eps must be positive and iters_limit nonzero, got {} and {}",
                eps, iters_limit
            )));
        }
        self.eps = eps;
        self.iters_limit = iters_limit;
        Ok(())
    }

    pub fn set_initial_guess(&mut self, x0: Vec<f64>) -> CompMathResult<()> {
        if x0.len() != self.b.len() {
            return Err(CompMathError::DimensionMismatch(format!(
                "initial guess has {} entries, system has {} unknowns",
                x0.len(),
                self.b.len()
            )));
        }
        self.x0 = Some(DVector::from_vec(x0));
        Ok(())
    }

    /// Original, transformed and normalized variants, in this order.
    pub fn solve(&self) -> CompMathResult<[VariantResult; 3]> {
        check_square_system(&self.a, &self.b)?;
        info!("{}: {}x{} system", self.method, self.a.nrows(), self.a.ncols());

        let mut original_log = vec!["Augmented matrix".to_string()];
        original_log.extend(format_augmented(&self.a, &self.b));
        original_log.push("Diagonal dominance".to_string());
        original_log.extend(dominance_report(&self.a));
        let original = self.solve_variant(SystemVariant::Original, self.a.clone(), self.b.clone(), original_log)?;

        let mut transformed_log = vec!["Augmented matrix".to_string()];
        transformed_log.extend(format_augmented(&self.a, &self.b));
        transformed_log.push("Diagonal dominance".to_string());
        transformed_log.extend(dominance_report(&self.a));
        let (matrix, rhs) = if is_diagonally_dominant(&self.a) {
            transformed_log.push("the matrix is diagonally dominant, no transformation needed".to_string());
            (self.a.clone(), self.b.clone())
        } else {
            transformed_log.push("the matrix is not diagonally dominant, transforming".to_string());
            let transformed = transform_to_dominant(&self.a, &self.b)?;
            transformed_log.push("Steps:".to_string());
            transformed_log.extend(transformed.steps);
            if !transformed.dominant {
                transformed_log.push("the transformed matrix is still not diagonally dominant".to_string());
            }
            transformed_log.push("Transformed matrix".to_string());
            transformed_log.extend(format_augmented(&transformed.matrix, &transformed.rhs));
            (transformed.matrix, transformed.rhs)
        };
        let transformed = self.solve_variant(SystemVariant::Transformed, matrix, rhs, transformed_log)?;

        let (matrix, rhs) = normalize_system(&self.a, &self.b)?;
        let mut normalized_log = vec!["Augmented matrix".to_string()];
        normalized_log.extend(format_augmented(&self.a, &self.b));
        normalized_log.push("Normalized matrix A^T A | A^T b".to_string());
        normalized_log.extend(format_augmented(&matrix, &rhs));
        normalized_log.push("Diagonal dominance".to_string());
        normalized_log.extend(dominance_report(&matrix));
        let normalized = self.solve_variant(SystemVariant::Normalized, matrix, rhs, normalized_log)?;

        Ok([original, transformed, normalized])
    }

    fn solve_variant(
        &self,
        variant: SystemVariant,
        matrix: DMatrix<f64>,
        rhs: DVector<f64>,
        mut log: Vec<String>,
    ) -> CompMathResult<VariantResult> {
        let (solution, iterations, table) = match self.method {
            LinearMethod::Gauss => match gauss_solve(&matrix, &rhs)? {
                Some(solved) => {
                    log.push("Triangular matrix".to_string());
                    log.extend(format_matrix(&solved.triangular, 2));
                    (Some(solved.solution), 0, vec![])
                }
                None => {
                    log.push("the system is ill-conditioned: no nonzero pivot".to_string());
                    (None, 0, vec![])
                }
            },
            LinearMethod::Jacobi | LinearMethod::Seidel => {
                let run = if self.method == LinearMethod::Jacobi { jacobi } else { seidel };
                let outcome = run(&matrix, &rhs, self.x0.as_ref(), self.eps, self.iters_limit)?;
                log.extend(outcome.log);
                (outcome.solution, outcome.iterations, outcome.rows)
            }
        };
        let residual = solution.as_ref().map(|x| &rhs - &matrix * x);
        if let Some(x) = &solution {
            log.push("Solution".to_string());
            log.extend(x.iter().map(|v| v.to_string()));
            if let Some(r) = &residual {
                log.push("Residual".to_string());
                log.extend(r.iter().map(|v| v.to_string()));
            }
        }
        log.push(format!("Iterations: {}", iterations));
        let (table, rendered) = capped_table(table, self.table_row_cap);
        if !table.is_empty() {
            info!("{}\n{}", variant, rendered);
        }
        Ok(VariantResult {
            variant,
            matrix,
            rhs,
            solution,
            residual,
            iterations,
            table,
            log,
            title: variant.to_string(),
        })
    }
}

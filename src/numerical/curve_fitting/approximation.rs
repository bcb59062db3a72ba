use crate::Utils::config::SolverConfig;
use crate::error::{CompMathError, CompMathResult};
use crate::graphic::graphic_builder::{CurveStyle, GraphicBuilder};
use crate::graphic::primitives::{Color, GraphicPrimitive};
use crate::numerical::curve_fitting::lagrange::lagrange_value;
use crate::numerical::curve_fitting::lm_fit::{NonlinearModel, fit_model};
use crate::numerical::curve_fitting::regression::{
    basis_fit, correlation_index, format_polynomial, linear_fit, normal_equations, polyfit, polyval, sum_of_squares,
};
use crate::numerical::curve_fitting::splines::{Interpolant, SplineKind, build_interpolant};
use crate::numerical::curve_fitting::{distinct_points, sorted_points};
use crate::numerical::linear_systems::gauss::gauss_solve;
use crate::numerical::linear_systems::matrix_transforms::format_matrix;
use log::{info, warn};
use nalgebra::DVector;
use strum::IntoEnumIterator;

/// One approximating model over the data.
#[derive(Clone, Debug, PartialEq)]
pub struct FitResult {
    /// data points in red, the fitted curve in blue
    pub graphics: Vec<GraphicPrimitive>,
    pub log: Vec<String>,
    /// `sum (y - f(x))^2`, `+inf` when the fit failed
    pub sum_diff: f64,
    /// Pearson `r` for the line, correlation index for every other model
    pub coefficient: Option<f64>,
    pub coefficients: Vec<f64>,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InterpolationResult {
    pub graphics: Vec<GraphicPrimitive>,
    pub log: Vec<String>,
    pub title: String,
    /// interpolant at the requested `x`, if one was requested
    pub value: Option<f64>,
}

/// Approximation and interpolation of one data set.
///
/// # Examples
/// ```rust, ignore
/// let solver = CurveFitSolver::new(&[(1.0, 2.1), (2.0, 3.9), (3.0, 6.2), (4.0, 7.8)])?;
/// let results = solver.approximate_all()?;
/// let best = best_fit(&results);
/// let lagrange = solver.lagrange_interpolation(2.5)?;
/// ```
pub struct CurveFitSolver {
    /// sorted by `x`
    pub points: Vec<(f64, f64)>,
    pub x_limits: (f64, f64),
    pub y_limits: (f64, f64),
    curve_step: f64,
}

impl CurveFitSolver {
    pub fn new(points: &[(f64, f64)]) -> CompMathResult<Self> {
        let config = SolverConfig::default();
        Ok(CurveFitSolver {
            points: sorted_points(points)?,
            x_limits: config.x_limits,
            y_limits: config.y_limits,
            curve_step: config.curve_step,
        })
    }

    pub fn with_config(mut self, config: &SolverConfig) -> Self {
        self.x_limits = config.x_limits;
        self.y_limits = config.y_limits;
        self.curve_step = config.curve_step;
        self
    }

    pub fn set_plot_limits(&mut self, x_limits: (f64, f64), y_limits: (f64, f64)) {
        self.x_limits = x_limits;
        self.y_limits = y_limits;
    }

    fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.0).collect()
    }

    fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.1).collect()
    }

    /// Red data points plus, when given, the blue curve `f`.
    fn draw(&self, points: &[(f64, f64)], f: Option<&dyn Fn(f64) -> f64>) -> CompMathResult<Vec<GraphicPrimitive>> {
        let mut builder = GraphicBuilder::new(Some(self.x_limits), Some(self.y_limits));
        for &(x, y) in points {
            builder.add_point(x, y, Color::Red);
        }
        if let Some(f) = f {
            builder.add_curve(Some(f), None, CurveStyle::default().step(self.curve_step), None, None)?;
        }
        Ok(builder.build())
    }

    pub fn linear_regression(&self) -> CompMathResult<FitResult> {
        let (xs, ys) = (self.xs(), self.ys());
        let fit = linear_fit(&xs, &ys)?;
        let f = |x: f64| fit.value(x);
        let sum_diff = sum_of_squares(&xs, &ys, f);
        let log = vec![
            format!("Correlation coefficient: r = {}", fit.r),
            format!("f(x) = {} + {}*x", fit.a0, fit.a1),
            format!("Sum of squared deviations: {}", sum_diff),
        ];
        info!("linear regression: f(x) = {} + {}*x, S = {}", fit.a0, fit.a1, sum_diff);
        Ok(FitResult {
            graphics: self.draw(&self.points, Some(&f))?,
            log,
            sum_diff,
            coefficient: fit.r.is_finite().then_some(fit.r),
            coefficients: vec![fit.a0, fit.a1],
            title: "Linear regression".to_string(),
        })
    }

    /// Least squares polynomial of degree 2, 3 or 4, cross-checked against the Gauss
    /// solution of the normal equations.
    pub fn polynomial_regression(&self, degree: usize) -> CompMathResult<FitResult> {
        if !(2..=4).contains(&degree) {
            return Err(CompMathError::InvalidDegree(degree));
        }
        let (xs, ys) = (self.xs(), self.ys());
        let c = polyfit(&xs, &ys, degree)?;
        let f = |x: f64| polyval(&c, x);
        let gamma = correlation_index(&xs, &ys, f);
        let sum_diff = sum_of_squares(&xs, &ys, f);

        let mut log = vec!["Polynomial coefficients:".to_string()];
        log.extend(c.iter().map(|v| v.to_string()));
        log.push(format!("f(x) = {}", format_polynomial(&c)));
        log.push(format!("Correlation index: gamma = {}", gamma));
        log.push(format!("Sum of squared deviations: {}", sum_diff));

        let (a, b) = normal_equations(&xs, &ys, degree);
        log.push("Matrix A".to_string());
        log.extend(format_matrix(&a, 4));
        log.push("Vector b".to_string());
        log.extend(b.iter().map(|v| format!("{:.5}", v)));
        match gauss_solve(&a, &b)? {
            Some(gauss) => {
                log.push("Polynomial coefficients (Gauss method):".to_string());
                log.extend(gauss.solution.iter().map(|v| v.to_string()));
                log.push("Residual vector:".to_string());
                log.extend(gauss.residual.iter().map(|v| format!("{:.5}", v)));
                log.push("Triangular matrix".to_string());
                log.extend(format_matrix(&gauss.triangular, 2));
            }
            None => {
                warn!("normal equations of degree {} are ill-conditioned", degree);
                log.push("the normal equations are ill-conditioned: no nonzero pivot".to_string());
            }
        }
        info!("polynomial regression of degree {}: S = {}", degree, sum_diff);
        Ok(FitResult {
            graphics: self.draw(&self.points, Some(&f))?,
            log,
            sum_diff,
            coefficient: gamma.is_finite().then_some(gamma),
            coefficients: c.iter().cloned().collect(),
            title: format!("Polynomial regression of degree {}", degree),
        })
    }

    /// `k0 + k1 t + k2 t^3 + k3 t^5 + k4 t^7`
    pub fn basis_combination(&self) -> CompMathResult<FitResult> {
        let (xs, ys) = (self.xs(), self.ys());
        let basis: [fn(f64) -> f64; 5] = [|_| 1.0, |t| t, |t| t.powi(3), |t| t.powi(5), |t| t.powi(7)];
        let k = basis_fit(&xs, &ys, &basis)?;
        let f = |t: f64| basis.iter().zip(k.iter()).map(|(phi, k)| k * phi(t)).sum::<f64>();
        let sum_diff = sum_of_squares(&xs, &ys, f);
        let gamma = correlation_index(&xs, &ys, f);
        let mut log = vec!["Basis: f(t) = 1, t, t^3, t^5, t^7".to_string(), "Coefficients: K =".to_string()];
        log.extend(k.iter().map(|v| v.to_string()));
        log.push("k(t) = K * f(t)".to_string());
        log.push(format!("Sum of squared deviations: {}", sum_diff));
        log.push(format!("Correlation index: gamma = {}", gamma));
        info!("linear combination of basis functions: S = {}", sum_diff);
        Ok(FitResult {
            graphics: self.draw(&self.points, Some(&f))?,
            log,
            sum_diff,
            coefficient: gamma.is_finite().then_some(gamma),
            coefficients: k.iter().cloned().collect(),
            title: "Linear combination of basis functions".to_string(),
        })
    }

    /// Levenberg-Marquardt fit of `model`; a failed fit is `Ok` with `sum_diff = +inf`.
    pub fn nonlinear_fit(&self, model: NonlinearModel) -> CompMathResult<FitResult> {
        let (xs, ys) = (self.xs(), self.ys());
        let title = format!("Nonlinear fit ({}: {})", model, model.formula());
        let result = fit_model(model, &xs, &ys);
        if !result.termination.is_success() {
            return Ok(FitResult {
                graphics: self.draw(&self.points, None)?,
                log: vec![result.termination.to_string()],
                sum_diff: f64::INFINITY,
                coefficient: None,
                coefficients: vec![],
                title,
            });
        }
        let q: DVector<f64> = result.parameters;
        let f = |x: f64| model.value(&q, x);
        let sum_diff = sum_of_squares(&xs, &ys, f);
        let gamma = correlation_index(&xs, &ys, f);
        let mut log = vec!["Parameters: q =".to_string()];
        log.extend(q.iter().map(|v| v.to_string()));
        log.push(format!("Sum of squared deviations: {}", sum_diff));
        log.push(format!("Correlation index: gamma = {}", gamma));
        info!("{} fit: q = {:?}, S = {}", model, q.as_slice(), sum_diff);
        Ok(FitResult {
            graphics: self.draw(&self.points, Some(&f))?,
            log,
            sum_diff,
            coefficient: gamma.is_finite().then_some(gamma),
            coefficients: q.iter().cloned().collect(),
            title,
        })
    }

    /// Line, polynomials of degree 2 to 4, the basis combination and every nonlinear model.
    pub fn approximate_all(&self) -> CompMathResult<Vec<FitResult>> {
        let mut results = vec![self.linear_regression()?];
        for degree in 2..=4 {
            results.push(self.polynomial_regression(degree)?);
        }
        results.push(self.basis_combination()?);
        for model in NonlinearModel::iter() {
            results.push(self.nonlinear_fit(model)?);
        }
        if let Some(best) = best_fit(&results) {
            info!("best approximation: {}", results[best].title);
        }
        Ok(results)
    }

    fn spline_result(&self, kind: SplineKind, at: Option<f64>) -> CompMathResult<InterpolationResult> {
        let spline: Interpolant = build_interpolant(&self.points, kind)?;
        let f = |x: f64| spline.value(x);
        let mut log = vec!["Coefficients:".to_string()];
        log.extend(spline.describe());
        let value = at.map(|x| spline.value(x));
        if let (Some(x), Some(y)) = (at, value) {
            log.push(format!("For x = {}, y = {}", x, y));
        }
        Ok(InterpolationResult {
            graphics: self.draw(&self.points, Some(&f))?,
            log,
            title: kind.to_string(),
            value,
        })
    }

    /// Data points and the spline curve of `kind`.
    pub fn spline_interpolation(&self, kind: SplineKind) -> CompMathResult<InterpolationResult> {
        self.spline_result(kind, None)
    }

    pub fn lagrange_interpolation(&self, x: f64) -> CompMathResult<InterpolationResult> {
        let points = distinct_points(&self.points)?;
        let y = lagrange_value(&points, x);
        let mut log = vec![];
        if points.len() < self.points.len() {
            log.push(format!("{} points with repeated x dropped", self.points.len() - points.len()));
        }
        log.push(format!("For x = {}, y = {}", x, y));
        info!("Lagrange polynomial: L({}) = {}", x, y);
        let mut graphics = self.draw(&points, None)?;
        graphics.push(GraphicPrimitive::Point {
            x,
            y,
            color: Color::Blue,
        });
        Ok(InterpolationResult {
            graphics,
            log,
            title: "Lagrange polynomial".to_string(),
            value: Some(y),
        })
    }

    /// Cubic, quadratic and linear splines, then Lagrange, all evaluated at `x`.
    pub fn interpolate_all(&self, x: f64) -> CompMathResult<Vec<InterpolationResult>> {
        let mut results = SplineKind::iter()
            .map(|kind| self.spline_result(kind, Some(x)))
            .collect::<CompMathResult<Vec<_>>>()?;
        results.push(self.lagrange_interpolation(x)?);
        Ok(results)
    }
}

/// Index of the result with the smallest finite `sum_diff`.
pub fn best_fit(results: &[FitResult]) -> Option<usize> {
    results
        .iter()
        .enumerate()
        .filter(|(_, r)| r.sum_diff.is_finite())
        .min_by(|a, b| a.1.sum_diff.total_cmp(&b.1.sum_diff))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_points_sorted_and_validated() {
        let solver = CurveFitSolver::new(&[(2.0, 1.0), (0.0, 3.0), (1.0, 2.0)]).unwrap();
        assert_eq!(solver.points, vec![(0.0, 3.0), (1.0, 2.0), (2.0, 1.0)]);
        assert!(matches!(
            CurveFitSolver::new(&[(1.0, 1.0)]),
            Err(CompMathError::NotEnoughPoints(_))
        ));
        assert!(CurveFitSolver::new(&[(0.0, f64::NAN), (1.0, 1.0)]).is_err());
    }

    #[test]
    fn test_linear_regression_result() {
        let solver = CurveFitSolver::new(&[(1.0, 1.0), (2.0, 3.0), (3.0, 2.0), (4.0, 4.0)]).unwrap();
        let result = solver.linear_regression().unwrap();
        assert_relative_eq!(result.coefficients[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(result.coefficients[1], 0.8, epsilon = 1e-12);
        assert_relative_eq!(result.coefficient.unwrap(), 0.8, epsilon = 1e-12);
        // deviations from 0.5 + 0.8x: -0.3, 0.9, -0.9, 0.3
        assert_relative_eq!(result.sum_diff, 1.8, epsilon = 1e-12);
        let kinds: Vec<&str> = result.graphics.iter().map(|g| g.kind()).collect();
        assert_eq!(kinds, vec!["point", "point", "point", "point", "curve"]);
        assert_eq!(result.graphics[0].color(), Some(Color::Red));
        assert_eq!(result.graphics[4].color(), Some(Color::Blue));
    }

    #[test]
    fn test_polynomial_regression_logs_gauss_check() {
        let points: Vec<(f64, f64)> = (0..6).map(|i| (i as f64, (i * i) as f64 - 2.0)).collect();
        let solver = CurveFitSolver::new(&points).unwrap();
        let result = solver.polynomial_regression(2).unwrap();
        assert!(result.sum_diff < 1e-12);
        assert_relative_eq!(result.coefficient.unwrap(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(result.coefficients[2], 1.0, epsilon = 1e-9);
        assert!(result.log.iter().any(|l| l == "Polynomial coefficients (Gauss method):"));
        assert!(result.log.iter().any(|l| l == "Triangular matrix"));
        assert_eq!(result.title, "Polynomial regression of degree 2");
        assert!(matches!(solver.polynomial_regression(5), Err(CompMathError::InvalidDegree(5))));
        assert!(matches!(solver.polynomial_regression(1), Err(CompMathError::InvalidDegree(1))));
    }

    #[test]
    fn test_failed_nonlinear_fit_is_soft() {
        let solver = CurveFitSolver::new(&[(0.0, 1.0), (800.0, 2.0)]).unwrap();
        let result = solver.nonlinear_fit(NonlinearModel::Exponential).unwrap();
        assert_eq!(result.sum_diff, f64::INFINITY);
        assert!(result.coefficient.is_none());
        assert!(result.log[0].contains("not finite"));
        assert!(result.graphics.iter().all(|g| g.kind() == "point"));
    }

    #[test]
    fn test_lagrange_interpolation() {
        let solver = CurveFitSolver::new(&[(0.0, 1.0), (1.0, 2.0), (2.0, 5.0), (1.0, 9.0)]).unwrap();
        let result = solver.lagrange_interpolation(3.0).unwrap();
        // 1 + x^2 through the distinct points
        assert_relative_eq!(result.value.unwrap(), 10.0, epsilon = 1e-12);
        assert!(result.log.last().unwrap().starts_with("For x = 3, y = "));
        assert_eq!(result.log[0], "1 points with repeated x dropped");
        let last = result.graphics.last().unwrap();
        assert_eq!(last.color(), Some(Color::Blue));
        assert_eq!(result.graphics.len(), 4);
    }

    #[test]
    fn test_best_fit_ignores_failures() {
        let make = |sum_diff: f64| FitResult {
            graphics: vec![],
            log: vec![],
            sum_diff,
            coefficient: None,
            coefficients: vec![],
            title: String::new(),
        };
        let results = vec![make(2.0), make(f64::INFINITY), make(0.5), make(1.0)];
        assert_eq!(best_fit(&results), Some(2));
        assert_eq!(best_fit(&[make(f64::INFINITY)]), None);
    }
}

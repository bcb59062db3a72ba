use crate::Utils::config::SolverConfig;
use crate::Utils::tables::{capped_table, evenly_spaced_elements};
use crate::error::{CompMathError, CompMathResult};
use crate::graphic::graphic_builder::{CurveStyle, GraphicBuilder};
use crate::graphic::primitives::{Color, GraphicPrimitive};
use crate::numerical::iteration_rows::SystemRow;
use crate::numerical::nonlinear_systems::convergence_check::check_convergence;
use crate::symbolic::expression_evaluator::{Callable, Expression, ExpressionEvaluator, SymbolicEvaluator};
use log::{debug, info, warn};
use nalgebra::{Matrix2, Vector2};
use strum_macros::{Display, EnumIter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
pub enum NonlinearMethod {
    #[strum(serialize = "Simple iteration method")]
    SimpleIteration,
    #[strum(serialize = "Seidel method")]
    Seidel,
    #[strum(serialize = "Newton's method")]
    Newton,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum SystemStatus {
    Converged,
    IterationLimitExceeded,
    ConvergenceConditionNotMet,
    SingularJacobian,
}

#[derive(Clone, Debug)]
pub struct SystemResult {
    /// last `(x, y)`; `None` when no iteration ran
    pub solution: Option<(f64, f64)>,
    pub iterations: usize,
    pub status: SystemStatus,
    pub table: Vec<SystemRow>,
    /// at most `max_snapshots`, evenly spaced over the run
    pub graphics: Vec<Vec<GraphicPrimitive>>,
    pub log: Vec<String>,
    pub title: String,
}

/// Explicit curves of one equation: `y(x)` branches, or `x(y)` when there are none.
enum Branches {
    OfX(Vec<Callable>),
    OfY(Vec<Callable>),
}

/// Two equations `F1(x, y) = 0`, `F2(x, y) = 0` solved from an initial guess.
///
/// # Examples
/// ```rust, ignore
/// let equations = vec!["0.1*sin(y) + 0.2 - x".to_string(), "0.2*cos(x) + 0.5 - y".to_string()];
/// let mut solver = NonlinearSystemSolver::new(NonlinearMethod::Seidel, equations, (0.0, 0.0));
/// solver.set_params(1e-6, 100)?;
/// let result = solver.solve()?;
/// ```
pub struct NonlinearSystemSolver {
    pub method: NonlinearMethod,
    pub equations: Vec<String>,
    pub initial_guess: (f64, f64),
    pub eps: f64,
    pub iters_limit: usize,
    pub x_limits: (f64, f64),
    pub y_limits: (f64, f64),
    curve_step: f64,
    table_row_cap: usize,
    max_snapshots: usize,
}

impl NonlinearSystemSolver {
    pub fn new(method: NonlinearMethod, equations: Vec<String>, initial_guess: (f64, f64)) -> Self {
        let config = SolverConfig::default();
        NonlinearSystemSolver {
            method,
            equations,
            initial_guess,
            eps: config.eps,
            iters_limit: config.iters_limit,
            x_limits: config.x_limits,
            y_limits: config.y_limits,
            curve_step: config.curve_step,
            table_row_cap: config.table_row_cap,
            max_snapshots: config.max_snapshots,
        }
    }

    pub fn with_config(mut self, config: &SolverConfig) -> Self {
        self.eps = config.eps;
        self.iters_limit = config.iters_limit;
        self.x_limits = config.x_limits;
        self.y_limits = config.y_limits;
        self.curve_step = config.curve_step;
        self.table_row_cap = config.table_row_cap;
        self.max_snapshots = config.max_snapshots;
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

    pub fn set_plot_limits(&mut self, x_limits: (f64, f64), y_limits: (f64, f64)) {
        self.x_limits = x_limits;
        self.y_limits = y_limits;
    }

    pub fn solve(&self) -> CompMathResult<SystemResult> {
        self.solve_with(&SymbolicEvaluator)
    }

    pub fn solve_with<E: ExpressionEvaluator>(&self, evaluator: &E) -> CompMathResult<SystemResult> {
        if self.equations.len() != 2 {
            return Err(CompMathError::WrongEquationCount(self.equations.len()));
        }
        let eq1 = evaluator.parse(&self.equations[0])?;
        let eq2 = evaluator.parse(&self.equations[1])?;
        let mut log = vec![
            format!("{}", self.method),
            format!("equation 1: {} = 0", eq1),
            format!("equation 2: {} = 0", eq2),
        ];

        let report = check_convergence(evaluator, &eq1, &eq2, self.initial_guess);
        log.extend(report.log);
        let (phi1, phi2) = match report.phi {
            Some(phi) if report.converges => phi,
            _ => {
                warn!("convergence condition not met at {:?}", self.initial_guess);
                return Ok(SystemResult {
                    solution: None,
                    iterations: 0,
                    status: SystemStatus::ConvergenceConditionNotMet,
                    table: vec![],
                    graphics: vec![],
                    log,
                    title: self.method.to_string(),
                });
            }
        };

        let branches = [
            (explicit_branches(evaluator, &eq1), Color::Blue),
            (explicit_branches(evaluator, &eq2), Color::Red),
        ];
        let mut rows = Vec::new();
        let mut graphics = Vec::new();
        let (x0, y0) = self.initial_guess;
        let mut point = Vector2::new(x0, y0);
        let mut iter = 0;

        let status = match self.method {
            NonlinearMethod::SimpleIteration | NonlinearMethod::Seidel => {
                let phi1 = evaluator.to_callable(&phi1);
                let phi2 = evaluator.to_callable(&phi2);
                loop {
                    iter += 1;
                    let prev = point;
                    let x = phi1.at(prev.x, prev.y);
                    let y = if self.method == NonlinearMethod::Seidel {
                        phi2.at(x, prev.y)
                    } else {
                        phi2.at(prev.x, prev.y)
                    };
                    point = Vector2::new(x, y);
                    let delta = (point - prev).amax();
                    if let Some(status) = self.record(iter, point, delta, &branches, &mut rows, &mut graphics)? {
                        break status;
                    }
                }
            }
            NonlinearMethod::Newton => {
                let f1 = evaluator.to_callable(&eq1);
                let f2 = evaluator.to_callable(&eq2);
                let jacobian: Vec<Callable> = [&eq1, &eq2]
                    .iter()
                    .flat_map(|eq| ["x", "y"].map(|var| evaluator.differentiate(eq, var)))
                    .map(|d| evaluator.to_callable(&d))
                    .collect();
                log.push(format!(
                    "Jacobian: [[{}, {}], [{}, {}]]",
                    evaluator.differentiate(&eq1, "x"),
                    evaluator.differentiate(&eq1, "y"),
                    evaluator.differentiate(&eq2, "x"),
                    evaluator.differentiate(&eq2, "y")
                ));
                loop {
                    iter += 1;
                    let (x, y) = (point.x, point.y);
                    let w = Matrix2::new(
                        jacobian[0].at(x, y),
                        jacobian[1].at(x, y),
                        jacobian[2].at(x, y),
                        jacobian[3].at(x, y),
                    );
                    let f = Vector2::new(f1.at(x, y), f2.at(x, y));
                    let step = match w.lu().solve(&(-f)) {
                        Some(step) if step.iter().all(|v| v.is_finite()) => step,
                        _ => {
                            let line = format!("singular Jacobian at ({}, {}), iteration {}", x, y, iter);
                            warn!("{}", line);
                            log.push(line);
                            iter -= 1;
                            break SystemStatus::SingularJacobian;
                        }
                    };
                    point += step;
                    let delta = step.amax();
                    if let Some(status) = self.record(iter, point, delta, &branches, &mut rows, &mut graphics)? {
                        break status;
                    }
                }
            }
        };

        match status {
            SystemStatus::Converged => log.push(format!(
                "solution: x = {:.8}, y = {:.8} in {} iterations",
                point.x, point.y, iter
            )),
            _ => log.push(format!(
                "stopped with {} after {} iterations, last (x, y) = ({}, {})",
                status, iter, point.x, point.y
            )),
        }
        info!("{}", log.last().map(String::as_str).unwrap_or_default());
        let (table, rendered) = capped_table(rows, self.table_row_cap);
        info!("\n{}", rendered);
        Ok(SystemResult {
            solution: (iter > 0).then_some((point.x, point.y)),
            iterations: iter,
            status,
            table,
            graphics: evenly_spaced_elements(&graphics, self.max_snapshots),
            log,
            title: self.method.to_string(),
        })
    }

    /// Pushes the row and snapshot of one step; `Some` status means stop.
    fn record(
        &self,
        iter: usize,
        point: Vector2<f64>,
        delta: f64,
        branches: &[(Branches, Color); 2],
        rows: &mut Vec<SystemRow>,
        graphics: &mut Vec<Vec<GraphicPrimitive>>,
    ) -> CompMathResult<Option<SystemStatus>> {
        debug!("iter {}: ({}, {}), delta = {}", iter, point.x, point.y, delta);
        rows.push(SystemRow {
            iter,
            vector: vec![point.x, point.y],
            delta,
        });
        graphics.push(self.snapshot(point, branches)?);
        if !point.iter().all(|v| v.is_finite()) {
            warn!("the iteration left the domain at step {}", iter);
            return Ok(Some(SystemStatus::IterationLimitExceeded));
        }
        if delta <= self.eps {
            Ok(Some(SystemStatus::Converged))
        } else if iter >= self.iters_limit {
            Ok(Some(SystemStatus::IterationLimitExceeded))
        } else {
            Ok(None)
        }
    }

    /// Equation 1 in blue, equation 2 in red, current point in green.
    fn snapshot(&self, point: Vector2<f64>, branches: &[(Branches, Color); 2]) -> CompMathResult<Vec<GraphicPrimitive>> {
        let mut builder = GraphicBuilder::new(Some(self.x_limits), Some(self.y_limits));
        let style = CurveStyle::default().step(self.curve_step);
        for (branches, color) in branches {
            match branches {
                Branches::OfX(curves) => {
                    for curve in curves {
                        let f = |x: f64| curve.at(x, 0.0);
                        builder.add_curve(Some(&f), None, style.color(*color), None, None)?;
                    }
                }
                Branches::OfY(curves) => {
                    for curve in curves {
                        let f = |y: f64| curve.at(0.0, y);
                        builder.add_curve(None, Some(&f), style.color(*color), None, None)?;
                    }
                }
            }
        }
        builder.add_point(point.x, point.y, Color::Green);
        Ok(builder.build())
    }
}

fn explicit_branches<E: ExpressionEvaluator>(evaluator: &E, equation: &Expression) -> Branches {
    let of_x: Vec<Callable> = evaluator
        .solve_for(equation, "y")
        .iter()
        .filter(|branch| !branch.depends_on("y"))
        .map(|branch| evaluator.to_callable(branch))
        .collect();
    if !of_x.is_empty() {
        return Branches::OfX(of_x);
    }
    Branches::OfY(
        evaluator
            .solve_for(equation, "x")
            .iter()
            .filter(|branch| !branch.depends_on("x"))
            .map(|branch| evaluator.to_callable(branch))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn equations(eq1: &str, eq2: &str) -> Vec<String> {
        vec![eq1.to_string(), eq2.to_string()]
    }

    #[test]
    fn test_fixed_point_methods_converge() {
        for method in [NonlinearMethod::SimpleIteration, NonlinearMethod::Seidel] {
            let mut solver = NonlinearSystemSolver::new(
                method,
                equations("0.1*sin(y) + 0.2 - x", "0.2*cos(x) + 0.5 - y"),
                (0.0, 0.0),
            );
            solver.set_params(1e-10, 100).unwrap();
            let result = solver.solve().unwrap();
            assert_eq!(result.status, SystemStatus::Converged);
            let (x, y) = result.solution.unwrap();
            assert_relative_eq!(x, 0.1 * y.sin() + 0.2, epsilon = 1e-8);
            assert_relative_eq!(y, 0.2 * x.cos() + 0.5, epsilon = 1e-8);
            assert_eq!(result.table.len(), result.iterations);
            assert!(result.table.last().unwrap().delta <= 1e-10);
            assert!(result.graphics.len() <= 10);
            assert_eq!(result.title, method.to_string());
        }
    }

    #[test]
    fn test_seidel_first_step_uses_new_x() {
        let mut solver = NonlinearSystemSolver::new(
            NonlinearMethod::Seidel,
            equations("0.1*sin(y) + 0.2 - x", "0.2*cos(x) + 0.5 - y"),
            (0.0, 0.0),
        );
        solver.set_params(1e-10, 1).unwrap();
        let result = solver.solve().unwrap();
        assert_eq!(result.status, SystemStatus::IterationLimitExceeded);
        assert_eq!(result.iterations, 1);
        let row = &result.table[0];
        assert_relative_eq!(row.vector[0], 0.2, epsilon = 1e-12);
        assert_relative_eq!(row.vector[1], 0.2 * 0.2_f64.cos() + 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_newton_circle_and_line() {
        let mut solver = NonlinearSystemSolver::new(
            NonlinearMethod::Newton,
            equations("x^2 + y^2 - 4", "0.5*x - y + 0.3"),
            (1.5, 1.0),
        );
        solver.set_params(1e-10, 50).unwrap();
        let result = solver.solve().unwrap();
        assert_eq!(result.status, SystemStatus::Converged);
        // x^2 + (0.5x + 0.3)^2 = 4
        let expected_x = (-0.3 + (0.09_f64 + 5.0 * 3.91).sqrt()) / 2.5;
        let (x, y) = result.solution.unwrap();
        assert_relative_eq!(x, expected_x, epsilon = 1e-9);
        assert_relative_eq!(y, 0.5 * expected_x + 0.3, epsilon = 1e-9);
        assert!(result.iterations < 10);
        assert!(result.log.iter().any(|line| line.starts_with("Jacobian")));

        let snapshot = result.graphics.last().unwrap();
        let point = snapshot.last().unwrap();
        assert_eq!(point.kind(), "point");
        assert_eq!(point.color(), Some(Color::Green));
        assert!(snapshot.iter().any(|p| p.kind() == "curve" && p.color() == Some(Color::Red)));
        assert!(snapshot.iter().any(|p| p.kind() == "curve" && p.color() == Some(Color::Blue)));
    }

    #[test]
    fn test_condition_not_met_is_soft() {
        for method in [NonlinearMethod::SimpleIteration, NonlinearMethod::Seidel, NonlinearMethod::Newton] {
            let solver = NonlinearSystemSolver::new(method, equations("x^2 + y^2 - 4", "x - y"), (1.5, 1.0));
            let result = solver.solve().unwrap();
            assert_eq!(result.status, SystemStatus::ConvergenceConditionNotMet);
            assert!(result.table.is_empty());
            assert!(result.graphics.is_empty());
            assert!(result.solution.is_none());
            assert!(result.log.iter().any(|line| line == "convergence condition not met"));
        }
    }

    #[test]
    fn test_validation() {
        let solver = NonlinearSystemSolver::new(NonlinearMethod::Newton, vec!["x - 1".to_string()], (0.0, 0.0));
        assert!(matches!(solver.solve(), Err(CompMathError::WrongEquationCount(1))));
        let mut solver = NonlinearSystemSolver::new(NonlinearMethod::Newton, equations("x", "y"), (0.0, 0.0));
        assert!(solver.set_params(-1.0, 10).is_err());
        assert!(solver.set_params(1e-3, 0).is_err());
        let bad = NonlinearSystemSolver::new(NonlinearMethod::Newton, equations("x + z", "y"), (0.0, 0.0));
        assert!(matches!(bad.solve(), Err(CompMathError::InvalidExpression(_))));
    }

    #[test]
    fn test_snapshots_downsampled() {
        let mut solver = NonlinearSystemSolver::new(
            NonlinearMethod::SimpleIteration,
            equations("0.5*sin(y) + 0.2 - x", "0.5*cos(x) + 0.5 - y"),
            (0.0, 0.0),
        );
        solver.set_params(1e-14, 40).unwrap();
        let result = solver.solve().unwrap();
        assert!(result.iterations > 10);
        assert_eq!(result.graphics.len(), 10);
    }
}

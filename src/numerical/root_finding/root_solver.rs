use crate::Utils::config::SolverConfig;
use crate::Utils::tables::capped_table;
use crate::error::{CompMathError, CompMathResult};
use crate::graphic::graphic_builder::{CurveStyle, GraphicBuilder, line_between_points, tangent_line};
use crate::graphic::primitives::{Color, GraphicPrimitive};
use crate::numerical::iteration_rows::RootRow;
use crate::symbolic::expression_evaluator::{ExpressionEvaluator, SymbolicEvaluator};
use crate::symbolic::symbolic_derivatives::{numerical_derivative, second_numerical_derivative};
use log::{debug, info, warn};
use strum_macros::{Display, EnumIter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
pub enum RootMethod {
    #[strum(serialize = "Bisection method")]
    Bisection,
    #[strum(serialize = "Chord method")]
    Chord,
    /// unsafeguarded: the new estimate replaces the older end point whatever its sign, so the
    /// iteration may leave the initial interval and diverge
    #[strum(serialize = "Secant method")]
    Secant,
    #[strum(serialize = "Newton's tangent method")]
    NewtonTangent,
    /// `x <- f(x)`: the function given is the iteration function itself
    #[strum(serialize = "Simple iteration method")]
    SimpleIteration,
}

impl RootMethod {
    /// Methods that need a sign change on `[a, b]`.
    pub fn needs_bracket(&self) -> bool {
        matches!(
            self,
            RootMethod::Bisection | RootMethod::Chord | RootMethod::NewtonTangent
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum SolverState {
    Init,
    Iterating,
    Converged,
    IterationLimitExceeded,
    NoRootInInterval,
}

#[derive(Clone, Debug)]
pub struct RootResult {
    /// last estimate, also when the iteration limit was hit
    pub root: f64,
    pub iterations: usize,
    pub state: SolverState,
    pub table: Vec<RootRow>,
    /// one snapshot per iteration
    pub graphics: Vec<Vec<GraphicPrimitive>>,
    pub log: Vec<String>,
    pub title: String,
}

/// rows, snapshots and log lines collected while iterating
#[derive(Default)]
struct Trace {
    rows: Vec<RootRow>,
    graphics: Vec<Vec<GraphicPrimitive>>,
    log: Vec<String>,
}

impl Trace {
    fn note(&mut self, line: String) {
        info!("{}", line);
        self.log.push(line);
    }
}

/// Scalar root finder for `f(x) = 0` on `[a, b]`.
///
/// # Examples
/// ```rust, ignore
/// let mut solver = RootSolver::new(RootMethod::Bisection, "x**3 - 2*x - 5", 2.0, 3.0);
/// solver.set_params(1e-3, 100)?;
/// let result = solver.solve()?;
/// ```
pub struct RootSolver {
    pub method: RootMethod,
    pub fx: String,
    pub a: f64,
    pub b: f64,
    pub eps: f64,
    pub iters_limit: usize,
    pub x_limits: (f64, f64),
    pub y_limits: (f64, f64),
    curve_step: f64,
    table_row_cap: usize,
    state: SolverState,
}

impl RootSolver {
    pub fn new(method: RootMethod, fx: &str, a: f64, b: f64) -> Self {
        let config = SolverConfig::default();
        RootSolver {
            method,
            fx: fx.to_string(),
            a,
            b,
            eps: config.eps,
            iters_limit: config.iters_limit,
            x_limits: config.x_limits,
            y_limits: config.y_limits,
            curve_step: config.curve_step,
            table_row_cap: config.table_row_cap,
            state: SolverState::Init,
        }
    }

    pub fn with_config(mut self, config: &SolverConfig) -> Self {
        self.eps = config.eps;
        self.iters_limit = config.iters_limit;
        self.x_limits = config.x_limits;
        self.y_limits = config.y_limits;
        self.curve_step = config.curve_step;
        self.table_row_cap = config.table_row_cap;
        self
    }

    ////////////////////////////SETTERS///////////////////////////////////////////////////////////////////
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

    pub fn state(&self) -> SolverState {
        self.state
    }

    pub fn solve(&mut self) -> CompMathResult<RootResult> {
        self.solve_with(&SymbolicEvaluator)
    }

    /// Validates the task, then iterates the chosen method.
    ///
    /// Validation problems return `Err` before any iteration. Hitting `iters_limit` is not an
    /// error: the result carries `IterationLimitExceeded` and the last estimate.
    pub fn solve_with<E: ExpressionEvaluator>(&mut self, evaluator: &E) -> CompMathResult<RootResult> {
        self.state = SolverState::Init;
        let expression = evaluator.parse(&self.fx)?;
        if expression.depends_on("y") {
            return Err(CompMathError::InvalidExpression(format!(
                "'{}' must be a function of x only",
                self.fx
            )));
        }
        let callable = evaluator.to_callable(&expression);
        let f = |x: f64| callable.at(x, 0.0);
        let (a, b) = (self.a, self.b);
        if !(a < b) {
            return Err(CompMathError::InvalidInterval { a, b });
        }

        let mut trace = Trace::default();
        trace.note(format!("{}: f(x) = {}, [{}, {}], eps = {}", self.method, self.fx, a, b, self.eps));
        if self.method.needs_bracket() && f(a) * f(b) > 0.0 {
            self.state = SolverState::NoRootInInterval;
            warn!("f(a) = {} and f(b) = {} have the same sign", f(a), f(b));
            return Err(CompMathError::NoRootInInterval { a, b });
        }
        if self.method == RootMethod::SimpleIteration {
            let (fa_abs, fb_abs) = (f(a).abs(), f(b).abs());
            if !(fa_abs <= 1.0 && fb_abs <= 1.0) {
                return Err(CompMathError::IterationPreconditionFailed { fa_abs, fb_abs });
            }
            let (da, db) = (numerical_derivative(f, a).abs(), numerical_derivative(f, b).abs());
            trace.note(format!("|f'(a)| = {:.6}, |f'(b)| = {:.6}", da, db));
            if da >= 1.0 || db >= 1.0 {
                warn!("|f'| >= 1 at an end point, the iteration may diverge");
                trace.log.push("warning: |f'| >= 1 at an end point, the iteration may diverge".to_string());
            }
        }

        self.state = SolverState::Iterating;
        let (root, iterations) = match self.method {
            RootMethod::Bisection => self.bisection(&f, &mut trace)?,
            RootMethod::Chord => self.chord(&f, &mut trace)?,
            RootMethod::Secant => self.secant(&f, &mut trace)?,
            RootMethod::NewtonTangent => self.newton(&f, &mut trace)?,
            RootMethod::SimpleIteration => self.simple_iteration(&f, &mut trace)?,
        };

        match self.state {
            SolverState::Converged => {
                trace.note(format!("root x = {:.8} found in {} iterations", root, iterations))
            }
            _ => trace.note(format!(
                "stopped after {} iterations without reaching eps, last estimate x = {:.8}",
                iterations, root
            )),
        }
        let (table, rendered) = capped_table(trace.rows, self.table_row_cap);
        info!("\n{}", rendered);
        Ok(RootResult {
            root,
            iterations,
            state: self.state,
            table,
            graphics: trace.graphics,
            log: trace.log,
            title: self.method.to_string(),
        })
    }

    /// Sets the final state after a step; `true` means stop.
    fn finish_step(&mut self, converged: bool, iter: usize) -> bool {
        if converged {
            self.state = SolverState::Converged;
            true
        } else if iter >= self.iters_limit {
            self.state = SolverState::IterationLimitExceeded;
            true
        } else {
            false
        }
    }

    /// f curve, yellow end points, red estimate and the method's auxiliary line
    fn snapshot(
        &self,
        f: &dyn Fn(f64) -> f64,
        (a, b, x): (f64, f64, f64),
        line: Option<&dyn Fn(f64) -> f64>,
    ) -> CompMathResult<Vec<GraphicPrimitive>> {
        let mut builder = GraphicBuilder::new(Some(self.x_limits), Some(self.y_limits));
        let style = CurveStyle::default().step(self.curve_step);
        builder.add_curve(Some(f), None, style, None, None)?;
        builder.add_point(a, f(a), Color::Yellow);
        builder.add_point(b, f(b), Color::Yellow);
        builder.add_point(x, f(x), Color::Red);
        if let Some(line) = line {
            builder.add_curve(Some(line), None, style.color(Color::Orange), None, None)?;
        }
        Ok(builder.build())
    }

    fn bisection(&mut self, f: &dyn Fn(f64) -> f64, trace: &mut Trace) -> CompMathResult<(f64, usize)> {
        let (mut a, mut b) = (self.a, self.b);
        let mut iter = 0;
        loop {
            iter += 1;
            let x = (a + b) / 2.0;
            let fx = f(x);
            trace.rows.push(RootRow { iter, x, fx, a, fa: f(a), b, fb: f(b), width: (a - b).abs() });
            trace.graphics.push(self.snapshot(f, (a, b, x), None)?);
            debug!("iter {}: [{}, {}] x = {}", iter, a, b, x);
            if fx == 0.0 {
                self.state = SolverState::Converged;
                return Ok((x, iter));
            }
            if f(a) * fx <= 0.0 {
                b = x;
            } else {
                a = x;
            }
            if self.finish_step((a - b).abs() <= self.eps, iter) {
                return Ok((x, iter));
            }
        }
    }

    fn chord(&mut self, f: &dyn Fn(f64) -> f64, trace: &mut Trace) -> CompMathResult<(f64, usize)> {
        let (mut a, mut b) = (self.a, self.b);
        let mut iter = 0;
        let mut x = a;
        loop {
            iter += 1;
            let (fa, fb) = (f(a), f(b));
            if fb == fa {
                trace.note(format!("f(a) = f(b) = {}, chord is horizontal, stop", fa));
                self.state = SolverState::IterationLimitExceeded;
                return Ok((x, iter - 1));
            }
            x = a - fa * (b - a) / (fb - fa);
            let fx = f(x);
            trace.rows.push(RootRow { iter, x, fx, a, fa, b, fb, width: (a - b).abs() });
            let chord = line_between_points(a, fa, b, fb);
            trace.graphics.push(self.snapshot(f, (a, b, x), Some(&chord))?);
            debug!("iter {}: [{}, {}] x = {}", iter, a, b, x);
            if fx == 0.0 {
                self.state = SolverState::Converged;
                return Ok((x, iter));
            }
            if fa * fx < 0.0 {
                b = x;
            } else {
                a = x;
            }
            if self.finish_step((a - b).abs() <= self.eps || fx.abs() <= self.eps, iter) {
                return Ok((x, iter));
            }
        }
    }

    fn secant(&mut self, f: &dyn Fn(f64) -> f64, trace: &mut Trace) -> CompMathResult<(f64, usize)> {
        let (mut a, mut b) = (self.a, self.b);
        let mut iter = 0;
        loop {
            iter += 1;
            let (fa, fb) = (f(a), f(b));
            if fb == fa || !(fb - fa).is_finite() {
                trace.note(format!("zero denominator f(b) - f(a) at iteration {}, stop", iter));
                self.state = SolverState::IterationLimitExceeded;
                return Ok((b, iter - 1));
            }
            let x = b - fb * (b - a) / (fb - fa);
            let fx = f(x);
            trace.rows.push(RootRow { iter, x, fx, a, fa, b, fb, width: (a - b).abs() });
            let secant = line_between_points(a, fa, b, fb);
            trace.graphics.push(self.snapshot(f, (a, b, x), Some(&secant))?);
            debug!("iter {}: a = {}, b = {}, x = {}", iter, a, b, x);
            a = b;
            b = x;
            if self.finish_step((b - a).abs() <= self.eps, iter) {
                return Ok((x, iter));
            }
        }
    }

    fn newton(&mut self, f: &dyn Fn(f64) -> f64, trace: &mut Trace) -> CompMathResult<(f64, usize)> {
        let (a, b) = (self.a, self.b);
        let mut x = if f(a) * second_numerical_derivative(f, a) > 0.0 {
            a
        } else if f(b) * second_numerical_derivative(f, b) > 0.0 {
            b
        } else {
            warn!("f*f'' > 0 holds at neither end point, starting from a");
            trace.log.push("warning: f*f'' > 0 holds at neither end point, starting from a".to_string());
            a
        };
        trace.note(format!("initial approximation x0 = {}", x));
        let mut iter = 0;
        loop {
            iter += 1;
            let fx = f(x);
            let derivative = numerical_derivative(f, x);
            if derivative == 0.0 || !derivative.is_finite() {
                trace.note(format!("f'({}) = {}, tangent does not cross the axis, stop", x, derivative));
                self.state = SolverState::IterationLimitExceeded;
                return Ok((x, iter - 1));
            }
            let x_new = x - fx / derivative;
            let f_new = f(x_new);
            trace.rows.push(RootRow {
                iter,
                x: x_new,
                fx: f_new,
                a: x,
                fa: fx,
                b: x_new,
                fb: f_new,
                width: (x_new - x).abs(),
            });
            let tangent = tangent_line(f, x);
            trace.graphics.push(self.snapshot(f, (x, x_new, x_new), Some(&tangent))?);
            debug!("iter {}: x = {}, f(x) = {}", iter, x_new, f_new);
            let converged = (x_new - x).abs() <= self.eps || f_new.abs() <= self.eps;
            x = x_new;
            if self.finish_step(converged, iter) {
                return Ok((x, iter));
            }
        }
    }

    fn simple_iteration(&mut self, f: &dyn Fn(f64) -> f64, trace: &mut Trace) -> CompMathResult<(f64, usize)> {
        let mut x_prev = self.a;
        let mut iter = 0;
        loop {
            iter += 1;
            let x = f(x_prev);
            if !x.is_finite() {
                trace.note(format!("iteration diverged at step {}", iter));
                self.state = SolverState::IterationLimitExceeded;
                return Ok((x_prev, iter - 1));
            }
            let fx = f(x);
            trace.rows.push(RootRow {
                iter,
                x,
                fx,
                a: x_prev,
                fa: f(x_prev),
                b: x,
                fb: fx,
                width: (x - x_prev).abs(),
            });
            trace.graphics.push(self.snapshot(f, (x_prev, x, x), None)?);
            debug!("iter {}: x = {}", iter, x);
            let converged = (x - x_prev).abs() <= self.eps;
            x_prev = x;
            if self.finish_step(converged, iter) {
                return Ok((x, iter));
            }
        }
    }
}

use crate::Utils::config::SolverConfig;
use crate::Utils::tables::capped_table;
use crate::error::{CompMathError, CompMathResult};
use crate::graphic::graphic_builder::{CurveStyle, GraphicBuilder};
use crate::graphic::primitives::{Color, GraphicPrimitive};
use crate::numerical::curve_fitting::lagrange::lagrange_value;
use crate::numerical::iteration_rows::QuadratureRow;
use crate::numerical::quadrature::reference_integrator::{ReferenceIntegrals, ReferenceIntegrator};
use crate::symbolic::expression_evaluator::{ExpressionEvaluator, SymbolicEvaluator};
use log::{info, warn};
use strum_macros::{Display, EnumIter};

/// samples per drawn Simpson parabola
const PARABOLA_SAMPLES: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
pub enum QuadratureMethod {
    #[strum(serialize = "Left rectangle method")]
    LeftRectangle,
    #[strum(serialize = "Right rectangle method")]
    RightRectangle,
    #[strum(serialize = "Midpoint rectangle method")]
    MidpointRectangle,
    #[strum(serialize = "Trapezoid method")]
    Trapezoid,
    /// composite 1/3 rule, needs an even subinterval count
    #[strum(serialize = "Simpson's method")]
    Simpson,
    /// composite 3/8 rule, subinterval count divisible by 3
    #[strum(serialize = "Simpson's 3/8 method")]
    Simpson38,
    /// Simpson on every subinterval with its midpoint as the middle node
    #[strum(serialize = "Simpson's method with midpoints")]
    SimpsonMidpoint,
}

impl QuadratureMethod {
    fn is_rectangle(&self) -> bool {
        matches!(
            self,
            QuadratureMethod::LeftRectangle
                | QuadratureMethod::RightRectangle
                | QuadratureMethod::MidpointRectangle
        )
    }
}

/// Estimate against the reference integrator.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceComparison {
    pub reference: ReferenceIntegrals,
    pub abs_delta: f64,
    /// percent of |reference|
    pub relative_delta: f64,
}

impl ReferenceComparison {
    pub fn new(reference: ReferenceIntegrals, estimate: f64) -> Self {
        let abs_delta = (reference.reference - estimate).abs();
        // a divergent reference leaves the error as infinite (or undefined)
        let relative_delta = if !reference.reference.is_finite() {
            abs_delta
        } else if reference.reference != 0.0 {
            abs_delta / reference.reference.abs() * 100.0
        } else if abs_delta == 0.0 {
            0.0
        } else {
            f64::INFINITY
        };
        ReferenceComparison {
            reference,
            abs_delta,
            relative_delta,
        }
    }
}

#[derive(Clone, Debug)]
pub struct QuadratureResult {
    pub value: f64,
    pub table: Vec<QuadratureRow>,
    pub graphics: Vec<GraphicPrimitive>,
    pub log: Vec<String>,
    pub title: String,
    pub comparison: Option<ReferenceComparison>,
}

/// Composite quadrature of `f(x)` over `[a, b]` with `n` subintervals.
///
/// # Examples
/// ```rust, ignore
/// let mut solver = QuadratureSolver::new(QuadratureMethod::Simpson, "x^2", 0.0, 3.0, 6);
/// let result = solver.solve()?;
/// assert!((result.value - 9.0).abs() < 1e-12);
/// ```
pub struct QuadratureSolver {
    pub method: QuadratureMethod,
    pub fx: String,
    pub a: f64,
    pub b: f64,
    pub n: usize,
    /// run the reference integrator and attach the comparison
    pub compare: bool,
    pub x_limits: (f64, f64),
    pub y_limits: (f64, f64),
    curve_step: f64,
    table_row_cap: usize,
    max_drawn_subintervals: usize,
    reference: ReferenceIntegrator,
}

impl QuadratureSolver {
    pub fn new(method: QuadratureMethod, fx: &str, a: f64, b: f64, n: usize) -> Self {
        let config = SolverConfig::default();
        QuadratureSolver {
            method,
            fx: fx.to_string(),
            a,
            b,
            n,
            compare: true,
            x_limits: config.x_limits,
            y_limits: config.y_limits,
            curve_step: config.curve_step,
            table_row_cap: config.table_row_cap,
            max_drawn_subintervals: config.max_drawn_subintervals,
            reference: ReferenceIntegrator::from_config(&config),
        }
    }

    pub fn with_config(mut self, config: &SolverConfig) -> Self {
        self.x_limits = config.x_limits;
        self.y_limits = config.y_limits;
        self.curve_step = config.curve_step;
        self.table_row_cap = config.table_row_cap;
        self.max_drawn_subintervals = config.max_drawn_subintervals;
        self.reference = ReferenceIntegrator::from_config(config);
        self
    }

    pub fn set_compare(&mut self, compare: bool) {
        self.compare = compare;
    }

    pub fn set_plot_limits(&mut self, x_limits: (f64, f64), y_limits: (f64, f64)) {
        self.x_limits = x_limits;
        self.y_limits = y_limits;
    }

    /// Checks bounds and the subinterval count against the rule.
    pub fn validate(&self) -> CompMathResult<()> {
        if self.a > self.b {
            return Err(CompMathError::InvalidInterval { a: self.a, b: self.b });
        }
        if self.n == 0 {
            return Err(CompMathError::InvalidSubintervalCount(
                "subinterval count must be positive".to_string(),
            ));
        }
        match self.method {
            QuadratureMethod::Simpson if self.n % 2 != 0 => {
                Err(CompMathError::OddSubintervalCount(self.n))
            }
            QuadratureMethod::Simpson38 if self.n % 3 != 0 => {
                Err(CompMathError::InvalidSubintervalCount(format!(
                    "subinterval count must be divisible by 3, got {}",
                    self.n
                )))
            }
            _ => Ok(()),
        }
    }

    pub fn solve(&mut self) -> CompMathResult<QuadratureResult> {
        self.solve_with(&SymbolicEvaluator)
    }

    pub fn solve_with<E: ExpressionEvaluator>(&mut self, evaluator: &E) -> CompMathResult<QuadratureResult> {
        self.validate()?;
        let expression = evaluator.parse(&self.fx)?;
        if expression.depends_on("y") {
            return Err(CompMathError::InvalidExpression(format!(
                "'{}' must be a function of x only",
                self.fx
            )));
        }
        let callable = evaluator.to_callable(&expression);
        let f = |x: f64| callable.at(x, 0.0);
        let (a, b, n) = (self.a, self.b, self.n);
        let h = (b - a) / n as f64;

        let mut log = Vec::new();
        let header = format!("{}: f(x) = {}, [{}, {}], n = {}, h = {}", self.method, self.fx, a, b, n, h);
        info!("{}", header);
        log.push(header);

        let rows = match self.method {
            QuadratureMethod::LeftRectangle => rectangle_rows(&f, a, h, n, 0.0),
            QuadratureMethod::RightRectangle => rectangle_rows(&f, a, h, n, 1.0),
            QuadratureMethod::MidpointRectangle => rectangle_rows(&f, a, h, n, 0.5),
            QuadratureMethod::Trapezoid => trapezoid_rows(&f, a, h, n),
            QuadratureMethod::Simpson => weighted_rows(&f, a, h, n, h / 3.0, |i| {
                if i % 2 == 1 { 4.0 } else { 2.0 }
            }),
            QuadratureMethod::Simpson38 => weighted_rows(&f, a, h, n, 3.0 * h / 8.0, |i| {
                if i % 3 == 0 { 2.0 } else { 3.0 }
            }),
            QuadratureMethod::SimpsonMidpoint => simpson_midpoint_rows(&f, a, h, n),
        };
        let value: f64 = rows.iter().map(|row| row.value).sum();
        let line = format!("integral = {:.10}", value);
        info!("{}", line);
        log.push(line);
        if !value.is_finite() {
            warn!("the sum is not finite, f may have a singularity on [{}, {}]", a, b);
            log.push("warning: the sum is not finite".to_string());
        }
        let (table, rendered) = capped_table(rows, self.table_row_cap);
        info!("\n{}", rendered);

        let graphics = self.draw(&f)?;
        let comparison = if self.compare {
            let reference = self.reference.compute(&expression, a, b)?;
            log.extend(reference.log.iter().cloned());
            let comparison = ReferenceComparison::new(reference, value);
            let line = format!(
                "reference = {:.10}, absolute error = {:.3e}, relative error = {:.3e} %",
                comparison.reference.reference, comparison.abs_delta, comparison.relative_delta
            );
            info!("{}", line);
            log.push(line);
            Some(comparison)
        } else {
            None
        };

        Ok(QuadratureResult {
            value,
            table,
            graphics,
            log,
            title: self.method.to_string(),
            comparison,
        })
    }

    /// Baseline, then the rule's shapes or one filled curve for large `n`.
    fn draw(&self, f: &dyn Fn(f64) -> f64) -> CompMathResult<Vec<GraphicPrimitive>> {
        let (a, b, n) = (self.a, self.b, self.n);
        let h = (b - a) / n as f64;
        let mut builder = GraphicBuilder::new(Some(self.x_limits), Some(self.y_limits));
        let style = CurveStyle::default().step(self.curve_step);
        builder.add_curve(Some(f), None, style, None, None)?;
        let axis = |_: f64| 0.0;
        builder.add_curve(Some(&axis), None, style.color(Color::Black).width(2.0), None, None)?;
        for end in [a, b] {
            let height = f(end);
            if height.is_finite() {
                let vertical = move |_: f64| end;
                let step = (height.abs() / 10.0).max(f64::EPSILON);
                builder.add_curve(
                    None,
                    Some(&vertical),
                    style.color(Color::Black).step(step),
                    None,
                    Some((0.0, height)),
                )?;
            }
        }

        if n > self.max_drawn_subintervals {
            builder.add_curve(
                Some(f),
                None,
                style.color(Color::Red).fill(Color::Red),
                Some((a, b)),
                None,
            )?;
            return Ok(builder.build());
        }
        match self.method {
            m if m.is_rectangle() => {
                let shift = match m {
                    QuadratureMethod::LeftRectangle => 0.0,
                    QuadratureMethod::RightRectangle => 1.0,
                    _ => 0.5,
                };
                for i in 0..n {
                    let x0 = a + i as f64 * h;
                    let height = f(x0 + shift * h);
                    builder.add_rect((x0, 0.0), (x0 + h, height), Color::Red, 1.0, None);
                }
            }
            QuadratureMethod::Trapezoid => {
                for i in 0..n {
                    let (x0, x1) = (a + i as f64 * h, a + (i + 1) as f64 * h);
                    builder.add_polygon(
                        vec![(x0, 0.0), (x0, f(x0)), (x1, f(x1)), (x1, 0.0)],
                        Color::Red,
                        1.0,
                        None,
                    );
                }
            }
            QuadratureMethod::Simpson => {
                for i in (0..n).step_by(2) {
                    let nodes: Vec<f64> = (0..=2).map(|k| a + (i + k) as f64 * h).collect();
                    builder.add_polygon(parabola_polygon(f, &nodes), Color::Red, 1.0, None);
                }
            }
            QuadratureMethod::Simpson38 => {
                for i in (0..n).step_by(3) {
                    let nodes: Vec<f64> = (0..=3).map(|k| a + (i + k) as f64 * h).collect();
                    builder.add_polygon(parabola_polygon(f, &nodes), Color::Red, 1.0, None);
                }
            }
            _ => {
                for i in 0..n {
                    let x0 = a + i as f64 * h;
                    let nodes = [x0, x0 + h / 2.0, x0 + h];
                    builder.add_polygon(parabola_polygon(f, &nodes), Color::Red, 1.0, None);
                }
            }
        }
        Ok(builder.build())
    }
}

/// `{i, x = a + (i + shift)h, f(x), f(x)h}` for `i in 0..n`
fn rectangle_rows(f: &dyn Fn(f64) -> f64, a: f64, h: f64, n: usize, shift: f64) -> Vec<QuadratureRow> {
    (0..n)
        .map(|index| {
            let x = a + (index as f64 + shift) * h;
            let y = f(x);
            QuadratureRow { index, x, y, value: y * h }
        })
        .collect()
}

fn trapezoid_rows(f: &dyn Fn(f64) -> f64, a: f64, h: f64, n: usize) -> Vec<QuadratureRow> {
    (1..=n)
        .map(|index| {
            let x = a + index as f64 * h;
            let y = f(x);
            let y_prev = f(x - h);
            QuadratureRow {
                index,
                x,
                y,
                value: (y_prev + y) / 2.0 * h,
            }
        })
        .collect()
}

/// One row per node `x_i`, `i in 0..=n`; end nodes weigh 1, inner ones `inner_weight(i)`.
fn weighted_rows(
    f: &dyn Fn(f64) -> f64,
    a: f64,
    h: f64,
    n: usize,
    factor: f64,
    inner_weight: impl Fn(usize) -> f64,
) -> Vec<QuadratureRow> {
    (0..=n)
        .map(|index| {
            let x = a + index as f64 * h;
            let y = f(x);
            let weight = if index == 0 || index == n { 1.0 } else { inner_weight(index) };
            QuadratureRow {
                index,
                x,
                y,
                value: weight * factor * y,
            }
        })
        .collect()
}

/// Nodes and midpoints interleaved: index `2i` is `x_i`, index `2i+1` the midpoint after it.
fn simpson_midpoint_rows(f: &dyn Fn(f64) -> f64, a: f64, h: f64, n: usize) -> Vec<QuadratureRow> {
    let factor = h / 6.0;
    (0..=2 * n)
        .map(|index| {
            let x = a + index as f64 * h / 2.0;
            let y = f(x);
            let weight = if index % 2 == 1 {
                4.0
            } else if index == 0 || index == 2 * n {
                1.0
            } else {
                2.0
            };
            QuadratureRow {
                index,
                x,
                y,
                value: weight * factor * y,
            }
        })
        .collect()
}

/// Closed polygon under the interpolating polynomial through `(node, f(node))`.
fn parabola_polygon(f: &dyn Fn(f64) -> f64, nodes: &[f64]) -> Vec<(f64, f64)> {
    let points: Vec<(f64, f64)> = nodes.iter().map(|&x| (x, f(x))).collect();
    let (first, last) = (nodes[0], nodes[nodes.len() - 1]);
    let step = (last - first) / PARABOLA_SAMPLES as f64;
    let mut vertices = vec![(first, 0.0)];
    vertices.extend((0..=PARABOLA_SAMPLES).map(|k| {
        let x = first + k as f64 * step;
        (x, lagrange_value(&points, x))
    }));
    vertices.push((last, 0.0));
    vertices
}

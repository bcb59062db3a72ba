use crate::error::{CompMathError, CompMathResult};
use crate::symbolic::symbolic_engine::Expr;
use gauss_quad::GaussLegendre;

/// Slope `k` of an argument of the form `k*var + c`, `None` for anything else.
fn linear_coefficient(arg: &Expr, var: &str) -> Option<f64> {
    if !arg.contains_variable(var) {
        return None;
    }
    match arg.diff_simplified(var).as_const() {
        Some(k) if k != 0.0 && k.is_finite() => Some(k),
        _ => None,
    }
}

/// ln|u| written with the nodes the engine has: ln(u^2)/2
fn ln_abs(u: Expr) -> Expr {
    Expr::Const(0.5) * u.pow(Expr::Const(2.0)).ln()
}

/// panels of the grid scanned for poles
const POLE_PANELS: usize = 64;
const GOLDEN_STEPS: usize = 100;
/// a panel peak this many times above the grid maximum is a pole candidate
const PEAK_RATIO: f64 = 1e6;
/// distance of the growth probe from a candidate, relative to `b - a`
const GROWTH_STEP: f64 = 1e-6;
/// |f| ~ |x - c|^(-p) with p at or above this is not integrable
const DIVERGENT_ORDER: f64 = 0.9;

/// A point where the integrand is unbounded and the integral over it diverges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pole {
    pub at: f64,
    /// `+inf` or `-inf` when `f` keeps one sign around the pole, NaN when it changes sign
    pub divergence: f64,
}

/// `|f(x)|` with NaN counted as zero, so domain gaps are not mistaken for poles.
fn magnitude(f: &dyn Fn(f64) -> f64, x: f64) -> f64 {
    let value = f(x);
    if value.is_nan() { 0.0 } else { value.abs() }
}

/// Golden-section search for the largest `|f|` on `[lo, hi]`.
fn peak(f: &dyn Fn(f64) -> f64, mut lo: f64, mut hi: f64) -> (f64, f64) {
    let ratio = (5.0_f64.sqrt() - 1.0) / 2.0;
    let mut x1 = hi - ratio * (hi - lo);
    let mut x2 = lo + ratio * (hi - lo);
    let (mut m1, mut m2) = (magnitude(f, x1), magnitude(f, x2));
    for _ in 0..GOLDEN_STEPS {
        if m1.is_infinite() || m2.is_infinite() {
            break;
        }
        if m1 >= m2 {
            hi = x2;
            x2 = x1;
            m2 = m1;
            x1 = hi - ratio * (hi - lo);
            m1 = magnitude(f, x1);
        } else {
            lo = x1;
            x1 = x2;
            m1 = m2;
            x2 = lo + ratio * (hi - lo);
            m2 = magnitude(f, x2);
        }
    }
    if m1 >= m2 { (x1, m1) } else { (x2, m2) }
}

/// Classifies a candidate `c` by the order `p` of growth of `|f|` on each side inside `[lo, hi]`.
fn classify(f: &dyn Fn(f64) -> f64, c: f64, lo: f64, hi: f64) -> Option<Pole> {
    let d = GROWTH_STEP * (hi - lo);
    let mut signs = Vec::new();
    for side in [-1.0, 1.0] {
        let (near, far) = (c + side * d / 10.0, c + side * d);
        if far < lo || far > hi {
            continue;
        }
        let order = (magnitude(f, near) / magnitude(f, far)).log10();
        if order >= DIVERGENT_ORDER {
            signs.push(f(far).signum());
        }
    }
    let first = *signs.first()?;
    let divergence = if signs.iter().all(|&s| s == first) {
        first * f64::INFINITY
    } else {
        f64::NAN
    };
    Some(Pole { at: c, divergence })
}

fn unsupported(expr: &Expr) -> CompMathError {
    CompMathError::InvalidExpression(format!("no antiderivative rule for {}", expr))
}

impl Expr {
    /// SYMBOLIC INTEGRATION
    ///
    /// Indefinite integral without the constant of integration. Only the elementary cases are
    /// covered: linear combinations, factors free of `var`, powers and exponentials of a linear
    /// argument, exp/ln/sin/cos/tg/ctg of a linear argument and c/(linear). Everything else is
    /// an error, callers fall back to `quad`.
    pub fn integrate(&self, var: &str) -> CompMathResult<Expr> {
        let x = Expr::var(var);
        if !self.contains_variable(var) {
            // ∫ c dx = c*x
            return Ok(self.clone() * x);
        }
        let result = match self {
            Expr::Var(_) => x.pow(Expr::Const(2.0)) / Expr::Const(2.0),
            Expr::Add(lhs, rhs) => lhs.integrate(var)? + rhs.integrate(var)?,
            Expr::Sub(lhs, rhs) => lhs.integrate(var)? - rhs.integrate(var)?,
            Expr::Mul(lhs, rhs) => {
                if !lhs.contains_variable(var) {
                    *lhs.clone() * rhs.integrate(var)?
                } else if !rhs.contains_variable(var) {
                    *rhs.clone() * lhs.integrate(var)?
                } else {
                    return Err(unsupported(self));
                }
            }
            Expr::Div(lhs, rhs) => {
                if !rhs.contains_variable(var) {
                    lhs.integrate(var)? / *rhs.clone()
                } else if let (false, Some(k)) =
                    (lhs.contains_variable(var), linear_coefficient(rhs, var))
                {
                    // ∫ c/(kx+b) dx = c/k ln|kx+b|
                    *lhs.clone() / Expr::Const(k) * ln_abs((**rhs).clone())
                } else {
                    return Err(unsupported(self));
                }
            }
            Expr::Pow(base, exp) => {
                if let (Some(n), Some(k)) = (exp.as_const(), linear_coefficient(base, var)) {
                    if n == -1.0 {
                        ln_abs((**base).clone()) / Expr::Const(k)
                    } else {
                        (**base).clone().pow(Expr::Const(n + 1.0)) / Expr::Const((n + 1.0) * k)
                    }
                } else if let (false, Some(k)) =
                    (base.contains_variable(var), linear_coefficient(exp, var))
                {
                    // ∫ a^(kx+b) dx = a^(kx+b) / (k ln a)
                    self.clone() / (Expr::Const(k) * (**base).clone().ln())
                } else {
                    return Err(unsupported(self));
                }
            }
            Expr::Exp(u) => {
                let k = linear_coefficient(u, var).ok_or_else(|| unsupported(self))?;
                self.clone() / Expr::Const(k)
            }
            Expr::Ln(u) => {
                // ∫ ln(u) dx = (u ln u - u)/k
                let k = linear_coefficient(u, var).ok_or_else(|| unsupported(self))?;
                ((**u).clone() * self.clone() - (**u).clone()) / Expr::Const(k)
            }
            Expr::sin(u) => {
                let k = linear_coefficient(u, var).ok_or_else(|| unsupported(self))?;
                -Expr::cos(u.clone()) / Expr::Const(k)
            }
            Expr::cos(u) => {
                let k = linear_coefficient(u, var).ok_or_else(|| unsupported(self))?;
                Expr::sin(u.clone()) / Expr::Const(k)
            }
            Expr::tg(u) => {
                let k = linear_coefficient(u, var).ok_or_else(|| unsupported(self))?;
                -ln_abs(Expr::cos(u.clone())) / Expr::Const(k)
            }
            Expr::ctg(u) => {
                let k = linear_coefficient(u, var).ok_or_else(|| unsupported(self))?;
                ln_abs(Expr::sin(u.clone())) / Expr::Const(k)
            }
            _ => return Err(unsupported(self)),
        };
        Ok(result.simplify())
    }

    /// Looks for a non-integrable singularity of the expression on `[a, b]`.
    ///
    /// The grid nodes and the largest `|f|` of every panel are candidates; a candidate is a pole
    /// when `|f|` grows at least like `1/|x - c|` next to it. Integrable singularities such as
    /// `x^(-1/2)` at 0 are not reported.
    pub fn find_pole(&self, var: &str, a: f64, b: f64) -> CompMathResult<Option<Pole>> {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        if lo == hi || !(lo.is_finite() && hi.is_finite()) {
            return Ok(None);
        }
        let compiled = self.lambdify(&[var])?;
        let f = move |x: f64| compiled(&[x]);
        let h = (hi - lo) / POLE_PANELS as f64;
        let nodes: Vec<f64> = (0..=POLE_PANELS)
            .map(|i| if i == POLE_PANELS { hi } else { lo + i as f64 * h })
            .collect();
        let magnitudes: Vec<f64> = nodes.iter().map(|&x| magnitude(&f, x)).collect();
        let scale = 1.0
            + magnitudes
                .iter()
                .filter(|m| m.is_finite())
                .fold(0.0_f64, |acc, &m| acc.max(m));

        for (x, m) in nodes.iter().zip(&magnitudes) {
            if m.is_infinite() {
                if let Some(pole) = classify(&f, *x, lo, hi) {
                    return Ok(Some(pole));
                }
            }
        }
        for w in nodes.windows(2) {
            let (x, m) = peak(&f, w[0], w[1]);
            if m > PEAK_RATIO * scale {
                if let Some(pole) = classify(&f, x, lo, hi) {
                    return Ok(Some(pole));
                }
            }
        }
        Ok(None)
    }

    /// F(b) - F(a) for the antiderivative F found by `integrate`.
    /// Fails when there is no antiderivative, when the integrand has a pole on `[a, b]`, or when
    /// F is not finite at an end point.
    pub fn definite_integrate(&self, var: &str, a: f64, b: f64) -> CompMathResult<f64> {
        let antiderivative = self.integrate(var)?;
        if let Some(pole) = self.find_pole(var, a, b)? {
            return Err(CompMathError::DivergentIntegral { at: pole.at });
        }
        let fa = antiderivative.eval_expression(&[var], &[a]);
        let fb = antiderivative.eval_expression(&[var], &[b]);
        let value = fb - fa;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(CompMathError::InvalidExpression(format!(
                "antiderivative {} is not finite on [{}, {}]",
                antiderivative, a, b
            )))
        }
    }

    /// Gauss-Legendre quadrature of the expression over `[lower, upper]`.
    pub fn quad(&self, var: &str, degree: usize, lower: f64, upper: f64) -> CompMathResult<f64> {
        let f = self.lambdify(&[var])?;
        let quad = GaussLegendre::new(degree).map_err(|e| {
            CompMathError::Validation(format!(
                "Failed to create Gauss-Legendre quadrature: {:?}",
                e
            ))
        })?;
        Ok(quad.integrate(lower, upper, |x| f(&[x])))
    }
}

//! # Derivatives
//!
//! - `diff(var)` - analytic partial derivative, raw (not simplified)
//! - `diff_simplified(var)` - the same passed through `simplify()`
//! - `numerical_derivative(f, x)` - forward difference with fixed step `DERIVATIVE_STEP`
//! - `second_numerical_derivative(f, x)` - central second difference
//!
//! Newton-type root finders use the numerical versions because the tangent is only needed at a
//! point; the nonlinear system solvers need the analytic Jacobian.
use crate::symbolic::symbolic_engine::Expr;

/// Step of the forward difference `(f(x+h) - f(x)) / h`.
pub const DERIVATIVE_STEP: f64 = 1e-4;

impl Expr {
    /// Computes the analytical derivative of the expression with respect to a variable.
    ///
    /// Rules used:
    /// - Product rule: d/dx(f*g) = f'*g + f*g'
    /// - Quotient rule: d/dx(f/g) = (f'*g - f*g')/g^2
    /// - Power rule with constant exponent: d/dx(u^n) = n*u^(n-1)*u'
    /// - General power: d/dx(u^v) = u^v*(v'*ln(u) + v*u'/u)
    /// - Chain rule for every elementary function
    ///
    /// # Arguments
    /// * `var` - Variable name to differentiate with respect to
    ///
    /// # Examples
    /// ```rust, ignore
    /// let x = Expr::Var("x".to_string());
    /// let f = x.clone().pow(Expr::Const(2.0)); // x^2
    /// let df_dx = f.diff("x"); // 2*x
    /// ```
    pub fn diff(&self, var: &str) -> Expr {
        match self {
            Expr::Var(name) => {
                if name == var {
                    Expr::Const(1.0)
                } else {
                    Expr::Const(0.0)
                }
            }
            Expr::Const(_) => Expr::Const(0.0),
            Expr::Add(lhs, rhs) => lhs.diff(var) + rhs.diff(var),
            Expr::Sub(lhs, rhs) => lhs.diff(var) - rhs.diff(var),
            Expr::Mul(lhs, rhs) => {
                lhs.diff(var) * *rhs.clone() + *lhs.clone() * rhs.diff(var)
            }
            Expr::Div(lhs, rhs) => {
                (lhs.diff(var) * *rhs.clone() - *lhs.clone() * rhs.diff(var))
                    / (**rhs).clone().pow(Expr::Const(2.0))
            }
            Expr::Pow(base, exp) => {
                if exp.contains_variable(var) {
                    // u^v * (v' ln u + v u' / u)
                    self.clone()
                        * (exp.diff(var) * (**base).clone().ln()
                            + *exp.clone() * base.diff(var) / *base.clone())
                } else {
                    *exp.clone()
                        * (**base).clone().pow(*exp.clone() - Expr::Const(1.0))
                        * base.diff(var)
                }
            }
            Expr::Exp(expr) => (**expr).clone().exp() * expr.diff(var),
            Expr::Ln(expr) => expr.diff(var) / *expr.clone(),
            Expr::sin(expr) => Expr::cos(expr.clone()) * expr.diff(var),
            Expr::cos(expr) => -Expr::sin(expr.clone()) * expr.diff(var),
            Expr::tg(expr) => {
                expr.diff(var) / Expr::cos(expr.clone()).pow(Expr::Const(2.0))
            }
            Expr::ctg(expr) => {
                -expr.diff(var) / Expr::sin(expr.clone()).pow(Expr::Const(2.0))
            }
            Expr::arcsin(expr) => {
                expr.diff(var) / (Expr::Const(1.0) - (**expr).clone().pow(Expr::Const(2.0))).sqrt()
            }
            Expr::arccos(expr) => {
                -expr.diff(var) / (Expr::Const(1.0) - (**expr).clone().pow(Expr::Const(2.0))).sqrt()
            }
            Expr::arctg(expr) => {
                expr.diff(var) / (Expr::Const(1.0) + (**expr).clone().pow(Expr::Const(2.0)))
            }
            Expr::arcctg(expr) => {
                -expr.diff(var) / (Expr::Const(1.0) + (**expr).clone().pow(Expr::Const(2.0)))
            }
        }
    }

    /// `diff` followed by `simplify`
    pub fn diff_simplified(&self, var: &str) -> Expr {
        self.diff(var).simplify()
    }

    /// n-th derivative, simplified after every step
    pub fn n_th_derivative1D(&self, var: &str, n: usize) -> Expr {
        (0..n).fold(self.clone(), |acc, _| acc.diff_simplified(var))
    }
}

/// Forward difference `(f(x+h) - f(x)) / h` with `h = DERIVATIVE_STEP`.
pub fn numerical_derivative<F: Fn(f64) -> f64>(f: F, x: f64) -> f64 {
    (f(x + DERIVATIVE_STEP) - f(x)) / DERIVATIVE_STEP
}

/// Central second difference `(f(x+h) - 2f(x) + f(x-h)) / h^2`.
pub fn second_numerical_derivative<F: Fn(f64) -> f64>(f: F, x: f64) -> f64 {
    let h = DERIVATIVE_STEP;
    (f(x + h) - 2.0 * f(x) + f(x - h)) / (h * h)
}

use crate::error::{CompMathError, CompMathResult};
use crate::symbolic::symbolic_engine::{Expr, apply_pow};
use std::f64::consts::PI;

/// Compiled multi-variable function, arguments are positional in the order of `vars`.
pub type CompiledFn = Box<dyn Fn(&[f64]) -> f64 + Send + Sync>;

impl Expr {
    /// LAMBDIFICATION - Converting Symbolic Expressions to Executable Functions
    ///
    /// Compiles the tree into nested closures, one per node, so that evaluation does not walk
    /// the tree or look variables up by name.
    ///
    /// # Arguments
    /// * `vars` - argument order of the resulting closure
    ///
    /// # Returns
    /// Closure taking `&[f64]`. An argument slice shorter than `vars` yields NaN for the missing
    /// positions. Fails if the expression mentions a variable absent from `vars`.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let f = Expr::parse_expression("x^2 + y").unwrap();
    /// let func = f.lambdify(&["x", "y"]).unwrap();
    /// assert_eq!(func(&[3.0, 1.0]), 10.0);
    /// ```
    pub fn lambdify(&self, vars: &[&str]) -> CompMathResult<CompiledFn> {
        let missing: Vec<String> = self
            .all_arguments_are_variables()
            .into_iter()
            .filter(|name| !vars.contains(&name.as_str()))
            .collect();
        if !missing.is_empty() {
            return Err(CompMathError::InvalidExpression(format!(
                "variables {:?} are not among the arguments {:?}",
                missing, vars
            )));
        }
        Ok(self.lambdify_unchecked(vars))
    }

    fn lambdify_unchecked(&self, vars: &[&str]) -> CompiledFn {
        match self {
            Expr::Var(name) => match vars.iter().position(|v| v == name) {
                Some(index) => Box::new(move |args: &[f64]| args.get(index).copied().unwrap_or(f64::NAN)),
                None => Box::new(|_: &[f64]| f64::NAN),
            },
            Expr::Const(val) => {
                let val = *val;
                Box::new(move |_: &[f64]| val)
            }
            Expr::Add(lhs, rhs) => {
                let lhs_fn = lhs.lambdify_unchecked(vars);
                let rhs_fn = rhs.lambdify_unchecked(vars);
                Box::new(move |args: &[f64]| lhs_fn(args) + rhs_fn(args))
            }
            Expr::Sub(lhs, rhs) => {
                let lhs_fn = lhs.lambdify_unchecked(vars);
                let rhs_fn = rhs.lambdify_unchecked(vars);
                Box::new(move |args: &[f64]| lhs_fn(args) - rhs_fn(args))
            }
            Expr::Mul(lhs, rhs) => {
                let lhs_fn = lhs.lambdify_unchecked(vars);
                let rhs_fn = rhs.lambdify_unchecked(vars);
                Box::new(move |args: &[f64]| lhs_fn(args) * rhs_fn(args))
            }
            Expr::Div(lhs, rhs) => {
                let lhs_fn = lhs.lambdify_unchecked(vars);
                let rhs_fn = rhs.lambdify_unchecked(vars);
                Box::new(move |args: &[f64]| lhs_fn(args) / rhs_fn(args))
            }
            Expr::Pow(base, exp) => match exp.as_const() {
                // constant exponent is by far the most common case
                Some(n) => {
                    let base_fn = base.lambdify_unchecked(vars);
                    Box::new(move |args: &[f64]| apply_pow(base_fn(args), n))
                }
                None => {
                    let base_fn = base.lambdify_unchecked(vars);
                    let exp_fn = exp.lambdify_unchecked(vars);
                    Box::new(move |args: &[f64]| apply_pow(base_fn(args), exp_fn(args)))
                }
            },
            Expr::Exp(expr) => {
                let expr_fn = expr.lambdify_unchecked(vars);
                Box::new(move |args: &[f64]| expr_fn(args).exp())
            }
            Expr::Ln(expr) => {
                let expr_fn = expr.lambdify_unchecked(vars);
                Box::new(move |args: &[f64]| expr_fn(args).ln())
            }
            Expr::sin(expr) => {
                let expr_fn = expr.lambdify_unchecked(vars);
                Box::new(move |args: &[f64]| expr_fn(args).sin())
            }
            Expr::cos(expr) => {
                let expr_fn = expr.lambdify_unchecked(vars);
                Box::new(move |args: &[f64]| expr_fn(args).cos())
            }
            Expr::tg(expr) => {
                let expr_fn = expr.lambdify_unchecked(vars);
                Box::new(move |args: &[f64]| expr_fn(args).tan())
            }
            Expr::ctg(expr) => {
                let expr_fn = expr.lambdify_unchecked(vars);
                Box::new(move |args: &[f64]| 1.0 / expr_fn(args).tan())
            }
            Expr::arcsin(expr) => {
                let expr_fn = expr.lambdify_unchecked(vars);
                Box::new(move |args: &[f64]| expr_fn(args).asin())
            }
            Expr::arccos(expr) => {
                let expr_fn = expr.lambdify_unchecked(vars);
                Box::new(move |args: &[f64]| expr_fn(args).acos())
            }
            Expr::arctg(expr) => {
                let expr_fn = expr.lambdify_unchecked(vars);
                Box::new(move |args: &[f64]| expr_fn(args).atan())
            }
            Expr::arcctg(expr) => {
                let expr_fn = expr.lambdify_unchecked(vars);
                Box::new(move |args: &[f64]| PI / 2.0 - expr_fn(args).atan())
            }
        } // end of match
    } // end of lambdify_unchecked

    /// Converts an expression of at most one variable into `Fn(f64) -> f64`.
    /// A constant expression gives a constant function.
    pub fn lambdify1D(&self) -> CompMathResult<Box<dyn Fn(f64) -> f64 + Send + Sync>> {
        let vars = self.all_arguments_are_variables();
        match vars.len() {
            0 => {
                let compiled = self.lambdify_unchecked(&[]);
                Ok(Box::new(move |_: f64| compiled(&[])))
            }
            1 => {
                let compiled = self.lambdify_unchecked(&[vars[0].as_str()]);
                Ok(Box::new(move |x: f64| compiled(&[x])))
            }
            _ => Err(CompMathError::InvalidExpression(format!(
                "lambdify1D can only be used with expressions containing one variable, found: {:?}",
                vars
            ))),
        }
    } // end of lambdify1D
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lambdify_matches_eval() {
        let expr = Expr::parse_expression("x^3*y - sin(x)/(y + 2) + exp(-x) + arcctg(y)").unwrap();
        let func = expr.lambdify(&["x", "y"]).unwrap();
        for (x, y) in [(0.5, 1.0), (-1.2, 3.0), (2.0, -0.5)] {
            assert_relative_eq!(
                func(&[x, y]),
                expr.eval_expression(&["x", "y"], &[x, y]),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_argument_order() {
        let expr = Expr::parse_expression("x - y").unwrap();
        let xy = expr.lambdify(&["x", "y"]).unwrap();
        let yx = expr.lambdify(&["y", "x"]).unwrap();
        assert_eq!(xy(&[5.0, 2.0]), 3.0);
        assert_eq!(yx(&[5.0, 2.0]), -3.0);
    }

    #[test]
    fn test_missing_argument_is_nan() {
        let expr = Expr::parse_expression("x + y").unwrap();
        let func = expr.lambdify(&["x", "y"]).unwrap();
        assert!(func(&[1.0]).is_nan());
    }

    #[test]
    fn test_unknown_variable_rejected() {
        let expr = Expr::parse_expression("x + z").unwrap();
        assert!(expr.lambdify(&["x", "y"]).is_err());
    }

    #[test]
    fn test_lambdify1D() {
        let f = Expr::parse_expression("(-2)^x").unwrap().lambdify1D().unwrap();
        assert_eq!(f(3.0), -8.0);
        let c = Expr::parse_expression("2 * pi").unwrap().lambdify1D().unwrap();
        assert_relative_eq!(c(100.0), 2.0 * PI);
        assert!(Expr::parse_expression("x*y").unwrap().lambdify1D().is_err());
    }
}

//! The seam between the numerical methods and the symbolic engine.
//!
//! Solvers never touch `Expr` directly: they parse text into an [`Expression`], compile it into a
//! [`Callable`], and ask for derivatives or explicit solutions through the
//! [`ExpressionEvaluator`] trait. [`SymbolicEvaluator`] implements it on top of the `Expr` tree.
use crate::error::{CompMathError, CompMathResult};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_lambdify::CompiledFn;
use std::fmt;

/// Names a user function may use; `x` always comes first in a call.
pub const ALLOWED_VARIABLES: [&str; 2] = ["x", "y"];

/// Parsed function together with its source text and free variables.
#[derive(Clone, Debug, PartialEq)]
pub struct Expression {
    pub text: String,
    pub expr: Expr,
    /// sorted, subset of `ALLOWED_VARIABLES`
    pub free_vars: Vec<String>,
}

impl Expression {
    fn from_expr(text: String, expr: Expr) -> Self {
        let free_vars = expr.all_arguments_are_variables();
        Expression {
            text,
            expr,
            free_vars,
        }
    }

    pub fn depends_on(&self, var: &str) -> bool {
        self.free_vars.iter().any(|v| v == var)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Compiled function. Positional arguments follow `vars`.
pub struct Callable {
    pub vars: Vec<String>,
    func: CompiledFn,
}

impl Callable {
    /// Positional call; missing trailing arguments evaluate to NaN.
    pub fn call(&self, args: &[f64]) -> f64 {
        (self.func)(args)
    }

    /// Call by name: `x` and `y` are routed to whatever positions the callable expects.
    pub fn at(&self, x: f64, y: f64) -> f64 {
        let args: Vec<f64> = self
            .vars
            .iter()
            .map(|v| if v == "x" { x } else { y })
            .collect();
        (self.func)(&args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Callable").field("vars", &self.vars).finish()
    }
}

/// Capability every solver needs from a function engine.
pub trait ExpressionEvaluator {
    fn parse(&self, text: &str) -> CompMathResult<Expression>;
    fn to_callable(&self, expression: &Expression) -> Callable;
    fn differentiate(&self, expression: &Expression, var: &str) -> Expression;
    /// Solutions of `expression = 0` for `var`, empty when none can be found.
    fn solve_for(&self, expression: &Expression, var: &str) -> Vec<Expression>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SymbolicEvaluator;

impl ExpressionEvaluator for SymbolicEvaluator {
    fn parse(&self, text: &str) -> CompMathResult<Expression> {
        let expr = Expr::parse_expression(text)?;
        let expression = Expression::from_expr(text.trim().to_string(), expr);
        if let Some(bad) = expression
            .free_vars
            .iter()
            .find(|v| !ALLOWED_VARIABLES.contains(&v.as_str()))
        {
            return Err(CompMathError::InvalidExpression(format!(
                "unrecognized variable '{}'",
                bad
            )));
        }
        Ok(expression)
    }

    fn to_callable(&self, expression: &Expression) -> Callable {
        let vars: Vec<String> = ALLOWED_VARIABLES
            .iter()
            .filter(|v| expression.depends_on(v))
            .map(|v| v.to_string())
            .collect();
        let names: Vec<&str> = vars.iter().map(|v| v.as_str()).collect();
        // every free variable is in `vars`, so compilation cannot fail
        let func: CompiledFn = match expression.expr.lambdify(&names) {
            Ok(func) => func,
            Err(_) => Box::new(|_: &[f64]| f64::NAN),
        };
        Callable { vars, func }
    }

    fn differentiate(&self, expression: &Expression, var: &str) -> Expression {
        let derivative = expression.expr.diff_simplified(var);
        Expression::from_expr(derivative.to_string(), derivative)
    }

    fn solve_for(&self, expression: &Expression, var: &str) -> Vec<Expression> {
        expression
            .expr
            .solve_for(var)
            .into_iter()
            .map(|solution| Expression::from_expr(solution.to_string(), solution))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_and_call() {
        let evaluator = SymbolicEvaluator;
        let expr = evaluator.parse("x**3 - 2*x - 5").unwrap();
        assert_eq!(expr.free_vars, vec!["x".to_string()]);
        let f = evaluator.to_callable(&expr);
        assert_eq!(f.call(&[2.0]), -1.0);
        assert_eq!(f.at(2.0, 100.0), -1.0);
    }

    #[test]
    fn test_unrecognized_variable() {
        let err = SymbolicEvaluator.parse("1/z").unwrap_err();
        assert!(matches!(err, CompMathError::InvalidExpression(_)));
        assert!(err.to_string().contains("unrecognized variable 'z'"), "{}", err);
    }

    #[test]
    fn test_constants_are_not_variables() {
        let expr = SymbolicEvaluator.parse("pi * e").unwrap();
        assert!(expr.free_vars.is_empty());
        let f = SymbolicEvaluator.to_callable(&expr);
        assert_relative_eq!(f.call(&[]), std::f64::consts::PI * std::f64::consts::E);
    }

    #[test]
    fn test_y_only_callable_by_name() {
        let evaluator = SymbolicEvaluator;
        let expr = evaluator.parse("y^2 + 1").unwrap();
        let f = evaluator.to_callable(&expr);
        assert_eq!(f.vars, vec!["y".to_string()]);
        assert_eq!(f.at(7.0, 3.0), 10.0);
        assert_eq!(f.call(&[3.0]), 10.0);
    }

    #[test]
    fn test_derivative_and_solutions_are_reparseable() {
        let evaluator = SymbolicEvaluator;
        let expr = evaluator.parse("x^2 + y^2 - 25").unwrap();
        let dx = evaluator.differentiate(&expr, "x");
        let reparsed = evaluator.parse(&dx.text).unwrap();
        assert_relative_eq!(
            evaluator.to_callable(&reparsed).at(3.0, 4.0),
            6.0,
            epsilon = 1e-12
        );
        let branches = evaluator.solve_for(&expr, "y");
        assert_eq!(branches.len(), 2);
        for branch in &branches {
            assert_eq!(branch.free_vars, vec!["x".to_string()]);
            let y = evaluator.to_callable(branch).at(3.0, 0.0);
            assert_relative_eq!(y.abs(), 4.0, epsilon = 1e-12);
        }
    }
}

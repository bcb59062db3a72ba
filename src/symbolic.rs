//! Symbolic expressions: parsing function text, analytic derivatives, simplification,
//! compilation into closures, integration and solving an equation for one variable.
//!
//! Every numerical method of the crate consumes functions through [`expression_evaluator`],
//! the other modules here are the engine behind it.
/// core symbolic expression tree `Expr` with operator overloading and variable helpers
pub mod symbolic_engine;
/// nom grammar turning text like "x**3 - 2*x - 5" into `Expr`
pub mod parse_expr;
/// analytic differentiation and the finite-difference helpers
pub mod symbolic_derivatives;
/// constant folding and algebraic identities
pub mod symbolic_simplify;
/// turn `Expr` into `Fn(&[f64]) -> f64` closures
pub mod symbolic_lambdify;
/// indefinite and definite integrals, Gauss-Legendre quadrature of an expression
pub mod symbolic_integration;
/// solve `expr = 0` for a named variable
pub mod symbolic_solve;
///  Example#1
/// ```
/// use CompMath::symbolic::expression_evaluator::{ExpressionEvaluator, SymbolicEvaluator};
/// let evaluator = SymbolicEvaluator;
/// let expr = evaluator.parse("x**3 - 2*x - 5").unwrap();
/// let f = evaluator.to_callable(&expr);
/// assert_eq!(f.call(&[2.0]), -1.0);
/// // derivative and solving for a variable
/// let df = evaluator.differentiate(&expr, "x");
/// assert_eq!(evaluator.to_callable(&df).call(&[1.0]), 1.0);
/// let circle = evaluator.parse("x^2 + y^2 - 25").unwrap();
/// assert_eq!(evaluator.solve_for(&circle, "y").len(), 2);
/// ```
pub mod expression_evaluator;

//! The numerical methods. Every solver family consumes functions through
//! [`crate::symbolic::expression_evaluator`], reports each step as a table row and a drawing
//! snapshot and returns its result by value.
/// `RootRow`, `SystemRow` and `QuadratureRow` with their table views
pub mod iteration_rows;
/// bisection, chord, secant, Newton's tangent and simple iteration for `f(x) = 0`
pub mod root_finding;
///  Example#1
/// ```
/// use CompMath::numerical::quadrature::quadrature_rules::{QuadratureMethod, QuadratureSolver};
/// let mut solver = QuadratureSolver::new(QuadratureMethod::Simpson, "x^2", 0.0, 3.0, 6);
/// solver.set_compare(false);
/// let result = solver.solve().unwrap();
/// assert!((result.value - 9.0).abs() < 1e-9);
/// ```
pub mod quadrature;
/// Gauss elimination, Jacobi and Seidel on the original, transformed and normalized system
pub mod linear_systems;
/// two-equation systems: simple iteration, Seidel and Newton
pub mod nonlinear_systems;
///  Example#1
/// ```
/// use CompMath::numerical::curve_fitting::approximation::{CurveFitSolver, best_fit};
/// let points = [(0.0, 1.0), (1.0, 2.9), (2.0, 5.1), (3.0, 7.0), (4.0, 9.1)];
/// let solver = CurveFitSolver::new(&points).unwrap();
/// let results = solver.approximate_all().unwrap();
/// assert_eq!(results.len(), 9);
/// assert!(best_fit(&results).is_some());
/// ```
pub mod curve_fitting;

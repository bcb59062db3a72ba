use crate::Utils::config::SolverConfig;
use crate::error::CompMathError;
use crate::graphic::primitives::Color;
use crate::numerical::root_finding::root_solver::{RootMethod, RootSolver, SolverState};
use approx::assert_relative_eq;
use strum::IntoEnumIterator;

const ROOT: f64 = 2.0945514815423265;

fn solver(method: RootMethod, fx: &str, a: f64, b: f64, eps: f64) -> RootSolver {
    let mut solver = RootSolver::new(method, fx, a, b);
    solver.set_params(eps, 100).unwrap();
    solver
}

#[test]
fn test_bisection_converges() {
    let mut bisection = solver(RootMethod::Bisection, "x**3 - 2*x - 5", 2.0, 3.0, 1e-3);
    let result = bisection.solve().unwrap();
    assert_eq!(result.state, SolverState::Converged);
    assert_eq!(bisection.state(), SolverState::Converged);
    assert_eq!(result.iterations, 10);
    assert!((result.root - ROOT).abs() < 1e-3);
    assert_eq!(result.table.len(), result.iterations);
    assert_eq!(result.graphics.len(), result.iterations);
    assert_eq!(result.title, "Bisection method");
    // bracket never grows
    assert!(result.table.windows(2).all(|w| w[1].width <= w[0].width));
    assert!(result.table.last().unwrap().width / 2.0 <= 1e-3);
}

#[test]
fn test_chord_converges_with_fixed_end() {
    let mut chord = solver(RootMethod::Chord, "x**3 - 2*x - 5", 2.0, 3.0, 1e-3);
    let result = chord.solve().unwrap();
    assert_eq!(result.state, SolverState::Converged);
    assert!((result.root - ROOT).abs() < 1e-3);
    assert!(result.table.windows(2).all(|w| w[1].width <= w[0].width));
    assert!(result.table.iter().all(|row| row.b == 3.0));
    let kinds: Vec<&str> = result.graphics[0].iter().map(|p| p.kind()).collect();
    assert_eq!(kinds, vec!["curve", "point", "point", "point", "curve"]);
    assert_eq!(result.graphics[0][1].color(), Some(Color::Yellow));
    assert_eq!(result.graphics[0][3].color(), Some(Color::Red));
}

#[test]
fn test_secant_and_newton() {
    let mut secant = solver(RootMethod::Secant, "x**3 - 2*x - 5", 2.0, 3.0, 1e-6);
    let result = secant.solve().unwrap();
    assert_eq!(result.state, SolverState::Converged);
    assert_relative_eq!(result.root, ROOT, epsilon = 1e-6);

    let mut newton = solver(RootMethod::NewtonTangent, "x**3 - 2*x - 5", 2.0, 3.0, 1e-6);
    let result = newton.solve().unwrap();
    assert_eq!(result.state, SolverState::Converged);
    assert_relative_eq!(result.root, ROOT, epsilon = 1e-6);
    // f*f'' > 0 at the right end
    assert_eq!(result.table[0].a, 3.0);
    assert!(result.iterations < 10);
}

#[test]
fn test_simple_iteration() {
    let mut iteration = solver(RootMethod::SimpleIteration, "cos(x)", 0.0, 1.0, 1e-6);
    let result = iteration.solve().unwrap();
    assert_eq!(result.state, SolverState::Converged);
    assert_relative_eq!(result.root, 0.7390851332151607, epsilon = 1e-5);
    assert_eq!(result.table[0].a, 0.0);
    assert_eq!(result.table[0].b, 1.0);
    assert!(result.log[1].starts_with("|f'(a)|"));
}

#[test]
fn test_simple_iteration_precondition() {
    let mut iteration = solver(RootMethod::SimpleIteration, "x^2 + 2", 0.0, 1.0, 1e-4);
    assert!(matches!(
        iteration.solve(),
        Err(CompMathError::IterationPreconditionFailed { .. })
    ));
}

#[test]
fn test_validation_errors() {
    let mut no_root = solver(RootMethod::Bisection, "x^2 + 1", -1.0, 1.0, 1e-4);
    assert!(matches!(no_root.solve(), Err(CompMathError::NoRootInInterval { .. })));
    assert_eq!(no_root.state(), SolverState::NoRootInInterval);

    let mut reversed = solver(RootMethod::Chord, "x", 1.0, -1.0, 1e-4);
    assert!(matches!(reversed.solve(), Err(CompMathError::InvalidInterval { .. })));
    assert_eq!(reversed.state(), SolverState::Init);

    let mut bad_function = solver(RootMethod::Secant, "1/z", 1.0, 2.0, 1e-4);
    assert!(matches!(bad_function.solve(), Err(CompMathError::InvalidExpression(_))));

    let mut two_vars = solver(RootMethod::Secant, "x + y", 1.0, 2.0, 1e-4);
    assert!(two_vars.solve().is_err());

    assert!(RootSolver::new(RootMethod::Bisection, "x", 0.0, 1.0).set_params(0.0, 10).is_err());
}

#[test]
fn test_iteration_limit_is_not_an_error() {
    let mut bisection = RootSolver::new(RootMethod::Bisection, "x**3 - 2*x - 5", 2.0, 3.0);
    bisection.set_params(1e-12, 5).unwrap();
    let result = bisection.solve().unwrap();
    assert_eq!(result.state, SolverState::IterationLimitExceeded);
    assert_eq!(result.iterations, 5);
    assert_eq!(result.table.len(), 5);
}

#[test]
fn test_table_cap_from_config() {
    let config = SolverConfig {
        table_row_cap: 3,
        ..SolverConfig::default()
    };
    let mut bisection =
        RootSolver::new(RootMethod::Bisection, "x**3 - 2*x - 5", 2.0, 3.0).with_config(&config);
    let result = bisection.solve().unwrap();
    assert!(result.iterations > 3);
    assert_eq!(result.table.len(), 2);
    assert_eq!(result.table[0].iter, 1);
    assert_eq!(result.table[1].iter, result.iterations);
}

#[test]
fn test_every_method_on_linear_function() {
    // |f(a)|, |f(b)| <= 1 also holds for the iteration function 0.5*x
    for method in RootMethod::iter() {
        let mut s = solver(method, "0.5*x", -1.0, 1.0, 1e-8);
        let result = s.solve().unwrap();
        assert!(result.root.abs() < 1e-6, "{}: {}", method, result.root);
    }
}

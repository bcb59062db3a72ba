use crate::error::CompMathError;
use crate::numerical::linear_systems::gauss::gauss_solve;
use crate::numerical::linear_systems::linear_solver::{LinearMethod, LinearSystemSolver, SystemVariant};
use crate::numerical::linear_systems::matrix_transforms::is_diagonally_dominant;
use approx::assert_relative_eq;
use nalgebra::{DMatrix, DVector};
use rand::Rng;

/// random matrix with a strictly dominant diagonal, hence well conditioned
fn random_dominant(n: usize) -> (DMatrix<f64>, DVector<f64>) {
    let mut rng = rand::rng();
    let mut a = DMatrix::from_fn(n, n, |_, _| rng.random_range(-1.0..1.0));
    for i in 0..n {
        a[(i, i)] = n as f64 + rng.random_range(1.0..2.0);
    }
    let b = DVector::from_fn(n, |_, _| rng.random_range(-10.0..10.0));
    (a, b)
}

#[test]
fn test_gauss_random_residual() {
    for n in [2, 5, 10, 25] {
        let (a, b) = random_dominant(n);
        let solved = gauss_solve(&a, &b).unwrap().unwrap();
        assert!(solved.residual.amax() < 1e-9, "n = {}: {}", n, solved.residual.amax());
        assert!((&b - &a * &solved.solution).amax() < 1e-9);
    }
}

#[test]
fn test_iterative_methods_on_random_dominant() {
    let (a, b) = random_dominant(8);
    let exact = gauss_solve(&a, &b).unwrap().unwrap().solution;
    for method in [LinearMethod::Jacobi, LinearMethod::Seidel] {
        let mut solver = LinearSystemSolver::new(method, a.clone(), b.clone());
        solver.set_params(1e-12, 500).unwrap();
        let [original, transformed, _] = solver.solve().unwrap();
        assert_relative_eq!(original.solution.clone().unwrap(), exact, epsilon = 1e-9);
        assert!(transformed.log.iter().any(|line| line.contains("no transformation needed")));
        assert_eq!(transformed.matrix, original.matrix);
    }
}

#[test]
fn test_normalized_seidel_on_non_dominant() {
    let rows = vec![vec![1.0, 2.0], vec![3.0, 1.0]];
    let mut solver = LinearSystemSolver::from_rows(LinearMethod::Seidel, rows, vec![3.0, 4.0]).unwrap();
    solver.set_params(1e-12, 1000).unwrap();
    let [original, transformed, normalized] = solver.solve().unwrap();
    assert_eq!(original.variant, SystemVariant::Original);
    assert!(!is_diagonally_dominant(&original.matrix));
    assert!(transformed.log.iter().any(|line| line == "swap rows 1 and 2"));
    assert!(is_diagonally_dominant(&transformed.matrix));
    assert_relative_eq!(transformed.solution.unwrap(), DVector::from_element(2, 1.0), epsilon = 1e-9);
    assert_eq!(normalized.title, "Normalized matrix");
    assert_eq!(normalized.matrix, DMatrix::from_row_slice(2, 2, &[10.0, 5.0, 5.0, 5.0]));
    assert_relative_eq!(normalized.solution.unwrap(), DVector::from_element(2, 1.0), epsilon = 1e-9);
}

#[test]
fn test_gauss_variants_log() {
    let mut solver =
        LinearSystemSolver::from_rows(LinearMethod::Gauss, vec![vec![2.0, 1.0], vec![1.0, 3.0]], vec![3.0, 5.0])
            .unwrap();
    solver.set_initial_guess(vec![0.0, 0.0]).unwrap();
    let results = solver.solve().unwrap();
    for result in &results {
        assert_relative_eq!(result.solution.clone().unwrap()[0], 0.8, epsilon = 1e-12);
        assert_eq!(result.iterations, 0);
        assert!(result.table.is_empty());
        assert!(result.log.iter().any(|line| line == "Triangular matrix"));
        assert!(result.residual.as_ref().unwrap().amax() < 1e-12);
    }
}

#[test]
fn test_soft_and_hard_failures() {
    let singular = LinearSystemSolver::from_rows(LinearMethod::Gauss, vec![vec![1.0, 2.0], vec![2.0, 4.0]], vec![1.0, 2.0])
        .unwrap();
    let [original, _, _] = singular.solve().unwrap();
    assert!(original.solution.is_none());
    assert!(original.log.iter().any(|line| line.contains("ill-conditioned")));

    assert!(matches!(
        LinearSystemSolver::from_rows(LinearMethod::Gauss, vec![vec![1.0, 2.0], vec![2.0]], vec![1.0, 2.0]),
        Err(CompMathError::DimensionMismatch(_))
    ));
    let mut solver =
        LinearSystemSolver::from_rows(LinearMethod::Jacobi, vec![vec![2.0, 1.0], vec![1.0, 3.0]], vec![3.0, 5.0]).unwrap();
    assert!(solver.set_initial_guess(vec![0.0]).is_err());
    assert!(solver.set_params(-1.0, 10).is_err());
}

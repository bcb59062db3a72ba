//! Dense linear systems `A x = b`.
//!
//! [`gauss::gauss_solve`] eliminates directly; [`iterative::jacobi`] and [`iterative::seidel`]
//! iterate and need a diagonally dominant (or normalized) matrix to converge, which
//! [`matrix_transforms`] can produce. [`linear_solver::LinearSystemSolver`] runs one method on the
//! original, the transformed and the normalized system.
pub mod gauss;
pub mod iterative;
pub mod linear_solver;
pub mod matrix_transforms;
#[cfg(test)]
mod linear_tests;

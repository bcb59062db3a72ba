//! Two-equation nonlinear systems: the fixed-point convergence check, simple iteration,
//! Seidel and Newton's method.
pub mod convergence_check;
pub mod system_solver;

//! Root finding for a scalar equation `f(x) = 0` given as text.
//!
//! Five classical methods share one solver struct: bisection, chord (false position), secant,
//! Newton's tangent method and simple (fixed-point) iteration. Every step produces a table row
//! and a drawing snapshot.
/// `RootSolver`, `RootMethod`, `SolverState`, `RootResult`
pub mod root_solver;
#[cfg(test)]
mod root_tests;

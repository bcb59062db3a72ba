//! Composite quadrature rules and the reference values they are checked against.
//!
//! Rectangle (left, right, midpoint), trapezoid and three Simpson variants. Each run returns the
//! estimate, a per-subinterval or per-node table, a drawing and, unless switched off, a
//! comparison with [`reference_integrator::ReferenceIntegrator`].
pub mod quadrature_rules;
pub mod reference_integrator;

use crate::Utils::config::SolverConfig;
use crate::error::{CompMathError, CompMathResult};
use crate::symbolic::expression_evaluator::Expression;
use crate::symbolic::symbolic_engine::Expr;
use gauss_quad::GaussLegendre;
use log::{info, warn};
use std::f64::consts::PI;

/// Exact-if-possible values attached to a function on `[a, b]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceIntegrals {
    /// ∫ f dx
    pub reference: f64,
    /// ∫ sqrt(1 + f'^2) dx
    pub arc_length: f64,
    /// 2π ∫ f sqrt(1 + f'^2) dx, surface of revolution around the x axis
    pub surface_area: f64,
    /// π ∫ f^2 dx, volume of revolution around the x axis
    pub volume: f64,
    pub log: Vec<String>,
}

/// Antiderivative first, composite Gauss-Legendre when there is none.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferenceIntegrator {
    /// nodes per panel
    pub degree: usize,
    pub panels: usize,
}

impl Default for ReferenceIntegrator {
    fn default() -> Self {
        let config = SolverConfig::default();
        ReferenceIntegrator {
            degree: config.quad_degree,
            panels: config.quad_panels,
        }
    }
}

impl ReferenceIntegrator {
    pub fn new(degree: usize, panels: usize) -> Self {
        ReferenceIntegrator { degree, panels }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self::new(config.quad_degree, config.quad_panels)
    }

    /// Composite Gauss-Legendre: `panels` equal pieces, `degree` nodes each.
    pub fn composite_gauss(&self, f: &dyn Fn(f64) -> f64, a: f64, b: f64) -> CompMathResult<f64> {
        if self.panels == 0 {
            return Err(CompMathError::Validation("at least one panel needed".to_string()));
        }
        let rule = GaussLegendre::new(self.degree).map_err(|e| {
            CompMathError::Validation(format!(
                "Failed to create Gauss-Legendre quadrature: {:?}",
                e
            ))
        })?;
        let h = (b - a) / self.panels as f64;
        Ok((0..self.panels)
            .map(|i| {
                let lo = a + i as f64 * h;
                rule.integrate(lo, lo + h, f)
            })
            .sum())
    }

    /// One integral of `integrand(x)`, logged with the path that produced it.
    /// A divergent integral is `±inf`, or NaN when the sign of the divergence is undefined.
    fn integrate(&self, name: &str, integrand: &Expr, a: f64, b: f64, log: &mut Vec<String>) -> CompMathResult<f64> {
        let integrand = integrand.simplify();
        if let Some(pole) = integrand.find_pole("x", a, b)? {
            let line = format!("{}: {} (diverges, pole at x = {:.6})", name, pole.divergence, pole.at);
            warn!("{}", line);
            log.push(line);
            return Ok(pole.divergence);
        }
        let line = match integrand.definite_integrate("x", a, b) {
            Ok(value) => {
                let line = format!("{}: {:.10} (antiderivative)", name, value);
                log.push(line.clone());
                info!("{}", line);
                return Ok(value);
            }
            Err(e) => e.to_string(),
        };
        let f = integrand.lambdify(&["x"])?;
        let value = self.composite_gauss(&|x| f(&[x]), a, b)?;
        let line = format!(
            "{}: {:.10} (Gauss-Legendre, {} panels x {} nodes; {})",
            name, value, self.panels, self.degree, line
        );
        info!("{}", line);
        log.push(line);
        Ok(value)
    }

    /// Reference integral, arc length, surface area and volume of `f(x)` over `[a, b]`.
    pub fn compute(&self, expression: &Expression, a: f64, b: f64) -> CompMathResult<ReferenceIntegrals> {
        let f = expression.expr.clone();
        let df = f.diff_simplified("x");
        let element = (Expr::Const(1.0) + df.pow(Expr::Const(2.0))).sqrt();
        let mut log = Vec::new();
        let reference = self.integrate("reference integral", &f, a, b, &mut log)?;
        let arc_length = self.integrate("arc length", &element, a, b, &mut log)?;
        let surface_area = self.integrate(
            "surface area",
            &(Expr::Const(2.0 * PI) * (f.clone() * element)),
            a,
            b,
            &mut log,
        )?;
        let volume = self.integrate(
            "volume",
            &(Expr::Const(PI) * f.pow(Expr::Const(2.0))),
            a,
            b,
            &mut log,
        )?;
        Ok(ReferenceIntegrals {
            reference,
            arc_length,
            surface_area,
            volume,
            log,
        })
    }
}

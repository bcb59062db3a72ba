//! Levenberg-Marquardt fitting of the three-parameter models `f(x; a, b, c)`.
//!
//! Damping follows Marquardt: the step solves `(JᵀJ + λ diag(JᵀJ)) δ = -Jᵀr`, λ shrinks after an
//! accepted step and grows after a rejected one. The Jacobian is a forward difference, so every
//! Jacobian costs `n` residual evaluations and counts against the budget.
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};
use std::fmt;
use strum_macros::{Display, EnumIter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
pub enum NonlinearModel {
    #[strum(serialize = "exponential")]
    Exponential,
    #[strum(serialize = "logistic")]
    Logistic,
    #[strum(serialize = "sinusoidal")]
    Sinusoidal,
    #[strum(serialize = "power")]
    Power,
}

impl NonlinearModel {
    pub fn value(&self, p: &DVector<f64>, x: f64) -> f64 {
        let (a, b, c) = (p[0], p[1], p[2]);
        match self {
            NonlinearModel::Exponential => a * (b * x).exp() + c,
            NonlinearModel::Logistic => a / (1.0 + b * (-c * x).exp()),
            NonlinearModel::Sinusoidal => a * (x + b).sin() + c,
            NonlinearModel::Power => a * x.powf(b) + c,
        }
    }

    pub fn formula(&self) -> &'static str {
        match self {
            NonlinearModel::Exponential => "a*exp(b*x) + c",
            NonlinearModel::Logistic => "a/(1 + b*exp(-c*x))",
            NonlinearModel::Sinusoidal => "a*sin(x + b) + c",
            NonlinearModel::Power => "a*x^b + c",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LMConfig {
    pub ftol: f64,
    pub xtol: f64,
    pub gtol: f64,
    pub max_evaluations: usize,
    pub lambda_0: f64,
    pub lambda_up_fac: f64,
    pub lambda_dn_fac: f64,
}

impl Default for LMConfig {
    fn default() -> Self {
        Self {
            ftol: 1e-12,
            xtol: 1e-12,
            gtol: 1e-12,
            max_evaluations: 800,
            lambda_0: 1e-3,
            lambda_up_fac: 11.0,
            lambda_dn_fac: 9.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TerminationReason {
    Converged,
    /// gradient vanished or no step lowers the cost any more
    Stationary,
    MaxEvaluationsReached,
    NonFinite(String),
    SingularStep,
}

impl TerminationReason {
    pub fn is_success(&self) -> bool {
        matches!(self, TerminationReason::Converged | TerminationReason::Stationary)
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TerminationReason::Converged => write!(f, "converged"),
            TerminationReason::Stationary => write!(f, "stationary point reached"),
            TerminationReason::MaxEvaluationsReached => {
                write!(f, "optimal parameters not found: number of calls to function has reached maxfev")
            }
            TerminationReason::NonFinite(what) => write!(f, "{} is not finite", what),
            TerminationReason::SingularStep => write!(f, "the damped normal matrix is singular"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LMResult {
    pub parameters: DVector<f64>,
    /// `sum r_i^2` at `parameters`
    pub sum_squares: f64,
    pub termination: TerminationReason,
    pub evaluations: usize,
}

pub trait LeastSquaresProblem {
    /// `None` when the residuals cannot be evaluated.
    fn residuals(&self, params: &DVector<f64>) -> Option<DVector<f64>>;

    fn num_parameters(&self) -> usize;

    /// Forward differences unless overridden.
    fn jacobian(&self, params: &DVector<f64>, r: &DVector<f64>) -> Option<DMatrix<f64>> {
        let mut jacobian = DMatrix::zeros(r.len(), self.num_parameters());
        for j in 0..self.num_parameters() {
            let h = f64::EPSILON.sqrt() * params[j].abs().max(1.0);
            let mut shifted = params.clone();
            shifted[j] += h;
            let column = (self.residuals(&shifted)? - r) / h;
            jacobian.set_column(j, &column);
        }
        Some(jacobian)
    }
}

/// Residuals `f(x_i) - y_i` of one model over the data.
pub struct CurveProblem<'a> {
    pub model: NonlinearModel,
    pub xs: &'a [f64],
    pub ys: &'a [f64],
}

impl LeastSquaresProblem for CurveProblem<'_> {
    fn residuals(&self, params: &DVector<f64>) -> Option<DVector<f64>> {
        let r = DVector::from_iterator(
            self.xs.len(),
            self.xs.iter().zip(self.ys).map(|(&x, &y)| self.model.value(params, x) - y),
        );
        r.iter().all(|v| v.is_finite()).then_some(r)
    }

    fn num_parameters(&self) -> usize {
        3
    }
}

pub fn levenberg_marquardt<P: LeastSquaresProblem>(
    problem: &P,
    initial_params: DVector<f64>,
    config: &LMConfig,
) -> LMResult {
    let n = problem.num_parameters();
    let mut params = initial_params;
    let finish = |parameters: DVector<f64>, sum_squares: f64, termination: TerminationReason, evaluations: usize| {
        LMResult {
            parameters,
            sum_squares,
            termination,
            evaluations,
        }
    };

    let Some(mut r) = problem.residuals(&params) else {
        return finish(
            params,
            f64::INFINITY,
            TerminationReason::NonFinite("model at the initial guess".to_string()),
            1,
        );
    };
    let mut evaluations = 1;
    let mut cost = r.norm_squared();
    let mut lambda = config.lambda_0;

    loop {
        if cost == 0.0 {
            return finish(params, cost, TerminationReason::Converged, evaluations);
        }
        if evaluations + n > config.max_evaluations {
            return finish(params, cost, TerminationReason::MaxEvaluationsReached, evaluations);
        }
        let Some(jacobian) = problem.jacobian(&params, &r) else {
            return finish(
                params,
                cost,
                TerminationReason::NonFinite("Jacobian".to_string()),
                evaluations + n,
            );
        };
        evaluations += n;
        let jt = jacobian.transpose();
        let jtj = &jt * &jacobian;
        let gradient = &jt * &r;
        if gradient.amax() <= config.gtol {
            return finish(params, cost, TerminationReason::Stationary, evaluations);
        }

        // inner loop: raise lambda until a step lowers the cost
        loop {
            if evaluations >= config.max_evaluations {
                return finish(params, cost, TerminationReason::MaxEvaluationsReached, evaluations);
            }
            let mut damped = jtj.clone();
            for i in 0..n {
                damped[(i, i)] += lambda * jtj[(i, i)].max(f64::EPSILON);
            }
            let Some(step) = damped.lu().solve(&(-&gradient)) else {
                return finish(params, cost, TerminationReason::SingularStep, evaluations);
            };
            let trial = &params + &step;
            evaluations += 1;
            match problem.residuals(&trial) {
                Some(trial_r) if trial_r.norm_squared() < cost => {
                    let trial_cost = trial_r.norm_squared();
                    let small_decrease = cost - trial_cost <= config.ftol * cost;
                    let small_step = step.norm() <= config.xtol * (params.norm() + config.xtol);
                    debug!("LM accepted step: cost {} -> {}, lambda = {}", cost, trial_cost, lambda);
                    params = trial;
                    r = trial_r;
                    cost = trial_cost;
                    lambda = (lambda / config.lambda_dn_fac).max(1e-12);
                    if small_decrease || small_step {
                        return finish(params, cost, TerminationReason::Converged, evaluations);
                    }
                    break;
                }
                _ => {
                    lambda *= config.lambda_up_fac;
                    if lambda > 1e16 {
                        return finish(params, cost, TerminationReason::Stationary, evaluations);
                    }
                }
            }
        }
    }
}

/// Fits `model` to the data from `[1, 1, 0]`; failures are reported through the termination reason.
pub fn fit_model(model: NonlinearModel, xs: &[f64], ys: &[f64]) -> LMResult {
    let problem = CurveProblem { model, xs, ys };
    let result = levenberg_marquardt(&problem, DVector::from_vec(vec![1.0, 1.0, 0.0]), &LMConfig::default());
    if !result.termination.is_success() {
        warn!("{} fit failed: {}", model, result.termination);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(model: NonlinearModel, p: [f64; 3], xs: &[f64]) -> Vec<f64> {
        let p = DVector::from_vec(p.to_vec());
        xs.iter().map(|&x| model.value(&p, x)).collect()
    }

    #[test]
    fn test_exponential_recovered() {
        let xs: Vec<f64> = (0..7).map(|i| i as f64 * 0.5).collect();
        let ys = sample(NonlinearModel::Exponential, [1.5, 0.8, 0.5], &xs);
        let result = fit_model(NonlinearModel::Exponential, &xs, &ys);
        assert!(result.termination.is_success(), "{}", result.termination);
        assert!(result.sum_squares < 1e-10);
        assert_relative_eq!(result.parameters[0], 1.5, epsilon = 1e-4);
        assert_relative_eq!(result.parameters[1], 0.8, epsilon = 1e-4);
        assert_relative_eq!(result.parameters[2], 0.5, epsilon = 1e-3);
    }

    #[test]
    fn test_exact_start_is_converged() {
        let xs = [1.0, 2.0, 3.0];
        let ys = sample(NonlinearModel::Power, [1.0, 1.0, 0.0], &xs);
        let result = fit_model(NonlinearModel::Power, &xs, &ys);
        assert_eq!(result.termination, TerminationReason::Converged);
        assert_eq!(result.evaluations, 1);
    }

    #[test]
    fn test_overflow_fails_softly() {
        let result = fit_model(NonlinearModel::Exponential, &[0.0, 800.0], &[1.0, 2.0]);
        assert!(!result.termination.is_success());
        assert!(matches!(result.termination, TerminationReason::NonFinite(_)));
        assert_eq!(result.sum_squares, f64::INFINITY);
    }

    #[test]
    fn test_budget_exhausted() {
        let xs: Vec<f64> = (0..7).map(|i| i as f64 * 0.5).collect();
        let ys = sample(NonlinearModel::Exponential, [1.5, 0.8, 0.5], &xs);
        let problem = CurveProblem {
            model: NonlinearModel::Exponential,
            xs: &xs,
            ys: &ys,
        };
        let config = LMConfig {
            max_evaluations: 6,
            ..LMConfig::default()
        };
        let result = levenberg_marquardt(&problem, DVector::from_vec(vec![1.0, 1.0, 0.0]), &config);
        assert_eq!(result.termination, TerminationReason::MaxEvaluationsReached);
        assert!(result.evaluations <= 6);
    }

    #[test]
    fn test_model_formulas() {
        let p = DVector::from_vec(vec![2.0, 1.0, 0.5]);
        assert_relative_eq!(NonlinearModel::Logistic.value(&p, 0.0), 1.0);
        assert_relative_eq!(NonlinearModel::Sinusoidal.value(&p, -1.0), 0.5);
        assert_relative_eq!(NonlinearModel::Power.value(&p, 3.0), 6.5);
        assert_eq!(NonlinearModel::Power.formula(), "a*x^b + c");
    }
}

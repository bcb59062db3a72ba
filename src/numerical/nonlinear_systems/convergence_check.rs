use crate::symbolic::expression_evaluator::{Expression, ExpressionEvaluator};
use log::info;

/// Sufficient condition for the fixed-point forms `x = phi1(x, y)`, `y = phi2(x, y)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvergenceReport {
    pub converges: bool,
    /// `(phi1, phi2)` when both equations could be solved explicitly
    pub phi: Option<(Expression, Expression)>,
    /// `(|d phi1/dx| + |d phi1/dy|, |d phi2/dx| + |d phi2/dy|)` at the guess
    pub norms: (f64, f64),
    pub log: Vec<String>,
}

/// Explicit branch of `equation = 0` for `var` whose value at the guess is finite and
/// nearest to `target`.
pub fn pick_branch<E: ExpressionEvaluator>(
    evaluator: &E,
    equation: &Expression,
    var: &str,
    guess: (f64, f64),
    target: f64,
) -> Option<Expression> {
    evaluator
        .solve_for(equation, var)
        .into_iter()
        .filter_map(|branch| {
            let value = evaluator.to_callable(&branch).at(guess.0, guess.1);
            value.is_finite().then(|| ((value - target).abs(), branch))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, branch)| branch)
}

fn sum_norm<E: ExpressionEvaluator>(evaluator: &E, phi: &Expression, guess: (f64, f64)) -> (f64, Expression, Expression) {
    let dx = evaluator.differentiate(phi, "x");
    let dy = evaluator.differentiate(phi, "y");
    let norm = evaluator.to_callable(&dx).at(guess.0, guess.1).abs()
        + evaluator.to_callable(&dy).at(guess.0, guess.1).abs();
    (norm, dx, dy)
}

/// `phi1` solves equation 1 for `x`, `phi2` solves equation 2 for `y`; the iteration
/// converges near the guess when both sum-norms of their gradients are below 1.
pub fn check_convergence<E: ExpressionEvaluator>(
    evaluator: &E,
    eq1: &Expression,
    eq2: &Expression,
    guess: (f64, f64),
) -> ConvergenceReport {
    let mut log = vec!["Iteration convergence check".to_string()];
    let phi1 = pick_branch(evaluator, eq1, "x", guess, guess.0);
    let phi2 = pick_branch(evaluator, eq2, "y", guess, guess.1);
    let (phi1, phi2) = match (phi1, phi2) {
        (Some(phi1), Some(phi2)) => (phi1, phi2),
        (phi1, _) => {
            let missing = if phi1.is_none() { "equation 1 for x" } else { "equation 2 for y" };
            log.push(format!("cannot solve {} explicitly", missing));
            log.push("convergence condition not met".to_string());
            info!("{}", log.join("\n"));
            return ConvergenceReport {
                converges: false,
                phi: None,
                norms: (f64::INFINITY, f64::INFINITY),
                log,
            };
        }
    };
    let (s1, d1x, d1y) = sum_norm(evaluator, &phi1, guess);
    let (s2, d2x, d2y) = sum_norm(evaluator, &phi2, guess);
    let converges = s1 < 1.0 && s2 < 1.0;
    log.push(format!("phi1(x, y) = {}", phi1));
    log.push(format!("phi2(x, y) = {}", phi2));
    log.push(format!("phi1'(x, y) = ({}, {})", d1x, d1y));
    log.push(format!("phi2'(x, y) = ({}, {})", d2x, d2y));
    log.push(format!("a = {}, b = {}", guess.0, guess.1));
    log.push(format!(
        "|phi1_x(a, b)| + |phi1_y(a, b)| = {} {} 1",
        s1,
        if s1 < 1.0 { "<" } else { ">=" }
    ));
    log.push(format!(
        "|phi2_x(a, b)| + |phi2_y(a, b)| = {} {} 1",
        s2,
        if s2 < 1.0 { "<" } else { ">=" }
    ));
    log.push(if converges {
        "convergence condition met".to_string()
    } else {
        "convergence condition not met".to_string()
    });
    info!("{}", log.join("\n"));
    ConvergenceReport {
        converges,
        phi: Some((phi1, phi2)),
        norms: (s1, s2),
        log,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::expression_evaluator::SymbolicEvaluator;
    use approx::assert_relative_eq;

    fn parse(text: &str) -> Expression {
        SymbolicEvaluator.parse(text).unwrap()
    }

    #[test]
    fn test_contracting_system() {
        let report = check_convergence(
            &SymbolicEvaluator,
            &parse("0.1*sin(y) + 0.2 - x"),
            &parse("0.2*cos(x) + 0.5 - y"),
            (0.0, 0.0),
        );
        assert!(report.converges);
        assert_relative_eq!(report.norms.0, 0.1, epsilon = 1e-12);
        assert_relative_eq!(report.norms.1, 0.0, epsilon = 1e-12);
        assert_eq!(report.log.last().unwrap(), "convergence condition met");
    }

    #[test]
    fn test_branch_nearest_to_guess() {
        let circle = parse("x^2 + y^2 - 4");
        let branch = pick_branch(&SymbolicEvaluator, &circle, "x", (1.5, 1.0), 1.5).unwrap();
        assert_relative_eq!(
            SymbolicEvaluator.to_callable(&branch).at(1.5, 1.0),
            3.0_f64.sqrt(),
            epsilon = 1e-12
        );
        let report = check_convergence(&SymbolicEvaluator, &circle, &parse("0.5*x - y + 0.3"), (1.5, 1.0));
        assert!(report.converges);
        assert_relative_eq!(report.norms.0, 1.0 / 3.0_f64.sqrt(), epsilon = 1e-9);
        assert_relative_eq!(report.norms.1, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_condition_not_met() {
        let report = check_convergence(&SymbolicEvaluator, &parse("x^2 + y^2 - 4"), &parse("x - y"), (1.5, 1.0));
        assert!(!report.converges);
        assert_relative_eq!(report.norms.1, 1.0, epsilon = 1e-12);

        let unsolvable = check_convergence(&SymbolicEvaluator, &parse("sin(x) + x - y"), &parse("x - y"), (0.0, 0.0));
        assert!(!unsolvable.converges);
        assert!(unsolvable.phi.is_none());
        assert_eq!(unsolvable.log.last().unwrap(), "convergence condition not met");
    }
}

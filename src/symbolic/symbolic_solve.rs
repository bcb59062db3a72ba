//! Solving `expr = 0` for one variable.
//!
//! Two strategies, tried in order:
//! - the variable occurs once: peel the operations around it one by one, moving their inverse
//!   to the other side (even integer powers branch into ±, trigonometric functions use the
//!   principal branch of the inverse);
//! - the expression is a polynomial of degree at most 2 in the variable (third derivative is
//!   zero and the second one does not depend on it): linear or quadratic formula.
//!
//! Anything else has no closed form here and gives an empty list.
use crate::symbolic::symbolic_engine::Expr;

impl Expr {
    /// All explicit solutions `var = g(other variables)` of `self = 0`, simplified.
    pub fn solve_for(&self, var: &str) -> Vec<Expr> {
        let solutions = match self.count_variable(var) {
            0 => vec![],
            1 => isolate(self, Expr::Const(0.0), var),
            _ => self.solve_polynomial(var),
        };
        solutions
            .into_iter()
            .map(|s| s.simplify())
            // constant branches like sqrt(-1) are not real solutions
            .filter(|s| {
                !s.all_arguments_are_variables().is_empty() || s.eval_expression(&[], &[]).is_finite()
            })
            .collect()
    }

    /// Linear or quadratic formula; empty when the degree is higher or the roots are complex.
    fn solve_polynomial(&self, var: &str) -> Vec<Expr> {
        let d1 = self.diff_simplified(var);
        let d2 = d1.diff_simplified(var);
        let d3 = d2.diff_simplified(var);
        if !d3.is_zero() || d2.contains_variable(var) {
            return vec![];
        }
        // self = a*v^2 + b*v + c
        let a = (d2 / Expr::Const(2.0)).simplify();
        let b = d1.set_variable(var, 0.0).simplify();
        let c = self.set_variable(var, 0.0).simplify();
        if a.is_zero() {
            if b.is_zero() {
                return vec![];
            }
            return vec![-c / b];
        }
        let discriminant =
            (b.clone().pow(Expr::Const(2.0)) - Expr::Const(4.0) * a.clone() * c).simplify();
        match discriminant.as_const() {
            Some(d) if d < 0.0 => vec![],
            Some(d) if d == 0.0 => vec![-b / (Expr::Const(2.0) * a)],
            _ => {
                let root = discriminant.sqrt();
                vec![
                    (-b.clone() + root.clone()) / (Expr::Const(2.0) * a.clone()),
                    (-b - root) / (Expr::Const(2.0) * a),
                ]
            }
        }
    }
}

/// Solves `lhs = rhs` where `var` occurs exactly once in `lhs`.
fn isolate(lhs: &Expr, rhs: Expr, var: &str) -> Vec<Expr> {
    match lhs {
        Expr::Var(name) if name == var => vec![rhs],
        Expr::Var(_) | Expr::Const(_) => vec![],
        Expr::Add(a, b) => {
            if a.contains_variable(var) {
                isolate(a, rhs - *b.clone(), var)
            } else {
                isolate(b, rhs - *a.clone(), var)
            }
        }
        Expr::Sub(a, b) => {
            if a.contains_variable(var) {
                isolate(a, rhs + *b.clone(), var)
            } else {
                isolate(b, *a.clone() - rhs, var)
            }
        }
        Expr::Mul(a, b) => {
            if a.contains_variable(var) {
                isolate(a, rhs / *b.clone(), var)
            } else {
                isolate(b, rhs / *a.clone(), var)
            }
        }
        Expr::Div(a, b) => {
            if a.contains_variable(var) {
                isolate(a, rhs * *b.clone(), var)
            } else {
                isolate(b, *a.clone() / rhs, var)
            }
        }
        Expr::Pow(base, exp) => {
            if base.contains_variable(var) {
                let root = rhs.pow(Expr::Const(1.0) / *exp.clone());
                match exp.as_const() {
                    Some(n) if n.fract() == 0.0 && (n as i64) % 2 == 0 => {
                        let mut both = isolate(base, root.clone(), var);
                        both.extend(isolate(base, -root, var));
                        both
                    }
                    _ => isolate(base, root, var),
                }
            } else {
                // base^u = rhs  =>  u = ln(rhs)/ln(base)
                isolate(exp, rhs.ln() / (**base).clone().ln(), var)
            }
        }
        Expr::Exp(u) => isolate(u, rhs.ln(), var),
        Expr::Ln(u) => isolate(u, rhs.exp(), var),
        Expr::sin(u) => isolate(u, Expr::arcsin(rhs.boxed()), var),
        Expr::cos(u) => isolate(u, Expr::arccos(rhs.boxed()), var),
        Expr::tg(u) => isolate(u, Expr::arctg(rhs.boxed()), var),
        Expr::ctg(u) => isolate(u, Expr::arcctg(rhs.boxed()), var),
        Expr::arcsin(u) => isolate(u, Expr::sin(rhs.boxed()), var),
        Expr::arccos(u) => isolate(u, Expr::cos(rhs.boxed()), var),
        Expr::arctg(u) => isolate(u, Expr::tg(rhs.boxed()), var),
        Expr::arcctg(u) => isolate(u, Expr::ctg(rhs.boxed()), var),
    }
}

//! # Simplification
//!
//! Bottom-up rewriting until nothing changes:
//! 1. **Constant Folding**: operations on constants are evaluated
//! 2. **Algebraic Identities**: x + 0 = x, x * 1 = x, x * 0 = 0, x ^ 1 = x, x ^ 0 = 1, 0 / x = 0
//! 3. **Sign handling**: -1 * (-1 * x) = x, a - (-c) = a + c
//! 4. **Constant collection**: c1 * (c2 * x) = (c1*c2) * x
//!
//! The rewrite never changes the value of the expression where it is defined, so it is safe to
//! apply to derivatives before they are compiled into closures.

use crate::symbolic::symbolic_engine::{Expr, apply_pow};
use std::f64::consts::PI;

const MAX_PASSES: usize = 16;

impl Expr {
    /// Simplifies until a fixed point (or `MAX_PASSES` rounds).
    pub fn simplify(&self) -> Expr {
        let mut current = self.clone();
        for _ in 0..MAX_PASSES {
            let next = current.simplify_once();
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn simplify_once(&self) -> Expr {
        let simplified = self.map_children(|child| child.simplify_once());
        match simplified {
            Expr::Add(lhs, rhs) => match (*lhs, *rhs) {
                (Expr::Const(a), Expr::Const(b)) => Expr::Const(a + b),
                (Expr::Const(a), other) if a == 0.0 => other,
                (other, Expr::Const(b)) if b == 0.0 => other,
                // a + (-1 * b) = a - b
                (lhs, Expr::Mul(c, rest)) if c.as_const() == Some(-1.0) => {
                    Expr::Sub(lhs.boxed(), rest)
                }
                (lhs, rhs) => Expr::Add(lhs.boxed(), rhs.boxed()),
            },
            Expr::Sub(lhs, rhs) => match (*lhs, *rhs) {
                (Expr::Const(a), Expr::Const(b)) => Expr::Const(a - b),
                (other, Expr::Const(b)) if b == 0.0 => other,
                (Expr::Const(a), Expr::Mul(c, rest)) if a == 0.0 && c.as_const() == Some(-1.0) => *rest,
                (Expr::Const(a), other) if a == 0.0 => -other,
                (lhs, Expr::Const(b)) if b < 0.0 => Expr::Add(lhs.boxed(), Expr::Const(-b).boxed()),
                (lhs, rhs) if lhs == rhs => Expr::Const(0.0),
                (lhs, rhs) => Expr::Sub(lhs.boxed(), rhs.boxed()),
            },
            Expr::Mul(lhs, rhs) => match (*lhs, *rhs) {
                (Expr::Const(a), Expr::Const(b)) => Expr::Const(a * b),
                (Expr::Const(a), _) | (_, Expr::Const(a)) if a == 0.0 => Expr::Const(0.0),
                (Expr::Const(a), other) if a == 1.0 => other,
                (other, Expr::Const(b)) if b == 1.0 => other,
                // keep constants on the left
                (other, Expr::Const(b)) => Expr::Mul(Expr::Const(b).boxed(), other.boxed()),
                (Expr::Const(a), Expr::Mul(inner, rest)) if inner.as_const().is_some() => {
                    let b = inner.as_const().unwrap_or(1.0);
                    Expr::Mul(Expr::Const(a * b).boxed(), rest)
                }
                (Expr::Const(a), Expr::Div(num, den)) if num.as_const().is_some() => {
                    let b = num.as_const().unwrap_or(1.0);
                    Expr::Div(Expr::Const(a * b).boxed(), den)
                }
                (lhs, rhs) => Expr::Mul(lhs.boxed(), rhs.boxed()),
            },
            Expr::Div(lhs, rhs) => match (*lhs, *rhs) {
                (Expr::Const(a), Expr::Const(b)) if b != 0.0 => Expr::Const(a / b),
                (Expr::Const(a), other) if a == 0.0 && !other.is_zero() => Expr::Const(0.0),
                (other, Expr::Const(b)) if b == 1.0 => other,
                (other, Expr::Const(b)) if b != 0.0 => {
                    Expr::Mul(Expr::Const(1.0 / b).boxed(), other.boxed())
                }
                (lhs, rhs) => Expr::Div(lhs.boxed(), rhs.boxed()),
            },
            Expr::Pow(base, exp) => match (*base, *exp) {
                (Expr::Const(a), Expr::Const(b)) if apply_pow(a, b).is_finite() => {
                    Expr::Const(apply_pow(a, b))
                }
                (_, Expr::Const(b)) if b == 0.0 => Expr::Const(1.0),
                (other, Expr::Const(b)) if b == 1.0 => other,
                (Expr::Const(a), _) if a == 1.0 => Expr::Const(1.0),
                // (u^a)^b = u^(a*b) for integer a, b
                (Expr::Pow(inner, a), Expr::Const(b))
                    if a.as_const().is_some_and(|a| a.fract() == 0.0) && b.fract() == 0.0 =>
                {
                    let a = a.as_const().unwrap_or(1.0);
                    Expr::Pow(inner, Expr::Const(a * b).boxed())
                }
                (base, exp) => Expr::Pow(base.boxed(), exp.boxed()),
            },
            Expr::Exp(arg) => fold_unary(*arg, Expr::Exp, f64::exp),
            Expr::Ln(arg) => match *arg {
                Expr::Exp(inner) => *inner,
                other => fold_unary(other, Expr::Ln, f64::ln),
            },
            Expr::sin(arg) => fold_unary(*arg, Expr::sin, f64::sin),
            Expr::cos(arg) => fold_unary(*arg, Expr::cos, f64::cos),
            Expr::tg(arg) => fold_unary(*arg, Expr::tg, f64::tan),
            Expr::ctg(arg) => fold_unary(*arg, Expr::ctg, |v| 1.0 / v.tan()),
            Expr::arcsin(arg) => fold_unary(*arg, Expr::arcsin, f64::asin),
            Expr::arccos(arg) => fold_unary(*arg, Expr::arccos, f64::acos),
            Expr::arctg(arg) => fold_unary(*arg, Expr::arctg, f64::atan),
            Expr::arcctg(arg) => fold_unary(*arg, Expr::arcctg, |v| PI / 2.0 - v.atan()),
            other => other,
        }
    }
}

/// Folds a function of a constant when the result is finite, rebuilds the node otherwise.
fn fold_unary(arg: Expr, node: fn(Box<Expr>) -> Expr, f: fn(f64) -> f64) -> Expr {
    match arg {
        Expr::Const(value) if f(value).is_finite() => Expr::Const(f(value)),
        other => node(other.boxed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Expr {
        Expr::parse_expression(text).unwrap()
    }

    #[test]
    fn test_identities() {
        assert_eq!(parse("x + 0").simplify(), Expr::var("x"));
        assert_eq!(parse("0 + x").simplify(), Expr::var("x"));
        assert_eq!(parse("x * 1").simplify(), Expr::var("x"));
        assert_eq!(parse("0 * (x + y)").simplify(), Expr::Const(0.0));
        assert_eq!(parse("x ^ 1").simplify(), Expr::var("x"));
        assert_eq!(parse("x ^ 0").simplify(), Expr::Const(1.0));
        assert_eq!(parse("x - x").simplify(), Expr::Const(0.0));
        assert_eq!(parse("ln(exp(x))").simplify(), Expr::var("x"));
    }

    #[test]
    fn test_constant_folding() {
        assert_eq!(parse("2 * 3 + 4").simplify(), Expr::Const(10.0));
        assert_eq!(parse("2 ^ 10").simplify(), Expr::Const(1024.0));
        assert_eq!(parse("2 * (3 * x)").simplify(), parse("6 * x"));
    }

    #[test]
    fn test_value_preserved() {
        let expr = parse("(x^2 + 0*y) * 1 - (-3) + 2*(4*x)/2");
        let simplified = expr.simplify();
        for x in [-2.0, 0.5, 3.0] {
            assert_eq!(
                expr.eval_expression(&["x", "y"], &[x, 1.0]),
                simplified.eval_expression(&["x", "y"], &[x, 1.0])
            );
        }
    }

    #[test]
    fn test_division_by_zero_is_not_folded() {
        let expr = parse("1 / 0").simplify();
        assert!(matches!(expr, Expr::Div(_, _)));
    }
}

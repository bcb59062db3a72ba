//! # Symbolic Engine Module
//!
//! Core expression tree used by every solver that accepts a function as text.
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Variables**: `Var(String)` - symbolic variables, in this crate only "x" and "y" survive validation
//! - **Constants**: `Const(f64)` - numerical constants, `pi` and `e` are parsed into constants
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow` - basic arithmetic
//! - **Functions**: `Exp`, `Ln`, `sin`, `cos`, `tg`, `ctg` and the inverse trigonometric functions
//!
//! ### Key Methods
//! - `parse_expression(text)` - text into tree (see `parse_expr`)
//! - `diff(var)` - analytic derivative (see `symbolic_derivatives`)
//! - `simplify()` - constant folding (see `symbolic_simplify`)
//! - `lambdify(vars)` - compiled closure (see `symbolic_lambdify`)
//! - `eval_expression(vars, values)` - direct recursive evaluation
//! - `set_variable`, `substitute_variable`, `contains_variable`, `all_arguments_are_variables`
//!
//! Trigonometric names follow mathematical notation: `tg`, `ctg`, `arctg`, `arcctg`.

#![allow(non_camel_case_types)]

use std::f64::consts::PI;
use std::fmt;

/// Expression tree. Boxed children allow arbitrarily deep nesting.
///
/// # Examples
/// ```rust, ignore
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::Const(2.0)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name
    Var(String),
    /// Numerical constant value
    Const(f64),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    /// base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    Exp(Box<Expr>),
    /// natural logarithm
    Ln(Box<Expr>),
    sin(Box<Expr>),
    cos(Box<Expr>),
    tg(Box<Expr>),
    ctg(Box<Expr>),
    arcsin(Box<Expr>),
    arccos(Box<Expr>),
    arctg(Box<Expr>),
    arcctg(Box<Expr>),
}

/// Pretty printing with the parser's own syntax, so the output can be parsed back.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => {
                if *val < 0.0 {
                    write!(f, "({})", val)
                } else {
                    write!(f, "{}", val)
                }
            }
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "{} * {}", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "{} / ({})", lhs, rhs),
            Expr::Pow(base, exp) => write!(f, "({})^({})", base, exp),
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "ln({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
            Expr::tg(expr) => write!(f, "tg({})", expr),
            Expr::ctg(expr) => write!(f, "ctg({})", expr),
            Expr::arcsin(expr) => write!(f, "arcsin({})", expr),
            Expr::arccos(expr) => write!(f, "arccos({})", expr),
            Expr::arctg(expr) => write!(f, "arctg({})", expr),
            Expr::arcctg(expr) => write!(f, "arcctg({})", expr),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl Expr {
    pub fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn exp(self) -> Expr {
        Expr::Exp(self.boxed())
    }

    pub fn ln(self) -> Expr {
        Expr::Ln(self.boxed())
    }

    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    pub fn sqrt(self) -> Expr {
        Expr::Pow(self.boxed(), Expr::Const(0.5).boxed())
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 0.0)
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 1.0)
    }

    pub fn as_const(&self) -> Option<f64> {
        match self {
            Expr::Const(val) => Some(*val),
            _ => None,
        }
    }

    /// Direct children of a node, empty for leaves.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Var(_) | Expr::Const(_) => vec![],
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => vec![lhs.as_ref(), rhs.as_ref()],
            Expr::Exp(expr)
            | Expr::Ln(expr)
            | Expr::sin(expr)
            | Expr::cos(expr)
            | Expr::tg(expr)
            | Expr::ctg(expr)
            | Expr::arcsin(expr)
            | Expr::arccos(expr)
            | Expr::arctg(expr)
            | Expr::arcctg(expr) => vec![expr.as_ref()],
        }
    }

    /// Rebuilds a node of the same kind with every child passed through `f`.
    pub fn map_children<F: Fn(&Expr) -> Expr>(&self, f: F) -> Expr {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => Expr::Add(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Sub(lhs, rhs) => Expr::Sub(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Mul(lhs, rhs) => Expr::Mul(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Div(lhs, rhs) => Expr::Div(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Pow(base, exp) => Expr::Pow(f(base).boxed(), f(exp).boxed()),
            Expr::Exp(expr) => Expr::Exp(f(expr).boxed()),
            Expr::Ln(expr) => Expr::Ln(f(expr).boxed()),
            Expr::sin(expr) => Expr::sin(f(expr).boxed()),
            Expr::cos(expr) => Expr::cos(f(expr).boxed()),
            Expr::tg(expr) => Expr::tg(f(expr).boxed()),
            Expr::ctg(expr) => Expr::ctg(f(expr).boxed()),
            Expr::arcsin(expr) => Expr::arcsin(f(expr).boxed()),
            Expr::arccos(expr) => Expr::arccos(f(expr).boxed()),
            Expr::arctg(expr) => Expr::arctg(f(expr).boxed()),
            Expr::arcctg(expr) => Expr::arcctg(f(expr).boxed()),
        }
    }

    /// Replaces every occurrence of `var` with the given expression.
    ///
    /// # Arguments
    /// * `var` - variable name to replace
    /// * `expr` - replacement expression
    pub fn substitute_variable(&self, var: &str, expr: &Expr) -> Expr {
        match self {
            Expr::Var(name) if name == var => expr.clone(),
            _ => self.map_children(|child| child.substitute_variable(var, expr)),
        }
    }

    /// Replaces `var` with a numeric constant.
    pub fn set_variable(&self, var: &str, value: f64) -> Expr {
        self.substitute_variable(var, &Expr::Const(value))
    }

    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Const(_) => false,
            _ => self
                .children()
                .iter()
                .any(|child| child.contains_variable(var_name)),
        }
    }

    /// Number of leaves naming `var`.
    pub fn count_variable(&self, var_name: &str) -> usize {
        match self {
            Expr::Var(name) => usize::from(name == var_name),
            Expr::Const(_) => 0,
            _ => self
                .children()
                .iter()
                .map(|child| child.count_variable(var_name))
                .sum(),
        }
    }

    /// Sorted, deduplicated list of variable names in the expression.
    pub fn all_arguments_are_variables(&self) -> Vec<String> {
        let mut vars = Vec::new();
        self.collect_variables(&mut vars);
        vars.sort();
        vars.dedup();
        vars
    }

    fn collect_variables(&self, acc: &mut Vec<String>) {
        match self {
            Expr::Var(name) => acc.push(name.clone()),
            Expr::Const(_) => {}
            _ => {
                for child in self.children() {
                    child.collect_variables(acc);
                }
            }
        }
    }

    /// Evaluates the tree without building a closure. Unbound variables evaluate to NaN.
    ///
    /// # Arguments
    /// * `vars` - variable names
    /// * `values` - values in the same order as `vars`
    pub fn eval_expression(&self, vars: &[&str], values: &[f64]) -> f64 {
        match self {
            Expr::Var(name) => vars
                .iter()
                .position(|v| v == name)
                .and_then(|i| values.get(i).copied())
                .unwrap_or(f64::NAN),
            Expr::Const(val) => *val,
            Expr::Add(lhs, rhs) => lhs.eval_expression(vars, values) + rhs.eval_expression(vars, values),
            Expr::Sub(lhs, rhs) => lhs.eval_expression(vars, values) - rhs.eval_expression(vars, values),
            Expr::Mul(lhs, rhs) => lhs.eval_expression(vars, values) * rhs.eval_expression(vars, values),
            Expr::Div(lhs, rhs) => lhs.eval_expression(vars, values) / rhs.eval_expression(vars, values),
            Expr::Pow(base, exp) => {
                apply_pow(base.eval_expression(vars, values), exp.eval_expression(vars, values))
            }
            Expr::Exp(expr) => expr.eval_expression(vars, values).exp(),
            Expr::Ln(expr) => expr.eval_expression(vars, values).ln(),
            Expr::sin(expr) => expr.eval_expression(vars, values).sin(),
            Expr::cos(expr) => expr.eval_expression(vars, values).cos(),
            Expr::tg(expr) => expr.eval_expression(vars, values).tan(),
            Expr::ctg(expr) => 1.0 / expr.eval_expression(vars, values).tan(),
            Expr::arcsin(expr) => expr.eval_expression(vars, values).asin(),
            Expr::arccos(expr) => expr.eval_expression(vars, values).acos(),
            Expr::arctg(expr) => expr.eval_expression(vars, values).atan(),
            Expr::arcctg(expr) => PI / 2.0 - expr.eval_expression(vars, values).atan(),
        }
    }
}

/// `powf` with integer exponents routed through `powi`, so negative bases raised to whole
/// powers stay real: (-2)^3 = -8 instead of NaN.
pub fn apply_pow(base: f64, exp: f64) -> f64 {
    if exp.fract() == 0.0 && exp.abs() <= i32::MAX as f64 {
        base.powi(exp as i32)
    } else {
        base.powf(exp)
    }
}

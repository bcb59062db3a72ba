/// Parser of function text into `Expr`.
///
/// Grammar (whitespace allowed between tokens):
/// ```text
/// sum     := product (('+' | '-') product)*
/// product := unary (('*' | '/') unary)*
/// unary   := ('+' | '-') unary | power
/// power   := atom (('**' | '^') unary)?        right associative, binds tighter than unary minus
/// atom    := number | '(' sum ')' | name '(' sum ')' | name
/// ```
/// `pi` and `e` are constants, every other bare name is a variable. Validation of variable names
/// happens one level up, in `expression_evaluator`.
use crate::error::{CompMathError, CompMathResult};
use crate::symbolic::symbolic_engine::Expr;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, multispace0, one_of},
    combinator::{opt, recognize},
    error::{Error, ErrorKind},
    multi::many0,
    sequence::pair,
};
use regex::Regex;
use std::f64::consts::{E, PI};
use std::sync::LazyLock;

const ALLOWED_CHARACTERS: &str = r"^[0-9A-Za-z_+\-*/^().\s]*$";

static ALLOWED: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| Regex::new(ALLOWED_CHARACTERS));

fn parse_identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

fn parse_number(input: &str) -> IResult<&str, Expr> {
    let mantissa = alt((
        recognize((digit1, opt((char('.'), digit0)))),
        recognize((char('.'), digit1)),
    ));
    let exponent = opt(recognize((one_of("eE"), opt(one_of("+-")), digit1)));
    let (rest, text) = recognize((mantissa, exponent)).parse(input)?;
    match text.parse::<f64>() {
        Ok(value) => Ok((rest, Expr::Const(value))),
        Err(_) => Err(nom::Err::Error(Error::new(input, ErrorKind::Float))),
    }
}

fn function_by_name(name: &str, arg: Expr) -> Option<Expr> {
    let arg = Box::new(arg);
    let func = match name {
        "sin" => Expr::sin(arg),
        "cos" => Expr::cos(arg),
        "tan" | "tg" => Expr::tg(arg),
        "cot" | "ctg" => Expr::ctg(arg),
        "asin" | "arcsin" => Expr::arcsin(arg),
        "acos" | "arccos" => Expr::arccos(arg),
        "atan" | "arctan" | "arctg" => Expr::arctg(arg),
        "acot" | "arccot" | "arcctg" => Expr::arcctg(arg),
        "exp" => Expr::Exp(arg),
        "ln" | "log" => Expr::Ln(arg),
        "sqrt" => Expr::Pow(arg, Box::new(Expr::Const(0.5))),
        _ => return None,
    };
    Some(func)
}

fn parse_parenthesized(input: &str) -> IResult<&str, Expr> {
    let (input, _) = char('(').parse(input)?;
    let (input, inner) = parse_sum(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = char(')').parse(input)?;
    Ok((input, inner))
}

fn parse_atom(input: &str) -> IResult<&str, Expr> {
    let (input, _) = multispace0(input)?;
    if input.starts_with('(') {
        return parse_parenthesized(input);
    }
    if let Ok(result) = parse_number(input) {
        return Ok(result);
    }
    let (rest, name) = parse_identifier(input)?;
    let (after_ws, _) = multispace0(rest)?;
    if after_ws.starts_with('(') {
        let (rest, arg) = parse_parenthesized(after_ws)?;
        // unknown names in call position abort the whole parse
        let func = function_by_name(name, arg)
            .ok_or_else(|| nom::Err::Failure(Error::new(input, ErrorKind::Verify)))?;
        return Ok((rest, func));
    }
    let leaf = match name {
        "pi" => Expr::Const(PI),
        "e" => Expr::Const(E),
        _ => Expr::Var(name.to_string()),
    };
    Ok((rest, leaf))
}

fn parse_power(input: &str) -> IResult<&str, Expr> {
    let (input, base) = parse_atom(input)?;
    let (after_ws, _) = multispace0(input)?;
    let op: IResult<&str, &str> = alt((tag("**"), tag("^"))).parse(after_ws);
    match op {
        Ok((rest, _)) => {
            let (rest, exponent) = parse_unary(rest)?;
            Ok((rest, Expr::Pow(Box::new(base), Box::new(exponent))))
        }
        Err(_) => Ok((input, base)),
    }
}

fn parse_unary(input: &str) -> IResult<&str, Expr> {
    let (input, _) = multispace0(input)?;
    let sign: IResult<&str, char> = one_of("+-").parse(input);
    match sign {
        Ok((rest, '-')) => {
            let (rest, operand) = parse_unary(rest)?;
            let negated = match operand {
                Expr::Const(value) => Expr::Const(-value),
                other => -other,
            };
            Ok((rest, negated))
        }
        Ok((rest, _)) => parse_unary(rest),
        Err(_) => parse_power(input),
    }
}

fn parse_product(input: &str) -> IResult<&str, Expr> {
    let (mut input, mut acc) = parse_unary(input)?;
    loop {
        let (after_ws, _) = multispace0(input)?;
        let op: IResult<&str, char> = one_of("*/").parse(after_ws);
        match op {
            Ok((rest, op)) => {
                let (rest, rhs) = parse_unary(rest)?;
                acc = if op == '*' { acc * rhs } else { acc / rhs };
                input = rest;
            }
            Err(_) => return Ok((input, acc)),
        }
    }
}

fn parse_sum(input: &str) -> IResult<&str, Expr> {
    let (mut input, mut acc) = parse_product(input)?;
    loop {
        let (after_ws, _) = multispace0(input)?;
        let op: IResult<&str, char> = one_of("+-").parse(after_ws);
        match op {
            Ok((rest, op)) => {
                let (rest, rhs) = parse_product(rest)?;
                acc = if op == '+' { acc + rhs } else { acc - rhs };
                input = rest;
            }
            Err(_) => return Ok((input, acc)),
        }
    }
}

/// Parses the whole input or reports what went wrong.
///
/// # Arguments
/// * `input` - function text, both `**` and `^` denote powers
///
/// # Returns
/// `Expr` tree or a human-readable message
pub fn parse_expression_func(input: &str) -> Result<Expr, String> {
    if input.trim().is_empty() {
        return Err("empty expression".to_string());
    }
    let allowed = ALLOWED.as_ref().map_err(|e| e.to_string())?;
    if !allowed.is_match(input) {
        let bad: String = input
            .chars()
            .filter(|c| !allowed.is_match(&c.to_string()))
            .collect();
        return Err(format!("unsupported characters '{}' in '{}'", bad, input));
    }
    match parse_sum(input) {
        Ok((rest, expr)) => {
            if rest.trim().is_empty() {
                Ok(expr)
            } else {
                Err(format!("unexpected input '{}' in '{}'", rest.trim(), input))
            }
        }
        Err(nom::Err::Failure(e)) if e.code == ErrorKind::Verify => {
            let name = parse_identifier(e.input)
                .map(|(_, name)| name)
                .unwrap_or(e.input);
            Err(format!("unknown function '{}'", name))
        }
        Err(_) => Err(format!("cannot parse '{}'", input)),
    }
}

impl Expr {
    /// Text into expression tree; errors are wrapped into `CompMathError::InvalidExpression`.
    pub fn parse_expression(input: &str) -> CompMathResult<Expr> {
        parse_expression_func(input).map_err(CompMathError::InvalidExpression)
    }
}

//! turns a String expression into a symbolic expression
//!
//! Grammar (loosest binding first):
//! ```text
//!  expression := term (('+' | '-') term)*
//!  term       := unary (('*' | '/') unary | power)*      power after power = implicit product, "2x"
//!  unary      := ('-' | '+') unary | power
//!  power      := atom ('^' unary)?                        right associative
//!  atom       := number | name '(' expression ')' | name | '(' expression ')'
//! ```
//! Names `pi` and `e` are constants, any other bare name is a variable.
//!
//!# Example
//! ```
//! use MatchaBerryCafe::symbolic::parse_expr::parse_expression_func;
//! let parsed = parse_expression_func("x^2 - y^2").unwrap();
//! assert_eq!(parsed.to_string(), "x^2 - y^2");
//! ```
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_errors::ComputationError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_while,
    character::complete::{char, digit0, digit1, multispace0, one_of, satisfy},
    combinator::{all_consuming, cut, map, map_res, opt, recognize},
    multi::fold_many0,
    sequence::{delimited, pair, preceded, terminated},
};
use std::f64::consts::{E, PI};

// the error of the innermost failing parser keeps the remaining input, which is where we report
type PResult<'a, T> = IResult<&'a str, T>;

/// strips whitespace around a token
fn ws<'a, O, P>(inner: P) -> impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>
where
    P: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

fn number(input: &str) -> PResult<'_, f64> {
    let exponent = (one_of("eE"), opt(one_of("+-")), digit1);
    let with_int = recognize((digit1, opt((char('.'), digit0)), opt(exponent)));
    let frac_only = recognize((char('.'), digit1));
    map_res(alt((with_int, frac_only)), |s: &str| s.parse::<f64>()).parse(input)
}

fn name(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))
    .parse(input)
}

fn function_node(fname: &str, arg: Expr) -> Option<Expr> {
    let arg = Box::new(arg);
    let node = match fname {
        "exp" => Expr::Exp(arg),
        "ln" | "log" => Expr::Ln(arg),
        "sqrt" => Expr::Pow(arg, Box::new(Expr::Const(0.5))),
        "sin" => Expr::sin(arg),
        "cos" => Expr::cos(arg),
        "tan" | "tg" => Expr::tg(arg),
        "cot" | "ctg" => Expr::ctg(arg),
        "asin" | "arcsin" => Expr::arcsin(arg),
        "acos" | "arccos" => Expr::arccos(arg),
        "atan" | "arctan" | "arctg" => Expr::arctg(arg),
        "acot" | "arccot" | "arcctg" => Expr::arcctg(arg),
        _ => return None,
    };
    Some(node)
}

fn named_atom(input: &str) -> PResult<'_, Expr> {
    let (rest, ident) = name(input)?;
    // a bracket right after the name makes it a call, with no way back to a bare name
    if let Ok((after_open, _)) = ws(char('(')).parse(rest) {
        let (after_arg, arg) = cut(terminated(expression, ws(char(')')))).parse(after_open)?;
        return match function_node(ident, arg) {
            Some(node) => Ok((after_arg, node)),
            None => Err(nom::Err::Failure(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Verify,
            ))),
        };
    }
    let node = match ident {
        "pi" => Expr::Const(PI),
        "e" => Expr::Const(E),
        _ => Expr::Var(ident.to_string()),
    };
    Ok((rest, node))
}

fn atom(input: &str) -> PResult<'_, Expr> {
    ws(alt((
        map(number, Expr::Const),
        named_atom,
        delimited(char('('), expression, ws(char(')'))),
    )))
    .parse(input)
}

fn power(input: &str) -> PResult<'_, Expr> {
    let (rest, base) = atom(input)?;
    let (rest, exponent) = opt(preceded(ws(char('^')), unary)).parse(rest)?;
    match exponent {
        Some(exponent) => Ok((rest, Expr::Pow(Box::new(base), Box::new(exponent)))),
        None => Ok((rest, base)),
    }
}

fn unary(input: &str) -> PResult<'_, Expr> {
    alt((
        map(preceded(ws(char('-')), unary), |inner| match inner {
            Expr::Const(val) => Expr::Const(-val),
            other => -other,
        }),
        preceded(ws(char('+')), unary),
        power,
    ))
    .parse(input)
}

fn term(input: &str) -> PResult<'_, Expr> {
    let (rest, first) = unary(input)?;
    fold_many0(
        alt((pair(ws(one_of("*/")), unary), map(power, |factor| ('*', factor)))),
        move || first.clone(),
        |acc, (op, rhs)| match op {
            '*' => Expr::Mul(Box::new(acc), Box::new(rhs)),
            _ => Expr::Div(Box::new(acc), Box::new(rhs)),
        },
    )
    .parse(rest)
}

fn expression(input: &str) -> PResult<'_, Expr> {
    let (rest, first) = term(input)?;
    fold_many0(
        pair(ws(one_of("+-")), term),
        move || first.clone(),
        |acc, (op, rhs)| match op {
            '+' => Expr::Add(Box::new(acc), Box::new(rhs)),
            _ => Expr::Sub(Box::new(acc), Box::new(rhs)),
        },
    )
    .parse(rest)
}

/// Parses the whole input into an expression tree; trailing garbage is an error.
pub fn parse_expression_func(input: &str) -> Result<Expr, ComputationError> {
    if input.trim().is_empty() {
        return Err(ComputationError::EmptyExpression);
    }
    match all_consuming(expression).parse(input) {
        Ok((_, expr)) => Ok(expr),
        Err(nom::Err::Failure(err)) if err.code == nom::error::ErrorKind::Verify => {
            let fname = name(err.input).map(|(_, n)| n).unwrap_or(err.input);
            Err(ComputationError::UnknownFunction(fname.to_string()))
        }
        Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => Err(
            ComputationError::parse_error(input, err.input, "unexpected symbol"),
        ),
        Err(nom::Err::Incomplete(_)) => Err(ComputationError::parse_error(
            input,
            "",
            "unexpected end of input",
        )),
    }
}

impl Expr {
    /// Parses a mathematical expression from string representation.
    pub fn parse_expression(input: &str) -> Result<Expr, ComputationError> {
        parse_expression_func(input)
    }
}

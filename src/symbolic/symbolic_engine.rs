//! # Symbolic Engine Module
//!
//! Core expression tree for functions of two (or more) variables, as typed on the
//! cafe workbench: `x^2 - y^2`, `sin(x)*exp(y)`, `ln(x^2 + y^2)`.
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Variables**: `Var(String)` - symbolic variables like "x", "y"
//! - **Constants**: `Const(f64)` - numerical constants
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow` - basic arithmetic
//! - **Functions**: `Exp`, `Ln`, `sin`, `cos`, `tg`, `ctg` and the inverse trigonometric functions
//!
//! ### Key Methods
//! - `all_arguments_are_variables()` - sorted list of the variables in the tree
//! - `Display` - compact infix notation that the parser reads back (`2*x`, `-2*y`, `x^2 - y^2`)
//!
//! Function nodes keep their `tg`/`ctg`/`arctg`/`arcctg` names but print in the short
//! form: `tan`, `cot`, `asin`, `acos`, `atan`, `acot`. The parser accepts both spellings.
//!
//! Differentiation and evaluation live in `symbolic_engine_derivatives`, simplification in
//! `symbolic_simplify`, parsing in `parse_expr`.

#![allow(non_camel_case_types)]

use std::collections::BTreeSet;
use std::fmt;

/// Core symbolic expression enum representing mathematical expressions as an abstract syntax tree.
///
/// # Examples
/// ```rust, ignore
/// use symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::Const(2.0)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name (e.g., "x", "y")
    Var(String),
    /// Numerical constant value
    Const(f64),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Exponential function: e^x
    Exp(Box<Expr>),
    /// Natural logarithm: ln(x)
    Ln(Box<Expr>),
    sin(Box<Expr>),
    cos(Box<Expr>),
    /// Tangent, printed as `tan`
    tg(Box<Expr>),
    /// Cotangent, printed as `cot`
    ctg(Box<Expr>),
    arcsin(Box<Expr>),
    arccos(Box<Expr>),
    arctg(Box<Expr>),
    arcctg(Box<Expr>),
}

// binding strength used by the printer
const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_NEG: u8 = 3;
const PREC_POW: u8 = 4;
const PREC_ATOM: u8 = 5;

impl Expr {
    fn precedence(&self) -> u8 {
        match self {
            Expr::Const(val) if *val < 0.0 => PREC_NEG,
            Expr::Var(_) | Expr::Const(_) => PREC_ATOM,
            Expr::Add(_, _) | Expr::Sub(_, _) => PREC_ADD,
            Expr::Mul(lhs, _) if **lhs == Expr::Const(-1.0) => PREC_NEG,
            Expr::Mul(_, _) | Expr::Div(_, _) => PREC_MUL,
            Expr::Pow(_, _) => PREC_POW,
            _ => PREC_ATOM,
        }
    }

    /// Name of the function node as the parser and printer spell it.
    pub fn function_name(&self) -> Option<&'static str> {
        match self {
            Expr::Exp(_) => Some("exp"),
            Expr::Ln(_) => Some("ln"),
            Expr::sin(_) => Some("sin"),
            Expr::cos(_) => Some("cos"),
            Expr::tg(_) => Some("tan"),
            Expr::ctg(_) => Some("cot"),
            Expr::arcsin(_) => Some("asin"),
            Expr::arccos(_) => Some("acos"),
            Expr::arctg(_) => Some("atan"),
            Expr::arcctg(_) => Some("acot"),
            _ => None,
        }
    }

    /// Argument of a one-argument function node.
    pub fn function_argument(&self) -> Option<&Expr> {
        match self {
            Expr::Exp(inner)
            | Expr::Ln(inner)
            | Expr::sin(inner)
            | Expr::cos(inner)
            | Expr::tg(inner)
            | Expr::ctg(inner)
            | Expr::arcsin(inner)
            | Expr::arccos(inner)
            | Expr::arctg(inner)
            | Expr::arcctg(inner) => Some(inner),
            _ => None,
        }
    }

    /// Rebuilds a function node of the same kind around a new argument.
    /// Non-function nodes are returned unchanged.
    pub fn with_function_argument(&self, arg: Expr) -> Expr {
        let arg = Box::new(arg);
        match self {
            Expr::Exp(_) => Expr::Exp(arg),
            Expr::Ln(_) => Expr::Ln(arg),
            Expr::sin(_) => Expr::sin(arg),
            Expr::cos(_) => Expr::cos(arg),
            Expr::tg(_) => Expr::tg(arg),
            Expr::ctg(_) => Expr::ctg(arg),
            Expr::arcsin(_) => Expr::arcsin(arg),
            Expr::arccos(_) => Expr::arccos(arg),
            Expr::arctg(_) => Expr::arctg(arg),
            Expr::arcctg(_) => Expr::arcctg(arg),
            _ => self.clone(),
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter, parent: u8, tight: bool) -> fmt::Result {
        // `tight` operands also need brackets at equal precedence (right side of - and /, base of ^)
        let own = self.precedence();
        if own < parent || (tight && own == parent) {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

/// Compact infix notation with the minimum of brackets.
///
/// `x^2 - y^2` differentiated by x prints as `2*x`, by y as `-2*y`. The output is
/// always accepted back by `Expr::parse_expression`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => {
                lhs.fmt_operand(f, PREC_ADD, false)?;
                write!(f, " + ")?;
                rhs.fmt_operand(f, PREC_ADD, false)
            }
            Expr::Sub(lhs, rhs) => {
                lhs.fmt_operand(f, PREC_ADD, false)?;
                write!(f, " - ")?;
                rhs.fmt_operand(f, PREC_ADD, true)
            }
            Expr::Mul(lhs, rhs) if **lhs == Expr::Const(-1.0) => {
                write!(f, "-")?;
                rhs.fmt_operand(f, PREC_NEG, false)
            }
            Expr::Mul(lhs, rhs) => {
                lhs.fmt_operand(f, PREC_MUL, false)?;
                write!(f, "*")?;
                rhs.fmt_operand(f, PREC_MUL, false)
            }
            Expr::Div(lhs, rhs) => {
                lhs.fmt_operand(f, PREC_MUL, false)?;
                write!(f, "/")?;
                rhs.fmt_operand(f, PREC_MUL, true)
            }
            Expr::Pow(base, exp) => {
                base.fmt_operand(f, PREC_POW, true)?;
                write!(f, "^")?;
                exp.fmt_operand(f, PREC_POW, false)
            }
            other => {
                // function nodes
                let name = other.function_name().unwrap_or("?");
                match other.function_argument() {
                    Some(arg) => write!(f, "{}({})", name, arg),
                    None => write!(f, "{}()", name),
                }
            }
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
    /// BASIC FEATURES

    /// check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Const(_) => false,
            Expr::Add(left, right)
            | Expr::Sub(left, right)
            | Expr::Mul(left, right)
            | Expr::Div(left, right)
            | Expr::Pow(left, right) => {
                left.contains_variable(var_name) || right.contains_variable(var_name)
            }
            func => func
                .function_argument()
                .map(|arg| arg.contains_variable(var_name))
                .unwrap_or(false),
        }
    }

    /// Sorted, deduplicated names of all variables in the expression.
    pub fn all_arguments_are_variables(&self) -> Vec<String> {
        fn collect(expr: &Expr, acc: &mut BTreeSet<String>) {
            match expr {
                Expr::Var(name) => {
                    acc.insert(name.clone());
                }
                Expr::Const(_) => {}
                Expr::Add(lhs, rhs)
                | Expr::Sub(lhs, rhs)
                | Expr::Mul(lhs, rhs)
                | Expr::Div(lhs, rhs)
                | Expr::Pow(lhs, rhs) => {
                    collect(lhs, acc);
                    collect(rhs, acc);
                }
                func => {
                    if let Some(arg) = func.function_argument() {
                        collect(arg, acc);
                    }
                }
            }
        }
        let mut acc = BTreeSet::new();
        collect(self, &mut acc);
        acc.into_iter().collect()
    }

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// true if expression is Const(0.0)
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 0.0)
    }

    /// true if expression is Const(1.0)
    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 1.0)
    }

    pub fn as_const(&self) -> Option<f64> {
        match self {
            Expr::Const(val) => Some(*val),
            _ => None,
        }
    }
}

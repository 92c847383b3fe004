//! # Symbolic Expression Simplification Module
//!
//! Raw derivatives are full of `* 1`, `+ 0` and `x^1`. This module rewrites them into the
//! short form shown on the workbench (`2*x` instead of `2*x^1*1 - 2*y^1*0`).
//!
//! The rewrite is a bottom-up pass repeated until the tree stops changing:
//!
//! 1. **Constant Folding**: arithmetic between constants, only when the result is finite
//! 2. **Algebraic Identities**: `x + 0 = x`, `x * 1 = x`, `0 * x = 0`, `x^1 = x`, `x^0 = 1`
//! 3. **Sign Normalization**: `a + (-2)*b` becomes `a - 2*b`, `0 - b` becomes `-b`
//! 4. **Coefficient Collection**: constants move to the front of products and merge
//! 5. **Exact Function Values**: `exp(0)`, `ln(1)`, `sin(0)`, `cos(0)` and friends
use crate::symbolic::symbolic_engine::Expr;

const MAX_PASSES: usize = 32;

// keeps -0.0 out of the tree so it never prints as "-0"
fn constant(value: f64) -> Expr {
    Expr::Const(if value == 0.0 { 0.0 } else { value })
}

fn fold(value: f64, otherwise: impl FnOnce() -> Expr) -> Expr {
    if value.is_finite() {
        constant(value)
    } else {
        otherwise()
    }
}

/// `c * rest` with a negative `c`, split into `(c, rest)`
fn negative_coefficient(expr: &Expr) -> Option<(f64, &Expr)> {
    match expr {
        Expr::Mul(lhs, rest) => match **lhs {
            Expr::Const(c) if c < 0.0 => Some((c, rest)),
            _ => None,
        },
        _ => None,
    }
}

fn scaled(coefficient: f64, rest: &Expr) -> Expr {
    if coefficient == 1.0 {
        rest.clone()
    } else {
        Expr::Mul(Box::new(constant(coefficient)), Box::new(rest.clone()))
    }
}

/// Arithmetic negation that avoids stacking `-1 *` factors.
pub fn negate(expr: Expr) -> Expr {
    match expr {
        Expr::Const(c) => constant(-c),
        Expr::Sub(lhs, rhs) => Expr::Sub(rhs, lhs),
        Expr::Mul(lhs, rest) => match *lhs {
            Expr::Const(c) => scaled(-c, &rest),
            other => Expr::Mul(
                Box::new(Expr::Const(-1.0)),
                Box::new(Expr::Mul(Box::new(other), rest)),
            ),
        },
        other => Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(other)),
    }
}

fn simplify_add(lhs: Expr, rhs: Expr) -> Expr {
    if let (Expr::Const(a), Expr::Const(b)) = (&lhs, &rhs) {
        return fold(a + b, || Expr::Add(Box::new(lhs.clone()), Box::new(rhs.clone())));
    }
    if lhs.is_zero() {
        return rhs;
    }
    if rhs.is_zero() {
        return lhs;
    }
    if let Expr::Const(c) = rhs {
        if c < 0.0 {
            return Expr::Sub(Box::new(lhs), Box::new(constant(-c)));
        }
    }
    if let Some((c, rest)) = negative_coefficient(&rhs) {
        return Expr::Sub(Box::new(lhs), Box::new(scaled(-c, rest)));
    }
    if let Some((c, rest)) = negative_coefficient(&lhs) {
        if negative_coefficient(&rhs).is_none() {
            return Expr::Sub(Box::new(rhs), Box::new(scaled(-c, rest)));
        }
    }
    if lhs == rhs {
        return Expr::Mul(Box::new(Expr::Const(2.0)), Box::new(lhs));
    }
    Expr::Add(Box::new(lhs), Box::new(rhs))
}

fn simplify_sub(lhs: Expr, rhs: Expr) -> Expr {
    if let (Expr::Const(a), Expr::Const(b)) = (&lhs, &rhs) {
        return fold(a - b, || Expr::Sub(Box::new(lhs.clone()), Box::new(rhs.clone())));
    }
    if rhs.is_zero() {
        return lhs;
    }
    if lhs.is_zero() {
        return negate(rhs);
    }
    if lhs == rhs {
        return Expr::Const(0.0);
    }
    if let Expr::Const(c) = rhs {
        if c < 0.0 {
            return Expr::Add(Box::new(lhs), Box::new(constant(-c)));
        }
    }
    if let Some((c, rest)) = negative_coefficient(&rhs) {
        return Expr::Add(Box::new(lhs), Box::new(scaled(-c, rest)));
    }
    Expr::Sub(Box::new(lhs), Box::new(rhs))
}

fn simplify_mul(lhs: Expr, rhs: Expr) -> Expr {
    if let (Expr::Const(a), Expr::Const(b)) = (&lhs, &rhs) {
        return fold(a * b, || Expr::Mul(Box::new(lhs.clone()), Box::new(rhs.clone())));
    }
    if lhs.is_zero() || rhs.is_zero() {
        return Expr::Const(0.0);
    }
    if lhs.is_one() {
        return rhs;
    }
    if rhs.is_one() {
        return lhs;
    }
    match (lhs, rhs) {
        // constants go first
        (other, Expr::Const(c)) => Expr::Mul(Box::new(Expr::Const(c)), Box::new(other)),
        (Expr::Const(c1), Expr::Mul(inner, rest)) if matches!(*inner, Expr::Const(_)) => {
            let c2 = inner.as_const().unwrap_or(1.0);
            if (c1 * c2).is_finite() {
                scaled(c1 * c2, &rest)
            } else {
                Expr::Mul(Box::new(Expr::Const(c1)), Box::new(Expr::Mul(inner, rest)))
            }
        }
        (Expr::Mul(inner, rest), other) if matches!(*inner, Expr::Const(_)) => Expr::Mul(
            inner,
            Box::new(Expr::Mul(rest, Box::new(other))),
        ),
        (other, Expr::Mul(inner, rest))
            if matches!(*inner, Expr::Const(_)) && other.as_const().is_none() =>
        {
            Expr::Mul(inner, Box::new(Expr::Mul(Box::new(other), rest)))
        }
        (lhs, rhs) if lhs == rhs => Expr::Pow(Box::new(lhs), Box::new(Expr::Const(2.0))),
        (lhs, rhs) => Expr::Mul(Box::new(lhs), Box::new(rhs)),
    }
}

fn simplify_div(lhs: Expr, rhs: Expr) -> Expr {
    if let (Expr::Const(a), Expr::Const(b)) = (&lhs, &rhs) {
        if *b != 0.0 {
            return fold(a / b, || Expr::Div(Box::new(lhs.clone()), Box::new(rhs.clone())));
        }
    }
    if lhs.is_zero() && !rhs.is_zero() {
        return Expr::Const(0.0);
    }
    if rhs.is_one() {
        return lhs;
    }
    Expr::Div(Box::new(lhs), Box::new(rhs))
}

fn simplify_pow(base: Expr, exp: Expr) -> Expr {
    if let (Expr::Const(a), Expr::Const(b)) = (&base, &exp) {
        return fold(a.powf(*b), || Expr::Pow(Box::new(base.clone()), Box::new(exp.clone())));
    }
    if exp.is_zero() {
        return Expr::Const(1.0);
    }
    if exp.is_one() {
        return base;
    }
    if base.is_one() {
        return Expr::Const(1.0);
    }
    Expr::Pow(Box::new(base), Box::new(exp))
}

// only values that are exact in any printout
fn simplify_function(node: &Expr, arg: Expr) -> Expr {
    let exact = match (node, arg.as_const()) {
        (Expr::Exp(_), Some(v)) if v == 0.0 => Some(1.0),
        (Expr::Ln(_), Some(v)) if v == 1.0 => Some(0.0),
        (Expr::sin(_), Some(v))
        | (Expr::tg(_), Some(v))
        | (Expr::arcsin(_), Some(v))
        | (Expr::arctg(_), Some(v))
            if v == 0.0 =>
        {
            Some(0.0)
        }
        (Expr::cos(_), Some(v)) if v == 0.0 => Some(1.0),
        (Expr::arccos(_), Some(v)) if v == 1.0 => Some(0.0),
        _ => None,
    };
    match exact {
        Some(value) => Expr::Const(value),
        None => node.with_function_argument(arg),
    }
}

impl Expr {
    //___________________________________SIMPLIFICATION____________________________________

    /// One bottom-up rewrite pass.
    fn simplify_once(&self) -> Expr {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => simplify_add(lhs.simplify_once(), rhs.simplify_once()),
            Expr::Sub(lhs, rhs) => simplify_sub(lhs.simplify_once(), rhs.simplify_once()),
            Expr::Mul(lhs, rhs) => simplify_mul(lhs.simplify_once(), rhs.simplify_once()),
            Expr::Div(lhs, rhs) => simplify_div(lhs.simplify_once(), rhs.simplify_once()),
            Expr::Pow(base, exp) => simplify_pow(base.simplify_once(), exp.simplify_once()),
            func => match func.function_argument() {
                Some(arg) => simplify_function(func, arg.simplify_once()),
                None => func.clone(),
            },
        }
    }

    /// Simplifies the expression until a fixed point (or a pass limit) is reached.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let f = Expr::parse_expression("x^2 - y^2").unwrap();
    /// assert_eq!(f.diff("y").simplify().to_string(), "-2*y");
    /// ```
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
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simplified(input: &str) -> String {
        Expr::parse_expression(input).unwrap().simplify().to_string()
    }

    #[test]
    fn test_identities() {
        assert_eq!(simplified("x + 0"), "x");
        assert_eq!(simplified("0 + x"), "x");
        assert_eq!(simplified("1*x*1"), "x");
        assert_eq!(simplified("0*sin(x)"), "0");
        assert_eq!(simplified("x^1"), "x");
        assert_eq!(simplified("x^0"), "1");
        assert_eq!(simplified("x/1"), "x");
        assert_eq!(simplified("x - x"), "0");
    }

    #[test]
    fn test_constant_folding() {
        assert_eq!(simplified("2 + 3*4"), "14");
        assert_eq!(simplified("2^3"), "8");
        assert_eq!(simplified("exp(0) + cos(0)"), "2");
        // division by zero is left alone
        assert_eq!(simplified("1/0"), "1/0");
    }

    #[test]
    fn test_overflow_is_not_folded() {
        let big = simplified("1e200*1e200*x");
        assert!(!big.contains("inf"), "{}", big);
        let reparsed = Expr::parse_expression(&big).unwrap();
        let value = reparsed.eval_expression(&["x"], &[1.0]).unwrap();
        assert!(value.is_infinite());
        assert!(!simplified("1e308 + 1e308").contains("inf"));
        assert!(!simplified("-1e308 - 1e308").contains("inf"));
    }

    #[test]
    fn test_coefficients_move_to_front() {
        assert_eq!(simplified("x*3"), "3*x");
        assert_eq!(simplified("2*(3*x)"), "6*x");
        assert_eq!(simplified("(2*x)*y"), "2*x*y");
    }

    #[test]
    fn test_sign_normalization() {
        assert_eq!(simplified("0 - 2*y"), "-2*y");
        assert_eq!(simplified("x + -2*y"), "x - 2*y");
        assert_eq!(simplified("x + (-1)*y"), "x - y");
        assert_eq!(simplified("x - (-3)"), "x + 3");
        assert_eq!(simplified("-2*y + x"), "x - 2*y");
    }

    #[test]
    fn test_negative_zero_is_not_printed() {
        assert_eq!(simplified("0*(-1)"), "0");
        assert_eq!(negate(Expr::Const(0.0)).to_string(), "0");
    }

    #[test]
    fn test_simplify_is_idempotent() {
        let expr = Expr::parse_expression("sin(x)*exp(y) + x^2*y").unwrap();
        let once = expr.diff("x").simplify();
        assert_eq!(once.simplify(), once);
    }
}

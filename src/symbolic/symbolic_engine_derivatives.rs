//! # Symbolic Engine Derivatives Module
//!
//! Analytical differentiation and direct numerical evaluation of `Expr` trees.
//!
//! ## Key Methods
//! - `diff(var)` - partial derivative with respect to one variable, others held fixed
//! - `eval_expression(vars, values)` - evaluation at a point, fails on unbound variables
//! - `compare_num(...)` - checks the analytical derivative against a central difference
//!
//! Differentiation rules: sum, product, quotient and chain rule; the power rule has three
//! branches depending on whether the base, the exponent or both depend on the variable.
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_errors::ComputationError;
use crate::symbolic::utils::numerical_derivative;
use std::collections::HashMap;

impl Expr {
    /// DIFFERENTIATION

    /// Computes the analytical derivative of the expression with respect to a variable.
    ///
    /// The result is not simplified, use `diff(var).simplify()` for a readable form.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let f = Expr::parse_expression("x^2").unwrap();
    /// let df_dx = f.diff("x").simplify(); // 2*x
    /// ```
    pub fn diff(&self, var: &str) -> Expr {
        match self {
            Expr::Var(name) => {
                if name == var {
                    Expr::Const(1.0)
                } else {
                    Expr::Const(0.0)
                }
            }
            Expr::Const(_) => Expr::Const(0.0),
            Expr::Add(lhs, rhs) => Expr::Add(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Sub(lhs, rhs) => Expr::Sub(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Mul(lhs, rhs) => Expr::Add(
                Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                Box::new(Expr::Mul(lhs.clone(), Box::new(rhs.diff(var)))),
            ),
            Expr::Div(lhs, rhs) => Expr::Div(
                Box::new(Expr::Sub(
                    Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                    Box::new(Expr::Mul(lhs.clone(), Box::new(rhs.diff(var)))),
                )),
                Box::new(Expr::Pow(rhs.clone(), Box::new(Expr::Const(2.0)))),
            ),
            Expr::Pow(base, exp) => {
                let base_depends = base.contains_variable(var);
                let exp_depends = exp.contains_variable(var);
                match (base_depends, exp_depends) {
                    (_, false) => {
                        // n * b^(n-1) * b'
                        let lowered = match exp.as_const() {
                            Some(n) => Expr::Const(n - 1.0),
                            None => Expr::Sub(exp.clone(), Box::new(Expr::Const(1.0))),
                        };
                        Expr::Mul(
                            Box::new(Expr::Mul(
                                exp.clone(),
                                Box::new(Expr::Pow(base.clone(), Box::new(lowered))),
                            )),
                            Box::new(base.diff(var)),
                        )
                    }
                    (false, true) => {
                        // b^e * ln(b) * e'
                        Expr::Mul(
                            Box::new(Expr::Mul(
                                Box::new(self.clone()),
                                Box::new(Expr::Ln(base.clone())),
                            )),
                            Box::new(exp.diff(var)),
                        )
                    }
                    (true, true) => {
                        // b^e * (e' * ln(b) + e * b' / b)
                        Expr::Mul(
                            Box::new(self.clone()),
                            Box::new(Expr::Add(
                                Box::new(Expr::Mul(
                                    Box::new(exp.diff(var)),
                                    Box::new(Expr::Ln(base.clone())),
                                )),
                                Box::new(Expr::Div(
                                    Box::new(Expr::Mul(exp.clone(), Box::new(base.diff(var)))),
                                    base.clone(),
                                )),
                            )),
                        )
                    }
                }
            }
            Expr::Exp(expr) => {
                Expr::Mul(Box::new(Expr::Exp(expr.clone())), Box::new(expr.diff(var)))
            }
            Expr::Ln(expr) => Expr::Div(Box::new(expr.diff(var)), expr.clone()),
            Expr::sin(expr) => {
                Expr::Mul(Box::new(Expr::cos(expr.clone())), Box::new(expr.diff(var)))
            }
            Expr::cos(expr) => Expr::Mul(
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(Expr::sin(expr.clone())),
                )),
                Box::new(expr.diff(var)),
            ),
            Expr::tg(expr) => Expr::Div(
                Box::new(expr.diff(var)),
                Box::new(Expr::Pow(
                    Box::new(Expr::cos(expr.clone())),
                    Box::new(Expr::Const(2.0)),
                )),
            ),
            Expr::ctg(expr) => Expr::Mul(
                Box::new(Expr::Const(-1.0)),
                Box::new(Expr::Div(
                    Box::new(expr.diff(var)),
                    Box::new(Expr::Pow(
                        Box::new(Expr::sin(expr.clone())),
                        Box::new(Expr::Const(2.0)),
                    )),
                )),
            ),
            Expr::arcsin(expr) => Expr::Div(
                Box::new(expr.diff(var)),
                Box::new(Expr::Pow(
                    Box::new(Expr::Sub(
                        Box::new(Expr::Const(1.0)),
                        Box::new(Expr::Pow(expr.clone(), Box::new(Expr::Const(2.0)))),
                    )),
                    Box::new(Expr::Const(0.5)),
                )),
            ),
            Expr::arccos(expr) => Expr::Mul(
                Box::new(Expr::Const(-1.0)),
                Box::new(Expr::Div(
                    Box::new(expr.diff(var)),
                    Box::new(Expr::Pow(
                        Box::new(Expr::Sub(
                            Box::new(Expr::Const(1.0)),
                            Box::new(Expr::Pow(expr.clone(), Box::new(Expr::Const(2.0)))),
                        )),
                        Box::new(Expr::Const(0.5)),
                    )),
                )),
            ),
            Expr::arctg(expr) => Expr::Div(
                Box::new(expr.diff(var)),
                Box::new(Expr::Add(
                    Box::new(Expr::Const(1.0)),
                    Box::new(Expr::Pow(expr.clone(), Box::new(Expr::Const(2.0)))),
                )),
            ),
            Expr::arcctg(expr) => Expr::Mul(
                Box::new(Expr::Const(-1.0)),
                Box::new(Expr::Div(
                    Box::new(expr.diff(var)),
                    Box::new(Expr::Add(
                        Box::new(Expr::Const(1.0)),
                        Box::new(Expr::Pow(expr.clone(), Box::new(Expr::Const(2.0)))),
                    )),
                )),
            ),
        }
    } // end of diff

    /// DIRECT EXPRESSION EVALUATION

    /// Evaluates the expression with `vars[i] = values[i]`.
    ///
    /// # Errors
    /// `ComputationError::UnknownVariable` if the tree mentions a variable missing from `vars`.
    pub fn eval_expression(&self, vars: &[&str], values: &[f64]) -> Result<f64, ComputationError> {
        let scope: HashMap<String, f64> = vars
            .iter()
            .zip(values.iter())
            .map(|(name, value)| (name.to_string(), *value))
            .collect();
        self.eval_with_map(&scope)
    }

    /// Evaluates the expression with variable values taken from `scope`.
    pub fn eval_with_map(&self, scope: &HashMap<String, f64>) -> Result<f64, ComputationError> {
        let value = match self {
            Expr::Var(name) => *scope
                .get(name)
                .ok_or_else(|| ComputationError::UnknownVariable(name.clone()))?,
            Expr::Const(val) => *val,
            Expr::Add(lhs, rhs) => lhs.eval_with_map(scope)? + rhs.eval_with_map(scope)?,
            Expr::Sub(lhs, rhs) => lhs.eval_with_map(scope)? - rhs.eval_with_map(scope)?,
            Expr::Mul(lhs, rhs) => lhs.eval_with_map(scope)? * rhs.eval_with_map(scope)?,
            Expr::Div(lhs, rhs) => lhs.eval_with_map(scope)? / rhs.eval_with_map(scope)?,
            Expr::Pow(base, exp) => base.eval_with_map(scope)?.powf(exp.eval_with_map(scope)?),
            Expr::Exp(expr) => expr.eval_with_map(scope)?.exp(),
            Expr::Ln(expr) => expr.eval_with_map(scope)?.ln(),
            Expr::sin(expr) => expr.eval_with_map(scope)?.sin(),
            Expr::cos(expr) => expr.eval_with_map(scope)?.cos(),
            Expr::tg(expr) => expr.eval_with_map(scope)?.tan(),
            Expr::ctg(expr) => 1.0 / expr.eval_with_map(scope)?.tan(),
            Expr::arcsin(expr) => expr.eval_with_map(scope)?.asin(),
            Expr::arccos(expr) => expr.eval_with_map(scope)?.acos(),
            Expr::arctg(expr) => expr.eval_with_map(scope)?.atan(),
            Expr::arcctg(expr) => std::f64::consts::FRAC_PI_2 - expr.eval_with_map(scope)?.atan(),
        };
        Ok(value)
    }

    /// Compares the analytical partial derivative by `var` with a central difference at
    /// the point `vars = values`. Returns the absolute difference and whether it is below
    /// `tolerance`.
    pub fn compare_num(
        &self,
        var: &str,
        vars: &[&str],
        values: &[f64],
        tolerance: f64,
    ) -> Result<(f64, bool), ComputationError> {
        let index = vars
            .iter()
            .position(|name| *name == var)
            .ok_or_else(|| ComputationError::UnknownVariable(var.to_string()))?;
        let analytical = self.diff(var).eval_expression(vars, values)?;
        let numerical = numerical_derivative(
            |t| {
                let mut shifted = values.to_vec();
                shifted[index] = t;
                self.eval_expression(vars, &shifted)
            },
            values[index],
            1e-5,
        )?;
        let norm = (analytical - numerical).abs();
        Ok((norm, norm < tolerance))
    }
}

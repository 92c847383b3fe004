//! # Derivative Evaluator
//!
//! Partial and directional derivatives of a function `f(x, y)` typed as text.
//!
//! The evaluator does not know how to differentiate by itself: it is handed a
//! [`MathEngine`] at construction time and asks it for the derivative of the recipe as a
//! string, then for the value of that string at the point. [`SymbolicEngine`] is the
//! engine backed by the crate's own `symbolic` module.
//!
//! ```
//! use MatchaBerryCafe::cafe::evaluator::{DerivativeEvaluator, ResultBundle, SymbolicEngine};
//! let evaluator = DerivativeEvaluator::new(SymbolicEngine);
//! let bundle = evaluator.compute_partial("x^2 - y^2", 1.0, 2.0).unwrap();
//! if let ResultBundle::Partial { f_x, val_y, .. } = bundle {
//!     assert_eq!(f_x, "2*x");
//!     assert_eq!(val_y, -4.0);
//! }
//! ```
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_errors::ComputationError;
use log::debug;
use nalgebra::Vector2;
use serde::Serialize;
use std::collections::HashMap;
use strum_macros::Display;

/// the only free variables a recipe may use
pub const VARIABLES: [&str; 2] = ["x", "y"];

/// Seam between the evaluator and whatever does the calculus.
pub trait MathEngine {
    /// Derivative of `expression` by `var`, already simplified, as text.
    fn derivative(&self, expression: &str, var: &str) -> Result<String, ComputationError>;
    /// Value of `expression` with variables bound from `scope`.
    fn evaluate(
        &self,
        expression: &str,
        scope: &HashMap<String, f64>,
    ) -> Result<f64, ComputationError>;
}

/// [`MathEngine`] over the `symbolic` module: parse, `diff`, `simplify`, print.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolicEngine;

/// Parses a recipe and rejects free variables other than `x` and `y`.
pub fn parse_recipe(expression: &str) -> Result<Expr, ComputationError> {
    let expr = Expr::parse_expression(expression)?;
    if let Some(stranger) = expr
        .all_arguments_are_variables()
        .into_iter()
        .find(|name| !VARIABLES.contains(&name.as_str()))
    {
        return Err(ComputationError::UnknownVariable(stranger));
    }
    Ok(expr)
}

impl MathEngine for SymbolicEngine {
    fn derivative(&self, expression: &str, var: &str) -> Result<String, ComputationError> {
        let expr = parse_recipe(expression)?;
        Ok(expr.diff(var).simplify().to_string())
    }

    fn evaluate(
        &self,
        expression: &str,
        scope: &HashMap<String, f64>,
    ) -> Result<f64, ComputationError> {
        Expr::parse_expression(expression)?.eval_with_map(scope)
    }
}

/// Which workbench produced a result; the label is what the chef is asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CalculationKind {
    #[strum(serialize = "Partial Rate of Change")]
    Partial,
    #[strum(serialize = "Directional Path Slope")]
    Directional,
}

/// Outcome of one computation. Serialized without a tag: the fields are the payload
/// sent along with the explanation prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultBundle {
    Partial {
        f_x: String,
        f_y: String,
        val_x: f64,
        val_y: f64,
    },
    Directional {
        f_x: String,
        f_y: String,
        /// gradient at the point
        vx: f64,
        vy: f64,
        /// normalized heading
        u: f64,
        v: f64,
        directional_deriv: f64,
    },
}

impl ResultBundle {
    pub fn kind(&self) -> CalculationKind {
        match self {
            ResultBundle::Partial { .. } => CalculationKind::Partial,
            ResultBundle::Directional { .. } => CalculationKind::Directional,
        }
    }

    /// `(f_x, f_y)` as text
    pub fn derivatives(&self) -> (&str, &str) {
        match self {
            ResultBundle::Partial { f_x, f_y, .. } | ResultBundle::Directional { f_x, f_y, .. } => {
                (f_x, f_y)
            }
        }
    }

    /// gradient at the evaluation point
    pub fn gradient(&self) -> Vector2<f64> {
        match self {
            ResultBundle::Partial { val_x, val_y, .. } => Vector2::new(*val_x, *val_y),
            ResultBundle::Directional { vx, vy, .. } => Vector2::new(*vx, *vy),
        }
    }
}

/// Unit vector along `(u, v)`. A zero heading has no direction, it is divided by 1
/// and stays `(0, 0)`.
pub fn unit_direction(u: f64, v: f64) -> Vector2<f64> {
    let heading = Vector2::new(u, v);
    let mut mag = heading.norm();
    if mag == 0.0 {
        mag = 1.0;
    }
    heading / mag
}

/// Largest gap tolerated between an analytic partial and its central difference.
pub const CHECK_TOLERANCE: f64 = 1e-5;

/// Analytic partials by `x` and `y` against a central difference at `(x, y)`:
/// the gap for each and whether it is below `tolerance`.
pub fn cross_check(
    expression: &str,
    x: f64,
    y: f64,
    tolerance: f64,
) -> Result<[(f64, bool); 2], ComputationError> {
    let expr = parse_recipe(expression)?;
    let point = [x, y];
    Ok([
        expr.compare_num("x", &VARIABLES, &point, tolerance)?,
        expr.compare_num("y", &VARIABLES, &point, tolerance)?,
    ])
}

pub struct DerivativeEvaluator<E: MathEngine = SymbolicEngine> {
    engine: E,
}

impl Default for DerivativeEvaluator<SymbolicEngine> {
    fn default() -> Self {
        DerivativeEvaluator::new(SymbolicEngine)
    }
}

impl<E: MathEngine> DerivativeEvaluator<E> {
    pub fn new(engine: E) -> Self {
        DerivativeEvaluator { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Both partial derivatives as text and their values at `(x, y)`.
    fn gradient(
        &self,
        expression: &str,
        x: f64,
        y: f64,
    ) -> Result<(String, String, Vector2<f64>), ComputationError> {
        let f_x = self.engine.derivative(expression, "x")?;
        let f_y = self.engine.derivative(expression, "y")?;
        let scope = HashMap::from([("x".to_string(), x), ("y".to_string(), y)]);
        let grad = Vector2::new(
            self.engine.evaluate(&f_x, &scope)?,
            self.engine.evaluate(&f_y, &scope)?,
        );
        debug!("grad of {} at ({}, {}) = [{}, {}]", expression, x, y, grad.x, grad.y);
        Ok((f_x, f_y, grad))
    }

    /// ∂f/∂x and ∂f/∂y at `(x, y)`.
    pub fn compute_partial(
        &self,
        expression: &str,
        x: f64,
        y: f64,
    ) -> Result<ResultBundle, ComputationError> {
        let (f_x, f_y, grad) = self.gradient(expression, x, y)?;
        Ok(ResultBundle::Partial {
            f_x,
            f_y,
            val_x: grad.x,
            val_y: grad.y,
        })
    }

    /// Slope of the surface at `(x, y)` walking along `(u, v)`: `∇f · (u, v)/|(u, v)|`.
    pub fn compute_directional(
        &self,
        expression: &str,
        x: f64,
        y: f64,
        u: f64,
        v: f64,
    ) -> Result<ResultBundle, ComputationError> {
        let (f_x, f_y, grad) = self.gradient(expression, x, y)?;
        let heading = unit_direction(u, v);
        Ok(ResultBundle::Directional {
            f_x,
            f_y,
            vx: grad.x,
            vy: grad.y,
            u: heading.x,
            v: heading.y,
            directional_deriv: grad.dot(&heading),
        })
    }
}

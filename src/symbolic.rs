#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use MatchaBerryCafe::symbolic::symbolic_engine::Expr;
/// let parsed_expression = Expr::parse_expression("sin(x)*exp(y)").unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// let value = parsed_expression.eval_expression(&["x", "y"], &[0.0, 1.0]).unwrap();
/// assert_eq!(value, 0.0);
///  ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) holds the expression tree and prints it back as compact infix text
/// 2) differentiates it analytically and simplifies the result
/// 3) evaluates it at a point and checks derivatives against a central difference
///# Example#
/// ```
/// use MatchaBerryCafe::symbolic::symbolic_engine::Expr;
/// let input = "x^2 - y^2";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// // return vec of all arguments
/// let all = parsed_expression.all_arguments_are_variables();
/// assert_eq!(all, vec!["x", "y"]);
/// // differentiate with respect to x and y
/// let df_dx = parsed_expression.diff("x").simplify();
/// let df_dy = parsed_expression.diff("y").simplify();
/// println!("df_dx = {}, df_dy = {}", df_dx, df_dy);
/// assert_eq!(df_dy.to_string(), "-2*y");
/// // compare numerical and analytical derivatives at a point
/// let (norm, res) = parsed_expression.compare_num("x", &["x", "y"], &[1.0, 2.0], 1e-6).unwrap();
/// println!("norm = {}, res = {}", norm, res);
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
pub mod symbolic_engine_derivatives;
mod symbolic_engine_tests;
/// errors of parsing and evaluation
pub mod symbolic_errors;
/// rewriting of raw derivatives into readable form
pub mod symbolic_simplify;
///______________________________________________________________________________________________________________________________________________
/// the collection of small numeric helpers: linspace and central difference
/// _____________________________________________________________________________________________________________________________________________
pub mod utils;

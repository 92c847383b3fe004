//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use crate::symbolic::symbolic_engine::Expr;
    use crate::symbolic::symbolic_errors::ComputationError;
    use approx::assert_relative_eq;

    fn parse(input: &str) -> Expr {
        Expr::parse_expression(input).unwrap()
    }

    #[test]
    fn test_operator_overloads() {
        let x = Expr::Var("x".to_string());
        let y = Expr::Var("y".to_string());
        let expr = x.clone() * y.clone() - x.clone() / y.clone();
        assert_eq!(expr.to_string(), "x*y - x/y");
        assert_eq!((-x).to_string(), "-x");
    }

    #[test]
    fn test_all_arguments_are_variables_sorted() {
        let expr = parse("y*sin(x) + exp(y) + pi");
        assert_eq!(expr.all_arguments_are_variables(), vec!["x", "y"]);
        assert!(parse("2 + 3").all_arguments_are_variables().is_empty());
    }

    #[test]
    fn test_diff_default_recipe() {
        let f = parse("x^2 - y^2");
        let grad = [f.diff("x").simplify(), f.diff("y").simplify()];
        assert_eq!(grad[0].to_string(), "2*x");
        assert_eq!(grad[1].to_string(), "-2*y");
        assert_relative_eq!(grad[0].eval_expression(&["x", "y"], &[1.0, 2.0]).unwrap(), 2.0);
        assert_relative_eq!(grad[1].eval_expression(&["x", "y"], &[1.0, 2.0]).unwrap(), -4.0);
    }

    #[test]
    fn test_diff_product_and_chain() {
        assert_eq!(parse("x*y").diff("x").simplify().to_string(), "y");
        assert_eq!(parse("x^3").diff("x").simplify().to_string(), "3*x^2");
        assert_eq!(
            parse("sin(x)*exp(y)").diff("x").simplify().to_string(),
            "cos(x)*exp(y)"
        );
        assert_eq!(
            parse("sin(x)*exp(y)").diff("y").simplify().to_string(),
            "sin(x)*exp(y)"
        );
    }

    #[test]
    fn test_diff_of_constant_and_other_variable() {
        assert_eq!(parse("pi").diff("x").simplify(), Expr::Const(0.0));
        assert_eq!(parse("y^2 + 4").diff("x").simplify(), Expr::Const(0.0));
    }

    #[test]
    fn test_analytic_matches_numeric() {
        let vars = ["x", "y"];
        let point = [0.7, 1.3];
        for input in [
            "x^2 - y^2",
            "sin(x)*exp(y)",
            "ln(x^2 + y^2)",
            "x/(y + 1)",
            "x^y",
            "2^(x*y)",
            "tan(x) + cot(y)",
            "asin(x/2) + acos(y/2) + atan(x*y) + acot(y)",
            "sqrt(x^2 + y^2)",
        ] {
            let f = parse(input);
            for var in vars {
                let (norm, ok) = f.compare_num(var, &vars, &point, 1e-5).unwrap();
                assert!(ok, "{} d/d{}: difference {}", input, var, norm);
            }
        }
    }

    #[test]
    fn test_function_names_print_short_and_read_back() {
        let f = parse("tg(x) + ctg(y) + arctg(x) + arcctg(y)");
        let printed = f.to_string();
        assert_eq!(printed, "tan(x) + cot(y) + atan(x) + acot(y)");
        assert_eq!(parse(&printed), f);
    }

    #[test]
    fn test_eval_unknown_variable() {
        let result = parse("x + z").eval_expression(&["x", "y"], &[1.0, 2.0]);
        assert_eq!(result, Err(ComputationError::UnknownVariable("z".to_string())));
    }

    #[test]
    fn test_eval_named_constants() {
        let value = parse("sin(pi/2) + ln(e)").eval_expression(&[], &[]).unwrap();
        assert_relative_eq!(value, 2.0, epsilon = 1e-12);
    }
}

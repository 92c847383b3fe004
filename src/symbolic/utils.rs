// small numeric helpers shared by the symbolic engine and the surface sampler
use crate::symbolic::symbolic_errors::ComputationError;

/// `n` evenly spaced points from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Central difference (f(x+h) - f(x-h)) / 2h.
pub fn numerical_derivative<F>(f: F, x: f64, h: f64) -> Result<f64, ComputationError>
where
    F: Fn(f64) -> Result<f64, ComputationError>,
{
    Ok((f(x + h)? - f(x - h)?) / (2.0 * h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linspace() {
        let points = linspace(-1.0, 1.0, 5);
        assert_eq!(points.len(), 5);
        assert_relative_eq!(points[0], -1.0);
        assert_relative_eq!(points[2], 0.0);
        assert_relative_eq!(points[4], 1.0);
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0, 7.0, 1), vec![3.0]);
    }

    #[test]
    fn test_numerical_derivative_of_square() {
        let d = numerical_derivative(|x| Ok(x * x), 3.0, 1e-5).unwrap();
        assert_relative_eq!(d, 6.0, epsilon = 1e-6);
    }

}

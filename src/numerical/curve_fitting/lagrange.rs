/// Lagrange polynomial through `points` evaluated at `x`:
/// `sum_i y_i prod_{j != i} (x - x_j) / (x_i - x_j)`.
///
/// The `x` values must be distinct.
pub fn lagrange_value(points: &[(f64, f64)], x: f64) -> f64 {
    points
        .iter()
        .enumerate()
        .map(|(i, &(xi, yi))| {
            let basis: f64 = points
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, &(xj, _))| (x - xj) / (xi - xj))
                .product();
            yi * basis
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear() {
        let points = [(0.0, 1.0), (1.0, 3.0)];
        assert_relative_eq!(lagrange_value(&points, 0.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(lagrange_value(&points, 0.5), 2.0, epsilon = 1e-12);
        assert_relative_eq!(lagrange_value(&points, 2.0), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reproduces_cubic() {
        let f = |x: f64| x * x * x - 2.0 * x + 1.0;
        let points: Vec<(f64, f64)> = [-1.0, 0.0, 1.5, 3.0].iter().map(|&x| (x, f(x))).collect();
        for x in [-2.0, 0.3, 2.2, 4.0] {
            assert_relative_eq!(lagrange_value(&points, x), f(x), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_single_point_is_constant() {
        assert_eq!(lagrange_value(&[(2.0, 7.0)], -5.0), 7.0);
    }
}

use crate::error::CompMathResult;
use crate::numerical::linear_systems::gauss::check_square_system;
use itertools::Itertools;
use log::{info, warn};
use nalgebra::{DMatrix, DVector};

/// `|a_ii| >= sum_{j != i} |a_ij|` for every row.
pub fn is_diagonally_dominant(a: &DMatrix<f64>) -> bool {
    (0..a.nrows()).all(|i| {
        let off: f64 = (0..a.ncols()).filter(|&j| j != i).map(|j| a[(i, j)].abs()).sum();
        a[(i, i)].abs() >= off
    })
}

/// One line per row, `[+]` when the row dominates.
pub fn dominance_report(a: &DMatrix<f64>) -> Vec<String> {
    (0..a.nrows())
        .map(|i| {
            let off: Vec<f64> = (0..a.ncols()).filter(|&j| j != i).map(|j| a[(i, j)]).collect();
            let sum: f64 = off.iter().map(|v| v.abs()).sum();
            let dominant = a[(i, i)].abs() >= sum;
            format!(
                "sum({}) = {}   {}   |{}|\t[{}]",
                off.iter().map(|v| format!("|{}|", v)).join(", "),
                sum,
                if dominant { "<=" } else { ">" },
                a[(i, i)],
                if dominant { "+" } else { "-" }
            )
        })
        .collect()
}

/// Rows of `[A | b]`, four decimals.
pub fn format_augmented(a: &DMatrix<f64>, b: &DVector<f64>) -> Vec<String> {
    format_matrix(a, 4)
        .into_iter()
        .zip(b.iter())
        .map(|(row, v)| format!("{}\t|   {:.4}", row, v))
        .collect()
}

/// Tab separated rows with `precision` decimals.
pub fn format_matrix(m: &DMatrix<f64>, precision: usize) -> Vec<String> {
    m.row_iter()
        .map(|row| row.iter().map(|v| format!("{:.*}", precision, v)).join("\t"))
        .collect()
}

/// Result of [`transform_to_dominant`].
#[derive(Clone, Debug, PartialEq)]
pub struct TransformedSystem {
    pub matrix: DMatrix<f64>,
    pub rhs: DVector<f64>,
    /// every swap and row operation, in order
    pub steps: Vec<String>,
    pub dominant: bool,
}

/// Gauss-Jordan reduction with partial pivoting, stopped as soon as the matrix is
/// diagonally dominant. Columns without a nonzero pivot are logged and skipped.
pub fn transform_to_dominant(a: &DMatrix<f64>, b: &DVector<f64>) -> CompMathResult<TransformedSystem> {
    check_square_system(a, b)?;
    let n = a.nrows();
    let mut m = a.clone();
    let mut rhs = b.clone();
    let mut steps = Vec::new();
    let mut dominant = is_diagonally_dominant(&m);

    for k in 0..n {
        if dominant {
            break;
        }
        let (offset, pivot) = m
            .column(k)
            .rows_range(k..)
            .iter()
            .enumerate()
            .fold((0, 0.0_f64), |best, (i, v)| if v.abs() > best.1 { (i, v.abs()) } else { best });
        if pivot == 0.0 {
            let line = format!("column {} has no nonzero pivot, skipped", k + 1);
            warn!("{}", line);
            steps.push(line);
            continue;
        }
        let p = k + offset;
        if p != k {
            m.swap_rows(k, p);
            rhs.swap_rows(k, p);
            steps.push(format!("swap rows {} and {}", k + 1, p + 1));
        }
        for j in (0..n).filter(|&j| j != k) {
            let factor = m[(j, k)] / m[(k, k)];
            if factor == 0.0 {
                continue;
            }
            for c in 0..n {
                m[(j, c)] -= factor * m[(k, c)];
            }
            rhs[j] -= factor * rhs[k];
            steps.push(format!("row {} -= {:.4} * row {}", j + 1, factor, k + 1));
        }
        dominant = is_diagonally_dominant(&m);
    }
    info!("dominance transform finished in {} steps, dominant = {}", steps.len(), dominant);
    Ok(TransformedSystem {
        matrix: m,
        rhs,
        steps,
        dominant,
    })
}

/// `(A^T A, A^T b)`: symmetric positive (semi)definite, so Seidel converges whenever `A` is regular.
pub fn normalize_system(a: &DMatrix<f64>, b: &DVector<f64>) -> CompMathResult<(DMatrix<f64>, DVector<f64>)> {
    check_square_system(a, b)?;
    let at = a.transpose();
    Ok((&at * a, &at * b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn non_dominant() -> (DMatrix<f64>, DVector<f64>) {
        (
            DMatrix::from_row_slice(3, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0]),
            DVector::from_vec(vec![6.0, 15.0, 25.0]),
        )
    }

    #[test]
    fn test_dominance() {
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 2.0, 1.0, 3.0]);
        assert!(is_diagonally_dominant(&a));
        let report = dominance_report(&a);
        assert!(report[0].ends_with("[+]"));
        assert!(!is_diagonally_dominant(&non_dominant().0));
        assert!(dominance_report(&non_dominant().0)[0].ends_with("[-]"));
    }

    #[test]
    fn test_transform_keeps_solution() {
        let (a, b) = non_dominant();
        let transformed = transform_to_dominant(&a, &b).unwrap();
        assert!(transformed.dominant);
        assert!(is_diagonally_dominant(&transformed.matrix));
        assert_eq!(transformed.steps[0], "swap rows 1 and 3");
        // x = (1, 1, 1) solves both systems
        let x = DVector::from_element(3, 1.0);
        assert_relative_eq!(&transformed.matrix * &x, transformed.rhs, epsilon = 1e-10);
        // input untouched
        assert_eq!(a[(0, 0)], 1.0);
    }

    #[test]
    fn test_transform_noop_on_dominant() {
        let a = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let b = DVector::from_vec(vec![1.0, 2.0]);
        let transformed = transform_to_dominant(&a, &b).unwrap();
        assert!(transformed.steps.is_empty());
        assert_eq!(transformed.matrix, a);
    }

    #[test]
    fn test_normalize() {
        let (a, b) = non_dominant();
        let (ata, atb) = normalize_system(&a, &b).unwrap();
        assert_eq!(ata, ata.transpose());
        let x = DVector::from_element(3, 1.0);
        assert_relative_eq!(&ata * &x, atb, epsilon = 1e-10);
    }

    #[test]
    fn test_format_augmented() {
        let a = DMatrix::from_row_slice(1, 1, &[2.0]);
        let b = DVector::from_vec(vec![1.5]);
        assert_eq!(format_augmented(&a, &b), vec!["2.0000\t|   1.5000".to_string()]);
    }
}

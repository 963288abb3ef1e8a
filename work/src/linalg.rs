//! Dense least-squares fitting used by the regression oracle.

use crate::WorkError;

/// Pivots smaller than this are treated as zero (singular system).
const PIVOT_EPSILON: f64 = 1e-12;

/// Ordinary least squares via the normal equations `(XᵀX) w = Xᵀy`.
///
/// `features` is row-major: one row per sample, one column per coefficient.
pub fn least_squares(features: &[Vec<f64>], targets: &[f64]) -> Result<Vec<f64>, WorkError> {
    let rows = features.len();
    if rows == 0 {
        return Err(WorkError::Degenerate("no samples".into()));
    }
    if rows != targets.len() {
        return Err(WorkError::MalformedPayload(format!(
            "{rows} feature rows but {} targets",
            targets.len()
        )));
    }
    let cols = features[0].len();
    if cols == 0 {
        return Err(WorkError::Degenerate("no features".into()));
    }
    if features.iter().any(|row| row.len() != cols) {
        return Err(WorkError::MalformedPayload("ragged feature matrix".into()));
    }
    if rows < cols {
        return Err(WorkError::Degenerate(format!(
            "{rows} samples cannot determine {cols} coefficients"
        )));
    }

    let mut xtx = vec![vec![0.0; cols]; cols];
    let mut xty = vec![0.0; cols];
    for (row, &y) in features.iter().zip(targets) {
        for i in 0..cols {
            xty[i] += row[i] * y;
            for j in 0..cols {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }

    solve_linear(xtx, xty)
}

/// Solve `a · x = b` by Gaussian elimination with partial pivoting.
pub fn solve_linear(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, WorkError> {
    let n = b.len();
    if a.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(WorkError::MalformedPayload("system is not square".into()));
    }

    for col in 0..n {
        let mut pivot = col;
        for row in (col + 1)..n {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }
        if !(a[pivot][col].abs() > PIVOT_EPSILON) {
            return Err(WorkError::Degenerate("singular normal equations".into()));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut acc = b[row];
        for k in (row + 1)..n {
            acc -= a[row][k] * x[k];
        }
        x[row] = acc / a[row][row];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn solves_small_system() {
        // 2x + y = 5, x - y = 1  =>  x = 2, y = 1
        let x = solve_linear(vec![vec![2.0, 1.0], vec![1.0, -1.0]], vec![5.0, 1.0]).unwrap();
        assert!(close(x[0], 2.0) && close(x[1], 1.0));
    }

    #[test]
    fn pivoting_handles_zero_leading_entry() {
        let x = solve_linear(vec![vec![0.0, 1.0], vec![1.0, 0.0]], vec![3.0, 4.0]).unwrap();
        assert!(close(x[0], 4.0) && close(x[1], 3.0));
    }

    #[test]
    fn singular_system_is_degenerate() {
        let err = solve_linear(vec![vec![1.0, 2.0], vec![2.0, 4.0]], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, WorkError::Degenerate(_)));
    }

    #[test]
    fn recovers_exact_linear_relation() {
        let features = vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 1.0],
            vec![2.0, 3.0],
        ];
        let targets: Vec<f64> = features.iter().map(|r| 0.5 * r[0] - 1.5 * r[1]).collect();
        let w = least_squares(&features, &targets).unwrap();
        assert!(close(w[0], 0.5) && close(w[1], -1.5));
    }

    #[test]
    fn rejects_ragged_and_underdetermined_inputs() {
        let ragged = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(matches!(
            least_squares(&ragged, &[1.0, 2.0]),
            Err(WorkError::MalformedPayload(_))
        ));
        let under = vec![vec![1.0, 2.0, 3.0]];
        assert!(matches!(
            least_squares(&under, &[1.0]),
            Err(WorkError::Degenerate(_))
        ));
        assert!(matches!(
            least_squares(&[vec![1.0]], &[1.0, 2.0]),
            Err(WorkError::MalformedPayload(_))
        ));
    }
}

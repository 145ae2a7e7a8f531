//! Linear algebra operations for least squares estimation.

use ndarray::{Array1, Array2, Axis};

use crate::MathError;

/// Relative pivot tolerance below which a matrix is treated as singular.
const PIVOT_TOLERANCE: f64 = 1e-13;

/// Result of an ordinary least squares regression.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Estimated coefficients, one per design column.
    pub coefficients: Array1<f64>,
    /// Standard errors of the coefficients.
    pub standard_errors: Array1<f64>,
    /// Fitted values.
    pub fitted: Array1<f64>,
    /// Residuals.
    pub residuals: Array1<f64>,
    /// Inverse of the cross-product matrix `(X'X)^-1`.
    pub xtx_inv: Array2<f64>,
    /// Residual sum of squares.
    pub ss_residual: f64,
    /// Total sum of squares around the mean of the response.
    pub ss_total: f64,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Residual degrees of freedom, `n - p`.
    pub df_residual: usize,
    /// Residual variance estimate, `ss_residual / df_residual`.
    pub sigma_squared: f64,
}

impl OlsFit {
    /// Number of observations.
    #[must_use]
    pub fn nobs(&self) -> usize {
        self.residuals.len()
    }

    /// Number of estimated coefficients.
    #[must_use]
    pub fn n_params(&self) -> usize {
        self.coefficients.len()
    }
}

/// Perform ordinary least squares regression.
///
/// Solves: argmin_beta sum((y_i - X_i * beta)^2)
///
/// The design matrix is used as given; include a column of ones for an
/// intercept. `r_squared` is measured around the mean of `y`.
///
/// # Arguments
/// * `y` - Response vector (n,)
/// * `x` - Design matrix (n x p)
///
/// # Errors
/// Returns `MathError::InsufficientObservations` if `n <= p`, and an error if
/// dimensions mismatch or `X'X` is singular.
pub fn ordinary_least_squares(y: &Array1<f64>, x: &Array2<f64>) -> Result<OlsFit, MathError> {
    let n = y.len();
    let p = x.ncols();

    if n == 0 || p == 0 {
        return Err(MathError::EmptyData);
    }
    if x.nrows() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: x.nrows() });
    }
    if n <= p {
        return Err(MathError::InsufficientObservations { observations: n, parameters: p });
    }

    let xtx = x.t().dot(x);
    let xty = x.t().dot(y);

    let coefficients = solve_linear_system(&xtx, &xty)?;
    let xtx_inv = invert(&xtx)?;

    let fitted = x.dot(&coefficients);
    let residuals = y - &fitted;

    let y_mean = y.mean().unwrap_or(0.0);
    let ss_total: f64 = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();
    let ss_residual: f64 = residuals.iter().map(|r| r.powi(2)).sum();
    let r_squared = if ss_total > 0.0 { 1.0 - ss_residual / ss_total } else { 0.0 };

    let df_residual = n - p;
    let sigma_squared = ss_residual / df_residual as f64;
    let standard_errors = xtx_inv.diag().mapv(|v| (sigma_squared * v).max(0.0).sqrt());

    Ok(OlsFit {
        coefficients,
        standard_errors,
        fitted,
        residuals,
        xtx_inv,
        ss_residual,
        ss_total,
        r_squared,
        df_residual,
        sigma_squared,
    })
}

/// Solve a linear system Ax = b using Gaussian elimination with partial pivoting.
///
/// # Errors
/// Returns an error if `A` is not square, sizes disagree, or `A` is singular.
pub fn solve_linear_system(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, MathError> {
    let n = a.nrows();
    if n == 0 {
        return Err(MathError::EmptyData);
    }
    if a.ncols() != n {
        return Err(MathError::LinearAlgebra("matrix must be square".to_string()));
    }
    if b.len() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: b.len() });
    }

    let mut rhs = Array2::zeros((n, 1));
    rhs.column_mut(0).assign(b);
    let solution = gauss_jordan(a, rhs)?;
    Ok(solution.index_axis(Axis(1), 0).to_owned())
}

/// Invert a square matrix using Gauss-Jordan elimination with partial pivoting.
///
/// # Errors
/// Returns an error if the matrix is not square or is singular.
pub fn invert(a: &Array2<f64>) -> Result<Array2<f64>, MathError> {
    let n = a.nrows();
    if n == 0 {
        return Err(MathError::EmptyData);
    }
    if a.ncols() != n {
        return Err(MathError::LinearAlgebra("matrix must be square".to_string()));
    }
    gauss_jordan(a, Array2::eye(n))
}

/// Reduce `[A | B]` to `[I | A^-1 B]` and return the right block.
///
/// The system is equilibrated first: with `D = diag(d)`, `d_j = √|a_jj|` (or
/// the largest magnitude in column `j` when the diagonal entry is zero), it
/// solves `(D⁻¹AD⁻¹)(Dx) = D⁻¹B`. For a cross-product matrix the scaled
/// system has a unit diagonal, so the pivot tolerance does not depend on the
/// scale of individual regressors.
fn gauss_jordan(a: &Array2<f64>, b: Array2<f64>) -> Result<Array2<f64>, MathError> {
    let n = a.nrows();
    let m = b.ncols();

    let d = a
        .axis_iter(Axis(1))
        .enumerate()
        .map(|(j, column)| {
            let diagonal = column[j].abs();
            let d = if diagonal > 0.0 {
                diagonal.sqrt()
            } else {
                column.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
            };
            if d == 0.0 || !d.is_finite() {
                Err(MathError::LinearAlgebra(
                    "matrix has a zero or non-finite column".to_string(),
                ))
            } else {
                Ok(d)
            }
        })
        .collect::<Result<Array1<f64>, _>>()?;

    let scaled = Array2::from_shape_fn((n, n), |(i, j)| a[[i, j]] / (d[i] * d[j]));
    let scale = scaled.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if !scale.is_finite() {
        return Err(MathError::LinearAlgebra("matrix is not finite".to_string()));
    }
    let tolerance = PIVOT_TOLERANCE * scale;

    // Augmented matrix [D⁻¹AD⁻¹ | D⁻¹B]
    let mut aug = Array2::zeros((n, n + m));
    aug.slice_mut(ndarray::s![.., ..n]).assign(&scaled);
    aug.slice_mut(ndarray::s![.., n..]).assign(&(b / &d.view().insert_axis(Axis(1))));

    for col in 0..n {
        // Find pivot
        let mut max_row = col;
        let mut max_val = aug[[col, col]].abs();
        for row in (col + 1)..n {
            if aug[[row, col]].abs() > max_val {
                max_val = aug[[row, col]].abs();
                max_row = row;
            }
        }

        if max_val < tolerance {
            return Err(MathError::LinearAlgebra(
                "matrix is singular or nearly singular".to_string(),
            ));
        }

        // Swap rows
        if max_row != col {
            for j in 0..(n + m) {
                aug.swap([col, j], [max_row, j]);
            }
        }

        let pivot = aug[[col, col]];
        for j in col..(n + m) {
            aug[[col, j]] /= pivot;
        }

        // Eliminate column from every other row
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = aug[[row, col]];
            if factor == 0.0 {
                continue;
            }
            for j in col..(n + m) {
                aug[[row, j]] -= factor * aug[[col, j]];
            }
        }
    }

    // Undo the column scaling: x = D⁻¹(Dx).
    Ok(aug.slice(ndarray::s![.., n..]).to_owned() / &d.insert_axis(Axis(1)))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    fn with_intercept(x: &[f64]) -> Array2<f64> {
        Array2::from_shape_fn((x.len(), 2), |(i, j)| if j == 0 { 1.0 } else { x[i] })
    }

    #[test]
    fn ols_simple_regression() {
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let x = with_intercept(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        let result = ordinary_least_squares(&y, &x).unwrap();

        // Perfect fit: y = 0 + 1*x
        assert_relative_eq!(result.coefficients[0], 0.0, epsilon = 1e-10);
        assert_relative_eq!(result.coefficients[1], 1.0, epsilon = 1e-10);
        assert_relative_eq!(result.r_squared, 1.0, epsilon = 1e-12);
        assert_eq!(result.df_residual, 3);
    }

    #[test]
    fn ols_standard_errors_match_closed_form() {
        // Simple regression: se(b1) = sqrt(s^2 / Sxx)
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = array![1.1, 1.9, 3.2, 3.8, 5.3, 5.9];
        let x = with_intercept(&xs);

        let result = ordinary_least_squares(&y, &x).unwrap();

        let x_mean = xs.iter().sum::<f64>() / 6.0;
        let sxx: f64 = xs.iter().map(|v| (v - x_mean).powi(2)).sum();
        let s2 = result.ss_residual / 4.0;
        assert_relative_eq!(result.standard_errors[1], (s2 / sxx).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(result.sigma_squared, s2, epsilon = 1e-15);
    }

    #[test]
    fn ols_insufficient_observations() {
        let y = array![1.0, 2.0];
        let x = Array2::from_shape_vec((2, 3), vec![1.0, 0.5, 2.0, 1.0, 0.7, 3.0]).unwrap();

        let err = ordinary_least_squares(&y, &x).unwrap_err();
        assert!(matches!(
            err,
            MathError::InsufficientObservations { observations: 2, parameters: 3 }
        ));
    }

    #[test]
    fn ols_collinear_design_is_singular() {
        let y = array![1.0, 2.0, 3.0, 4.0];
        let x = Array2::from_shape_fn((4, 3), |(i, j)| match j {
            0 => 1.0,
            1 => i as f64,
            _ => 2.0 * i as f64,
        });

        assert!(matches!(ordinary_least_squares(&y, &x), Err(MathError::LinearAlgebra(_))));
    }

    #[test]
    fn ols_tolerates_tiny_regressor_scale() {
        // Well conditioned once the columns are put on a common scale.
        let unit: Vec<f64> = (0..10).map(f64::from).collect();
        let tiny: Vec<f64> = unit.iter().map(|v| v * 1e-9).collect();
        let y: Array1<f64> = unit.iter().map(|v| 1.0 + 2.0 * v + (v * 1.3).sin()).collect();

        let result = ordinary_least_squares(&y, &with_intercept(&tiny)).unwrap();
        let reference = ordinary_least_squares(&y, &with_intercept(&unit)).unwrap();

        assert_relative_eq!(
            result.coefficients[0],
            reference.coefficients[0],
            max_relative = 1e-8
        );
        assert_relative_eq!(
            result.coefficients[1],
            reference.coefficients[1] * 1e9,
            max_relative = 1e-8
        );
        assert_relative_eq!(result.r_squared, reference.r_squared, epsilon = 1e-10);
    }

    #[test]
    fn invert_round_trip() {
        let a = array![[4.0, 7.0, 2.0], [3.0, 6.0, 1.0], [2.0, 5.0, 3.0]];
        let inv = invert(&a).unwrap();
        let identity = a.dot(&inv);

        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(identity[[i, j]], expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn solve_requires_square_matrix() {
        let a = Array2::zeros((2, 3));
        let b = array![1.0, 2.0];
        assert!(matches!(solve_linear_system(&a, &b), Err(MathError::LinearAlgebra(_))));
    }
}

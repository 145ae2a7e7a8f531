//! Tail probabilities of reference distributions.

use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, Normal, StudentsT};

use crate::MathError;

/// Two-sided p-value of a t statistic with `df` degrees of freedom.
///
/// # Errors
/// Returns `MathError::Distribution` if `df` is not positive.
pub fn students_t_two_sided(t: f64, df: f64) -> Result<f64, MathError> {
    let dist =
        StudentsT::new(0.0, 1.0, df).map_err(|e| MathError::Distribution(e.to_string()))?;
    if t.is_nan() {
        return Ok(f64::NAN);
    }
    if t.is_infinite() {
        return Ok(0.0);
    }
    Ok((2.0 * dist.sf(t.abs())).min(1.0))
}

/// Upper-tail probability of a chi-squared statistic.
///
/// # Errors
/// Returns `MathError::Distribution` if `df` is not positive.
pub fn chi_squared_sf(x: f64, df: f64) -> Result<f64, MathError> {
    let dist = ChiSquared::new(df).map_err(|e| MathError::Distribution(e.to_string()))?;
    if x.is_nan() {
        return Ok(f64::NAN);
    }
    if x <= 0.0 {
        return Ok(1.0);
    }
    if x.is_infinite() {
        return Ok(0.0);
    }
    Ok(dist.sf(x))
}

/// Upper-tail probability of an F statistic with `(d1, d2)` degrees of freedom.
///
/// # Errors
/// Returns `MathError::Distribution` if either degree of freedom is not positive.
pub fn f_sf(x: f64, d1: f64, d2: f64) -> Result<f64, MathError> {
    let dist = FisherSnedecor::new(d1, d2).map_err(|e| MathError::Distribution(e.to_string()))?;
    if x.is_nan() {
        return Ok(f64::NAN);
    }
    if x <= 0.0 {
        return Ok(1.0);
    }
    if x.is_infinite() {
        return Ok(0.0);
    }
    Ok(dist.sf(x))
}

/// Standard normal cumulative distribution function.
#[must_use]
pub fn normal_cdf(x: f64) -> f64 {
    // Unit normal parameters are always valid.
    Normal::new(0.0, 1.0).map_or(f64::NAN, |n| n.cdf(x))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0.0, 10.0, 1.0)]
    #[case(2.228_138_851_986_274, 10.0, 0.05)]
    #[case(2.042_272_456_301_238, 30.0, 0.05)]
    fn t_two_sided(#[case] t: f64, #[case] df: f64, #[case] expected: f64) {
        assert_relative_eq!(students_t_two_sided(t, df).unwrap(), expected, epsilon = 1e-6);
        assert_relative_eq!(students_t_two_sided(-t, df).unwrap(), expected, epsilon = 1e-6);
    }

    #[test]
    fn chi_squared_critical_value() {
        // 5% critical value of chi2(1) and chi2(2)
        assert_relative_eq!(chi_squared_sf(3.841_458_820_694_124, 1.0).unwrap(), 0.05, epsilon = 1e-8);
        assert_relative_eq!(chi_squared_sf(5.991_464_547_107_979, 2.0).unwrap(), 0.05, epsilon = 1e-8);
        assert_eq!(chi_squared_sf(0.0, 2.0).unwrap(), 1.0);
    }

    #[test]
    fn f_critical_value() {
        // 5% critical value of F(1, 10)
        assert_relative_eq!(f_sf(4.964_602_743_730_716, 1.0, 10.0).unwrap(), 0.05, epsilon = 1e-6);
    }

    #[test]
    fn infinite_statistic() {
        assert_eq!(students_t_two_sided(f64::INFINITY, 5.0).unwrap(), 0.0);
        assert!(students_t_two_sided(1.0, 0.0).is_err());
    }

    #[test]
    fn normal_cdf_values() {
        assert_relative_eq!(normal_cdf(0.0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(normal_cdf(-1.959_963_984_540_054), 0.025, epsilon = 1e-9);
    }
}

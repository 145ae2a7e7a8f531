//! Sample moments.

/// Mean and population central moments of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CentralMoments {
    /// Sample mean.
    pub mean: f64,
    /// Second central moment (divided by n).
    pub m2: f64,
    /// Third central moment (divided by n).
    pub m3: f64,
    /// Fourth central moment (divided by n).
    pub m4: f64,
}

impl CentralMoments {
    /// Moment-based skewness, `m3 / m2^1.5`.
    #[must_use]
    pub fn skewness(&self) -> f64 {
        self.m3 / self.m2.powf(1.5)
    }

    /// Moment-based (non-excess) kurtosis, `m4 / m2^2`.
    #[must_use]
    pub fn kurtosis(&self) -> f64 {
        self.m4 / (self.m2 * self.m2)
    }
}

/// Compute the mean and central moments of `values`.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn central_moments(values: &[f64]) -> Option<CentralMoments> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;

    let (m2, m3, m4) = values.iter().fold((0.0, 0.0, 0.0), |(s2, s3, s4), v| {
        let d = v - mean;
        let d2 = d * d;
        (s2 + d2, s3 + d2 * d, s4 + d2 * d2)
    });

    Some(CentralMoments { mean, m2: m2 / n, m3: m3 / n, m4: m4 / n })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn symmetric_sample_has_zero_skew() {
        let m = central_moments(&[-2.0, -1.0, 0.0, 1.0, 2.0]).unwrap();
        assert_relative_eq!(m.mean, 0.0);
        assert_relative_eq!(m.m2, 2.0);
        assert_relative_eq!(m.skewness(), 0.0);
        // m4 = (16 + 1 + 0 + 1 + 16) / 5
        assert_relative_eq!(m.kurtosis(), 6.8 / 4.0);
    }

    #[test]
    fn empty_sample() {
        assert!(central_moments(&[]).is_none());
    }
}

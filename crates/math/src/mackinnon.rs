//! MacKinnon response surfaces for Dickey-Fuller statistics.
//!
//! P-values follow MacKinnon (1994), "Approximate asymptotic distribution
//! functions for unit-root and cointegration tests". Critical values follow
//! MacKinnon (2010), "Critical values for cointegration tests". Only the
//! single-series (N = 1) surfaces are needed here.

use crate::normal_cdf;

/// Deterministic terms included in a Dickey-Fuller regression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnitRootTrend {
    /// Constant only.
    #[default]
    Constant,
    /// Constant and linear time trend.
    ConstantTrend,
}

struct Surface {
    max_stat: f64,
    min_stat: f64,
    star_stat: f64,
    small_p: [f64; 3],
    large_p: [f64; 4],
    critical: [[f64; 4]; 3],
}

const CONSTANT: Surface = Surface {
    max_stat: 2.74,
    min_stat: -18.83,
    star_stat: -1.61,
    small_p: [2.1659, 1.4412, 0.038_269],
    large_p: [1.7339, 0.932_02, -0.127_45, -0.010_368],
    critical: [
        [-3.430_35, -6.5393, -16.786, -79.433],
        [-2.861_54, -2.8903, -4.234, -40.040],
        [-2.566_77, -1.5384, -2.809, 0.0],
    ],
};

const CONSTANT_TREND: Surface = Surface {
    max_stat: 0.7,
    min_stat: -16.18,
    star_stat: -2.89,
    small_p: [3.2512, 1.6047, 0.049_588],
    large_p: [2.5261, 0.616_54, -0.379_56, -0.060_285],
    critical: [
        [-3.958_77, -9.0531, -28.428, -134.155],
        [-3.410_49, -4.3904, -9.036, -45.374],
        [-3.127_05, -2.5856, -3.925, -22.380],
    ],
};

const fn surface(trend: UnitRootTrend) -> &'static Surface {
    match trend {
        UnitRootTrend::Constant => &CONSTANT,
        UnitRootTrend::ConstantTrend => &CONSTANT_TREND,
    }
}

fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Approximate p-value of a Dickey-Fuller tau statistic.
#[must_use]
pub fn mackinnon_p_value(stat: f64, trend: UnitRootTrend) -> f64 {
    let s = surface(trend);
    if stat.is_nan() {
        return f64::NAN;
    }
    if stat > s.max_stat {
        return 1.0;
    }
    if stat < s.min_stat {
        return 0.0;
    }
    let z = if stat <= s.star_stat { polyval(&s.small_p, stat) } else { polyval(&s.large_p, stat) };
    normal_cdf(z)
}

/// Finite-sample 1%, 5% and 10% critical values for `nobs` observations.
#[must_use]
pub fn mackinnon_critical_values(nobs: usize, trend: UnitRootTrend) -> [f64; 3] {
    let s = surface(trend);
    let inv = 1.0 / nobs.max(1) as f64;
    [polyval(&s.critical[0], inv), polyval(&s.critical[1], inv), polyval(&s.critical[2], inv)]
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn p_value_is_monotone_in_statistic() {
        let mut last = 0.0;
        for i in 0..200 {
            let stat = -10.0 + 0.06 * i as f64;
            let p = mackinnon_p_value(stat, UnitRootTrend::Constant);
            assert!(p >= last - 1e-12, "p-value decreased at {stat}");
            last = p;
        }
    }

    #[test]
    fn p_value_near_five_percent_at_asymptotic_critical_value() {
        let p = mackinnon_p_value(-2.86, UnitRootTrend::Constant);
        assert_relative_eq!(p, 0.05, epsilon = 0.005);

        let p = mackinnon_p_value(-3.41, UnitRootTrend::ConstantTrend);
        assert_relative_eq!(p, 0.05, epsilon = 0.005);
    }

    #[test]
    fn p_value_clamps_outside_surface() {
        assert_eq!(mackinnon_p_value(5.0, UnitRootTrend::Constant), 1.0);
        assert_eq!(mackinnon_p_value(-30.0, UnitRootTrend::Constant), 0.0);
    }

    #[test]
    fn critical_values_approach_asymptotic() {
        let cv = mackinnon_critical_values(1_000_000, UnitRootTrend::Constant);
        assert_relative_eq!(cv[1], -2.861_54, epsilon = 1e-4);

        let small = mackinnon_critical_values(100, UnitRootTrend::Constant);
        assert!(small[0] < small[1] && small[1] < small[2]);
    }
}

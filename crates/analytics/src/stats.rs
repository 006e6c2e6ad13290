//! Small numeric helpers shared by the engines.
//!
//! Rounding follows the dataframe convention the output contract was defined
//! with: scale by `10^dp`, round half to even, scale back.

/// Rounds `value` to `dp` decimal places, ties to even.
pub fn round_dp(value: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (value * factor).round_ties_even() / factor
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (ddof = 1). Undefined below two observations.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Quantile with linear interpolation between the two closest ranks.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Pearson correlation of paired observations.
///
/// `None` with fewer than two pairs or when either side has zero variance.
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 {
        return None;
    }
    Some((cov / denominator).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    #[case(-18.181818, 2, -18.18)]
    #[case(0.125, 2, 0.12)]
    #[case(0.135, 2, 0.14)]
    #[case(0.0031623, 5, 0.00316)]
    #[case(2.5, 0, 2.0)]
    fn test_round_dp(#[case] value: f64, #[case] dp: i32, #[case] expected: f64) {
        assert_eq!(round_dp(value, dp), expected);
    }

    #[test]
    fn test_sample_std_uses_n_minus_one() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_abs_diff_eq!(sample_std(&values).unwrap(), 2.138089935, epsilon = 1e-9);
        assert_eq!(sample_std(&[1.0]), None);
    }

    #[test]
    fn test_quantile_interpolates_linearly() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_abs_diff_eq!(quantile(&values, 0.5).unwrap(), 2.5);
        assert_abs_diff_eq!(quantile(&values, 0.01).unwrap(), 1.03, epsilon = 1e-12);
        assert_abs_diff_eq!(quantile(&values, 0.99).unwrap(), 3.97, epsilon = 1e-12);
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn test_pearson_edge_cases() {
        let pairs = [(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)];
        assert_abs_diff_eq!(pearson(&pairs).unwrap(), 1.0, epsilon = 1e-12);

        let inverse = [(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)];
        assert_abs_diff_eq!(pearson(&inverse).unwrap(), -1.0, epsilon = 1e-12);

        let flat = [(1.0, 5.0), (2.0, 5.0), (3.0, 5.0)];
        assert_eq!(pearson(&flat), None);
        assert_eq!(pearson(&[(1.0, 1.0)]), None);
    }

    #[test]
    fn test_min_max_mean() {
        let values = [0.01, -0.02, 0.03];
        assert_eq!(min(&values), Some(-0.02));
        assert_eq!(max(&values), Some(0.03));
        assert_abs_diff_eq!(mean(&values).unwrap(), 0.006666666, epsilon = 1e-8);
        assert_eq!(mean(&[]), None);
    }
}

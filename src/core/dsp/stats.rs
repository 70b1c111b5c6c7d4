//! Small statistics helpers shared by the analyzer, the report and the tests

/// Arithmetic mean; `0.0` for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Index of the largest finite value.
pub fn argmax(data: &[f64]) -> Option<usize> {
    data.iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
}

/// Convert power to dB (relative to 1.0)
pub fn power_to_db(power: f64) -> f64 {
    if power > 1e-300 {
        10.0 * power.log10()
    } else {
        -3000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_basic_stats() {
        let x = [1.0, -3.0, 2.0];
        assert_abs_diff_eq!(mean(&x), 0.0, epsilon = 1e-15);
        assert_eq!(argmax(&x), Some(2));
        assert_eq!(argmax(&[]), None);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_power_to_db() {
        assert_abs_diff_eq!(power_to_db(100.0), 20.0, epsilon = 1e-12);
        assert_eq!(power_to_db(0.0), -3000.0);
    }
}

//! Pearson correlation between paired samples

use crate::descriptive::mean;

/// Pearson product-moment correlation coefficient of paired samples.
///
/// Returns `None` when the inputs differ in length, hold fewer than two
/// pairs, or either side has zero variance (the coefficient is undefined).
///
/// # Examples
///
/// ```
/// use healthconnect_stats::correlation::pearson;
///
/// let x = [1.0, 2.0, 3.0, 4.0];
/// let y = [2.0, 4.0, 6.0, 8.0];
/// assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);
///
/// let flat = [1.0, 1.0, 1.0, 1.0];
/// assert_eq!(pearson(&x, &flat), None);
/// ```
#[must_use]
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mean_x = mean(xs.iter().copied())?;
    let mean_y = mean(ys.iter().copied())?;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(covariance / (var_x * var_y).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_negative_correlation() {
        let r = pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_hand_computed_value() {
        // dx = [-1.5, -0.5, 0.5, 1.5], dy = [-1, 1, -1, 1]
        // cov = 1.5 - 0.5 - 0.5 + 1.5 = 2, var_x = 5, var_y = 4
        let r = pearson(&[1.0, 2.0, 3.0, 4.0], &[0.0, 2.0, 0.0, 2.0]).unwrap();
        assert!((r - 2.0 / 20.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_undefined_inputs() {
        assert_eq!(pearson(&[1.0], &[1.0]), None);
        assert_eq!(pearson(&[1.0, 2.0], &[1.0]), None);
    }
}

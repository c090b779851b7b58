//! Numerical integration over sampled curves.

use crate::{Result, error::RModularityError};

/// Integrates `ys` over `xs` with the trapezoid rule.
///
/// `xs` must be non-decreasing for the result to be an area; fewer than two
/// points integrate to zero.
///
/// # Errors
/// Returns [`RModularityError::InvalidParameters`] when the slices differ in
/// length.
///
/// # Examples
/// ```
/// use rmodularity_core::trapezoid;
///
/// let area = trapezoid(&[0.0, 0.5, 1.0], &[0.0, 1.0, 1.0])?;
/// assert!((area - 0.75).abs() < f64::EPSILON);
/// # Ok::<(), rmodularity_core::RModularityError>(())
/// ```
pub fn trapezoid(xs: &[f64], ys: &[f64]) -> Result<f64> {
    if xs.len() != ys.len() {
        return Err(RModularityError::invalid_parameters(format!(
            "trapezoid needs one ordinate per abscissa ({} vs {})",
            xs.len(),
            ys.len()
        )));
    }
    Ok(xs
        .windows(2)
        .zip(ys.windows(2))
        .map(|(x, y)| (x[1] - x[0]) * (y[0] + y[1]) / 2.0)
        .sum())
}

/// `count` evenly spaced points covering `[0, 1]` inclusive.
///
/// # Examples
/// ```
/// use rmodularity_core::linspace;
///
/// assert_eq!(linspace(5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
/// assert_eq!(linspace(1), vec![0.0]);
/// ```
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    reason = "grid resolutions are far below the f64 mantissa limit"
)]
pub fn linspace(count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let last = (count - 1) as f64;
            (0..count).map(|index| index as f64 / last).collect()
        }
    }
}

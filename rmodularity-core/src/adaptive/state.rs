//! Running state threaded through the adaptive estimators.

use std::num::NonZeroUsize;

use crate::{Result, integrate::trapezoid, trial::TrivialTally};

/// Below this magnitude an estimate counts as zero and changes are measured
/// absolutely.
const ZERO_ESTIMATE: f64 = 1e-12;

/// Relative change from `previous` to `current`, or the absolute change when
/// `previous` is approximately zero.
///
/// # Examples
/// ```
/// use rmodularity_core::relative_change;
///
/// assert!((relative_change(0.5, 0.55) - 0.1).abs() < 1e-12);
/// assert!((relative_change(0.0, 0.01) - 0.01).abs() < 1e-12);
/// ```
#[must_use]
pub fn relative_change(previous: f64, current: f64) -> f64 {
    let delta = (current - previous).abs();
    if previous.abs() < ZERO_ESTIMATE {
        delta
    } else {
        delta / previous.abs()
    }
}

/// Stability tracker for a sequence of estimates, plus the probability
/// interval still being searched.
///
/// Every step consumes the state and returns the next one.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use rmodularity_core::ConvergenceState;
///
/// let required = NonZeroUsize::new(2).expect("non-zero");
/// let state = ConvergenceState::new()
///     .observe(0.40, 0.01)
///     .observe(0.401, 0.01)
///     .observe(0.4012, 0.01);
/// assert!(state.is_stable(required));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConvergenceState {
    last_estimate: Option<f64>,
    consecutive_stable: usize,
    probability_range: (f64, f64),
}

impl Default for ConvergenceState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvergenceState {
    /// Fresh state over the full interval `[0, 1]`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_estimate: None,
            consecutive_stable: 0,
            probability_range: (0.0, 1.0),
        }
    }

    /// Replaces the searched interval.
    #[must_use]
    pub fn with_range(mut self, low: f64, high: f64) -> Self {
        self.probability_range = (low, high);
        self
    }

    /// Records `estimate`. The stability streak grows when its change from the
    /// previous estimate is below `tolerance` and resets otherwise.
    #[must_use]
    pub fn observe(mut self, estimate: f64, tolerance: f64) -> Self {
        self.consecutive_stable = match self.last_estimate {
            Some(previous) if relative_change(previous, estimate) < tolerance => {
                self.consecutive_stable + 1
            }
            _ => 0,
        };
        self.last_estimate = Some(estimate);
        self
    }

    /// Clears the stability streak but keeps the last estimate.
    #[must_use]
    pub fn restart_streak(mut self) -> Self {
        self.consecutive_stable = 0;
        self
    }

    /// Whether at least `required` consecutive stable estimates were seen.
    #[must_use]
    pub fn is_stable(&self, required: NonZeroUsize) -> bool {
        self.consecutive_stable >= required.get()
    }

    /// Most recent estimate.
    #[must_use]
    #[rustfmt::skip]
    pub fn last_estimate(&self) -> Option<f64> { self.last_estimate }

    /// Length of the current stability streak.
    #[must_use]
    #[rustfmt::skip]
    pub fn consecutive_stable(&self) -> usize { self.consecutive_stable }

    /// Interval `(low, high)` still being searched.
    #[must_use]
    #[rustfmt::skip]
    pub fn probability_range(&self) -> (f64, f64) { self.probability_range }

    /// Whether the next bisection step would move `high` by less than
    /// `coarse_error` relative to its current value.
    pub(crate) fn coarse_converged(&self, coarse_error: f64) -> bool {
        let (low, high) = self.probability_range;
        (high - low) / high < coarse_error
    }
}

/// Trivial and total run counts observed at one probability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurvePoint {
    /// Rewiring probability.
    pub probability: f64,
    /// Trivial runs recorded at `probability`.
    pub trivial: usize,
    /// Total runs recorded at `probability`.
    pub runs: usize,
}

impl CurvePoint {
    pub(crate) fn from_tally(probability: f64, tally: TrivialTally) -> Self {
        Self {
            probability,
            trivial: tally.trivial,
            runs: tally.runs,
        }
    }

    fn tally(self) -> TrivialTally {
        TrivialTally {
            trivial: self.trivial,
            runs: self.runs,
        }
    }

    /// Trivial partition ratio at this point.
    #[must_use]
    pub fn tpr(&self) -> f64 {
        self.tally().ratio()
    }
}

/// TPR samples kept sorted by probability.
///
/// Inserting at a probability that is already present merges the counts.
///
/// # Examples
/// ```
/// use rmodularity_core::{CurveAccumulator, CurvePoint};
///
/// let mut curve = CurveAccumulator::default();
/// curve.insert(CurvePoint { probability: 1.0, trivial: 4, runs: 4 });
/// curve.insert(CurvePoint { probability: 0.0, trivial: 0, runs: 4 });
/// curve.insert(CurvePoint { probability: 0.5, trivial: 2, runs: 4 });
/// assert!((curve.estimate()? - 0.5).abs() < 1e-12);
/// # Ok::<(), rmodularity_core::RModularityError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CurveAccumulator {
    points: Vec<CurvePoint>,
}

impl CurveAccumulator {
    /// Adds `point`, merging it into an existing point at the same probability.
    pub fn insert(&mut self, point: CurvePoint) {
        match self
            .points
            .binary_search_by(|probe| probe.probability.total_cmp(&point.probability))
        {
            Ok(index) => {
                let existing = &mut self.points[index];
                existing.trivial += point.trivial;
                existing.runs += point.runs;
            }
            Err(index) => self.points.insert(index, point),
        }
    }

    /// Points in increasing probability order.
    #[must_use]
    #[rustfmt::skip]
    pub fn points(&self) -> &[CurvePoint] { &self.points }

    /// Area under the TPR curve spanned by the recorded points.
    ///
    /// # Errors
    /// Never fails for a curve built through [`CurveAccumulator::insert`]; the
    /// signature follows [`trapezoid`].
    pub fn integral(&self) -> Result<f64> {
        let probabilities = self.points.iter().map(|point| point.probability).collect::<Vec<_>>();
        let tpr = self.points.iter().map(CurvePoint::tpr).collect::<Vec<_>>();
        trapezoid(&probabilities, &tpr)
    }

    /// `1 - integral`, the Robustness Modularity implied by the curve.
    ///
    /// # Errors
    /// See [`CurveAccumulator::integral`].
    pub fn estimate(&self) -> Result<f64> {
        Ok(1.0 - self.integral()?)
    }

    /// Consumes the accumulator, returning its points.
    #[must_use]
    pub fn into_points(self) -> Vec<CurvePoint> {
        self.points
    }
}

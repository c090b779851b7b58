//! Validated configuration for the estimators.
//!
//! Counts are stored as [`NonZeroUsize`] once accepted, so the estimators
//! never see an empty batch.

use std::num::NonZeroUsize;

use crate::{Result, error::RModularityError, executor::ExecutionStrategy};

/// Non-zero count usable in constant position.
const fn count(value: usize) -> NonZeroUsize {
    NonZeroUsize::MIN.saturating_add(value - 1)
}

fn non_zero(name: &str, value: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(value).ok_or_else(|| {
        RModularityError::invalid_parameters(format!("{name} must be greater than zero"))
    })
}

fn tolerance(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(RModularityError::invalid_parameters(format!(
            "{name} must be a positive finite number (got {value})"
        )))
    }
}

/// Parameters of the fixed-grid estimator.
///
/// # Examples
/// ```
/// use rmodularity_core::GridParams;
///
/// let params = GridParams::new(10, 2, 11)?.with_output_curves(true);
/// assert_eq!(params.rewire_resolution().get(), 11);
/// assert!(params.output_curves());
/// # Ok::<(), rmodularity_core::RModularityError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct GridParams {
    perturbation_count: NonZeroUsize,
    detection_trials: NonZeroUsize,
    rewire_resolution: NonZeroUsize,
    output_curves: bool,
    degree_corrected: bool,
    execution: ExecutionStrategy,
}

impl GridParams {
    const DEFAULT_PERTURBATION_COUNT: NonZeroUsize = count(25);
    const DEFAULT_DETECTION_TRIALS: NonZeroUsize = count(1);
    const DEFAULT_REWIRE_RESOLUTION: NonZeroUsize = count(51);

    /// Creates grid parameters with explicit sampling counts.
    ///
    /// # Errors
    /// Returns [`RModularityError::InvalidParameters`] when a count is zero or
    /// when `rewire_resolution` is below two, which would leave no interval to
    /// integrate over.
    pub fn new(
        perturbation_count: usize,
        detection_trials: usize,
        rewire_resolution: usize,
    ) -> Result<Self> {
        let perturbation_count = non_zero("perturbation_count", perturbation_count)?;
        let detection_trials = non_zero("detection_trials", detection_trials)?;
        if rewire_resolution < 2 {
            return Err(RModularityError::invalid_parameters(format!(
                "rewire_resolution must be at least 2 (got {rewire_resolution})"
            )));
        }
        Ok(Self {
            perturbation_count,
            detection_trials,
            rewire_resolution: non_zero("rewire_resolution", rewire_resolution)?,
            ..Self::default()
        })
    }

    /// Also return the TPR and description-length curves.
    #[must_use]
    pub fn with_output_curves(mut self, output_curves: bool) -> Self {
        self.output_curves = output_curves;
        self
    }

    /// Selects the degree-corrected block model.
    #[must_use]
    pub fn with_degree_corrected(mut self, degree_corrected: bool) -> Self {
        self.degree_corrected = degree_corrected;
        self
    }

    /// Selects how trials are executed.
    #[must_use]
    pub fn with_execution(mut self, execution: ExecutionStrategy) -> Self {
        self.execution = execution;
        self
    }

    /// Perturbed networks drawn per probability.
    #[must_use]
    #[rustfmt::skip]
    pub fn perturbation_count(&self) -> NonZeroUsize { self.perturbation_count }

    /// Detector runs per perturbed network.
    #[must_use]
    #[rustfmt::skip]
    pub fn detection_trials(&self) -> NonZeroUsize { self.detection_trials }

    /// Number of grid points over `[0, 1]`.
    #[must_use]
    #[rustfmt::skip]
    pub fn rewire_resolution(&self) -> NonZeroUsize { self.rewire_resolution }

    /// Whether curves are returned alongside the estimate.
    #[must_use]
    #[rustfmt::skip]
    pub fn output_curves(&self) -> bool { self.output_curves }

    /// Whether the degree-corrected block model is requested.
    #[must_use]
    #[rustfmt::skip]
    pub fn degree_corrected(&self) -> bool { self.degree_corrected }

    /// Execution strategy for the trials.
    #[must_use]
    #[rustfmt::skip]
    pub fn execution(&self) -> ExecutionStrategy { self.execution }
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            perturbation_count: Self::DEFAULT_PERTURBATION_COUNT,
            detection_trials: Self::DEFAULT_DETECTION_TRIALS,
            rewire_resolution: Self::DEFAULT_REWIRE_RESOLUTION,
            output_curves: false,
            degree_corrected: true,
            execution: ExecutionStrategy::default(),
        }
    }
}

/// Parameters of the adaptive estimators.
///
/// # Examples
/// ```
/// use rmodularity_core::AdaptiveParams;
///
/// let params = AdaptiveParams::new(20, 1)?
///     .with_fine_error(0.005)?
///     .with_coarse_step(false);
/// assert!(!params.use_coarse_step());
/// assert_eq!(params.min_similar_trials().get(), 2);
/// # Ok::<(), rmodularity_core::RModularityError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct AdaptiveParams {
    perturbation_count: NonZeroUsize,
    detection_trials: NonZeroUsize,
    use_coarse_step: bool,
    fine_error: f64,
    coarse_error: f64,
    min_similar_trials: NonZeroUsize,
    max_coarse_iterations: NonZeroUsize,
    max_fine_batches: NonZeroUsize,
    degree_corrected: bool,
    execution: ExecutionStrategy,
}

impl AdaptiveParams {
    const DEFAULT_PERTURBATION_COUNT: NonZeroUsize = count(25);
    const DEFAULT_DETECTION_TRIALS: NonZeroUsize = count(1);
    const DEFAULT_FINE_ERROR: f64 = 0.01;
    const DEFAULT_COARSE_ERROR: f64 = 0.02;
    const DEFAULT_MIN_SIMILAR_TRIALS: NonZeroUsize = count(2);
    const DEFAULT_MAX_COARSE_ITERATIONS: NonZeroUsize = count(64);
    const DEFAULT_MAX_FINE_BATCHES: NonZeroUsize = count(1000);

    /// Creates adaptive parameters with explicit batch sizes.
    ///
    /// # Errors
    /// Returns [`RModularityError::InvalidParameters`] when a count is zero.
    pub fn new(perturbation_count: usize, detection_trials: usize) -> Result<Self> {
        Ok(Self {
            perturbation_count: non_zero("perturbation_count", perturbation_count)?,
            detection_trials: non_zero("detection_trials", detection_trials)?,
            ..Self::default()
        })
    }

    /// Enables or disables the bisection search for the plateau boundary.
    #[must_use]
    pub fn with_coarse_step(mut self, use_coarse_step: bool) -> Self {
        self.use_coarse_step = use_coarse_step;
        self
    }

    /// Relative change between batches considered stable.
    ///
    /// # Errors
    /// Returns [`RModularityError::InvalidParameters`] unless `fine_error` is
    /// positive and finite.
    pub fn with_fine_error(mut self, fine_error: f64) -> Result<Self> {
        self.fine_error = tolerance("fine_error", fine_error)?;
        Ok(self)
    }

    /// Relative width of the bisection interval at which the search stops.
    ///
    /// # Errors
    /// Returns [`RModularityError::InvalidParameters`] unless `coarse_error`
    /// is positive and finite.
    pub fn with_coarse_error(mut self, coarse_error: f64) -> Result<Self> {
        self.coarse_error = tolerance("coarse_error", coarse_error)?;
        Ok(self)
    }

    /// Consecutive stable batches required to stop.
    ///
    /// # Errors
    /// Returns [`RModularityError::InvalidParameters`] when zero.
    pub fn with_min_similar_trials(mut self, min_similar_trials: usize) -> Result<Self> {
        self.min_similar_trials = non_zero("min_similar_trials", min_similar_trials)?;
        Ok(self)
    }

    /// Upper bound on bisection steps.
    ///
    /// # Errors
    /// Returns [`RModularityError::InvalidParameters`] when zero.
    pub fn with_max_coarse_iterations(mut self, max_coarse_iterations: usize) -> Result<Self> {
        self.max_coarse_iterations = non_zero("max_coarse_iterations", max_coarse_iterations)?;
        Ok(self)
    }

    /// Upper bound on refinement batches.
    ///
    /// # Errors
    /// Returns [`RModularityError::InvalidParameters`] when zero.
    pub fn with_max_fine_batches(mut self, max_fine_batches: usize) -> Result<Self> {
        self.max_fine_batches = non_zero("max_fine_batches", max_fine_batches)?;
        Ok(self)
    }

    /// Selects the degree-corrected block model.
    #[must_use]
    pub fn with_degree_corrected(mut self, degree_corrected: bool) -> Self {
        self.degree_corrected = degree_corrected;
        self
    }

    /// Selects how trials are executed.
    #[must_use]
    pub fn with_execution(mut self, execution: ExecutionStrategy) -> Self {
        self.execution = execution;
        self
    }

    /// Tasks per refinement batch.
    #[must_use]
    #[rustfmt::skip]
    pub fn perturbation_count(&self) -> NonZeroUsize { self.perturbation_count }

    /// Detector runs per perturbed network.
    #[must_use]
    #[rustfmt::skip]
    pub fn detection_trials(&self) -> NonZeroUsize { self.detection_trials }

    /// Whether the plateau boundary is searched by bisection.
    #[must_use]
    #[rustfmt::skip]
    pub fn use_coarse_step(&self) -> bool { self.use_coarse_step }

    /// Stability tolerance of the refinement phase.
    #[must_use]
    #[rustfmt::skip]
    pub fn fine_error(&self) -> f64 { self.fine_error }

    /// Stopping tolerance of the bisection.
    #[must_use]
    #[rustfmt::skip]
    pub fn coarse_error(&self) -> f64 { self.coarse_error }

    /// Consecutive stable batches required to stop.
    #[must_use]
    #[rustfmt::skip]
    pub fn min_similar_trials(&self) -> NonZeroUsize { self.min_similar_trials }

    /// Upper bound on bisection steps.
    #[must_use]
    #[rustfmt::skip]
    pub fn max_coarse_iterations(&self) -> NonZeroUsize { self.max_coarse_iterations }

    /// Upper bound on refinement batches.
    #[must_use]
    #[rustfmt::skip]
    pub fn max_fine_batches(&self) -> NonZeroUsize { self.max_fine_batches }

    /// Whether the degree-corrected block model is requested.
    #[must_use]
    #[rustfmt::skip]
    pub fn degree_corrected(&self) -> bool { self.degree_corrected }

    /// Execution strategy for the trials.
    #[must_use]
    #[rustfmt::skip]
    pub fn execution(&self) -> ExecutionStrategy { self.execution }
}

impl Default for AdaptiveParams {
    fn default() -> Self {
        Self {
            perturbation_count: Self::DEFAULT_PERTURBATION_COUNT,
            detection_trials: Self::DEFAULT_DETECTION_TRIALS,
            use_coarse_step: true,
            fine_error: Self::DEFAULT_FINE_ERROR,
            coarse_error: Self::DEFAULT_COARSE_ERROR,
            min_similar_trials: Self::DEFAULT_MIN_SIMILAR_TRIALS,
            max_coarse_iterations: Self::DEFAULT_MAX_COARSE_ITERATIONS,
            max_fine_batches: Self::DEFAULT_MAX_FINE_BATCHES,
            degree_corrected: true,
            execution: ExecutionStrategy::default(),
        }
    }
}

/// Parameters of the null-model comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NullModelParams {
    nullmodel_count: NonZeroUsize,
    detection_trials: NonZeroUsize,
    detection_trials_null_model: NonZeroUsize,
    execution: ExecutionStrategy,
}

impl NullModelParams {
    const DEFAULT_NULLMODEL_COUNT: NonZeroUsize = count(100);
    const DEFAULT_DETECTION_TRIALS: NonZeroUsize = count(100);
    const DEFAULT_DETECTION_TRIALS_NULL_MODEL: NonZeroUsize = count(10);

    /// Creates null-model parameters.
    ///
    /// `detection_trials` applies to the observed network and
    /// `detection_trials_null_model` to each null-model realisation.
    ///
    /// # Errors
    /// Returns [`RModularityError::InvalidParameters`] when a count is zero.
    pub fn new(
        nullmodel_count: usize,
        detection_trials: usize,
        detection_trials_null_model: usize,
    ) -> Result<Self> {
        Ok(Self {
            nullmodel_count: non_zero("nullmodel_count", nullmodel_count)?,
            detection_trials: non_zero("detection_trials", detection_trials)?,
            detection_trials_null_model: non_zero(
                "detection_trials_null_model",
                detection_trials_null_model,
            )?,
            execution: ExecutionStrategy::default(),
        })
    }

    /// Selects how realisations are executed.
    #[must_use]
    pub fn with_execution(mut self, execution: ExecutionStrategy) -> Self {
        self.execution = execution;
        self
    }

    /// Number of null-model realisations.
    #[must_use]
    #[rustfmt::skip]
    pub fn nullmodel_count(&self) -> NonZeroUsize { self.nullmodel_count }

    /// Detector runs on the observed network.
    #[must_use]
    #[rustfmt::skip]
    pub fn detection_trials(&self) -> NonZeroUsize { self.detection_trials }

    /// Detector runs on each realisation.
    #[must_use]
    #[rustfmt::skip]
    pub fn detection_trials_null_model(&self) -> NonZeroUsize { self.detection_trials_null_model }

    /// Execution strategy for the realisations.
    #[must_use]
    #[rustfmt::skip]
    pub fn execution(&self) -> ExecutionStrategy { self.execution }
}

impl Default for NullModelParams {
    fn default() -> Self {
        Self {
            nullmodel_count: Self::DEFAULT_NULLMODEL_COUNT,
            detection_trials: Self::DEFAULT_DETECTION_TRIALS,
            detection_trials_null_model: Self::DEFAULT_DETECTION_TRIALS_NULL_MODEL,
            execution: ExecutionStrategy::default(),
        }
    }
}

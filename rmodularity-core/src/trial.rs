//! One perturbation followed by repeated detection.
//!
//! A [`SampleTask`] is the unit of parallel work: every estimator expresses
//! its sampling as a list of tasks that a [`TrialRunner`] hands to the
//! executor.

use std::{num::NonZeroUsize, sync::Arc};

use rand::Rng;

use crate::{
    Result,
    detector::{BlockModelDetector, DetectionRequest, detect_blocks},
    executor::TrialExecutor,
    network::Network,
    perturbation::{perturb, validate_probability},
};

/// Self-contained description of one perturbation trial.
#[derive(Clone, Debug)]
pub struct SampleTask {
    network: Arc<Network>,
    probability: f64,
    detection_trials: NonZeroUsize,
}

impl SampleTask {
    /// Creates a task rewiring `network` at `probability` and detecting
    /// `detection_trials` times.
    ///
    /// # Errors
    /// Returns [`crate::RModularityError::InvalidProbability`] when
    /// `probability` is not within `[0, 1]`.
    pub fn new(
        network: Arc<Network>,
        probability: f64,
        detection_trials: NonZeroUsize,
    ) -> Result<Self> {
        validate_probability(probability)?;
        Ok(Self {
            network,
            probability,
            detection_trials,
        })
    }

    /// Network to perturb.
    #[must_use]
    #[rustfmt::skip]
    pub fn network(&self) -> &Network { &self.network }

    /// Rewiring probability.
    #[must_use]
    #[rustfmt::skip]
    pub fn probability(&self) -> f64 { self.probability }

    /// Number of detector runs on the perturbed network.
    #[must_use]
    #[rustfmt::skip]
    pub fn detection_trials(&self) -> NonZeroUsize { self.detection_trials }
}

/// Summary of a single detector run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trial {
    /// Number of distinct blocks in the assignment.
    pub block_count: usize,
    /// Description length of the detected partition.
    pub dl_detected: f64,
    /// Description length of the single-block partition.
    pub dl_trivial: f64,
}

impl Trial {
    /// Whether the run collapsed to one block.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.block_count == 1
    }
}

/// Result of one [`SampleTask`].
#[derive(Clone, Debug, PartialEq)]
pub struct TrialOutcome {
    /// Number of trivial runs.
    pub trivial_count: usize,
    /// Every detector run, in execution order.
    pub trials: Vec<Trial>,
}

/// Perturbs the task's network, reduces it to its giant component and runs
/// the detector `detection_trials` times on the result.
///
/// The perturbed component may shrink to one node; it is still passed to the
/// detector, and a one-node assignment counts as trivial.
///
/// # Errors
/// Propagates rewiring errors and wraps detector failures as
/// [`crate::RModularityError::Detector`].
pub fn run_trial<D, R>(
    task: &SampleTask,
    detector: &D,
    degree_corrected: bool,
    rng: &mut R,
) -> Result<TrialOutcome>
where
    D: BlockModelDetector + ?Sized,
    R: Rng + ?Sized,
{
    let perturbed = perturb(task.network(), task.probability, rng)?.giant_component();
    let request =
        DetectionRequest::new(&perturbed, degree_corrected).with_probability(task.probability);

    let trials = (0..task.detection_trials.get())
        .map(|_| {
            let partition = detect_blocks(detector, &request)?;
            Ok(Trial {
                block_count: partition.block_count(),
                dl_detected: partition.dl_detected(),
                dl_trivial: partition.dl_trivial(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let trivial_count = trials.iter().filter(|trial| trial.is_trivial()).count();
    Ok(TrialOutcome { trivial_count, trials })
}

/// Trivial and total run counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TrivialTally {
    pub(crate) trivial: usize,
    pub(crate) runs: usize,
}

impl TrivialTally {
    pub(crate) fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a TrialOutcome>) -> Self {
        outcomes.into_iter().fold(Self::default(), |tally, outcome| {
            tally.add(Self {
                trivial: outcome.trivial_count,
                runs: outcome.trials.len(),
            })
        })
    }

    #[must_use]
    pub(crate) fn add(self, other: Self) -> Self {
        Self {
            trivial: self.trivial + other.trivial,
            runs: self.runs + other.runs,
        }
    }

    /// Trivial partition ratio. Zero when no run was recorded.
    #[expect(
        clippy::cast_precision_loss,
        reason = "run counts are far below the f64 mantissa limit"
    )]
    pub(crate) fn ratio(self) -> f64 {
        if self.runs == 0 {
            0.0
        } else {
            self.trivial as f64 / self.runs as f64
        }
    }

    /// Whether every recorded run was trivial.
    pub(crate) fn is_all_trivial(self) -> bool {
        self.runs > 0 && self.trivial == self.runs
    }
}

/// Binds a detector and a reduced network to an executor.
pub(crate) struct TrialRunner<'a, D: ?Sized> {
    executor: &'a TrialExecutor,
    detector: &'a D,
    network: Arc<Network>,
    detection_trials: NonZeroUsize,
    degree_corrected: bool,
}

impl<'a, D: BlockModelDetector + ?Sized> TrialRunner<'a, D> {
    pub(crate) fn new(
        executor: &'a TrialExecutor,
        detector: &'a D,
        network: Arc<Network>,
        detection_trials: NonZeroUsize,
        degree_corrected: bool,
    ) -> Self {
        Self {
            executor,
            detector,
            network,
            detection_trials,
            degree_corrected,
        }
    }

    /// Runs one task per probability and returns the outcomes in input order.
    pub(crate) fn run_batch(&self, probabilities: &[f64]) -> Result<Vec<TrialOutcome>> {
        let tasks = probabilities
            .iter()
            .map(|&probability| {
                SampleTask::new(Arc::clone(&self.network), probability, self.detection_trials)
            })
            .collect::<Result<Vec<_>>>()?;
        let detector = self.detector;
        let degree_corrected = self.degree_corrected;
        self.executor
            .dispatch(tasks, |task, rng| run_trial(&task, detector, degree_corrected, rng))
    }

    /// Tally of `repetitions` tasks at a single probability.
    pub(crate) fn tally_at(
        &self,
        probability: f64,
        repetitions: NonZeroUsize,
    ) -> Result<TrivialTally> {
        let outcomes = self.run_batch(&vec![probability; repetitions.get()])?;
        Ok(TrivialTally::from_outcomes(&outcomes))
    }

    /// Tally of one task per probability.
    pub(crate) fn tally_each(&self, probabilities: &[f64]) -> Result<TrivialTally> {
        let outcomes = self.run_batch(probabilities)?;
        Ok(TrivialTally::from_outcomes(&outcomes))
    }
}

//! Error types for the robustness-modularity core library.
//!
//! Defines the error enums exposed by the public API, the stable codes used
//! for logging, and a convenient result alias.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::executor::ExecutionStrategy;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Which of the two description lengths reported by a detector is meant.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DescriptionLength {
    /// Description length of the partition the detector found.
    Detected,
    /// Description length of the single-block partition.
    Trivial,
}

impl fmt::Display for DescriptionLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detected => f.write_str("detected"),
            Self::Trivial => f.write_str("trivial"),
        }
    }
}

/// An error raised by a community detector or by validating its output.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DetectorError {
    /// The detector itself reported a failure.
    #[error("detector failed: {message}")]
    Failed {
        /// Message supplied by the detector.
        message: Arc<str>,
    },
    /// The block assignment did not cover every node exactly once.
    #[error("block assignment has length {got} but the network has {expected} nodes")]
    AssignmentLengthMismatch {
        /// Number of nodes in the network handed to the detector.
        expected: usize,
        /// Length of the returned assignment.
        got: usize,
    },
    /// A description length was NaN or infinite.
    #[error("{which} description length is not finite ({value})")]
    NonFiniteDescriptionLength {
        /// Which description length was malformed.
        which: DescriptionLength,
        /// The offending value.
        value: f64,
    },
    /// A modularity score was NaN or infinite.
    #[error("modularity score is not finite ({value})")]
    NonFiniteModularity {
        /// The offending value.
        value: f64,
    },
    /// The single-block description length was zero, so no ratio exists.
    #[error("trivial description length is zero")]
    ZeroTrivialLength,
}

impl DetectorError {
    /// Builds a [`DetectorError::Failed`] from any message.
    ///
    /// # Examples
    /// ```
    /// use rmodularity_core::DetectorError;
    ///
    /// let err = DetectorError::failed("solver diverged");
    /// assert_eq!(err.to_string(), "detector failed: solver diverged");
    /// ```
    #[must_use]
    pub fn failed(message: impl Into<Arc<str>>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

define_error_codes! {
    /// Stable codes describing [`DetectorError`] variants.
    enum DetectorErrorCode for DetectorError {
        /// The detector itself reported a failure.
        Failed => Failed { .. } => "DETECTOR_FAILED",
        /// The block assignment did not cover every node exactly once.
        AssignmentLengthMismatch => AssignmentLengthMismatch { .. } =>
            "DETECTOR_ASSIGNMENT_LENGTH_MISMATCH",
        /// A description length was NaN or infinite.
        NonFiniteDescriptionLength => NonFiniteDescriptionLength { .. } =>
            "DETECTOR_NON_FINITE_DESCRIPTION_LENGTH",
        /// A modularity score was NaN or infinite.
        NonFiniteModularity => NonFiniteModularity { .. } => "DETECTOR_NON_FINITE_MODULARITY",
        /// The single-block description length was zero.
        ZeroTrivialLength => ZeroTrivialLength => "DETECTOR_ZERO_TRIVIAL_LENGTH",
    }
}

/// Stage of the adaptive estimator.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AdaptivePhase {
    /// Bisection search for the plateau boundary.
    Coarse,
    /// Monte-Carlo refinement below the plateau boundary.
    Fine,
}

impl fmt::Display for AdaptivePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coarse => f.write_str("coarse"),
            Self::Fine => f.write_str("fine"),
        }
    }
}

/// Broad failure class of a [`RModularityError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// The caller supplied an unusable network or parameter.
    InvalidInput,
    /// A community detector failed or returned a malformed result.
    OracleFailure,
    /// The adaptive estimator exhausted its iteration budget.
    ConvergenceNotReached,
    /// A worker task terminated abnormally or the pool could not start.
    WorkerFailure,
}

/// Error type produced by every estimator in this crate.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RModularityError {
    /// The network has no nodes.
    #[error("network must contain at least one node")]
    EmptyNetwork,
    /// An edge endpoint does not name a node of the network.
    #[error("edge {index} references node {node}, but node_count is {node_count}")]
    EdgeOutOfRange {
        /// Position of the offending edge in the edge list.
        index: usize,
        /// The out-of-range endpoint.
        node: usize,
        /// Number of nodes in the network.
        node_count: usize,
    },
    /// A rewiring probability was outside `[0, 1]` or NaN.
    #[error("rewiring probability must lie in [0, 1] (got {probability})")]
    InvalidProbability {
        /// The rejected probability.
        probability: f64,
    },
    /// The giant component is too small to perturb or partition.
    #[error("giant component has {nodes} node(s); at least 2 are required")]
    DegenerateNetwork {
        /// Node count of the giant component.
        nodes: usize,
    },
    /// An estimator parameter was rejected.
    #[error("invalid parameter: {reason}")]
    InvalidParameters {
        /// Human-readable reason.
        reason: Arc<str>,
    },
    /// A community detector failed while running an estimator.
    #[error("detector `{detector}` failed: {error}")]
    Detector {
        /// Name reported by the detector.
        detector: Arc<str>,
        #[source]
        /// Underlying detector error.
        error: DetectorError,
    },
    /// The adaptive estimator did not satisfy its stopping rule in time.
    #[error("{phase} phase did not converge within {iterations} iterations")]
    ConvergenceNotReached {
        /// Phase that ran out of iterations.
        phase: AdaptivePhase,
        /// Number of iterations performed.
        iterations: usize,
    },
    /// A worker task panicked.
    #[error("worker task panicked: {message}")]
    WorkerPanicked {
        /// Panic payload rendered as text.
        message: Arc<str>,
    },
    /// The worker pool could not be started.
    #[error("failed to start the worker pool: {message}")]
    ThreadPool {
        /// Message from the pool builder.
        message: Arc<str>,
    },
    /// The requested execution strategy is unavailable in the current build.
    #[error("the requested execution strategy {requested:?} is not available in this build")]
    BackendUnavailable {
        /// Strategy that could not be satisfied by the current build.
        requested: ExecutionStrategy,
    },
}

define_error_codes! {
    /// Stable codes describing [`RModularityError`] variants.
    enum RModularityErrorCode for RModularityError {
        /// The network has no nodes.
        EmptyNetwork => EmptyNetwork => "RMODULARITY_EMPTY_NETWORK",
        /// An edge endpoint does not name a node of the network.
        EdgeOutOfRange => EdgeOutOfRange { .. } => "RMODULARITY_EDGE_OUT_OF_RANGE",
        /// A rewiring probability was outside `[0, 1]`.
        InvalidProbability => InvalidProbability { .. } => "RMODULARITY_INVALID_PROBABILITY",
        /// The giant component is too small.
        DegenerateNetwork => DegenerateNetwork { .. } => "RMODULARITY_DEGENERATE_NETWORK",
        /// An estimator parameter was rejected.
        InvalidParameters => InvalidParameters { .. } => "RMODULARITY_INVALID_PARAMETERS",
        /// A community detector failed.
        DetectorFailure => Detector { .. } => "RMODULARITY_DETECTOR_FAILURE",
        /// The adaptive estimator did not converge.
        ConvergenceNotReached => ConvergenceNotReached { .. } =>
            "RMODULARITY_CONVERGENCE_NOT_REACHED",
        /// A worker task panicked.
        WorkerPanicked => WorkerPanicked { .. } => "RMODULARITY_WORKER_PANICKED",
        /// The worker pool could not be started.
        ThreadPool => ThreadPool { .. } => "RMODULARITY_THREAD_POOL",
        /// The requested execution strategy is unavailable.
        BackendUnavailable => BackendUnavailable { .. } => "RMODULARITY_BACKEND_UNAVAILABLE",
    }
}

impl RModularityError {
    /// Classifies the error into one of the four failure families.
    ///
    /// # Examples
    /// ```
    /// use rmodularity_core::{ErrorKind, RModularityError};
    ///
    /// assert_eq!(RModularityError::EmptyNetwork.kind(), ErrorKind::InvalidInput);
    /// ```
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyNetwork
            | Self::EdgeOutOfRange { .. }
            | Self::InvalidProbability { .. }
            | Self::DegenerateNetwork { .. }
            | Self::InvalidParameters { .. } => ErrorKind::InvalidInput,
            Self::Detector { .. } => ErrorKind::OracleFailure,
            Self::ConvergenceNotReached { .. } => ErrorKind::ConvergenceNotReached,
            Self::WorkerPanicked { .. }
            | Self::ThreadPool { .. }
            | Self::BackendUnavailable { .. } => ErrorKind::WorkerFailure,
        }
    }

    /// Retrieve the inner [`DetectorErrorCode`] when the error originated in a detector.
    #[must_use]
    pub const fn detector_code(&self) -> Option<DetectorErrorCode> {
        match self {
            Self::Detector { error, .. } => Some(error.code()),
            _ => None,
        }
    }

    pub(crate) fn invalid_parameters(reason: impl Into<Arc<str>>) -> Self {
        Self::InvalidParameters {
            reason: reason.into(),
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, RModularityError>;

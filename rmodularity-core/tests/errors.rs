use std::sync::Arc;

use rmodularity_core::{
    AdaptivePhase, DescriptionLength, DetectorError, DetectorErrorCode, ErrorKind,
    ExecutionStrategy, RModularityError, RModularityErrorCode,
};
use rstest::rstest;

#[rstest]
#[case(DetectorError::failed("boom"), DetectorErrorCode::Failed, "DETECTOR_FAILED")]
#[case(
    DetectorError::AssignmentLengthMismatch { expected: 4, got: 3 },
    DetectorErrorCode::AssignmentLengthMismatch,
    "DETECTOR_ASSIGNMENT_LENGTH_MISMATCH",
)]
#[case(
    DetectorError::NonFiniteDescriptionLength {
        which: DescriptionLength::Trivial,
        value: f64::INFINITY,
    },
    DetectorErrorCode::NonFiniteDescriptionLength,
    "DETECTOR_NON_FINITE_DESCRIPTION_LENGTH",
)]
#[case(
    DetectorError::NonFiniteModularity { value: f64::NEG_INFINITY },
    DetectorErrorCode::NonFiniteModularity,
    "DETECTOR_NON_FINITE_MODULARITY",
)]
#[case(
    DetectorError::ZeroTrivialLength,
    DetectorErrorCode::ZeroTrivialLength,
    "DETECTOR_ZERO_TRIVIAL_LENGTH",
)]
fn returns_expected_detector_code(
    #[case] error: DetectorError,
    #[case] expected: DetectorErrorCode,
    #[case] text: &str,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.code().as_str(), text);
    assert_eq!(expected.to_string(), text);
}

#[rstest]
#[case(
    RModularityError::EmptyNetwork,
    RModularityErrorCode::EmptyNetwork,
    ErrorKind::InvalidInput,
    None,
)]
#[case(
    RModularityError::EdgeOutOfRange { index: 0, node: 9, node_count: 3 },
    RModularityErrorCode::EdgeOutOfRange,
    ErrorKind::InvalidInput,
    None,
)]
#[case(
    RModularityError::InvalidProbability { probability: 2.0 },
    RModularityErrorCode::InvalidProbability,
    ErrorKind::InvalidInput,
    None,
)]
#[case(
    RModularityError::DegenerateNetwork { nodes: 1 },
    RModularityErrorCode::DegenerateNetwork,
    ErrorKind::InvalidInput,
    None,
)]
#[case(
    RModularityError::InvalidParameters { reason: Arc::from("bad") },
    RModularityErrorCode::InvalidParameters,
    ErrorKind::InvalidInput,
    None,
)]
#[case(
    RModularityError::Detector {
        detector: Arc::from("sbm"),
        error: DetectorError::ZeroTrivialLength,
    },
    RModularityErrorCode::DetectorFailure,
    ErrorKind::OracleFailure,
    Some(DetectorErrorCode::ZeroTrivialLength),
)]
#[case(
    RModularityError::ConvergenceNotReached {
        phase: AdaptivePhase::Fine,
        iterations: 1000,
    },
    RModularityErrorCode::ConvergenceNotReached,
    ErrorKind::ConvergenceNotReached,
    None,
)]
#[case(
    RModularityError::WorkerPanicked { message: Arc::from("boom") },
    RModularityErrorCode::WorkerPanicked,
    ErrorKind::WorkerFailure,
    None,
)]
#[case(
    RModularityError::ThreadPool { message: Arc::from("no threads") },
    RModularityErrorCode::ThreadPool,
    ErrorKind::WorkerFailure,
    None,
)]
#[case(
    RModularityError::BackendUnavailable {
        requested: ExecutionStrategy::default(),
    },
    RModularityErrorCode::BackendUnavailable,
    ErrorKind::WorkerFailure,
    None,
)]
fn classifies_estimator_errors(
    #[case] error: RModularityError,
    #[case] expected: RModularityErrorCode,
    #[case] kind: ErrorKind,
    #[case] detector_code: Option<DetectorErrorCode>,
) {
    assert_eq!(error.code(), expected);
    assert!(error.code().as_str().starts_with("RMODULARITY_"));
    assert_eq!(error.kind(), kind);
    assert_eq!(error.detector_code(), detector_code);
}

#[test]
fn convergence_error_names_the_phase() {
    let err = RModularityError::ConvergenceNotReached {
        phase: AdaptivePhase::Coarse,
        iterations: 64,
    };
    assert_eq!(err.to_string(), "coarse phase did not converge within 64 iterations");
}

#[test]
fn detector_errors_are_exposed_as_sources() {
    let err = RModularityError::Detector {
        detector: Arc::from("sbm"),
        error: DetectorError::failed("diverged"),
    };
    let source = std::error::Error::source(&err).expect("detector error must be the source");
    assert_eq!(source.to_string(), "detector failed: diverged");
}

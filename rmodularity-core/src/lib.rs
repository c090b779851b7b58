//! Robustness Modularity core library.
//!
//! Robustness Modularity measures how much random edge rewiring a network's
//! community structure absorbs before a block-model detector collapses it to a
//! single community. It is `1 - ∫₀¹ TPR(p) dp`, where the trivial partition
//! ratio `TPR(p)` is the fraction of detector runs that return one block after
//! a fraction `p` of the edges has been rewired.
//!
//! The crate provides a fixed-grid estimator ([`r_modularity`]), two adaptive
//! estimators ([`r_modularity_fast`], [`r_modularity_fast_curve`]), the
//! modularity difference against configuration-model null models
//! ([`modularity_difference`]) and information modularity
//! ([`information_modularity`]). Community detection itself is supplied by the
//! caller through [`BlockModelDetector`] and [`ModularityDetector`].
#![cfg_attr(docsrs, feature(doc_cfg))]

mod adaptive;
mod detector;
mod error;
mod executor;
mod grid;
mod information;
mod integrate;
mod network;
mod null_model;
mod params;
mod perturbation;
mod trial;

#[cfg(test)]
mod test_utils;

pub use crate::{
    adaptive::{
        ConvergenceState, CurveAccumulator, CurveEstimate, CurvePoint, r_modularity_fast,
        r_modularity_fast_curve, relative_change,
    },
    detector::{BlockModelDetector, BlockPartition, DetectionRequest, ModularityDetector},
    error::{
        AdaptivePhase, DescriptionLength, DetectorError, DetectorErrorCode, ErrorKind,
        RModularityError, RModularityErrorCode, Result,
    },
    executor::ExecutionStrategy,
    grid::{RobustnessEstimate, TprCurves, r_modularity},
    information::information_modularity,
    integrate::{linspace, trapezoid},
    network::{Edge, Network},
    null_model::{configuration_model, modularity_difference},
    params::{AdaptiveParams, GridParams, NullModelParams},
    perturbation::{perturb, rewire},
    trial::{SampleTask, Trial, TrialOutcome, run_trial},
};

//! Error types for the funnel analysis pipeline.
//!
//! Data-shape errors detected at ingestion (`InvalidStage`) are fatal for the
//! whole run. Model-fitting errors for a single transition
//! (`DegenerateTrainingSet`, `NonConvergence`) are local: the pipeline skips
//! that stage's model and degrades to a constant survival probability.

use thiserror::Error;

/// Errors that can occur during funnel analysis.
#[derive(Debug, Error)]
pub enum FunnelError {
    /// A record carries a funnel stage label outside the known set.
    ///
    /// The record is rejected rather than silently defaulted; ingestion
    /// aborts the run so no partial dataset is analyzed.
    #[error("Unknown funnel stage label '{label}'")]
    InvalidStage {
        /// The offending stage label
        label: String,
    },

    /// A transition's training label has zero variance (all-pass or all-fail).
    ///
    /// Logistic regression cannot be fit on such a population. Callers must
    /// either skip this stage's model or fall back to a constant survival
    /// probability of 1.0.
    #[error("Degenerate training set for transition '{transition}': {passed} of {total} records passed")]
    DegenerateTrainingSet {
        /// Name of the affected transition
        transition: String,
        /// Number of records that passed the transition
        passed: usize,
        /// Training population size
        total: usize,
    },

    /// The optimizer did not converge within its iteration budget.
    #[error("Model fit for transition '{transition}' did not converge after {iterations} iterations")]
    NonConvergence {
        /// Name of the affected transition
        transition: String,
        /// Iteration budget that was exhausted
        iterations: usize,
    },

    /// A requested cohort slice has zero members.
    #[error("Cohort '{cohort}' has no members")]
    EmptyCohort {
        /// Readable cohort label
        cohort: String,
    },
}

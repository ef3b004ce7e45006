//! Stage survival model bank
//!
//! Trains one logistic classifier per funnel transition, each conditioned on
//! the applicants who survived the prior transition. The bank is an explicit
//! ordered list of immutable `(transition, model, scaler)` records produced by
//! a single training pass; transitions whose label has no variance are skipped
//! and recorded as fallbacks (constant survival of 1.0).

use super::error::FunnelError;
use super::model::{FeatureScaler, FitConfig, LogisticModel};
use super::record::ApplicantRecord;
use super::stages::StageIndicators;

/// One funnel transition, in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    AppCompletion,
    DocUpload,
    Underwriting,
    Funding,
}

impl Transition {
    /// All transitions in cascade order.
    pub const ALL: [Transition; 4] = [
        Transition::AppCompletion,
        Transition::DocUpload,
        Transition::Underwriting,
        Transition::Funding,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::AppCompletion => "app_completion",
            Transition::DocUpload => "doc_upload",
            Transition::Underwriting => "underwriting",
            Transition::Funding => "funding",
        }
    }

    /// Whether a record belongs to this transition's training population,
    /// i.e. it reached the state preceding the transition. The first
    /// transition is trained on the entire dataset.
    pub fn in_population(&self, ind: &StageIndicators) -> bool {
        match self {
            Transition::AppCompletion => true,
            Transition::DocUpload => ind.completed_app,
            Transition::Underwriting => ind.uploaded_docs,
            Transition::Funding => ind.passed_underwriting,
        }
    }

    /// The training label: whether the record passed this transition.
    pub fn label(&self, ind: &StageIndicators) -> bool {
        match self {
            Transition::AppCompletion => ind.completed_app,
            Transition::DocUpload => ind.uploaded_docs,
            Transition::Underwriting => ind.passed_underwriting,
            Transition::Funding => ind.funded,
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A trained survival model for one transition, with its scaler.
/// Immutable after training; discarded at end of run.
#[derive(Debug, Clone)]
pub struct StageModel {
    pub transition: Transition,
    pub model: LogisticModel,
    pub scaler: FeatureScaler,
    /// Training population size
    pub population: usize,
}

/// A transition whose model could not be fit, with the reason.
#[derive(Debug)]
pub struct SkippedTransition {
    pub transition: Transition,
    pub reason: FunnelError,
}

/// The ordered bank of fitted stage models.
#[derive(Debug, Default)]
pub struct ModelBank {
    /// Fitted models in cascade order (skipped transitions are absent)
    pub models: Vec<StageModel>,
    /// Transitions that degraded to a constant survival probability
    pub skipped: Vec<SkippedTransition>,
}

impl ModelBank {
    pub fn get(&self, transition: Transition) -> Option<&StageModel> {
        self.models.iter().find(|m| m.transition == transition)
    }
}

/// Per-applicant survival probabilities, one optional value per transition.
///
/// A `None` means the applicant was never evaluated for that transition
/// (dropped out earlier, or the model was skipped). Absence is not zero:
/// treating it as zero would bias composed risk upward for early dropouts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SurvivalProbabilities {
    pub app_completion: Option<f64>,
    pub doc_upload: Option<f64>,
    pub underwriting: Option<f64>,
    pub funding: Option<f64>,
}

impl SurvivalProbabilities {
    pub fn get(&self, transition: Transition) -> Option<f64> {
        match transition {
            Transition::AppCompletion => self.app_completion,
            Transition::DocUpload => self.doc_upload,
            Transition::Underwriting => self.underwriting,
            Transition::Funding => self.funding,
        }
    }

    fn set(&mut self, transition: Transition, value: f64) {
        match transition {
            Transition::AppCompletion => self.app_completion = Some(value),
            Transition::DocUpload => self.doc_upload = Some(value),
            Transition::Underwriting => self.underwriting = Some(value),
            Transition::Funding => self.funding = Some(value),
        }
    }

    /// Probabilities that were evaluated for this applicant, in cascade order.
    pub fn available(&self) -> Vec<f64> {
        Transition::ALL.iter().filter_map(|t| self.get(*t)).collect()
    }
}

/// Train the full cascade and score every applicant it applies to.
///
/// Returns the bank plus one `SurvivalProbabilities` per input record, index
/// aligned with `records`. A degenerate transition is skipped (recorded in
/// `ModelBank::skipped`) and its probabilities stay absent; the rest of the
/// cascade still trains.
pub fn train_model_bank(
    records: &[ApplicantRecord],
    config: &FitConfig,
) -> (ModelBank, Vec<SurvivalProbabilities>) {
    let indicators: Vec<StageIndicators> = records.iter().map(|r| r.indicators()).collect();
    let mut probabilities = vec![SurvivalProbabilities::default(); records.len()];
    let mut bank = ModelBank::default();

    for transition in Transition::ALL {
        let member_indices: Vec<usize> = indicators
            .iter()
            .enumerate()
            .filter(|(_, ind)| transition.in_population(ind))
            .map(|(i, _)| i)
            .collect();

        if member_indices.is_empty() {
            bank.skipped.push(SkippedTransition {
                transition,
                reason: FunnelError::DegenerateTrainingSet {
                    transition: transition.as_str().to_string(),
                    passed: 0,
                    total: 0,
                },
            });
            continue;
        }

        let features: Vec<[f64; 5]> = member_indices.iter().map(|&i| records[i].features()).collect();
        let labels: Vec<bool> = member_indices
            .iter()
            .map(|&i| transition.label(&indicators[i]))
            .collect();

        let scaler = FeatureScaler::fit(&features);
        let scaled: Vec<[f64; 5]> = features.iter().map(|f| scaler.transform(f)).collect();

        match LogisticModel::fit(&scaled, &labels, config, transition.as_str()) {
            Ok(model) => {
                for (&idx, row) in member_indices.iter().zip(scaled.iter()) {
                    probabilities[idx].set(transition, model.predict_proba(row));
                }
                bank.models.push(StageModel {
                    transition,
                    model,
                    scaler,
                    population: member_indices.len(),
                });
            }
            Err(reason) => {
                bank.skipped.push(SkippedTransition { transition, reason });
            }
        }
    }

    (bank, probabilities)
}

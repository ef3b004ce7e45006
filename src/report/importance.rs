//! Feature importance extraction from trained transition models

use serde::Serialize;

use crate::pipeline::cascade::ModelBank;
use crate::pipeline::record::FEATURE_NAMES;

/// Importance of one feature for one funnel transition.
///
/// The importance is the absolute value of the standardized model
/// coefficient, so magnitudes are comparable across features.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureImportance {
    pub transition: &'static str,
    pub feature: &'static str,
    pub importance: f64,
}

/// Extract per-transition feature importances from a trained model bank.
///
/// Entries are grouped by transition in funnel order; within a transition
/// they are sorted by descending importance. Skipped transitions contribute
/// no entries.
pub fn extract_feature_importance(bank: &ModelBank) -> Vec<FeatureImportance> {
    let mut out = Vec::with_capacity(bank.models.len() * FEATURE_NAMES.len());

    for stage_model in &bank.models {
        let mut entries: Vec<FeatureImportance> = FEATURE_NAMES
            .iter()
            .zip(stage_model.model.coefficients.iter())
            .map(|(feature, coefficient)| FeatureImportance {
                transition: stage_model.transition.as_str(),
                feature,
                importance: coefficient.abs(),
            })
            .collect();
        entries.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        out.extend(entries);
    }

    out
}

/// The single most important feature per transition, in funnel order.
pub fn top_feature_per_transition(importance: &[FeatureImportance]) -> Vec<&FeatureImportance> {
    let mut seen: Vec<&'static str> = Vec::new();
    let mut out = Vec::new();
    for entry in importance {
        if !seen.contains(&entry.transition) {
            seen.push(entry.transition);
            out.push(entry);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::cascade::{StageModel, Transition};
    use crate::pipeline::model::{FeatureScaler, LogisticModel};

    fn bank_with(coefficients: Vec<f64>) -> ModelBank {
        ModelBank {
            models: vec![StageModel {
                transition: Transition::AppCompletion,
                model: LogisticModel {
                    coefficients,
                    intercept: 0.1,
                    iterations: 4,
                },
                scaler: FeatureScaler {
                    means: vec![0.0; 5],
                    stds: vec![1.0; 5],
                },
                population: 10,
            }],
            skipped: Vec::new(),
        }
    }

    #[test]
    fn test_importance_is_absolute_and_sorted() {
        let bank = bank_with(vec![0.2, -1.5, 0.05, 0.9, -0.3]);
        let importance = extract_feature_importance(&bank);
        assert_eq!(importance.len(), 5);
        assert_eq!(importance[0].feature, "income");
        assert!((importance[0].importance - 1.5).abs() < 1e-12);
        for pair in importance.windows(2) {
            assert!(pair[0].importance >= pair[1].importance);
        }
    }

    #[test]
    fn test_empty_bank_yields_no_entries() {
        let bank = ModelBank::default();
        assert!(extract_feature_importance(&bank).is_empty());
    }

    #[test]
    fn test_top_feature_per_transition() {
        let bank = bank_with(vec![0.2, -1.5, 0.05, 0.9, -0.3]);
        let importance = extract_feature_importance(&bank);
        let top = top_feature_per_transition(&importance);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].feature, "income");
    }
}

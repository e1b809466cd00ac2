//! Classifier seam: the probabilistic model behind ranking and prediction.
//!
//! `AppState` holds an `Option<Arc<dyn Classifier>>`. A trained model is
//! plugged in by implementing this trait; `HeuristicClassifier` is the
//! built-in default and is deterministic and fully testable.

use thiserror::Error;

use crate::scoring::features::{Column, CompatibilityFeatureSet, FeatureMode};
use crate::scoring::hierarchy::MatchOutcome;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("feature schema mismatch: classifier expects {expected} features, got {found}")]
    SchemaMismatch {
        expected: FeatureMode,
        found: FeatureMode,
    },

    #[error("feature '{0}' is not usable by the classifier")]
    BadFeature(&'static str),
}

pub trait Classifier: Send + Sync {
    /// Short backend name, reported by the model info endpoint.
    fn name(&self) -> &'static str;

    /// The feature shape this classifier was trained against.
    fn feature_mode(&self) -> FeatureMode;

    /// Class probabilities `[p(not hired), p(hired)]` for one feature row.
    fn predict_proba(&self, features: &CompatibilityFeatureSet)
        -> Result<Vec<f64>, ClassifierError>;

    /// Most probable class. Ties go to the lower class index.
    fn predict(&self, features: &CompatibilityFeatureSet) -> Result<u8, ClassifierError> {
        let probabilities = self.predict_proba(features)?;
        let best = probabilities
            .iter()
            .enumerate()
            .rev()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(class, _)| class)
            .unwrap_or_default();
        Ok(u8::from(best == 1))
    }
}

/// Probability of the positive class; 0.5 when the model returns fewer than
/// two classes.
pub fn positive_probability(probabilities: &[f64]) -> f64 {
    probabilities.get(1).copied().unwrap_or(0.5)
}

/// Probability rescaled to 0–100, rounded to two decimals.
pub fn to_match_score(probability: f64) -> f64 {
    (probability * 100.0 * 100.0).round() / 100.0
}

// ────────────────────────────────────────────────────────────────────────────
// HeuristicClassifier
// ────────────────────────────────────────────────────────────────────────────

/// Logistic scorer over the derived features with hand-set weights.
///
/// z = bias + Σ weight × feature, p(hired) = 1 / (1 + e^-z)
pub struct HeuristicClassifier {
    mode: FeatureMode,
}

impl HeuristicClassifier {
    pub fn new(mode: FeatureMode) -> Self {
        Self { mode }
    }

    fn number(
        features: &CompatibilityFeatureSet,
        column: Column,
    ) -> Result<f64, ClassifierError> {
        features
            .number(column)
            .filter(|n| n.is_finite())
            .ok_or(ClassifierError::BadFeature(column.name()))
    }

    fn outcome_weight(
        features: &CompatibilityFeatureSet,
        column: Column,
        weights: (f64, f64, f64),
    ) -> Result<f64, ClassifierError> {
        let label = features
            .text(column)
            .ok_or(ClassifierError::BadFeature(column.name()))?;
        let (compatible, undetermined, insufficient) = weights;
        Ok(match label {
            l if l == MatchOutcome::Compatible.label() => compatible,
            l if l == MatchOutcome::Insufficient.label() => insufficient,
            _ => undetermined,
        })
    }

    fn logit(&self, features: &CompatibilityFeatureSet) -> Result<f64, ClassifierError> {
        match self.mode {
            FeatureMode::Categorical => Ok(-2.0
                + 3.0 * Self::number(features, Column::TechMatchScore)?
                + Self::outcome_weight(features, Column::AcademicMatch, (1.0, 0.3, -0.5))?
                + Self::outcome_weight(features, Column::EnglishMatch, (0.6, 0.2, -0.4))?
                + 0.5 * Self::number(features, Column::IsTechArea)?),
            FeatureMode::Ranking => Ok(-3.2
                + 3.0 * Self::number(features, Column::TechSuccessScore)?
                + 1.0 * Self::number(features, Column::AcademicScore)?
                + 0.8 * Self::number(features, Column::EnglishScore)?
                + 0.3 * Self::number(features, Column::IsTechArea)?
                + 0.1 * Self::number(features, Column::IsClt)?),
        }
    }
}

impl Classifier for HeuristicClassifier {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn feature_mode(&self) -> FeatureMode {
        self.mode
    }

    fn predict_proba(
        &self,
        features: &CompatibilityFeatureSet,
    ) -> Result<Vec<f64>, ClassifierError> {
        if features.mode() != self.mode {
            return Err(ClassifierError::SchemaMismatch {
                expected: self.mode,
                found: features.mode(),
            });
        }
        let z = self.logit(features)?;
        let p = 1.0 / (1.0 + (-z).exp());
        Ok(vec![1.0 - p, p])
    }
}

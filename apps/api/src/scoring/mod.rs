// Compatibility scoring: ordinal hierarchies and feature derivation feed the
// classifier seam that ranking calls into.

pub mod classifier;
pub mod features;
pub mod hierarchy;

pub use classifier::{Classifier, HeuristicClassifier};
pub use features::{derive_features, CompatibilityFeatureSet, FeatureMode};

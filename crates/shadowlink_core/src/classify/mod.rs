//! Classification capability consumed by the risk engine.

use crate::features::FeatureVector;

/// A trained classifier exposed as a single deterministic prediction.
///
/// Implementations must be pure local computation: no IO, no retries,
/// identical output for identical input. The label domain is whatever the
/// trained model emits; the stock logistic artifacts emit {0.0, 1.0}, and
/// the combined score's meaning follows from that domain.
pub trait Classifier {
    fn predict(&self, features: &FeatureVector) -> f64;
}

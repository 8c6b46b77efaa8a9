//! Risk engine: encode features, run both classifiers, blend the labels.
//!
//! The blend is a fixed linear rule, not learned and not configurable:
//! `combined_score = 0.6 * exposure_risk + 0.4 * fraud_flagged`.
//! A batch never aborts on a bad record and never drops one silently; each
//! input row produces exactly one assessment or one recorded failure.

use crate::classify::Classifier;
use crate::features::{RecordFailure, RoleEncoder, UserRecord};

/// Weight applied to the exposure label in the combined score.
pub const EXPOSURE_WEIGHT: f64 = 0.6;
/// Weight applied to the fraud label in the combined score.
pub const FRAUD_WEIGHT: f64 = 0.4;

/// Scored output for one user. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub email: String,
    pub role: String,
    pub exposure_risk: f64,
    pub fraud_flagged: f64,
    pub combined_score: f64,
}

/// Batch outcome: successes and per-record failures are both first-class,
/// so callers can distinguish full success from partial failure.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    /// Assessments in input order (failed rows excluded).
    pub assessments: Vec<RiskAssessment>,
    /// Failures in input order, with row index and reason.
    pub failures: Vec<RecordFailure>,
}

impl EvaluationReport {
    /// Number of records scored.
    pub fn processed(&self) -> usize {
        self.assessments.len()
    }

    /// Number of records that failed.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Observability counters for engine batches.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    evaluated_total: u64,
    failed_total: u64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluated_total(&self) -> u64 {
        self.evaluated_total
    }

    pub fn failed_total(&self) -> u64 {
        self.failed_total
    }

    fn record_evaluated(&mut self) {
        self.evaluated_total += 1;
    }

    fn record_failed(&mut self) {
        self.failed_total += 1;
    }
}

/// One encoder and two classifiers, fixed at construction.
pub struct RiskEngine {
    encoder: RoleEncoder,
    exposure: Box<dyn Classifier>,
    fraud: Box<dyn Classifier>,
}

impl RiskEngine {
    pub fn new(
        encoder: RoleEncoder,
        exposure: Box<dyn Classifier>,
        fraud: Box<dyn Classifier>,
    ) -> Self {
        Self {
            encoder,
            exposure,
            fraud,
        }
    }

    pub fn encoder(&self) -> &RoleEncoder {
        &self.encoder
    }

    /// Score a batch of users, order-preserving relative to input.
    ///
    /// Both classifiers see the same feature vector and neither observes
    /// the other's output. Encoding failures are collected per record.
    pub fn evaluate(
        &self,
        users: &[UserRecord],
        metrics: &mut EngineMetrics,
    ) -> EvaluationReport {
        let encoded = self.encoder.encode_batch(users);

        let mut assessments = Vec::with_capacity(encoded.vectors.len());
        for (row, features) in &encoded.vectors {
            let user = &users[*row];
            let exposure_risk = self.exposure.predict(features);
            let fraud_flagged = self.fraud.predict(features);
            let combined_score = EXPOSURE_WEIGHT * exposure_risk + FRAUD_WEIGHT * fraud_flagged;

            assessments.push(RiskAssessment {
                email: user.email.clone(),
                role: user.role.clone(),
                exposure_risk,
                fraud_flagged,
                combined_score,
            });
            metrics.record_evaluated();
        }

        for failure in &encoded.failures {
            tracing::debug!(row = failure.row, email = %failure.email, error = %failure.error, "record skipped");
            metrics.record_failed();
        }

        EvaluationReport {
            assessments,
            failures: encoded.failures,
        }
    }
}

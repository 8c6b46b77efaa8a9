//! User feature encoding shared by model training and inference.

pub mod encoder;
pub mod record;

pub use encoder::{BatchEncoding, EncoderBuildError, RoleEncoder, UnknownRoleError};
pub use record::{FEATURE_WIDTH, FeatureVector, RecordError, RecordFailure, UserRecord};

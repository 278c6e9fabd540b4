//! Typed error taxonomy for the inference engine (see spec.md §7).
//!
//! Config and pattern-compilation failures are fatal at startup.
//! Per-user scoring failures and write-constraint violations are caught
//! at the per-user boundary and never abort a run.

use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("pattern `{pattern_id}` failed to compile: {source}")]
    PatternCompilationError {
        pattern_id: String,
        #[source]
        source: regex::Error,
    },

    #[error("scoring failed for user {user_id}: {reason}")]
    PerUserScoreFailure { user_id: Uuid, reason: String },

    #[error("write constraint violated: {0}")]
    WriteConstraintViolation(#[from] WriteConstraintError),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),
}

/// Errors that indicate a bug in the scorer, not an environmental failure.
/// Surfaced by the Claim Writer when a scoring result violates an invariant
/// from spec.md §3 that should have been impossible to produce.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum WriteConstraintError {
    #[error("object_value `{value}` is not a member of the {vocabulary} vocabulary")]
    InvalidObjectValue { vocabulary: &'static str, value: String },

    #[error("object_value for predicate `{predicate}` is empty after trim")]
    EmptyObjectValue { predicate: &'static str },

    #[error("claim for predicate `{predicate}` has no non-membership evidence")]
    MissingNonMembershipEvidence { predicate: &'static str },

    #[error("claim for predicate `{predicate}` has no evidence rows")]
    NoEvidence { predicate: &'static str },
}

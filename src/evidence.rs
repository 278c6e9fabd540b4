//! `Hit` (spec.md §3) is the engine's internal evidence currency: every
//! pattern match, feature rule, and membership produces one, and every
//! emitted claim must trace back to at least one.

use crate::taxonomy::{EvidenceType, LabelType};

/// One piece of evidence contributed toward a label. `evidence_ref` is a
/// stable, human-inspectable string of the form `<source>_keyword:<pattern_id>`
/// or `affiliation:<org>` — it doubles as the DB's `claim_evidence.evidence_ref`
/// and as the secondary sort key for deterministic evidence ordering.
#[derive(Debug, Clone)]
pub struct Hit {
    pub evidence_type: EvidenceType,
    pub evidence_ref: String,
    pub label_type: LabelType,
    pub label: String,
    pub weight: f32,
    pub decay_factor: Option<f32>,
    pub pattern_id: Option<String>,
    pub message_id: Option<String>,
}

impl Hit {
    pub fn new(
        evidence_type: EvidenceType,
        evidence_ref: impl Into<String>,
        label_type: LabelType,
        label: impl Into<String>,
        weight: f32,
    ) -> Self {
        Hit {
            evidence_type,
            evidence_ref: evidence_ref.into(),
            label_type,
            label: label.into(),
            weight,
            decay_factor: None,
            pattern_id: None,
            message_id: None,
        }
    }

    pub fn with_decay(mut self, decay_factor: f32) -> Self {
        self.decay_factor = Some(decay_factor);
        self
    }

    pub fn with_pattern_id(mut self, pattern_id: impl Into<String>) -> Self {
        self.pattern_id = Some(pattern_id.into());
        self
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    /// Effective weight after temporal decay, if any was applied.
    pub fn effective_weight(&self) -> f32 {
        self.weight * self.decay_factor.unwrap_or(1.0)
    }
}

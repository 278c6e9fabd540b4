//! Output types written by the Claim Writer (spec.md §3 Claim/Abstention,
//! §9 Design Notes tagged-union requirement).

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::evidence::Hit;
use crate::taxonomy::{AbstentionReason, ClaimStatus, Intent, OrgType, Role};

/// The ENUM/free-text distinction the DB enforces, made static here so the
/// writer never branches on a `predicate` string to decide validation rules.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimObject {
    Role(Role),
    Intent(Intent),
    OrgType(OrgType),
    Affiliation(String),
    TopicAffinity(String),
}

impl ClaimObject {
    /// The string persisted as `claims.object_value`.
    pub fn object_value(&self) -> String {
        match self {
            ClaimObject::Role(r) => serde_json::to_value(r)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            ClaimObject::Intent(i) => serde_json::to_value(i)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            ClaimObject::OrgType(o) => serde_json::to_value(o)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            ClaimObject::Affiliation(s) | ClaimObject::TopicAffinity(s) => s.clone(),
        }
    }

    pub fn predicate(&self) -> &'static str {
        match self {
            ClaimObject::Role(_) => "has_role",
            ClaimObject::Intent(_) => "has_intent",
            ClaimObject::OrgType(_) => "has_org_type",
            ClaimObject::Affiliation(_) => "affiliated_with",
            ClaimObject::TopicAffinity(_) => "has_topic_affinity",
        }
    }

    /// §3 invariant 4: free-text predicates must be non-empty after trim.
    pub fn is_non_empty_free_text(&self) -> bool {
        match self {
            ClaimObject::Affiliation(s) | ClaimObject::TopicAffinity(s) => !s.trim().is_empty(),
            _ => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Claim {
    pub user_id: Uuid,
    pub object: ClaimObject,
    pub confidence: f32,
    pub status: ClaimStatus,
    pub version: String,
    pub evidence: Vec<Hit>,
    pub generated_at: DateTime<Utc>,
}

impl Claim {
    /// §3 invariant 2: role/intent/topic-affinity claims need at least one
    /// non-membership evidence row. Affiliation/org-type claims are exempt
    /// from this specific check per the invariant's predicate list, but in
    /// practice the gates never emit them without one either.
    pub fn requires_non_membership_evidence(&self) -> bool {
        matches!(
            self.object,
            ClaimObject::Role(_) | ClaimObject::Intent(_) | ClaimObject::TopicAffinity(_)
        )
    }

    pub fn has_non_membership_evidence(&self) -> bool {
        self.evidence
            .iter()
            .any(|h| h.evidence_type != crate::taxonomy::EvidenceType::Membership)
    }
}

#[derive(Debug, Clone)]
pub struct Abstention {
    pub user_id: Uuid,
    pub predicate: &'static str,
    pub reason: AbstentionReason,
    pub details: String,
    pub version: String,
    pub generated_at: DateTime<Utc>,
}

/// Everything C3 produces for one user — the input to the Claim Writer
/// and the output asserted on by the regression harness.
#[derive(Debug, Clone, Default)]
pub struct ScoringResult {
    pub claims: Vec<Claim>,
    pub abstentions: Vec<Abstention>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_object_value_is_snake_case() {
        let obj = ClaimObject::Role(Role::FounderExec);
        assert_eq!(obj.object_value(), "founder_exec");
        assert_eq!(obj.predicate(), "has_role");
    }

    #[test]
    fn affiliation_empty_after_trim_is_rejected() {
        let obj = ClaimObject::Affiliation("   ".to_string());
        assert!(!obj.is_non_empty_free_text());
    }
}

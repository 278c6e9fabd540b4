//! C4 Claim Writer (spec.md §4.4). Idempotent, per-user transactional
//! upsert backed by `sqlx::PgPool`, modeled on a `pool.begin()` /
//! multi-statement-transaction / `commit()` service shape.

use sqlx::PgPool;
use uuid::Uuid;

use crate::claim::{Claim, ClaimObject, ScoringResult};
use crate::error::{Error, WriteConstraintError};
use crate::taxonomy::{EvidenceType, Intent, OrgType, Role};

pub struct ClaimWriter {
    pool: PgPool,
}

impl ClaimWriter {
    pub fn new(pool: PgPool) -> Self {
        ClaimWriter { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), Error> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::ConfigInvalid(format!("migration failed: {e}")))
    }

    /// Write one user's scoring result: delete-then-insert within a single
    /// transaction, re-validating every §3 invariant before any insert
    /// statement runs (the writer must enforce invariants in Rust, not
    /// rely solely on the DB's constraint triggers).
    pub async fn write_user(
        &self,
        user_id: Uuid,
        version: &str,
        result: &ScoringResult,
    ) -> Result<(), Error> {
        for claim in &result.claims {
            validate_claim(claim)?;
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM claim_evidence WHERE claim_id IN (SELECT id FROM claims WHERE subject_user_id = $1 AND model_version = $2)")
            .bind(user_id)
            .bind(version)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM claims WHERE subject_user_id = $1 AND model_version = $2")
            .bind(user_id)
            .bind(version)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM abstention_log WHERE subject_user_id = $1 AND model_version = $2")
            .bind(user_id)
            .bind(version)
            .execute(&mut *tx)
            .await?;

        for claim in &result.claims {
            let claim_id: Uuid = sqlx::query_scalar(
                "INSERT INTO claims (subject_user_id, predicate, object_value, status, confidence, model_version, generated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 RETURNING id",
            )
            .bind(claim.user_id)
            .bind(claim.object.predicate())
            .bind(claim.object.object_value())
            .bind(status_str(claim.status))
            .bind(claim.confidence)
            .bind(&claim.version)
            .bind(claim.generated_at)
            .fetch_one(&mut *tx)
            .await?;

            for evidence in &claim.evidence {
                sqlx::query(
                    "INSERT INTO claim_evidence (claim_id, evidence_type, evidence_ref, weight)
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(claim_id)
                .bind(evidence_type_str(evidence.evidence_type))
                .bind(&evidence.evidence_ref)
                .bind(evidence.effective_weight())
                .execute(&mut *tx)
                .await?;
            }
        }

        for abstention in &result.abstentions {
            sqlx::query(
                "INSERT INTO abstention_log (subject_user_id, predicate, reason_code, details, model_version, generated_at)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(abstention.user_id)
            .bind(abstention.predicate)
            .bind(abstention_reason_str(abstention.reason))
            .bind(&abstention.details)
            .bind(&abstention.version)
            .bind(abstention.generated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

fn validate_claim(claim: &Claim) -> Result<(), WriteConstraintError> {
    if claim.evidence.is_empty() {
        return Err(WriteConstraintError::NoEvidence {
            predicate: claim.object.predicate(),
        });
    }

    if claim.requires_non_membership_evidence() && !claim.has_non_membership_evidence() {
        return Err(WriteConstraintError::MissingNonMembershipEvidence {
            predicate: claim.object.predicate(),
        });
    }

    match &claim.object {
        ClaimObject::Role(r) if *r == Role::Unknown => {
            return Err(WriteConstraintError::InvalidObjectValue {
                vocabulary: "role",
                value: claim.object.object_value(),
            })
        }
        ClaimObject::Intent(i) if *i == Intent::Unknown => {
            return Err(WriteConstraintError::InvalidObjectValue {
                vocabulary: "intent",
                value: claim.object.object_value(),
            })
        }
        ClaimObject::OrgType(o) if *o == OrgType::Unknown => {
            return Err(WriteConstraintError::InvalidObjectValue {
                vocabulary: "org_type",
                value: claim.object.object_value(),
            })
        }
        ClaimObject::Affiliation(_) | ClaimObject::TopicAffinity(_) => {
            if !claim.object.is_non_empty_free_text() {
                return Err(WriteConstraintError::EmptyObjectValue {
                    predicate: claim.object.predicate(),
                });
            }
        }
        _ => {}
    }

    Ok(())
}

fn status_str(status: crate::taxonomy::ClaimStatus) -> &'static str {
    match status {
        crate::taxonomy::ClaimStatus::Supported => "supported",
        crate::taxonomy::ClaimStatus::Tentative => "tentative",
    }
}

fn evidence_type_str(t: EvidenceType) -> &'static str {
    match t {
        EvidenceType::Bio => "bio",
        EvidenceType::Message => "message",
        EvidenceType::Feature => "feature",
        EvidenceType::Membership => "membership",
        EvidenceType::DisplayName => "display_name",
        EvidenceType::Llm => "llm",
    }
}

fn abstention_reason_str(r: crate::taxonomy::AbstentionReason) -> &'static str {
    match r {
        crate::taxonomy::AbstentionReason::InsufficientEvidence => "insufficient_evidence",
        crate::taxonomy::AbstentionReason::LowConfidence => "low_confidence",
        crate::taxonomy::AbstentionReason::NoData => "no_data",
        crate::taxonomy::AbstentionReason::GatedByCooccurrence => "gated_by_cooccurrence",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::Claim;
    use crate::taxonomy::ClaimStatus;
    use chrono::Utc;

    fn claim_with_evidence(object: ClaimObject, evidence_type: EvidenceType) -> Claim {
        Claim {
            user_id: Uuid::new_v4(),
            object,
            confidence: 0.8,
            status: ClaimStatus::Tentative,
            version: "v-test".to_string(),
            evidence: vec![crate::evidence::Hit::new(
                evidence_type,
                "bio_keyword:x",
                crate::taxonomy::LabelType::Role,
                "builder",
                1.0,
            )],
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn claim_with_no_evidence_is_rejected() {
        let mut c = claim_with_evidence(ClaimObject::Role(Role::Builder), EvidenceType::Bio);
        c.evidence.clear();
        assert!(matches!(validate_claim(&c), Err(WriteConstraintError::NoEvidence { .. })));
    }

    #[test]
    fn role_claim_with_only_membership_evidence_is_rejected() {
        let c = claim_with_evidence(ClaimObject::Role(Role::Builder), EvidenceType::Membership);
        assert!(matches!(
            validate_claim(&c),
            Err(WriteConstraintError::MissingNonMembershipEvidence { .. })
        ));
    }

    #[test]
    fn unknown_role_object_value_is_rejected() {
        let c = claim_with_evidence(ClaimObject::Role(Role::Unknown), EvidenceType::Bio);
        assert!(matches!(
            validate_claim(&c),
            Err(WriteConstraintError::InvalidObjectValue { .. })
        ));
    }

    #[test]
    fn empty_affiliation_is_rejected() {
        let c = claim_with_evidence(ClaimObject::Affiliation("   ".to_string()), EvidenceType::Bio);
        assert!(matches!(
            validate_claim(&c),
            Err(WriteConstraintError::EmptyObjectValue { .. })
        ));
    }

    #[test]
    fn valid_role_claim_passes_validation() {
        let c = claim_with_evidence(ClaimObject::Role(Role::Builder), EvidenceType::Bio);
        assert!(validate_claim(&c).is_ok());
    }
}

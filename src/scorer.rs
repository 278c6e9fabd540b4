//! C3 Scorer & Gates (spec.md §4.3). `score_user` is a pure function —
//! no I/O, no global state — mirroring a single input-to-output decision
//! function the way a scoring engine without a database should read.

use chrono::{DateTime, Utc};

use crate::bundle::UserBundle;
use crate::claim::{Abstention, Claim, ClaimObject, ScoringResult};
use crate::config::Config;
use crate::evidence::Hit;
use crate::extract::{affiliation, bio, display_name, feature, membership, message};
use crate::patterns::MESSAGE_INTENT;
use crate::taxonomy::{AbstentionReason, ClaimStatus, EvidenceType, Intent, LabelType, OrgType, Role};

const SUPPORTED_PROBABILITY_THRESHOLD: f32 = 0.55;
const SUPPORTED_MIN_TOTAL_MSG_COUNT: u64 = 5;

/// One scored candidate for a single label within a category (role or
/// intent), carrying everything the emission gates and the writer need.
struct Candidate<L> {
    label: L,
    probability: f32,
    eligible: bool,
    non_membership_count: usize,
    evidence: Vec<Hit>,
}

pub fn score_user(bundle: &UserBundle, config: &Config, reference_date: DateTime<Utc>) -> ScoringResult {
    let display_name_hits = display_name::extract(&bundle.display_name);
    let bio_role_intent_hits = bio::extract_role_intent(&bundle.bio);
    let bio_affiliation_hits: Vec<Hit> = bio::extract_affiliation(&bundle.bio)
        .into_iter()
        .map(|(_, h)| h)
        .collect();

    let has_dev_identity = display_name_hits
        .iter()
        .chain(bio_role_intent_hits.iter())
        .any(|h| h.label_type == LabelType::Role && h.label == "builder");

    let message_hits = message::extract(&bundle.messages, reference_date, has_dev_identity);
    let feature_hits = feature::extract(&bundle.features);
    let membership_role_hits = membership::extract_role_hits(&bundle.memberships, config);
    let membership_intent_hits = membership::extract_intent_hits(&bundle.memberships, config);

    let mut role_hits: Vec<Hit> = Vec::new();
    role_hits.extend(display_name_hits.iter().filter(|h| h.label_type == LabelType::Role).cloned());
    role_hits.extend(bio_role_intent_hits.iter().filter(|h| h.label_type == LabelType::Role).cloned());
    role_hits.extend(message_hits.iter().filter(|h| h.label_type == LabelType::Role).cloned());
    role_hits.extend(feature_hits.iter().filter(|h| h.label_type == LabelType::Role).cloned());
    role_hits.extend(membership_role_hits);

    let mut intent_hits: Vec<Hit> = Vec::new();
    intent_hits.extend(bio_role_intent_hits.iter().filter(|h| h.label_type == LabelType::Intent).cloned());
    intent_hits.extend(message_hits.iter().filter(|h| h.label_type == LabelType::Intent).cloned());
    intent_hits.extend(feature_hits.iter().filter(|h| h.label_type == LabelType::Intent).cloned());
    intent_hits.extend(membership_intent_hits);

    let mut all_affiliation_hits: Vec<Hit> = Vec::new();
    all_affiliation_hits.extend(bio_affiliation_hits);
    all_affiliation_hits.extend(
        message_hits
            .iter()
            .filter(|h| h.label_type == LabelType::Affiliation)
            .cloned(),
    );
    if let Some(org) = display_name::candidate_affiliation(&bundle.display_name) {
        all_affiliation_hits.push(Hit::new(
            EvidenceType::DisplayName,
            format!("affiliation:{org}"),
            LabelType::Affiliation,
            org,
            1.0,
        ));
    }

    let mut org_type_hits: Vec<Hit> = Vec::new();
    org_type_hits.extend(display_name_hits.iter().filter(|h| h.label_type == LabelType::Orgtype).cloned());
    org_type_hits.extend(message_hits.iter().filter(|h| h.label_type == LabelType::Orgtype).cloned());

    let role_candidates = score_category(&role_hits, Role::ALL, role_label_str);
    let intent_candidates = score_category(&intent_hits, Intent::ALL, intent_label_str);

    let mut result = ScoringResult::default();

    emit_role_claims(&role_candidates, bundle, config, reference_date, &mut result);
    emit_intent_claims(&intent_candidates, bundle, config, reference_date, &mut result);
    emit_affiliation_and_org_type_claims(
        all_affiliation_hits,
        org_type_hits,
        bundle,
        config,
        reference_date,
        &mut result,
    );

    result
}

fn role_label_str(role: Role) -> &'static str {
    match role {
        Role::Bd => "bd",
        Role::Builder => "builder",
        Role::FounderExec => "founder_exec",
        Role::InvestorAnalyst => "investor_analyst",
        Role::Recruiter => "recruiter",
        Role::VendorAgency => "vendor_agency",
        Role::Community => "community",
        Role::MediaKol => "media_kol",
        Role::MarketMaker => "market_maker",
        Role::Unknown => "unknown",
    }
}

fn intent_label_str(intent: Intent) -> &'static str {
    match intent {
        Intent::Networking => "networking",
        Intent::Evaluating => "evaluating",
        Intent::Selling => "selling",
        Intent::Hiring => "hiring",
        Intent::SupportSeeking => "support_seeking",
        Intent::SupportGiving => "support_giving",
        Intent::Broadcasting => "broadcasting",
        Intent::Unknown => "unknown",
    }
}

/// Aggregate hits into per-label raw scores (message hits log-compressed,
/// everything else summed directly — spec.md §4.2.3/§4.3), then softmax
/// into probabilities. Taxonomy order (`labels`, the `ALL` array) is the
/// tie-break for deterministic "top label" comparisons (spec.md §4.3).
fn score_category<L: Copy>(hits: &[Hit], labels: impl IntoIterator<Item = L>, label_str: fn(L) -> &'static str) -> Vec<Candidate<L>> {
    let labels: Vec<L> = labels.into_iter().collect();

    let raw_scores: Vec<f32> = labels
        .iter()
        .map(|&l| aggregate_label_score(hits, label_str(l)))
        .collect();

    let probabilities = softmax(&raw_scores);

    labels
        .into_iter()
        .zip(probabilities)
        .map(|(l, probability)| {
            let label_hits: Vec<Hit> = hits
                .iter()
                .filter(|h| h.label == label_str(l))
                .cloned()
                .collect();
            let eligible = label_hits.iter().any(|h| {
                matches!(
                    h.evidence_type,
                    EvidenceType::Bio | EvidenceType::Message | EvidenceType::DisplayName
                )
            });
            let non_membership_count = label_hits
                .iter()
                .filter(|h| h.evidence_type != EvidenceType::Membership)
                .count();
            Candidate {
                label: l,
                probability,
                eligible,
                non_membership_count,
                evidence: label_hits,
            }
        })
        .collect()
}

fn aggregate_label_score(hits: &[Hit], label: &str) -> f32 {
    let mut message_weight_sum = 0.0_f32;
    let mut other_sum = 0.0_f32;
    for h in hits.iter().filter(|h| h.label == label) {
        if h.evidence_type == EvidenceType::Message {
            message_weight_sum += h.effective_weight();
        } else {
            other_sum += h.effective_weight();
        }
    }
    other_sum + crate::extract::log_compress(message_weight_sum)
}

fn softmax(scores: &[f32]) -> Vec<f32> {
    if scores.is_empty() {
        return Vec::new();
    }
    let max = scores.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum <= 0.0 {
        vec![1.0 / scores.len() as f32; scores.len()]
    } else {
        exps.into_iter().map(|e| e / sum).collect()
    }
}

fn status_for(probability: f32, bundle: &UserBundle, evidence: &[Hit]) -> ClaimStatus {
    let has_substantive_evidence = evidence.iter().any(|h| {
        matches!(
            h.evidence_type,
            EvidenceType::Bio | EvidenceType::Message | EvidenceType::DisplayName
        )
    });
    if probability >= SUPPORTED_PROBABILITY_THRESHOLD
        && bundle.features.total_msg_count >= SUPPORTED_MIN_TOTAL_MSG_COUNT
        && has_substantive_evidence
    {
        ClaimStatus::Supported
    } else {
        ClaimStatus::Tentative
    }
}

fn passes_gates<L>(c: &Candidate<L>, config: &Config) -> bool {
    c.eligible
        && c.probability >= config.min_claim_confidence()
        && c.non_membership_count >= config.min_non_membership_evidence() as usize
}

fn emit_role_claims(
    candidates: &[Candidate<Role>],
    bundle: &UserBundle,
    config: &Config,
    reference_date: DateTime<Utc>,
    result: &mut ScoringResult,
) {
    let passing: Vec<&Candidate<Role>> = candidates
        .iter()
        .filter(|c| c.label != Role::Unknown && passes_gates(c, config))
        .collect();

    if passing.is_empty() {
        result.abstentions.push(build_abstention(
            "has_role",
            candidates,
            config,
            bundle,
            false,
            reference_date,
        ));
        return;
    }

    for c in passing {
        result.claims.push(Claim {
            user_id: bundle.user_id,
            object: ClaimObject::Role(c.label),
            confidence: c.probability,
            status: status_for(c.probability, bundle, &c.evidence),
            version: config.version().to_string(),
            evidence: c.evidence.clone(),
            generated_at: reference_date,
        });
    }
}

fn emit_intent_claims(
    candidates: &[Candidate<Intent>],
    bundle: &UserBundle,
    config: &Config,
    reference_date: DateTime<Utc>,
    result: &mut ScoringResult,
) {
    let top = candidates
        .iter()
        .filter(|c| c.label != Intent::Unknown)
        .max_by(|a, b| {
            a.probability
                .partial_cmp(&b.probability)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    match top {
        Some(c) if passes_gates(c, config) => {
            result.claims.push(Claim {
                user_id: bundle.user_id,
                object: ClaimObject::Intent(c.label),
                confidence: c.probability,
                status: status_for(c.probability, bundle, &c.evidence),
                version: config.version().to_string(),
                evidence: c.evidence.clone(),
                generated_at: reference_date,
            });
        }
        _ => {
            let near_miss = message::has_cooccurrence_near_miss(&MESSAGE_INTENT, &bundle.messages);
            result.abstentions.push(build_abstention(
                "has_intent",
                candidates,
                config,
                bundle,
                near_miss,
                reference_date,
            ));
        }
    }
}

fn build_abstention<L: Copy>(
    predicate: &'static str,
    candidates: &[Candidate<L>],
    config: &Config,
    bundle: &UserBundle,
    near_miss: bool,
    reference_date: DateTime<Utc>,
) -> Abstention {
    let all_hits_empty = candidates.iter().all(|c| c.evidence.is_empty());

    let top = candidates.iter().max_by(|a, b| {
        a.probability
            .partial_cmp(&b.probability)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let (reason, details) = if all_hits_empty {
        if near_miss {
            (
                AbstentionReason::GatedByCooccurrence,
                "a pattern matched but its required co-occurrence token was absent".to_string(),
            )
        } else {
            (AbstentionReason::NoData, "no evidence of any type".to_string())
        }
    } else {
        match top {
            Some(c) if !c.eligible || c.non_membership_count < config.min_non_membership_evidence() as usize => (
                AbstentionReason::InsufficientEvidence,
                format!(
                    "top candidate had {} non-membership evidence row(s), needs {}",
                    c.non_membership_count,
                    config.min_non_membership_evidence()
                ),
            ),
            Some(c) if c.probability < config.min_claim_confidence() => (
                AbstentionReason::LowConfidence,
                format!("top candidate probability {:.3} below threshold", c.probability),
            ),
            _ => (
                AbstentionReason::GatedByCooccurrence,
                "top candidate rejected by a pattern-specific gate".to_string(),
            ),
        }
    };

    Abstention {
        user_id: bundle.user_id,
        predicate,
        reason,
        details,
        version: config.version().to_string(),
        generated_at: reference_date,
    }
}

fn emit_affiliation_and_org_type_claims(
    affiliation_hits: Vec<Hit>,
    org_type_hits_vec: Vec<Hit>,
    bundle: &UserBundle,
    config: &Config,
    reference_date: DateTime<Utc>,
    result: &mut ScoringResult,
) {
    for candidate in affiliation::dedup_affiliation_hits(affiliation_hits) {
        let non_membership_count = candidate
            .hits
            .iter()
            .filter(|h| h.evidence_type != EvidenceType::Membership)
            .count();
        if non_membership_count < config.min_non_membership_evidence() as usize {
            continue;
        }
        let status = if affiliation::has_bio_or_display_name_source(&candidate) {
            ClaimStatus::Supported
        } else {
            status_for(1.0, bundle, &candidate.hits)
        };
        result.claims.push(Claim {
            user_id: bundle.user_id,
            object: ClaimObject::Affiliation(candidate.display_value),
            confidence: 1.0,
            status,
            version: config.version().to_string(),
            evidence: candidate.hits,
            generated_at: reference_date,
        });
    }

    let mut seen_org_types: Vec<OrgType> = Vec::new();
    for hit in org_type_hits_vec {
        let org_type = crate::taxonomy::parse_org_type(&hit.label);
        if org_type == OrgType::Unknown || seen_org_types.contains(&org_type) {
            continue;
        }
        let non_membership_count = usize::from(hit.evidence_type != EvidenceType::Membership);
        if non_membership_count < config.min_non_membership_evidence() as usize {
            continue;
        }
        seen_org_types.push(org_type);
        result.claims.push(Claim {
            user_id: bundle.user_id,
            object: ClaimObject::OrgType(org_type),
            confidence: 1.0,
            status: ClaimStatus::Supported,
            version: config.version().to_string(),
            evidence: vec![hit],
            generated_at: reference_date,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{FeatureSnapshot, UserBundle};
    use uuid::Uuid;

    fn config_with(min_conf: f32, min_evidence: u32) -> Config {
        let json = serde_json::json!({
            "version": "v-test",
            "referenceDate": "2026-01-01T00:00:00Z",
            "gating": { "minClaimConfidence": min_conf, "minNonMembershipEvidence": min_evidence },
            "rolePriors": { "bd": {}, "work": {}, "general_chat": {}, "unknown": {} },
            "intentPriors": { "bd": {}, "work": {}, "general_chat": {}, "unknown": {} },
        });
        let dir = std::env::temp_dir().join(format!("scorer-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, json.to_string()).unwrap();
        Config::load(&path).unwrap()
    }

    fn empty_bundle() -> UserBundle {
        UserBundle {
            user_id: Uuid::new_v4(),
            display_name: String::new(),
            bio: String::new(),
            memberships: vec![],
            features: FeatureSnapshot::default(),
            messages: vec![],
        }
    }

    #[test]
    fn user_with_no_data_abstains_with_no_data_reason_for_both_predicates() {
        let config = config_with(0.3, 1);
        let bundle = empty_bundle();
        let result = score_user(&bundle, &config, Utc::now());
        assert!(result.claims.is_empty());
        assert_eq!(result.abstentions.len(), 2);
        assert!(result
            .abstentions
            .iter()
            .all(|a| a.reason == AbstentionReason::NoData));
    }
}

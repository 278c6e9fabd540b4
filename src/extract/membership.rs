//! Membership extractor (spec.md §4.2.5). Emits one evidence hit per
//! membership so the prior that drove a label is auditable, but these
//! hits never suffice to emit a claim on their own — they are always
//! `EvidenceType::Membership` and excluded from the non-membership-
//! evidence gate.

use crate::bundle::Membership;
use crate::config::Config;
use crate::evidence::Hit;
use crate::taxonomy::{EvidenceType, GroupKind, Intent, LabelType, Role};

pub fn extract_role_hits(memberships: &[Membership], config: &Config) -> Vec<Hit> {
    memberships
        .iter()
        .flat_map(|m| {
            Role::ALL.into_iter().filter_map(move |role| {
                let prior = config.role_prior(m.group_kind, role);
                (prior != 0.0).then(|| membership_hit(m, LabelType::Role, role_str(role), prior))
            })
        })
        .collect()
}

pub fn extract_intent_hits(memberships: &[Membership], config: &Config) -> Vec<Hit> {
    memberships
        .iter()
        .flat_map(|m| {
            Intent::ALL.into_iter().filter_map(move |intent| {
                let prior = config.intent_prior(m.group_kind, intent);
                (prior != 0.0)
                    .then(|| membership_hit(m, LabelType::Intent, intent_str(intent), prior))
            })
        })
        .collect()
}

fn membership_hit(m: &Membership, label_type: LabelType, label: &str, weight: f32) -> Hit {
    Hit::new(
        EvidenceType::Membership,
        format!("membership:{}", m.group_id),
        label_type,
        label,
        weight,
    )
}

fn role_str(role: Role) -> &'static str {
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

fn intent_str(intent: Intent) -> &'static str {
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn minimal_config() -> Config {
        let json = serde_json::json!({
            "version": "v-test",
            "referenceDate": "2026-01-01T00:00:00Z",
            "gating": { "minClaimConfidence": 0.5, "minNonMembershipEvidence": 1 },
            "rolePriors": { "bd": { "bd": 0.8 }, "work": {}, "general_chat": {}, "unknown": {} },
            "intentPriors": { "bd": {}, "work": {}, "general_chat": {}, "unknown": {} },
        });
        let dir = std::env::temp_dir().join(format!("membership-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, json.to_string()).unwrap();
        Config::load(&path).unwrap()
    }

    #[test]
    fn membership_hits_never_have_non_membership_evidence_type() {
        let config = minimal_config();
        let m = Membership {
            group_id: Uuid::new_v4(),
            group_kind: GroupKind::Bd,
            first_seen: Utc::now(),
            last_seen: Utc::now(),
            msg_count: 10,
            is_current_member: true,
        };
        let hits = extract_role_hits(&[m], &config);
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|h| h.evidence_type == EvidenceType::Membership));
    }
}

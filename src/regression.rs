//! C5 Regression Harness (spec.md §4.5). Feeds synthetic user bundles
//! through C2+C3 with no database and asserts `expected`/`forbidden`
//! claims, the way the taxonomy and gates are meant to be audited.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::bundle::{FeatureSnapshot, MessageSample, Membership, UserBundle};
use crate::claim::ClaimObject;
use crate::config::Config;
use crate::extract::normalize_org_name;
use crate::scorer::score_user;
use crate::taxonomy::{parse_group_kind, ClaimStatus};

#[derive(Debug, Clone, Deserialize)]
pub struct RegressionMessage {
    pub text: String,
    #[serde(default)]
    pub days_ago: i64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RegressionFeatures {
    #[serde(default)]
    pub total_reply_count: u64,
    #[serde(default)]
    pub total_mention_count: u64,
    #[serde(default)]
    pub avg_msg_len: f32,
    #[serde(default)]
    pub bd_group_msg_share: f32,
    #[serde(default)]
    pub groups_active_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Assertion {
    pub predicate: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegressionCase {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub messages: Vec<RegressionMessage>,
    #[serde(rename = "memberGroupKinds", default)]
    pub member_group_kinds: Vec<String>,
    #[serde(rename = "totalMsgCount", default)]
    pub total_msg_count: u64,
    #[serde(default)]
    pub features: RegressionFeatures,
    #[serde(default)]
    pub expected: Vec<Assertion>,
    #[serde(default)]
    pub forbidden: Vec<Assertion>,
    #[serde(rename = "expectedGated", default)]
    pub expected_gated: bool,
}

pub struct CaseReport {
    pub name: String,
    pub passed: bool,
    pub missing_expected: Vec<String>,
    pub found_forbidden: Vec<String>,
}

pub struct RegressionReport {
    pub cases: Vec<CaseReport>,
}

impl RegressionReport {
    pub fn all_passed(&self) -> bool {
        self.cases.iter().all(|c| c.passed)
    }
}

fn to_bundle(case: &RegressionCase, reference_date: DateTime<Utc>) -> UserBundle {
    let messages = case
        .messages
        .iter()
        .enumerate()
        .map(|(i, m)| MessageSample {
            external_id: format!("regression-msg-{i}"),
            sent_at: reference_date - chrono::Duration::days(m.days_ago),
            text: m.text.clone(),
        })
        .collect();

    let memberships = case
        .member_group_kinds
        .iter()
        .map(|k| Membership {
            group_id: Uuid::new_v4(),
            group_kind: parse_group_kind(k),
            first_seen: reference_date,
            last_seen: reference_date,
            msg_count: 0,
            is_current_member: true,
        })
        .collect();

    let features = FeatureSnapshot {
        total_msg_count: case.total_msg_count,
        total_reply_count: case.features.total_reply_count,
        total_mention_count: case.features.total_mention_count,
        avg_msg_len: case.features.avg_msg_len,
        bd_group_msg_share: case.features.bd_group_msg_share,
        groups_active_count: case.features.groups_active_count,
    };

    UserBundle {
        user_id: Uuid::new_v4(),
        display_name: case.display_name.clone(),
        bio: case.bio.clone(),
        memberships,
        features,
        messages,
    }
}

fn status_str(status: ClaimStatus) -> &'static str {
    match status {
        ClaimStatus::Supported => "supported",
        ClaimStatus::Tentative => "tentative",
    }
}

fn matches_assertion(object: &ClaimObject, status: ClaimStatus, assertion: &Assertion) -> bool {
    if object.predicate() != assertion.predicate {
        return false;
    }
    if let Some(expected_value) = &assertion.value {
        let object_value = object.object_value();
        let values_match = if matches!(object, ClaimObject::Affiliation(_)) {
            normalize_org_name(&object_value) == normalize_org_name(expected_value)
        } else {
            object_value == *expected_value
        };
        if !values_match {
            return false;
        }
    }
    if let Some(expected_status) = &assertion.status {
        if status_str(status) != expected_status {
            return false;
        }
    }
    true
}

pub fn run_cases(config: &Config, cases: &[RegressionCase], reference_date: DateTime<Utc>) -> RegressionReport {
    let reports = cases
        .iter()
        .map(|case| run_one(config, case, reference_date))
        .collect();
    RegressionReport { cases: reports }
}

fn run_one(config: &Config, case: &RegressionCase, reference_date: DateTime<Utc>) -> CaseReport {
    let bundle = to_bundle(case, reference_date);
    let result = score_user(&bundle, config, reference_date);

    let mut missing_expected = Vec::new();
    let mut found_forbidden = Vec::new();

    if case.expected_gated {
        if !result.claims.is_empty() {
            found_forbidden.push(format!(
                "expected full gating (no claims) but {} claim(s) were emitted",
                result.claims.len()
            ));
        }
    }

    for assertion in &case.expected {
        let found = result
            .claims
            .iter()
            .any(|c| matches_assertion(&c.object, c.status, assertion));
        if !found {
            missing_expected.push(describe(assertion));
        }
    }

    for assertion in &case.forbidden {
        let found = result
            .claims
            .iter()
            .any(|c| matches_assertion(&c.object, c.status, assertion));
        if found {
            found_forbidden.push(describe(assertion));
        }
    }

    CaseReport {
        name: case.name.clone(),
        passed: missing_expected.is_empty() && found_forbidden.is_empty(),
        missing_expected,
        found_forbidden,
    }
}

fn describe(assertion: &Assertion) -> String {
    format!(
        "{}{}{}",
        assertion.predicate,
        assertion
            .value
            .as_ref()
            .map(|v| format!("={v}"))
            .unwrap_or_default(),
        assertion
            .status
            .as_ref()
            .map(|s| format!(" (status={s})"))
            .unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(min_conf: f32, min_evidence: u32) -> Config {
        let json = serde_json::json!({
            "version": "v-test",
            "referenceDate": "2026-01-01T00:00:00Z",
            "gating": { "minClaimConfidence": min_conf, "minNonMembershipEvidence": min_evidence },
            "rolePriors": { "bd": {}, "work": {}, "general_chat": {}, "unknown": {} },
            "intentPriors": { "bd": {}, "work": {}, "general_chat": {}, "unknown": {} },
        });
        let dir = std::env::temp_dir().join(format!("regression-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, json.to_string()).unwrap();
        Config::load(&path).unwrap()
    }

    #[test]
    fn zero_evidence_case_expects_gating() {
        let config = config_with(0.3, 1);
        let case = RegressionCase {
            name: "no-evidence".to_string(),
            display_name: String::new(),
            bio: String::new(),
            messages: vec![],
            member_group_kinds: vec![],
            total_msg_count: 0,
            features: RegressionFeatures::default(),
            expected: vec![],
            forbidden: vec![],
            expected_gated: true,
        };
        let report = run_cases(&config, &[case], Utc::now());
        assert!(report.all_passed());
    }
}

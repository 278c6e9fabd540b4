use claims_engine::config::Config;

fn write_config(dir: &tempfile::TempDir, body: &serde_json::Value) -> std::path::PathBuf {
    let path = dir.path().join("config.json");
    std::fs::write(&path, body.to_string()).unwrap();
    path
}

const REFERENCE_DATE: &str = "2026-01-01T00:00:00Z";

fn full_priors(role_value: f32, intent_value: f32) -> (serde_json::Value, serde_json::Value) {
    let role_priors = serde_json::json!({
        "bd": { "bd": role_value },
        "work": { "builder": role_value },
        "general_chat": {},
        "unknown": {},
    });
    let intent_priors = serde_json::json!({
        "bd": { "networking": intent_value },
        "work": {},
        "general_chat": {},
        "unknown": {},
    });
    (role_priors, intent_priors)
}

#[test]
fn loads_the_shipped_default_config() {
    let config = Config::load("config/default.json").expect("default config must load");
    assert!(config.min_claim_confidence() > 0.0);
    assert!(config.min_non_membership_evidence() >= 1);
}

#[test]
fn rejects_config_missing_version() {
    let dir = tempfile::tempdir().unwrap();
    let (role_priors, intent_priors) = full_priors(0.1, 0.1);
    let body = serde_json::json!({
        "referenceDate": REFERENCE_DATE,
        "gating": { "minClaimConfidence": 0.3, "minNonMembershipEvidence": 1 },
        "rolePriors": role_priors,
        "intentPriors": intent_priors,
    });
    let path = write_config(&dir, &body);
    assert!(Config::load(&path).is_err());
}

#[test]
fn rejects_config_missing_reference_date() {
    let dir = tempfile::tempdir().unwrap();
    let (role_priors, intent_priors) = full_priors(0.1, 0.1);
    let body = serde_json::json!({
        "version": "v-test",
        "gating": { "minClaimConfidence": 0.3, "minNonMembershipEvidence": 1 },
        "rolePriors": role_priors,
        "intentPriors": intent_priors,
    });
    let path = write_config(&dir, &body);
    assert!(Config::load(&path).is_err());
}

#[test]
fn rejects_config_missing_a_group_kind_entry() {
    let dir = tempfile::tempdir().unwrap();
    let body = serde_json::json!({
        "version": "v-test",
        "referenceDate": REFERENCE_DATE,
        "gating": { "minClaimConfidence": 0.3, "minNonMembershipEvidence": 1 },
        "rolePriors": { "bd": {}, "work": {}, "general_chat": {} },
        "intentPriors": { "bd": {}, "work": {}, "general_chat": {}, "unknown": {} },
    });
    let path = write_config(&dir, &body);
    assert!(
        Config::load(&path).is_err(),
        "missing the unknown GroupKind entry entirely must fail validation"
    );
}

#[test]
fn unknown_prior_label_within_a_present_group_kind_falls_back_to_zero() {
    let dir = tempfile::tempdir().unwrap();
    let body = serde_json::json!({
        "version": "v-test",
        "referenceDate": REFERENCE_DATE,
        "gating": { "minClaimConfidence": 0.3, "minNonMembershipEvidence": 1 },
        "rolePriors": { "bd": { "not_a_real_role": 0.9 }, "work": {}, "general_chat": {}, "unknown": {} },
        "intentPriors": { "bd": {}, "work": {}, "general_chat": {}, "unknown": {} },
    });
    let path = write_config(&dir, &body);
    let config = Config::load(&path).expect("unknown prior key must not fail load");
    assert_eq!(
        config.role_prior(claims_engine::taxonomy::GroupKind::Bd, claims_engine::taxonomy::Role::Builder),
        0.0
    );
}

#[test]
fn rejects_out_of_range_min_claim_confidence() {
    let dir = tempfile::tempdir().unwrap();
    let (role_priors, intent_priors) = full_priors(0.1, 0.1);
    let body = serde_json::json!({
        "version": "v-test",
        "gating": { "minClaimConfidence": 1.5, "minNonMembershipEvidence": 1 },
        "rolePriors": role_priors,
        "intentPriors": intent_priors,
    });
    let path = write_config(&dir, &body);
    assert!(Config::load(&path).is_err());
}

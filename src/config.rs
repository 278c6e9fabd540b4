//! C1 Taxonomy & Config Loader (spec.md §4.1).
//!
//! The config is loaded once per path and handed around by reference —
//! there is no hot-reload and no process-wide cache keyed by file mtime,
//! unlike pattern/weight reloading elsewhere in this lineage of crates.
//! A run's determinism guarantee depends on the config being fixed for
//! its whole duration.

use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::Error;
use crate::taxonomy::{GroupKind, Intent, Role};

const DEFAULT_CONFIG_PATH: &str = "config/default.json";
const CONFIG_ENV_VAR: &str = "INFERENCE_CONFIG";

#[derive(Debug, Deserialize)]
struct RawConfig {
    version: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "referenceDate")]
    reference_date: Option<String>,
    gating: Option<RawGating>,
    #[serde(rename = "rolePriors", default)]
    role_priors: HashMap<String, HashMap<String, f32>>,
    #[serde(rename = "intentPriors", default)]
    intent_priors: HashMap<String, HashMap<String, f32>>,
}

#[derive(Debug, Deserialize)]
struct RawGating {
    #[serde(rename = "minClaimConfidence")]
    min_claim_confidence: Option<f32>,
    #[serde(rename = "minNonMembershipEvidence")]
    min_non_membership_evidence: Option<u32>,
}

/// Validated, immutable run configuration. Cheap to clone (`Arc`-backed
/// internals) so the CLI can load it once and pass it by reference or
/// by clone into the scorer/writer without re-parsing.
#[derive(Debug, Clone)]
pub struct Config {
    inner: Arc<ConfigInner>,
}

#[derive(Debug)]
struct ConfigInner {
    version: String,
    #[allow(dead_code)]
    description: Option<String>,
    reference_date: DateTime<Utc>,
    min_claim_confidence: f32,
    min_non_membership_evidence: u32,
    role_priors: HashMap<GroupKind, HashMap<Role, f32>>,
    intent_priors: HashMap<GroupKind, HashMap<Intent, f32>>,
}

impl Config {
    /// Resolve the config path from `INFERENCE_CONFIG`, falling back to
    /// `config/default.json`, then load it.
    pub fn load_default() -> Result<Config, Error> {
        let path = env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Config::load(path)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, Error> {
        let path = path.as_ref();
        let raw_text = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigInvalid(format!("failed to read config at {}: {e}", path.display()))
        })?;
        let raw: RawConfig = serde_json::from_str(&raw_text)
            .map_err(|e| Error::ConfigInvalid(format!("malformed config JSON: {e}")))?;
        Config::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Config, Error> {
        let version = raw
            .version
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::ConfigInvalid("missing or empty `version`".to_string()))?;

        let reference_date_str = raw
            .reference_date
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::ConfigInvalid("missing or empty `referenceDate`".to_string()))?;
        let reference_date = DateTime::parse_from_rfc3339(&reference_date_str)
            .map_err(|e| Error::ConfigInvalid(format!("malformed `referenceDate`: {e}")))?
            .with_timezone(&Utc);

        let gating = raw
            .gating
            .ok_or_else(|| Error::ConfigInvalid("missing `gating` block".to_string()))?;
        let min_claim_confidence = gating.min_claim_confidence.ok_or_else(|| {
            Error::ConfigInvalid("missing `gating.minClaimConfidence`".to_string())
        })?;
        if !(0.0..1.0).contains(&min_claim_confidence) {
            return Err(Error::ConfigInvalid(format!(
                "gating.minClaimConfidence must be in (0,1), got {min_claim_confidence}"
            )));
        }
        let min_non_membership_evidence = gating.min_non_membership_evidence.ok_or_else(|| {
            Error::ConfigInvalid("missing `gating.minNonMembershipEvidence`".to_string())
        })?;
        if min_non_membership_evidence < 1 {
            return Err(Error::ConfigInvalid(
                "gating.minNonMembershipEvidence must be >= 1".to_string(),
            ));
        }

        for kind in GroupKind::ALL {
            let key = group_kind_key(kind);
            if !raw.role_priors.contains_key(key) {
                return Err(Error::ConfigInvalid(format!(
                    "rolePriors missing required GroupKind `{key}`"
                )));
            }
            if !raw.intent_priors.contains_key(key) {
                return Err(Error::ConfigInvalid(format!(
                    "intentPriors missing required GroupKind `{key}`"
                )));
            }
        }

        let role_priors = convert_priors(&raw.role_priors, crate::taxonomy::parse_role);
        let intent_priors = convert_priors(&raw.intent_priors, crate::taxonomy::parse_intent);

        Ok(Config {
            inner: Arc::new(ConfigInner {
                version,
                description: raw.description,
                reference_date,
                min_claim_confidence,
                min_non_membership_evidence,
                role_priors,
                intent_priors,
            }),
        })
    }

    pub fn version(&self) -> &str {
        &self.inner.version
    }

    /// Fixed scoring clock (spec.md §4.2.3, §9 "Fixed reference date &
    /// half-life"). Decay is always computed relative to this, never
    /// wall-clock time, so re-running the engine on unchanged data and
    /// config reproduces identical output; re-aging an old run means
    /// changing this value, not waiting.
    pub fn reference_date(&self) -> DateTime<Utc> {
        self.inner.reference_date
    }

    pub fn min_claim_confidence(&self) -> f32 {
        self.inner.min_claim_confidence
    }

    pub fn min_non_membership_evidence(&self) -> u32 {
        self.inner.min_non_membership_evidence
    }

    /// Never panics on an unconfigured (group_kind, role) pair — defaults
    /// to 0.0, matching the "unknown key -> sentinel weight" rule in
    /// spec.md §4.1.
    pub fn role_prior(&self, group_kind: GroupKind, role: Role) -> f32 {
        self.inner
            .role_priors
            .get(&group_kind)
            .and_then(|m| m.get(&role))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn intent_prior(&self, group_kind: GroupKind, intent: Intent) -> f32 {
        self.inner
            .intent_priors
            .get(&group_kind)
            .and_then(|m| m.get(&intent))
            .copied()
            .unwrap_or(0.0)
    }
}

fn group_kind_key(kind: GroupKind) -> &'static str {
    match kind {
        GroupKind::Bd => "bd",
        GroupKind::Work => "work",
        GroupKind::GeneralChat => "general_chat",
        GroupKind::Unknown => "unknown",
    }
}

fn convert_priors<L: Eq + std::hash::Hash + Copy>(
    raw: &HashMap<String, HashMap<String, f32>>,
    parse_label: impl Fn(&str) -> L,
) -> HashMap<GroupKind, HashMap<L, f32>> {
    let mut out = HashMap::new();
    for kind in GroupKind::ALL {
        let key = group_kind_key(kind);
        let mut labels = HashMap::new();
        if let Some(raw_labels) = raw.get(key) {
            for (label_str, weight) in raw_labels {
                labels.insert(parse_label(label_str), *weight);
            }
        }
        out.insert(kind, labels);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_json() -> String {
        serde_json::json!({
            "version": "v0.5.8",
            "referenceDate": "2026-01-01T00:00:00Z",
            "gating": { "minClaimConfidence": 0.5, "minNonMembershipEvidence": 1 },
            "rolePriors": { "bd": {}, "work": {}, "general_chat": {}, "unknown": {} },
            "intentPriors": { "bd": {}, "work": {}, "general_chat": {}, "unknown": {} },
        })
        .to_string()
    }

    #[test]
    fn loads_minimal_valid_config() {
        let raw: RawConfig = serde_json::from_str(&minimal_json()).unwrap();
        let cfg = Config::from_raw(raw).unwrap();
        assert_eq!(cfg.version(), "v0.5.8");
        assert_eq!(cfg.min_claim_confidence(), 0.5);
        assert_eq!(cfg.reference_date().to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn missing_reference_date_is_config_invalid() {
        let mut v: serde_json::Value = serde_json::from_str(&minimal_json()).unwrap();
        v.as_object_mut().unwrap().remove("referenceDate");
        let raw: RawConfig = serde_json::from_value(v).unwrap();
        assert!(matches!(Config::from_raw(raw), Err(Error::ConfigInvalid(_))));
    }

    #[test]
    fn missing_version_is_config_invalid() {
        let mut v: serde_json::Value = serde_json::from_str(&minimal_json()).unwrap();
        v.as_object_mut().unwrap().remove("version");
        let raw: RawConfig = serde_json::from_value(v).unwrap();
        assert!(matches!(Config::from_raw(raw), Err(Error::ConfigInvalid(_))));
    }

    #[test]
    fn missing_group_kind_in_priors_is_config_invalid() {
        let mut v: serde_json::Value = serde_json::from_str(&minimal_json()).unwrap();
        v["rolePriors"].as_object_mut().unwrap().remove("work");
        let raw: RawConfig = serde_json::from_value(v).unwrap();
        assert!(matches!(Config::from_raw(raw), Err(Error::ConfigInvalid(_))));
    }

    #[test]
    fn unknown_prior_label_falls_back_to_zero() {
        let raw: RawConfig = serde_json::from_str(&minimal_json()).unwrap();
        let cfg = Config::from_raw(raw).unwrap();
        assert_eq!(cfg.role_prior(GroupKind::Bd, Role::FounderExec), 0.0);
    }
}

//! Bio extractor (spec.md §4.2.2).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::evidence::Hit;
use crate::patterns::{BIO_AFFILIATION, BIO_INTENT, BIO_ROLE};
use crate::taxonomy::{EvidenceType, LabelType};

static BUSINESS_DEVELOPER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bbusiness\s+developer\b").unwrap());

/// Run bio-role and bio-intent patterns; "Business Developer" always
/// overrides a builder hit into `bd`.
pub fn extract_role_intent(bio: &str) -> Vec<Hit> {
    if bio.trim().is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<Hit> = BIO_ROLE
        .iter()
        .filter_map(|pattern| {
            pattern.regex.find(bio).map(|_| {
                Hit::new(
                    EvidenceType::Bio,
                    format!("bio_keyword:{}", pattern.pattern_id),
                    pattern.label_type,
                    pattern.label.clone(),
                    pattern.weight,
                )
                .with_pattern_id(pattern.pattern_id.clone())
            })
        })
        .collect();

    hits.extend(BIO_INTENT.iter().filter_map(|pattern| {
        pattern.regex.find(bio).map(|_| {
            Hit::new(
                EvidenceType::Bio,
                format!("bio_keyword:{}", pattern.pattern_id),
                pattern.label_type,
                pattern.label.clone(),
                pattern.weight,
            )
            .with_pattern_id(pattern.pattern_id.clone())
        })
    }));

    if BUSINESS_DEVELOPER.is_match(bio) {
        for h in hits.iter_mut() {
            if h.label_type == LabelType::Role && h.label == "builder" {
                h.label = "bd".to_string();
                h.evidence_ref = "bio_keyword:business_developer_override".to_string();
            }
        }
        if !hits
            .iter()
            .any(|h| h.label_type == LabelType::Role && h.label == "bd")
        {
            hits.push(Hit::new(
                EvidenceType::Bio,
                "bio_keyword:business_developer_override",
                LabelType::Role,
                "bd",
                1.0,
            ));
        }
    }

    hits
}

/// Affiliation candidates from the bio's affiliation pattern family; the
/// captured org string is left un-normalised here, the caller dedups.
pub fn extract_affiliation(bio: &str) -> Vec<(String, Hit)> {
    if bio.trim().is_empty() {
        return Vec::new();
    }
    BIO_AFFILIATION
        .iter()
        .filter_map(|pattern| {
            pattern.regex.captures(bio).map(|caps| {
                let org = caps
                    .get(1)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| caps.get(0).unwrap().as_str().to_string());
                let hit = Hit::new(
                    EvidenceType::Bio,
                    format!("affiliation:{org}"),
                    LabelType::Affiliation,
                    org.clone(),
                    pattern.weight,
                )
                .with_pattern_id(pattern.pattern_id.clone());
                (org, hit)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_developer_overrides_builder_hit() {
        let hits = extract_role_intent("Business Developer and builder of cool things");
        assert!(hits.iter().any(|h| h.label == "bd"));
        assert!(!hits.iter().any(|h| h.label == "builder"));
    }

    #[test]
    fn empty_bio_yields_no_hits() {
        assert!(extract_role_intent("").is_empty());
        assert!(extract_affiliation("").is_empty());
    }
}

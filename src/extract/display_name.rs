//! Display-name extractor (spec.md §4.2.1).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::evidence::Hit;
use crate::patterns::DISPLAY_NAME_ROLE;
use crate::taxonomy::EvidenceType;

use super::{apply_is_a_clamp, is_org_title_reject, split_segments};

static UPPERCASE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z][A-Za-z]*\b").unwrap());
static VC_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\s)VC(?:\s|$)").unwrap());
static VC_CONJUNCTION_CONTEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:and|or|&)\s+VC\b").unwrap());
static MM_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\s)MM(?:\s|$)").unwrap());
static MM_PREFIXED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z][A-Za-z]+\s+MM\b").unwrap());
static MARKET_MAKER_LONGFORM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bmarket[\s-]?mak(?:er|ing)\b|\bliquidity\s+provider\b").unwrap());

/// Run all display-name role/org patterns against each segment of the
/// (IS_A-clamped, separator-split) display name, applying the bare
/// `VC`/`MM` disambiguation rules.
pub fn extract(display_name: &str) -> Vec<Hit> {
    let clamped = apply_is_a_clamp(display_name);
    let segments = split_segments(&clamped);
    let mut hits = Vec::new();

    for segment in &segments {
        for pattern in DISPLAY_NAME_ROLE.iter() {
            if let Some(m) = pattern.regex.find(segment) {
                hits.push(
                    Hit::new(
                        EvidenceType::DisplayName,
                        format!("display_name_keyword:{}", pattern.pattern_id),
                        pattern.label_type,
                        pattern.label.clone(),
                        pattern.weight,
                    )
                    .with_pattern_id(pattern.pattern_id.clone())
                    .with_message_id(m.as_str().to_string()),
                );
            }
        }

        if vc_is_investor_evidence(segment) {
            hits.push(Hit::new(
                EvidenceType::DisplayName,
                "display_name_keyword:bare_vc_token",
                crate::taxonomy::LabelType::Role,
                "investor_analyst",
                1.0,
            ));
        }

        if market_maker_org_evidence(segment) {
            hits.push(Hit::new(
                EvidenceType::DisplayName,
                "display_name_keyword:market_maker_org",
                crate::taxonomy::LabelType::Orgtype,
                "market_maker",
                1.0,
            ));
        }
    }

    hits
}

fn vc_is_investor_evidence(segment: &str) -> bool {
    if !VC_TOKEN.is_match(&format!(" {segment} ")) {
        return false;
    }
    if VC_CONJUNCTION_CONTEXT.is_match(segment) {
        return false;
    }
    // Preceded by an uppercase word in the same segment, or at segment start.
    let trimmed = segment.trim();
    if trimmed.starts_with("VC") {
        return true;
    }
    if let Some(idx) = trimmed.find("VC") {
        let before = &trimmed[..idx];
        UPPERCASE_WORD.is_match(before.trim_end())
    } else {
        false
    }
}

fn market_maker_org_evidence(segment: &str) -> bool {
    if MARKET_MAKER_LONGFORM.is_match(segment) {
        return true;
    }
    if MM_TOKEN.is_match(&format!(" {segment} ")) {
        return MM_PREFIXED.is_match(segment);
    }
    false
}

/// Extract a candidate affiliation string (the org segment) from a
/// display name, rejecting bare title-only segments. Used by the
/// affiliation extractor, which owns dedup/normalisation.
pub fn candidate_affiliation(display_name: &str) -> Option<String> {
    let clamped = apply_is_a_clamp(display_name);
    let segments = split_segments(&clamped);
    segments
        .into_iter()
        .skip(1)
        .find(|s| !is_org_title_reject(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_vc_after_uppercase_word_is_investor_evidence() {
        assert!(vc_is_investor_evidence("Bloccelerate VC"));
    }

    #[test]
    fn bare_vc_in_conjunction_is_rejected() {
        assert!(!vc_is_investor_evidence("trading and VC"));
        assert!(!vc_is_investor_evidence("research or VC"));
    }

    #[test]
    fn bare_mm_without_prefix_is_not_org_evidence() {
        assert!(!market_maker_org_evidence("MM"));
    }

    #[test]
    fn prefixed_mm_is_org_evidence() {
        assert!(market_maker_org_evidence("AngeLabs MM"));
    }

    #[test]
    fn longform_market_maker_always_qualifies() {
        assert!(market_maker_org_evidence("market making desk"));
    }

    #[test]
    fn org_title_reject_segment_yields_no_affiliation_candidate() {
        assert_eq!(candidate_affiliation("Jane | Trader"), None);
    }

    #[test]
    fn bare_title_segment_still_yields_a_role_hit() {
        let hits = extract("Jane | Founder");
        assert!(hits.iter().any(|h| h.label == "founder_exec"));
        assert_eq!(candidate_affiliation("Jane | Founder"), None);
    }
}

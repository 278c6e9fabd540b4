//! Affiliation & org-type extractor (spec.md §4.2.6). Collects
//! `affiliated_with:<org>` and `has_org_type:<value>` hits from every
//! upstream source and deduplicates organisation strings by their
//! normalised form.

use crate::evidence::Hit;
use crate::taxonomy::{EvidenceType, LabelType};

use super::normalize_org_name;

/// One distinct organisation candidate after normalisation-based dedup,
/// carrying every hit that named it (any source, any weight).
pub struct OrgCandidate {
    pub normalized: String,
    pub display_value: String,
    pub hits: Vec<Hit>,
}

/// Merge affiliation hits (label carries the raw org string) into
/// distinct candidates keyed by `normalizeOrgName`. The first-seen raw
/// spelling is kept as the display value.
pub fn dedup_affiliation_hits(hits: Vec<Hit>) -> Vec<OrgCandidate> {
    let mut candidates: Vec<OrgCandidate> = Vec::new();
    for hit in hits {
        if hit.label_type != LabelType::Affiliation {
            continue;
        }
        let normalized = normalize_org_name(&hit.label);
        if normalized.is_empty() {
            continue;
        }
        match candidates.iter_mut().find(|c| c.normalized == normalized) {
            Some(existing) => existing.hits.push(hit),
            None => candidates.push(OrgCandidate {
                normalized,
                display_value: hit.label.clone(),
                hits: vec![hit],
            }),
        }
    }
    candidates
}

/// An affiliation hit sourced from bio or display-name is always emitted
/// as `supported` per spec.md §4.3 ("status is always supported for
/// affiliation hits sourced from bio/display_name").
pub fn has_bio_or_display_name_source(candidate: &OrgCandidate) -> bool {
    candidate
        .hits
        .iter()
        .any(|h| matches!(h.evidence_type, EvidenceType::Bio | EvidenceType::DisplayName))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn affiliation_hit(evidence_type: EvidenceType, org: &str) -> Hit {
        Hit::new(
            evidence_type,
            format!("affiliation:{org}"),
            LabelType::Affiliation,
            org,
            1.0,
        )
    }

    #[test]
    fn differently_spelled_orgs_with_same_normal_form_merge() {
        let hits = vec![
            affiliation_hit(EvidenceType::Bio, "AngeLabs."),
            affiliation_hit(EvidenceType::Message, "  angelabs  "),
        ];
        let candidates = dedup_affiliation_hits(hits);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].hits.len(), 2);
    }

    #[test]
    fn bio_sourced_affiliation_is_always_supported_eligible() {
        let hits = vec![affiliation_hit(EvidenceType::Bio, "AngeLabs")];
        let candidates = dedup_affiliation_hits(hits);
        assert!(has_bio_or_display_name_source(&candidates[0]));
    }
}

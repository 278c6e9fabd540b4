//! Message extractor (spec.md §4.2.3). Scans each sampled message with
//! the message-level pattern families and weights hits by a temporal
//! decay factor; the scorer (not this module) performs the log-
//! compressed aggregation across messages described in §4.2.3.

use chrono::{DateTime, Utc};

use crate::bundle::MessageSample;
use crate::evidence::Hit;
use crate::patterns::{Pattern, MESSAGE_AFFILIATION, MESSAGE_INTENT, MESSAGE_ORG_TYPE, MESSAGE_ROLE};
use crate::taxonomy::EvidenceType;

const SMART_CONTRACT_BARE_PATTERN_ID: &str = "builder_tech_smart_contract_bare";
const BUILDER_ACTION_LABEL: &str = "builder";

/// Run role, intent, affiliation, and org-type message patterns across
/// every sampled message. `has_dev_identity` is true when the bio or
/// display-name extractors already produced a builder/dev-identity hit,
/// which lifts the bare `smart contract` discount (§4.2.3 `builder_tech`).
pub fn extract(
    messages: &[MessageSample],
    reference_date: DateTime<Utc>,
    has_dev_identity: bool,
) -> Vec<Hit> {
    let mut hits = Vec::new();

    for message in messages {
        if message.text.trim().is_empty() {
            continue;
        }
        let decay_factor = super::decay(message.sent_at, reference_date);
        let mut message_hits = scan_family(&MESSAGE_ROLE, &message.text, EvidenceType::Message);
        message_hits.extend(scan_family(
            &MESSAGE_INTENT,
            &message.text,
            EvidenceType::Message,
        ));
        message_hits.extend(scan_affiliation_family(
            &MESSAGE_AFFILIATION,
            &message.text,
            EvidenceType::Message,
        ));
        message_hits.extend(scan_family(
            &MESSAGE_ORG_TYPE,
            &message.text,
            EvidenceType::Message,
        ));

        let has_builder_action_this_message = message_hits
            .iter()
            .any(|h| h.label == BUILDER_ACTION_LABEL && h.pattern_id.as_deref() != Some(SMART_CONTRACT_BARE_PATTERN_ID));

        for hit in message_hits.iter_mut() {
            if hit.pattern_id.as_deref() == Some(SMART_CONTRACT_BARE_PATTERN_ID)
                && !has_builder_action_this_message
                && !has_dev_identity
            {
                hit.weight *= 0.5;
            }
            hit.message_id = Some(message.external_id.clone());
        }

        for hit in message_hits {
            hits.push(hit.with_decay(decay_factor));
        }
    }

    hits
}

/// True when some message matched a pattern's base regex but failed that
/// pattern's `co_occurrence` requirement — the "almost emitted" case the
/// `gated_by_cooccurrence` abstention reason exists to name (spec.md
/// §4.3, e.g. `evaluating_schedule` without an investment-language token).
pub fn has_cooccurrence_near_miss(family: &[Pattern], messages: &[MessageSample]) -> bool {
    family.iter().any(|pattern| {
        let Some(co) = &pattern.co_occurrence else {
            return false;
        };
        messages
            .iter()
            .any(|m| pattern.regex.is_match(&m.text) && !co.is_match(&m.text))
    })
}

/// Affiliation patterns capture the org name in group 1; unlike the other
/// families, the emitted label is the captured text, not the pattern's
/// declared `label` field (spec.md §4.2.6).
fn scan_affiliation_family(family: &[Pattern], text: &str, evidence_type: EvidenceType) -> Vec<Hit> {
    family
        .iter()
        .filter_map(|pattern| {
            pattern.regex.captures(text).map(|caps| {
                let org = caps
                    .get(1)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| caps.get(0).unwrap().as_str().to_string());
                Hit::new(
                    evidence_type,
                    format!("affiliation:{org}"),
                    pattern.label_type,
                    org,
                    pattern.weight,
                )
                .with_pattern_id(pattern.pattern_id.clone())
            })
        })
        .collect()
}

fn scan_family(family: &[Pattern], text: &str, evidence_type: EvidenceType) -> Vec<Hit> {
    family
        .iter()
        .filter_map(|pattern| {
            if pattern.regex.is_match(text) {
                if let Some(co) = &pattern.co_occurrence {
                    if !co.is_match(text) {
                        return None;
                    }
                }
                Some(
                    Hit::new(
                        evidence_type,
                        format!("message_keyword:{}", pattern.pattern_id),
                        pattern.label_type,
                        pattern.label.clone(),
                        pattern.weight,
                    )
                    .with_pattern_id(pattern.pattern_id.clone()),
                )
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(text: &str, days_ago: i64) -> MessageSample {
        MessageSample {
            external_id: format!("m-{days_ago}"),
            sent_at: Utc::now() - Duration::days(days_ago),
            text: text.to_string(),
        }
    }

    #[test]
    fn empty_messages_yield_no_hits() {
        assert!(extract(&[], Utc::now(), false).is_empty());
    }

    #[test]
    fn blank_text_is_skipped() {
        let msgs = vec![sample("   ", 0)];
        assert!(extract(&msgs, Utc::now(), false).is_empty());
    }

    #[test]
    fn recent_and_old_messages_get_different_decay() {
        let reference = Utc::now();
        let msgs = vec![
            sample("I shipped a new PR #42 in rust today", 0),
            sample("I shipped a new PR #42 in rust today", 90),
        ];
        let hits = extract(&msgs, reference, false);
        let mut decays: Vec<f32> = hits.iter().filter_map(|h| h.decay_factor).collect();
        decays.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!(decays.first() < decays.last());
    }
}

//! Feature extractor (spec.md §4.2.4). Hits here are derived purely from
//! the numeric feature vector against a fixed threshold table — there's
//! no regex to embed, so unlike the other extractors this table lives in
//! code rather than in `patterns/`.

use crate::bundle::FeatureSnapshot;
use crate::evidence::Hit;
use crate::taxonomy::{EvidenceType, LabelType};

/// A threshold rule. Unlike the regex-driven pattern families, this
/// compares a named numeric feature against a cutoff; `pattern_id` still
/// doubles as the stable evidence id.
pub struct FeatureRule {
    pub pattern_id: &'static str,
    pub feature: FeatureName,
    pub min_value: f32,
    pub label_type: LabelType,
    pub label: &'static str,
    pub weight: f32,
}

#[derive(Clone, Copy)]
pub enum FeatureName {
    ReplyRatio,
    BdGroupMsgShare,
    GroupsActiveCount,
    TotalMentionCount,
}

fn feature_value(features: &FeatureSnapshot, name: FeatureName) -> f32 {
    match name {
        FeatureName::ReplyRatio => features.reply_ratio(),
        FeatureName::BdGroupMsgShare => features.bd_group_msg_share,
        FeatureName::GroupsActiveCount => features.groups_active_count as f32,
        FeatureName::TotalMentionCount => features.total_mention_count as f32,
    }
}

/// Rules are a fixed, documented list rather than JSON because they name
/// a feature field, not a regex — the weight/threshold columns are the
/// declarative part, spec.md §4.2.4's per-rule data.
const FEATURE_RULES: &[FeatureRule] = &[
    FeatureRule {
        pattern_id: "feature_high_reply_ratio_support_giving",
        feature: FeatureName::ReplyRatio,
        min_value: 0.4,
        label_type: LabelType::Intent,
        label: "support_giving",
        weight: 0.6,
    },
    FeatureRule {
        pattern_id: "feature_high_bd_share_bd_role",
        feature: FeatureName::BdGroupMsgShare,
        min_value: 0.5,
        label_type: LabelType::Role,
        label: "bd",
        weight: 0.7,
    },
    FeatureRule {
        pattern_id: "feature_many_active_groups_community",
        feature: FeatureName::GroupsActiveCount,
        min_value: 5.0,
        label_type: LabelType::Role,
        label: "community",
        weight: 0.4,
    },
    FeatureRule {
        pattern_id: "feature_high_mentions_media_kol",
        feature: FeatureName::TotalMentionCount,
        min_value: 50.0,
        label_type: LabelType::Role,
        label: "media_kol",
        weight: 0.3,
    },
];

pub fn extract(features: &FeatureSnapshot) -> Vec<Hit> {
    FEATURE_RULES
        .iter()
        .filter(|rule| feature_value(features, rule.feature) >= rule.min_value)
        .map(|rule| {
            Hit::new(
                EvidenceType::Feature,
                format!("feature_keyword:{}", rule.pattern_id),
                rule.label_type,
                rule.label,
                rule.weight,
            )
            .with_pattern_id(rule.pattern_id)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_features_yield_no_hits() {
        assert!(extract(&FeatureSnapshot::default()).is_empty());
    }

    #[test]
    fn high_bd_share_yields_bd_feature_hit() {
        let f = FeatureSnapshot {
            bd_group_msg_share: 0.9,
            total_msg_count: 10,
            ..Default::default()
        };
        let hits = extract(&f);
        assert!(hits.iter().any(|h| h.label == "bd"));
    }
}

//! C2 Evidence Extractors (spec.md §4.2). Each submodule is a pure
//! function over one input surface (display name, bio, messages,
//! features, memberships) that returns `Hit`s. None of these perform I/O
//! and none ever panic on malformed text — worst case, no hits.

pub mod affiliation;
pub mod bio;
pub mod display_name;
pub mod feature;
pub mod membership;
pub mod message;

use chrono::{DateTime, Utc};

/// Organisation-name normalisation used for affiliation/org-type dedup
/// (spec.md §4.2.6 `normalizeOrgName`): lowercase, strip leading/trailing
/// punctuation, collapse internal whitespace.
pub fn normalize_org_name(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let stripped: String = lowered
        .trim_matches(|c: char| c.is_ascii_punctuation())
        .to_string();
    let mut out = String::with_capacity(stripped.len());
    let mut last_was_space = false;
    for c in stripped.chars() {
        if c.is_whitespace() {
            if !last_was_space && !out.is_empty() {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out.trim_end().to_string()
}

/// Titles that must never be treated as an org name when they are the
/// only segment of a display name (spec.md §4.2.1).
pub const ORG_TITLE_REJECT_SET: &[&str] = &[
    "trader",
    "developer",
    "founder",
    "investor",
    "builder",
    "recruiter",
    "advisor",
    "consultant",
];

pub fn is_org_title_reject(segment: &str) -> bool {
    let lowered = segment.trim().to_lowercase();
    ORG_TITLE_REJECT_SET.contains(&lowered.as_str())
}

/// Split a display name on the separators the corpus uses between a
/// person's name and their org/title ("Kate | Bloccelerate VC").
pub fn split_segments(display_name: &str) -> Vec<String> {
    display_name
        .split(['|', '/', '\u{00B7}', '\u{2014}', '-', '@'])
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// "X is a Y" -> "X" (spec.md §4.2.1 `IS_A_CLAMP`). Only clamps when the
/// whole string matches the pattern; otherwise returns the input as-is.
pub fn apply_is_a_clamp(display_name: &str) -> String {
    static IS_A: once_cell::sync::Lazy<regex::Regex> = once_cell::sync::Lazy::new(|| {
        regex::Regex::new(r"(?i)^\s*(.+?)\s+is\s+an?\s+.+$").expect("static regex")
    });
    match IS_A.captures(display_name) {
        Some(caps) => caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_else(|| display_name.to_string()),
        None => display_name.to_string(),
    }
}

const HALF_LIFE_DAYS: f64 = 45.0;

/// Exponential temporal decay relative to a fixed reference date
/// (spec.md §4.2.3, §9 "Fixed reference date & half-life").
pub fn decay(sent_at: DateTime<Utc>, reference_date: DateTime<Utc>) -> f32 {
    let age_days = (reference_date - sent_at).num_seconds() as f64 / 86_400.0;
    let age_days = age_days.max(0.0);
    0.5_f64.powf(age_days / HALF_LIFE_DAYS) as f32
}

/// Log-compress per-message decayed weights before summing across
/// messages for one label (spec.md §4.2.3).
pub fn log_compress(sum_decayed_weight: f32) -> f32 {
    (1.0 + sum_decayed_weight.max(0.0)).log2()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_org_name_folds_case_and_whitespace() {
        assert_eq!(normalize_org_name("  Bloccelerate  VC. "), "bloccelerate vc");
    }

    #[test]
    fn split_segments_handles_pipe() {
        assert_eq!(
            split_segments("Kate | Bloccelerate VC"),
            vec!["Kate".to_string(), "Bloccelerate VC".to_string()]
        );
    }

    #[test]
    fn is_a_clamp_strips_trailing_descriptor() {
        assert_eq!(apply_is_a_clamp("Nick is a builder at AngeLabs"), "Nick");
    }

    #[test]
    fn is_a_clamp_no_op_without_match() {
        assert_eq!(apply_is_a_clamp("Kate | Bloccelerate VC"), "Kate | Bloccelerate VC");
    }

    #[test]
    fn decay_is_one_at_reference_date() {
        let now = Utc::now();
        assert!((decay(now, now) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn decay_halves_at_half_life() {
        let reference = Utc::now();
        let sent = reference - chrono::Duration::days(45);
        assert!((decay(sent, reference) - 0.5).abs() < 0.01);
    }
}

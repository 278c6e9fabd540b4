//! Declarative, versioned pattern tables (spec.md §4.2). Pattern ids are
//! part of the system's stable external contract — changing one is a
//! config change, not a refactor.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::Error;
use crate::taxonomy::LabelType;

/// A co-occurrence requirement gates a pattern on another token/phrase
/// appearing in the *same* message (e.g. `evaluating_schedule` requires
/// an investment-language token alongside the schedule token).
#[derive(Debug, Clone, Deserialize)]
pub struct CoOccurrence {
    pub requires: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPattern {
    pub pattern_id: String,
    pub regex: String,
    pub label_type: LabelType,
    pub label: String,
    pub weight: f32,
    #[serde(default)]
    pub co_occurrence: Option<CoOccurrence>,
}

/// A compiled pattern, ready to scan text. `co_occurrence` holds the same
/// compiled-on-demand regex rather than a raw string so gating checks
/// never recompile at scoring time.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub pattern_id: String,
    pub regex: Regex,
    pub label_type: LabelType,
    pub label: String,
    pub weight: f32,
    pub co_occurrence: Option<Regex>,
}

fn compile_family(name: &'static str, json: &str) -> Vec<Pattern> {
    let raw: Vec<RawPattern> = serde_json::from_str(json)
        .unwrap_or_else(|e| panic!("pattern family `{name}` is malformed JSON: {e}"));
    raw.into_iter()
        .map(|r| {
            let regex = Regex::new(&r.regex).unwrap_or_else(|e| {
                panic!(
                    "pattern `{}` in family `{name}` failed to compile: {e}",
                    r.pattern_id
                )
            });
            let co_occurrence = r.co_occurrence.map(|c| {
                Regex::new(&c.requires).unwrap_or_else(|e| {
                    panic!(
                        "co_occurrence regex for pattern `{}` in family `{name}` failed to compile: {e}",
                        r.pattern_id
                    )
                })
            });
            Pattern {
                pattern_id: r.pattern_id,
                regex,
                label_type: r.label_type,
                label: r.label,
                weight: r.weight,
                co_occurrence,
            }
        })
        .collect()
}

/// Validate that every embedded pattern family compiles, returning the
/// first compilation failure as a catchable `Error` instead of the
/// panicking lazy-static path above. Called once at process start (before
/// any user is scored) so a bad pattern fails fast per spec.md §7.
pub fn validate_all() -> Result<(), Error> {
    for (name, json) in FAMILY_SOURCES {
        let raw: Vec<RawPattern> = serde_json::from_str(json).map_err(|e| {
            Error::PatternCompilationError {
                pattern_id: format!("<{name}>"),
                source: regex::Error::Syntax(e.to_string()),
            }
        })?;
        for r in raw {
            Regex::new(&r.regex).map_err(|source| Error::PatternCompilationError {
                pattern_id: r.pattern_id.clone(),
                source,
            })?;
            if let Some(c) = r.co_occurrence {
                Regex::new(&c.requires).map_err(|source| Error::PatternCompilationError {
                    pattern_id: r.pattern_id,
                    source,
                })?;
            }
        }
    }
    Ok(())
}

const FAMILY_SOURCES: [(&str, &str); 8] = [
    ("bio-role", include_str!("../patterns/bio_role.json")),
    ("bio-intent", include_str!("../patterns/bio_intent.json")),
    (
        "bio-affiliation",
        include_str!("../patterns/bio_affiliation.json"),
    ),
    (
        "display-name-role",
        include_str!("../patterns/display_name_role.json"),
    ),
    (
        "message-role",
        include_str!("../patterns/message_role.json"),
    ),
    (
        "message-intent",
        include_str!("../patterns/message_intent.json"),
    ),
    (
        "message-affiliation",
        include_str!("../patterns/message_affiliation.json"),
    ),
    (
        "message-org-type",
        include_str!("../patterns/message_org_type.json"),
    ),
];

pub static BIO_ROLE: Lazy<Vec<Pattern>> =
    Lazy::new(|| compile_family("bio-role", include_str!("../patterns/bio_role.json")));
pub static BIO_INTENT: Lazy<Vec<Pattern>> =
    Lazy::new(|| compile_family("bio-intent", include_str!("../patterns/bio_intent.json")));
pub static BIO_AFFILIATION: Lazy<Vec<Pattern>> = Lazy::new(|| {
    compile_family(
        "bio-affiliation",
        include_str!("../patterns/bio_affiliation.json"),
    )
});
pub static DISPLAY_NAME_ROLE: Lazy<Vec<Pattern>> = Lazy::new(|| {
    compile_family(
        "display-name-role",
        include_str!("../patterns/display_name_role.json"),
    )
});
pub static MESSAGE_ROLE: Lazy<Vec<Pattern>> = Lazy::new(|| {
    compile_family(
        "message-role",
        include_str!("../patterns/message_role.json"),
    )
});
pub static MESSAGE_INTENT: Lazy<Vec<Pattern>> = Lazy::new(|| {
    compile_family(
        "message-intent",
        include_str!("../patterns/message_intent.json"),
    )
});
pub static MESSAGE_AFFILIATION: Lazy<Vec<Pattern>> = Lazy::new(|| {
    compile_family(
        "message-affiliation",
        include_str!("../patterns/message_affiliation.json"),
    )
});
pub static MESSAGE_ORG_TYPE: Lazy<Vec<Pattern>> = Lazy::new(|| {
    compile_family(
        "message-org-type",
        include_str!("../patterns/message_org_type.json"),
    )
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_embedded_families_compile() {
        validate_all().expect("every shipped pattern family must compile");
    }

    #[test]
    fn bio_role_patterns_are_non_empty() {
        assert!(!BIO_ROLE.is_empty());
    }
}

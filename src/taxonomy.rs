//! Closed vocabularies (spec.md §3). Every lookup of an unknown key returns
//! the `Unknown` sentinel rather than panicking — extractors and the scorer
//! run on untrusted, noisy chat text and must never fail on a surprising
//! label string.

use serde::{Deserialize, Serialize};

/// Coarse classification of a group a user belongs to; drives which
/// priors apply in `rolePriors`/`intentPriors`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Bd,
    Work,
    GeneralChat,
    Unknown,
}

impl GroupKind {
    pub const ALL: [GroupKind; 4] = [
        GroupKind::Bd,
        GroupKind::Work,
        GroupKind::GeneralChat,
        GroupKind::Unknown,
    ];
}

/// Declared taxonomy order for `Role`. Tie-breaks in "top label" comparisons
/// use this order, never map iteration order (spec.md §4.3, Determinism).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Bd,
    Builder,
    FounderExec,
    InvestorAnalyst,
    Recruiter,
    VendorAgency,
    Community,
    MediaKol,
    MarketMaker,
    Unknown,
}

impl Role {
    pub const ALL: [Role; 10] = [
        Role::Bd,
        Role::Builder,
        Role::FounderExec,
        Role::InvestorAnalyst,
        Role::Recruiter,
        Role::VendorAgency,
        Role::Community,
        Role::MediaKol,
        Role::MarketMaker,
        Role::Unknown,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Networking,
    Evaluating,
    Selling,
    Hiring,
    SupportSeeking,
    SupportGiving,
    Broadcasting,
    Unknown,
}

impl Intent {
    pub const ALL: [Intent; 8] = [
        Intent::Networking,
        Intent::Evaluating,
        Intent::Selling,
        Intent::Hiring,
        Intent::SupportSeeking,
        Intent::SupportGiving,
        Intent::Broadcasting,
        Intent::Unknown,
    ];
}

/// `org_types` values are frozen by config (spec.md §9 Open Question),
/// resolved in DESIGN.md to this concrete set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgType {
    MarketMaker,
    Vc,
    Exchange,
    Fund,
    Dao,
    Unknown,
}

impl OrgType {
    pub const ALL: [OrgType; 6] = [
        OrgType::MarketMaker,
        OrgType::Vc,
        OrgType::Exchange,
        OrgType::Fund,
        OrgType::Dao,
        OrgType::Unknown,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    Bio,
    Message,
    Feature,
    Membership,
    DisplayName,
    Llm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Tentative,
    Supported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbstentionReason {
    InsufficientEvidence,
    LowConfidence,
    NoData,
    GatedByCooccurrence,
}

/// Which label family a `Pattern`/`Hit` targets (spec.md §3 `Hit`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelType {
    Role,
    Intent,
    Orgtype,
    Affiliation,
}

/// Parse a string into a taxonomy member, falling back to the `Unknown`
/// sentinel. Implemented via serde so the mapping stays in one place
/// (the `#[serde(rename_all = "snake_case")]` attribute above).
pub fn parse_role(s: &str) -> Role {
    serde_json::from_value(serde_json::Value::String(s.to_string())).unwrap_or(Role::Unknown)
}

pub fn parse_intent(s: &str) -> Intent {
    serde_json::from_value(serde_json::Value::String(s.to_string())).unwrap_or(Intent::Unknown)
}

pub fn parse_org_type(s: &str) -> OrgType {
    serde_json::from_value(serde_json::Value::String(s.to_string())).unwrap_or(OrgType::Unknown)
}

pub fn parse_group_kind(s: &str) -> GroupKind {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .unwrap_or(GroupKind::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_string_is_sentinel_not_panic() {
        assert_eq!(parse_role("not_a_real_role"), Role::Unknown);
    }

    #[test]
    fn known_role_round_trips() {
        assert_eq!(parse_role("founder_exec"), Role::FounderExec);
    }
}

//! Per-user input bundle (spec.md §3: User, FeatureSnapshot, MessageSample).
//!
//! The engine only reads these — no core mutation of upstream entities.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::taxonomy::GroupKind;

/// A single group membership as observed by the (external) ingestion
/// pipeline. The engine treats membership purely as evidence input; it
/// never writes back to it.
#[derive(Debug, Clone)]
pub struct Membership {
    pub group_id: Uuid,
    pub group_kind: GroupKind,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub msg_count: u64,
    pub is_current_member: bool,
}

/// Numeric per-user feature vector. Undefined/missing values are treated
/// as 0 by the caller before construction; this type never holds an
/// `Option` for a feature.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureSnapshot {
    pub total_msg_count: u64,
    pub total_reply_count: u64,
    pub total_mention_count: u64,
    pub avg_msg_len: f32,
    pub bd_group_msg_share: f32,
    pub groups_active_count: u32,
}

impl FeatureSnapshot {
    /// Fraction of replies among all messages, clamped to [0,1].
    pub fn reply_ratio(&self) -> f32 {
        if self.total_msg_count == 0 {
            0.0
        } else {
            (self.total_reply_count as f32 / self.total_msg_count as f32).clamp(0.0, 1.0)
        }
    }
}

/// One sampled message. `text` may be empty; `sent_at` is always in the
/// fixed reference timezone the engine uses for decay computation.
#[derive(Debug, Clone)]
pub struct MessageSample {
    pub external_id: String,
    pub sent_at: DateTime<Utc>,
    pub text: String,
}

/// Everything the scorer needs for one user. Constructed by the (external)
/// ingestion/aggregation layer and handed to `score_user` unmodified.
#[derive(Debug, Clone)]
pub struct UserBundle {
    pub user_id: Uuid,
    pub display_name: String,
    pub bio: String,
    pub memberships: Vec<Membership>,
    pub features: FeatureSnapshot,
    pub messages: Vec<MessageSample>,
}

//! Event payload catalogue
//!
//! Field layouts of the `event` object for the subscription types the client
//! decodes. These are the server's data contract; fields the server may send
//! as `null` or omit are `Option` or defaulted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Shared pieces
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Emote {
    #[serde(default)]
    pub begin: i64,
    #[serde(default)]
    pub end: i64,
    #[serde(default)]
    pub id: String,
}

/// Chat text with optional emote positions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventMessage {
    pub text: String,
    #[serde(default)]
    pub emotes: Option<Vec<Emote>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollChoice {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub bits_votes: Option<i64>,
    #[serde(default)]
    pub channel_points_votes: Option<i64>,
    #[serde(default)]
    pub votes: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollVoting {
    pub is_enabled: bool,
    #[serde(default)]
    pub amount_per_vote: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatBadge {
    pub set_id: String,
    pub id: String,
    #[serde(default)]
    pub info: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageBody {
    pub text: String,
    /// Fragment layout varies by fragment type and is left undecoded
    #[serde(default)]
    pub fragments: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCheer {
    pub bits: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhisperBody {
    pub text: String,
}

// =============================================================================
// Channel
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelUpdateEvent {
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub title: String,
    pub language: String,
    pub category_id: String,
    pub category_name: String,
    #[serde(default)]
    pub content_classification_labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelFollowEvent {
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub followed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSubscribeEvent {
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub tier: String,
    #[serde(default)]
    pub is_gift: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSubscriptionEndEvent {
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub tier: String,
    #[serde(default)]
    pub is_gift: bool,
}

/// Gifter fields are `null` for anonymous gifts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSubscriptionGiftEvent {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_login: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub total: i64,
    pub tier: String,
    #[serde(default)]
    pub cumulative_total: Option<i64>,
    #[serde(default)]
    pub is_anonymous: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSubscriptionMessageEvent {
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub tier: String,
    pub message: EventMessage,
    pub cumulative_months: i64,
    /// `null` when the user chose not to share their streak
    #[serde(default)]
    pub streak_months: Option<i64>,
    pub duration_months: i64,
}

/// Cheerer fields are `null` for anonymous cheers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelCheerEvent {
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_login: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub message: String,
    pub bits: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRaidEvent {
    pub from_broadcaster_user_id: String,
    pub from_broadcaster_user_login: String,
    pub from_broadcaster_user_name: String,
    pub to_broadcaster_user_id: String,
    pub to_broadcaster_user_login: String,
    pub to_broadcaster_user_name: String,
    pub viewers: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelBanEvent {
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub moderator_user_id: String,
    pub moderator_user_login: String,
    pub moderator_user_name: String,
    #[serde(default)]
    pub reason: String,
    pub banned_at: DateTime<Utc>,
    /// `null` for permanent bans
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    pub is_permanent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelUnbanEvent {
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub moderator_user_id: String,
    pub moderator_user_login: String,
    pub moderator_user_name: String,
}

/// Shared layout of moderator and VIP add/remove events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRoleChangeEvent {
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
}

pub type ChannelModeratorAddEvent = ChannelRoleChangeEvent;
pub type ChannelModeratorRemoveEvent = ChannelRoleChangeEvent;
pub type ChannelVipAddEvent = ChannelRoleChangeEvent;
pub type ChannelVipRemoveEvent = ChannelRoleChangeEvent;

// =============================================================================
// Polls
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelPollEvent {
    pub id: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub title: String,
    pub choices: Vec<PollChoice>,
    #[serde(default)]
    pub bits_voting: Option<PollVoting>,
    #[serde(default)]
    pub channel_points_voting: Option<PollVoting>,
    pub started_at: DateTime<Utc>,
    /// Set on begin and progress events
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    /// Set on end events (`completed`, `archived`, `terminated`)
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

pub type ChannelPollBeginEvent = ChannelPollEvent;
pub type ChannelPollProgressEvent = ChannelPollEvent;
pub type ChannelPollEndEvent = ChannelPollEvent;

// =============================================================================
// Stream
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamOnlineEvent {
    pub id: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    #[serde(rename = "type")]
    pub stream_type: String,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamOfflineEvent {
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
}

// =============================================================================
// User
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAuthorizationGrantEvent {
    pub client_id: String,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
}

/// User fields are `null` when the user was deleted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAuthorizationRevokeEvent {
    pub client_id: String,
    pub user_id: String,
    #[serde(default)]
    pub user_login: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
}

/// `email` is only present with the `user:read:email` scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserUpdateEvent {
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserWhisperMessageEvent {
    pub from_user_id: String,
    pub from_user_login: String,
    pub from_user_name: String,
    pub to_user_id: String,
    pub to_user_login: String,
    pub to_user_name: String,
    pub whisper_id: String,
    pub whisper: WhisperBody,
}

// =============================================================================
// Chat
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelChatMessageEvent {
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub chatter_user_id: String,
    pub chatter_user_login: String,
    pub chatter_user_name: String,
    pub message_id: String,
    pub message: ChatMessageBody,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub badges: Vec<ChatBadge>,
    pub message_type: String,
    #[serde(default)]
    pub cheer: Option<ChatCheer>,
    #[serde(default)]
    pub reply: Option<serde_json::Value>,
    #[serde(default)]
    pub channel_points_custom_reward_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelChatMessageDeleteEvent {
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub target_user_id: String,
    pub target_user_login: String,
    pub target_user_name: String,
    pub message_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelChatClearEvent {
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
}

// =============================================================================
// Drops and conduits
// =============================================================================

/// One entitlement; `drop.entitlement.grant` events arrive as an array of these
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropEntitlementGrantEvent {
    pub id: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConduitShardDisabledEvent {
    pub conduit_id: String,
    pub shard_id: String,
    pub status: String,
    #[serde(default)]
    pub transport: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_gift_has_no_gifter() {
        let event: ChannelSubscriptionGiftEvent = serde_json::from_str(
            r#"{
                "user_id": null,
                "user_login": null,
                "user_name": null,
                "broadcaster_user_id": "1337",
                "broadcaster_user_login": "cooler_user",
                "broadcaster_user_name": "Cooler_User",
                "total": 2,
                "tier": "1000",
                "cumulative_total": null,
                "is_anonymous": true
            }"#,
        )
        .unwrap();

        assert!(event.is_anonymous);
        assert!(event.user_id.is_none());
        assert_eq!(event.total, 2);
    }

    #[test]
    fn test_subscription_message_without_streak() {
        let event: ChannelSubscriptionMessageEvent = serde_json::from_str(
            r#"{
                "user_id": "1234",
                "user_login": "cool_user",
                "user_name": "Cool_User",
                "broadcaster_user_id": "1337",
                "broadcaster_user_login": "cooler_user",
                "broadcaster_user_name": "Cooler_User",
                "tier": "1000",
                "message": {
                    "text": "Love the stream! FevziGG",
                    "emotes": [{"begin": 23, "end": 30, "id": "302976485"}]
                },
                "cumulative_months": 15,
                "streak_months": null,
                "duration_months": 6
            }"#,
        )
        .unwrap();

        assert_eq!(event.streak_months, None);
        assert_eq!(event.message.emotes.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_stream_online_type_field() {
        let event: StreamOnlineEvent = serde_json::from_str(
            r#"{
                "id": "9001",
                "broadcaster_user_id": "1337",
                "broadcaster_user_login": "cool_user",
                "broadcaster_user_name": "Cool_User",
                "type": "live",
                "started_at": "2020-10-11T10:11:12.123Z"
            }"#,
        )
        .unwrap();

        assert_eq!(event.stream_type, "live");
    }

    #[test]
    fn test_permanent_ban_has_no_end() {
        let event: ChannelBanEvent = serde_json::from_str(
            r#"{
                "user_id": "1234",
                "user_login": "cool_user",
                "user_name": "Cool_User",
                "broadcaster_user_id": "1337",
                "broadcaster_user_login": "cooler_user",
                "broadcaster_user_name": "Cooler_User",
                "moderator_user_id": "1339",
                "moderator_user_login": "mod_user",
                "moderator_user_name": "Mod_User",
                "reason": "Offensive language",
                "banned_at": "2020-07-15T18:15:11.17106713Z",
                "ends_at": null,
                "is_permanent": true
            }"#,
        )
        .unwrap();

        assert!(event.is_permanent);
        assert!(event.ends_at.is_none());
    }
}

//! Subscription type registry
//!
//! Maps the `subscription.type` tag of a notification to the shape its
//! `event` object decodes into. Kinds the client only tracks for raw
//! passthrough resolve to [`EventShape::RawOnly`] and are never decoded.
//! Tags missing from the catalogue are
//! [`EventSubError::UnknownSubscriptionType`].

use super::envelope::PayloadContext;
use super::events::*;
use crate::core::handlers::HandlerTable;
use crate::error::{EventSubError, Result};

/// What a subscription type's `event` object decodes into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventShape {
    /// Decoded into the named payload type
    Typed(&'static str),
    /// No typed decode; only the raw event handler sees it
    RawOnly,
}

macro_rules! subscription_catalogue {
    (
        typed {
            $( $variant:ident => $tag:literal, $version:literal, $payload:ty, $setter:ident; )*
        }
        raw {
            $( $raw_variant:ident => $raw_tag:literal, $raw_version:literal; )*
        }
    ) => {
        /// Subscription kinds known to the client
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum SubscriptionType {
            $( $variant, )*
            $( $raw_variant, )*
        }

        impl SubscriptionType {
            pub const ALL: &'static [SubscriptionType] = &[
                $( SubscriptionType::$variant, )*
                $( SubscriptionType::$raw_variant, )*
            ];

            /// Look up a wire tag
            pub fn from_tag(tag: &str) -> Option<Self> {
                match tag {
                    $( $tag => Some(SubscriptionType::$variant), )*
                    $( $raw_tag => Some(SubscriptionType::$raw_variant), )*
                    _ => None,
                }
            }

            /// Wire tag for this kind
            pub fn tag(&self) -> &'static str {
                match self {
                    $( SubscriptionType::$variant => $tag, )*
                    $( SubscriptionType::$raw_variant => $raw_tag, )*
                }
            }

            /// Subscription version the payload layout belongs to
            pub fn version(&self) -> &'static str {
                match self {
                    $( SubscriptionType::$variant => $version, )*
                    $( SubscriptionType::$raw_variant => $raw_version, )*
                }
            }

            pub fn shape(&self) -> EventShape {
                match self {
                    $( SubscriptionType::$variant => EventShape::Typed(stringify!($payload)), )*
                    $( SubscriptionType::$raw_variant => EventShape::RawOnly, )*
                }
            }
        }

        /// A decoded event payload
        #[derive(Debug, Clone, PartialEq)]
        pub enum Event {
            $( $variant($payload), )*
        }

        impl Event {
            pub fn subscription_type(&self) -> SubscriptionType {
                match self {
                    $( Event::$variant(_) => SubscriptionType::$variant, )*
                }
            }

            /// Decode the raw `event` JSON of a notification
            ///
            /// Returns `Ok(None)` for raw-only kinds.
            pub fn decode(subscription_type: SubscriptionType, raw: &str) -> Result<Option<Event>> {
                match subscription_type {
                    $(
                        SubscriptionType::$variant => serde_json::from_str::<$payload>(raw)
                            .map(|event| Some(Event::$variant(event)))
                            .map_err(|e| mismatch(subscription_type, stringify!($payload), e)),
                    )*
                    $( SubscriptionType::$raw_variant => Ok(None), )*
                }
            }
        }

        impl HandlerTable {
            $(
                #[doc = concat!("Handle `", $tag, "` events (last registration wins)")]
                pub fn $setter<F>(self, handler: F) -> Self
                where
                    F: Fn($payload, PayloadContext) + Send + Sync + 'static,
                {
                    self.with_event_handler(SubscriptionType::$variant, move |event, context| {
                        if let Event::$variant(event) = event {
                            handler(event, context);
                        }
                    })
                }
            )*
        }
    };
}

subscription_catalogue! {
    typed {
        ChannelUpdate => "channel.update", "2", ChannelUpdateEvent, on_channel_update;
        ChannelFollow => "channel.follow", "2", ChannelFollowEvent, on_channel_follow;
        ChannelSubscribe => "channel.subscribe", "1", ChannelSubscribeEvent, on_channel_subscribe;
        ChannelSubscriptionEnd => "channel.subscription.end", "1", ChannelSubscriptionEndEvent, on_channel_subscription_end;
        ChannelSubscriptionGift => "channel.subscription.gift", "1", ChannelSubscriptionGiftEvent, on_channel_subscription_gift;
        ChannelSubscriptionMessage => "channel.subscription.message", "1", ChannelSubscriptionMessageEvent, on_channel_subscription_message;
        ChannelCheer => "channel.cheer", "1", ChannelCheerEvent, on_channel_cheer;
        ChannelRaid => "channel.raid", "1", ChannelRaidEvent, on_channel_raid;
        ChannelBan => "channel.ban", "1", ChannelBanEvent, on_channel_ban;
        ChannelUnban => "channel.unban", "1", ChannelUnbanEvent, on_channel_unban;
        ChannelModeratorAdd => "channel.moderator.add", "1", ChannelModeratorAddEvent, on_channel_moderator_add;
        ChannelModeratorRemove => "channel.moderator.remove", "1", ChannelModeratorRemoveEvent, on_channel_moderator_remove;
        ChannelVipAdd => "channel.vip.add", "1", ChannelVipAddEvent, on_channel_vip_add;
        ChannelVipRemove => "channel.vip.remove", "1", ChannelVipRemoveEvent, on_channel_vip_remove;
        ChannelPollBegin => "channel.poll.begin", "1", ChannelPollBeginEvent, on_channel_poll_begin;
        ChannelPollProgress => "channel.poll.progress", "1", ChannelPollProgressEvent, on_channel_poll_progress;
        ChannelPollEnd => "channel.poll.end", "1", ChannelPollEndEvent, on_channel_poll_end;
        ChannelChatMessage => "channel.chat.message", "1", ChannelChatMessageEvent, on_channel_chat_message;
        ChannelChatMessageDelete => "channel.chat.message_delete", "1", ChannelChatMessageDeleteEvent, on_channel_chat_message_delete;
        ChannelChatClear => "channel.chat.clear", "1", ChannelChatClearEvent, on_channel_chat_clear;
        StreamOnline => "stream.online", "1", StreamOnlineEvent, on_stream_online;
        StreamOffline => "stream.offline", "1", StreamOfflineEvent, on_stream_offline;
        UserAuthorizationGrant => "user.authorization.grant", "1", UserAuthorizationGrantEvent, on_user_authorization_grant;
        UserAuthorizationRevoke => "user.authorization.revoke", "1", UserAuthorizationRevokeEvent, on_user_authorization_revoke;
        UserUpdate => "user.update", "1", UserUpdateEvent, on_user_update;
        UserWhisperMessage => "user.whisper.message", "1", UserWhisperMessageEvent, on_user_whisper_message;
        DropEntitlementGrant => "drop.entitlement.grant", "1", Vec<DropEntitlementGrantEvent>, on_drop_entitlement_grant;
        ConduitShardDisabled => "conduit.shard.disabled", "1", ConduitShardDisabledEvent, on_conduit_shard_disabled;
    }
    raw {
        ChannelPointsCustomRewardAdd => "channel.channel_points_custom_reward.add", "1";
        ChannelPointsCustomRewardUpdate => "channel.channel_points_custom_reward.update", "1";
        ChannelPointsCustomRewardRemove => "channel.channel_points_custom_reward.remove", "1";
        ChannelPointsCustomRewardRedemptionAdd => "channel.channel_points_custom_reward_redemption.add", "1";
        ChannelPointsCustomRewardRedemptionUpdate => "channel.channel_points_custom_reward_redemption.update", "1";
        ChannelPointsAutomaticRewardRedemptionAdd => "channel.channel_points_automatic_reward_redemption.add", "1";
        ChannelPredictionBegin => "channel.prediction.begin", "1";
        ChannelPredictionProgress => "channel.prediction.progress", "1";
        ChannelPredictionLock => "channel.prediction.lock", "1";
        ChannelPredictionEnd => "channel.prediction.end", "1";
        ExtensionBitsTransactionCreate => "extension.bits_transaction.create", "1";
        ChannelGoalBegin => "channel.goal.begin", "1";
        ChannelGoalProgress => "channel.goal.progress", "1";
        ChannelGoalEnd => "channel.goal.end", "1";
        ChannelHypeTrainBegin => "channel.hype_train.begin", "1";
        ChannelHypeTrainProgress => "channel.hype_train.progress", "1";
        ChannelHypeTrainEnd => "channel.hype_train.end", "1";
        ChannelCharityCampaignDonate => "channel.charity_campaign.donate", "1";
        ChannelCharityCampaignStart => "channel.charity_campaign.start", "1";
        ChannelCharityCampaignProgress => "channel.charity_campaign.progress", "1";
        ChannelCharityCampaignStop => "channel.charity_campaign.stop", "1";
        ChannelShieldModeBegin => "channel.shield_mode.begin", "1";
        ChannelShieldModeEnd => "channel.shield_mode.end", "1";
        ChannelShoutoutCreate => "channel.shoutout.create", "1";
        ChannelShoutoutReceive => "channel.shoutout.receive", "1";
        ChannelModerate => "channel.moderate", "2";
        ChannelAdBreakBegin => "channel.ad_break.begin", "1";
        ChannelWarningAcknowledge => "channel.warning.acknowledge", "1";
        ChannelWarningSend => "channel.warning.send", "1";
        ChannelUnbanRequestCreate => "channel.unban_request.create", "1";
        ChannelUnbanRequestResolve => "channel.unban_request.resolve", "1";
        AutomodMessageHold => "automod.message.hold", "2";
        AutomodMessageUpdate => "automod.message.update", "2";
        AutomodSettingsUpdate => "automod.settings.update", "1";
        AutomodTermsUpdate => "automod.terms.update", "1";
        ChannelChatUserMessageHold => "channel.chat.user_message_hold", "1";
        ChannelChatUserMessageUpdate => "channel.chat.user_message_update", "1";
        ChannelChatClearUserMessages => "channel.chat.clear_user_messages", "1";
        ChannelChatNotification => "channel.chat.notification", "1";
        ChannelChatSettingsUpdate => "channel.chat_settings.update", "1";
        ChannelSuspiciousUserMessage => "channel.suspicious_user.message", "1";
        ChannelSuspiciousUserUpdate => "channel.suspicious_user.update", "1";
        ChannelSharedChatBegin => "channel.shared_chat.begin", "1";
        ChannelSharedChatUpdate => "channel.shared_chat.update", "1";
        ChannelSharedChatEnd => "channel.shared_chat.end", "1";
    }
}

fn mismatch(subscription_type: SubscriptionType, shape: &'static str, e: serde_json::Error) -> EventSubError {
    EventSubError::PayloadMismatch {
        tag: subscription_type.tag().to_string(),
        shape,
        reason: e.to_string(),
    }
}

/// Resolve a tag, failing with [`EventSubError::UnknownSubscriptionType`]
pub fn lookup(tag: &str) -> Result<SubscriptionType> {
    SubscriptionType::from_tag(tag)
        .ok_or_else(|| EventSubError::UnknownSubscriptionType(tag.to_string()))
}

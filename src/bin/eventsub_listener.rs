use anyhow::Result;
use eventsub_listener::bin_common::{
    init_tracing, load_config_from_env, print_banner, print_shutdown, ConfigType, ListenerConfig,
    RunConfig, ShutdownManager,
};
use eventsub_listener::eventsub::{EventSubClient, HandlerTable};
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load config first (before logging is initialized)
    let config_path = load_config_from_env(ConfigType::Listener);
    let config = ListenerConfig::load(&config_path)?;

    init_tracing(&config.log_level);
    info!("Loaded configuration from {}", config_path.display());

    let run_config = RunConfig::new("EventSub Listener").with_url(&config.client.url);
    print_banner(&run_config);

    let shutdown = ShutdownManager::new();
    shutdown.spawn_signal_handler();

    let client = EventSubClient::new(config.client, handlers());
    let result = client.run(shutdown.token()).await;

    let stats = client
        .session()
        .map(|session| format!("Last session: {}", session.id));
    print_shutdown(&run_config, stats.as_deref());

    Ok(result?)
}

/// Log every message and event kind
fn handlers() -> HandlerTable {
    HandlerTable::new()
        .on_welcome(|welcome| {
            let session = &welcome.payload.session;
            info!(
                session_id = %session.id,
                keepalive_timeout_seconds = ?session.keepalive_timeout_seconds,
                "Welcome received; create subscriptions against this session id"
            );
        })
        .on_keepalive(|keepalive| {
            debug!(message_id = %keepalive.metadata.message_id, "Keepalive");
        })
        .on_reconnect(|reconnect| {
            info!(url = ?reconnect.reconnect_url(), "Server requested reconnect");
        })
        .on_revocation(|revocation| {
            warn!(
                subscription_type = %revocation.payload.subscription.subscription_type,
                reason = ?revocation.reason(),
                "Subscription revoked"
            );
        })
        .on_notification(|notification| {
            debug!(
                subscription_type = %notification.payload.subscription.subscription_type,
                message_id = %notification.metadata.message_id,
                "Notification"
            );
        })
        .on_raw_event(|event, _metadata, subscription| {
            debug!(subscription_type = %subscription.subscription_type, %event, "Raw event");
        })
        .on_channel_update(|update, _| {
            info!("[{}] channel updated: {} ({})", update.broadcaster_user_name, update.title, update.category_name);
        })
        .on_channel_follow(|follow, _| {
            info!("[{}] new follower: {}", follow.broadcaster_user_name, follow.user_name);
        })
        .on_channel_subscribe(|subscribe, _| {
            info!(
                "[{}] new tier {} subscriber: {} (gift: {})",
                subscribe.broadcaster_user_name, subscribe.tier, subscribe.user_name, subscribe.is_gift
            );
        })
        .on_channel_subscription_message(|resub, _| {
            info!(
                "[{}] {} resubscribed for {} months: {}",
                resub.broadcaster_user_name, resub.user_name, resub.cumulative_months, resub.message.text
            );
        })
        .on_channel_subscription_gift(|gift, _| {
            let from = gift.user_name.as_deref().unwrap_or("anonymous");
            info!("[{}] {} gifted {} tier {} subs", gift.broadcaster_user_name, from, gift.total, gift.tier);
        })
        .on_channel_cheer(|cheer, _| {
            let from = cheer.user_name.as_deref().unwrap_or("anonymous");
            info!("[{}] {} cheered {} bits", cheer.broadcaster_user_name, from, cheer.bits);
        })
        .on_channel_raid(|raid, _| {
            info!(
                "[{}] raided by {} with {} viewers",
                raid.to_broadcaster_user_name, raid.from_broadcaster_user_name, raid.viewers
            );
        })
        .on_channel_ban(|ban, _| {
            info!(
                "[{}] {} banned by {} (permanent: {}): {}",
                ban.broadcaster_user_name, ban.user_name, ban.moderator_user_name, ban.is_permanent, ban.reason
            );
        })
        .on_channel_unban(|unban, _| {
            info!("[{}] {} unbanned by {}", unban.broadcaster_user_name, unban.user_name, unban.moderator_user_name);
        })
        .on_channel_moderator_add(|role, context| info!("{}: {:?}", context.subscription.subscription_type, role))
        .on_channel_moderator_remove(|role, context| info!("{}: {:?}", context.subscription.subscription_type, role))
        .on_channel_vip_add(|role, context| info!("{}: {:?}", context.subscription.subscription_type, role))
        .on_channel_vip_remove(|role, context| info!("{}: {:?}", context.subscription.subscription_type, role))
        .on_channel_poll_begin(|poll, _| info!("[{}] poll started: {}", poll.broadcaster_user_name, poll.title))
        .on_channel_poll_progress(|poll, _| debug!("[{}] poll progress: {:?}", poll.broadcaster_user_name, poll.choices))
        .on_channel_poll_end(|poll, _| {
            info!("[{}] poll ended ({:?}): {:?}", poll.broadcaster_user_name, poll.status, poll.choices)
        })
        .on_channel_chat_message(|chat, _| {
            info!("[{}] {}: {}", chat.broadcaster_user_name, chat.chatter_user_name, chat.message.text);
        })
        .on_stream_online(|online, _| {
            info!("[{}] stream online ({}) since {}", online.broadcaster_user_name, online.stream_type, online.started_at);
        })
        .on_stream_offline(|offline, _| info!("[{}] stream offline", offline.broadcaster_user_name))
        .on_user_update(|user, _| info!("user updated: {:?}", user))
        .on_user_whisper_message(|whisper, _| info!("whisper: {:?}", whisper))
        .on_drop_entitlement_grant(|grants, _| info!("{} drop entitlements granted", grants.len()))
        .on_conduit_shard_disabled(|shard, _| warn!("conduit shard disabled: {:?}", shard))
}

//! Telegram channel — bot integration via `teloxide`.
//!
//! Features:
//! - Long polling (no webhook/public IP needed)
//! - Commands: /start, /help, /reset
//! - Inline Help/About buttons with callback-query dispatch
//! - Typing indicator while a reply is being generated
//! - Allow-list by user ID or username
//! - Message splitting for >4096 char replies

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    BotCommand, ChatAction, InlineKeyboardButton, InlineKeyboardMarkup, UpdateKind,
};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use relaybot_core::bus::queue::MessageBus;
use relaybot_core::bus::types::{InboundMessage, OutboundMessage};
use relaybot_core::session::SessionStore;
use relaybot_core::types::UserId;

use crate::base::Channel;
use crate::formatting::split_message;

/// Telegram message length limit.
const TELEGRAM_MAX_LEN: usize = 4096;

/// How often the typing indicator is refreshed while a reply is pending.
const TYPING_REFRESH_SECS: u64 = 4;

/// Upper bound on how long the typing indicator keeps refreshing.
const TYPING_MAX_SECS: u64 = 120;

// ─────────────────────────────────────────────
// Static texts
// ─────────────────────────────────────────────

fn greeting(first_name: &str) -> String {
    format!(
        "👋 Hi {first_name}! I'm your personal AI assistant.\n\n\
         🤖 Send me any message and I'll do my best to help.\n\
         💭 Replies keep the context of our conversation.\n\n\
         🔍 Use /help for more information."
    )
}

const HELP_TEXT: &str = "🔍 How to use this bot:\n\n\
     1. Just type your question or task\n\
     2. The bot forwards it to the assistant and replies\n\
     3. The conversation keeps its context\n\n\
     Commands:\n\
     /start — Start the bot\n\
     /help — Show this message\n\
     /reset — Clear the conversation history";

const ABOUT_TEXT: &str = "ℹ️ About this bot:\n\n\
     Messages are relayed to a remote assistant service\n\
     that generates the replies.\n\
     Version: 0.1.0";

const RESET_TEXT: &str = "🔄 Conversation history cleared!";

/// Static reply for a button press, keyed by the opaque callback key.
fn callback_reply(key: &str) -> Option<&'static str> {
    match key {
        "help" => Some(HELP_TEXT),
        "about" => Some(ABOUT_TEXT),
        _ => None,
    }
}

/// Inline keyboard attached to the /start greeting.
fn start_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("❓ Help", "help")],
        vec![InlineKeyboardButton::callback("ℹ️ About", "about")],
    ])
}

/// Extract the command from a message text, stripping any `@botname` suffix
/// (e.g. `/start@mybot arg` → `/start`). Returns `None` for non-commands.
fn parse_command(text: &str) -> Option<&str> {
    if !text.starts_with('/') {
        return None;
    }
    let command = text.split_whitespace().next().unwrap_or("");
    Some(command.split('@').next().unwrap_or(command))
}

// ─────────────────────────────────────────────
// TelegramChannel
// ─────────────────────────────────────────────

/// Telegram bot channel using long polling via `teloxide`.
pub struct TelegramChannel {
    /// Bot token from @BotFather.
    token: String,
    /// Message bus for inbound/outbound.
    bus: Arc<MessageBus>,
    /// Session store, cleared by /reset.
    sessions: Arc<SessionStore>,
    /// Allow-list of user IDs / usernames. Empty = allow everyone.
    allowed_users: Vec<String>,
    /// Shutdown signal.
    shutdown: Arc<Notify>,
}

impl TelegramChannel {
    /// Create a new Telegram channel.
    pub fn new(
        token: String,
        bus: Arc<MessageBus>,
        sessions: Arc<SessionStore>,
        allowed_users: Vec<String>,
    ) -> Self {
        Self {
            token,
            bus,
            sessions,
            allowed_users,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Check if a sender is allowed.
    ///
    /// Matches on the numeric user id or the username.
    /// Empty allow-list = allow everyone.
    fn is_allowed(&self, user_id: UserId, username: &str) -> bool {
        if self.allowed_users.is_empty() {
            return true;
        }
        let id = user_id.to_string();
        self.allowed_users
            .iter()
            .any(|u| u == &id || (!username.is_empty() && u == username))
    }

    /// Handle an incoming Telegram update.
    async fn handle_update(&self, bot: &Bot, update: &Update) {
        match &update.kind {
            UpdateKind::Message(message) => self.handle_message(bot, message).await,
            UpdateKind::CallbackQuery(query) => self.handle_callback(bot, query).await,
            _ => {}
        }
    }

    /// Handle an incoming chat message.
    async fn handle_message(&self, bot: &Bot, message: &Message) {
        let Some(user) = message.from.as_ref() else {
            return;
        };

        let user_id = user.id.0 as UserId;
        let username = user.username.as_deref().unwrap_or("").to_string();
        let first_name = user.first_name.clone();
        let chat_id = message.chat.id.0.to_string();

        if !self.is_allowed(user_id, &username) {
            warn!(
                user_id,
                chat = %chat_id,
                "telegram message from unauthorized user, ignoring"
            );
            return;
        }

        // Text-only bot: anything without text is ignored.
        let Some(text) = message.text() else {
            debug!(user_id, "non-text message, ignoring");
            return;
        };

        if let Some(command) = parse_command(text) {
            self.handle_command(bot, message, command, user_id, &first_name)
                .await;
            return;
        }

        debug!(
            user_id,
            chat = %chat_id,
            content_len = text.len(),
            "telegram inbound message"
        );

        // Typing indicator until the reply lands (bounded).
        self.start_typing(bot, message.chat.id);

        let mut inbound = InboundMessage::new("telegram", user_id, &chat_id, text);
        inbound.metadata.insert("username".into(), username);
        inbound.metadata.insert("first_name".into(), first_name);
        inbound
            .metadata
            .insert("message_id".into(), message.id.0.to_string());

        if let Err(e) = self.bus.publish_inbound(inbound).await {
            error!(error = %e, "failed to publish telegram message to bus");
        }
    }

    /// Handle a bot command.
    async fn handle_command(
        &self,
        bot: &Bot,
        message: &Message,
        command: &str,
        user_id: UserId,
        first_name: &str,
    ) {
        let chat = message.chat.id;

        match command {
            "/start" => {
                info!(user_id, "user started the bot");
                let _ = bot
                    .send_message(chat, greeting(first_name))
                    .reply_markup(start_keyboard())
                    .await;
            }
            "/help" => {
                info!(user_id, "user requested help");
                let _ = bot.send_message(chat, HELP_TEXT).await;
            }
            "/reset" => {
                info!(user_id, "user reset their conversation");
                self.sessions.reset(user_id);
                let _ = bot.send_message(chat, RESET_TEXT).await;
            }
            _ => {
                debug!(command, "unknown telegram command");
            }
        }
    }

    /// Handle an inline-button press.
    async fn handle_callback(&self, bot: &Bot, query: &CallbackQuery) {
        let user_id = query.from.id.0 as UserId;
        let key = query.data.as_deref().unwrap_or("");
        info!(user_id, key, "telegram button pressed");

        // Acknowledge so the client stops its spinner.
        let _ = bot.answer_callback_query(query.id.clone()).await;

        let Some(reply) = callback_reply(key) else {
            debug!(key, "unknown callback key, ignoring");
            return;
        };

        if let Some(message) = query.message.as_ref() {
            let _ = bot.send_message(message.chat().id, reply).await;
        }
    }

    /// Spawn the typing-indicator refresher for a chat.
    ///
    /// Telegram clears the "typing…" status a few seconds after each
    /// `send_chat_action`, so it is refreshed until the watchdog fires.
    fn start_typing(&self, bot: &Bot, chat_id: ChatId) {
        let typing_bot = bot.clone();
        let stop = Arc::new(Notify::new());
        let stop_signal = stop.clone();

        tokio::spawn(async move {
            loop {
                let _ = typing_bot
                    .send_chat_action(chat_id, ChatAction::Typing)
                    .await;
                tokio::select! {
                    _ = tokio::time::sleep(tokio::time::Duration::from_secs(TYPING_REFRESH_SECS)) => {}
                    _ = stop_signal.notified() => break,
                }
            }
        });

        tokio::spawn(async move {
            tokio::time::sleep(tokio::time::Duration::from_secs(TYPING_MAX_SECS)).await;
            stop.notify_waiters();
        });
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> anyhow::Result<()> {
        info!("starting telegram channel (long polling)");

        let bot = Bot::new(&self.token);

        // Set bot commands menu
        let commands = vec![
            BotCommand::new("start", "Start the bot"),
            BotCommand::new("help", "Show available commands"),
            BotCommand::new("reset", "Clear conversation history"),
        ];
        if let Err(e) = bot.set_my_commands(commands).await {
            warn!(error = %e, "failed to set bot commands menu");
        }

        info!("telegram bot connected, polling for updates");

        let mut offset: i32 = 0;

        loop {
            tokio::select! {
                updates = bot.get_updates().offset(offset).timeout(30).send() => {
                    match updates {
                        Ok(updates) => {
                            for update in &updates {
                                offset = (update.id.0 as i32).wrapping_add(1);
                                self.handle_update(&bot, update).await;
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "telegram polling error");
                            tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
                        }
                    }
                }
                _ = self.shutdown.notified() => {
                    info!("telegram channel shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        info!("stopping telegram channel");
        self.shutdown.notify_waiters();
        Ok(())
    }

    async fn send(&self, msg: &OutboundMessage) -> anyhow::Result<()> {
        let bot = Bot::new(&self.token);
        let chat_id: i64 = msg
            .chat_id
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid telegram chat_id: {}", msg.chat_id))?;

        for chunk in split_message(&msg.content, TELEGRAM_MAX_LEN) {
            bot.send_message(ChatId(chat_id), chunk).await?;
        }

        debug!(chat_id, "telegram message sent");
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn create_channel(allowed_users: Vec<String>) -> TelegramChannel {
        let bus = Arc::new(MessageBus::new(32));
        let sessions = Arc::new(SessionStore::new());
        TelegramChannel::new("test_token".into(), bus, sessions, allowed_users)
    }

    #[test]
    fn channel_name() {
        let ch = create_channel(vec![]);
        assert_eq!(ch.name(), "telegram");
    }

    #[test]
    fn is_allowed_empty_list() {
        let ch = create_channel(vec![]);
        assert!(ch.is_allowed(123, "anyone"));
        assert!(ch.is_allowed(456, ""));
    }

    #[test]
    fn is_allowed_by_id() {
        let ch = create_channel(vec!["123456".into(), "johndoe".into()]);
        assert!(ch.is_allowed(123456, "someuser"));
    }

    #[test]
    fn is_allowed_by_username() {
        let ch = create_channel(vec!["123456".into(), "johndoe".into()]);
        assert!(ch.is_allowed(999999, "johndoe"));
    }

    #[test]
    fn is_allowed_denied() {
        let ch = create_channel(vec!["123456".into(), "johndoe".into()]);
        assert!(!ch.is_allowed(999999, "stranger"));
        // An empty username must not match anything in the list.
        assert!(!ch.is_allowed(999999, ""));
    }

    #[test]
    fn parse_command_plain() {
        assert_eq!(parse_command("/start"), Some("/start"));
        assert_eq!(parse_command("/reset now"), Some("/reset"));
    }

    #[test]
    fn parse_command_strips_bot_name() {
        assert_eq!(parse_command("/start@mybot"), Some("/start"));
        assert_eq!(parse_command("/help@mybot please"), Some("/help"));
    }

    #[test]
    fn parse_command_rejects_plain_text() {
        assert_eq!(parse_command("hello"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn callback_replies() {
        assert_eq!(callback_reply("help"), Some(HELP_TEXT));
        assert_eq!(callback_reply("about"), Some(ABOUT_TEXT));
        assert_eq!(callback_reply("bogus"), None);
        assert_eq!(callback_reply(""), None);
    }

    #[test]
    fn greeting_includes_first_name() {
        let text = greeting("Alice");
        assert!(text.contains("Alice"));
        assert!(text.contains("/help"));
    }

    #[test]
    fn help_text_lists_all_commands() {
        for command in ["/start", "/help", "/reset"] {
            assert!(HELP_TEXT.contains(command));
        }
    }
}

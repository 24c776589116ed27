//! Bot command listener.
//!
//! Long-polls `getUpdates` and answers `/start` in whichever chat sent it.
//! Runs as its own task beside the monitor loop and shares no state with it.

use std::time::Duration;
use tracing::{debug, info, warn};

use super::messages;
use super::telegram::TelegramNotifier;

/// How long the Bot API may hold one `getUpdates` request open.
const LONG_POLL: Duration = Duration::from_secs(25);
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Reply for a command message, or `None` if it is not one we answer.
pub fn reply_for(text: &str) -> Option<&'static str> {
    let command = text.split_whitespace().next()?;
    // In groups commands arrive as `/start@BotName`.
    let command = command.split('@').next().unwrap_or(command);
    match command {
        "/start" => Some(messages::START),
        _ => None,
    }
}

/// Answer commands until the task is aborted.
pub async fn listen(bot: TelegramNotifier) {
    info!("Telegram command listener started");
    let mut offset = 0;

    loop {
        let updates = match bot.get_updates(offset, LONG_POLL).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!(error = format!("{e:#}"), "Failed to poll Telegram updates");
                tokio::time::sleep(RETRY_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let Some(message) = update.message else {
                continue;
            };
            let Some(reply) = message.text.as_deref().and_then(reply_for) else {
                debug!(chat_id = message.chat.id, "Ignoring non-command message");
                continue;
            };
            match bot.reply(message.chat.id, reply).await {
                Ok(_) => info!(chat_id = message.chat.id, "Answered bot command"),
                Err(e) => warn!(chat_id = message.chat.id, error = format!("{e:#}"), "Failed to answer bot command"),
            }
        }
    }
}

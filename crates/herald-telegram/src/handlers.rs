//! Command handlers for the Telegram bot.

use std::sync::Arc;

use herald_core::format::{
    extract_magnets, format_search_results, format_status_lines, format_torrent_groups,
    format_transfer_info, html_escape, magnet_display_name, split_message, MAX_MESSAGE_CHARS,
};
use herald_jackett::JackettError;
use herald_qbittorrent::QbitError;
use teloxide::prelude::*;
use teloxide::types::{Me, ParseMode};
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};

use crate::state::BotState;

const NOT_AUTHORIZED: &str = "❌ You are not allowed to run this command.";

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot")]
    Start,

    #[command(description = "Show help message")]
    Help,

    #[command(description = "List torrents by state")]
    Torrents,

    #[command(description = "Progress and speed of every torrent")]
    Status,

    #[command(description = "Transfer speeds and free disk space")]
    Space,

    #[command(description = "Search torrents: /search <query>")]
    Search(String),
}

const SEARCH_USAGE: &str = "Usage: /search <query>";

/// Send `text` as HTML, split over several messages when it is too long.
async fn send_html(bot: &Bot, chat_id: ChatId, text: String) -> ResponseResult<()> {
    for chunk in split_message(&text, MAX_MESSAGE_CHARS) {
        bot.send_message(chat_id, chunk)
            .parse_mode(ParseMode::Html)
            .await?;
    }
    Ok(())
}

/// Reply with a refusal if the sender is not on the allow-list.
async fn ensure_authorized(bot: &Bot, msg: &Message, state: &BotState) -> ResponseResult<bool> {
    if state.is_authorized_message(msg) {
        return Ok(true);
    }

    warn!(
        chat_id = %msg.chat.id,
        user_id = ?msg.from.as_ref().map(|u| u.id.0),
        "Unauthorized command attempt"
    );
    bot.send_message(msg.chat.id, NOT_AUTHORIZED).await?;
    Ok(false)
}

/// User-facing text for a qBittorrent failure.
fn qbit_error_text(e: &QbitError) -> String {
    match e {
        QbitError::AuthExpired | QbitError::LoginRejected => {
            "❌ Could not log in to qBittorrent.".to_string()
        }
        QbitError::HttpError(_) => "❌ qBittorrent is not reachable.".to_string(),
        other => format!("❌ qBittorrent error: {}", html_escape(&other.to_string())),
    }
}

/// User-facing text for a failed search.
fn jackett_error_text(e: &JackettError) -> String {
    match e {
        JackettError::EmptyQuery => SEARCH_USAGE.to_string(),
        JackettError::Connection(_) => "❌ Jackett is not reachable.".to_string(),
        JackettError::Api { status: 401 | 403, .. } => {
            "❌ Jackett rejected the API key.".to_string()
        }
        JackettError::Api { .. } | JackettError::InvalidUrl(_) => {
            "❌ Jackett returned an error. Check the bot configuration.".to_string()
        }
        JackettError::Parse { .. } => "❌ Could not read the results from Jackett.".to_string(),
        JackettError::AllIndexersFailed { .. } => {
            "❌ Search failed on every indexer.".to_string()
        }
    }
}

/// Handle the /start command.
pub async fn handle_start(bot: Bot, msg: Message) -> ResponseResult<()> {
    let welcome = "👋 Welcome to Torrent Herald!\n\n\
        Send me a magnet link and I will add it to qBittorrent. \
        I will let you know when the download is complete.\n\n\
        Type /help for all commands.";

    bot.send_message(msg.chat.id, welcome).await?;

    info!(chat_id = %msg.chat.id, user = ?msg.from.as_ref().map(|u| &u.username), "User started bot");
    Ok(())
}

/// Handle the /help command.
pub async fn handle_help(bot: Bot, msg: Message) -> ResponseResult<()> {
    let help_text = format!(
        "{}\n\nSend a magnet link to start a download.",
        Command::descriptions()
    );
    bot.send_message(msg.chat.id, help_text).await?;
    Ok(())
}

/// Handle the /torrents command.
pub async fn handle_torrents(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    if !ensure_authorized(&bot, &msg, &state).await? {
        return Ok(());
    }

    let text = match state.qbit().list_torrents().await {
        Ok(torrents) => format_torrent_groups(&torrents),
        Err(e) => {
            error!(error = %e, "Failed to list torrents");
            qbit_error_text(&e)
        }
    };
    send_html(&bot, msg.chat.id, text).await
}

/// Handle the /status command.
pub async fn handle_status(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    if !ensure_authorized(&bot, &msg, &state).await? {
        return Ok(());
    }

    let text = match state.qbit().list_torrents().await {
        Ok(torrents) => format_status_lines(&torrents),
        Err(e) => {
            error!(error = %e, "Failed to fetch torrent status");
            qbit_error_text(&e)
        }
    };
    send_html(&bot, msg.chat.id, text).await
}

/// Handle the /space command.
pub async fn handle_space(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    if !ensure_authorized(&bot, &msg, &state).await? {
        return Ok(());
    }

    let text = match state.qbit().transfer_info().await {
        Ok(info) => format_transfer_info(&info),
        Err(e) => {
            error!(error = %e, "Failed to fetch transfer info");
            qbit_error_text(&e)
        }
    };
    send_html(&bot, msg.chat.id, text).await
}

/// Handle the /search command.
pub async fn handle_search(
    bot: Bot,
    msg: Message,
    state: Arc<BotState>,
    query: String,
) -> ResponseResult<()> {
    if !ensure_authorized(&bot, &msg, &state).await? {
        return Ok(());
    }

    let query = query.trim();
    if query.is_empty() {
        bot.send_message(msg.chat.id, SEARCH_USAGE).await?;
        return Ok(());
    }

    let Some(jackett) = state.jackett() else {
        bot.send_message(msg.chat.id, "🔍 Search is not configured.").await?;
        return Ok(());
    };

    info!(chat_id = %msg.chat.id, query, "Searching Jackett");
    let text = match jackett.search(query).await {
        Ok(results) => format_search_results(query, &results),
        Err(e) => {
            error!(error = %e, query, "Search failed");
            jackett_error_text(&e)
        }
    };
    send_html(&bot, msg.chat.id, text).await
}

/// Handle a plain text message: every magnet link in it is queued.
pub async fn handle_message(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let magnets = extract_magnets(text);
    if magnets.is_empty() {
        debug!(chat_id = %msg.chat.id, "Message without magnet links ignored");
        return Ok(());
    }

    if !ensure_authorized(&bot, &msg, &state).await? {
        return Ok(());
    }

    for magnet in magnets {
        let name = magnet_display_name(&magnet);
        let reply = match state.qbit().add_magnet(&magnet).await {
            Ok(()) => {
                info!(chat_id = %msg.chat.id, torrent = %name, "Magnet added");
                format!("✅ Added to qBittorrent:\n<b>{}</b>", html_escape(&name))
            }
            Err(e) => {
                error!(error = %e, torrent = %name, "Failed to add magnet");
                qbit_error_text(&e)
            }
        };
        send_html(&bot, msg.chat.id, reply).await?;
    }

    Ok(())
}

/// Reply to a `/command` that did not parse. Commands addressed to another
/// bot (`/start@otherbot`) are left alone.
pub async fn handle_unknown(bot: Bot, msg: Message, me: Me) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    if !is_command_for_bot(text, me.username()) {
        debug!(cmd = %text, "Command for another bot ignored");
        return Ok(());
    }

    info!(cmd = %text, "Unrecognized command");
    bot.send_message(msg.chat.id, unknown_command_text(text)).await?;
    Ok(())
}

/// Whether `text` starts with a `/command` without an `@` suffix, or with
/// one naming `bot_username`.
pub fn is_command_for_bot(text: &str, bot_username: &str) -> bool {
    let Some(command) = text.split_whitespace().next().filter(|c| c.starts_with('/')) else {
        return false;
    };

    match command.split_once('@') {
        Some((_, target)) => target.eq_ignore_ascii_case(bot_username),
        None => true,
    }
}

fn unknown_command_text(text: &str) -> String {
    format!(
        "Unknown command: {}\n\nUse /help to see available commands.",
        text.split_whitespace().next().unwrap_or(text)
    )
}

/// Main command dispatcher.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    match cmd {
        Command::Start => handle_start(bot, msg).await,
        Command::Help => handle_help(bot, msg).await,
        Command::Torrents => handle_torrents(bot, msg, state).await,
        Command::Status => handle_status(bot, msg, state).await,
        Command::Space => handle_space(bot, msg, state).await,
        Command::Search(query) => handle_search(bot, msg, state, query).await,
    }
}

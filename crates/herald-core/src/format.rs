//! Chat message formatting.
//!
//! All text produced here is meant for Telegram's HTML parse mode; torrent
//! names are escaped before they are embedded.

use std::sync::LazyLock;

use herald_models::{
    NotificationEvent, SearchResult, TorrentSnapshot, TorrentState, TransferInfo, TransitionKind,
};
use regex::Regex;
use url::Url;

/// Maximum number of characters of a torrent name shown in status lines.
pub const MAX_NAME_CHARS: usize = 50;

/// Number of search results shown for one `/search`.
pub const MAX_SEARCH_RESULTS: usize = 10;

/// Chunk size for outgoing chat messages. Telegram refuses texts over 4096
/// characters; the margin covers characters it counts twice.
pub const MAX_MESSAGE_CHARS: usize = 4000;

static MAGNET_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)magnet:\?xt=urn:btih:[0-9a-f]{40}\S*").expect("Invalid magnet regex")
});

/// Human-readable byte count with two decimals, e.g. `1.50 GB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut size = bytes as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{size:.2} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.2} PB")
}

/// Transfer rate, e.g. `1.00 MB/s`.
pub fn format_rate(bytes_per_sec: u64) -> String {
    format!("{}/s", format_bytes(bytes_per_sec))
}

/// Escape HTML special characters for Telegram HTML mode.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Cut `name` to at most `max` characters.
pub fn truncate_name(name: &str, max: usize) -> &str {
    match name.char_indices().nth(max) {
        Some((idx, _)) => &name[..idx],
        None => name,
    }
}

/// Split `text` into chunks of at most `max` characters.
///
/// Chunks break on line boundaries so HTML tags, which never span lines in
/// this module's output, stay balanced. A single line longer than `max` is
/// cut at character boundaries. Blank lines at a chunk edge are dropped.
pub fn split_message(text: &str, max: usize) -> Vec<String> {
    let max = max.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    let mut has_lines = false;

    for line in text.split('\n') {
        let mut rest = line;
        loop {
            let piece = truncate_name(rest, max);
            rest = &rest[piece.len()..];
            let piece_len = piece.chars().count();

            if has_lines && current_len + 1 + piece_len > max {
                chunks.push(current.trim_end_matches('\n').to_string());
                current.clear();
                current_len = 0;
                has_lines = false;
            }

            if !(piece.is_empty() && !has_lines) {
                if has_lines {
                    current.push('\n');
                    current_len += 1;
                }
                current.push_str(piece);
                current_len += piece_len;
                has_lines = true;
            }

            if rest.is_empty() {
                break;
            }
        }
    }

    let last = current.trim_end_matches('\n');
    if !last.is_empty() {
        chunks.push(last.to_string());
    }
    chunks
}

/// All magnet links in `text`, in order of appearance.
///
/// A link is `magnet:?xt=urn:btih:` followed by a 40 character hex info-hash
/// and runs until the next whitespace. Matching is case insensitive.
pub fn extract_magnets(text: &str) -> Vec<String> {
    MAGNET_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Display name (`dn` parameter) of a magnet link, or the link itself.
pub fn magnet_display_name(magnet: &str) -> String {
    Url::parse(magnet)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "dn")
                .map(|(_, value)| value.into_owned())
        })
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| magnet.to_string())
}

/// Chat text for a monitor notification.
pub fn format_notification(event: &NotificationEvent) -> String {
    match event.kind {
        TransitionKind::Completed => {
            format!("🎉 <b>Download complete</b>\n{}", html_escape(&event.name))
        }
        TransitionKind::Error => {
            format!("❗ <b>Torrent error</b>\n{}", html_escape(&event.name))
        }
    }
}

/// The `/torrents` listing: names grouped into Active, Paused, Completed and
/// Stopped sections.
pub fn format_torrent_groups(torrents: &[TorrentSnapshot]) -> String {
    let mut active = Vec::new();
    let mut paused = Vec::new();
    let mut completed = Vec::new();
    let mut stopped = Vec::new();

    for torrent in torrents {
        let name = html_escape(&torrent.name);
        match torrent.state {
            TorrentState::Downloading => active.push(name),
            TorrentState::Paused => paused.push(name),
            TorrentState::Completed => completed.push(name),
            TorrentState::Queued | TorrentState::Error | TorrentState::Unknown => stopped.push(name),
        }
    }

    [
        ("Active", active),
        ("Paused", paused),
        ("Completed", completed),
        ("Stopped", stopped),
    ]
    .into_iter()
    .map(|(title, names)| {
        let body = if names.is_empty() {
            "None".to_string()
        } else {
            names.join("\n")
        };
        format!("<b>{title} torrents:</b>\n{body}")
    })
    .collect::<Vec<_>>()
    .join("\n\n")
}

/// One status line per torrent: name, state, progress and rates.
pub fn format_status_lines(torrents: &[TorrentSnapshot]) -> String {
    if torrents.is_empty() {
        return "No torrents.".to_string();
    }

    torrents
        .iter()
        .map(|t| {
            format!(
                "<b>{}</b> - {}, {}% ↓{} ↑{}",
                html_escape(truncate_name(&t.name, MAX_NAME_CHARS)),
                t.state,
                t.percent(),
                format_rate(t.download_rate),
                format_rate(t.upload_rate),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The periodic status digest.
pub fn format_status_report(torrents: &[TorrentSnapshot]) -> String {
    format!(
        "📊 <b>qBittorrent status</b>\n\n{}",
        format_status_lines(torrents)
    )
}

/// The `/space` reply.
pub fn format_transfer_info(info: &TransferInfo) -> String {
    let free = info
        .free_space
        .map(format_bytes)
        .unwrap_or_else(|| "unavailable".to_string());

    format!(
        "💾 <b>Transfer</b>\nDownload: {}\nUpload: {}\nFree disk space: {}",
        format_rate(info.download_speed),
        format_rate(info.upload_speed),
        free
    )
}

/// The `/search` reply: the best `MAX_SEARCH_RESULTS` releases, each with
/// its link in a `<code>` block so it can be copied back to the bot.
pub fn format_search_results(query: &str, results: &[SearchResult]) -> String {
    let query = html_escape(query);
    if results.is_empty() {
        return format!("🔍 No results for <b>{query}</b>.");
    }

    let shown = results.len().min(MAX_SEARCH_RESULTS);
    let mut lines = vec![format!(
        "🔍 <b>{}</b> results for <b>{query}</b>, showing {shown}:",
        results.len()
    )];

    for (i, result) in results.iter().take(shown).enumerate() {
        lines.push(String::new());
        lines.push(format!("<b>{}. {}</b>", i + 1, html_escape(&result.title)));
        lines.push(format!(
            "{} | S: {} | L: {} | {}",
            format_bytes(result.size),
            result.seeders,
            result.leechers,
            html_escape(&result.indexer)
        ));
        if let Some(published) = &result.published {
            lines.push(format!("Published: {}", html_escape(published)));
        }
        lines.push(format!("<code>{}</code>", html_escape(&result.link)));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "0123456789abcdef0123456789abcdef01234567";

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0.00 B");
        assert_eq!(format_bytes(1023), "1023.00 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 GB");
        assert_eq!(format_bytes(1024u64.pow(5) * 2), "2.00 PB");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(2048), "2.00 KB/s");
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("a<b>&c"), "a&lt;b&gt;&amp;c");
    }

    #[test]
    fn test_truncate_name_is_char_aware() {
        assert_eq!(truncate_name("short", 50), "short");
        assert_eq!(truncate_name("abcdef", 3), "abc");
        assert_eq!(truncate_name("ñandú ñandú", 5), "ñandú");
    }

    #[test]
    fn test_extract_magnets() {
        let text = format!(
            "grab these magnet:?xt=urn:btih:{HASH}&dn=First and MAGNET:?XT=URN:BTIH:{}",
            HASH.to_uppercase()
        );
        let magnets = extract_magnets(&text);

        assert_eq!(magnets.len(), 2);
        assert_eq!(magnets[0], format!("magnet:?xt=urn:btih:{HASH}&dn=First"));
        assert!(magnets[1].starts_with("MAGNET:"));
    }

    #[test]
    fn test_extract_magnets_rejects_short_hash() {
        assert!(extract_magnets("magnet:?xt=urn:btih:abc123").is_empty());
        assert!(extract_magnets("no links here").is_empty());
    }

    #[test]
    fn test_magnet_display_name() {
        let magnet = format!("magnet:?xt=urn:btih:{HASH}&dn=Debian+12%20DVD&tr=udp://t");
        assert_eq!(magnet_display_name(&magnet), "Debian 12 DVD");

        let bare = format!("magnet:?xt=urn:btih:{HASH}");
        assert_eq!(magnet_display_name(&bare), bare);
    }

    #[test]
    fn test_format_notification() {
        let snapshot = TorrentSnapshot::new("t1", "A <b> & C", TorrentState::Completed);
        let done = NotificationEvent::for_snapshot(&snapshot, TransitionKind::Completed);
        assert_eq!(
            format_notification(&done),
            "🎉 <b>Download complete</b>\nA &lt;b&gt; &amp; C"
        );

        let failed = NotificationEvent::for_snapshot(&snapshot, TransitionKind::Error);
        assert!(format_notification(&failed).contains("Torrent error"));
    }

    #[test]
    fn test_format_torrent_groups() {
        let torrents = vec![
            TorrentSnapshot::new("a", "Alpha", TorrentState::Downloading),
            TorrentSnapshot::new("b", "Bravo", TorrentState::Completed),
            TorrentSnapshot::new("c", "Charlie", TorrentState::Error),
            TorrentSnapshot::new("d", "Delta", TorrentState::Queued),
        ];
        let text = format_torrent_groups(&torrents);

        assert_eq!(
            text,
            "<b>Active torrents:</b>\nAlpha\n\n\
             <b>Paused torrents:</b>\nNone\n\n\
             <b>Completed torrents:</b>\nBravo\n\n\
             <b>Stopped torrents:</b>\nCharlie\nDelta"
        );
    }

    #[test]
    fn test_format_status_lines() {
        let long_name = "x".repeat(80);
        let torrents = vec![TorrentSnapshot::new("a", long_name, TorrentState::Downloading)
            .with_progress(0.4567)
            .with_rates(1024, 0)];
        let text = format_status_lines(&torrents);

        assert_eq!(
            text,
            format!("<b>{}</b> - downloading, 45.7% ↓1.00 KB/s ↑0.00 B/s", "x".repeat(50))
        );
        assert_eq!(format_status_lines(&[]), "No torrents.");
    }

    #[test]
    fn test_split_message_short_text_is_one_chunk() {
        assert_eq!(split_message("one\ntwo", 100), vec!["one\ntwo"]);
        assert!(split_message("", 100).is_empty());
    }

    #[test]
    fn test_split_message_breaks_on_lines() {
        let chunks = split_message("aaaa\nbbbb\n\ncccc", 9);
        assert_eq!(chunks, vec!["aaaa\nbbbb", "cccc"]);
    }

    #[test]
    fn test_split_message_cuts_long_line() {
        let chunks = split_message(&"é".repeat(25), 10);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert_eq!(chunks.concat(), "é".repeat(25));
    }

    #[test]
    fn test_many_torrents_fit_message_limit() {
        let torrents: Vec<_> = (0..60)
            .map(|i| {
                TorrentSnapshot::new(
                    format!("hash{i}"),
                    format!("Some.Linux.Distribution.{i:02}.Release.2024.x86_64.DVD.Image.iso"),
                    if i % 2 == 0 { TorrentState::Downloading } else { TorrentState::Completed },
                )
                .with_progress(0.5)
                .with_rates(1024 * 1024, 2048)
            })
            .collect();

        for text in [format_status_report(&torrents), format_torrent_groups(&torrents)] {
            let chunks = split_message(&text, MAX_MESSAGE_CHARS);
            assert!(chunks.iter().all(|c| c.chars().count() <= 4096));
            assert!(chunks.iter().all(|c| c.matches("<b>").count() == c.matches("</b>").count()));

            let joined = chunks.join("\n");
            for i in 0..60 {
                assert!(joined.contains(&format!("Distribution.{i:02}.")), "torrent {i} missing");
            }
        }

        let report = format_status_report(&torrents);
        assert!(report.chars().count() > MAX_MESSAGE_CHARS);
        assert!(split_message(&report, MAX_MESSAGE_CHARS).len() >= 2);
    }

    #[test]
    fn test_format_search_results() {
        let results = vec![SearchResult::new(
            "Debian <12> DVD",
            format!("magnet:?xt=urn:btih:{HASH}&dn=Debian&tr=udp://t"),
            "1337x",
        )
        .with_size(1024 * 1024 * 1024)
        .with_peers(120, 4)
        .with_published("2024-06-10T12:00:00")];

        let text = format_search_results("debian & co", &results);
        assert_eq!(
            text,
            format!(
                "🔍 <b>1</b> results for <b>debian &amp; co</b>, showing 1:\n\n\
                 <b>1. Debian &lt;12&gt; DVD</b>\n\
                 1.00 GB | S: 120 | L: 4 | 1337x\n\
                 Published: 2024-06-10T12:00:00\n\
                 <code>magnet:?xt=urn:btih:{HASH}&amp;dn=Debian&amp;tr=udp://t</code>"
            )
        );
    }

    #[test]
    fn test_format_search_results_limits_and_empty() {
        assert_eq!(
            format_search_results("nothing", &[]),
            "🔍 No results for <b>nothing</b>."
        );

        let results: Vec<_> = (0..25)
            .map(|i| SearchResult::new(format!("Release {i}"), format!("http://dl/{i}"), "all"))
            .collect();
        let text = format_search_results("release", &results);
        assert!(text.contains("<b>25</b> results"));
        assert!(text.contains("<b>10. Release 9</b>"));
        assert!(!text.contains("Release 10"));
    }

    #[test]
    fn test_format_transfer_info() {
        let info = TransferInfo {
            download_speed: 1024,
            upload_speed: 0,
            free_space: None,
        };
        let text = format_transfer_info(&info);
        assert!(text.contains("Download: 1.00 KB/s"));
        assert!(text.contains("Free disk space: unavailable"));

        let info = TransferInfo {
            free_space: Some(1024 * 1024),
            ..info
        };
        assert!(format_transfer_info(&info).contains("Free disk space: 1.00 MB"));
    }
}

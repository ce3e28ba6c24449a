//! URL construction and normalization.

use crate::error::ExtractError;
use regex::Regex;
use reqwest::Url;
use std::sync::LazyLock;

pub const YOUTUBE_BASE_URL: &str = "https://www.youtube.com";
pub const CHANNEL_URL_BASE: &str = "https://www.youtube.com/channel/";
const FEED_URL_BASE: &str = "https://www.youtube.com/feeds/videos.xml?channel_id=";
const WATCH_URL_BASE: &str = "https://www.youtube.com/watch?v=";

// https://github.com/yt-dlp/yt-dlp/blob/a065086640e888e8d58c615d52ed2f4f4e4c9d18/yt_dlp/extractor/youtube.py#L518-L519
pub static UCID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^UC(?-u:[\w-]){22}$").expect("Should be able to parse the UCID regex")
});
pub static HANDLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@[\w.-]{3,30}$").expect("Should be able to parse the @handle regex")
});

const YOUTUBE_HOSTS: &[&str] = &["youtube.com", "www.youtube.com", "m.youtube.com"];

/// Rewrites a possibly scheme-relative or plain-http URL into an https one.
///
/// ```
/// # use youtube_channel_extractor::url::to_https;
/// assert_eq!(to_https("//yt3.ggpht.com/a.jpg"), "https://yt3.ggpht.com/a.jpg");
/// assert_eq!(to_https("http://yt3.ggpht.com/a.jpg"), "https://yt3.ggpht.com/a.jpg");
/// ```
pub fn to_https(url: &str) -> String {
    let url = url.strip_prefix("//").unwrap_or(url);
    if let Some(rest) = url.strip_prefix("http://") {
        format!("https://{rest}")
    } else if url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

pub fn channel_url(channel_id: &str) -> String {
    format!("{CHANNEL_URL_BASE}{channel_id}")
}

/// The Atom feed of a channel's uploads.
pub fn feed_url(channel_id: &str) -> String {
    format!("{FEED_URL_BASE}{channel_id}")
}

pub fn video_url(video_id: &str) -> String {
    format!("{WATCH_URL_BASE}{video_id}")
}

/// The polymer JSON endpoint for the grid view of a channel's videos tab.
pub fn videos_tab_url(channel_url: &str) -> String {
    format!(
        "{}/videos?pbj=1&view=0&flow=grid",
        channel_url.trim_end_matches('/')
    )
}

/// Turns whatever the user gave us for a channel into its canonical https base URL.
///
/// Accepts a bare channel id (`UC…`), a `@handle` (with or without the `@`), or a channel
/// URL of the `/channel/`, `/user/`, `/c/` or `/@handle` kind. Trailing tab segments such as
/// `/videos` are dropped.
pub fn normalize_channel_link(input: &str) -> Result<String, ExtractError> {
    let input = input.trim();
    let invalid = |why: &str| ExtractError::InvalidArgument(format!("{why}: {input:?}"));

    if input.is_empty() {
        return Err(invalid("channel link is empty"));
    }
    if UCID_REGEX.is_match(input) {
        return Ok(channel_url(input));
    }
    if HANDLE_REGEX.is_match(input) {
        return Ok(format!("{YOUTUBE_BASE_URL}/{input}"));
    }

    if !input.contains('/') {
        let handle = format!("@{input}");
        if HANDLE_REGEX.is_match(&handle) {
            return Ok(format!("{YOUTUBE_BASE_URL}/{handle}"));
        }
        return Err(invalid("not a channel id or handle"));
    }

    let url = Url::parse(&to_https(input)).map_err(|_| invalid("not a valid URL"))?;
    if !url
        .host_str()
        .is_some_and(|host| YOUTUBE_HOSTS.contains(&host))
    {
        return Err(invalid("not a YouTube URL"));
    }

    let mut segments = url.path_segments().into_iter().flatten();
    match (segments.next(), segments.next()) {
        (Some(kind @ ("channel" | "user" | "c")), Some(name)) if !name.is_empty() => {
            Ok(format!("{YOUTUBE_BASE_URL}/{kind}/{name}"))
        }
        (Some(handle), _) if HANDLE_REGEX.is_match(handle) => {
            Ok(format!("{YOUTUBE_BASE_URL}/{handle}"))
        }
        _ => Err(invalid("not a channel URL")),
    }
}

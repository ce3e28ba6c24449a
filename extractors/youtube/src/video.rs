//! Normalized video records.

use serde::Serialize;

/// One video as listed on a channel's videos tab.
///
/// The per-item JSON does not reliably say who uploaded the video, so `uploader_name` and
/// `uploader_url` are always those of the channel the listing was extracted from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoSummary {
    /// The ID that YouTube uses to uniquely identify the video.
    pub id: String,
    /// The watch page URL.
    pub url: String,
    pub title: String,
    /// The largest listed thumbnail, https-normalized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Length in seconds. Absent for live and upcoming streams.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    /// Absent when the listing doesn't show a count (e.g. upcoming premieres).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
    /// Upload time exactly as displayed, e.g. `"3 days ago"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub textual_upload_date: Option<String>,
    pub stream_type: StreamType,
    pub uploader_name: String,
    pub uploader_url: String,
}

/// What kind of entry a listed video is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamType {
    /// A regular upload.
    Video,
    /// Currently streaming.
    Live,
    /// A scheduled stream or premiere that hasn't started.
    Upcoming,
}

//! Channel metadata types.

use serde::Serialize;

/// Metadata about a YouTube channel, as read from its videos tab.
///
/// This is a snapshot computed from the channel document held by a
/// [`ChannelExtractor`](crate::ChannelExtractor); it is not kept in sync with later fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    /// The ID that YouTube uses to uniquely identify the channel.
    pub id: String,
    /// The channel's title.
    pub name: String,
    /// Canonical `https://www.youtube.com/channel/<id>` URL.
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Absent when the channel has no banner or uses the default one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub subscriber_count: SubscriberCount,
    /// The Atom feed of the channel's uploads.
    pub feed_url: String,
}

/// The three states a channel's subscriber count can be in.
///
/// Channel owners can hide the count while keeping subscriptions enabled, and channels can
/// have subscriptions disabled entirely. The two must stay distinguishable, so neither is
/// folded into a zero count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriberCount {
    Visible(u64),
    /// There is a subscribe button, but the count is not shown.
    Hidden,
    /// There is no subscribe button at all.
    Disabled,
}

impl SubscriberCount {
    /// The count as a signed integer: the count itself, `0` when hidden and `-1` when
    /// disabled.
    pub fn as_raw(self) -> i64 {
        match self {
            SubscriberCount::Visible(n) => i64::try_from(n).unwrap_or(i64::MAX),
            SubscriberCount::Hidden => 0,
            SubscriberCount::Disabled => -1,
        }
    }

    pub fn visible(self) -> Option<u64> {
        match self {
            SubscriberCount::Visible(n) => Some(n),
            SubscriberCount::Hidden | SubscriberCount::Disabled => None,
        }
    }
}

//! Continuation tokens and the next-page URLs built from them.

use crate::json::JsonExt;
use serde_json::Value;

const BROWSE_AJAX_URL: &str = "https://www.youtube.com/browse_ajax";

/// An opaque cursor for the next page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationToken {
    pub continuation: String,
    pub click_tracking_params: String,
}

impl ContinuationToken {
    /// Reads the first entry of a `continuations` array.
    ///
    /// Returns `None` if the array is empty or its first entry is not a
    /// `nextContinuationData` with both fields present. Other continuation kinds are not
    /// recognized.
    pub fn from_continuations(continuations: &[Value]) -> Option<Self> {
        let first = continuations.first()?;
        let data = first.object_at("/nextContinuationData")?;
        let continuation = data.get("continuation")?.as_str()?;
        let click_tracking_params = data.get("clickTrackingParams")?.as_str()?;
        Some(Self {
            continuation: continuation.to_string(),
            click_tracking_params: click_tracking_params.to_string(),
        })
    }

    /// The URL that fetches the page this token points at.
    ///
    /// Both values are inserted verbatim; they come from YouTube already URL-safe.
    pub fn page_url(&self) -> String {
        format!(
            "{BROWSE_AJAX_URL}?ctoken={c}&continuation={c}&itct={t}",
            c = self.continuation,
            t = self.click_tracking_params,
        )
    }
}

/// The next-page cursor for a `continuations` array, or the empty string if there are no
/// more pages.
///
/// An unrecognized shape is treated the same as "no more pages" so that a schema change ends
/// pagination instead of failing it.
pub fn next_page_url(continuations: Option<&Vec<Value>>) -> String {
    match continuations.and_then(|c| ContinuationToken::from_continuations(c)) {
        Some(token) => token.page_url(),
        None => {
            tracing::trace!(
                present = continuations.is_some(),
                "no usable continuation, listing ends here"
            );
            String::new()
        }
    }
}

//! Turning raw grid tiles into [`VideoSummary`] records.

use crate::error::{ExtractError, FieldContext};
use crate::json::JsonExt;
use crate::text::{parse_duration, parse_view_count, text_from_object};
use crate::url::{to_https, video_url};
use crate::video::{StreamType, VideoSummary};
use serde_json::Value;

/// The key a tile must carry to be treated as a video.
pub const GRID_VIDEO_RENDERER: &str = "gridVideoRenderer";

/// Channel-level facts stamped onto every item of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploaderContext {
    pub name: String,
    pub url: String,
}

/// Extracts one video from the inner renderer object of a tile.
///
/// Implemented for plain functions and closures with the matching signature, so a caller can
/// swap in its own field mapping without a new type.
pub trait ItemExtractor {
    fn extract(
        &self,
        renderer: &Value,
        uploader: &UploaderContext,
    ) -> Result<VideoSummary, ExtractError>;
}

impl<F> ItemExtractor for F
where
    F: Fn(&Value, &UploaderContext) -> Result<VideoSummary, ExtractError>,
{
    fn extract(
        &self,
        renderer: &Value,
        uploader: &UploaderContext,
    ) -> Result<VideoSummary, ExtractError> {
        self(renderer, uploader)
    }
}

/// Items of one listing, plus the tiles that looked like videos but couldn't be read.
#[derive(Debug, Default)]
pub struct NormalizedItems {
    pub items: Vec<VideoSummary>,
    pub errors: Vec<ExtractError>,
}

/// Normalizes every tile in `tiles` that carries a [`GRID_VIDEO_RENDERER`].
///
/// Tiles without one (continuation placeholders, shelves, ads) are skipped silently. A video
/// tile that fails extraction is recorded in [`NormalizedItems::errors`] and does not stop
/// the rest of the page. Whatever the extractor returns, the uploader fields are overwritten
/// with `uploader`.
pub fn normalize_items<E>(tiles: &[Value], uploader: &UploaderContext, extractor: &E) -> NormalizedItems
where
    E: ItemExtractor + ?Sized,
{
    let mut normalized = NormalizedItems::default();
    for tile in tiles {
        let Some(renderer) = tile.get(GRID_VIDEO_RENDERER).filter(|r| r.is_object()) else {
            tracing::trace!("skipping tile without {GRID_VIDEO_RENDERER}");
            continue;
        };

        match extractor.extract(renderer, uploader) {
            Ok(mut item) => {
                item.uploader_name.clone_from(&uploader.name);
                item.uploader_url.clone_from(&uploader.url);
                normalized.items.push(item);
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to extract video tile");
                normalized.errors.push(e);
            }
        }
    }
    normalized
}

/// The default field mapping for `gridVideoRenderer` objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridVideoExtractor;

impl ItemExtractor for GridVideoExtractor {
    fn extract(
        &self,
        renderer: &Value,
        uploader: &UploaderContext,
    ) -> Result<VideoSummary, ExtractError> {
        let id = renderer.require_str("/videoId").field("video id")?;
        let title = renderer
            .require("/title")
            .map(text_from_object)
            .field("video title")?
            .ok_or_else(|| ExtractError::field("video title", "title has no text"))?;

        let stream_type = stream_type(renderer);
        let duration = match stream_type {
            StreamType::Video => duration(renderer),
            StreamType::Live | StreamType::Upcoming => None,
        };

        Ok(VideoSummary {
            id: id.to_string(),
            url: video_url(id),
            title,
            thumbnail_url: renderer
                .array_at("/thumbnail/thumbnails")
                .and_then(|thumbnails| thumbnails.last())
                .and_then(|thumbnail| thumbnail.str_at("/url"))
                .map(to_https),
            duration,
            view_count: renderer
                .present_at("/viewCountText")
                .and_then(text_from_object)
                .and_then(|text| parse_view_count(&text)),
            textual_upload_date: renderer
                .present_at("/publishedTimeText")
                .and_then(text_from_object),
            stream_type,
            uploader_name: uploader.name.clone(),
            uploader_url: uploader.url.clone(),
        })
    }
}

fn stream_type(renderer: &Value) -> StreamType {
    if renderer.present_at("/upcomingEventData").is_some() {
        return StreamType::Upcoming;
    }

    let live_badge = renderer.array_at("/badges").is_some_and(|badges| {
        badges.iter().any(|badge| {
            badge.str_at("/metadataBadgeRenderer/style") == Some("BADGE_STYLE_TYPE_LIVE_NOW")
        })
    });
    let live_overlay = time_status_overlays(renderer)
        .any(|overlay| overlay.str_at("/style") == Some("LIVE"));

    if live_badge || live_overlay {
        StreamType::Live
    } else {
        StreamType::Video
    }
}

fn duration(renderer: &Value) -> Option<u64> {
    time_status_overlays(renderer)
        .filter_map(|overlay| overlay.present_at("/text"))
        .chain(renderer.present_at("/lengthText"))
        .filter_map(text_from_object)
        .find_map(|text| parse_duration(&text))
}

fn time_status_overlays(renderer: &Value) -> impl Iterator<Item = &Value> {
    renderer
        .array_at("/thumbnailOverlays")
        .into_iter()
        .flatten()
        .filter_map(|overlay| overlay.present_at("/thumbnailOverlayTimeStatusRenderer"))
}

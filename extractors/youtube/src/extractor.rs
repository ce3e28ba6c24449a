//! The channel extraction state machine.
//!
//! A [`ChannelExtractor`] starts out without a document. [`ChannelExtractor::fetch_initial`]
//! downloads the channel's videos tab in its polymer JSON form and keeps the payload; every
//! metadata accessor and [`ChannelExtractor::get_initial_page`] then work off that document
//! without further requests. Continuation pages are fetched with
//! [`ChannelExtractor::get_page`] and carry nothing but items and the next cursor, so the
//! uploader fields stamped onto their items come from the channel document.

use crate::channel::{Channel, SubscriberCount};
use crate::config::{ClientConfig, RefetchPolicy};
use crate::continuation::next_page_url;
use crate::error::{ExtractError, FieldContext};
use crate::item::{GridVideoExtractor, ItemExtractor, UploaderContext, normalize_items};
use crate::json::JsonExt;
use crate::page::{Page, PagedStream};
use crate::text::{parse_abbreviated_number, text_from_object};
use crate::transport::{Transport, fetch_envelope};
use crate::url::{channel_url, feed_url, normalize_channel_link, to_https, videos_tab_url};
use crate::video::VideoSummary;
use serde_json::Value;
use tokio_stream::Stream;
use tracing::instrument;

const HEADER: &str = "/header/c4TabbedHeaderRenderer";
const TABS: &str = "/contents/twoColumnBrowseResultsRenderer/tabs";
const VIDEOS_TAB_TITLE: &str = "Videos";
const NO_VIDEOS_MESSAGE: &str = "This channel has no videos.";
// relative to the videos tab renderer
const FIRST_SECTION_ITEM: &str =
    "/content/sectionListRenderer/contents/0/itemSectionRenderer/contents/0";
// relative to the continuation payload
const GRID_CONTINUATION: &str = "/continuationContents/gridContinuation";

/// Banner URLs containing any of these are YouTube's placeholder, not a real banner.
const PLACEHOLDER_BANNER_MARKERS: &[&str] = &["s.ytimg.com", "default_banner"];

/// Where the videos tab of the current document leads.
#[derive(Debug)]
enum VideoTab<'a> {
    /// The tab renderer, which holds a video grid.
    Videos(&'a Value),
    /// The tab exists and says the channel has no videos.
    Empty,
}

/// Extracts metadata and the video listing of one channel.
///
/// The extractor owns the channel document; methods that fetch take `&mut self`, so reads
/// and fetches can't interleave. The held document is only replaced once every response a
/// call needs has been parsed, so a failed call leaves the extractor as it was and can be
/// retried.
///
/// # Example
///
/// ```rust,no_run
/// use youtube_channel_extractor::{ChannelExtractor, ClientConfig, ReqwestTransport};
///
/// # async fn example() -> Result<(), youtube_channel_extractor::ExtractError> {
/// let mut extractor = ChannelExtractor::new(
///     ReqwestTransport::default(),
///     "UCuAXFkgsw1L7xaCfnd5JJOw",
///     ClientConfig::default(),
/// )?;
/// extractor.fetch_initial().await?;
/// println!("{}", extractor.name()?);
///
/// let mut page = extractor.get_initial_page()?;
/// loop {
///     for video in &page.items {
///         println!("{} {}", video.id, video.title);
///     }
///     if !page.has_next_page() {
///         break;
///     }
///     page = extractor.get_page(&page.next_page_url).await?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ChannelExtractor<T, E = GridVideoExtractor> {
    transport: T,
    config: ClientConfig,
    item_extractor: E,
    /// Normalized base URL of the channel as given by the caller.
    channel_link: String,
    document: Option<Value>,
}

impl<T: Transport> ChannelExtractor<T> {
    /// Creates an extractor for `channel`, which may be a channel id, a `@handle`, or a
    /// channel URL. Nothing is fetched until [`ChannelExtractor::fetch_initial`].
    pub fn new(transport: T, channel: &str, config: ClientConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            transport,
            config,
            item_extractor: GridVideoExtractor,
            channel_link: normalize_channel_link(channel)?,
            document: None,
        })
    }
}

impl<T: Transport, E: ItemExtractor> ChannelExtractor<T, E> {
    /// Replaces the per-item field mapping. Uploader fields are still stamped from the
    /// channel regardless of what `item_extractor` returns.
    pub fn with_item_extractor<E2: ItemExtractor>(self, item_extractor: E2) -> ChannelExtractor<T, E2> {
        ChannelExtractor {
            transport: self.transport,
            config: self.config,
            item_extractor,
            channel_link: self.channel_link,
            document: self.document,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The normalized channel URL this extractor was created with.
    pub fn original_url(&self) -> &str {
        &self.channel_link
    }

    pub fn is_fetched(&self) -> bool {
        self.document.is_some()
    }

    /// Downloads the channel document, replacing any document fetched earlier.
    ///
    /// The old document is kept if the request or parsing fails.
    #[instrument(skip(self), fields(channel = %self.channel_link))]
    pub async fn fetch_initial(&mut self) -> Result<(), ExtractError> {
        let url = videos_tab_url(&self.channel_link);
        let document = fetch_envelope(&self.transport, &url, &self.config).await?;
        self.document = Some(document);
        tracing::debug!("fetched channel document");
        Ok(())
    }

    fn document(&self) -> Result<&Value, ExtractError> {
        self.document.as_ref().ok_or(ExtractError::NotFetched)
    }

    pub fn id(&self) -> Result<String, ExtractError> {
        let id = self
            .document()?
            .require_str(&format!("{HEADER}/channelId"))
            .field("channel id")?;
        Ok(id.to_string())
    }

    pub fn name(&self) -> Result<String, ExtractError> {
        let name = self
            .document()?
            .require_str(&format!("{HEADER}/title"))
            .field("channel name")?;
        Ok(name.to_string())
    }

    /// The canonical channel URL, or the URL the extractor was created with if the document
    /// doesn't say which channel it is.
    pub fn url(&self) -> String {
        match self.id() {
            Ok(id) => channel_url(&id),
            Err(_) => self.channel_link.clone(),
        }
    }

    pub fn avatar_url(&self) -> Result<Option<String>, ExtractError> {
        Ok(self
            .document()?
            .str_at(&format!("{HEADER}/avatar/thumbnails/0/url"))
            .map(to_https))
    }

    /// The banner, unless the channel has none or shows the default placeholder.
    pub fn banner_url(&self) -> Result<Option<String>, ExtractError> {
        let banner = self
            .document()?
            .str_at(&format!("{HEADER}/banner/thumbnails/0/url"))
            .filter(|url| {
                !PLACEHOLDER_BANNER_MARKERS
                    .iter()
                    .any(|marker| url.contains(marker))
            })
            .map(to_https);
        Ok(banner)
    }

    pub fn description(&self) -> Result<Option<String>, ExtractError> {
        Ok(self
            .document()?
            .str_at("/metadata/channelMetadataRenderer/description")
            .map(str::to_string))
    }

    /// The subscriber count, telling "hidden by the owner" apart from "disabled".
    pub fn subscriber_count(&self) -> Result<SubscriberCount, ExtractError> {
        let header = self.document()?.require(HEADER).field("subscriber count")?;

        if let Some(text_node) = header.present_at("/subscriberCountText") {
            let text = text_from_object(text_node).ok_or_else(|| {
                ExtractError::field("subscriber count", "subscriber count node has no text")
            })?;
            let count = parse_abbreviated_number(&text).field("subscriber count")?;
            return Ok(SubscriberCount::Visible(count));
        }

        if header.present_at("/subscribeButton").is_some() {
            Ok(SubscriberCount::Hidden)
        } else {
            Ok(SubscriberCount::Disabled)
        }
    }

    pub fn feed_url(&self) -> Result<String, ExtractError> {
        let id = self.id().field("feed url")?;
        Ok(feed_url(&id))
    }

    /// All channel metadata at once. Fails if a required field (id, name) or the
    /// subscriber count can't be read; optional fields come back as `None`.
    pub fn channel(&self) -> Result<Channel, ExtractError> {
        let id = self.id()?;
        Ok(Channel {
            name: self.name()?,
            url: channel_url(&id),
            avatar_url: self.avatar_url()?,
            banner_url: self.banner_url()?,
            description: self.description()?,
            subscriber_count: self.subscriber_count()?,
            feed_url: feed_url(&id),
            id,
        })
    }

    fn uploader_context(&self) -> Result<UploaderContext, ExtractError> {
        Ok(UploaderContext {
            name: self.name()?,
            url: self.url(),
        })
    }

    fn video_tab(&self) -> Result<VideoTab<'_>, ExtractError> {
        let tabs = self
            .document()?
            .require_array(TABS)
            .map_err(|e| ExtractError::SchemaMismatch(format!("channel tabs ({e})")))?;

        let tab = tabs
            .iter()
            .filter_map(|tab| tab.present_at("/tabRenderer"))
            .find(|tab| tab.str_at("/title") == Some(VIDEOS_TAB_TITLE))
            .ok_or_else(|| ExtractError::SchemaMismatch(format!("{VIDEOS_TAB_TITLE} tab")))?;

        let message = tab
            .present_at(&format!("{FIRST_SECTION_ITEM}/messageRenderer/text"))
            .and_then(text_from_object);
        if message.as_deref() == Some(NO_VIDEOS_MESSAGE) {
            return Ok(VideoTab::Empty);
        }

        Ok(VideoTab::Videos(tab))
    }

    fn video_grid<'a>(tab: &'a Value) -> Result<&'a Value, ExtractError> {
        tab.require(&format!("{FIRST_SECTION_ITEM}/gridRenderer"))
            .map_err(|e| ExtractError::SchemaMismatch(format!("video grid ({e})")))
    }

    /// The cursor for the page after the initial one, or the empty string if there is none.
    pub fn next_page_url(&self) -> Result<String, ExtractError> {
        match self.video_tab()? {
            VideoTab::Empty => Ok(String::new()),
            VideoTab::Videos(tab) => {
                let grid = Self::video_grid(tab)?;
                Ok(next_page_url(grid.array_at("/continuations")))
            }
        }
    }

    /// The first page of videos, read from the already fetched document.
    ///
    /// A channel without videos yields an empty page with no next page.
    pub fn get_initial_page(&self) -> Result<Page<VideoSummary>, ExtractError> {
        let tab = match self.video_tab()? {
            VideoTab::Empty => {
                tracing::debug!(channel = %self.channel_link, "channel has no videos");
                return Ok(Page::empty());
            }
            VideoTab::Videos(tab) => tab,
        };

        let grid = Self::video_grid(tab)?;
        let tiles = grid
            .require_array("/items")
            .map_err(|e| ExtractError::SchemaMismatch(format!("video grid items ({e})")))?;

        let uploader = self.uploader_context()?;
        let normalized = normalize_items(tiles, &uploader, &self.item_extractor);
        let next = next_page_url(grid.array_at("/continuations"));
        tracing::debug!(
            items = normalized.items.len(),
            has_next_page = !next.is_empty(),
            "extracted initial page"
        );
        Ok(Page::from_normalized(normalized, next))
    }

    /// Fetches the continuation page at `page_url`.
    ///
    /// Under [`RefetchPolicy::Always`] the channel document is fetched again first, so each
    /// call costs two requests. The fresh document is kept only if the continuation succeeds.
    #[instrument(skip(self), fields(channel = %self.channel_link))]
    pub async fn get_page(&mut self, page_url: &str) -> Result<Page<VideoSummary>, ExtractError> {
        if page_url.is_empty() {
            return Err(ExtractError::InvalidArgument(
                "page url is empty".to_string(),
            ));
        }

        let refreshed = match (self.config.refetch_policy, self.is_fetched()) {
            (RefetchPolicy::ReuseDocument, true) => {
                tracing::trace!("reusing channel document for continuation");
                None
            }
            _ => {
                let url = videos_tab_url(&self.channel_link);
                Some(fetch_envelope(&self.transport, &url, &self.config).await?)
            }
        };

        let payload = fetch_envelope(&self.transport, page_url, &self.config).await?;
        let continuation = payload.require(GRID_CONTINUATION).map_err(|e| {
            ExtractError::SchemaMismatch(format!("grid continuation ({e})"))
        })?;
        let tiles = continuation.require_array("/items").map_err(|e| {
            ExtractError::SchemaMismatch(format!("grid continuation items ({e})"))
        })?;

        // commit only once the continuation parsed
        if let Some(document) = refreshed {
            self.document = Some(document);
        }

        let uploader = self.uploader_context()?;
        let normalized = normalize_items(tiles, &uploader, &self.item_extractor);
        let next = next_page_url(continuation.array_at("/continuations"));
        tracing::debug!(
            items = normalized.items.len(),
            has_next_page = !next.is_empty(),
            "extracted continuation page"
        );
        Ok(Page::from_normalized(normalized, next))
    }
}

impl<T, E> ChannelExtractor<T, E>
where
    T: Transport + Send + Sync + 'static,
    E: ItemExtractor + Send + Sync + 'static,
{
    /// Every video of the channel, fetching pages lazily as the stream is polled.
    ///
    /// Uses the document already held for the first page, and fetches it if there is none.
    /// The stream ends after the first error.
    pub fn videos(self) -> impl Stream<Item = Result<VideoSummary, ExtractError>> + Send + 'static {
        PagedStream::new(self, |extractor: Self, page_url: Option<String>| {
            extractor.into_page(page_url)
        })
    }

    async fn into_page(
        mut self,
        page_url: Option<String>,
    ) -> Result<(Self, Page<VideoSummary>), ExtractError> {
        let page = match page_url {
            None => {
                if !self.is_fetched() {
                    self.fetch_initial().await?;
                }
                self.get_initial_page()?
            }
            Some(url) => self.get_page(&url).await?,
        };
        Ok((self, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use crate::video::StreamType;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio_stream::StreamExt;

    const CHANNEL_ID: &str = "UCuAXFkgsw1L7xaCfnd5JJOw";

    fn channel_base() -> String {
        format!("https://www.youtube.com/channel/{CHANNEL_ID}")
    }

    fn initial_url() -> String {
        videos_tab_url(&channel_base())
    }

    fn envelope(payload: Value) -> String {
        json!([{ "page": "browse", "csn": "MC4x" }, { "response": payload }]).to_string()
    }

    fn tile(id: &str) -> Value {
        json!({
            "gridVideoRenderer": {
                "videoId": id,
                "title": { "simpleText": format!("Video {id}") },
                "thumbnail": { "thumbnails": [{ "url": format!("//i.ytimg.com/vi/{id}/hqdefault.jpg") }] },
                "viewCountText": { "simpleText": "1,000 views" },
                "publishedTimeText": { "simpleText": "1 week ago" },
                "thumbnailOverlays": [{ "thumbnailOverlayTimeStatusRenderer": {
                    "text": { "simpleText": "10:00" }, "style": "DEFAULT" } }]
            }
        })
    }

    fn continuations(token: &str, tracking: &str) -> Value {
        json!([{ "nextContinuationData": { "continuation": token, "clickTrackingParams": tracking } }])
    }

    fn header() -> Value {
        json!({
            "channelId": CHANNEL_ID,
            "title": "Rick Astley",
            "avatar": { "thumbnails": [{ "url": "//yt3.ggpht.com/avatar=s48" }] },
            "banner": { "thumbnails": [{ "url": "http://yt3.ggpht.com/banner=w1060" }] },
            "subscriberCountText": { "runs": [{ "text": "1.2M subscribers" }] },
            "subscribeButton": { "buttonRenderer": {} }
        })
    }

    fn videos_tab(section_item: Value) -> Value {
        json!({ "tabRenderer": {
            "title": "Videos",
            "content": { "sectionListRenderer": { "contents": [
                { "itemSectionRenderer": { "contents": [section_item] } }
            ]}}
        }})
    }

    fn document(header: Value, videos_tab: Value) -> Value {
        json!({
            "header": { "c4TabbedHeaderRenderer": header },
            "metadata": { "channelMetadataRenderer": { "description": "Never gonna give you up" } },
            "contents": { "twoColumnBrowseResultsRenderer": { "tabs": [
                { "tabRenderer": { "title": "Home" } },
                { "expandableTabRenderer": { "title": "Search" } },
                videos_tab
            ]}}
        })
    }

    fn grid_document(items: Vec<Value>, continuations: Option<Value>) -> Value {
        let mut grid = json!({ "items": items });
        if let Some(continuations) = continuations {
            grid["continuations"] = continuations;
        }
        document(header(), videos_tab(json!({ "gridRenderer": grid })))
    }

    async fn extractor_with(
        doc: Value,
        config: ClientConfig,
    ) -> (ChannelExtractor<MockTransport>, MockTransport) {
        let transport = MockTransport::new();
        transport.respond_ok(initial_url(), envelope(doc)).await;
        let mut extractor = ChannelExtractor::new(transport.clone(), CHANNEL_ID, config).unwrap();
        extractor.fetch_initial().await.unwrap();
        (extractor, transport)
    }

    #[tokio::test]
    async fn test_channel_metadata() {
        let (extractor, _) =
            extractor_with(grid_document(vec![], None), ClientConfig::default()).await;

        assert_eq!(
            extractor.channel().unwrap(),
            Channel {
                id: CHANNEL_ID.to_string(),
                name: "Rick Astley".to_string(),
                url: channel_base(),
                avatar_url: Some("https://yt3.ggpht.com/avatar=s48".to_string()),
                banner_url: Some("https://yt3.ggpht.com/banner=w1060".to_string()),
                description: Some("Never gonna give you up".to_string()),
                subscriber_count: SubscriberCount::Visible(1_200_000),
                feed_url: format!(
                    "https://www.youtube.com/feeds/videos.xml?channel_id={CHANNEL_ID}"
                ),
            }
        );
    }

    #[tokio::test]
    async fn test_subscriber_count_tri_state() {
        let mut hidden = header();
        hidden.as_object_mut().unwrap().remove("subscriberCountText");
        let mut disabled = hidden.clone();
        disabled.as_object_mut().unwrap().remove("subscribeButton");

        let mut counts = Vec::new();
        for header in [header(), hidden, disabled] {
            let doc = document(header, videos_tab(json!({ "gridRenderer": { "items": [] } })));
            let (extractor, _) = extractor_with(doc, ClientConfig::default()).await;
            counts.push(extractor.subscriber_count().unwrap().as_raw());
        }
        assert_eq!(counts, [1_200_000, 0, -1]);
    }

    #[tokio::test]
    async fn test_unparseable_subscriber_count_is_a_field_error() {
        let mut header = header();
        header["subscriberCountText"] = json!({ "simpleText": "lots of subscribers" });
        let doc = document(header, videos_tab(json!({ "gridRenderer": { "items": [] } })));
        let (extractor, _) = extractor_with(doc, ClientConfig::default()).await;

        let err = extractor.subscriber_count().unwrap_err();
        assert_eq!(err.field_name(), Some("subscriber count"));
        // the failure is confined to that field
        assert_eq!(extractor.name().unwrap(), "Rick Astley");
        assert!(extractor.channel().is_err());
    }

    #[tokio::test]
    async fn test_placeholder_banners_are_suppressed() {
        for banner in [
            "https://s.ytimg.com/yts/img/channels/c4/default_banner-vfl7DRgTn.png",
            "//yt3.ggpht.com/default_banner=w1060",
        ] {
            let mut header = header();
            header["banner"] = json!({ "thumbnails": [{ "url": banner }] });
            let doc = document(header, videos_tab(json!({ "gridRenderer": { "items": [] } })));
            let (extractor, _) = extractor_with(doc, ClientConfig::default()).await;
            assert_eq!(extractor.banner_url().unwrap(), None, "{banner}");
        }
    }

    #[tokio::test]
    async fn test_missing_optional_fields_are_absent() {
        let mut header = header();
        let header_obj = header.as_object_mut().unwrap();
        header_obj.remove("avatar");
        header_obj.remove("banner");
        let mut doc = document(header, videos_tab(json!({ "gridRenderer": { "items": [] } })));
        doc.as_object_mut().unwrap().remove("metadata");
        let (extractor, _) = extractor_with(doc, ClientConfig::default()).await;

        let channel = extractor.channel().unwrap();
        assert_eq!(channel.avatar_url, None);
        assert_eq!(channel.banner_url, None);
        assert_eq!(channel.description, None);
    }

    #[tokio::test]
    async fn test_missing_required_fields() {
        let mut header = header();
        header.as_object_mut().unwrap().remove("channelId");
        let doc = document(header, videos_tab(json!({ "gridRenderer": { "items": [tile("a")] } })));
        let (extractor, _) = extractor_with(doc, ClientConfig::default()).await;

        assert_eq!(extractor.id().unwrap_err().field_name(), Some("channel id"));
        assert_eq!(extractor.feed_url().unwrap_err().field_name(), Some("feed url"));
        assert!(extractor.channel().is_err());
        // url falls back to the link the extractor was created with
        assert_eq!(extractor.url(), channel_base());
        // the listing still works
        assert_eq!(extractor.get_initial_page().unwrap().items.len(), 1);
    }

    #[tokio::test]
    async fn test_accessors_before_fetch() {
        let extractor =
            ChannelExtractor::new(MockTransport::new(), CHANNEL_ID, ClientConfig::default())
                .unwrap();
        assert!(matches!(extractor.name(), Err(ExtractError::NotFetched)));
        assert!(matches!(extractor.banner_url(), Err(ExtractError::NotFetched)));
        assert!(matches!(
            extractor.get_initial_page(),
            Err(ExtractError::NotFetched)
        ));
        assert_eq!(extractor.url(), channel_base());
    }

    #[tokio::test]
    async fn test_initial_page_end_to_end() {
        let doc = grid_document(
            vec![tile("vid1"), json!({ "continuationItemRenderer": {} })],
            Some(continuations("C1", "T1")),
        );
        let (extractor, transport) = extractor_with(doc, ClientConfig::default()).await;

        let page = extractor.get_initial_page().unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(page.errors.is_empty());
        let item = &page.items[0];
        assert_eq!(item.id, "vid1");
        assert_eq!(item.title, "Video vid1");
        assert_eq!(item.duration, Some(600));
        assert_eq!(item.view_count, Some(1_000));
        assert_eq!(item.stream_type, StreamType::Video);
        assert_eq!(item.uploader_name, "Rick Astley");
        assert_eq!(item.uploader_url, channel_base());
        assert_eq!(
            page.next_page_url,
            "https://www.youtube.com/browse_ajax?ctoken=C1&continuation=C1&itct=T1"
        );
        assert_eq!(extractor.next_page_url().unwrap(), page.next_page_url);

        // reading the first page doesn't hit the network again
        assert_eq!(transport.requests().await.len(), 1);
    }

    #[tokio::test]
    async fn test_channel_without_videos() {
        let message = json!({ "messageRenderer": {
            "text": { "simpleText": "This channel has no videos." }
        }});
        let doc = document(header(), videos_tab(message));
        let (extractor, _) = extractor_with(doc, ClientConfig::default()).await;

        let page = extractor.get_initial_page().unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.next_page_url, "");
        assert_eq!(extractor.next_page_url().unwrap(), "");
    }

    #[tokio::test]
    async fn test_other_messages_are_not_the_empty_state() {
        let message = json!({ "messageRenderer": {
            "text": { "simpleText": "This channel has no playlists." }
        }});
        let doc = document(header(), videos_tab(message));
        let (extractor, _) = extractor_with(doc, ClientConfig::default()).await;

        let err = extractor.get_initial_page().unwrap_err();
        assert!(matches!(err, ExtractError::SchemaMismatch(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_missing_videos_tab_is_schema_mismatch() {
        let mut doc = grid_document(vec![tile("a")], None);
        doc["contents"]["twoColumnBrowseResultsRenderer"]["tabs"] =
            json!([{ "tabRenderer": { "title": "Home" } }]);
        let (extractor, _) = extractor_with(doc, ClientConfig::default()).await;

        let err = extractor.get_initial_page().unwrap_err();
        assert_eq!(err.to_string(), "could not find Videos tab");
    }

    #[tokio::test]
    async fn test_get_page_rejects_empty_url_without_network() {
        let (mut extractor, transport) =
            extractor_with(grid_document(vec![], None), ClientConfig::default()).await;

        let err = extractor.get_page("").await.unwrap_err();
        assert!(matches!(err, ExtractError::InvalidArgument(_)), "{err:?}");
        assert_eq!(transport.requests().await.len(), 1);
    }

    #[tokio::test]
    async fn test_get_page_refetches_channel_document() {
        let next = "https://www.youtube.com/browse_ajax?ctoken=C1&continuation=C1&itct=T1";
        let (mut extractor, transport) = extractor_with(
            grid_document(vec![tile("a")], Some(continuations("C1", "T1"))),
            ClientConfig::default(),
        )
        .await;
        transport
            .respond_ok(
                next,
                envelope(json!({ "continuationContents": { "gridContinuation": {
                    "items": [tile("b"), tile("c"), { "gridPlaylistRenderer": {} }],
                    "continuations": continuations("C2", "T2")
                }}})),
            )
            .await;

        let page = extractor.get_page(next).await.unwrap();
        let ids: Vec<_> = page.items.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["b", "c"]);
        assert!(page.items.iter().all(|v| v.uploader_name == "Rick Astley"));
        assert_eq!(
            page.next_page_url,
            "https://www.youtube.com/browse_ajax?ctoken=C2&continuation=C2&itct=T2"
        );

        let urls: Vec<_> = transport
            .requests()
            .await
            .into_iter()
            .map(|r| r.url)
            .collect();
        assert_eq!(urls, [initial_url(), initial_url(), next.to_string()]);
        for request in transport.requests().await {
            assert_eq!(request.header("X-YouTube-Client-Name"), Some("1"));
        }
    }

    #[tokio::test]
    async fn test_get_page_can_reuse_document() {
        let next = "https://www.youtube.com/browse_ajax?ctoken=C1&continuation=C1&itct=T1";
        let config = ClientConfig {
            refetch_policy: RefetchPolicy::ReuseDocument,
            ..ClientConfig::default()
        };
        let (mut extractor, transport) = extractor_with(
            grid_document(vec![tile("a")], Some(continuations("C1", "T1"))),
            config,
        )
        .await;
        transport
            .respond_ok(
                next,
                envelope(json!({ "continuationContents": { "gridContinuation": {
                    "items": [tile("b")]
                }}})),
            )
            .await;

        let page = extractor.get_page(next).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.next_page_url, "");
        assert_eq!(transport.request_count(&initial_url()).await, 1);
    }

    #[tokio::test]
    async fn test_failed_continuation_keeps_document() {
        let next = "https://www.youtube.com/browse_ajax?ctoken=C1&continuation=C1&itct=T1";
        let (mut extractor, transport) = extractor_with(
            grid_document(vec![tile("a")], Some(continuations("C1", "T1"))),
            ClientConfig::default(),
        )
        .await;
        transport.respond_ok(next, "[]").await;

        let err = extractor.get_page(next).await.unwrap_err();
        assert!(matches!(err, ExtractError::InvalidResponse { .. }), "{err:?}");
        // still usable, and retrying is safe
        assert_eq!(extractor.name().unwrap(), "Rick Astley");
        assert!(extractor.get_page(next).await.is_err());
    }

    #[tokio::test]
    async fn test_refetched_document_is_committed_only_with_its_page() {
        let next = "https://www.youtube.com/browse_ajax?ctoken=C1&continuation=C1&itct=T1";
        let mut renamed = header();
        renamed["title"] = json!("Rick Astley - Topic");
        let transport = MockTransport::new();
        transport
            .respond_ok(
                initial_url(),
                envelope(grid_document(vec![tile("a")], Some(continuations("C1", "T1")))),
            )
            .await;
        transport
            .respond_ok(
                initial_url(),
                envelope(document(
                    renamed,
                    videos_tab(json!({ "gridRenderer": { "items": [] } })),
                )),
            )
            .await;
        transport.respond_ok(next, "[]").await;

        let mut extractor =
            ChannelExtractor::new(transport.clone(), CHANNEL_ID, ClientConfig::default())
                .unwrap();
        extractor.fetch_initial().await.unwrap();

        // the refetch succeeds but the continuation doesn't
        assert!(extractor.get_page(next).await.is_err());
        assert_eq!(transport.request_count(&initial_url()).await, 2);
        assert_eq!(extractor.name().unwrap(), "Rick Astley");

        transport
            .respond_ok(
                next,
                envelope(json!({ "continuationContents": { "gridContinuation": {
                    "items": [tile("b")]
                }}})),
            )
            .await;
        // the queued failure is served once more before the good page
        assert!(extractor.get_page(next).await.is_err());
        let page = extractor.get_page(next).await.unwrap();
        assert_eq!(page.items[0].uploader_name, "Rick Astley - Topic");
        assert_eq!(extractor.name().unwrap(), "Rick Astley - Topic");
    }

    #[tokio::test]
    async fn test_videos_stream_walks_every_page() {
        let page2 = "https://www.youtube.com/browse_ajax?ctoken=C1&continuation=C1&itct=T1";
        let page3 = "https://www.youtube.com/browse_ajax?ctoken=C2&continuation=C2&itct=T2";
        let transport = MockTransport::new();
        transport
            .respond_ok(
                initial_url(),
                envelope(grid_document(
                    vec![tile("a"), tile("b")],
                    Some(continuations("C1", "T1")),
                )),
            )
            .await;
        transport
            .respond_ok(
                page2,
                envelope(json!({ "continuationContents": { "gridContinuation": {
                    "items": [tile("c")],
                    "continuations": continuations("C2", "T2")
                }}})),
            )
            .await;
        transport
            .respond_ok(
                page3,
                envelope(json!({ "continuationContents": { "gridContinuation": {
                    "items": [tile("d")]
                }}})),
            )
            .await;

        let extractor =
            ChannelExtractor::new(transport.clone(), CHANNEL_ID, ClientConfig::default())
                .unwrap();
        let ids: Vec<String> = extractor
            .videos()
            .map(|video| video.unwrap().id)
            .collect()
            .await;
        assert_eq!(ids, ["a", "b", "c", "d"]);
        // one initial fetch plus a refetch for each of the two continuation pages
        assert_eq!(transport.request_count(&initial_url()).await, 3);
    }

    #[tokio::test]
    async fn test_custom_item_extractor() {
        let (extractor, _) = extractor_with(
            grid_document(vec![tile("a")], None),
            ClientConfig::default(),
        )
        .await;
        let extractor = extractor.with_item_extractor(
            |renderer: &Value, uploader: &UploaderContext| -> Result<VideoSummary, ExtractError> {
                let mut video = GridVideoExtractor.extract(renderer, uploader)?;
                video.thumbnail_url = None;
                Ok(video)
            },
        );
        let page = extractor.get_initial_page().unwrap();
        assert_eq!(page.items[0].thumbnail_url, None);
        assert_eq!(page.items[0].uploader_name, "Rick Astley");
    }
}

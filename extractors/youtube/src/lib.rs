//! Extracts channel metadata and the paginated list of uploaded videos from YouTube's web
//! frontend, without an API key.
//!
//! The entry point is [`ChannelExtractor`]. It fetches a channel's videos tab in the
//! polymer JSON form the desktop site uses, reads metadata out of that document, and walks
//! the video grid page by page through continuation tokens. All HTTP goes through the
//! [`Transport`] trait; [`ReqwestTransport`] is the default implementation, and the `mock`
//! feature adds an in-memory one for tests.
//!
//! ```rust,no_run
//! use tokio_stream::StreamExt;
//! use youtube_channel_extractor::{ChannelExtractor, ClientConfig, ReqwestTransport};
//!
//! # async fn example() -> eyre::Result<()> {
//! let extractor = ChannelExtractor::new(
//!     ReqwestTransport::default(),
//!     "@RickAstleyYT",
//!     ClientConfig::default(),
//! )?;
//! let videos = extractor.videos();
//! let mut videos = std::pin::pin!(videos);
//! while let Some(video) = videos.next().await {
//!     let video = video?;
//!     println!("{} ({})", video.title, video.url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod config;
pub mod continuation;
pub mod error;
mod extractor;
pub mod item;
pub mod json;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod page;
pub mod text;
pub mod transport;
pub mod url;
pub mod video;

pub use channel::{Channel, SubscriberCount};
pub use config::{ClientConfig, Localization, RefetchPolicy};
pub use error::ExtractError;
pub use extractor::ChannelExtractor;
pub use item::{GridVideoExtractor, ItemExtractor, UploaderContext};
pub use page::{Page, PagedStream};
pub use transport::{ReqwestTransport, Response, Transport};
pub use video::{StreamType, VideoSummary};

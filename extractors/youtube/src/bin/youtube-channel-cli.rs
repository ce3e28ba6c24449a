use clap::Parser;
use eyre::Context;
use serde::Serialize;
use std::io::IsTerminal;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use youtube_channel_extractor::config::{DEFAULT_CLIENT_NAME, DEFAULT_CLIENT_VERSION};
use youtube_channel_extractor::{
    Channel, ChannelExtractor, ClientConfig, Localization, RefetchPolicy, ReqwestTransport,
    VideoSummary,
};

/// Print a YouTube channel and its uploaded videos as JSON.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Channel id, @handle, or channel URL.
    channel: String,

    /// Stop after this many pages of videos. All pages are fetched if not given.
    #[arg(long, env = "YT_CHANNEL_PAGES")]
    pages: Option<usize>,

    #[arg(long, env = "YT_CLIENT_VERSION", default_value = DEFAULT_CLIENT_VERSION)]
    client_version: String,

    #[arg(long, env = "YT_LANGUAGE", default_value = "en")]
    language: String,

    #[arg(long, env = "YT_COUNTRY")]
    country: Option<String>,

    /// Don't re-fetch the channel document before every continuation page.
    #[arg(long, env = "YT_REUSE_DOCUMENT")]
    reuse_document: bool,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,
}

impl Args {
    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            client_version: self.client_version.clone(),
            localization: Localization {
                language: self.language.clone(),
                country: self.country.clone(),
            },
            refetch_policy: if self.reuse_document {
                RefetchPolicy::ReuseDocument
            } else {
                RefetchPolicy::Always
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    channel: Channel,
    videos: Vec<VideoSummary>,
    /// Pages fetched, including the initial one.
    pages: usize,
    has_more: bool,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(args.log_level.into())
                .from_env_lossy(),
        )
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();

    let mut extractor = ChannelExtractor::new(
        ReqwestTransport::default(),
        &args.channel,
        args.client_config(),
    )
    .context("parse channel")?;

    extractor
        .fetch_initial()
        .await
        .context("fetch channel document")?;
    let channel = extractor.channel().context("extract channel metadata")?;
    tracing::info!(id = %channel.id, name = %channel.name, "fetched channel");

    let mut page = extractor
        .get_initial_page()
        .context("extract first page of videos")?;
    let mut videos = Vec::new();
    let mut pages = 1;
    loop {
        for e in &page.errors {
            tracing::warn!(error = %e, "skipped video");
        }
        videos.append(&mut page.items);

        if !page.has_next_page() || args.pages.is_some_and(|max| pages >= max) {
            break;
        }
        page = extractor
            .get_page(&page.next_page_url)
            .await
            .with_context(|| format!("fetch page {}", pages + 1))?;
        pages += 1;
    }
    tracing::info!(videos = videos.len(), pages, "done");

    let output = Output {
        channel,
        videos,
        pages,
        has_more: page.has_next_page(),
    };
    let json = serde_json::to_string_pretty(&output).context("serialize output")?;
    println!("{json}");

    Ok(())
}

//! Pages of listed items and the streaming adapter that walks them.

use crate::error::ExtractError;
use crate::item::NormalizedItems;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use tokio_stream::Stream;

/// One page of a listing.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// URL of the next page, or the empty string if this is the last one.
    pub next_page_url: String,
    /// Items that were recognized but could not be extracted.
    pub errors: Vec<ExtractError>,
}

impl<T> Page<T> {
    /// A page with no items and no next page.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_page_url: String::new(),
            errors: Vec::new(),
        }
    }

    pub fn has_next_page(&self) -> bool {
        !self.next_page_url.is_empty()
    }
}

impl Page<crate::video::VideoSummary> {
    pub(crate) fn from_normalized(normalized: NormalizedItems, next_page_url: String) -> Self {
        Self {
            items: normalized.items,
            next_page_url,
            errors: normalized.errors,
        }
    }
}

type OneFuturePage<'a, S, T> =
    Pin<Box<dyn Future<Output = Result<(S, Page<T>), ExtractError>> + 'a + Send>>;

/// A stream that yields the items of a listing one by one, fetching the next page when the
/// current one is exhausted.
///
/// The fetcher is handed the state `S` by value together with the page to fetch (`None` for
/// the first page, `Some(url)` after that) and hands the state back with the page. This lets
/// a fetcher that needs `&mut` access, such as a [`ChannelExtractor`](crate::ChannelExtractor),
/// drive the stream without shared ownership. Only forward pagination is supported, and the
/// stream ends after the first error.
pub struct PagedStream<'a, T, S, F> {
    /// Current batch of items from the most recent page
    current_items: VecDeque<T>,
    /// Future representing the currently pending page fetch, if any
    pending_request: Option<OneFuturePage<'a, S, T>>,
    fetcher: F,
    /// Whether we've reached the end of the listing
    is_done: bool,
}

impl<'a, T, S, F, Fut> PagedStream<'a, T, S, F>
where
    F: Fn(S, Option<String>) -> Fut,
    Fut: Future<Output = Result<(S, Page<T>), ExtractError>> + Send + 'a,
{
    /// Create a new PagedStream that starts by fetching the first page from `state`.
    pub fn new(state: S, fetcher: F) -> Self {
        let first_page = fetcher(state, None);
        Self {
            pending_request: Some(Box::pin(first_page)),
            current_items: VecDeque::new(),
            fetcher,
            is_done: false,
        }
    }
}

impl<T: Unpin, S, F> Unpin for PagedStream<'_, T, S, F> {}

impl<'a, T: Unpin, S, F, Fut> Stream for PagedStream<'a, T, S, F>
where
    F: Fn(S, Option<String>) -> Fut,
    Fut: Future<Output = Result<(S, Page<T>), ExtractError>> + Send + 'a,
{
    type Item = Result<T, ExtractError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        loop {
            // If we have items in the current batch, return the next one
            if let Some(item) = self.current_items.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }

            if self.is_done {
                return Poll::Ready(None);
            }

            let Some(pending) = self.pending_request.as_mut() else {
                self.is_done = true;
                return Poll::Ready(None);
            };

            match pending.as_mut().poll(cx) {
                Poll::Ready(Ok((state, page))) => {
                    if !page.errors.is_empty() {
                        tracing::debug!(
                            skipped = page.errors.len(),
                            "page had items that could not be extracted"
                        );
                    }
                    self.current_items.extend(page.items);

                    if page.next_page_url.is_empty() {
                        self.is_done = true;
                        self.pending_request = None;
                    } else {
                        // set up the next page, but don't poll it until the items run out
                        let next = (self.fetcher)(state, Some(page.next_page_url));
                        self.pending_request = Some(Box::pin(next));
                    }
                }
                Poll::Ready(Err(e)) => {
                    self.pending_request = None;
                    self.is_done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

//! Message pagination with total-count estimation.
//!
//! The indexer returns pages without a total count, so the total is inferred
//! from the shape of each page:
//!
//! - a short page at offset 0 means the page *is* everything;
//! - a short page elsewhere means the listing ends at `offset + len`;
//! - a full page says nothing about where the listing ends, so the
//!   namespace's cumulative PFB count stands in for the total.
//!
//! The last rule is an approximation. The PFB count covers every submission
//! to the namespace, while the listing may hold a different mix of message
//! types, so the estimate can over- or under-count. Treat
//! [`PaginationState::estimated_total`] as a best-effort hint for paging
//! controls, never as a ground-truth count.

use serde::Serialize;
use tracing::debug;

use nshealth_types::Message;

use crate::source::{NamespaceSource, SourceError};

/// Largest page the upstream serves.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default page size for the initial sample.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A requested page window, with the limit clamped into `[1, MAX_PAGE_SIZE]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(offset: u64, limit: u32) -> Self {
        Self {
            offset,
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// The first page of the given size.
    pub fn first(limit: u32) -> Self {
        Self::new(0, limit)
    }
}

/// Estimate the total number of messages from one returned page.
pub fn estimate_total(request: PageRequest, page_len: usize, pfb_count: u64) -> u64 {
    let page_len = page_len as u64;
    let short_page = page_len < request.limit as u64;

    if short_page && request.offset == 0 {
        page_len
    } else if short_page {
        request.offset + page_len
    } else if pfb_count > 0 {
        pfb_count
    } else {
        // Nothing better to go on than what has been seen.
        request.offset + page_len
    }
}

/// A fetched page plus the estimate derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessagePage {
    pub offset: u64,
    pub limit: u32,
    pub messages: Vec<Message>,
    /// Best-effort estimate; see the module docs.
    pub estimated_total: u64,
}

impl MessagePage {
    /// Zero-based index of this page.
    pub fn page_index(&self) -> u64 {
        if self.limit == 0 {
            0
        } else {
            self.offset / self.limit as u64
        }
    }

    /// Whether the estimate suggests more messages after this page.
    pub fn has_more(&self) -> bool {
        self.offset + (self.messages.len() as u64) < self.estimated_total
    }
}

/// Current page window and the running total estimate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaginationState {
    offset: u64,
    limit: u32,
    estimated_total: u64,
    messages: Vec<Message>,
}

impl PaginationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fetched page and re-derive the total estimate.
    pub fn apply(
        &mut self,
        request: PageRequest,
        messages: Vec<Message>,
        pfb_count: u64,
    ) -> MessagePage {
        self.estimated_total = estimate_total(request, messages.len(), pfb_count);
        self.offset = request.offset;
        self.limit = request.limit;
        self.messages = messages;

        debug!(
            offset = self.offset,
            limit = self.limit,
            returned = self.messages.len(),
            estimated_total = self.estimated_total,
            "applied message page"
        );

        self.page()
    }

    /// Clear back to an empty state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Snapshot of the current page.
    pub fn page(&self) -> MessagePage {
        MessagePage {
            offset: self.offset,
            limit: self.limit,
            messages: self.messages.clone(),
            estimated_total: self.estimated_total,
        }
    }

}

/// Fetch one page of messages from a source.
pub async fn fetch_page(
    source: &dyn NamespaceSource,
    namespace_id: &str,
    version: u32,
    request: PageRequest,
) -> Result<Vec<Message>, SourceError> {
    debug!(
        namespace_id,
        version,
        offset = request.offset,
        limit = request.limit,
        "fetching message page"
    );
    source
        .messages(namespace_id, version, request.offset, request.limit)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(n: usize) -> Vec<Message> {
        (0..n as u64).map(|i| Message::builder(i).build()).collect()
    }

    #[test]
    fn test_short_first_page_is_everything() {
        assert_eq!(estimate_total(PageRequest::new(0, 10), 4, 57), 4);
    }

    #[test]
    fn test_short_later_page_ends_listing() {
        assert_eq!(estimate_total(PageRequest::new(20, 10), 3, 57), 23);
    }

    #[test]
    fn test_full_page_falls_back_to_pfb_count() {
        assert_eq!(estimate_total(PageRequest::new(20, 10), 10, 57), 57);
        assert_eq!(estimate_total(PageRequest::new(0, 10), 10, 57), 57);
    }

    #[test]
    fn test_full_page_without_pfb_count_uses_seen() {
        assert_eq!(estimate_total(PageRequest::new(20, 10), 10, 0), 30);
    }

    #[test]
    fn test_empty_first_page() {
        assert_eq!(estimate_total(PageRequest::new(0, 10), 0, 57), 0);
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(PageRequest::new(0, 0).limit, 1);
        assert_eq!(PageRequest::new(0, 1000).limit, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::first(25), PageRequest::new(0, 25));
    }

    #[test]
    fn test_apply_updates_state() {
        let mut state = PaginationState::new();
        let page = state.apply(PageRequest::new(10, 10), messages(10), 57);

        assert_eq!(page.estimated_total, 57);
        assert_eq!(page.messages.len(), 10);
        assert_eq!(state.page().offset, 10);
        assert_eq!(page.page_index(), 1);
        assert!(page.has_more());

        let last = state.apply(PageRequest::new(50, 10), messages(7), 57);
        assert_eq!(state.page().estimated_total, 57);
        assert_eq!(last.page_index(), 5);
        assert!(!last.has_more());
    }

    #[test]
    fn test_estimate_is_rederived_each_page() {
        let mut state = PaginationState::new();
        state.apply(PageRequest::new(0, 10), messages(10), 57);
        assert_eq!(state.page().estimated_total, 57);

        state.apply(PageRequest::new(30, 10), messages(2), 57);
        assert_eq!(state.page().estimated_total, 32);
    }

    #[test]
    fn test_reset() {
        let mut state = PaginationState::new();
        state.apply(PageRequest::new(0, 10), messages(4), 0);
        state.reset();
        assert_eq!(state, PaginationState::default());
        assert_eq!(state.page().page_index(), 0);
    }
}

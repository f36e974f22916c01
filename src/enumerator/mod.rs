//! Paginated enumeration of provider resources.
//!
//! [`enumerate`] drives one enumeration: it requests pages strictly in
//! sequence, converts every item into an [`IdentityRecord`] and hands it to
//! the caller's handler before the next item is converted. The handler stops
//! the enumeration by returning [`ControlFlow::Break`]; no further page is
//! requested after that.
//!
//! Whether another page is requested is decided by the kind's
//! [`PaginationPolicy`]. The directory reports a batch count and is paged
//! until a short batch arrives; the platform reports only a total and is
//! paged until `index * size` reaches it.
//!
//! A failure while converting or enriching one record aborts the whole
//! enumeration with [`ConnectorError::Processing`]. Records delivered before
//! the failure stay delivered.

pub mod sources;


pub use sources::{AccountSource, GroupSource, SpaceSource, TenantSource, lookup_permitted};

use crate::error::{ConnectorError, ConnectorResult};
use crate::resource::{IdentityRecord, ResourceKind};
use log::{debug, trace};
use std::future::Future;
use std::ops::ControlFlow;

/// Termination convention of a paged list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationPolicy {
    /// Continue while the returned batch is a full page
    BatchSize,
    /// Continue while `index * page_size < total`
    Total,
}

impl PaginationPolicy {
    /// Whether the page after `index` must be requested.
    pub fn should_continue(
        self,
        batch_size: usize,
        total: Option<usize>,
        index: usize,
        page_size: usize,
    ) -> bool {
        match self {
            Self::BatchSize => batch_size == page_size,
            Self::Total => total.is_some_and(|total| index * page_size < total),
        }
    }
}

/// A 1-based page of `size` records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub index: usize,
    pub size: usize,
}

/// One page as returned by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    /// Number of records the provider reports for this page
    pub batch_size: usize,
    /// Total number of matching records, when the provider reports one
    pub total: Option<usize>,
}

impl<T> PageResult<T> {
    /// A page whose batch size is the number of items.
    pub fn new(items: Vec<T>, total: Option<usize>) -> Self {
        Self {
            batch_size: items.len(),
            items,
            total,
        }
    }
}

/// Supplies pages of one resource kind and converts their items.
pub trait PageSource: Send + Sync {
    type Item: Send;

    fn kind(&self) -> ResourceKind;

    fn fetch(
        &self,
        page: PageRequest,
    ) -> impl Future<Output = ConnectorResult<PageResult<Self::Item>>> + Send;

    /// Identifier used to report a failed conversion.
    fn identify(&self, item: &Self::Item) -> String;

    /// Convert one item into a record, enriching it where requested.
    fn convert(
        &self,
        item: Self::Item,
    ) -> impl Future<Output = ConnectorResult<IdentityRecord>> + Send;
}

/// Outcome of a completed enumeration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnumerationSummary {
    /// Page requests issued
    pub pages: usize,
    /// Records handed to the handler
    pub delivered: usize,
    /// Whether the handler stopped the enumeration
    pub stopped: bool,
}

/// Enumerate every record of `source`, page by page.
pub async fn enumerate<S, F>(
    source: &S,
    policy: PaginationPolicy,
    page_size: usize,
    mut handler: F,
) -> ConnectorResult<EnumerationSummary>
where
    S: PageSource,
    F: FnMut(IdentityRecord) -> ControlFlow<()>,
{
    let kind = source.kind();
    let size = page_size.max(1);
    let mut summary = EnumerationSummary::default();
    let mut index = 1;

    loop {
        let page = source.fetch(PageRequest { index, size }).await?;
        summary.pages += 1;
        debug!(
            "Page {} of {}: {} items, batch {}, total {:?}",
            index,
            kind,
            page.items.len(),
            page.batch_size,
            page.total
        );
        if index == 1 && page.items.is_empty() {
            break;
        }

        let PageResult {
            items,
            batch_size,
            total,
        } = page;
        for item in items {
            let identifier = source.identify(&item);
            let record = source
                .convert(item)
                .await
                .map_err(|e| ConnectorError::processing(kind, identifier, e))?;
            trace!("Delivering {} '{}': {:?}", kind, record.id, record.bag);
            summary.delivered += 1;
            if handler(record).is_break() {
                debug!(
                    "Enumeration of {} stopped by handler after {} records",
                    kind, summary.delivered
                );
                summary.stopped = true;
                return Ok(summary);
            }
        }

        if !policy.should_continue(batch_size, total, index, size) {
            break;
        }
        index += 1;
    }

    Ok(summary)
}

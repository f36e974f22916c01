//! Paged search with projection and native filters.

use super::core::ResourceDispatcher;
use crate::codec::Projection;
use crate::enumerator::{
    AccountSource, EnumerationSummary, GroupSource, SpaceSource, TenantSource, enumerate,
};
use crate::error::ConnectorResult;
use crate::filter::Filter;
use crate::resource::{IdentityRecord, ResourceKind};
use crate::transport::Transport;
use log::debug;
use std::ops::ControlFlow;

/// Options of one search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Attributes to return, `None` for the provider defaults. Embedded object
    /// class names (`__GROUP__`, `__TENANT__`, `__SPACE__`) request the
    /// account enrichments.
    pub attributes: Option<Vec<String>>,
    pub filter: Option<Filter>,
    /// Overrides the configured page size
    pub page_size: Option<usize>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    pub fn filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }
}

impl<T: Transport> ResourceDispatcher<T> {
    /// Deliver every matching record of `kind` to `handler`, page by page.
    ///
    /// Filters without a native form are dropped and the provider returns
    /// everything. The handler stops the search by returning
    /// [`ControlFlow::Break`].
    pub async fn search<F>(
        &self,
        kind: ResourceKind,
        options: &SearchOptions,
        handler: F,
    ) -> ConnectorResult<EnumerationSummary>
    where
        F: FnMut(IdentityRecord) -> ControlFlow<()>,
    {
        let projection = Projection::new(kind, options.attributes.as_deref());
        let filter = options
            .filter
            .as_ref()
            .and_then(|filter| self.native_filter(kind, filter));
        let page_size = options.page_size.unwrap_or(self.config.page_size);
        let policy = kind.bundle().policy;
        debug!(
            "Searching {} with filter {:?}, page size {}",
            kind, filter, page_size
        );

        let transport = &self.transport;
        let projection = &projection;
        match kind {
            ResourceKind::Account => {
                let source = AccountSource {
                    transport,
                    filter,
                    projection,
                    enrichment: &self.config.enrichment,
                };
                enumerate(&source, policy, page_size, handler).await
            }
            ResourceKind::Group => {
                let source = GroupSource {
                    transport,
                    filter,
                    projection,
                };
                enumerate(&source, policy, page_size, handler).await
            }
            ResourceKind::Tenant => {
                let source = TenantSource {
                    transport,
                    filter,
                    projection,
                };
                enumerate(&source, policy, page_size, handler).await
            }
            ResourceKind::Space => {
                let source = SpaceSource {
                    transport,
                    filter,
                    projection,
                };
                enumerate(&source, policy, page_size, handler).await
            }
        }
    }
}

//! Forward-only pagination over paged node queries.
//!
//! A [`PagedCursor`] walks one query: [`PagedCursor::fetch`] loads a page,
//! [`PagedCursor::next_page`] advances, and [`PagedCursor::for_each`] visits every
//! row in order, fetching pages on demand.
//!
//! ```ignore
//! let mut cursor = PagedCursor::module_events(source, "0x2", "coin", None);
//! let visited = cursor
//!     .for_each(|row| async move {
//!         if let PageRow::Event(event) = row {
//!             println!("{}", event.type_name());
//!         }
//!         Ok(())
//!     }, Some(100))
//!     .await?;
//! ```
//!
//! Pages are never fetched concurrently: every operation takes `&mut self`.

use std::future::Future;
use std::sync::Arc;

use futures::Stream;
use serde_json::Value;
use tracing::{debug, warn};

use sui_mirror_transport::RemoteDataSource;
use sui_mirror_types::{
    DynamicFieldInfo, ObjectData, ObjectPayload, ObjectResponse, QueryMethod, QueryParams,
    SortOrder, MAX_PAGE_SIZE,
};

use crate::cache::ObjectCache;
use crate::error::{MirrorError, Result};
use crate::event::ChainEvent;
use crate::tracked::ObjectHandle;
use crate::transaction::TransactionOutcome;

/// Where a cursor is in its walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Nothing fetched yet.
    Fresh,
    /// The last page reported more rows and a usable cursor.
    HasMore,
    /// Terminal.
    Exhausted,
}

/// One result row, converted by query method.
#[derive(Debug, Clone)]
pub enum PageRow {
    Event(ChainEvent),
    /// Owned object registered in the attached cache.
    Object(ObjectHandle),
    /// Owned object when no cache is attached.
    ObjectData(ObjectData),
    Transaction(TransactionOutcome),
    DynamicField(DynamicFieldInfo),
    /// Unknown row shape, or a row that failed to parse.
    Raw(Value),
}

pub struct PagedCursor {
    source: Arc<dyn RemoteDataSource>,
    method: QueryMethod,
    params: QueryParams,
    order: SortOrder,
    cache: Option<Arc<ObjectCache>>,
    state: CursorState,
    next_cursor: Option<Value>,
    data: Vec<PageRow>,
    pages_fetched: usize,
}

impl std::fmt::Debug for PagedCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedCursor")
            .field("method", &self.method)
            .field("order", &self.order)
            .field("state", &self.state)
            .field("next_cursor", &self.next_cursor)
            .field("rows", &self.data.len())
            .finish()
    }
}

impl PagedCursor {
    pub fn new(source: Arc<dyn RemoteDataSource>, method: QueryMethod, params: QueryParams) -> Self {
        Self {
            source,
            method,
            params,
            order: SortOrder::default(),
            cache: None,
            state: CursorState::Fresh,
            next_cursor: None,
            data: Vec::new(),
            pages_fetched: 0,
        }
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Rows per page, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.params = self.params.with_limit(limit.clamp(1, MAX_PAGE_SIZE));
        self
    }

    /// Register owned-object rows in `cache` and yield handles.
    pub fn with_cache(mut self, cache: Arc<ObjectCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn method(&self) -> &QueryMethod {
        &self.method
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn has_next_page(&self) -> bool {
        self.state == CursorState::HasMore
    }

    pub fn next_cursor(&self) -> Option<&Value> {
        self.next_cursor.as_ref()
    }

    /// Rows of the most recently fetched page.
    pub fn data(&self) -> &[PageRow] {
        &self.data
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Fetch the page starting at `cursor` and make it current.
    ///
    /// On error nothing changes. A page that claims more rows but hands back no
    /// cursor, or the cursor it was asked for, ends the walk. Once exhausted the
    /// cursor stays exhausted even if this is called again.
    pub async fn fetch(&mut self, cursor: Option<Value>) -> Result<&[PageRow]> {
        let page = self
            .source
            .query_page(&self.method, &self.params, cursor.clone(), self.order)
            .await
            .map_err(|err| MirrorError::remote(self.method.rpc_name(), err))?;

        let next_cursor = page.next_cursor.filter(|c| !c.is_null());
        let advanced = match (&next_cursor, &cursor) {
            (None, _) => false,
            (Some(next), Some(previous)) => next != previous,
            (Some(_), None) => true,
        };
        if page.has_next_page && !advanced {
            warn!(
                method = %self.method,
                cursor = ?next_cursor,
                "page reports more rows without advancing the cursor, stopping"
            );
        }
        let has_more =
            page.has_next_page && advanced && self.state != CursorState::Exhausted;

        let rows: Vec<PageRow> = page.data.into_iter().map(|row| self.convert(row)).collect();
        debug!(
            method = %self.method,
            rows = rows.len(),
            has_next_page = has_more,
            "fetched page"
        );

        self.pages_fetched += 1;
        self.data = rows;
        if has_more {
            self.state = CursorState::HasMore;
            self.next_cursor = next_cursor;
        } else {
            self.state = CursorState::Exhausted;
            self.next_cursor = None;
        }
        Ok(&self.data)
    }

    /// Advance to the next page.
    ///
    /// A fresh cursor loads its first page. `None` (without a remote call) once the
    /// walk is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<&[PageRow]>> {
        match self.state {
            CursorState::Exhausted => Ok(None),
            CursorState::Fresh => self.fetch(None).await.map(Some),
            CursorState::HasMore => {
                let cursor = self.next_cursor.clone();
                self.fetch(cursor).await.map(Some)
            }
        }
    }

    /// Visit rows in order, starting with the current page, fetching further pages
    /// as needed. Returns the number of rows visited.
    ///
    /// Stops after `max_count` rows without fetching a page it does not need. The
    /// first callback error stops the walk.
    pub async fn for_each<F, Fut>(
        &mut self,
        mut callback: F,
        max_count: Option<usize>,
    ) -> Result<usize>
    where
        F: FnMut(PageRow) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let max_count = max_count.unwrap_or(usize::MAX);
        let mut visited = 0usize;
        if max_count == 0 {
            return Ok(0);
        }
        if self.state == CursorState::Fresh {
            self.fetch(None).await?;
        }

        loop {
            for index in 0..self.data.len() {
                let row = self.data[index].clone();
                callback(row).await.map_err(MirrorError::Callback)?;
                visited += 1;
                if visited >= max_count {
                    return Ok(visited);
                }
            }
            if self.next_page().await?.is_none() {
                return Ok(visited);
            }
        }
    }

    /// Collect up to `max_count` rows.
    pub async fn collect(&mut self, max_count: Option<usize>) -> Result<Vec<PageRow>> {
        let mut rows = Vec::new();
        self.for_each(
            |row| {
                rows.push(row);
                async { Ok(()) }
            },
            max_count,
        )
        .await?;
        Ok(rows)
    }

    /// Turn the walk into a stream of rows, ending after `max_count` rows.
    pub fn into_stream(
        self,
        max_count: Option<usize>,
    ) -> impl Stream<Item = Result<PageRow>> {
        let max_count = max_count.unwrap_or(usize::MAX);
        futures::stream::try_unfold(
            (self, 0usize, 0usize),
            move |(mut cursor, mut index, visited)| async move {
                if visited >= max_count {
                    return Ok::<_, MirrorError>(None);
                }
                if cursor.state == CursorState::Fresh {
                    cursor.fetch(None).await?;
                }
                loop {
                    if let Some(row) = cursor.data.get(index).cloned() {
                        return Ok(Some((row, (cursor, index + 1, visited + 1))));
                    }
                    if cursor.next_page().await?.is_none() {
                        return Ok(None);
                    }
                    index = 0;
                }
            },
        )
    }

    fn convert(&self, row: Value) -> PageRow {
        let converted = match &self.method {
            QueryMethod::QueryEvents => ChainEvent::from_value(row.clone()).map(PageRow::Event),
            QueryMethod::QueryTransactionBlocks => {
                TransactionOutcome::from_value(row.clone()).map(PageRow::Transaction)
            }
            QueryMethod::GetDynamicFields => {
                serde_json::from_value(row.clone()).map(PageRow::DynamicField)
            }
            QueryMethod::GetOwnedObjects => serde_json::from_value::<ObjectResponse>(row.clone())
                .map(|response| match response.data {
                    Some(data) => self.owned_object_row(data),
                    None => PageRow::Raw(row.clone()),
                }),
            QueryMethod::GetCoins | QueryMethod::Custom(_) => return PageRow::Raw(row),
        };
        converted.unwrap_or_else(|err| {
            warn!(method = %self.method, error = %err, "unrecognized row shape");
            PageRow::Raw(row)
        })
    }

    fn owned_object_row(&self, data: ObjectData) -> PageRow {
        let Some(cache) = &self.cache else {
            return PageRow::ObjectData(data);
        };
        match cache.ingest(&ObjectPayload::Data(data.clone())) {
            Ok(handle) => PageRow::Object(handle),
            Err(err) => {
                warn!(id = %data.object_id, error = %err, "could not cache owned object");
                PageRow::ObjectData(data)
            }
        }
    }
}

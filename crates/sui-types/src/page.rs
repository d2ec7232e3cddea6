//! Paged query types shared by the transport and the cursor.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum rows per page accepted by the node.
pub const MAX_PAGE_SIZE: usize = 50;

/// Row ordering for paged queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    /// Newest first.
    #[default]
    Descending,
}

impl SortOrder {
    pub fn is_descending(self) -> bool {
        matches!(self, SortOrder::Descending)
    }
}

/// One page of a paged query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default)]
    pub data: Vec<T>,
    #[serde(default)]
    pub has_next_page: bool,
    /// Opaque; string for most methods, an event id object for `suix_queryEvents`.
    #[serde(default)]
    pub next_cursor: Option<Value>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            has_next_page: false,
            next_cursor: None,
        }
    }
}

/// Which remote query a cursor walks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryMethod {
    QueryEvents,
    QueryTransactionBlocks,
    GetDynamicFields,
    GetOwnedObjects,
    GetCoins,
    /// Any other paged JSON-RPC method, called by name.
    Custom(String),
}

impl QueryMethod {
    /// JSON-RPC method name.
    pub fn rpc_name(&self) -> &str {
        match self {
            QueryMethod::QueryEvents => "suix_queryEvents",
            QueryMethod::QueryTransactionBlocks => "suix_queryTransactionBlocks",
            QueryMethod::GetDynamicFields => "suix_getDynamicFields",
            QueryMethod::GetOwnedObjects => "suix_getOwnedObjects",
            QueryMethod::GetCoins => "suix_getCoins",
            QueryMethod::Custom(name) => name,
        }
    }

    /// Whether the node honors a sort order for this method.
    pub fn supports_order(&self) -> bool {
        matches!(
            self,
            QueryMethod::QueryEvents | QueryMethod::QueryTransactionBlocks
        )
    }
}

impl fmt::Display for QueryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rpc_name())
    }
}

/// Parameters of a paged query, minus cursor and order.
///
/// `subject` is the positional id a method is scoped to (parent object for dynamic
/// fields, owner for owned objects and coins).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryParams {
    pub subject: Option<String>,
    pub filter: Option<Value>,
    pub options: Option<Value>,
    pub limit: Option<usize>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_subject(subject: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }

    /// Page size, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit.clamp(1, MAX_PAGE_SIZE));
        self
    }

    pub fn page_size(&self) -> usize {
        self.limit.unwrap_or(MAX_PAGE_SIZE)
    }
}

/// Event query filter in the node's JSON form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EventFilter {
    MoveModule { package: String, module: String },
    MoveEventType(String),
    Sender(String),
    Transaction(String),
    Package(String),
    All(Vec<EventFilter>),
}

/// Transaction query filter in the node's JSON form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TransactionFilter {
    InputObject(String),
    ChangedObject(String),
    FromAddress(String),
    ToAddress(String),
    MoveFunction {
        package: String,
        module: Option<String>,
        function: Option<String>,
    },
}

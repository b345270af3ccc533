//! Output views for the various functions within Certward.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

mod certificate;
pub use certificate::*;

mod config;
pub use config::*;

mod role;
pub use role::*;

/// A list of records returned by one of the list endpoints.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PaginatedList<T> {
    pub items: Vec<T>,

    /// The next page token, if any. The list endpoints currently return every
    /// record in a single page, so this is always empty.
    pub next_token: Option<String>,

    /// The maximum number of results to return.
    pub limit: Option<u64>,
}

impl<T> PaginatedList<T> {
    /// Wrap a complete, unpaginated set of records.
    pub fn complete(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
            limit: None,
        }
    }
}

/// An error response for an API endpoint. This is used to return errors to the
/// client in a consistent format.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    /// An optional error code that can be used to identify the type of error
    /// that occurred.
    pub code: Option<String>,

    /// A human-readable message describing the error that occurred.
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

//
//  bitbucket-provider
//  api/common/pagination.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Pagination Types for Bitbucket API Responses
//!
//! Bitbucket Cloud list endpoints return one page of values at a time,
//! wrapped in an envelope carrying the page number and an optional pointer
//! to the next page. The absence of the `next` pointer is the only
//! termination signal the API provides; the `size` field may be omitted on
//! large collections and must not be relied upon.
//!
//! Collections that the reconcilers consume through this type (default
//! reviewers, deployment variables) are walked page by page until `next`
//! disappears, accumulating every value. A read must never assume the
//! collection fits in one page.
//!
//! # Example
//!
//! ```rust
//! use bitbucket_provider::api::PaginatedResponse;
//! use serde::Deserialize;
//!
//! #[derive(Clone, Deserialize)]
//! struct Reviewer {
//!     uuid: String,
//! }
//!
//! let json = r#"{
//!     "values": [{"uuid": "{r1}"}],
//!     "page": 1,
//!     "pagelen": 10,
//!     "size": 25,
//!     "next": "https://api.bitbucket.org/2.0/repositories/t/r/default-reviewers?page=2"
//! }"#;
//!
//! let page: PaginatedResponse<Reviewer> = serde_json::from_str(json).unwrap();
//! assert!(page.has_next());
//! assert_eq!(page.values.len(), 1);
//! ```

use serde::{Deserialize, Serialize};

/// One page of a paginated Bitbucket Cloud collection.
///
/// # Type Parameters
///
/// - `T` - The type of items contained in the `values` array
///
/// # Fields
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | `values` | `Vec<T>` | Items in the current page |
/// | `page` | `Option<u32>` | Current page number (1-indexed) |
/// | `pagelen` | `Option<u32>` | Items per page |
/// | `size` | `Option<u32>` | Total item count, when the API provides it |
/// | `next` | `Option<String>` | URL of the next page; `None` on the last page |
///
/// # Notes
///
/// - Page numbers are 1-indexed; the next page of page `n` is `n + 1`.
/// - Every field except `values` may be absent and defaults accordingly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>", serialize = "T: Serialize"))]
pub struct PaginatedResponse<T> {
    /// Items in the current page. May be empty.
    #[serde(default)]
    pub values: Vec<T>,

    /// Current page number (1-indexed).
    #[serde(default)]
    pub page: Option<u32>,

    /// Maximum number of items per page.
    #[serde(default)]
    pub pagelen: Option<u32>,

    /// Total number of items across all pages, when present.
    #[serde(default)]
    pub size: Option<u32>,

    /// URL to fetch the next page. `None` means this is the last page.
    #[serde(default)]
    pub next: Option<String>,
}

impl<T> PaginatedResponse<T> {
    /// Checks whether more pages remain.
    ///
    /// The presence of the `next` pointer is the sole continuation signal;
    /// `size` and `pagelen` are informational only.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Returns the URL of the next page, when one remains.
    pub fn next_url(&self) -> Option<&str> {
        self.next.as_deref()
    }
}

//
//  bitbucket-provider
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Common API Types
//!
//! This module provides the shared types used across the HTTP client core and
//! every resource reconciler: the unified error type, the Bitbucket error
//! envelope, and the paginated collection wrapper.
//!
//! # Overview
//!
//! - [`ApiError`] - Unified error type for all API operations
//! - [`ErrorEnvelope`] - The `{"error":{"message":...},"type":...}` body shape
//!   Bitbucket attaches to non-2xx responses
//! - [`PaginatedResponse`] - Cloud pagination format (re-exported from the
//!   [`pagination`] submodule)
//!
//! # Example
//!
//! ```rust
//! use bitbucket_provider::api::ApiError;
//!
//! fn describe<T>(result: Result<T, ApiError>) {
//!     match result {
//!         Ok(_) => println!("success"),
//!         Err(ApiError::Api { status: 404, .. }) => println!("gone"),
//!         Err(e) => println!("error: {}", e),
//!     }
//! }
//! ```

use serde::Deserialize;
use thiserror::Error;

mod pagination;

pub use pagination::PaginatedResponse;

/// Unified error type for all Bitbucket API operations.
///
/// Three failure classes are distinguished, mirroring how the reconcilers
/// react to them:
///
/// | Variant | Class | Reconciler reaction |
/// |---------|-------|---------------------|
/// | `Api` | non-2xx response | 404 on read clears the identifier; anything else propagates |
/// | `Network` | transport failure (DNS, connect, timeout) | always propagates, never retried |
/// | `Json` | payload (de)serialization failure | always propagates |
/// | `Validation` | attribute rejected before any request was sent | always propagates |
/// | `InvalidId` | malformed composite identifier | always propagates |
/// | `Unexpected` | a 2xx response outside the contract (e.g. a member removal that did not return 204) | always propagates |
///
/// # Notes
///
/// - There is no retry or backoff anywhere in this crate; every error is
///   surfaced to the caller on first occurrence.
/// - `Api` carries the request path so operators can tell which of the
///   several calls inside one reconcile step failed.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The API answered with a status outside `[200, 400)`.
    ///
    /// `message` is taken from the error envelope when the body decodes,
    /// otherwise it is the raw response body verbatim.
    #[error("API error: {status} {endpoint} {message}")]
    Api {
        /// The HTTP status code of the response.
        status: u16,
        /// The request path relative to the API origin.
        endpoint: String,
        /// Decoded envelope message, or the raw body as a fallback.
        message: String,
    },

    /// A transport-level failure (DNS, connection, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A request body failed to serialize, or a 2xx response body failed
    /// to decode.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An attribute value was rejected before any request was sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// A composite identifier did not match its expected shape.
    #[error("invalid resource identifier: {0}")]
    InvalidId(String),

    /// The API answered inside the success window but outside the
    /// documented contract for the operation.
    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// The JSON body Bitbucket attaches to error responses.
///
/// ```json
/// {"type": "error", "error": {"message": "Repository not found"}}
/// ```
///
/// Both levels are optional so that partially conforming bodies still
/// decode; absent messages fall back to the raw body at the call site.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorEnvelope {
    /// The nested error object carrying the human-readable message.
    #[serde(default)]
    pub error: Option<ErrorBody>,

    /// The envelope discriminator, `"error"` on current API versions.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// The inner object of an [`ErrorEnvelope`].
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    /// Human-readable description of the failure.
    #[serde(default)]
    pub message: Option<String>,
}

/// Extracts a display message from an error response body.
///
/// Attempts to decode the body as an [`ErrorEnvelope`]; when decoding fails
/// or the envelope carries no message, the raw body is returned verbatim.
pub fn decode_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|error| error.message)
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_message_envelope() {
        let body = r#"{"type":"error","error":{"message":"Repository not found"}}"#;
        assert_eq!(decode_error_message(body), "Repository not found");
    }

    #[test]
    fn test_decode_error_message_raw_fallback() {
        assert_eq!(decode_error_message("Bad credentials"), "Bad credentials");
        // Valid JSON without the envelope shape also falls back to the raw body.
        assert_eq!(decode_error_message(r#"{"detail":"nope"}"#), r#"{"detail":"nope"}"#);
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Api {
            status: 403,
            endpoint: "2.0/repositories/team/repo".to_string(),
            message: "Forbidden".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 403 2.0/repositories/team/repo Forbidden");
    }
}

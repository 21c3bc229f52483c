//
//  bitbucket-provider
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! HTTP plumbing for the Bitbucket REST APIs.
//!
//! ## Architecture
//!
//! - [`client`]: the authenticated HTTP client core shared by all
//!   reconcilers (request construction, Basic auth, error decoding)
//! - [`common`]: shared types (the error taxonomy and the paginated
//!   collection envelope)
//!
//! Both the 2.0 and the legacy 1.0 API surfaces are reached through the
//! same client; the API version is part of the endpoint path
//! (`2.0/repositories/...`, `1.0/groups/...`).

/// Core HTTP client wrapper for the Bitbucket APIs.
pub mod client;

/// Common types shared by the client and the reconcilers.
pub mod common;

/// Re-export of the main client type.
pub use client::{decode_json, BitbucketClient, BITBUCKET_ENDPOINT};

/// Re-export of common API types.
pub use common::{ApiError, PaginatedResponse};

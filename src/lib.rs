//
//  bitbucket-provider
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Bitbucket Provider Library
//!
//! The reconciliation core of a declarative provider for Bitbucket Cloud:
//! create/read/update/delete/exists implementations for repositories,
//! webhooks, deploy keys, groups and memberships, projects, branch
//! restrictions, default reviewers, deployment environments, pipeline and
//! deployment variables, and user SSH keys — all driven against the
//! Bitbucket REST APIs (2.0 and legacy 1.0) over HTTP Basic auth with an
//! app-password.
//!
//! ## Overview
//!
//! The crate deliberately excludes the plugin RPC surface. A caller (a
//! plugin shim, a test harness, an automation tool) owns the lifecycle: it
//! builds one [`api::BitbucketClient`] from a [`provider::ProviderConfig`],
//! holds per-resource [`state::ResourceState`] values, and drives the
//! registered [`resources::Reconciler`] implementations through the
//! [`provider::Provider`] registry.
//!
//! ## Module Structure
//!
//! - [`api`]: the HTTP client core and shared API types
//! - [`state`]: the declarative attribute set reconcilers read and mutate
//! - [`resources`]: one reconciler per managed resource kind
//! - [`datasources`]: read-only lookups (repository, legacy user profile)
//! - [`provider`]: credentials, client construction, and the registry
//! - [`util`]: key validation, set reconciliation, escaping helpers
//!
//! ## Example
//!
//! ```rust,no_run
//! use bitbucket_provider::provider::{Provider, ProviderConfig};
//! use bitbucket_provider::state::ResourceState;
//!
//! let client = ProviderConfig::from_env()?.configure()?;
//! let provider = Provider::new();
//!
//! let mut state = ResourceState::new();
//! state.set_string("owner", "my-team");
//! state.set_string("name", "my-repo");
//! state.set_bool("is_private", true);
//!
//! provider
//!     .resource("bitbucket_repository")
//!     .expect("registered resource")
//!     .create(&client, &mut state)?;
//!
//! println!("created {}", state.id().unwrap_or("?"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Everything that touches the network returns [`api::ApiError`]. A 404 on
//! a resource read is not an error — it clears the resource identifier,
//! which is the `present -> absent` transition. All other non-2xx
//! statuses, transport failures, and decode failures propagate. Nothing
//! retries, and nothing panics on a failed request.

/// HTTP client core and shared API types.
pub mod api;

/// Read-only data source lookups.
pub mod datasources;

/// Provider configuration and the name → implementation registry.
pub mod provider;

/// Resource reconcilers, one module per managed resource kind.
pub mod resources;

/// The declarative attribute set consumed and mutated by reconcilers.
pub mod state;

/// Validation and reconciliation helpers.
pub mod util;

/// Re-export of the HTTP client.
pub use api::BitbucketClient;

/// Re-export of the unified error type.
pub use api::ApiError;

/// Re-export of the registry and configuration types.
pub use provider::{Provider, ProviderConfig};

/// Re-export of the reconciler contract.
pub use resources::Reconciler;

/// Re-export of the declarative state types.
pub use state::{Attribute, ResourceState};

/// Crate version, derived from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

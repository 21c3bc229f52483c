//
//  bitbucket-provider
//  resources/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Resource Reconcilers
//!
//! One module per managed resource kind. Each implements [`Reconciler`]:
//! the create/read/update/delete/exists function set that translates
//! between the declarative attribute set and the resource's REST
//! endpoints.
//!
//! ## Lifecycle
//!
//! ```text
//! absent -> (create) -> present -> (update)* -> present -> (delete) -> absent
//! ```
//!
//! A `present` resource found missing on read transitions straight back to
//! `absent` by clearing its identifier; delete is not invoked for it.
//!
//! ## Read policy
//!
//! Uniform across every resource: HTTP 404 on a read clears the identifier
//! and succeeds; any other non-2xx status is an error. Identifiers, once
//! assigned, are immutable and key all subsequent calls.

use serde::de::DeserializeOwned;

use crate::api::common::PaginatedResponse;
use crate::api::{decode_json, ApiError, BitbucketClient};
use crate::state::ResourceState;

pub mod branch_restriction;
pub mod default_reviewers;
pub mod deploy_key;
pub mod deployment;
pub mod deployment_variable;
pub mod group;
pub mod group_member;
pub mod hook;
pub mod project;
pub mod repository;
pub mod repository_variable;
pub mod ssh_key;

pub use branch_restriction::BranchRestrictionResource;
pub use default_reviewers::DefaultReviewersResource;
pub use deploy_key::DeployKeyResource;
pub use deployment::DeploymentResource;
pub use deployment_variable::DeploymentVariableResource;
pub use group::GroupResource;
pub use group_member::GroupMemberResource;
pub use hook::HookResource;
pub use project::ProjectResource;
pub use repository::RepositoryResource;
pub use repository_variable::RepositoryVariableResource;
pub use ssh_key::SshKeyResource;

/// The create/read/update/delete/exists contract for one resource kind.
///
/// Every method receives the shared [`BitbucketClient`] and the resource's
/// [`ResourceState`]; results are written back through the state. Calls on
/// one resource instance are strictly sequential — the trait assumes no
/// concurrent invocation against the same state.
pub trait Reconciler {
    /// Creates the resource from its declared attributes, assigns the
    /// identifier, and refreshes computed attributes via [`read`].
    ///
    /// [`read`]: Reconciler::read
    fn create(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError>;

    /// Fetches the resource by identifier and copies API fields back into
    /// the attribute set. A 404 clears the identifier and succeeds.
    fn read(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError>;

    /// Pushes the rebuilt payload to the item endpoint and refreshes
    /// attributes via [`read`]. Resources whose identifier cannot change
    /// restrict the mutable field set.
    ///
    /// [`read`]: Reconciler::read
    fn update(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError>;

    /// Deletes the resource by identifier.
    fn delete(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError>;

    /// Checks whether the resource is present on the server.
    ///
    /// The default implementation reports presence from the identifier
    /// slot alone; resources with a cheap item endpoint override it with a
    /// real probe. Transport failures are errors, never panics.
    fn exists(&self, client: &BitbucketClient, state: &ResourceState) -> Result<bool, ApiError> {
        let _ = client;
        Ok(state.id().is_some())
    }
}

/// GETs an item endpoint, treating 404 as absence.
///
/// # Returns
///
/// - `Ok(Some(entity))` on a decoded 2xx response
/// - `Ok(None)` on 404
/// - `Err` for every other failure
pub(crate) fn fetch_optional<T: DeserializeOwned>(
    client: &BitbucketClient,
    endpoint: &str,
) -> Result<Option<T>, ApiError> {
    match client.get(endpoint) {
        Ok(response) => Ok(Some(decode_json(response)?)),
        Err(ApiError::Api { status: 404, .. }) => Ok(None),
        Err(err) => Err(err),
    }
}

/// GETs an item endpoint to answer an exists check.
///
/// 2xx means present, 404 means absent, anything else is an error.
pub(crate) fn probe(client: &BitbucketClient, endpoint: &str) -> Result<bool, ApiError> {
    match client.get(endpoint) {
        Ok(_) => Ok(true),
        Err(ApiError::Api { status: 404, .. }) => Ok(false),
        Err(err) => Err(err),
    }
}

/// Walks a paginated collection, accumulating every value.
///
/// Pages are requested with an explicit incrementing `page` query
/// parameter, starting at 1. The loop terminates only when a page carries
/// no `next` pointer; every element the server holds appears exactly once
/// in the result, in server page order.
pub(crate) fn collect_pages<T: DeserializeOwned>(
    client: &BitbucketClient,
    resource_path: &str,
) -> Result<Vec<T>, ApiError> {
    let mut collected = Vec::new();
    let mut page_number: u32 = 1;

    loop {
        let response = client.get(&format!("{resource_path}?page={page_number}"))?;
        let page: PaginatedResponse<T> = decode_json(response)?;

        let has_next = page.has_next();
        page_number = page.page.unwrap_or(page_number) + 1;
        collected.extend(page.values);

        if !has_next {
            break;
        }
    }

    Ok(collected)
}

/// Requires an exact status from a membership-style call.
///
/// The 1.0 membership endpoints signal success with one specific code
/// (200 for an add, 204 for a removal); anything else inside the success
/// window still means the member operation did not take effect.
pub(crate) fn expect_status(
    response: &reqwest::blocking::Response,
    expected: u16,
    detail: impl FnOnce() -> String,
) -> Result<(), ApiError> {
    if response.status().as_u16() == expected {
        Ok(())
    } else {
        Err(ApiError::Unexpected(format!(
            "{} (got status {}, wanted {})",
            detail(),
            response.status().as_u16(),
            expected
        )))
    }
}

/// Splits a two-part composite identifier (`left/right`).
pub(crate) fn split_composite_id<'a>(
    id: &'a str,
    expected_shape: &str,
) -> Result<(&'a str, &'a str), ApiError> {
    let parts: Vec<&str> = id.split('/').collect();
    if parts.len() == 2 {
        Ok((parts[0], parts[1]))
    } else {
        Err(ApiError::InvalidId(format!(
            "'{id}' should match `{expected_shape}`"
        )))
    }
}

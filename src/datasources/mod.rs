//
//  bitbucket-provider
//  datasources/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Data Sources
//!
//! Read-only lookups registered beside the resources. A data source never
//! creates or mutates anything server-side; it resolves declared lookup
//! attributes into computed ones and an identifier. Unlike a resource
//! read, a missing data source is an error — there is no identifier to
//! clear because the caller never owned the object.

use crate::api::{ApiError, BitbucketClient};
use crate::state::ResourceState;

pub mod repository;
pub mod user;

pub use repository::RepositoryDataSource;
pub use user::UserDataSource;

/// The single-operation contract for a read-only lookup.
pub trait DataSource {
    /// Resolves the lookup, writing computed attributes and the
    /// identifier into the state.
    fn read(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError>;
}

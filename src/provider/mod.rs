//
//  bitbucket-provider
//  provider/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Provider Configuration and Registry
//!
//! The thin wiring layer: credentials come in (explicitly or from the
//! environment), one shared [`BitbucketClient`] goes out, and the registry
//! maps resource and data-source names to their implementations.
//!
//! There is no ambient global anywhere — the configured client is handed
//! explicitly to every reconciler call, and the [`Provider`] itself is a
//! plain value the caller owns.
//!
//! # Example
//!
//! ```rust,no_run
//! use bitbucket_provider::provider::{Provider, ProviderConfig};
//!
//! let config = ProviderConfig::from_env()?;
//! let client = config.configure()?;
//!
//! let provider = Provider::new();
//! let repository = provider
//!     .resource("bitbucket_repository")
//!     .expect("registered resource");
//! # let _ = (client, repository);
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::collections::BTreeMap;
use std::env;

use anyhow::Context;

use crate::api::BitbucketClient;
use crate::datasources::{DataSource, RepositoryDataSource, UserDataSource};
use crate::resources::{
    BranchRestrictionResource, DefaultReviewersResource, DeployKeyResource, DeploymentResource,
    DeploymentVariableResource, GroupMemberResource, GroupResource, HookResource, ProjectResource,
    Reconciler, RepositoryResource, RepositoryVariableResource, SshKeyResource,
};

/// Environment variable supplying the username.
pub const USERNAME_VAR: &str = "BITBUCKET_USERNAME";

/// Environment variable supplying the app-password.
pub const PASSWORD_VAR: &str = "BITBUCKET_PASSWORD";

/// Credentials for the provider, resolved at configure time.
///
/// Immutable once constructed; the same configuration backs every
/// reconciler for the provider's lifetime.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Bitbucket account username.
    pub username: String,
    /// App-password used for Basic authentication.
    pub password: String,
}

impl ProviderConfig {
    /// Builds a configuration from explicit credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Builds a configuration from `BITBUCKET_USERNAME` and
    /// `BITBUCKET_PASSWORD`.
    ///
    /// # Errors
    ///
    /// Returns an error naming the missing variable when either is unset.
    pub fn from_env() -> anyhow::Result<Self> {
        let username =
            env::var(USERNAME_VAR).with_context(|| format!("{USERNAME_VAR} is not set"))?;
        let password =
            env::var(PASSWORD_VAR).with_context(|| format!("{PASSWORD_VAR} is not set"))?;
        Ok(Self { username, password })
    }

    /// Constructs the shared client all reconcilers will use.
    pub fn configure(&self) -> anyhow::Result<BitbucketClient> {
        BitbucketClient::new(self.username.clone(), self.password.clone())
    }
}

/// The name → implementation registry for resources and data sources.
///
/// The surrounding plugin machinery looks implementations up by their
/// declared type name and drives them through the [`Reconciler`] and
/// [`DataSource`] traits.
pub struct Provider {
    resources: BTreeMap<&'static str, Box<dyn Reconciler>>,
    data_sources: BTreeMap<&'static str, Box<dyn DataSource>>,
}

impl Provider {
    /// Builds the registry with every supported resource and data source.
    pub fn new() -> Self {
        let mut resources: BTreeMap<&'static str, Box<dyn Reconciler>> = BTreeMap::new();
        resources.insert("bitbucket_repository", Box::new(RepositoryResource));
        resources.insert("bitbucket_hook", Box::new(HookResource));
        resources.insert("bitbucket_deploy_key", Box::new(DeployKeyResource));
        resources.insert("bitbucket_group", Box::new(GroupResource));
        resources.insert("bitbucket_group_member", Box::new(GroupMemberResource));
        resources.insert("bitbucket_project", Box::new(ProjectResource));
        resources.insert(
            "bitbucket_branch_restriction",
            Box::new(BranchRestrictionResource),
        );
        resources.insert(
            "bitbucket_default_reviewers",
            Box::new(DefaultReviewersResource),
        );
        resources.insert("bitbucket_deployment", Box::new(DeploymentResource));
        resources.insert(
            "bitbucket_deployment_variable",
            Box::new(DeploymentVariableResource),
        );
        resources.insert(
            "bitbucket_repository_variable",
            Box::new(RepositoryVariableResource),
        );
        resources.insert("bitbucket_ssh_key", Box::new(SshKeyResource));

        let mut data_sources: BTreeMap<&'static str, Box<dyn DataSource>> = BTreeMap::new();
        data_sources.insert("bitbucket_repository", Box::new(RepositoryDataSource));
        data_sources.insert("bitbucket_user", Box::new(UserDataSource));

        Self {
            resources,
            data_sources,
        }
    }

    /// Looks up a resource reconciler by its declared type name.
    pub fn resource(&self, name: &str) -> Option<&dyn Reconciler> {
        self.resources.get(name).map(Box::as_ref)
    }

    /// Looks up a data source by its declared type name.
    pub fn data_source(&self, name: &str) -> Option<&dyn DataSource> {
        self.data_sources.get(name).map(Box::as_ref)
    }

    /// Iterates the registered resource type names, sorted.
    pub fn resource_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }

    /// Iterates the registered data source type names, sorted.
    pub fn data_source_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.data_sources.keys().copied()
    }
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_resource() {
        let provider = Provider::new();
        let names: Vec<&str> = provider.resource_names().collect();
        assert_eq!(
            names,
            vec![
                "bitbucket_branch_restriction",
                "bitbucket_default_reviewers",
                "bitbucket_deploy_key",
                "bitbucket_deployment",
                "bitbucket_deployment_variable",
                "bitbucket_group",
                "bitbucket_group_member",
                "bitbucket_hook",
                "bitbucket_project",
                "bitbucket_repository",
                "bitbucket_repository_variable",
                "bitbucket_ssh_key",
            ]
        );

        assert!(provider.resource("bitbucket_repository").is_some());
        assert!(provider.resource("bitbucket_nonexistent").is_none());

        let data_sources: Vec<&str> = provider.data_source_names().collect();
        assert_eq!(data_sources, vec!["bitbucket_repository", "bitbucket_user"]);
    }

    #[test]
    fn test_config_from_env() {
        env::set_var(USERNAME_VAR, "envuser");
        env::set_var(PASSWORD_VAR, "envpass");

        let config = ProviderConfig::from_env().unwrap();
        assert_eq!(config.username, "envuser");
        assert_eq!(config.password, "envpass");

        env::remove_var(PASSWORD_VAR);
        let err = ProviderConfig::from_env().unwrap_err();
        assert!(err.to_string().contains(PASSWORD_VAR));

        env::remove_var(USERNAME_VAR);
    }
}

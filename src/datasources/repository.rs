//
//  bitbucket-provider
//  datasources/repository.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Repository lookup.
//!
//! Resolves an existing repository by `owner` and `slug` (or `name`) and
//! exposes the same attribute set the repository resource manages. A
//! missing repository is an error here, not an absence.

use crate::api::{decode_json, ApiError, BitbucketClient};
use crate::datasources::DataSource;
use crate::resources::repository::{PipelinesEnabled, Repository};
use crate::state::ResourceState;

/// Data source for `bitbucket_repository`.
pub struct RepositoryDataSource;

impl DataSource for RepositoryDataSource {
    fn read(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let owner = state.get_string("owner");
        if owner.is_empty() {
            return Err(ApiError::Validation("owner must not be blank".to_string()));
        }

        let mut slug = state.get_string("slug");
        if slug.is_empty() {
            slug = state.get_string("name");
        }
        if slug.is_empty() {
            return Err(ApiError::Validation(
                "repository slug or name must not be blank".to_string(),
            ));
        }

        let response = client.get(&format!("2.0/repositories/{owner}/{slug}"))?;
        let repository: Repository = decode_json(response)?;

        state.set_id(format!("{owner}/{slug}"));
        state.set_string("scm", repository.scm.unwrap_or_default());
        state.set_bool("is_private", repository.is_private);
        state.set_bool("has_wiki", repository.has_wiki);
        state.set_bool("has_issues", repository.has_issues);
        state.set_string("name", repository.name.clone().unwrap_or_default());
        if let Some(server_slug) = repository.slug {
            if repository.name.as_deref() != Some(server_slug.as_str()) {
                state.set_string("slug", server_slug);
            }
        }
        state.set_string("language", repository.language.unwrap_or_default());
        state.set_string("fork_policy", repository.fork_policy.unwrap_or_default());
        state.set_string("website", repository.website.unwrap_or_default());
        state.set_string("description", repository.description.unwrap_or_default());
        state.set_string(
            "project_key",
            repository.project.map(|p| p.key).unwrap_or_default(),
        );

        for clone_url in repository.links.clone {
            if clone_url.name == "https" {
                state.set_string("clone_https", clone_url.href);
            } else {
                state.set_string("clone_ssh", clone_url.href);
            }
        }

        // Pipelines may simply not be provisioned for the repository; a
        // failed lookup leaves the attribute untouched.
        if let Ok(pipelines) = client.get(&format!("2.0/repositories/{owner}/{slug}/pipelines_config"))
        {
            if let Ok(config) = decode_json::<PipelinesEnabled>(pipelines) {
                state.set_bool("pipelines_enabled", config.enabled);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(server: &mockito::Server) -> BitbucketClient {
        BitbucketClient::with_base_url(&server.url(), "tester", "app-pass").unwrap()
    }

    #[test]
    fn test_lookup_requires_owner_and_slug() {
        let server = mockito::Server::new();
        let client = client_for(&server);

        let mut state = ResourceState::new();
        assert!(matches!(
            RepositoryDataSource.read(&client, &mut state).unwrap_err(),
            ApiError::Validation(_)
        ));

        state.set_string("owner", "team");
        assert!(matches!(
            RepositoryDataSource.read(&client, &mut state).unwrap_err(),
            ApiError::Validation(_)
        ));
    }

    #[test]
    fn test_missing_repository_is_an_error() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/2.0/repositories/team/widget")
            .with_status(404)
            .with_body(r#"{"error":{"message":"Repository not found"}}"#)
            .create();

        let client = client_for(&server);
        let mut state = ResourceState::new();
        state.set_string("owner", "team");
        state.set_string("slug", "widget");

        let err = RepositoryDataSource.read(&client, &mut state).unwrap_err();
        assert!(matches!(err, ApiError::Api { status: 404, .. }));
        assert!(!state.is_present());
    }

    #[test]
    fn test_lookup_tolerates_missing_pipelines_config() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/2.0/repositories/team/widget")
            .with_status(200)
            .with_body(r#"{"name": "widget", "slug": "widget", "is_private": true}"#)
            .create();
        server
            .mock("GET", "/2.0/repositories/team/widget/pipelines_config")
            .with_status(404)
            .with_body(r#"{"error":{"message":"no pipelines"}}"#)
            .create();

        let client = client_for(&server);
        let mut state = ResourceState::new();
        state.set_string("owner", "team");
        state.set_string("slug", "widget");

        RepositoryDataSource.read(&client, &mut state).unwrap();
        assert_eq!(state.id(), Some("team/widget"));
        assert!(state.get_bool("is_private"));
        assert!(state.get("pipelines_enabled").is_none());
    }
}

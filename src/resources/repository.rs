//
//  bitbucket-provider
//  resources/repository.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Repository reconciler.
//!
//! Maps the `bitbucket_repository` attribute set onto
//! `2.0/repositories/{owner}/{slug}`. The repository has no standalone
//! primary key in its path; the identifier is the composite `owner/slug`.
//! Pipelines enablement lives on a separate `pipelines_config`
//! sub-resource and is pushed/pulled alongside the repository itself.

use serde::{Deserialize, Serialize};

use crate::api::{ApiError, BitbucketClient};
use crate::resources::{fetch_optional, split_composite_id, Reconciler};
use crate::state::ResourceState;

/// A repository as the API represents it, used for both request payloads
/// and responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Repository {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scm: Option<String>,

    #[serde(default)]
    pub has_wiki: bool,

    #[serde(default)]
    pub has_issues: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(default)]
    pub is_private: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fork_policy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// URL-safe identifier the server derives from the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectKey>,

    #[serde(default, skip_serializing_if = "RepositoryLinks::is_empty")]
    pub links: RepositoryLinks,
}

/// Project membership expressed by key only, as create/update expect it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectKey {
    pub key: String,
}

/// The `links` object; only the clone URLs are consumed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryLinks {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clone: Vec<CloneUrl>,
}

impl RepositoryLinks {
    fn is_empty(&self) -> bool {
        self.clone.is_empty()
    }
}

/// One clone endpoint; `name` is `https` or `ssh`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloneUrl {
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub name: String,
}

/// The `pipelines_config` sub-resource body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelinesEnabled {
    pub enabled: bool,
}

/// Reconciler for `bitbucket_repository`.
pub struct RepositoryResource;

fn optional(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// The slug used in paths: the declared slug, falling back to the name.
fn slug_from(state: &ResourceState) -> String {
    let slug = state.get_string("slug");
    if slug.is_empty() {
        state.get_string("name")
    } else {
        slug
    }
}

fn repository_from_state(state: &ResourceState) -> Repository {
    Repository {
        scm: optional(state.get_string("scm")),
        has_wiki: state.get_bool("has_wiki"),
        has_issues: state.get_bool("has_issues"),
        website: optional(state.get_string("website")),
        is_private: state.get_bool("is_private"),
        fork_policy: optional(state.get_string("fork_policy")),
        language: optional(state.get_string("language")),
        description: optional(state.get_string("description")),
        name: optional(state.get_string("name")),
        slug: optional(state.get_string("slug")),
        uuid: None,
        project: optional(state.get_string("project_key")).map(|key| ProjectKey { key }),
        links: RepositoryLinks::default(),
    }
}

fn put_pipelines_config(
    client: &BitbucketClient,
    owner: &str,
    slug: &str,
    enabled: bool,
) -> Result<(), ApiError> {
    client.put(
        &format!("2.0/repositories/{owner}/{slug}/pipelines_config"),
        &PipelinesEnabled { enabled },
    )?;
    Ok(())
}

impl Reconciler for RepositoryResource {
    fn create(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let owner = state.get_string("owner");
        let slug = slug_from(state);
        let repository = repository_from_state(state);

        client.post(&format!("2.0/repositories/{owner}/{slug}"), &repository)?;
        state.set_id(format!("{owner}/{slug}"));

        put_pipelines_config(client, &owner, &slug, state.get_bool("pipelines_enabled"))?;

        self.read(client, state)
    }

    fn read(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        // An imported or freshly created resource carries owner and slug in
        // its identifier; push them back into the attribute set first.
        if let Some(id) = state.id().map(str::to_string) {
            let (owner, slug) = split_composite_id(&id, "owner/slug")?;
            state.set_string("owner", owner);
            state.set_string("slug", slug);
        }

        let owner = state.get_string("owner");
        let slug = slug_from(state);

        let Some(repository) =
            fetch_optional::<Repository>(client, &format!("2.0/repositories/{owner}/{slug}"))?
        else {
            state.clear_id();
            return Ok(());
        };

        state.set_string("scm", repository.scm.unwrap_or_default());
        state.set_bool("is_private", repository.is_private);
        state.set_bool("has_wiki", repository.has_wiki);
        state.set_bool("has_issues", repository.has_issues);
        state.set_string("name", repository.name.clone().unwrap_or_default());
        // The server keeps the slug equal to the name unless they diverge;
        // only a diverged slug is worth writing back.
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

        if let Some(config) = fetch_optional::<PipelinesEnabled>(
            client,
            &format!("2.0/repositories/{owner}/{slug}/pipelines_config"),
        )? {
            state.set_bool("pipelines_enabled", config.enabled);
        }

        Ok(())
    }

    fn update(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let owner = state.get_string("owner");
        let slug = slug_from(state);
        let repository = repository_from_state(state);

        client.put(&format!("2.0/repositories/{owner}/{slug}"), &repository)?;
        put_pipelines_config(client, &owner, &slug, state.get_bool("pipelines_enabled"))?;

        self.read(client, state)
    }

    fn delete(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let owner = state.get_string("owner");
        let slug = slug_from(state);
        client.delete(&format!("2.0/repositories/{owner}/{slug}"))?;
        Ok(())
    }
}

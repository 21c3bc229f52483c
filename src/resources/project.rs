//
//  bitbucket-provider
//  resources/project.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Project reconciler.
//!
//! Maps the `bitbucket_project` attribute set onto
//! `2.0/teams/{owner}/projects/`. Projects are keyed by their short
//! uppercase key within a team; the identifier is the composite
//! `owner/key`.

use serde::{Deserialize, Serialize};

use crate::api::{ApiError, BitbucketClient};
use crate::resources::{fetch_optional, split_composite_id, Reconciler};
use crate::state::ResourceState;

/// A project as the API represents it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default)]
    pub is_private: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

/// Reconciler for `bitbucket_project`.
pub struct ProjectResource;

fn project_from_state(state: &ResourceState) -> Project {
    Project {
        key: Some(state.get_string("key")),
        is_private: state.get_bool("is_private"),
        description: {
            let description = state.get_string("description");
            if description.is_empty() {
                None
            } else {
                Some(description)
            }
        },
        name: Some(state.get_string("name")),
        uuid: None,
    }
}

impl Reconciler for ProjectResource {
    fn create(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let owner = state.get_string("owner");
        if owner.is_empty() {
            return Err(ApiError::Validation(
                "owner must not be an empty string".to_string(),
            ));
        }

        let key = state.get_string("key");
        let project = project_from_state(state);
        client.post(&format!("2.0/teams/{owner}/projects/"), &project)?;

        state.set_id(format!("{owner}/{key}"));
        self.read(client, state)
    }

    fn read(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        if let Some(id) = state.id().map(str::to_string) {
            let (owner, key) = split_composite_id(&id, "owner/key")?;
            state.set_string("owner", owner);
            state.set_string("key", key);
        }

        let owner = state.get_string("owner");
        let key = state.get_string("key");

        let Some(project) =
            fetch_optional::<Project>(client, &format!("2.0/teams/{owner}/projects/{key}"))?
        else {
            state.clear_id();
            return Ok(());
        };

        state.set_string("key", project.key.unwrap_or_default());
        state.set_bool("is_private", project.is_private);
        state.set_string("name", project.name.unwrap_or_default());
        state.set_string("description", project.description.unwrap_or_default());

        Ok(())
    }

    fn update(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let owner = state.get_string("owner");
        let key = state.get_string("key");
        let project = project_from_state(state);

        client.put(&format!("2.0/teams/{owner}/projects/{key}"), &project)?;
        self.read(client, state)
    }

    fn delete(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let owner = state.get_string("owner");
        let key = state.get_string("key");
        client.delete(&format!("2.0/teams/{owner}/projects/{key}"))?;
        Ok(())
    }
}

//
//  bitbucket-provider
//  resources/repository_variable.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Repository pipeline variable reconciler.
//!
//! Maps the `bitbucket_repository_variable` attribute set onto
//! `2.0/repositories/{repository}/pipelines_config/variables/`, where
//! `repository` is the full `workspace/slug` name. The server assigns a
//! UUID which becomes the identifier and keys every item call.

use serde::{Deserialize, Serialize};

use crate::api::{decode_json, ApiError, BitbucketClient};
use crate::resources::{fetch_optional, Reconciler};
use crate::state::ResourceState;
use crate::util::escape_path_segment;

/// A pipeline variable as the API represents it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryVariable {
    pub key: String,

    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(default)]
    pub secured: bool,
}

/// Reconciler for `bitbucket_repository_variable`.
pub struct RepositoryVariableResource;

fn variable_from_state(state: &ResourceState) -> RepositoryVariable {
    RepositoryVariable {
        key: state.get_string("key"),
        value: state.get_string("value"),
        uuid: None,
        secured: state.get_bool("secured"),
    }
}

fn item_endpoint(state: &ResourceState) -> String {
    format!(
        "2.0/repositories/{}/pipelines_config/variables/{}",
        state.get_string("repository"),
        escape_path_segment(&state.get_string("uuid"))
    )
}

impl Reconciler for RepositoryVariableResource {
    fn create(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let variable = variable_from_state(state);
        let response = client.post(
            &format!(
                "2.0/repositories/{}/pipelines_config/variables/",
                state.get_string("repository")
            ),
            &variable,
        )?;

        let created: RepositoryVariable = decode_json(response)?;
        let uuid = created.uuid.ok_or_else(|| {
            ApiError::Unexpected("variable create response carried no uuid".to_string())
        })?;
        state.set_string("uuid", uuid.clone());
        state.set_id(uuid);

        self.read(client, state)
    }

    fn read(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let Some(variable) =
            fetch_optional::<RepositoryVariable>(client, &item_endpoint(state))?
        else {
            state.clear_id();
            return Ok(());
        };

        state.set_string("uuid", variable.uuid.unwrap_or_default());
        state.set_string("key", variable.key);
        state.set_string("value", variable.value);
        state.set_bool("secured", variable.secured);

        Ok(())
    }

    fn update(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let variable = variable_from_state(state);
        client.put(&item_endpoint(state), &variable)?;
        self.read(client, state)
    }

    fn delete(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        client.delete(&item_endpoint(state))?;
        Ok(())
    }
}

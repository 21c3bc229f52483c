//
//  bitbucket-provider
//  resources/deployment.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Deployment environment reconciler.
//!
//! Maps the `bitbucket_deployment` attribute set onto
//! `2.0/repositories/{repository}/environments/`, where `repository` is
//! the full `workspace/slug` name. The server assigns a UUID; the
//! identifier is the composite `{repository}:{uuid}`, the form that
//! deployment variables consume as their parent reference.

use serde::{Deserialize, Serialize};

use crate::api::{decode_json, ApiError, BitbucketClient};
use crate::resources::{fetch_optional, Reconciler};
use crate::state::ResourceState;
use crate::util::{escape_path_segment, one_of};

/// Environment stages the API accepts.
pub const STAGES: &[&str] = &["Test", "Staging", "Production"];

/// A deployment environment as the API represents it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Deployment {
    pub name: String,

    /// The stage wrapper the API calls `environment_type`.
    #[serde(rename = "environment_type")]
    pub stage: Stage,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

/// The nested stage object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
}

/// Reconciler for `bitbucket_deployment`.
pub struct DeploymentResource;

fn deployment_from_state(state: &ResourceState) -> Deployment {
    Deployment {
        name: state.get_string("name"),
        stage: Stage {
            name: state.get_string("stage"),
        },
        uuid: None,
    }
}

fn item_endpoint(state: &ResourceState) -> String {
    format!(
        "2.0/repositories/{}/environments/{}",
        state.get_string("repository"),
        escape_path_segment(&state.get_string("uuid"))
    )
}

impl Reconciler for DeploymentResource {
    fn create(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let stage = state.get_string("stage");
        if let Some(problem) = one_of(&stage, STAGES) {
            return Err(ApiError::Validation(format!("stage: {problem}")));
        }

        let repository = state.get_string("repository");
        let deployment = deployment_from_state(state);
        let response =
            client.post(&format!("2.0/repositories/{repository}/environments/"), &deployment)?;

        let created: Deployment = decode_json(response)?;
        let uuid = created.uuid.ok_or_else(|| {
            ApiError::Unexpected("environment create response carried no uuid".to_string())
        })?;
        state.set_string("uuid", uuid.clone());
        state.set_id(format!("{repository}:{uuid}"));

        self.read(client, state)
    }

    fn read(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        // An imported resource carries repository and uuid only in its
        // composite identifier.
        if state.get_string("uuid").is_empty() {
            if let Some(id) = state.id().map(str::to_string) {
                let (repository, uuid) = id.split_once(':').ok_or_else(|| {
                    ApiError::InvalidId(format!("'{id}' should match `repository:uuid`"))
                })?;
                state.set_string("repository", repository);
                state.set_string("uuid", uuid);
            }
        }

        let Some(deployment) = fetch_optional::<Deployment>(client, &item_endpoint(state))? else {
            state.clear_id();
            return Ok(());
        };

        state.set_string("uuid", deployment.uuid.unwrap_or_default());
        state.set_string("name", deployment.name);
        state.set_string("stage", deployment.stage.name);

        Ok(())
    }

    fn update(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let deployment = deployment_from_state(state);
        client.put(&item_endpoint(state), &deployment)?;
        self.read(client, state)
    }

    fn delete(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        client.delete(&item_endpoint(state))?;
        Ok(())
    }
}

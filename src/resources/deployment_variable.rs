//
//  bitbucket-provider
//  resources/deployment_variable.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Deployment variable reconciler.
//!
//! Maps the `bitbucket_deployment_variable` attribute set onto
//! `2.0/repositories/{repository}/deployments_config/environments/{environment}/variables`.
//! The parent `deployment` attribute is the `{repository}:{uuid}` composite
//! produced by the deployment reconciler and is split back apart here.
//!
//! The API offers no item GET for a single variable; reads walk the
//! paginated collection and match on UUID, clearing the identifier when
//! the variable is no longer listed.

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::{decode_json, ApiError, BitbucketClient};
use crate::resources::{collect_pages, Reconciler};
use crate::state::ResourceState;
use crate::util::escape_path_segment;

/// How long to wait between creating a variable and reading it back.
///
/// The deployments cache on Bitbucket's side lags behind writes; a listing
/// issued immediately after create can come back without the new variable.
/// The API exposes no convergence signal to poll for, so a fixed settle
/// wait is the only option.
const SETTLE_WAIT: Duration = Duration::from_millis(5000);

/// A deployment variable as the API represents it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentVariable {
    pub key: String,

    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    /// Secured variables are write-only server-side; serialized
    /// unconditionally so `false` is explicit.
    #[serde(default)]
    pub secured: bool,
}

/// Reconciler for `bitbucket_deployment_variable`.
pub struct DeploymentVariableResource;

/// Splits the `{repository}:{uuid}` composite a deployment identifies as.
fn parse_deployment_id(id: &str) -> Result<(&str, &str), ApiError> {
    id.split_once(':').ok_or_else(|| {
        ApiError::InvalidId(format!("'{id}' should match `repository:environment-uuid`"))
    })
}

fn variable_from_state(state: &ResourceState) -> DeploymentVariable {
    DeploymentVariable {
        key: state.get_string("key"),
        value: state.get_string("value"),
        uuid: None,
        secured: state.get_bool("secured"),
    }
}

fn collection_endpoint(state: &ResourceState) -> Result<String, ApiError> {
    let deployment = state.get_string("deployment");
    let (repository, environment) = parse_deployment_id(&deployment)?;
    Ok(format!(
        "2.0/repositories/{repository}/deployments_config/environments/{}/variables",
        escape_path_segment(environment)
    ))
}

fn item_endpoint(state: &ResourceState, uuid: &str) -> Result<String, ApiError> {
    Ok(format!(
        "{}/{}",
        collection_endpoint(state)?,
        escape_path_segment(uuid)
    ))
}

impl Reconciler for DeploymentVariableResource {
    fn create(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let variable = variable_from_state(state);
        let response = client.post(&collection_endpoint(state)?, &variable)?;

        let created: DeploymentVariable = decode_json(response)?;
        let uuid = created.uuid.ok_or_else(|| {
            ApiError::Unexpected("variable create response carried no uuid".to_string())
        })?;
        state.set_string("uuid", uuid.clone());
        state.set_id(uuid);

        // Without this the follow-up listing can miss the variable we just
        // created; see SETTLE_WAIT.
        thread::sleep(SETTLE_WAIT);

        self.read(client, state)
    }

    fn read(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let variables: Vec<DeploymentVariable> =
            match collect_pages(client, &collection_endpoint(state)?) {
                Ok(variables) => variables,
                Err(ApiError::Api { status: 404, .. }) => {
                    state.clear_id();
                    return Ok(());
                }
                Err(err) => return Err(err),
            };

        let uuid = state.get_string("uuid");
        let Some(variable) = variables
            .into_iter()
            .find(|variable| variable.uuid.as_deref() == Some(uuid.as_str()))
        else {
            state.clear_id();
            return Ok(());
        };

        state.set_id(uuid);
        state.set_string("key", variable.key);
        state.set_string("value", variable.value);
        state.set_bool("secured", variable.secured);

        Ok(())
    }

    fn update(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let uuid = state.get_string("uuid");
        let variable = variable_from_state(state);
        client.put(&item_endpoint(state, &uuid)?, &variable)?;

        self.read(client, state)
    }

    fn delete(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let uuid = state.get_string("uuid");
        client.delete(&item_endpoint(state, &uuid)?)?;
        Ok(())
    }
}

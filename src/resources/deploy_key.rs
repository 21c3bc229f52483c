//
//  bitbucket-provider
//  resources/deploy_key.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Deploy key reconciler.
//!
//! Maps the `bitbucket_deploy_key` attribute set onto
//! `2.0/repositories/{owner}/{repo_slug}/deploy-keys`. The server assigns
//! a numeric id. The key material itself is immutable — only the label can
//! change after creation; a changed key means a new resource.
//!
//! The declared `key` attribute holds full `authorized_keys` material; the
//! API wants the key text and the trailing comment tracked separately, so
//! the reconciler splits on write and rejoins on read.

use serde::{Deserialize, Serialize};

use crate::api::{decode_json, ApiError, BitbucketClient};
use crate::resources::{fetch_optional, probe, Reconciler};
use crate::state::ResourceState;
use crate::util::{escape_path_segment, join_authorized_key, split_authorized_key, validate_ssh_key};

/// A deploy key as the API returns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Create payload: key material with the comment re-attached, plus label.
#[derive(Debug, Serialize)]
struct CreateDeployKey<'a> {
    key: String,
    label: &'a str,
}

/// Update payload: the label is the only mutable field.
#[derive(Debug, Serialize)]
struct UpdateDeployKey<'a> {
    label: &'a str,
}

/// Reconciler for `bitbucket_deploy_key`.
pub struct DeployKeyResource;

fn collection_endpoint(state: &ResourceState) -> String {
    format!(
        "2.0/repositories/{}/{}/deploy-keys",
        state.get_string("owner"),
        state.get_string("repo_slug")
    )
}

fn item_endpoint(state: &ResourceState, id: &str) -> String {
    format!("{}/{}", collection_endpoint(state), escape_path_segment(id))
}

impl Reconciler for DeployKeyResource {
    fn create(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let raw_key = state.get_string("key");
        let problems = validate_ssh_key(&raw_key);
        if !problems.is_empty() {
            return Err(ApiError::Validation(problems.join("; ")));
        }

        let (key, comment) = split_authorized_key(&raw_key);
        let label = state.get_string("label");
        let payload = CreateDeployKey {
            key: join_authorized_key(&key, &comment),
            label: &label,
        };

        let response = client.post(&collection_endpoint(state), &payload)?;
        let created: DeployKey = decode_json(response)?;
        let id = created.id.ok_or_else(|| {
            ApiError::Unexpected("deploy key create response carried no id".to_string())
        })?;
        state.set_id(id.to_string());

        self.read(client, state)
    }

    fn read(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let Some(id) = state.id().map(str::to_string) else {
            return Ok(());
        };

        let Some(deploy_key) = fetch_optional::<DeployKey>(client, &item_endpoint(state, &id))?
        else {
            state.clear_id();
            return Ok(());
        };

        state.set_string(
            "key",
            join_authorized_key(
                deploy_key.key.as_deref().unwrap_or_default(),
                deploy_key.comment.as_deref().unwrap_or_default(),
            ),
        );
        state.set_string("label", deploy_key.label.unwrap_or_default());

        Ok(())
    }

    fn update(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let id = state
            .id()
            .map(str::to_string)
            .ok_or_else(|| ApiError::InvalidId("deploy key has no identifier".to_string()))?;

        let label = state.get_string("label");
        client.put(&item_endpoint(state, &id), &UpdateDeployKey { label: &label })?;

        self.read(client, state)
    }

    fn delete(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let id = state
            .id()
            .map(str::to_string)
            .ok_or_else(|| ApiError::InvalidId("deploy key has no identifier".to_string()))?;

        client.delete(&item_endpoint(state, &id))?;
        Ok(())
    }

    fn exists(&self, client: &BitbucketClient, state: &ResourceState) -> Result<bool, ApiError> {
        match state.id() {
            Some(id) => probe(client, &item_endpoint(state, id)),
            None => Ok(false),
        }
    }
}

//
//  bitbucket-provider
//  resources/ssh_key.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! User SSH key reconciler.
//!
//! Maps the `bitbucket_ssh_key` attribute set onto
//! `2.0/users/{owner}/ssh-keys`, where `owner` is a username or UUID. The
//! server assigns a UUID identifier. As with deploy keys, the declared
//! `key` attribute is full `authorized_keys` material that gets split into
//! key text and comment on the wire; only the label is mutable.

use serde::{Deserialize, Serialize};

use crate::api::{decode_json, ApiError, BitbucketClient};
use crate::resources::{fetch_optional, Reconciler};
use crate::state::ResourceState;
use crate::util::{escape_path_segment, join_authorized_key, split_authorized_key, validate_ssh_key};

/// The label applied when the declaration does not carry one.
pub const DEFAULT_LABEL: &str = "Managed by Terraform";

/// A user SSH key as the API returns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SshKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateSshKey<'a> {
    key: String,
    label: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateSshKey<'a> {
    label: &'a str,
}

/// Reconciler for `bitbucket_ssh_key`.
pub struct SshKeyResource;

fn label_from(state: &ResourceState) -> String {
    let label = state.get_string("label");
    if label.is_empty() {
        DEFAULT_LABEL.to_string()
    } else {
        label
    }
}

fn collection_endpoint(state: &ResourceState) -> String {
    format!(
        "2.0/users/{}/ssh-keys",
        escape_path_segment(&state.get_string("owner"))
    )
}

fn item_endpoint(state: &ResourceState, id: &str) -> String {
    format!("{}/{}", collection_endpoint(state), escape_path_segment(id))
}

impl Reconciler for SshKeyResource {
    fn create(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let raw_key = state.get_string("key");
        let problems = validate_ssh_key(&raw_key);
        if !problems.is_empty() {
            return Err(ApiError::Validation(problems.join("; ")));
        }

        let (key, comment) = split_authorized_key(&raw_key);
        let label = label_from(state);
        let payload = CreateSshKey {
            key: join_authorized_key(&key, &comment),
            label: &label,
        };

        let response = client.post(&collection_endpoint(state), &payload)?;
        let created: SshKey = decode_json(response)?;
        let uuid = created.uuid.ok_or_else(|| {
            ApiError::Unexpected("ssh key create response carried no uuid".to_string())
        })?;
        state.set_id(uuid);

        self.read(client, state)
    }

    fn read(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let Some(id) = state.id().map(str::to_string) else {
            return Ok(());
        };

        let Some(ssh_key) = fetch_optional::<SshKey>(client, &item_endpoint(state, &id))? else {
            state.clear_id();
            return Ok(());
        };

        state.set_string(
            "key",
            join_authorized_key(
                ssh_key.key.as_deref().unwrap_or_default(),
                ssh_key.comment.as_deref().unwrap_or_default(),
            ),
        );
        state.set_string("label", ssh_key.label.unwrap_or_default());

        Ok(())
    }

    fn update(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let id = state
            .id()
            .map(str::to_string)
            .ok_or_else(|| ApiError::InvalidId("ssh key has no identifier".to_string()))?;

        let label = label_from(state);
        client.put(&item_endpoint(state, &id), &UpdateSshKey { label: &label })?;

        self.read(client, state)
    }

    fn delete(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let id = state
            .id()
            .map(str::to_string)
            .ok_or_else(|| ApiError::InvalidId("ssh key has no identifier".to_string()))?;

        client.delete(&item_endpoint(state, &id))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str =
        "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIKqP3Cr632C2dNhhgKVcon4ldUSAeKiku2yP9O9/bDtY laptop";

    fn client_for(server: &mockito::Server) -> BitbucketClient {
        BitbucketClient::with_base_url(&server.url(), "tester", "app-pass").unwrap()
    }

    #[test]
    fn test_create_applies_default_label() {
        let mut server = mockito::Server::new();
        let body = r#"{
            "uuid": "{key-uuid}",
            "key": "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIKqP3Cr632C2dNhhgKVcon4ldUSAeKiku2yP9O9/bDtY",
            "comment": "laptop",
            "label": "Managed by Terraform"
        }"#;
        let post = server
            .mock("POST", "/2.0/users/alice/ssh-keys")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"label": "Managed by Terraform"}"#.to_string(),
            ))
            .with_status(201)
            .with_body(body)
            .create();
        server
            .mock("GET", "/2.0/users/alice/ssh-keys/%7Bkey-uuid%7D")
            .with_status(200)
            .with_body(body)
            .create();

        let client = client_for(&server);
        let mut state = ResourceState::new();
        state.set_string("owner", "alice");
        state.set_string("key", KEY);

        SshKeyResource.create(&client, &mut state).unwrap();

        assert_eq!(state.id(), Some("{key-uuid}"));
        assert_eq!(state.get_string("key"), KEY);
        assert_eq!(state.get_string("label"), "Managed by Terraform");
        post.assert();
    }

    #[test]
    fn test_create_rejects_invalid_key() {
        let server = mockito::Server::new();
        let client = client_for(&server);

        let mut state = ResourceState::new();
        state.set_string("owner", "alice");
        state.set_string("key", "garbage");

        let err = SshKeyResource.create(&client, &mut state).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}

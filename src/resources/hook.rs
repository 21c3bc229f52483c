//
//  bitbucket-provider
//  resources/hook.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Webhook reconciler.
//!
//! Maps the `bitbucket_hook` attribute set onto
//! `2.0/repositories/{owner}/{repository}/hooks`. The server assigns a
//! UUID on creation which becomes the identifier; the UUID arrives wrapped
//! in braces and must be path-escaped on every item call.

use serde::{Deserialize, Serialize};

use crate::api::{decode_json, ApiError, BitbucketClient};
use crate::resources::{fetch_optional, probe, Reconciler};
use crate::state::ResourceState;
use crate::util::escape_path_segment;

/// A webhook subscription as the API represents it.
///
/// `active` and `skip_cert_verification` are serialized unconditionally:
/// omitting a false value would flip the server-side default instead of
/// disabling the flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub active: bool,

    pub skip_cert_verification: bool,

    /// Event keys this hook subscribes to (`repo:push`, ...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
}

/// Reconciler for `bitbucket_hook`.
pub struct HookResource;

fn hook_from_state(state: &ResourceState) -> Hook {
    Hook {
        uuid: None,
        url: Some(state.get_string("url")),
        description: Some(state.get_string("description")),
        active: state.get_bool("active"),
        skip_cert_verification: state.get_bool("skip_cert_verification"),
        events: state.get_list("events"),
    }
}

fn item_endpoint(state: &ResourceState, id: &str) -> String {
    format!(
        "2.0/repositories/{}/{}/hooks/{}",
        state.get_string("owner"),
        state.get_string("repository"),
        escape_path_segment(id)
    )
}

impl Reconciler for HookResource {
    fn create(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let hook = hook_from_state(state);
        let response = client.post(
            &format!(
                "2.0/repositories/{}/{}/hooks",
                state.get_string("owner"),
                state.get_string("repository")
            ),
            &hook,
        )?;

        let created: Hook = decode_json(response)?;
        let uuid = created.uuid.ok_or_else(|| {
            ApiError::Unexpected("hook create response carried no uuid".to_string())
        })?;
        state.set_id(uuid);

        self.read(client, state)
    }

    fn read(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let Some(id) = state.id().map(str::to_string) else {
            return Ok(());
        };

        let Some(hook) = fetch_optional::<Hook>(client, &item_endpoint(state, &id))? else {
            state.clear_id();
            return Ok(());
        };

        state.set_string("uuid", hook.uuid.unwrap_or_default());
        state.set_string("description", hook.description.unwrap_or_default());
        state.set_bool("active", hook.active);
        state.set_string("url", hook.url.unwrap_or_default());
        state.set_bool("skip_cert_verification", hook.skip_cert_verification);
        state.set_list("events", hook.events);

        Ok(())
    }

    fn update(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let id = state
            .id()
            .map(str::to_string)
            .ok_or_else(|| ApiError::InvalidId("hook has no identifier".to_string()))?;

        let hook = hook_from_state(state);
        client.put(&item_endpoint(state, &id), &hook)?;

        self.read(client, state)
    }

    fn delete(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let id = state
            .id()
            .map(str::to_string)
            .ok_or_else(|| ApiError::InvalidId("hook has no identifier".to_string()))?;

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

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(server: &mockito::Server) -> BitbucketClient {
        BitbucketClient::with_base_url(&server.url(), "tester", "app-pass").unwrap()
    }

    fn declared_state() -> ResourceState {
        let mut state = ResourceState::new();
        state.set_string("owner", "team");
        state.set_string("repository", "widget");
        state.set_string("url", "https://ci.example.test/hook");
        state.set_string("description", "build trigger");
        state.set_bool("active", false);
        state.set_bool("skip_cert_verification", false);
        state.set_list("events", vec!["repo:push".to_string()]);
        state
    }

    #[test]
    fn test_false_flags_serialize_explicitly() {
        let hook = Hook {
            uuid: None,
            url: Some("https://ci.example.test/hook".to_string()),
            description: Some("build trigger".to_string()),
            active: false,
            skip_cert_verification: false,
            events: vec!["repo:push".to_string()],
        };

        let json = serde_json::to_string(&hook).unwrap();
        assert!(json.contains(r#""active":false"#));
        assert!(json.contains(r#""skip_cert_verification":false"#));

        // Round-trip preserves the entity, false booleans included.
        let back: Hook = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hook);
    }

    #[test]
    fn test_create_uses_server_uuid_as_id() {
        let mut server = mockito::Server::new();
        let body = r#"{
            "uuid": "{hook-uuid}",
            "url": "https://ci.example.test/hook",
            "description": "build trigger",
            "active": false,
            "skip_cert_verification": false,
            "events": ["repo:push"]
        }"#;
        let post = server
            .mock("POST", "/2.0/repositories/team/widget/hooks")
            .with_status(201)
            .with_body(body)
            .create();
        let get = server
            .mock("GET", "/2.0/repositories/team/widget/hooks/%7Bhook-uuid%7D")
            .with_status(200)
            .with_body(body)
            .create();

        let client = client_for(&server);
        let mut state = declared_state();
        HookResource.create(&client, &mut state).unwrap();

        assert_eq!(state.id(), Some("{hook-uuid}"));
        assert_eq!(state.get_string("uuid"), "{hook-uuid}");
        assert!(!state.get_bool("active"));
        assert_eq!(state.get_list("events"), vec!["repo:push"]);
        post.assert();
        get.assert();
    }

    #[test]
    fn test_exists_maps_404_to_false() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/2.0/repositories/team/widget/hooks/%7Bhook-uuid%7D")
            .with_status(404)
            .with_body(r#"{"error":{"message":"is not a valid hook"}}"#)
            .create();

        let client = client_for(&server);
        let mut state = declared_state();
        state.set_id("{hook-uuid}");

        assert!(!HookResource.exists(&client, &state).unwrap());

        // And a read against the same answer clears the identifier.
        HookResource.read(&client, &mut state).unwrap();
        assert!(!state.is_present());
    }
}

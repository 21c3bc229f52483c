//
//  bitbucket-provider
//  datasources/user.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! User profile lookup on the legacy 1.0 API.
//!
//! Resolves a user by username via `1.0/users/{username}`. The 1.0
//! endpoint nests the profile under a `user` envelope key and also lists
//! the account's repositories, which are ignored here.

use serde::Deserialize;

use crate::api::{decode_json, ApiError, BitbucketClient};
use crate::datasources::DataSource;
use crate::state::ResourceState;
use crate::util::escape_path_segment;

/// The 1.0 response envelope; only the profile is consumed.
#[derive(Debug, Default, Deserialize)]
pub struct UserEnvelope {
    #[serde(default)]
    pub user: UserProfile,
}

/// A user profile as the 1.0 API returns it.
#[derive(Debug, Default, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub is_staff: bool,

    #[serde(default)]
    pub avatar: String,

    #[serde(default)]
    pub resource_uri: String,

    #[serde(default)]
    pub is_team: bool,
}

/// Data source for `bitbucket_user`.
pub struct UserDataSource;

impl DataSource for UserDataSource {
    fn read(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let username = state.get_string("username");
        if username.is_empty() {
            return Err(ApiError::Validation("username must not be blank".to_string()));
        }

        let response = client.get(&format!("1.0/users/{}", escape_path_segment(&username)))?;
        let envelope: UserEnvelope = decode_json(response)?;
        let profile = envelope.user;

        state.set_id(profile.username.clone());
        state.set_string("username", profile.username);
        state.set_string("first_name", profile.first_name);
        state.set_string("last_name", profile.last_name);
        state.set_string("display_name", profile.display_name);
        state.set_bool("is_staff", profile.is_staff);
        state.set_string("avatar", profile.avatar);
        state.set_string("resource_uri", profile.resource_uri);
        state.set_bool("is_team", profile.is_team);

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
    fn test_profile_is_unwrapped_from_envelope() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/1.0/users/alice")
            .with_status(200)
            .with_body(
                r#"{
                    "repositories": [],
                    "user": {
                        "username": "alice",
                        "first_name": "Alice",
                        "last_name": "Doe",
                        "display_name": "Alice Doe",
                        "is_staff": false,
                        "avatar": "https://example.test/avatar.png",
                        "resource_uri": "/1.0/users/alice",
                        "is_team": false
                    }
                }"#,
            )
            .create();

        let client = client_for(&server);
        let mut state = ResourceState::new();
        state.set_string("username", "alice");

        UserDataSource.read(&client, &mut state).unwrap();

        assert_eq!(state.id(), Some("alice"));
        assert_eq!(state.get_string("display_name"), "Alice Doe");
        assert!(!state.get_bool("is_team"));
    }

    #[test]
    fn test_lookup_requires_username() {
        let server = mockito::Server::new();
        let client = client_for(&server);

        let mut state = ResourceState::new();
        let err = UserDataSource.read(&client, &mut state).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}

//
//  bitbucket-provider
//  resources/group_member.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Group membership reconciler.
//!
//! Manages a single user's membership in a group through
//! `1.0/groups/{accountname}/{group_slug}/members/{username}`. The API
//! exposes no handle for one membership, so the identifier is the
//! synthesized composite `accountname/group_slug/username`. Membership has
//! no mutable attributes; a change in any part means a new resource, so
//! update is a no-op refresh.

use crate::api::{ApiError, BitbucketClient};
use crate::resources::group::read_members;
use crate::resources::{expect_status, Reconciler};
use crate::state::ResourceState;
use crate::util::escape_path_segment;

/// Reconciler for `bitbucket_group_member`.
pub struct GroupMemberResource;

fn member_endpoint(state: &ResourceState) -> String {
    format!(
        "1.0/groups/{}/{}/members/{}",
        state.get_string("accountname"),
        state.get_string("group_slug"),
        escape_path_segment(&state.get_string("username"))
    )
}

impl Reconciler for GroupMemberResource {
    fn create(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let response = client.put_empty(&member_endpoint(state))?;
        expect_status(&response, 200, || {
            format!(
                "failed to add member {} to group {}",
                state.get_string("username"),
                state.get_string("group_slug")
            )
        })?;

        state.set_id(format!(
            "{}/{}/{}",
            state.get_string("accountname"),
            state.get_string("group_slug"),
            state.get_string("username")
        ));

        self.read(client, state)
    }

    fn read(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let account = state.get_string("accountname");
        let group_slug = state.get_string("group_slug");
        let username = state.get_string("username");

        let members = match read_members(client, &account, &group_slug) {
            Ok(members) => members,
            Err(ApiError::Api { status: 404, .. }) => {
                // The whole group is gone, and the membership with it.
                state.clear_id();
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let Some(member) = members.into_iter().find(|m| m.username == username) else {
            state.clear_id();
            return Ok(());
        };

        state.set_string("first_name", member.first_name.unwrap_or_default());
        state.set_string("last_name", member.last_name.unwrap_or_default());
        state.set_string("avatar", member.avatar.unwrap_or_default());
        state.set_string("resource_uri", member.resource_uri.unwrap_or_default());

        Ok(())
    }

    fn update(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        // Every attribute forces replacement; nothing to push.
        self.read(client, state)
    }

    fn delete(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        client.delete(&member_endpoint(state))?;
        Ok(())
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
        state.set_string("accountname", "team");
        state.set_string("group_slug", "deployers");
        state.set_string("username", "alice");
        state
    }

    #[test]
    fn test_create_synthesizes_composite_id() {
        let mut server = mockito::Server::new();
        let put = server
            .mock("PUT", "/1.0/groups/team/deployers/members/alice")
            .with_status(200)
            .with_body("{}")
            .create();
        server
            .mock("GET", "/1.0/groups/team/deployers/members")
            .with_status(200)
            .with_body(r#"[{"username": "alice", "first_name": "Alice", "last_name": "Doe"}]"#)
            .create();

        let client = client_for(&server);
        let mut state = declared_state();
        GroupMemberResource.create(&client, &mut state).unwrap();

        assert_eq!(state.id(), Some("team/deployers/alice"));
        assert_eq!(state.get_string("first_name"), "Alice");
        put.assert();
    }

    #[test]
    fn test_read_clears_id_when_member_left() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/1.0/groups/team/deployers/members")
            .with_status(200)
            .with_body(r#"[{"username": "bob"}]"#)
            .create();

        let client = client_for(&server);
        let mut state = declared_state();
        state.set_id("team/deployers/alice");

        GroupMemberResource.read(&client, &mut state).unwrap();
        assert!(!state.is_present());
    }
}

//
//  bitbucket-provider
//  resources/group.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Group reconciler.
//!
//! Maps the `bitbucket_group` attribute set onto the legacy
//! `1.0/groups/{accountname}` surface. Creation is special: the endpoint
//! accepts only a form-encoded `name` field, so every other attribute is
//! pushed in a follow-up update. The server derives a slug from the name;
//! the identifier is the composite `accountname/slug`.
//!
//! The member list is reconciled by symmetric set difference: desired
//! minus current is added, current minus desired is removed, one call per
//! member. The sequence is not transactional — a failure partway leaves
//! the applied calls in place, and re-running converges because the
//! difference is recomputed against live server state.

use serde::{Deserialize, Serialize};

use crate::api::{decode_json, ApiError, BitbucketClient};
use crate::resources::{expect_status, split_composite_id, Reconciler};
use crate::state::ResourceState;
use crate::util::{escape_path_segment, set_difference};

/// A group as the 1.0 API represents it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Group {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accountname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub auto_add: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
}

/// A group member as the 1.0 members endpoint lists them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupMember {
    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_uri: Option<String>,
}

/// Reconciler for `bitbucket_group`.
pub struct GroupResource;

fn group_endpoint(account: &str, slug: &str) -> String {
    format!("1.0/groups/{account}/{slug}")
}

fn member_endpoint(account: &str, slug: &str, username: &str) -> String {
    format!(
        "1.0/groups/{account}/{slug}/members/{}",
        escape_path_segment(username)
    )
}

/// Fetches the current member usernames of a group.
pub(crate) fn read_members(
    client: &BitbucketClient,
    account: &str,
    slug: &str,
) -> Result<Vec<GroupMember>, ApiError> {
    let response = client.get(&format!("1.0/groups/{account}/{slug}/members"))?;
    decode_json(response)
}

/// Applies a desired member set to a group, one call per differing member.
///
/// Adds must answer 200 and removals 204; any other answer aborts the
/// sequence with the remaining members untouched.
fn reconcile_members(
    client: &BitbucketClient,
    account: &str,
    slug: &str,
    desired: &[String],
) -> Result<(), ApiError> {
    let current: Vec<String> = read_members(client, account, slug)?
        .into_iter()
        .map(|member| member.username)
        .collect();

    let (to_add, to_remove) = set_difference(desired, &current);
    tracing::debug!(?to_add, ?to_remove, group = slug, "reconciling group members");

    for username in &to_add {
        let response = client.put_empty(&member_endpoint(account, slug, username))?;
        expect_status(&response, 200, || {
            format!("failed to add member {username} to group {slug}")
        })?;
    }

    for username in &to_remove {
        let response = client.delete(&member_endpoint(account, slug, username))?;
        expect_status(&response, 204, || {
            format!("failed to remove member {username} from group {slug}")
        })?;
    }

    Ok(())
}

impl Reconciler for GroupResource {
    fn create(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let account = state.get_string("accountname");
        let name = state.get_string("name");

        // Only the name can be passed at creation time, and not as JSON.
        let response = client.post_form(&format!("1.0/groups/{account}"), &[("name", &name)])?;
        let group: Group = decode_json(response)?;

        let slug = group.slug.ok_or_else(|| {
            ApiError::Unexpected("group create response carried no slug".to_string())
        })?;
        state.set_string("slug", slug.clone());
        state.set_id(format!("{account}/{slug}"));

        // The remaining settings cannot be passed at creation time; push
        // them with a regular update, which also reconciles the members
        // and finishes with a read.
        self.update(client, state)
    }

    fn read(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        if let Some(id) = state.id().map(str::to_string) {
            let (account, slug) = split_composite_id(&id, "accountname/slug")?;
            state.set_string("accountname", account);
            state.set_string("slug", slug);
        }

        let account = state.get_string("accountname");
        let mut slug = state.get_string("slug");
        if slug.is_empty() {
            slug = state.get_string("name");
        }

        let group = match client.get(&group_endpoint(&account, &slug)) {
            Ok(response) => decode_json::<Group>(response)?,
            Err(ApiError::Api { status: 404, .. }) => {
                state.clear_id();
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        state.set_string("accountname", group.accountname.unwrap_or(account.clone()));
        state.set_string("slug", group.slug.unwrap_or(slug.clone()));
        state.set_string("name", group.name.unwrap_or_default());
        state.set_bool("auto_add", group.auto_add);
        state.set_string("permission", group.permission.unwrap_or_default());

        let members: Vec<String> = read_members(client, &account, &slug)?
            .into_iter()
            .map(|member| member.username)
            .collect();
        state.set_list("members", members);

        Ok(())
    }

    fn update(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let account = state.get_string("accountname");
        let slug = state.get_string("slug");

        let group = Group {
            accountname: Some(account.clone()),
            slug: Some(slug.clone()),
            name: Some(state.get_string("name")),
            auto_add: state.get_bool("auto_add"),
            permission: {
                let permission = state.get_string("permission");
                if permission.is_empty() {
                    None
                } else {
                    Some(permission)
                }
            },
        };
        client.put(&group_endpoint(&account, &slug), &group)?;

        let desired = state.get_list("members");
        reconcile_members(client, &account, &slug, &desired)?;

        self.read(client, state)
    }

    fn delete(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let account = state.get_string("accountname");
        let slug = state.get_string("slug");
        client.delete(&group_endpoint(&account, &slug))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(server: &mockito::Server) -> BitbucketClient {
        BitbucketClient::with_base_url(&server.url(), "tester", "app-pass").unwrap()
    }

    const GROUP_BODY: &str = r#"{
        "accountname": "team",
        "slug": "deployers",
        "name": "Deployers",
        "auto_add": false,
        "permission": "write"
    }"#;

    #[test]
    fn test_update_issues_one_add_and_one_remove() {
        let mut server = mockito::Server::new();

        // Desired members: a, b. Current members: b, c. The same listing
        // serves the diff and the final read.
        let members_body = r#"[{"username": "b"}, {"username": "c"}]"#;

        let group_put = server
            .mock("PUT", "/1.0/groups/team/deployers")
            .with_status(200)
            .with_body(GROUP_BODY)
            .create();
        let members_get = server
            .mock("GET", "/1.0/groups/team/deployers/members")
            .with_status(200)
            .with_body(members_body)
            .expect(2)
            .create();
        let add_a = server
            .mock("PUT", "/1.0/groups/team/deployers/members/a")
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create();
        let remove_c = server
            .mock("DELETE", "/1.0/groups/team/deployers/members/c")
            .with_status(204)
            .expect(1)
            .create();
        let group_get = server
            .mock("GET", "/1.0/groups/team/deployers")
            .with_status(200)
            .with_body(GROUP_BODY)
            .create();

        let client = client_for(&server);
        let mut state = ResourceState::new();
        state.set_id("team/deployers");
        state.set_string("accountname", "team");
        state.set_string("slug", "deployers");
        state.set_string("name", "Deployers");
        // Order deliberately scrambled: member lists are sets.
        state.set_list("members", vec!["b".to_string(), "a".to_string()]);

        GroupResource.update(&client, &mut state).unwrap();

        // Exactly one add for "a", exactly one remove for "c", nothing for "b".
        group_put.assert();
        members_get.assert();
        add_a.assert();
        remove_c.assert();
        group_get.assert();
    }

    #[test]
    fn test_failed_member_add_surfaces_error() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/1.0/groups/team/deployers/members")
            .with_status(200)
            .with_body("[]")
            .create();
        server
            .mock("PUT", "/1.0/groups/team/deployers/members/a")
            .with_status(202)
            .with_body("{}")
            .create();

        let client = client_for(&server);
        let err =
            reconcile_members(&client, "team", "deployers", &["a".to_string()]).unwrap_err();
        assert!(matches!(err, ApiError::Unexpected(_)));
    }

    #[test]
    fn test_create_posts_form_then_updates() {
        let mut server = mockito::Server::new();
        let form_post = server
            .mock("POST", "/1.0/groups/team")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body("name=Deployers")
            .with_status(200)
            .with_body(GROUP_BODY)
            .create();
        server
            .mock("PUT", "/1.0/groups/team/deployers")
            .with_status(200)
            .with_body(GROUP_BODY)
            .create();
        server
            .mock("GET", "/1.0/groups/team/deployers/members")
            .with_status(200)
            .with_body("[]")
            .create();
        server
            .mock("GET", "/1.0/groups/team/deployers")
            .with_status(200)
            .with_body(GROUP_BODY)
            .create();

        let client = client_for(&server);
        let mut state = ResourceState::new();
        state.set_string("accountname", "team");
        state.set_string("name", "Deployers");

        GroupResource.create(&client, &mut state).unwrap();

        assert_eq!(state.id(), Some("team/deployers"));
        assert_eq!(state.get_string("slug"), "deployers");
        assert_eq!(state.get_string("permission"), "write");
        form_post.assert();
    }
}

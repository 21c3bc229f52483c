//
//  bitbucket-provider
//  resources/branch_restriction.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Branch restriction reconciler.
//!
//! Maps the `bitbucket_branch_restriction` attribute set onto
//! `2.0/repositories/{owner}/{repository}/branch-restrictions`. The server
//! assigns a numeric id. A restriction pairs a kind (one of eleven
//! documented values) with a branch pattern, an optional numeric value,
//! and exemption lists of users and groups.
//!
//! Groups are declared as `owner/slug` strings in the attribute list and
//! expanded to the nested wire shape on write.

use serde::{Deserialize, Serialize};

use crate::api::{decode_json, ApiError, BitbucketClient};
use crate::resources::{fetch_optional, probe, split_composite_id, Reconciler};
use crate::state::ResourceState;
use crate::util::{escape_path_segment, one_of};

/// Restriction kinds the API accepts.
pub const RESTRICTION_KINDS: &[&str] = &[
    "require_tasks_to_be_completed",
    "require_passing_builds_to_merge",
    "force",
    "require_all_dependencies_merged",
    "push",
    "require_approvals_to_merge",
    "enforce_merge_checks",
    "restrict_merges",
    "reset_pullrequest_approvals_on_change",
    "delete",
    "require_default_reviewer_approvals_to_merge",
];

/// A branch restriction as the API represents it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchRestriction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Numeric threshold for kinds that take one (approval counts,
    /// build counts). Zero is treated as unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<RestrictionUser>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<RestrictionGroup>,
}

/// A user exempted from (or bound by) a restriction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestrictionUser {
    pub username: String,
}

/// A group in a restriction, owned by a user or team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestrictionGroup {
    pub slug: String,
    pub owner: RestrictionUser,
}

/// Reconciler for `bitbucket_branch_restriction`.
pub struct BranchRestrictionResource;

fn restriction_from_state(state: &ResourceState) -> Result<BranchRestriction, ApiError> {
    let users = state
        .get_list("users")
        .into_iter()
        .map(|username| RestrictionUser { username })
        .collect();

    let groups = state
        .get_list("groups")
        .iter()
        .map(|entry| {
            let (owner, slug) = split_composite_id(entry, "owner/slug")?;
            Ok(RestrictionGroup {
                slug: slug.to_string(),
                owner: RestrictionUser {
                    username: owner.to_string(),
                },
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(BranchRestriction {
        id: None,
        kind: Some(state.get_string("kind")),
        pattern: Some(state.get_string("pattern")),
        value: match state.get_int("value") {
            0 => None,
            value => Some(value),
        },
        users,
        groups,
    })
}

fn collection_endpoint(state: &ResourceState) -> String {
    format!(
        "2.0/repositories/{}/{}/branch-restrictions",
        state.get_string("owner"),
        state.get_string("repository")
    )
}

fn item_endpoint(state: &ResourceState, id: &str) -> String {
    format!("{}/{}", collection_endpoint(state), escape_path_segment(id))
}

impl Reconciler for BranchRestrictionResource {
    fn create(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let kind = state.get_string("kind");
        if let Some(problem) = one_of(&kind, RESTRICTION_KINDS) {
            return Err(ApiError::Validation(format!("kind: {problem}")));
        }

        let restriction = restriction_from_state(state)?;
        let response = client.post(&collection_endpoint(state), &restriction)?;

        let created: BranchRestriction = decode_json(response)?;
        let id = created.id.ok_or_else(|| {
            ApiError::Unexpected("branch restriction create response carried no id".to_string())
        })?;
        state.set_id(id.to_string());

        self.read(client, state)
    }

    fn read(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let Some(id) = state.id().map(str::to_string) else {
            return Ok(());
        };

        let Some(restriction) =
            fetch_optional::<BranchRestriction>(client, &item_endpoint(state, &id))?
        else {
            state.clear_id();
            return Ok(());
        };

        state.set_string("kind", restriction.kind.unwrap_or_default());
        state.set_string("pattern", restriction.pattern.unwrap_or_default());
        state.set_int("value", restriction.value.unwrap_or(0));
        state.set_list(
            "users",
            restriction.users.into_iter().map(|u| u.username).collect(),
        );
        state.set_list(
            "groups",
            restriction
                .groups
                .into_iter()
                .map(|g| format!("{}/{}", g.owner.username, g.slug))
                .collect(),
        );

        Ok(())
    }

    fn update(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let id = state.id().map(str::to_string).ok_or_else(|| {
            ApiError::InvalidId("branch restriction has no identifier".to_string())
        })?;

        let restriction = restriction_from_state(state)?;
        client.put(&item_endpoint(state, &id), &restriction)?;

        self.read(client, state)
    }

    fn delete(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let id = state.id().map(str::to_string).ok_or_else(|| {
            ApiError::InvalidId("branch restriction has no identifier".to_string())
        })?;

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

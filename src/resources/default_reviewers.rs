//
//  bitbucket-provider
//  resources/default_reviewers.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Default reviewers reconciler.
//!
//! Manages the set of default pull-request reviewers on a repository via
//! `2.0/repositories/{owner}/{repository}/default-reviewers`. The API has
//! no handle for the set as a whole — each reviewer is installed and
//! removed individually by an empty-body PUT / DELETE on the member
//! endpoint — so the identifier is the synthesized
//! `owner/repository/reviewers`.
//!
//! Reads walk the paginated collection to the end before returning: every
//! reviewer the server holds, across however many pages, appears exactly
//! once in the resulting list. Create and update both reduce to the same
//! symmetric set-difference reconciliation against the live server set.

use serde::{Deserialize, Serialize};

use crate::api::{ApiError, BitbucketClient};
use crate::resources::{collect_pages, expect_status, Reconciler};
use crate::state::ResourceState;
use crate::util::{escape_path_segment, set_difference};

/// One default reviewer as the paginated listing returns them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reviewer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default)]
    pub uuid: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Reconciler for `bitbucket_default_reviewers`.
pub struct DefaultReviewersResource;

fn collection_endpoint(state: &ResourceState) -> String {
    format!(
        "2.0/repositories/{}/{}/default-reviewers",
        state.get_string("owner"),
        state.get_string("repository")
    )
}

fn member_endpoint(state: &ResourceState, user: &str) -> String {
    format!("{}/{}", collection_endpoint(state), escape_path_segment(user))
}

/// Fetches the complete current reviewer set, across all pages.
fn current_reviewers(
    client: &BitbucketClient,
    state: &ResourceState,
) -> Result<Vec<String>, ApiError> {
    let reviewers: Vec<Reviewer> = collect_pages(client, &collection_endpoint(state))?;
    Ok(reviewers.into_iter().map(|reviewer| reviewer.uuid).collect())
}

/// Drives the server set toward the desired set, one call per differing
/// reviewer. Installs must answer 200 and removals 204.
fn reconcile_reviewers(
    client: &BitbucketClient,
    state: &ResourceState,
    desired: &[String],
) -> Result<(), ApiError> {
    let current = current_reviewers(client, state)?;
    let (to_add, to_remove) = set_difference(desired, &current);
    tracing::debug!(?to_add, ?to_remove, "reconciling default reviewers");

    for user in &to_add {
        let response = client.put_empty(&member_endpoint(state, user))?;
        expect_status(&response, 200, || {
            format!("failed to install default reviewer {user}")
        })?;
    }

    for user in &to_remove {
        let response = client.delete(&member_endpoint(state, user))?;
        expect_status(&response, 204, || {
            format!("failed to remove default reviewer {user}")
        })?;
    }

    Ok(())
}

impl Reconciler for DefaultReviewersResource {
    fn create(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let desired = state.get_list("reviewers");
        reconcile_reviewers(client, state, &desired)?;

        state.set_id(format!(
            "{}/{}/reviewers",
            state.get_string("owner"),
            state.get_string("repository")
        ));

        self.read(client, state)
    }

    fn read(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let reviewers = match current_reviewers(client, state) {
            Ok(reviewers) => reviewers,
            Err(ApiError::Api { status: 404, .. }) => {
                state.clear_id();
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        state.set_list("reviewers", reviewers);
        Ok(())
    }

    fn update(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        let desired = state.get_list("reviewers");
        reconcile_reviewers(client, state, &desired)?;
        self.read(client, state)
    }

    fn delete(&self, client: &BitbucketClient, state: &mut ResourceState) -> Result<(), ApiError> {
        for user in state.get_list("reviewers") {
            let response = client.delete(&member_endpoint(state, &user))?;
            expect_status(&response, 204, || {
                format!("failed to remove default reviewer {user}")
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(server: &mockito::Server) -> BitbucketClient {
        BitbucketClient::with_base_url(&server.url(), "tester", "app-pass").unwrap()
    }

    fn declared_state(reviewers: Vec<String>) -> ResourceState {
        let mut state = ResourceState::new();
        state.set_string("owner", "team");
        state.set_string("repository", "widget");
        state.set_list("reviewers", reviewers);
        state
    }

    #[test]
    fn test_read_accumulates_three_pages() {
        let mut server = mockito::Server::new();
        let base = "/2.0/repositories/team/widget/default-reviewers";

        server
            .mock("GET", base)
            .match_query(mockito::Matcher::UrlEncoded("page".into(), "1".into()))
            .with_status(200)
            .with_body(
                r#"{"values":[{"uuid":"{r1}"},{"uuid":"{r2}"}],"page":1,"next":"https://example.test/?page=2"}"#,
            )
            .create();
        server
            .mock("GET", base)
            .match_query(mockito::Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(200)
            .with_body(
                r#"{"values":[{"uuid":"{r3}"},{"uuid":"{r4}"}],"page":2,"next":"https://example.test/?page=3"}"#,
            )
            .create();
        server
            .mock("GET", base)
            .match_query(mockito::Matcher::UrlEncoded("page".into(), "3".into()))
            .with_status(200)
            .with_body(r#"{"values":[{"uuid":"{r5}"}],"page":3}"#)
            .create();

        let client = client_for(&server);
        let mut state = declared_state(vec![]);
        state.set_id("team/widget/reviewers");

        DefaultReviewersResource.read(&client, &mut state).unwrap();

        // All pages accumulated, no duplicates, no missing entries.
        assert_eq!(
            state.get_list("reviewers"),
            vec!["{r1}", "{r2}", "{r3}", "{r4}", "{r5}"]
        );
    }

    #[test]
    fn test_update_adds_and_removes_by_set_difference() {
        let mut server = mockito::Server::new();
        let base = "/2.0/repositories/team/widget/default-reviewers";

        // Server currently holds b and c; desired is a and b. The same
        // single-page listing serves both the diff and the final read.
        server
            .mock("GET", base)
            .match_query(mockito::Matcher::UrlEncoded("page".into(), "1".into()))
            .with_status(200)
            .with_body(r#"{"values":[{"uuid":"b"},{"uuid":"c"}],"page":1}"#)
            .expect(2)
            .create();
        let add_a = server
            .mock("PUT", &format!("{base}/a")[..])
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create();
        let remove_c = server
            .mock("DELETE", &format!("{base}/c")[..])
            .with_status(204)
            .expect(1)
            .create();

        let client = client_for(&server);
        let mut state = declared_state(vec!["a".to_string(), "b".to_string()]);
        state.set_id("team/widget/reviewers");

        DefaultReviewersResource.update(&client, &mut state).unwrap();

        add_a.assert();
        remove_c.assert();
    }

    #[test]
    fn test_delete_removes_every_reviewer() {
        let mut server = mockito::Server::new();
        let base = "/2.0/repositories/team/widget/default-reviewers";

        let remove_a = server
            .mock("DELETE", &format!("{base}/a")[..])
            .with_status(204)
            .expect(1)
            .create();
        let remove_b = server
            .mock("DELETE", &format!("{base}/b")[..])
            .with_status(204)
            .expect(1)
            .create();

        let client = client_for(&server);
        let mut state = declared_state(vec!["a".to_string(), "b".to_string()]);
        state.set_id("team/widget/reviewers");

        DefaultReviewersResource.delete(&client, &mut state).unwrap();
        remove_a.assert();
        remove_b.assert();
    }
}

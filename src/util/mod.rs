//
//  bitbucket-provider
//  util/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Utility functions shared by the reconcilers:
//!
//! - SSH public key validation in OpenSSH `authorized_keys` format
//! - Symmetric set difference for membership reconciliation
//! - Path-segment escaping for server-assigned identifiers in URLs
//! - `one_of` value validation for enumerated attributes

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

/// Everything outside the unreserved set is escaped when an identifier is
/// interpolated into a path: UUIDs arrive wrapped in `{}` and usernames may
/// carry `@`.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

static BASE64_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[-A-Za-z0-9+/=]+$").expect("base64 field pattern"));

/// Key type prefixes accepted in `authorized_keys` material.
const KEY_TYPES: &[&str] = &["ssh-ecdsa", "ssh-rsa", "ssh-ed25519"];

/// Validates an SSH public key in OpenSSH `authorized_keys` format.
///
/// A valid key has at least two space-separated fields: a recognized type
/// prefix (`ssh-rsa`, `ssh-ed25519`, `ssh-ecdsa`) and a base64-encoded
/// body. A third comment field is allowed and ignored.
///
/// # Returns
///
/// All problems found, as human-readable messages; an empty vector means
/// the key is valid. Checks past the field count are accumulated rather
/// than short-circuited, so a key with a bad prefix *and* a bad body
/// reports both.
///
/// # Example
///
/// ```rust
/// use bitbucket_provider::util::validate_ssh_key;
///
/// let key = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIKqP3Cr632C2dNhhgKVcon4ldUSAeKiku2yP9O9/bDtY";
/// assert!(validate_ssh_key(key).is_empty());
///
/// assert_eq!(validate_ssh_key("not-a-key").len(), 1);
/// ```
pub fn validate_ssh_key(key: &str) -> Vec<String> {
    let fields: Vec<&str> = key.split(' ').collect();
    if fields.len() < 2 {
        return vec!["key should be in OpenSSH authorized_keys format".to_string()];
    }

    let mut errors = Vec::new();

    if !KEY_TYPES.contains(&fields[0]) {
        errors.push(format!(
            "key should start with one of {}, got '{}'",
            KEY_TYPES.join(", "),
            fields[0]
        ));
    }

    if !BASE64_FIELD.is_match(fields[1]) {
        errors.push("key body is not base64-encoded".to_string());
    }

    errors
}

/// Splits `authorized_keys` material into key text and comment.
///
/// The key text is the first two fields (type prefix and body); everything
/// in the third field, when present, is the comment. Run
/// [`validate_ssh_key`] first; input with fewer than two fields yields the
/// whole string as key text and an empty comment.
pub fn split_authorized_key(raw: &str) -> (String, String) {
    let fields: Vec<&str> = raw.split(' ').collect();
    let key = fields.iter().take(2).copied().collect::<Vec<_>>().join(" ");
    let comment = fields.get(2).map(|c| c.to_string()).unwrap_or_default();
    (key, comment)
}

/// Joins key text and comment back into `authorized_keys` material.
pub fn join_authorized_key(key: &str, comment: &str) -> String {
    if comment.is_empty() {
        key.to_string()
    } else {
        format!("{key} {comment}")
    }
}

/// Computes the symmetric set difference between a desired and a current
/// membership.
///
/// # Returns
///
/// `(to_add, to_remove)`: members present only in `desired`, and members
/// present only in `current`, both sorted. Element order in the inputs is
/// not significant and duplicates collapse; a member present on both sides
/// appears in neither output.
///
/// # Example
///
/// ```rust
/// use bitbucket_provider::util::set_difference;
///
/// let desired = vec!["a".to_string(), "b".to_string()];
/// let current = vec!["c".to_string(), "b".to_string()];
/// let (add, remove) = set_difference(&desired, &current);
/// assert_eq!(add, vec!["a"]);
/// assert_eq!(remove, vec!["c"]);
/// ```
pub fn set_difference(desired: &[String], current: &[String]) -> (Vec<String>, Vec<String>) {
    let desired: BTreeSet<&str> = desired.iter().map(String::as_str).collect();
    let current: BTreeSet<&str> = current.iter().map(String::as_str).collect();

    let to_add = desired.difference(&current).map(|m| m.to_string()).collect();
    let to_remove = current.difference(&desired).map(|m| m.to_string()).collect();

    (to_add, to_remove)
}

/// Escapes a value for use as a single URL path segment.
///
/// Server-assigned identifiers are not URL-safe as-is: UUIDs come wrapped
/// in braces and usernames may contain reserved characters.
pub fn escape_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Validates that a value is one of an allowed set.
///
/// # Returns
///
/// `None` when the value is allowed, otherwise an error message naming the
/// allowed values.
pub fn one_of(value: &str, allowed: &[&str]) -> Option<String> {
    if allowed.contains(&value) {
        None
    } else {
        Some(format!(
            "'{}' is not one of the allowed values: {}",
            value,
            allowed.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_KEYS: &[&str] = &[
        "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIKqP3Cr632C2dNhhgKVcon4ldUSAeKiku2yP9O9/bDtY user@myhost",
        "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIKqP3Cr632C2dNhhgKVcon4ldUSAeKiku2yP9O9/bDtY",
        "ssh-rsa AAAAC3NzaC1lZDI1NTE5AAAAIKqP3Cr632C2dNhhgKVcon4ldUSAeKiku2yP9O9/bDtY",
        "ssh-ecdsa AAAAC3NzaC1lZDI1NTE5AAAAIKqP3Cr632C2dNhhgKVcon4ldUSAeKiku2yP9O9/bDtY",
    ];

    const INVALID_KEYS: &[&str] = &[
        "",
        "ssh-notakeytype AAAAC3NzaC1lZDI1NTE5AAAAIKqP3Cr632C2dNhhgKVcon4ldUSAeKiku2yP9O9/bDtY user@myhost",
        "ssh-ed25519 @@@@@@@@@@@ user@myhost",
    ];

    #[test]
    fn test_valid_keys_report_no_errors() {
        for key in VALID_KEYS {
            assert!(validate_ssh_key(key).is_empty(), "key '{key}' should be valid");
        }
    }

    #[test]
    fn test_invalid_keys_report_errors() {
        for key in INVALID_KEYS {
            assert!(!validate_ssh_key(key).is_empty(), "key '{key}' should not be valid");
        }
    }

    #[test]
    fn test_bad_prefix_and_bad_body_both_reported() {
        let errors = validate_ssh_key("ssh-notakeytype @@@ user@myhost");
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_split_and_join_authorized_key() {
        let (key, comment) = split_authorized_key("ssh-rsa AAAAB3NzaC1yc2E user@host");
        assert_eq!(key, "ssh-rsa AAAAB3NzaC1yc2E");
        assert_eq!(comment, "user@host");
        assert_eq!(join_authorized_key(&key, &comment), "ssh-rsa AAAAB3NzaC1yc2E user@host");

        let (key, comment) = split_authorized_key("ssh-rsa AAAAB3NzaC1yc2E");
        assert_eq!(comment, "");
        // No trailing space when the comment is empty.
        assert_eq!(join_authorized_key(&key, &comment), "ssh-rsa AAAAB3NzaC1yc2E");
    }

    #[test]
    fn test_set_difference_is_symmetric_and_order_free() {
        let desired = vec!["b".to_string(), "a".to_string()];
        let current = vec!["c".to_string(), "b".to_string()];
        let (add, remove) = set_difference(&desired, &current);
        assert_eq!(add, vec!["a"]);
        assert_eq!(remove, vec!["c"]);

        // Identical sets in different orders produce no work.
        let (add, remove) = set_difference(
            &["x".to_string(), "y".to_string()],
            &["y".to_string(), "x".to_string()],
        );
        assert!(add.is_empty());
        assert!(remove.is_empty());
    }

    #[test]
    fn test_escape_path_segment() {
        assert_eq!(
            escape_path_segment("{9fa2b8e0-1c11-4be4-b335-ddf4fc3b4a0b}"),
            "%7B9fa2b8e0-1c11-4be4-b335-ddf4fc3b4a0b%7D"
        );
        assert_eq!(escape_path_segment("plain-slug_1.0~x"), "plain-slug_1.0~x");
        assert_eq!(escape_path_segment("a/b"), "a%2Fb");
    }

    #[test]
    fn test_one_of() {
        assert!(one_of("Staging", &["Test", "Staging", "Production"]).is_none());
        let message = one_of("QA", &["Test", "Staging", "Production"]).unwrap();
        assert!(message.contains("QA"));
        assert!(message.contains("Staging"));
    }
}

//
//  bitbucket-provider
//  state/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/03/14.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Declarative Resource State
//!
//! The reconcilers do not talk to the calling framework directly; they
//! consume and mutate a [`ResourceState`]: a flat, typed attribute map plus
//! an identifier slot. This is the whole contract between the provider core
//! and whatever drives it — the surrounding plugin machinery (lifecycle,
//! validation, diffing) stays on the other side of it.
//!
//! ## Semantics
//!
//! - Getters return zero values for absent attributes (empty string,
//!   `false`, `0`, empty list), so reconcilers can read optional
//!   attributes without ceremony.
//! - The identifier, once set, keys every subsequent read/update/delete.
//!   Clearing it is the `present -> absent` transition: a resource whose
//!   read sees a 404 clears its identifier and is treated as gone.
//! - Attributes the API did not return are left untouched on read; a read
//!   never silently blanks declared configuration.
//!
//! # Example
//!
//! ```rust
//! use bitbucket_provider::state::ResourceState;
//!
//! let mut state = ResourceState::new();
//! state.set_string("owner", "my-team");
//! state.set_bool("is_private", true);
//! state.set_id("my-team/my-repo");
//!
//! assert_eq!(state.get_string("owner"), "my-team");
//! assert_eq!(state.get_string("missing"), "");
//! assert!(state.is_present());
//!
//! state.clear_id();
//! assert!(!state.is_present());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single typed attribute value.
///
/// The four shapes cover everything the Bitbucket resources declare:
/// scalar strings, booleans, integers, and lists of strings (member sets,
/// event sets, reviewer sets). Lists carry no order significance for the
/// membership-style resources; reconcilers compare them as sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Attribute {
    /// A string value.
    String(String),
    /// A boolean value.
    Bool(bool),
    /// An integer value.
    Int(i64),
    /// A list of strings.
    List(Vec<String>),
}

/// The declarative attribute set for one resource instance.
///
/// Holds the caller-declared attributes, the computed attributes written
/// back by reads, and the resource identifier. One `ResourceState` is
/// owned by one resource instance; reconcilers receive it mutably and
/// write API-derived values back through the typed setters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    /// The resource identifier; `None` while the resource is absent.
    id: Option<String>,
    /// Named attribute values.
    attrs: BTreeMap<String, Attribute>,
}

impl ResourceState {
    /// Creates an empty state with no identifier and no attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the resource identifier, if the resource is present.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Sets the resource identifier, marking the resource present.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Clears the resource identifier, marking the resource absent.
    ///
    /// This is how a reconciler reports "gone" after a 404 on read; the
    /// caller reacts by scheduling re-creation rather than deletion.
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// Checks whether the resource currently has an identifier.
    pub fn is_present(&self) -> bool {
        self.id.is_some()
    }

    /// Returns the raw attribute, if set.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attrs.get(name)
    }

    /// Sets a raw attribute value.
    pub fn set(&mut self, name: impl Into<String>, value: Attribute) {
        self.attrs.insert(name.into(), value);
    }

    /// Returns a string attribute, or `""` when absent or not a string.
    pub fn get_string(&self, name: &str) -> String {
        match self.attrs.get(name) {
            Some(Attribute::String(value)) => value.clone(),
            _ => String::new(),
        }
    }

    /// Returns a boolean attribute, or `false` when absent or not a bool.
    pub fn get_bool(&self, name: &str) -> bool {
        matches!(self.attrs.get(name), Some(Attribute::Bool(true)))
    }

    /// Returns an integer attribute, or `0` when absent or not an integer.
    pub fn get_int(&self, name: &str) -> i64 {
        match self.attrs.get(name) {
            Some(Attribute::Int(value)) => *value,
            _ => 0,
        }
    }

    /// Returns a list attribute, or an empty list when absent or not a list.
    pub fn get_list(&self, name: &str) -> Vec<String> {
        match self.attrs.get(name) {
            Some(Attribute::List(values)) => values.clone(),
            _ => Vec::new(),
        }
    }

    /// Sets a string attribute.
    pub fn set_string(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.set(name, Attribute::String(value.into()));
    }

    /// Sets a boolean attribute.
    pub fn set_bool(&mut self, name: impl Into<String>, value: bool) {
        self.set(name, Attribute::Bool(value));
    }

    /// Sets an integer attribute.
    pub fn set_int(&mut self, name: impl Into<String>, value: i64) {
        self.set(name, Attribute::Int(value));
    }

    /// Sets a list attribute.
    pub fn set_list(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.set(name, Attribute::List(values));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_values_for_absent_attributes() {
        let state = ResourceState::new();
        assert_eq!(state.get_string("owner"), "");
        assert!(!state.get_bool("is_private"));
        assert_eq!(state.get_int("value"), 0);
        assert!(state.get_list("members").is_empty());
    }

    #[test]
    fn test_typed_round_trip() {
        let mut state = ResourceState::new();
        state.set_string("owner", "team");
        state.set_bool("active", true);
        state.set_int("value", 2);
        state.set_list("members", vec!["a".to_string(), "b".to_string()]);

        assert_eq!(state.get_string("owner"), "team");
        assert!(state.get_bool("active"));
        assert_eq!(state.get_int("value"), 2);
        assert_eq!(state.get_list("members"), vec!["a", "b"]);
    }

    #[test]
    fn test_mismatched_type_reads_as_zero_value() {
        let mut state = ResourceState::new();
        state.set_string("value", "not a number");
        assert_eq!(state.get_int("value"), 0);
    }

    #[test]
    fn test_identifier_lifecycle() {
        let mut state = ResourceState::new();
        assert!(!state.is_present());

        state.set_id("team/repo");
        assert_eq!(state.id(), Some("team/repo"));
        assert!(state.is_present());

        state.clear_id();
        assert_eq!(state.id(), None);
        assert!(!state.is_present());
    }
}

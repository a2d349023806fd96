//! Namespace alias dictionary.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use log::debug;

use crate::{Error, Result};

/// Two-way mapping between namespace aliases and namespace URIs.
///
/// Each URI maps to exactly one alias and each alias to exactly one URI.
/// Aliases can be seeded before a parse; the parser then adds one alias per
/// newly declared URI, keeping the document's prefix when it is free and
/// otherwise appending the first free numeric suffix starting at 2.
#[derive(Debug, Clone, Default)]
pub struct NamespaceDictionary {
    alias_to_uri: BTreeMap<String, String>,
    uri_to_alias: HashMap<String, String>,
}

impl NamespaceDictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mappings.
    pub fn len(&self) -> usize {
        self.alias_to_uri.len()
    }

    /// Check if the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.alias_to_uri.is_empty()
    }

    /// Map `alias` to `uri`, removing any previous mapping of either.
    pub fn set(&mut self, alias: impl Into<String>, uri: impl Into<String>) -> &mut Self {
        let alias = alias.into();
        let uri = uri.into();
        if let Some(old_uri) = self.alias_to_uri.remove(&alias) {
            self.uri_to_alias.remove(&old_uri);
        }
        if let Some(old_alias) = self.uri_to_alias.remove(&uri) {
            self.alias_to_uri.remove(&old_alias);
        }
        self.alias_to_uri.insert(alias.clone(), uri.clone());
        self.uri_to_alias.insert(uri, alias);
        self
    }

    /// Alias mapped to `uri`.
    pub fn alias_for_uri(&self, uri: &str) -> Option<&str> {
        self.uri_to_alias.get(uri).map(String::as_str)
    }

    /// URI mapped to `alias`.
    pub fn uri_for_alias(&self, alias: &str) -> Option<&str> {
        self.alias_to_uri.get(alias).map(String::as_str)
    }

    /// Alias mapped to `uri`, failing for URIs that were never declared.
    ///
    /// The empty URI (no namespace) maps to the empty alias unless it was
    /// mapped explicitly.
    pub fn alias_for_uri_or_err(&self, uri: &str) -> Result<&str> {
        match self.alias_for_uri(uri) {
            Some(alias) => Ok(alias),
            None if uri.is_empty() => Ok(""),
            None => Err(Error::UnknownNamespace {
                uri: uri.to_owned(),
            }),
        }
    }

    /// Register `uri`, returning its alias.
    ///
    /// URIs that already have an alias keep it. Otherwise `suggested_prefix`
    /// (empty for a default namespace declaration) is used, suffixed with the
    /// first free number starting at 2 if another URI holds it.
    pub fn declare(&mut self, uri: &str, suggested_prefix: &str) -> &str {
        if !self.uri_to_alias.contains_key(uri) {
            let mut alias = suggested_prefix.to_owned();
            let mut suffix = 1;
            while self.alias_to_uri.contains_key(&alias) {
                suffix += 1;
                alias = format!("{}{}", suggested_prefix, suffix);
            }
            debug!("namespace {:?} declared as alias {:?}", uri, alias);
            self.set(alias, uri);
        }
        self.alias_for_uri(uri).unwrap_or_default()
    }

    /// Mappings ordered by alias.
    pub fn alias_to_uri(&self) -> &BTreeMap<String, String> {
        &self.alias_to_uri
    }

    /// Mappings keyed by URI.
    pub fn uri_to_alias(&self) -> &HashMap<String, String> {
        &self.uri_to_alias
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_both_sides() {
        let mut dictionary = NamespaceDictionary::new();
        dictionary.set("a", "urn:one");
        dictionary.set("a", "urn:two");
        assert_eq!(dictionary.uri_for_alias("a"), Some("urn:two"));
        assert_eq!(dictionary.alias_for_uri("urn:one"), None);

        dictionary.set("b", "urn:two");
        assert_eq!(dictionary.uri_for_alias("a"), None);
        assert_eq!(dictionary.alias_for_uri("urn:two"), Some("b"));
        assert_eq!(dictionary.len(), 1);
    }

    #[test]
    fn test_declare_keeps_first_alias() {
        let mut dictionary = NamespaceDictionary::new();
        assert_eq!(dictionary.declare("urn:atom", ""), "");
        assert_eq!(dictionary.declare("urn:atom", "atom"), "");
    }

    #[test]
    fn test_declare_suffixes_collisions() {
        let mut dictionary = NamespaceDictionary::new();
        assert_eq!(dictionary.declare("urn:one", "gd"), "gd");
        assert_eq!(dictionary.declare("urn:two", "gd"), "gd2");
        assert_eq!(dictionary.declare("urn:three", "gd"), "gd3");
        assert_eq!(dictionary.declare("urn:four", ""), "");
        assert_eq!(dictionary.declare("urn:five", ""), "2");

        let aliases: Vec<_> = dictionary.alias_to_uri().keys().map(String::as_str).collect();
        assert_eq!(aliases, ["", "2", "gd", "gd2", "gd3"]);
    }

    #[test]
    fn test_unknown_namespace() {
        let mut dictionary = NamespaceDictionary::new();
        assert_eq!(dictionary.alias_for_uri_or_err("").unwrap(), "");
        assert!(matches!(
            dictionary.alias_for_uri_or_err("urn:missing"),
            Err(Error::UnknownNamespace { .. })
        ));

        dictionary.set("none", "");
        assert_eq!(dictionary.alias_for_uri_or_err("").unwrap(), "none");
    }
}

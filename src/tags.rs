use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_KEY_LENGTH: usize = 128;
pub const MAX_VALUE_LENGTH: usize = 256;

#[derive(Debug, Error, PartialEq)]
pub enum TagError {
    #[error("tags must be a JSON object")]
    NotAnObject,

    #[error("tag '{key}' must have a string value")]
    NonStringValue { key: String },

    #[error("tag key must not be empty")]
    EmptyKey,

    #[error("tag key '{key}' is {len} characters, limit is 128")]
    KeyTooLong { key: String, len: usize },

    #[error("value of tag '{key}' is {len} characters, limit is 256")]
    ValueTooLong { key: String, len: usize },

    #[error("invalid tag '{0}', expected KEY=VALUE")]
    InvalidPair(String),
}

/// A set of resource tags keyed by tag key.
///
/// Keys are kept sorted so every wire request built from a set lists them in
/// the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyValueTags(BTreeMap<String, String>);

impl KeyValueTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates an untyped JSON tag map. `null` is treated as no tags.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, TagError> {
        let object = match value {
            serde_json::Value::Null => return Ok(Self::new()),
            serde_json::Value::Object(object) => object,
            _ => return Err(TagError::NotAnObject),
        };

        let mut tags = Self::new();
        for (key, value) in object {
            let value = value.as_str().ok_or_else(|| TagError::NonStringValue {
                key: key.clone(),
            })?;
            tags.insert(key.clone(), value.to_string());
        }

        tags.validate()?;
        Ok(tags)
    }

    pub fn validate(&self) -> Result<(), TagError> {
        for (key, value) in &self.0 {
            if key.is_empty() {
                return Err(TagError::EmptyKey);
            }

            let key_len = key.chars().count();
            if key_len > MAX_KEY_LENGTH {
                return Err(TagError::KeyTooLong {
                    key: key.clone(),
                    len: key_len,
                });
            }

            let value_len = value.chars().count();
            if value_len > MAX_VALUE_LENGTH {
                return Err(TagError::ValueTooLong {
                    key: key.clone(),
                    len: value_len,
                });
            }
        }
        Ok(())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Tags present here but absent from `new`.
    pub fn removed(&self, new: &KeyValueTags) -> KeyValueTags {
        self.0
            .iter()
            .filter(|(key, _)| !new.0.contains_key(*key))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Tags in `new` that are missing here or carry a different value.
    pub fn updated(&self, new: &KeyValueTags) -> KeyValueTags {
        new.0
            .iter()
            .filter(|(key, value)| self.0.get(*key) != Some(*value))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Drops every tag whose key starts with one of `prefixes`.
    pub fn ignore_prefixes<S: AsRef<str>>(&self, prefixes: &[S]) -> KeyValueTags {
        self.0
            .iter()
            .filter(|(key, _)| !prefixes.iter().any(|p| key.starts_with(p.as_ref())))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn ignore_keys<S: AsRef<str>>(&self, keys: &[S]) -> KeyValueTags {
        self.0
            .iter()
            .filter(|(key, _)| !keys.iter().any(|k| k.as_ref() == key.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Union of both sets; `other` wins on key collisions.
    pub fn merge(&self, other: &KeyValueTags) -> KeyValueTags {
        let mut merged = self.0.clone();
        merged.extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self(merged)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyValueTags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a KeyValueTags {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Parses a `KEY=VALUE` command line pair. The value may be empty.
pub fn parse_pair(input: &str) -> Result<(String, String), TagError> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| TagError::InvalidPair(input.to_string()))?;

    if key.is_empty() {
        return Err(TagError::InvalidPair(input.to_string()));
    }

    Ok((key.to_string(), value.to_string()))
}

/// The calls needed to move a resource from one tag set to another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagDiff {
    pub removed: Vec<String>,
    pub updated: KeyValueTags,
}

impl TagDiff {
    /// Keys starting with any of `reserved_prefixes` never make it into the diff.
    pub fn compute<S: AsRef<str>>(
        old: &KeyValueTags,
        new: &KeyValueTags,
        reserved_prefixes: &[S],
    ) -> Self {
        Self {
            removed: old.removed(new).ignore_prefixes(reserved_prefixes).keys(),
            updated: old.updated(new).ignore_prefixes(reserved_prefixes),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.updated.is_empty()
    }
}

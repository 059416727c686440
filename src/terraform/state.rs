use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::tags::{KeyValueTags, TagError};

const SUPPORTED_VERSION: u64 = 4;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read state: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid state file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported state version {0}, only version 4 is supported")]
    UnsupportedVersion(u64),

    #[error("invalid resource address: '{0}'")]
    InvalidAddress(String),

    #[error("resource not found in state: {0}")]
    ResourceNotFound(String),

    #[error("no matching instance in state: {0}")]
    InstanceNotFound(String),

    #[error("{0} has no 'arn' attribute")]
    MissingIdentifier(String),

    #[error("invalid tags on {address}: {source}")]
    Tags {
        address: String,
        #[source]
        source: TagError,
    },
}

/// Terraform state file (format version 4).
///
/// Only the parts needed to recover a resource's identifier and its last
/// applied tags are modelled.
#[derive(Debug, Deserialize)]
pub struct TerraformState {
    pub version: u64,
    #[serde(default)]
    pub resources: Vec<StateResource>,
}

#[derive(Debug, Deserialize)]
pub struct StateResource {
    #[serde(default)]
    pub module: Option<String>,
    pub mode: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub name: String,
    #[serde(default)]
    pub instances: Vec<StateInstance>,
}

impl StateResource {
    pub fn address(&self) -> String {
        match &self.module {
            Some(module) => format!("{}.{}.{}", module, self.type_, self.name),
            None => format!("{}.{}", self.type_, self.name),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StateInstance {
    #[serde(default)]
    pub index_key: Option<serde_json::Value>,
    #[serde(default)]
    pub attributes: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceTags {
    pub identifier: String,
    pub tags: KeyValueTags,
}

#[derive(Debug, PartialEq)]
enum IndexKey {
    Number(u64),
    Name(String),
}

impl IndexKey {
    fn matches(&self, key: &serde_json::Value) -> bool {
        match self {
            Self::Number(n) => key.as_u64() == Some(*n),
            Self::Name(name) => key.as_str() == Some(name.as_str()),
        }
    }
}

// NOTE: `aws_x.name[0]` and `aws_x.name["key"]`; module indexes are part of the base
fn parse_address(address: &str) -> Result<(&str, Option<IndexKey>), StateError> {
    let invalid = || StateError::InvalidAddress(address.to_string());

    let Some(without_bracket) = address.strip_suffix(']') else {
        return Ok((address, None));
    };

    let open = without_bracket.rfind('[').ok_or_else(invalid)?;
    let base = &without_bracket[..open];
    let inner = &without_bracket[open + 1..];

    let key = if let Some(name) = inner
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        IndexKey::Name(name.to_string())
    } else {
        IndexKey::Number(inner.parse().map_err(|_| invalid())?)
    };

    if base.is_empty() {
        return Err(invalid());
    }

    Ok((base, Some(key)))
}

impl TerraformState {
    pub fn from_json(contents: &str) -> Result<Self, StateError> {
        let state: Self = serde_json::from_str(contents)?;
        if state.version != SUPPORTED_VERSION {
            return Err(StateError::UnsupportedVersion(state.version));
        }
        Ok(state)
    }

    pub fn load(path: &Path) -> Result<Self, StateError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn find(&self, address: &str) -> Result<&StateInstance, StateError> {
        let (base, index) = parse_address(address)?;

        let resource = self
            .resources
            .iter()
            .filter(|r| r.mode == "managed")
            .find(|r| r.address() == base)
            .ok_or_else(|| StateError::ResourceNotFound(base.to_string()))?;

        resource
            .instances
            .iter()
            .find(|instance| match (&index, &instance.index_key) {
                (None, None) => true,
                (Some(wanted), Some(key)) => wanted.matches(key),
                _ => false,
            })
            .ok_or_else(|| StateError::InstanceNotFound(address.to_string()))
    }

    /// ARN and last applied tags of the instance at `address`.
    ///
    /// The tagging APIs address resources by ARN only, so an instance whose
    /// state carries just an `id` yields `MissingIdentifier`. Prefers `tags_all` (resource tags plus provider default tags) over `tags`.
    pub fn resource_tags(&self, address: &str) -> Result<ResourceTags, StateError> {
        let attributes = &self.find(address)?.attributes;

        let identifier = attributes
            .get("arn")
            .and_then(|v| v.as_str())
            .filter(|arn| !arn.is_empty())
            .ok_or_else(|| StateError::MissingIdentifier(address.to_string()))?;

        let null = serde_json::Value::Null;
        let raw_tags = ["tags_all", "tags"]
            .iter()
            .filter_map(|name| attributes.get(*name))
            .find(|value| !value.is_null())
            .unwrap_or(&null);

        let tags = KeyValueTags::from_json(raw_tags).map_err(|source| StateError::Tags {
            address: address.to_string(),
            source,
        })?;

        tracing::debug!(address, identifier, count = tags.len(), "read tags from state");

        Ok(ResourceTags {
            identifier: identifier.to_string(),
            tags,
        })
    }
}

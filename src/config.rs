use std::path::{Path, PathBuf};

use aws_config::{BehaviorVersion, Region, SdkConfig};
use serde::{Deserialize, Serialize};

use crate::error::TagsyncError;
use crate::services::ServiceName;
use crate::tags::KeyValueTags;

const CONFIG_DIR: &str = "tagsync";
const CONFIG_FILE: &str = "config.json";

/// Tag keys that are never read, planned or written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct IgnoreConfig {
    pub keys: Vec<String>,
    pub key_prefixes: Vec<String>,
}

impl IgnoreConfig {
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.key_prefixes.is_empty()
    }

    pub fn apply(&self, tags: &KeyValueTags) -> KeyValueTags {
        if self.is_empty() {
            return tags.clone();
        }
        tags.ignore_keys(self.keys.as_slice())
            .ignore_prefixes(self.key_prefixes.as_slice())
    }
}

/// Provider-level tag settings shared by every resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct TagConfig {
    pub default_tags: KeyValueTags,
    pub ignore_tags: IgnoreConfig,
}

impl TagConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Loads `path`, or the default location when `path` is `None`.
    ///
    /// An explicit path must exist; a missing default file yields an empty config.
    pub fn load(path: Option<&Path>) -> Result<Self, TagsyncError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    tracing::debug!("no tag config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let contents = std::fs::read_to_string(&path).map_err(|e| {
            TagsyncError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let config = Self::from_json_str(&contents)?;
        tracing::debug!(
            path = %path.display(),
            default_tags = config.default_tags.len(),
            "loaded tag config"
        );
        Ok(config)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, TagsyncError> {
        let config: Self = serde_json::from_str(contents)
            .map_err(|e| TagsyncError::Config(format!("invalid tag config: {}", e)))?;
        config.default_tags.validate()?;
        Ok(config)
    }

    pub fn with_default_tags(mut self, tags: &KeyValueTags) -> Self {
        self.default_tags = self.default_tags.merge(tags);
        self
    }

    pub fn with_ignored(mut self, keys: Vec<String>, key_prefixes: Vec<String>) -> Self {
        self.ignore_tags.keys.extend(keys);
        self.ignore_tags.key_prefixes.extend(key_prefixes);
        self
    }

    /// Default tags overlaid with the resource's own tags, minus ignored keys.
    pub fn desired_tags(&self, resource_tags: &KeyValueTags) -> KeyValueTags {
        self.ignore_tags
            .apply(&self.default_tags.merge(resource_tags))
    }

    /// Remote tags as the user sees them: no system keys, no ignored keys.
    pub fn read_tags(&self, service: ServiceName, remote: &KeyValueTags) -> KeyValueTags {
        self.ignore_tags
            .apply(&remote.ignore_prefixes(service.system_prefixes()))
    }
}

/// Reads a JSON object of string tags, as written by hand or by `list --output json`.
pub fn read_tag_file(path: &Path) -> Result<KeyValueTags, TagsyncError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        TagsyncError::Config(format!("failed to read {}: {}", path.display(), e))
    })?;
    let value: serde_json::Value = serde_json::from_str(&contents)?;
    Ok(KeyValueTags::from_json(&value)?)
}

/// Standard AWS environment resolution with optional overrides.
pub async fn load_sdk_config(region: Option<String>, endpoint_url: Option<String>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = region {
        loader = loader.region(Region::new(region));
    }
    if let Some(endpoint_url) = endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }

    loader.load().await
}

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::SdkConfig;

use super::{BoxError, ServiceName, TaggingService};
use crate::tags::KeyValueTags;

/// Glue exchanges tags as a plain string map rather than a list of pairs.
pub struct GlueService {
    client: aws_sdk_glue::Client,
}

impl GlueService {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self::from_client(aws_sdk_glue::Client::new(sdk_config))
    }

    /// NOTE: Primarily used for testing against mock endpoints.
    pub fn from_client(client: aws_sdk_glue::Client) -> Self {
        Self { client }
    }
}

pub fn tags(tags: &KeyValueTags) -> HashMap<String, String> {
    tags.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn key_value_tags(tags: &HashMap<String, String>) -> KeyValueTags {
    tags.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
}

#[async_trait]
impl TaggingService for GlueService {
    fn name(&self) -> ServiceName {
        ServiceName::Glue
    }

    async fn list_tags(&self, identifier: &str) -> Result<KeyValueTags, BoxError> {
        let output = self
            .client
            .get_tags()
            .resource_arn(identifier)
            .send()
            .await?;

        Ok(output.tags().map(key_value_tags).unwrap_or_default())
    }

    async fn tag_resource(&self, identifier: &str, tags: &KeyValueTags) -> Result<(), BoxError> {
        self.client
            .tag_resource()
            .resource_arn(identifier)
            .set_tags_to_add(Some(self::tags(tags)))
            .send()
            .await?;
        Ok(())
    }

    async fn untag_resource(&self, identifier: &str, keys: &[String]) -> Result<(), BoxError> {
        self.client
            .untag_resource()
            .resource_arn(identifier)
            .set_tags_to_remove(Some(keys.to_vec()))
            .send()
            .await?;
        Ok(())
    }
}

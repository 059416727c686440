use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_quicksight::types::Tag;

use super::{BoxError, ServiceError, ServiceName, TaggingService};
use crate::tags::KeyValueTags;

pub struct QuickSightService {
    client: aws_sdk_quicksight::Client,
}

impl QuickSightService {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self::from_client(aws_sdk_quicksight::Client::new(sdk_config))
    }

    /// NOTE: Primarily used for testing against mock endpoints.
    pub fn from_client(client: aws_sdk_quicksight::Client) -> Self {
        Self { client }
    }
}

pub fn tags(tags: &KeyValueTags) -> Result<Vec<Tag>, ServiceError> {
    tags.iter()
        .map(|(key, value)| {
            Tag::builder()
                .key(key)
                .value(value)
                .build()
                .map_err(|e| ServiceError::InvalidWireTag(e.to_string()))
        })
        .collect()
}

pub fn key_value_tags(tags: &[Tag]) -> KeyValueTags {
    tags.iter().map(|tag| (tag.key(), tag.value())).collect()
}

#[async_trait]
impl TaggingService for QuickSightService {
    fn name(&self) -> ServiceName {
        ServiceName::QuickSight
    }

    async fn list_tags(&self, identifier: &str) -> Result<KeyValueTags, BoxError> {
        let output = self
            .client
            .list_tags_for_resource()
            .resource_arn(identifier)
            .send()
            .await?;

        Ok(key_value_tags(output.tags()))
    }

    async fn tag_resource(&self, identifier: &str, tags: &KeyValueTags) -> Result<(), BoxError> {
        self.client
            .tag_resource()
            .resource_arn(identifier)
            .set_tags(Some(self::tags(tags)?))
            .send()
            .await?;
        Ok(())
    }

    async fn untag_resource(&self, identifier: &str, keys: &[String]) -> Result<(), BoxError> {
        self.client
            .untag_resource()
            .resource_arn(identifier)
            .set_tag_keys(Some(keys.to_vec()))
            .send()
            .await?;
        Ok(())
    }
}

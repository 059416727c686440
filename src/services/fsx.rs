use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_fsx::types::Tag;

use super::{BoxError, ServiceError, ServiceName, TaggingService};
use crate::tags::KeyValueTags;

pub struct FsxService {
    client: aws_sdk_fsx::Client,
}

impl FsxService {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self::from_client(aws_sdk_fsx::Client::new(sdk_config))
    }

    /// NOTE: Primarily used for testing against mock endpoints.
    pub fn from_client(client: aws_sdk_fsx::Client) -> Self {
        Self { client }
    }
}

/// Converts tags into FSx `Tag` structures.
pub fn tags(tags: &KeyValueTags) -> Result<Vec<Tag>, ServiceError> {
    tags.iter()
        .map(|(key, value)| {
            Ok(Tag::builder().key(key).value(value).build())
        })
        .collect()
}

pub fn key_value_tags(tags: &[Tag]) -> KeyValueTags {
    tags.iter().map(|tag| (tag.key().unwrap_or_default(), tag.value().unwrap_or_default())).collect()
}

#[async_trait]
impl TaggingService for FsxService {
    fn name(&self) -> ServiceName {
        ServiceName::Fsx
    }

    async fn list_tags(&self, identifier: &str) -> Result<KeyValueTags, BoxError> {
        let mut all_tags = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_tags_for_resource()
                .resource_arn(identifier)
                .set_next_token(next_token.take())
                .send()
                .await?;

            all_tags.extend_from_slice(output.tags());

            match output.next_token().filter(|t| !t.is_empty()) {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        Ok(key_value_tags(&all_tags))
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

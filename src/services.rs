pub mod fsx;
pub mod glue;
pub mod quicksight;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use aws_config::SdkConfig;
use thiserror::Error;

use crate::arn::{Arn, ArnError};
use crate::tags::KeyValueTags;

pub use fsx::FsxService;
pub use glue::GlueService;
pub use quicksight::QuickSightService;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub const OP_TAG: &str = "tagging resource";
pub const OP_UNTAG: &str = "untagging resource";
pub const OP_LIST: &str = "listing tags";

/// Every key with one of these prefixes belongs to AWS and is never sent back.
pub const SYSTEM_TAG_PREFIXES: &[&str] = &["aws:"];

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{operation} ({identifier}): {source}")]
    RemoteCall {
        operation: &'static str,
        identifier: String,
        #[source]
        source: BoxError,
    },

    #[error("unknown service: {0}")]
    UnknownService(String),

    #[error("invalid {service} identifier: {source}")]
    InvalidIdentifier {
        service: ServiceName,
        #[source]
        source: ArnError,
    },

    #[error("identifier {identifier} belongs to '{found}', expected '{expected}'")]
    ServiceMismatch {
        identifier: String,
        expected: ServiceName,
        found: String,
    },

    #[error("invalid tag for wire request: {0}")]
    InvalidWireTag(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceName {
    Fsx,
    Glue,
    QuickSight,
}

impl ServiceName {
    pub const ALL: [ServiceName; 3] = [Self::Fsx, Self::Glue, Self::QuickSight];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fsx => "fsx",
            Self::Glue => "glue",
            Self::QuickSight => "quicksight",
        }
    }

    pub fn system_prefixes(&self) -> &'static [&'static str] {
        SYSTEM_TAG_PREFIXES
    }

    /// Service segment expected in this service's resource ARNs.
    pub fn arn_service(&self) -> &'static str {
        self.as_str()
    }

    pub fn check_identifier(&self, identifier: &str) -> Result<Arn, ServiceError> {
        let arn: Arn = identifier
            .parse()
            .map_err(|source| ServiceError::InvalidIdentifier {
                service: *self,
                source,
            })?;

        if arn.service != self.arn_service() {
            return Err(ServiceError::ServiceMismatch {
                identifier: identifier.to_string(),
                expected: *self,
                found: arn.service,
            });
        }

        Ok(arn)
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceName {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ServiceError::UnknownService(s.to_string()))
    }
}

/// The tagging surface of one AWS service.
///
/// Implementations translate between [`KeyValueTags`] and the service's wire
/// shape and return the SDK error untouched; callers attach the operation
/// label.
#[async_trait]
pub trait TaggingService: Send + Sync {
    fn name(&self) -> ServiceName;
    async fn list_tags(&self, identifier: &str) -> Result<KeyValueTags, BoxError>;
    async fn tag_resource(&self, identifier: &str, tags: &KeyValueTags) -> Result<(), BoxError>;
    async fn untag_resource(&self, identifier: &str, keys: &[String]) -> Result<(), BoxError>;
}

pub fn get_service(name: ServiceName, sdk_config: &SdkConfig) -> Arc<dyn TaggingService> {
    match name {
        ServiceName::Fsx => Arc::new(FsxService::new(sdk_config)),
        ServiceName::Glue => Arc::new(GlueService::new(sdk_config)),
        ServiceName::QuickSight => Arc::new(QuickSightService::new(sdk_config)),
    }
}

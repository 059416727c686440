use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ArnError {
    #[error("malformed ARN: '{input}'")]
    Malformed { input: String },

    #[error("ARN '{input}' has an empty {field}")]
    MissingField { input: String, field: &'static str },
}

/// `arn:partition:service:region:account-id:resource`
///
/// Region and account may be empty (global services, managed resources).
/// The resource part keeps any further `:` or `/` separators untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account_id: String,
    pub resource: String,
}

impl FromStr for Arn {
    type Err = ArnError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let malformed = || ArnError::Malformed {
            input: input.to_string(),
        };

        let mut parts = input.splitn(6, ':');
        if parts.next() != Some("arn") {
            return Err(malformed());
        }

        let partition = parts.next().ok_or_else(malformed)?;
        let service = parts.next().ok_or_else(malformed)?;
        let region = parts.next().ok_or_else(malformed)?;
        let account_id = parts.next().ok_or_else(malformed)?;
        let resource = parts.next().ok_or_else(malformed)?;

        for (field, value) in [
            ("partition", partition),
            ("service", service),
            ("resource", resource),
        ] {
            if value.is_empty() {
                return Err(ArnError::MissingField {
                    input: input.to_string(),
                    field,
                });
            }
        }

        Ok(Self {
            partition: partition.to_string(),
            service: service.to_string(),
            region: region.to_string(),
            account_id: account_id.to_string(),
            resource: resource.to_string(),
        })
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account_id, self.resource
        )
    }
}

//! tagsync - AWS resource tag reconciliation
//!
//! A library for diffing desired against actual resource tags and applying the
//! minimal Tag/Untag calls through each service's tagging API.

pub mod arn;
pub mod config;
pub mod output;
pub mod reconcile;
pub mod services;
pub mod tags;
pub mod terraform;

mod error;

pub use config::{IgnoreConfig, TagConfig};
pub use error::TagsyncError;
pub use reconcile::{OldTags, PlannedUpdate, TagReconciler, UpdateRequest};
pub use services::{ServiceError, ServiceName, TaggingService};
pub use tags::{KeyValueTags, TagDiff, TagError};

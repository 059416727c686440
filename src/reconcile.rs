use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{TagConfig, read_tag_file};
use crate::error::TagsyncError;
use crate::services::{OP_LIST, OP_TAG, OP_UNTAG, ServiceError, ServiceName, TaggingService};
use crate::tags::{KeyValueTags, TagDiff};
use crate::terraform::TerraformState;

/// Where an update takes the resource's current tags from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OldTags {
    /// Last applied tags recorded in a Terraform state file.
    State { path: PathBuf, address: String },
    /// A JSON tag file.
    File(PathBuf),
    /// A fresh read from the service.
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Overrides the identifier recorded in state.
    pub identifier: Option<String>,
    pub old: OldTags,
    /// JSON file with the resource's desired tags.
    pub new: Option<PathBuf>,
    /// Individual pairs layered over `new`.
    pub tags: KeyValueTags,
}

impl UpdateRequest {
    fn required_identifier(&self) -> Result<String, TagsyncError> {
        self.identifier.clone().ok_or_else(|| {
            TagsyncError::Config(
                "an identifier is required unless tags come from state".to_string(),
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpdate {
    pub identifier: String,
    pub old: KeyValueTags,
    pub desired: KeyValueTags,
    pub diff: TagDiff,
}

/// Brings a resource's remote tags in line with a desired set.
///
/// Removals go out first, then additions and updates. A failure in either
/// call is returned as is; whatever the first call already changed stays
/// changed, and the caller is expected to re-read before retrying.
#[derive(Clone)]
pub struct TagReconciler {
    service: Arc<dyn TaggingService>,
}

impl TagReconciler {
    pub fn new(service: Arc<dyn TaggingService>) -> Self {
        Self { service }
    }

    pub fn service_name(&self) -> ServiceName {
        self.service.name()
    }

    pub fn plan(&self, old: &KeyValueTags, new: &KeyValueTags) -> TagDiff {
        TagDiff::compute(old, new, self.service.name().system_prefixes())
    }

    pub async fn reconcile(
        &self,
        identifier: &str,
        old: &KeyValueTags,
        new: &KeyValueTags,
    ) -> Result<(), ServiceError> {
        let diff = self.plan(old, new);
        self.apply(identifier, &diff).await
    }

    pub async fn apply(&self, identifier: &str, diff: &TagDiff) -> Result<(), ServiceError> {
        let service = self.service.name();

        tracing::debug!(
            %service,
            identifier,
            removed = diff.removed.len(),
            updated = diff.updated.len(),
            "computed tag diff"
        );

        if diff.is_empty() {
            tracing::debug!(%service, identifier, "tags already up to date");
            return Ok(());
        }

        if !diff.removed.is_empty() {
            self.service
                .untag_resource(identifier, &diff.removed)
                .await
                .map_err(|source| ServiceError::RemoteCall {
                    operation: OP_UNTAG,
                    identifier: identifier.to_string(),
                    source,
                })?;

            tracing::info!(%service, identifier, count = diff.removed.len(), "tags removed");
        }

        if !diff.updated.is_empty() {
            self.service
                .tag_resource(identifier, &diff.updated)
                .await
                .map_err(|source| ServiceError::RemoteCall {
                    operation: OP_TAG,
                    identifier: identifier.to_string(),
                    source,
                })?;

            tracing::info!(%service, identifier, count = diff.updated.len(), "tags updated");
        }

        Ok(())
    }

    pub async fn list_tags(&self, identifier: &str) -> Result<KeyValueTags, ServiceError> {
        self.service
            .list_tags(identifier)
            .await
            .map_err(|source| ServiceError::RemoteCall {
                operation: OP_LIST,
                identifier: identifier.to_string(),
                source,
            })
    }
}

impl TagReconciler {
    /// Resolves the current and desired tags of an update and plans the diff.
    ///
    /// Current tags come from state, a tag file or the service, in that
    /// order of preference. Desired tags are the `new` file overlaid with
    /// the request's pairs, then the config's default and ignored tags.
    pub async fn plan_update(
        &self,
        config: &TagConfig,
        request: &UpdateRequest,
    ) -> Result<PlannedUpdate, TagsyncError> {
        let service = self.service.name();

        let (identifier, recorded) = match &request.old {
            OldTags::State { path, address } => {
                let resource = TerraformState::load(path)?.resource_tags(address)?;
                let identifier = request.identifier.clone().unwrap_or(resource.identifier);
                (identifier, Some(resource.tags))
            }
            OldTags::File(path) => (request.required_identifier()?, Some(read_tag_file(path)?)),
            OldTags::Remote => (request.required_identifier()?, None),
        };

        service.check_identifier(&identifier)?;

        let old = match recorded {
            Some(tags) => tags,
            None => self.list_tags(&identifier).await?,
        };
        let old = config.read_tags(service, &old);

        let resource_tags = match &request.new {
            Some(path) => read_tag_file(path)?,
            None => KeyValueTags::new(),
        }
        .merge(&request.tags);
        resource_tags.validate()?;

        let desired = config.desired_tags(&resource_tags);
        let diff = self.plan(&old, &desired);

        tracing::info!(
            %service,
            identifier = %identifier,
            removed = diff.removed.len(),
            updated = diff.updated.len(),
            "tag plan ready"
        );

        Ok(PlannedUpdate {
            identifier,
            old,
            desired,
            diff,
        })
    }

    /// Applies a planned update and returns the tags read back afterwards.
    ///
    /// Returns `None` without calling the service for a dry run or an
    /// empty diff.
    pub async fn apply_update(
        &self,
        config: &TagConfig,
        planned: &PlannedUpdate,
        dry_run: bool,
    ) -> Result<Option<KeyValueTags>, ServiceError> {
        if dry_run || planned.diff.is_empty() {
            tracing::debug!(identifier = %planned.identifier, dry_run, "nothing applied");
            return Ok(None);
        }

        self.apply(&planned.identifier, &planned.diff).await?;

        let remote = self.list_tags(&planned.identifier).await?;
        Ok(Some(config.read_tags(self.service.name(), &remote)))
    }
}

impl std::fmt::Debug for TagReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagReconciler")
            .field("service", &self.service.name())
            .finish()
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TagsyncError {
    #[error(transparent)]
    Tag(#[from] crate::tags::TagError),

    #[error(transparent)]
    Service(#[from] crate::services::ServiceError),

    #[error(transparent)]
    State(#[from] crate::terraform::StateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type RawyccResult<T> = Result<T, RawyccError>;

#[derive(thiserror::Error, Debug)]
pub enum RawyccError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("truncated stream: {0}")]
    TruncatedStream(String),

    #[error("resource error: {0}")]
    Resource(String),

    #[error("partition file error: {0}")]
    PartitionFile(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RawyccError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn truncated(msg: impl Into<String>) -> Self {
        Self::TruncatedStream(msg.into())
    }

    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    pub fn partition(msg: impl Into<String>) -> Self {
        Self::PartitionFile(msg.into())
    }
}

pub type VosdResult<T> = Result<T, VosdError>;

/// Crate-wide error taxonomy.
///
/// Variants map one-to-one onto the failure classes of the engine: bad
/// configuration values, bad caller arguments, operations attempted before
/// the frame geometry is known, blend-backend failures, and invariant
/// violations that should be unreachable.
#[derive(thiserror::Error, Debug)]
pub enum VosdError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("uninitialized: {0}")]
    Uninitialized(String),

    #[error("dsp operation error: {0}")]
    DspOperation(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VosdError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn uninitialized(msg: impl Into<String>) -> Self {
        Self::Uninitialized(msg.into())
    }

    pub fn dsp(msg: impl Into<String>) -> Self {
        Self::DspOperation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

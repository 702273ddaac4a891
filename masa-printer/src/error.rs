use thiserror::Error;

pub type PrintResult<T> = Result<T, PrintError>;

#[derive(Debug, Error)]
pub enum PrintError {
    /// TCP connect refused or reset
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Share or device path not present
    #[error("printer offline: {0}")]
    Offline(String),

    #[error("timed out: {0}")]
    Timeout(String),

    /// Malformed address or port
    #[error("invalid printer config: {0}")]
    InvalidConfig(String),

    /// e.g. a spooler address on a non-Windows host
    #[error("not supported here: {0}")]
    Unsupported(String),

    #[error("spooler: {0}")]
    Spooler(String),

    /// Undecodable or unprintable bitmap
    #[error("image: {0}")]
    Image(String),
}

impl PrintError {
    /// True when nothing was written before the failure
    pub fn is_connect_failure(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Offline(_) | Self::Unsupported(_)
        )
    }
}

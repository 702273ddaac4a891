use thiserror::Error;

use crate::settings::SettingsError;

/// Errors that stop the bridge process
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Cannot bind HTTP port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server failed: {0}")]
    Serve(#[from] std::io::Error),

    #[error("Settings store: {0}")]
    Settings(#[from] SettingsError),
}

pub type Result<T> = std::result::Result<T, ServerError>;

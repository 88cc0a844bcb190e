use std::path::PathBuf;

use thiserror::Error;

use crate::claim::Outcome;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no credential available")]
    NoCredential,

    #[error("config file {} is malformed: {source}", path.display())]
    ConfigMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("token file {} is not accessible: {source}", path.display())]
    TokenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The claim went through but the accepted token could not be written back.
    #[error("claim finished ({outcome:?}) but token file {} could not be written: {source}", path.display())]
    TokenNotSaved {
        outcome: Outcome,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

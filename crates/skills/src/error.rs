use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    /// A rule file exists but could not be read.
    #[error("failed to read rule file {}: {source}", path.display())]
    RuleRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A rule file exists but is not a valid rule document.
    #[error("failed to parse rule file {}: {message}", path.display())]
    RuleParse { path: PathBuf, message: String },
}

impl skillcue_common::FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message(message)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

skillcue_common::impl_context!();

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid selector `{0}`")]
    InvalidSelector(String),

    #[error("no element matches `{0}`")]
    MissingTarget(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

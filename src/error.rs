use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobinfoError {
    #[error("Invalid job id: {0:?} (expected <jobid> or <jobid>_<taskid>)")]
    InvalidJobId(String),

    #[error("No such job: {0}")]
    JobNotFound(String),

    #[error("Command `{program}` failed: {message}")]
    CommandFailed { program: String, message: String },

    #[error("Cannot merge an empty set of records")]
    EmptyMerge,

    #[error("Invalid node list: {0:?}")]
    NodeList(String),

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, JobinfoError>;

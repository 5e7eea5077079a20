use thiserror::Error;

#[derive(Error, Debug)]
pub enum UrbanFixError {
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnakeError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("Could not parse configuration file: {source}")]
    ConfigParse {
        #[from]
        source: serde_json::Error,
    },
    #[error("Terminal error: {0}")]
    Terminal(String),
}

pub type Result<T> = std::result::Result<T, SnakeError>;

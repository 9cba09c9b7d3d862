use thiserror::Error;

/// Construction-time failures for a worker. Anything past construction is
/// reported as outcome data, never as an error value.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("{source}")]
    Url {
        #[from]
        source: url::ParseError,
    },
    #[error("invalid URL scheme: {scheme} (must be http or https)")]
    Scheme { scheme: String },
    #[error("URL has no host")]
    MissingHost,
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid target URL: {source}")]
    TargetUrl {
        #[from]
        source: url::ParseError,
    },
    #[error("Target URL scheme must be http or https, got '{scheme}'.")]
    TargetScheme { scheme: String },
    #[error("Number of provided event IDs ({provided}) does not match --events ({expected}).")]
    EventCountMismatch { provided: usize, expected: usize },
    #[error("Empty event ID at position {position}.")]
    EmptyEventId { position: usize },
    #[error("At least one mover or watcher per event is required.")]
    NoWorkers,
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("{0}")]
    Message(String),
}

impl From<String> for ValidationError {
    fn from(value: String) -> Self {
        ValidationError::Message(value)
    }
}

impl From<&str> for ValidationError {
    fn from(value: &str) -> Self {
        ValidationError::Message(value.to_owned())
    }
}

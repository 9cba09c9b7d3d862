use std::fmt;
use std::num::NonZeroUsize;

use crate::error::{AppError, ValidationError};

/// Strictly positive count for CLI flags that reject zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositiveUsize(NonZeroUsize);

impl PositiveUsize {
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl fmt::Display for PositiveUsize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for PositiveUsize {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: usize = s
            .trim()
            .parse()
            .map_err(|err| AppError::validation(ValidationError::InvalidNumber { source: err }))?;
        NonZeroUsize::new(value)
            .map(PositiveUsize)
            .ok_or_else(|| AppError::validation(ValidationError::ValueTooSmall { min: 1 }))
    }
}

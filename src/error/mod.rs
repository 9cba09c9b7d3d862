mod app;
mod metrics;
mod validation;
mod worker;

pub use app::{AppError, AppResult};
pub use metrics::MetricsError;
pub use validation::ValidationError;
pub use worker::WorkerError;

mod cli;
mod parsers;
mod types;

#[cfg(test)]
mod tests;

pub use cli::HarnessArgs;
pub use types::PositiveUsize;

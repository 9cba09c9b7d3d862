pub mod mover;
pub mod watcher;
pub mod wire;

pub use mover::Mover;
pub use watcher::Watcher;

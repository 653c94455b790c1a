pub mod export;
pub mod import;

pub use export::{Exporter, HistorySnapshot};
pub use import::{ReplayOptions, ReplayResult, Replayer};

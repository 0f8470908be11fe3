//! Split a video into fixed-length captioned parts.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod plan;
pub mod probe;
pub mod render;
pub mod timestamp;
mod tools;

pub use config::SplitConfig;
pub use error::SplitError;
pub use orchestrator::{SplitRequest, SplitSummary, Splitter};
pub use probe::FfprobeProbe;
pub use render::FfmpegRenderer;

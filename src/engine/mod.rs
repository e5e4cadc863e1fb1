//! Transcoding engine module
//!
//! [`EngineHandle`] owns the lazily loaded engine, [`TranscodeSession`] runs
//! jobs against it, and [`progress`] turns engine fractions into percentages
//! and remaining-time estimates.

pub mod handle;
pub mod progress;
pub mod session;

pub use handle::{EngineHandle, EngineState};
pub use progress::{ProgressSnapshot, ProgressTracker};
pub use session::{ConversionReport, TranscodeSession};

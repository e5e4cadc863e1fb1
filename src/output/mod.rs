//! Output file writing module

use serde::{Deserialize, Serialize};

pub mod writer;

pub use writer::OutputWriter;

/// Overwrite policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverwritePolicy {
    /// Always overwrite
    Always,
    /// Never overwrite
    Never,
}

impl OverwritePolicy {
    pub fn from_flag(overwrite: bool) -> Self {
        if overwrite {
            OverwritePolicy::Always
        } else {
            OverwritePolicy::Never
        }
    }
}

//! Loaders that read battle data from files.
//!
//! Configuration is TOML, stages are RON. Both go through the serde
//! representations defined next to the types they produce.

pub mod config;
pub mod stage;

pub use config::ConfigLoader;
pub use stage::StageLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

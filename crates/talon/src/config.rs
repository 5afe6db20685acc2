//
// config.rs
//
// Indexing configuration
//

use serde::Deserialize;

/// Default cap on lines scanned per file, for performance on huge scripts.
pub const DEFAULT_MAXIMUM_PARSE_LENGTH: i64 = 10_000;

/// Indexing configuration supplied by the host.
///
/// Changes that affect which files get indexed are applied upstream by
/// clearing the script cache and re-seeding; there is no per-setting
/// invalidation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Lines to scan per file. Negative means unlimited; zero produces an
    /// empty symbol table without scanning.
    pub maximum_parse_length: i64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            maximum_parse_length: DEFAULT_MAXIMUM_PARSE_LENGTH,
        }
    }
}

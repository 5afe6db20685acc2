// lib.rs — Exposes the indexing engine for the CLI and integration tests.
//
// The binary entry point lives in main.rs; everything else is library
// surface so tests and embedders can drive the index directly.

pub mod builder;
pub mod cache;
pub mod classify;
pub mod config;
pub mod content;
pub mod include;
pub mod index;
pub mod purify;
pub mod resolve;
pub mod script;
pub mod script_path;

pub use cache::ScriptCache;
pub use config::IndexConfig;
pub use content::{ContentProvider, FsContentProvider, MemoryContentProvider};
pub use index::ScriptIndex;
pub use resolve::SearchStrategy;
pub use script::{Block, FuncDef, FuncRef, Label, Script, Variable};
pub use script_path::ScriptPath;

#[cfg(test)]
pub mod test_utils;

//
// content.rs
//
// Document content accessors. The index never caches raw text, only derived
// symbols; content is re-read through a provider on every build.
//

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use crate::script_path::ScriptPath;

/// Source of document text for the script builder.
///
/// Implementations may serve disk files or in-memory editor buffers. Content
/// may change between calls; the index tolerates that only by being asked to
/// build again.
pub trait ContentProvider {
    fn get_content(&self, path: &ScriptPath) -> Option<String>;
}

/// Reads script text from the filesystem. Unreadable files are logged and
/// reported as absent, never as errors.
#[derive(Debug, Default)]
pub struct FsContentProvider;

impl FsContentProvider {
    pub fn new() -> Self {
        Self
    }
}

impl ContentProvider for FsContentProvider {
    fn get_content(&self, path: &ScriptPath) -> Option<String> {
        match std::fs::read_to_string(Path::new(path.as_str())) {
            Ok(content) => Some(content),
            Err(err) => {
                log::warn!("Failed to read {}: {}", path, err);
                None
            }
        }
    }
}

/// In-memory provider backing tests and editor-buffer scenarios.
#[derive(Debug, Default)]
pub struct MemoryContentProvider {
    files: RwLock<HashMap<ScriptPath, String>>,
}

impl MemoryContentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: ScriptPath, content: &str) {
        if let Ok(mut guard) = self.files.write() {
            guard.insert(path, content.to_string());
        }
    }

    pub fn remove(&self, path: &ScriptPath) {
        if let Ok(mut guard) = self.files.write() {
            guard.remove(path);
        }
    }
}

impl ContentProvider for MemoryContentProvider {
    fn get_content(&self, path: &ScriptPath) -> Option<String> {
        self.files.read().ok()?.get(path).cloned()
    }
}

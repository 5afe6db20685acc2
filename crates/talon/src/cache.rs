//
// cache.rs
//
// Process-wide script cache: the single source of truth for cross-file
// symbol queries
//

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::script::Script;
use crate::script_path::ScriptPath;

/// Map from normalized path to the symbol table built for that file.
///
/// No automatic eviction; cleared wholesale only by explicit invalidation
/// when indexing-affecting configuration changes. Racing rebuilds of the same
/// path are allowed — builds are idempotent functions of file content, so
/// last write wins and no per-key locking is needed. Readers may observe a
/// stale or absent entry while a build is in flight; callers treat that as
/// "not yet indexed", never as an error.
#[derive(Debug, Default)]
pub struct ScriptCache {
    inner: RwLock<HashMap<ScriptPath, Arc<Script>>>,
}

impl ScriptCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &ScriptPath) -> Option<Arc<Script>> {
        self.inner.read().ok()?.get(path).cloned()
    }

    pub fn insert(&self, path: ScriptPath, script: Arc<Script>) {
        if let Ok(mut guard) = self.inner.write() {
            guard.insert(path, script);
        }
    }

    pub fn contains(&self, path: &ScriptPath) -> bool {
        self.inner
            .read()
            .map(|guard| guard.contains_key(path))
            .unwrap_or(false)
    }

    /// Snapshot of all cached entries. Iteration order is undefined.
    pub fn snapshot(&self) -> Vec<(ScriptPath, Arc<Script>)> {
        match self.inner.read() {
            Ok(guard) => guard
                .iter()
                .map(|(path, script)| (path.clone(), script.clone()))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Snapshot of all cached paths. Iteration order is undefined.
    pub fn paths(&self) -> Vec<ScriptPath> {
        match self.inner.read() {
            Ok(guard) => guard.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached script. The index is rebuilt from source files
    /// afterwards; there is no partial invalidation.
    pub fn clear(&self) {
        log::debug!("Clearing script cache");
        if let Ok(mut guard) = self.inner.write() {
            guard.clear();
        }
    }
}

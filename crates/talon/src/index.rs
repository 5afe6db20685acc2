//
// index.rs
//
// The top-level index: owns the cache, the content provider, and the
// configuration, and fronts the builder and resolver
//

use std::sync::Arc;

use crate::builder::{build_script, BuildOptions};
use crate::cache::ScriptCache;
use crate::config::IndexConfig;
use crate::content::ContentProvider;
use crate::resolve::{self, SearchStrategy};
use crate::script::{FuncDef, FuncRef, Label, Script};
use crate::script_path::ScriptPath;

/// A workspace-wide symbol index over AutoHotkey v1 scripts.
///
/// Shared freely across threads behind an `Arc`; all interior state is the
/// cache's own lock.
pub struct ScriptIndex<P: ContentProvider> {
    cache: ScriptCache,
    provider: P,
    config: IndexConfig,
}

impl<P: ContentProvider> ScriptIndex<P> {
    pub fn new(provider: P, config: IndexConfig) -> Self {
        Self {
            cache: ScriptCache::new(),
            provider,
            config,
        }
    }

    /// Parse `path` (and, recursively, its includes) into the cache,
    /// replacing any existing entry.
    pub fn build_script(&self, path: &ScriptPath) -> Option<Arc<Script>> {
        build_script(
            &self.cache,
            &self.provider,
            path,
            &BuildOptions::default(),
            &self.config,
        )
    }

    /// Like [`Self::build_script`], but with `using_cache` set a cached
    /// script is returned as-is without re-reading the file.
    pub fn get_or_build_script(
        &self,
        path: &ScriptPath,
        using_cache: bool,
    ) -> Option<Arc<Script>> {
        build_script(
            &self.cache,
            &self.provider,
            path,
            &BuildOptions {
                using_cache,
                ..Default::default()
            },
            &self.config,
        )
    }

    /// Seed the index from a collection of entry points, typically a
    /// workspace scan.
    pub fn build_paths<I>(&self, paths: I)
    where
        I: IntoIterator<Item = ScriptPath>,
    {
        for path in paths {
            self.build_script(&path);
        }
    }

    pub fn resolve_func_def(
        &self,
        path: &ScriptPath,
        name: &str,
        strategy: SearchStrategy,
    ) -> Option<FuncDef> {
        resolve::resolve_func_def(&self.cache, path, name, strategy)
    }

    pub fn resolve_label(&self, path: &ScriptPath, name: &str) -> Option<Label> {
        resolve::resolve_label(&self.cache, path, name)
    }

    pub fn all_func_defs(&self) -> Vec<FuncDef> {
        resolve::all_func_defs(&self.cache)
    }

    pub fn all_refs_by_name(&self, name: &str) -> Vec<FuncRef> {
        resolve::all_refs_by_name(&self.cache, name)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &ScriptCache {
        &self.cache
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

//
// resolve.rs
//
// Symbol lookups over the script cache: function definitions, labels, and
// references, resolved relative to a requesting file
//

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use crate::cache::ScriptCache;
use crate::script::{FuncDef, FuncRef, Label, Script};
use crate::script_path::ScriptPath;

/// How far a definition lookup reaches beyond the requesting file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Scan every cached script, regardless of include relationships.
    Legacy,
    /// Walk the include graph from the requesting file, then fall back to
    /// the library naming convention.
    Scoped,
}

/// Find the definition of `name` as seen from `path`. Names compare
/// case-insensitively throughout.
///
/// The requesting file's own definitions always win. A missing cache entry
/// for `path` is not an error; the lookup proceeds with whatever scope the
/// strategy still reaches.
pub fn resolve_func_def(
    cache: &ScriptCache,
    path: &ScriptPath,
    name: &str,
    strategy: SearchStrategy,
) -> Option<FuncDef> {
    if let Some(script) = cache.get(path) {
        if let Some(def) = find_def(&script, name) {
            return Some(def);
        }
    }
    match strategy {
        SearchStrategy::Legacy => resolve_anywhere(cache, path, name),
        SearchStrategy::Scoped => resolve_in_scope(cache, path, name),
    }
}

fn find_def(script: &Script, name: &str) -> Option<FuncDef> {
    script
        .func_defs
        .iter()
        .find(|def| def.name.eq_ignore_ascii_case(name))
        .cloned()
}

/// Legacy strategy: any cached script may supply the definition. Which one
/// wins is unspecified when several match.
fn resolve_anywhere(cache: &ScriptCache, path: &ScriptPath, name: &str) -> Option<FuncDef> {
    for (cached_path, script) in cache.snapshot() {
        if cached_path == *path {
            continue;
        }
        if let Some(def) = find_def(&script, name) {
            return Some(def);
        }
    }
    None
}

/// Scoped strategy: breadth-first over the include graph reachable from
/// `path`, then the library convention. The walk only reads scripts already
/// in the cache; it never triggers builds.
fn resolve_in_scope(cache: &ScriptCache, path: &ScriptPath, name: &str) -> Option<FuncDef> {
    let mut visited: HashSet<ScriptPath> = HashSet::new();
    visited.insert(path.clone());
    let mut queue: VecDeque<ScriptPath> = VecDeque::new();
    if let Some(script) = cache.get(path) {
        queue.extend(script.included_paths.iter().cloned());
    }

    while let Some(next) = queue.pop_front() {
        if !visited.insert(next.clone()) {
            continue;
        }
        let Some(script) = cache.get(&next) else {
            continue;
        };
        if let Some(def) = find_def(&script, name) {
            log::trace!("Resolved {} via include graph in {}", name, next);
            return Some(def);
        }
        queue.extend(script.included_paths.iter().cloned());
    }

    resolve_in_library(cache, path, name)
}

/// Library convention: `dir/lib/<funcname>.ahk` defines `funcname`, and
/// `dir/lib/<prefix>.ahk` defines `prefix_suffix` functions. File name
/// comparison is case-insensitive, matching the loader it models.
fn resolve_in_library(cache: &ScriptCache, path: &ScriptPath, name: &str) -> Option<FuncDef> {
    let dir = path.parent()?;
    let lower = name.to_ascii_lowercase();
    let mut candidates = vec![dir.join(&format!("lib/{}.ahk", lower))];
    if let Some(prefix) = lower.split('_').next() {
        if prefix != lower {
            candidates.push(dir.join(&format!("lib/{}.ahk", prefix)));
        }
    }

    for candidate in candidates {
        for (cached_path, script) in cache.snapshot() {
            if !cached_path.eq_ignore_case(&candidate) {
                continue;
            }
            // The prefix file must still define the full name
            if let Some(def) = find_def(&script, name) {
                log::trace!("Resolved {} via library file {}", name, cached_path);
                return Some(def);
            }
        }
    }
    None
}

/// Find the definition of label `name`, preferring the requesting file, then
/// any cached script. Label names compare case-insensitively.
pub fn resolve_label(cache: &ScriptCache, path: &ScriptPath, name: &str) -> Option<Label> {
    let find = |script: &Arc<Script>| {
        script
            .labels
            .iter()
            .find(|label| label.name.eq_ignore_ascii_case(name))
            .cloned()
    };
    if let Some(script) = cache.get(path) {
        if let Some(label) = find(&script) {
            return Some(label);
        }
    }
    for (cached_path, script) in cache.snapshot() {
        if cached_path == *path {
            continue;
        }
        if let Some(label) = find(&script) {
            return Some(label);
        }
    }
    None
}

/// Every function definition in the cache, across all files.
pub fn all_func_defs(cache: &ScriptCache) -> Vec<FuncDef> {
    let mut defs = Vec::new();
    for (_, script) in cache.snapshot() {
        defs.extend(script.func_defs.iter().cloned());
    }
    defs
}

/// Every reference to `name` in the cache, case-insensitively.
pub fn all_refs_by_name(cache: &ScriptCache, name: &str) -> Vec<FuncRef> {
    let mut refs = Vec::new();
    for (_, script) in cache.snapshot() {
        refs.extend(
            script
                .func_refs
                .iter()
                .filter(|r| r.name.eq_ignore_ascii_case(name))
                .cloned(),
        );
    }
    refs
}

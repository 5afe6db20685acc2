//
// builder.rs
//
// Script builder: a single forward pass over a file's lines that assembles
// the symbol table from the line classifier's output, then recursively
// indexes included files
//

use std::sync::Arc;

use crate::cache::ScriptCache;
use crate::classify::{
    closes_block_comment, detect_block, detect_function, detect_label, detect_variables,
    opens_block_comment, FuncLine,
};
use crate::config::IndexConfig;
use crate::content::ContentProvider;
use crate::include::resolve_included_path;
use crate::purify::purify;
use crate::script::{join_variables, FuncRef, Script, Variable};
use crate::script_path::ScriptPath;

/// File extensions recognized as the AutoHotkey v1 dialect.
pub const DIALECT_EXTENSIONS: &[&str] = &["ahk", "ah1", "ahk1", "ext"];

/// Options for one build invocation.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Return the cached script unchanged when one exists for this path.
    pub using_cache: bool,
    /// Per-call override for the line cap; falls back to the configured
    /// value. Negative is unlimited, zero yields an empty script.
    pub maximum_parse_length: Option<i64>,
}

/// Whether a path names a document in the target scripting dialect.
pub fn is_dialect_path(path: &ScriptPath) -> bool {
    path.extension()
        .is_some_and(|ext| DIALECT_EXTENSIONS.contains(&ext.as_str()))
}

/// Parse one document into a [`Script`], cache it, and recursively build its
/// includes.
///
/// Never raises: an unreadable document yields an empty script for that path,
/// and a failed include build is logged and skipped. Documents outside the
/// target dialect are skipped without caching. The script is cached before
/// includes are built, which keeps include cycles from recursing forever.
pub fn build_script(
    cache: &ScriptCache,
    provider: &dyn ContentProvider,
    path: &ScriptPath,
    options: &BuildOptions,
    config: &IndexConfig,
) -> Option<Arc<Script>> {
    if !is_dialect_path(path) {
        log::debug!("build_script skipping non-dialect doc at {}", path);
        return None;
    }

    if options.using_cache {
        if let Some(cached) = cache.get(path) {
            return Some(cached);
        }
    }

    let lines: Vec<String> = match provider.get_content(path) {
        Some(content) => content.lines().map(str::to_string).collect(),
        None => {
            // Unreadable documents still get an (empty) cache entry so the
            // rest of the index stays available.
            log::warn!("build_script treating unreadable {} as empty", path);
            Vec::new()
        }
    };

    let max_parse_length = options
        .maximum_parse_length
        .unwrap_or(config.maximum_parse_length);
    let lines_to_parse = if max_parse_length >= 0 {
        lines.len().min(max_parse_length as usize)
    } else {
        lines.len()
    };

    let script = scan_lines(path, &lines, lines_to_parse);
    log::debug!(
        "build_script {}: {} defs, {} refs, {} labels, {} includes",
        path,
        script.func_defs.len(),
        script.func_refs.len(),
        script.labels.len(),
        script.included_paths.len()
    );

    let script = Arc::new(script);
    cache.insert(path.clone(), script.clone());

    // Second pass: includes build independently against the cache. A failure
    // building one include never aborts the parent build.
    let include_options = BuildOptions {
        using_cache: true,
        maximum_parse_length: options.maximum_parse_length,
    };
    for included in &script.included_paths {
        if build_script(cache, provider, included, &include_options, config).is_none() {
            log::debug!("build_script skipped include {} of {}", included, path);
        }
    }

    Some(script)
}

/// The forward pass itself: classifier rules in fixed order, with the
/// cross-line state (block-comment flag, scope depth, current enclosing
/// function) carried between lines.
fn scan_lines(path: &ScriptPath, lines: &[String], lines_to_parse: usize) -> Script {
    let mut script = Script::default();
    // Index into script.func_defs of the function whose body is open
    let mut current_func: Option<usize> = None;
    let mut depth: i64 = 0;
    let mut block_comment = false;

    for line_num in 0..lines_to_parse {
        let line = &lines[line_num];

        if opens_block_comment(line) {
            block_comment = true;
        }
        if closes_block_comment(line) {
            block_comment = false;
        }
        if block_comment {
            continue;
        }

        match detect_function(path, lines, line_num) {
            Some(FuncLine::Def(def)) => {
                // The definition site is itself a reference
                script.func_refs.push(FuncRef {
                    name: def.name.clone(),
                    path: path.clone(),
                    line: line_num,
                    character: def.character,
                });
                if def.with_quote {
                    depth += 1;
                }
                current_func = Some(script.func_defs.len());
                script.func_defs.push(def);
                continue;
            }
            Some(FuncLine::Calls(refs)) => {
                script.func_refs.extend(refs);
            }
            None => {}
        }

        let purified = purify(line);

        if let Some(label) = detect_label(path, &purified, line_num) {
            script.labels.push(label);
            continue;
        }

        if let Some(block) = detect_block(path, line, line_num) {
            script.blocks.push(block);
        }

        if let Some(included) = resolve_included_path(path, line) {
            // Recorded even when the target does not exist yet
            script.included_paths.push(included);
            continue;
        }

        for ch in purified.chars() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        if let Some(idx) = current_func.take() {
                            script.func_defs[idx].end_line = Some(line_num);
                        }
                    }
                }
                _ => {}
            }
        }

        let detected = detect_variables(path, &purified, line_num);
        if detected.is_empty() {
            continue;
        }
        match current_func {
            Some(idx) if depth > 0 => {
                let owner = script.func_defs[idx].name.clone();
                let locals: Vec<Variable> = detected
                    .into_iter()
                    .map(|mut v| {
                        v.is_global = false;
                        v.owner = Some(owner.clone());
                        v
                    })
                    .collect();
                script.func_defs[idx].push_variable(locals);
            }
            _ => join_variables(&mut script.variables, detected),
        }
    }

    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MemoryContentProvider;

    fn test_path(name: &str) -> ScriptPath {
        ScriptPath::new(&format!("/scripts/{}", name))
    }

    fn build_source(source: &str) -> Arc<Script> {
        let cache = ScriptCache::new();
        let provider = MemoryContentProvider::new();
        let path = test_path("main.ahk");
        provider.insert(path.clone(), source);
        build_script(
            &cache,
            &provider,
            &path,
            &BuildOptions::default(),
            &IndexConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_function_definition_indexed() {
        let script = build_source("Add(a, b) {\n    return a + b\n}\n");
        assert_eq!(script.func_defs.len(), 1);
        let def = &script.func_defs[0];
        assert_eq!(def.name, "Add");
        assert_eq!(def.line, 0);
        assert_eq!(def.end_line, Some(2));
        // The definition site counts as a reference
        assert_eq!(script.func_refs.len(), 1);
        assert_eq!(script.func_refs[0].name, "Add");
    }

    #[test]
    fn test_unclosed_body_has_no_end_line() {
        let script = build_source("Add(a, b) {\n    return a + b\n");
        assert_eq!(script.func_defs[0].end_line, None);
    }

    #[test]
    fn test_locals_and_globals_partitioned() {
        let script = build_source(
            "total := 0\nAccumulate(x) {\n    sum := x\n    total2 := sum\n}\nafter := 1\n",
        );
        let globals: Vec<&str> = script.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(globals, vec!["total", "after"]);
        assert!(script.variables.iter().all(|v| v.is_global));

        let def = &script.func_defs[0];
        let locals: Vec<&str> = def.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(locals, vec!["sum", "total2"]);
        assert!(def.variables.iter().all(|v| !v.is_global));
        assert_eq!(def.variables[0].owner.as_deref(), Some("Accumulate"));
    }

    #[test]
    fn test_parameter_not_duplicated_as_local() {
        let script = build_source("Scale(factor) {\n    factor := factor * 2\n    out := 1\n}\n");
        let locals: Vec<&str> = script.func_defs[0]
            .variables
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(locals, vec!["out"]);
    }

    #[test]
    fn test_block_comments_suppress_classification() {
        let script = build_source("/*\nHidden(a) {\n}\n*/\nVisible() {\n}\n");
        assert_eq!(script.func_defs.len(), 1);
        assert_eq!(script.func_defs[0].name, "Visible");
    }

    #[test]
    fn test_labels_and_blocks_collected() {
        let script = build_source(";; hotkeys\nReload:\nx := 1\n");
        assert_eq!(script.blocks.len(), 1);
        assert_eq!(script.blocks[0].name, " hotkeys");
        assert_eq!(script.labels.len(), 1);
        assert_eq!(script.labels[0].name, "Reload");
    }

    #[test]
    fn test_includes_recorded_and_built() {
        let cache = ScriptCache::new();
        let provider = MemoryContentProvider::new();
        let main = test_path("main.ahk");
        let util = test_path("util.ahk");
        provider.insert(main.clone(), "#include util.ahk\nUse()\nx := 1\n");
        provider.insert(util.clone(), "Helper(a) {\n}\n");

        let script = build_script(
            &cache,
            &provider,
            &main,
            &BuildOptions::default(),
            &IndexConfig::default(),
        )
        .unwrap();

        assert_eq!(script.included_paths, vec![util.clone()]);
        let util_script = cache.get(&util).expect("include should be indexed");
        assert_eq!(util_script.func_defs.len(), 1);
    }

    #[test]
    fn test_missing_include_recorded_but_empty() {
        let cache = ScriptCache::new();
        let provider = MemoryContentProvider::new();
        let main = test_path("main.ahk");
        provider.insert(main.clone(), "#include ghost.ahk\nx := 1\n");

        let script = build_script(
            &cache,
            &provider,
            &main,
            &BuildOptions::default(),
            &IndexConfig::default(),
        )
        .unwrap();

        let ghost = test_path("ghost.ahk");
        assert_eq!(script.included_paths, vec![ghost.clone()]);
        // The unreadable include degrades to an empty cached script
        let ghost_script = cache.get(&ghost).unwrap();
        assert!(ghost_script.func_defs.is_empty());
    }

    #[test]
    fn test_include_cycle_terminates() {
        let cache = ScriptCache::new();
        let provider = MemoryContentProvider::new();
        let a = test_path("a.ahk");
        let b = test_path("b.ahk");
        provider.insert(a.clone(), "#include b.ahk\nFromA() {\n}\n");
        provider.insert(b.clone(), "#include a.ahk\nFromB() {\n}\n");

        let script = build_script(
            &cache,
            &provider,
            &a,
            &BuildOptions::default(),
            &IndexConfig::default(),
        )
        .unwrap();

        assert_eq!(script.func_defs.len(), 1);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&b).unwrap().func_defs[0].name, "FromB");
    }

    #[test]
    fn test_using_cache_returns_same_script() {
        let cache = ScriptCache::new();
        let provider = MemoryContentProvider::new();
        let path = test_path("main.ahk");
        provider.insert(path.clone(), "Add(a, b) {\n}\n");

        let first = build_script(
            &cache,
            &provider,
            &path,
            &BuildOptions::default(),
            &IndexConfig::default(),
        )
        .unwrap();
        let cached = build_script(
            &cache,
            &provider,
            &path,
            &BuildOptions {
                using_cache: true,
                ..Default::default()
            },
            &IndexConfig::default(),
        )
        .unwrap();
        assert!(Arc::ptr_eq(&first, &cached));

        // Without using_cache the script is rebuilt and replaced
        let rebuilt = build_script(
            &cache,
            &provider,
            &path,
            &BuildOptions::default(),
            &IndexConfig::default(),
        )
        .unwrap();
        assert!(!Arc::ptr_eq(&first, &rebuilt));
    }

    #[test]
    fn test_zero_parse_length_yields_empty_script() {
        let cache = ScriptCache::new();
        let provider = MemoryContentProvider::new();
        let path = test_path("main.ahk");
        provider.insert(path.clone(), "Add(a, b) {\n}\n");

        let script = build_script(
            &cache,
            &provider,
            &path,
            &BuildOptions {
                maximum_parse_length: Some(0),
                ..Default::default()
            },
            &IndexConfig::default(),
        )
        .unwrap();
        assert!(script.func_defs.is_empty());
        assert!(script.func_refs.is_empty());
    }

    #[test]
    fn test_parse_length_cap_is_exclusive_at_cap() {
        let source = "First() {\n}\nSecond() {\n}\n";
        let cache = ScriptCache::new();
        let provider = MemoryContentProvider::new();
        let path = test_path("main.ahk");
        provider.insert(path.clone(), source);

        // Second() sits on line 2; a cap of 2 scans lines 0..2 only
        let capped = build_script(
            &cache,
            &provider,
            &path,
            &BuildOptions {
                maximum_parse_length: Some(2),
                ..Default::default()
            },
            &IndexConfig::default(),
        )
        .unwrap();
        assert_eq!(capped.func_defs.len(), 1);

        let cache = ScriptCache::new();
        let unlimited = build_script(
            &cache,
            &provider,
            &path,
            &BuildOptions {
                maximum_parse_length: Some(-1),
                ..Default::default()
            },
            &IndexConfig::default(),
        )
        .unwrap();
        assert_eq!(unlimited.func_defs.len(), 2);
    }

    #[test]
    fn test_non_dialect_document_skipped() {
        let cache = ScriptCache::new();
        let provider = MemoryContentProvider::new();
        let path = test_path("notes.txt");
        provider.insert(path.clone(), "Add(a, b) {\n}\n");

        assert!(build_script(
            &cache,
            &provider,
            &path,
            &BuildOptions::default(),
            &IndexConfig::default(),
        )
        .is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_nested_call_produces_two_refs() {
        let script = build_source("Outer(Inner(1))\nx := 1\n");
        let names: Vec<&str> = script.func_refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Outer", "Inner"]);
    }
}

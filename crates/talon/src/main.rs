//
// main.rs
//
// Command-line front end: index one or more scripts or directories and
// print the symbols found
//

use std::env;

use anyhow::Context;
use walkdir::WalkDir;

use talon::builder::is_dialect_path;
use talon::{FsContentProvider, IndexConfig, ScriptIndex, ScriptPath};

fn print_usage() {
    println!(
        "talon {}, a symbol indexer for AutoHotkey v1 scripts.",
        env!("CARGO_PKG_VERSION")
    );
    print!(
        r#"
Usage: talon [OPTIONS] <PATH>...

Index the given script files (or every script under the given
directories) and print the symbols found.

Available options:

--json                       Print the full symbol tables as JSON
--max-lines <N>              Lines to scan per file (negative = unlimited)
--version                    Print the version
--help                       Print this help message

"#
    );
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut argv = env::args();
    argv.next(); // skip executable name

    let mut json = false;
    let mut max_lines: Option<i64> = None;
    let mut inputs: Vec<String> = Vec::new();

    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--max-lines" => {
                let value = argv
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--max-lines requires a value"))?;
                max_lines = Some(
                    value
                        .parse()
                        .with_context(|| format!("Invalid --max-lines value: '{value}'"))?,
                );
            }
            "--version" => {
                println!("talon {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_usage();
                return Ok(());
            }
            other if other.starts_with('-') => {
                return Err(anyhow::anyhow!("Unknown argument: '{other}'"));
            }
            path => inputs.push(path.to_string()),
        }
    }

    if inputs.is_empty() {
        print_usage();
        return Ok(());
    }

    let mut config = IndexConfig::default();
    if let Some(n) = max_lines {
        config.maximum_parse_length = n;
    }

    let paths = collect_script_paths(&inputs)?;
    if paths.is_empty() {
        anyhow::bail!("No script files found under the given paths");
    }

    let index = ScriptIndex::new(FsContentProvider::new(), config);
    index.build_paths(paths);

    if json {
        print_json(&index)?;
    } else {
        print_summary(&index);
    }

    Ok(())
}

/// Expand the command-line inputs into script paths, recursing into
/// directories. Output order is deterministic.
fn collect_script_paths(inputs: &[String]) -> anyhow::Result<Vec<ScriptPath>> {
    let mut paths = Vec::new();
    for input in inputs {
        let meta = std::fs::metadata(input)
            .with_context(|| format!("Cannot access path: '{input}'"))?;
        if meta.is_dir() {
            for entry in WalkDir::new(input).into_iter().filter_map(Result::ok) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let Some(raw) = entry.path().to_str() else {
                    log::warn!("Skipping non-UTF-8 path: {}", entry.path().display());
                    continue;
                };
                let path = absolute_script_path(raw)?;
                if is_dialect_path(&path) {
                    paths.push(path);
                }
            }
        } else {
            paths.push(absolute_script_path(input)?);
        }
    }
    paths.sort();
    paths.dedup();
    Ok(paths)
}

fn absolute_script_path(raw: &str) -> anyhow::Result<ScriptPath> {
    let absolute = std::fs::canonicalize(raw)
        .with_context(|| format!("Cannot resolve path: '{raw}'"))?;
    let raw = absolute
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Non-UTF-8 path: '{}'", absolute.display()))?;
    Ok(ScriptPath::new(raw))
}

fn print_summary(index: &ScriptIndex<FsContentProvider>) {
    let mut entries = index.cache().snapshot();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    for (path, script) in entries {
        println!(
            "{}: {} functions, {} labels, {} variables, {} includes",
            path,
            script.func_defs.len(),
            script.labels.len(),
            script.variables.len(),
            script.included_paths.len()
        );
        for def in &script.func_defs {
            println!("  {}:{} {}", def.line + 1, def.character, def.full);
        }
        for label in &script.labels {
            println!("  {}:{} {}:", label.line + 1, label.character, label.name);
        }
    }
}

fn print_json(index: &ScriptIndex<FsContentProvider>) -> anyhow::Result<()> {
    let mut entries = index.cache().snapshot();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    let map: serde_json::Map<String, serde_json::Value> = entries
        .into_iter()
        .map(|(path, script)| {
            let value = serde_json::to_value(script.as_ref())?;
            Ok((path.as_str().to_string(), value))
        })
        .collect::<anyhow::Result<_>>()?;
    println!("{}", serde_json::to_string_pretty(&map)?);
    Ok(())
}

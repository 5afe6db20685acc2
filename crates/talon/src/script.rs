//
// script.rs
//
// Per-file symbol table produced by indexing
//

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::script_path::ScriptPath;

/// Symbols and structures parsed from one script file.
///
/// A `Script` is immutable once built; rebuilding a file replaces the whole
/// value in the cache. Symbol sequences preserve source order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Script {
    pub func_defs: Vec<FuncDef>,
    pub func_refs: Vec<FuncRef>,
    pub labels: Vec<Label>,
    pub variables: Vec<Variable>,
    pub blocks: Vec<Block>,
    /// Absolute paths declared via `#include`, in source order. Recorded even
    /// when the target file does not exist, so downstream tooling can offer
    /// to create it. Not deduplicated at this level.
    pub included_paths: Vec<ScriptPath>,
}

/// A call-site reference to a function by name. The definition site itself
/// also produces one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuncRef {
    pub name: String,
    pub path: ScriptPath,
    pub line: usize,
    pub character: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    pub name: String,
    pub path: ScriptPath,
    pub line: usize,
    pub character: usize,
}

/// A named `;;` marker. Purely navigational, not a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub name: String,
    pub path: ScriptPath,
    pub line: usize,
    pub character: usize,
}

/// A detected variable. Holds only a back-reference to its owning function
/// (by name); global variables have no owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    pub name: String,
    pub path: ScriptPath,
    pub line: usize,
    pub character: usize,
    pub is_global: bool,
    pub owner: Option<String>,
}

/// A function or method definition. In AHK v1, methods are functions attached
/// to an object, so `FuncDef` covers method definitions too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuncDef {
    /// Raw header text as written, e.g. `Add(a := 1, b*)`.
    pub origin: String,
    /// Bare identifier.
    pub name: String,
    /// Parameter names with default/type decorations stripped.
    pub params: Vec<String>,
    /// Header text with the parameter list normalized to `name, ...`.
    pub full: String,
    pub path: ScriptPath,
    pub line: usize,
    pub character: usize,
    /// Line of the closing brace that ends the body; unset if never closed.
    pub end_line: Option<usize>,
    /// True when the body's opening brace sits on the header line.
    pub with_quote: bool,
    /// Whole-line comment immediately preceding the header, if any.
    pub comment: Option<String>,
    /// Local variables discovered within the body.
    pub variables: Vec<Variable>,
}

fn param_list_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\((.+?)\)\s*$").unwrap())
}

fn param_name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^:=* \t]+").unwrap())
}

impl FuncDef {
    pub fn new(
        origin: &str,
        name: &str,
        path: ScriptPath,
        line: usize,
        character: usize,
        with_quote: bool,
        comment: Option<String>,
    ) -> Self {
        let (params, full) = build_params(origin);
        Self {
            origin: origin.to_string(),
            name: name.to_string(),
            params,
            full,
            path,
            line,
            character,
            end_line: None,
            with_quote,
            comment,
            variables: Vec::new(),
        }
    }

    /// Add body-local variables, skipping names already present as either a
    /// local or a parameter. Parameters and body locals stay disjoint.
    pub fn push_variable(&mut self, variables: Vec<Variable>) {
        'next: for variable in variables {
            for cur in &self.variables {
                if cur.name == variable.name {
                    continue 'next;
                }
            }
            for param in &self.params {
                if *param == variable.name {
                    continue 'next;
                }
            }
            self.variables.push(variable);
        }
    }
}

/// Derive the parameter names and the normalized header from a raw header.
/// `Add(a := 1, b*)` yields `["a", "b"]` and `Add(a, b)`.
fn build_params(origin: &str) -> (Vec<String>, String) {
    let Some(caps) = param_list_pattern().captures(origin) else {
        return (Vec::new(), origin.to_string());
    };
    let inner = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let params: Vec<String> = inner
        .split(',')
        .filter(|p| !p.trim().is_empty())
        .map(|p| {
            param_name_pattern()
                .find(p)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| p.to_string())
        })
        .collect();
    let full = origin.replacen(inner, &params.join(", "), 1);
    (params, full)
}

/// Append variables to a top-level list, first occurrence by name wins.
pub fn join_variables(variables: &mut Vec<Variable>, items: Vec<Variable>) {
    'next: for item in items {
        for variable in variables.iter() {
            if variable.name == item.name {
                continue 'next;
            }
        }
        variables.push(item);
    }
}

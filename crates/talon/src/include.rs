//
// include.rs
//
// `#include` directive extraction and path resolution
//

use std::sync::OnceLock;

use regex::Regex;

use crate::script_path::{is_absolute, ScriptPath};

fn include_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The argument runs to end of line; ` ;` starts a trailing comment, while
    // a `;` without a preceding space belongs to the argument.
    RE.get_or_init(|| Regex::new(r"(?i)^\s*#include\s*,?\s*(.+?)( ;.*)?$").unwrap())
}

/// The raw text after `#include` on a directive line.
///
/// Only matches actual directives, not comments or strings that merely
/// contain `#include`. Escaped semicolons are returned verbatim, backtick
/// included; the path is not resolved or normalized here.
///
/// ```
/// use talon::include::included_path;
/// assert_eq!(included_path("#include , a b.ahk"), Some("a b.ahk".to_string()));
/// assert_eq!(included_path("  #include path/to/file.ahk"), Some("path/to/file.ahk".to_string()));
/// assert_eq!(included_path("include , a b.ahk"), None); // no `#`
/// assert_eq!(included_path("#include <myLib>"), Some("<myLib>".to_string()));
/// assert_eq!(included_path("#include semi-colon ;and-more.ahk"), Some("semi-colon".to_string()));
/// assert_eq!(included_path("#include semi-colon`;and-more.ahk"), Some("semi-colon`;and-more.ahk".to_string()));
/// ```
pub fn included_path(line: &str) -> Option<String> {
    include_pattern()
        .captures(line)
        .map(|caps| caps[1].to_string())
}

/// Trim, unescape semicolons (the only escape-eligible character here), and
/// substitute the built-in path variables. `A_WorkingDir` is assumed to equal
/// `A_ScriptDir`.
fn substitute_builtins(raw: &str, base: &ScriptPath, base_dir: &ScriptPath) -> String {
    let mut s = raw.trim().replace("`;", ";");
    for var in ["%A_ScriptDir%", "%A_WorkingDir%"] {
        if let Some(idx) = s.find(var) {
            s.replace_range(idx..idx + var.len(), base_dir.as_str());
            break;
        }
    }
    if let Some(idx) = s.find("%A_LineFile%") {
        s.replace_range(idx..idx + "%A_LineFile%".len(), base.as_str());
    }
    s
}

/// Resolve the absolute, normalized path named by a `#include` directive.
///
/// Does not check that the path exists or names a file. Library-style
/// includes (`<Lib>`) are recognized but signal "skip" — they resolve through
/// the library naming convention at lookup time, not to a filesystem path
/// here. Returns `None` for non-directive lines and library includes.
pub fn resolve_included_path(base: &ScriptPath, line: &str) -> Option<ScriptPath> {
    let raw = included_path(line)?;
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('<') {
        return None;
    }
    let base_dir = base.parent()?;
    let substituted = substitute_builtins(raw, base, &base_dir);
    let resolved = if is_absolute(&substituted) {
        ScriptPath::new(&substituted)
    } else {
        base_dir.join(&substituted)
    };
    log::trace!("Resolved include '{}' from {} to {}", raw, base, resolved);
    Some(resolved)
}

//
// script_path.rs
//
// Normalized script path identity used as the cache key
//

use std::fmt;

use serde::Serialize;

/// Normalized, case-sensitive, forward-slash path to a script file.
///
/// This is the universal key for the script cache and for every cross-file
/// back-reference in the symbol model. Normalization:
/// - backslashes become `/`
/// - `.` segments are dropped, `..` pops the previous segment (never above
///   the root)
/// - runs of separators collapse
/// - a leading `/` before a drive-letter prefix is stripped, so the
///   editor-URI form `/c:/users/main.ahk` and the native form
///   `c:/users/main.ahk` are the same identity
///
/// Comparison is case-sensitive; the library-file naming convention compares
/// case-insensitively via [`ScriptPath::eq_ignore_case`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ScriptPath(String);

impl ScriptPath {
    pub fn new(raw: &str) -> Self {
        Self(normalize(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Containing directory, without a trailing slash.
    /// A path with no separator has no parent.
    pub fn parent(&self) -> Option<ScriptPath> {
        let idx = self.0.rfind('/')?;
        if idx == 0 {
            // Root-relative file like "/main.ahk"
            return Some(ScriptPath("/".to_string()));
        }
        Some(ScriptPath(self.0[..idx].to_string()))
    }

    /// Final path component.
    pub fn file_name(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// Join a relative path onto this path (treated as a directory) and
    /// re-normalize. An absolute `other` replaces `self` entirely.
    pub fn join(&self, other: &str) -> ScriptPath {
        if is_absolute(other) {
            return ScriptPath::new(other);
        }
        let mut joined = self.0.clone();
        if !joined.ends_with('/') {
            joined.push('/');
        }
        joined.push_str(other);
        ScriptPath::new(&joined)
    }

    /// Case-insensitive identity comparison, used only by the library-file
    /// naming convention.
    pub fn eq_ignore_case(&self, other: &ScriptPath) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// The file extension, lowercased, without the dot.
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name();
        let idx = name.rfind('.')?;
        if idx == 0 || idx + 1 == name.len() {
            return None;
        }
        Some(name[idx + 1..].to_ascii_lowercase())
    }
}

impl fmt::Display for ScriptPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a raw path string is absolute: rooted (`/...`, `\...`) or carrying
/// a drive-letter prefix (`c:/...`).
pub fn is_absolute(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    if bytes.first() == Some(&b'/') || bytes.first() == Some(&b'\\') {
        return true;
    }
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn has_drive_prefix(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn normalize(raw: &str) -> String {
    let mut s = raw.replace('\\', "/");

    // "/c:/..." is the editor-URI spelling of "c:/..."
    if s.len() >= 3 && s.starts_with('/') && has_drive_prefix(&s[1..]) {
        s.remove(0);
    }

    let rooted = s.starts_with('/');
    let drive = if has_drive_prefix(&s) {
        let d = s[..2].to_string();
        s = s[2..].to_string();
        Some(d)
    } else {
        None
    };

    let mut segments: Vec<&str> = Vec::new();
    for seg in s.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                // Never pop above the root or drive prefix
                if segments.last().is_some_and(|l| *l != "..") {
                    segments.pop();
                } else if !rooted && drive.is_none() {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let mut out = String::new();
    if let Some(ref d) = drive {
        out.push_str(d);
    }
    if rooted || drive.is_some() {
        out.push('/');
    }
    out.push_str(&segments.join("/"));
    // A bare drive or root keeps its trailing slash; everything else drops it
    if out.ends_with('/') && out.len() > 1 && !segments.is_empty() {
        out.pop();
    }
    if out.is_empty() {
        out.push('.');
    }
    out
}

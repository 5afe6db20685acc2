//
// purify.rs
//
// Line purification: strips the parts of a raw line that would otherwise
// trigger false structural matches (comments, string contents, brace
// literals, GUI/MsgBox argument text)
//

use std::sync::OnceLock;

use regex::Regex;

struct PurifyPatterns {
    string_literal: Regex,
    braces: Regex,
    spaces: Regex,
    gui: Regex,
    msgbox: Regex,
}

fn patterns() -> &'static PurifyPatterns {
    static PATTERNS: OnceLock<PurifyPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| PurifyPatterns {
        // Collapse string literals to an empty placeholder literal
        string_literal: Regex::new(r#"".*?""#).unwrap(),
        // Remove matched brace content, first `{` through last `}`
        braces: Regex::new(r"\{.*\}").unwrap(),
        spaces: Regex::new(r" +").unwrap(),
        // GUI commands carry free-form argument text
        gui: Regex::new(r"(?i)\bgui\b.*").unwrap(),
        // MsgBox text up to a `%` deref is display text, not code
        msgbox: Regex::new(r"(?i)\b(msgbox)\b.+?%").unwrap(),
    })
}

fn comment_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*;\s*(.+)").unwrap())
}

/// Strip a trailing line comment: everything from the first `;` that is not
/// escaped with a backtick. Escaped semicolons (`` `; ``) are text.
fn strip_line_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b';' && (i == 0 || bytes[i - 1] != b'`') {
            return &line[..i];
        }
    }
    line
}

/// Trim non-structural content out of a raw line of code.
///
/// All structural detection (functions, labels, variables, braces) runs on
/// the purified line so comments and string contents never produce matches.
pub fn purify(original: &str) -> String {
    if original.is_empty() {
        return String::new();
    }
    let p = patterns();
    let text = strip_line_comment(original);
    let text = p.string_literal.replace_all(text, "\"\"");
    let text = p.braces.replace_all(&text, "");
    let text = p.spaces.replace_all(&text, " ");
    let text = p.gui.replace_all(&text, "");
    let text = p.msgbox.replace_all(&text, "$1");
    text.into_owned()
}

/// The text of a whole-line `;` comment, excluding the `;` and leading
/// whitespace. `None` when the line has non-comment text.
pub fn full_line_comment(line: &str) -> Option<String> {
    comment_pattern()
        .captures(line)
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_trailing_comment() {
        assert_eq!(purify("x := 1 ; set x"), "x := 1 ");
    }

    #[test]
    fn test_escaped_semicolon_is_text() {
        assert_eq!(purify("Send a`;b ; real comment"), "Send a`;b ");
    }

    #[test]
    fn test_string_contents_collapsed() {
        assert_eq!(purify(r#"x := "Foo(1)" . y"#), r#"x := "" . y"#);
        // Text that looks like a directive inside a string goes away
        assert_eq!(purify(r##"x := "#include a.ahk""##), r#"x := """#);
    }

    #[test]
    fn test_brace_content_removed() {
        assert_eq!(purify("obj := {a: 1, b: 2}"), "obj := ");
        // An unmatched opening brace survives
        assert_eq!(purify("Foo() {"), "Foo() {");
    }

    #[test]
    fn test_spaces_collapse() {
        assert_eq!(purify("x   :=    1"), "x := 1");
    }

    #[test]
    fn test_gui_command_arguments_stripped() {
        assert_eq!(purify("Gui, Add, Text,, name:"), "");
        assert_eq!(purify("  gui Show"), "  ");
    }

    #[test]
    fn test_msgbox_text_stripped_to_deref() {
        assert_eq!(purify("MsgBox result is %count%"), "MsgBoxcount%");
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(purify(""), "");
    }

    #[test]
    fn test_full_line_comment() {
        assert_eq!(
            full_line_comment("; Adds two numbers").as_deref(),
            Some("Adds two numbers")
        );
        assert_eq!(
            full_line_comment("   ;   indented  ").as_deref(),
            Some("indented  ")
        );
        assert_eq!(full_line_comment("x := 1 ; trailing"), None);
        assert_eq!(full_line_comment(""), None);
    }
}

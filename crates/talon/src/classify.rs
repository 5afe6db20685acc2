//
// classify.rs
//
// Line-local heuristics: function definitions/calls, labels, block markers,
// variables, block comments. No grammar — each rule is an independent
// predicate/extractor over the purified line.
//

use std::sync::OnceLock;

use regex::Regex;

use crate::purify::{full_line_comment, purify};
use crate::script::{FuncDef, FuncRef, Variable};
use crate::script_path::ScriptPath;

/// Outcome of function detection for one line.
#[derive(Debug)]
pub enum FuncLine {
    Def(FuncDef),
    Calls(Vec<FuncRef>),
}

struct ClassifyPatterns {
    block_comment_open: Regex,
    block_comment_close: Regex,
    /// Identifier (word chars + CJK ideographs) + lazily matched argument list
    func_candidate: Regex,
    next_line_opens_body: Regex,
    label: Regex,
    block_marker: Regex,
    var_assign: Regex,
    paren_group: Regex,
    command_token: Regex,
}

fn patterns() -> &'static ClassifyPatterns {
    static PATTERNS: OnceLock<ClassifyPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| ClassifyPatterns {
        block_comment_open: Regex::new(r"^[ \t]*/\*").unwrap(),
        block_comment_close: Regex::new(r"\*/").unwrap(),
        func_candidate: Regex::new(r"([\x{4e00}-\x{9fa5}_a-zA-Z0-9]+)\(.*?\)").unwrap(),
        next_line_opens_body: Regex::new(r"^\s*\{").unwrap(),
        label: Regex::new(r"^[ \t]*([\x{4e00}-\x{9fa5}_a-zA-Z0-9]+):").unwrap(),
        block_marker: Regex::new(r";;(.+)").unwrap(),
        var_assign: Regex::new(r"([0-9A-Za-z_]+)\s*([+\-*/.:])?=").unwrap(),
        paren_group: Regex::new(r"\(.+?\)").unwrap(),
        command_token: Regex::new(r"([0-9A-Za-z_]+)[ \t,]+").unwrap(),
    })
}

/// Reserved words that the command-argument variable heuristic must skip.
const VAR_KEYWORDS: &[&str] = &["and", "or", "new", "extends", "if", "loop"];

/// Whether this line opens block-comment mode.
pub fn opens_block_comment(line: &str) -> bool {
    patterns().block_comment_open.is_match(line)
}

/// Whether this line closes block-comment mode.
pub fn closes_block_comment(line: &str) -> bool {
    patterns().block_comment_close.is_match(line)
}

/// Find the first call-shaped span in a purified line, skipping spans where
/// the text before the parenthesis ends with a control-flow keyword
/// (`if`/`while`), which make `if(...)`-style conditions look like calls.
fn func_candidate(text: &str) -> Option<(usize, usize, usize)> {
    let re = &patterns().func_candidate;
    let mut pos = 0;
    while pos <= text.len() {
        let caps = re.captures_at(text, pos)?;
        let name = caps.get(1).unwrap();
        let paren = name.end();
        let before = text[..paren].to_lowercase();
        if before.ends_with("if") || before.ends_with("while") {
            // Control flow, not a call. Resume after this parenthesis.
            pos = paren + 1;
            continue;
        }
        return Some((name.start(), name.end(), caps.get(0).unwrap().end()));
    }
    None
}

/// Detect the function definition or the function call(s) on a line.
///
/// A span covering the whole purified line (up to a trailing `{`) is a
/// definition when the brace is present, or when the next non-blank line
/// opens with one; otherwise it is a call. A span embedded in a longer line
/// means nested/chained calls: the outermost call is recorded and stripped,
/// and the remainder is re-classified, one `FuncRef` per call.
pub fn detect_function(path: &ScriptPath, lines: &[String], line_num: usize) -> Option<FuncLine> {
    let original = lines.get(line_num)?;
    detect_function_in(path, lines, line_num, original)
}

fn detect_function_in(
    path: &ScriptPath,
    lines: &[String],
    line_num: usize,
    original: &str,
) -> Option<FuncLine> {
    let text = purify(original);
    let (name_start, name_end, span_end) = func_candidate(&text)?;
    let name = &text[name_start..name_end];
    let character = original.find(name).unwrap_or(0);

    let leading_ok = text[..name_start].trim().is_empty();
    let remainder = text[span_end..].trim();
    let covers_line = leading_ok && (remainder.is_empty() || remainder == "{");

    if !covers_line {
        // The span is embedded in a longer expression: one or more calls.
        let mut refs = vec![FuncRef {
            name: name.to_string(),
            path: path.clone(),
            line: line_num,
            character,
        }];
        // Strip the outermost call's `name(` and re-classify the rest.
        if let Ok(strip) = Regex::new(&format!(r"{}\s*\(", regex::escape(name))) {
            let rest = strip.replacen(original, 1, "").into_owned();
            match detect_function_in(path, lines, line_num, &rest) {
                Some(FuncLine::Calls(more)) => refs.extend(more),
                Some(FuncLine::Def(def)) => refs.push(FuncRef {
                    name: def.name,
                    path: def.path,
                    line: def.line,
                    character: def.character,
                }),
                None => {}
            }
        }
        return Some(FuncLine::Calls(refs));
    }

    let full_name = &text[name_start..span_end];
    let comment = if line_num > 0 {
        full_line_comment(&lines[line_num - 1])
    } else {
        None
    };

    if remainder == "{" {
        return Some(FuncLine::Def(FuncDef::new(
            full_name,
            name,
            path.clone(),
            line_num,
            character,
            true,
            comment,
        )));
    }

    // Whole-line call with no brace: a body opening on the next non-blank
    // line still makes this a definition.
    for next in lines.iter().skip(line_num + 1) {
        let next_text = purify(next);
        if next_text.trim().is_empty() {
            continue;
        }
        if patterns().next_line_opens_body.is_match(&next_text) {
            return Some(FuncLine::Def(FuncDef::new(
                full_name,
                name,
                path.clone(),
                line_num,
                character,
                false,
                comment,
            )));
        }
        return Some(FuncLine::Calls(vec![FuncRef {
            name: name.to_string(),
            path: path.clone(),
            line: line_num,
            character,
        }]));
    }
    // Trailing call at end of file with nothing after it
    None
}

/// Detect a label on a purified line: identifier + single `:` not followed by
/// `:` or `=`. The `case`/`default` pseudo-labels of switch blocks are
/// excluded.
pub fn detect_label(path: &ScriptPath, text: &str, line_num: usize) -> Option<crate::script::Label> {
    let caps = patterns().label.captures(text)?;
    let name = caps.get(1).unwrap();
    let after = text[name.end() + 1..].chars().next();
    if matches!(after, Some(':') | Some('=')) {
        return None;
    }
    let lower = name.as_str().to_lowercase();
    if lower == "case" || lower == "default" {
        return None;
    }
    Some(crate::script::Label {
        name: name.as_str().to_string(),
        path: path.clone(),
        line: line_num,
        character: name.start(),
    })
}

/// Detect a `;;` block marker on the raw line; the remaining text names the
/// block.
pub fn detect_block(path: &ScriptPath, line: &str, line_num: usize) -> Option<crate::script::Block> {
    let caps = patterns().block_marker.captures(line)?;
    let name = caps.get(1).unwrap();
    Some(crate::script::Block {
        name: name.as_str().to_string(),
        path: path.clone(),
        line: line_num,
        character: name.start(),
    })
}

/// Detect variables on a purified line.
///
/// Assignment form: `name (op)?=` where `==`/`!=` comparisons never match.
/// Otherwise the command-argument form tokenizes comma/space-delimited
/// identifiers after stripping parenthesized groups, skipping the command
/// name and reserved keywords; remaining tokens are treated as output
/// variables. The command form knowingly over-approximates; it carries no
/// table of command signatures.
pub fn detect_variables(path: &ScriptPath, text: &str, line_num: usize) -> Vec<Variable> {
    let p = patterns();

    for caps in p.var_assign.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        // Reject `==` / `=!...` style comparisons and require an assigned value
        match text[whole.end()..].chars().next() {
            None | Some('=') | Some('!') => continue,
            Some(_) => {}
        }
        let name = caps.get(1).unwrap().as_str();
        return vec![Variable {
            name: name.to_string(),
            path: path.clone(),
            line: line_num,
            character: text.find(name).unwrap_or(0),
            is_global: true,
            owner: None,
        }];
    }

    let stripped = p.paren_group.replace_all(text, "");
    let mut vars = Vec::new();
    for (index, caps) in p.command_token.captures_iter(&stripped).enumerate() {
        if index == 0 {
            // First token is the command name
            continue;
        }
        let name = caps.get(1).unwrap().as_str();
        if VAR_KEYWORDS.contains(&name.to_lowercase().as_str()) {
            continue;
        }
        vars.push(Variable {
            name: name.to_string(),
            path: path.clone(),
            line: line_num,
            character: text.find(caps.get(0).unwrap().as_str()).unwrap_or(0),
            is_global: true,
            owner: None,
        });
    }
    vars
}

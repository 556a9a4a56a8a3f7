//! Tera-backed template engine with a configurable delimiter pair.
//!
//! tera only understands `{{ }}` / `{% %}` / `{# #}`, so every template is
//! first compiled from the configured delimiter syntax into tera syntax:
//!
//! | Source (delims `[[ ]]`)        | Compiled tera                |
//! |--------------------------------|------------------------------|
//! | `[[ .name ]]`                  | `{{ name }}`                 |
//! | `[[ name \| upper ]]`          | `{{ name \| upper }}`        |
//! | `[[ if .debug ]]…[[ endif ]]`  | `{% if debug %}…{% endif %}` |
//! | `[[- .x -]]`                   | `{{- x -}}`                  |
//! | `[[/* note */]]`               | *(nothing)*                  |
//! | literal `{{` in text           | `{{ "{{" }}`                 |
//!
//! Text outside the delimiter pair is always literal.

use std::path::Path;

use stencil_core::Delimiters;
use tera::Tera;

use crate::error::RenderError;

/// First words that turn an action into a tera statement tag.
const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "elif", "else", "endif", "for", "endfor", "set", "set_global", "filter", "endfilter",
    "break", "continue",
];

/// Characters after which a `.` starts a dot-context field path.
const OPERAND_BOUNDARY: &[char] = &[
    '(', '[', ',', '|', '=', '+', '-', '*', '/', '%', '<', '>', '!', '~', ':',
];

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Parses and evaluates single templates written in a delimiter syntax.
///
/// Holds no per-template state, so one engine is shared by every target.
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    delimiters: Delimiters,
}

impl TemplateEngine {
    pub fn new(delimiters: Delimiters) -> Self {
        Self { delimiters }
    }

    /// Render `source` against `ctx`.
    ///
    /// `path` is only used to annotate errors. Syntax problems (including an
    /// unclosed action) map to [`RenderError::TemplateSyntax`]; failures while
    /// substituting map to [`RenderError::TemplateEvaluation`].
    pub fn render(
        &self,
        path: &Path,
        source: &str,
        ctx: &tera::Context,
    ) -> Result<String, RenderError> {
        let syntax = |source| RenderError::TemplateSyntax {
            path: path.to_path_buf(),
            source,
        };
        let compiled = compile(source, &self.delimiters).map_err(syntax)?;

        let name = template_name(path);
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(&name, &compiled).map_err(syntax)?;
        tera.render(&name, ctx)
            .map_err(|source| RenderError::TemplateEvaluation {
                path: path.to_path_buf(),
                source,
            })
    }
}

fn template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

// ---------------------------------------------------------------------------
// Compilation to tera syntax
// ---------------------------------------------------------------------------

/// Translate a template in `delims` syntax into tera syntax.
pub fn compile(source: &str, delims: &Delimiters) -> Result<String, tera::Error> {
    let (left, right) = (delims.left.as_str(), delims.right.as_str());
    let mut out = String::with_capacity(source.len() + source.len() / 8);
    let mut rest = source;

    while let Some(open) = rest.find(left) {
        push_text(&mut out, &rest[..open]);
        let action = &rest[open + left.len()..];
        let close = match comment_close(action, right) {
            Some(close) => close,
            None => find_close(action, right),
        };
        let Some(close) = close else {
            let offset = source.len() - rest.len() + open;
            return Err(tera::Error::msg(format!(
                "unclosed action: '{left}' at line {} has no matching '{right}'",
                line_of(source, offset)
            )));
        };
        push_action(&mut out, &action[..close])?;
        rest = &action[close + right.len()..];
    }
    push_text(&mut out, rest);
    Ok(out)
}

/// For a comment action (`/* … */`, optionally trim-marked), the offset of
/// `right` after the closing `*/`. `None` if the action is not a comment.
///
/// Comment text is opaque, so quotes inside it are not tracked.
fn comment_close(action: &str, right: &str) -> Option<Option<usize>> {
    let (_, body) = strip_trim_marker(action, true);
    let after_open = body.trim_start().strip_prefix("/*")?;
    let Some(end) = after_open.find("*/") else {
        return Some(None);
    };
    let tail = after_open[end + 2..].trim_start();
    let tail = match tail.strip_prefix('-') {
        Some(rest) if rest.starts_with(right) => rest,
        _ => tail,
    };
    if tail.starts_with(right) {
        Some(Some(action.len() - tail.len()))
    } else {
        Some(None)
    }
}

/// Emit literal text, neutralising anything tera would read as a tag opener.
///
/// A trailing `{` is escaped as well since the next emitted tag starts with `{`.
fn push_text(out: &mut String, mut text: &str) {
    while let Some((pos, len)) = find_tag_opener(text) {
        out.push_str(&text[..pos]);
        out.push_str("{{ \"");
        out.push_str(&text[pos..pos + len]);
        out.push_str("\" }}");
        text = &text[pos + len..];
    }
    out.push_str(text);
}

fn find_tag_opener(text: &str) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    text.match_indices('{').find_map(|(i, _)| match bytes.get(i + 1) {
        Some(b'{' | b'%' | b'#') => Some((i, 2)),
        None => Some((i, 1)),
        Some(_) => None,
    })
}

/// Byte offset of `right` in `action`, ignoring occurrences inside string literals.
fn find_close(action: &str, right: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in action.char_indices() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None if action[i..].starts_with(right) => return Some(i),
            None if matches!(c, '"' | '\'' | '`') => quote = Some(c),
            None => {}
        }
    }
    None
}

fn push_action(out: &mut String, body: &str) -> Result<(), tera::Error> {
    let (trim_left, body) = strip_trim_marker(body, true);
    let (trim_right, body) = strip_trim_marker(body, false);
    let body = body.trim();

    if body.starts_with("/*") && body.ends_with("*/") && body.len() >= 4 {
        // Keep the trim markers' effect on surrounding whitespace.
        if trim_left || trim_right {
            out.push_str(if trim_left { "{{- \"\"" } else { "{{ \"\"" });
            out.push_str(if trim_right { " -}}" } else { " }}" });
        }
        return Ok(());
    }
    if body.is_empty() {
        return Err(tera::Error::msg("empty action"));
    }

    let keyword = body.split_whitespace().next().unwrap_or_default();
    let (open, close) = if STATEMENT_KEYWORDS.contains(&keyword) {
        ("{%", "%}")
    } else {
        ("{{", "}}")
    };

    out.push_str(open);
    out.push_str(if trim_left { "- " } else { " " });
    out.push_str(&strip_dot_context(body));
    out.push_str(if trim_right { " -" } else { " " });
    out.push_str(close);
    Ok(())
}

/// `- x` / `x -` whitespace-trim markers: a dash separated from the body by whitespace.
fn strip_trim_marker(body: &str, leading: bool) -> (bool, &str) {
    if leading {
        match body.strip_prefix('-') {
            Some(rest) if rest.starts_with(char::is_whitespace) => (true, rest),
            _ => (false, body),
        }
    } else {
        match body.strip_suffix('-') {
            Some(rest) if rest.ends_with(char::is_whitespace) => (true, rest),
            _ => (false, body),
        }
    }
}

/// Rewrite dot-context references: `.a.b` → `a.b`, a bare `.` → the whole context.
fn strip_dot_context(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut quote: Option<char> = None;
    let mut chars = body.chars().peekable();
    let mut prev: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            out.push(c);
            prev = Some(c);
            continue;
        }
        if matches!(c, '"' | '\'' | '`') {
            quote = Some(c);
        } else if c == '.' && prev.map_or(true, |p| p.is_whitespace() || OPERAND_BOUNDARY.contains(&p)) {
            match chars.peek() {
                Some(&n) if n.is_alphabetic() || n == '_' => {
                    prev = Some(c);
                    continue;
                }
                None => {
                    out.push_str("__tera_context");
                    break;
                }
                Some(&n) if n.is_whitespace() || n == '|' || n == ')' => {
                    out.push_str("__tera_context");
                    prev = Some('t');
                    continue;
                }
                Some(_) => {}
            }
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].bytes().filter(|&b| b == b'\n').count() + 1
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

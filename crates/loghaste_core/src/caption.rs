use std::sync::LazyLock;

use regex::Regex;

/// Longest caption kept verbatim, in characters.
pub const MAX_CAPTION_CHARS: usize = 30;

const ELLIPSIS: char = '⋯';

static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r?\n").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Flattens source text so it fits inside a single-quoted string.
pub fn escape(input: &str) -> String {
    let s = LINE_BREAK.replace_all(input, "");
    let s = s.replace('\'', "\"");
    WHITESPACE.replace_all(&s, " ").into_owned()
}

/// Shortens `input` to at most [`MAX_CAPTION_CHARS`] characters. A call that
/// would be cut inside its argument list keeps a closing parenthesis. The cut
/// never splits a backslash escape.
pub fn truncate(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    if chars.len() <= MAX_CAPTION_CHARS {
        return input.to_string();
    }

    let keep = escape_boundary(&chars, MAX_CAPTION_CHARS - 2);
    if input.ends_with(')') {
        let open: isize = chars[..keep]
            .iter()
            .map(|&c| match c {
                '(' => 1,
                ')' => -1,
                _ => 0,
            })
            .sum();
        if open > 0 {
            let mut out: String = chars[..keep].iter().collect();
            out.push(ELLIPSIS);
            out.push(')');
            return out;
        }
    }

    let keep = escape_boundary(&chars, MAX_CAPTION_CHARS - 1);
    let mut out: String = chars[..keep].iter().collect();
    out.push(ELLIPSIS);
    out
}

/// `cut`, or the start of the escape sequence it would split.
fn escape_boundary(chars: &[char], cut: usize) -> usize {
    let mut i = 0;
    while i < cut {
        if chars[i] != '\\' {
            i += 1;
            continue;
        }
        let len = escape_len(&chars[i..]);
        if i + len > cut {
            return i;
        }
        i += len;
    }
    cut
}

/// Length of the escape at the start of `rest`, backslash included.
fn escape_len(rest: &[char]) -> usize {
    match rest.get(1) {
        None => 1,
        Some('x') => 4,
        Some('u') if rest.get(2) == Some(&'{') => rest.iter().position(|&c| c == '}').map_or(rest.len(), |p| p + 1),
        Some('u') => 6,
        Some(_) => 2,
    }
}

/// `console.log('*** caption')`, or with ` »` and the echoed expression.
pub fn create_log(caption: &str, expression: Option<&str>) -> String {
    match expression {
        Some(expr) => format!("console.log('*** {caption} »', {expr})"),
        None => format!("console.log('*** {caption}')"),
    }
}

//! Recursive-descent scanner for template text
//!
//! Splits text into a flat sequence of [`Node`]s. The same node shape serves
//! both passes: in [`Mode::Invocations`] a region is the inside of
//! `@[ ... ]`, in [`Mode::Commands`] it is the inside of a back-quote pair.
//! The invocation pass never looks inside a back-quote pair.

use crate::error::{Error, RegionKind, Result};

pub const ESCAPE: char = '\\';
pub const INVOKE: char = '@';
pub const TICK: char = '`';

/// What the scanner treats as a region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `@[name args...]`, escaped with `\@`
    Invocations,
    /// `` `command` ``, escaped with `` \` ``
    Commands,
}

impl Mode {
    fn marker(self) -> char {
        match self {
            Self::Invocations => INVOKE,
            Self::Commands => TICK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<'a> {
    /// Text copied through unchanged
    Text(&'a str),
    /// A marker character whose escape was consumed
    Escaped(char),
    /// Contents of an invocation or command region, delimiters excluded
    Region(&'a str),
}

/// Scan `src` into nodes for the given pass
pub fn parse(src: &str, mode: Mode) -> Result<Vec<Node<'_>>> {
    let marker = mode.marker();
    let mut nodes = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while let Some(c) = src[pos..].chars().next() {
        if c == ESCAPE && src[pos + 1..].starts_with(marker) {
            push_text(&mut nodes, &src[text_start..pos]);
            nodes.push(Node::Escaped(marker));
            pos += 1 + marker.len_utf8();
            text_start = pos;
            continue;
        }

        // Back-quoted spans stay whole, escapes included, for the substitution pass
        if mode == Mode::Invocations {
            if c == ESCAPE && src[pos + 1..].starts_with(TICK) {
                pos += 1 + TICK.len_utf8();
                continue;
            }
            if c == TICK {
                if let Ok((_, end)) = command_at(src, pos) {
                    pos = end;
                    continue;
                }
            }
        }

        if c == marker {
            let region = match mode {
                Mode::Invocations => invocation_at(src, pos)?,
                Mode::Commands => Some(command_at(src, pos)?),
            };

            if let Some((contents, end)) = region {
                push_text(&mut nodes, &src[text_start..pos]);
                nodes.push(Node::Region(contents));
                pos = end;
                text_start = pos;
                continue;
            }
        }

        pos += c.len_utf8();
    }

    push_text(&mut nodes, &src[text_start..]);
    Ok(nodes)
}

fn push_text<'a>(nodes: &mut Vec<Node<'a>>, text: &'a str) {
    if !text.is_empty() {
        nodes.push(Node::Text(text));
    }
}

/// Length of the macro name at the start of `s`, if there is one
pub fn identifier_len(s: &str) -> Option<usize> {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return None,
    }
    let len = chars
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map_or(s.len(), |(i, _)| i);
    Some(len)
}

/// Split `s` into words with POSIX shell quoting
///
/// Unlike a shell, a word starting with `#` is an ordinary word, not a comment.
/// Returns `None` on unbalanced quotes or a dangling escape.
pub fn split_words(s: &str) -> Option<Vec<String>> {
    let mut guarded = String::with_capacity(s.len());
    let mut chars = s.chars();
    let mut single = false;
    let mut double = false;
    let mut word_start = true;

    while let Some(c) = chars.next() {
        match c {
            ESCAPE if !single => {
                guarded.push(c);
                if let Some(next) = chars.next() {
                    guarded.push(next);
                }
                word_start = false;
                continue;
            }
            '\'' if !double => single = !single,
            '"' if !single => double = !double,
            '#' if word_start => guarded.push(ESCAPE),
            _ => {}
        }
        guarded.push(c);
        word_start = !single && !double && matches!(c, ' ' | '\t' | '\n');
    }

    shlex::split(&guarded)
}

/// Match an invocation starting at the `@` at `start`
///
/// Returns `None` when the text is not an invocation at all (no `[`, or no
/// macro name directly inside it), and an error when it is one but never
/// closes.
fn invocation_at(src: &str, start: usize) -> Result<Option<(&str, usize)>> {
    let open = start + INVOKE.len_utf8();
    if !src[open..].starts_with('[') {
        return Ok(None);
    }

    let body_start = open + 1;
    let body = &src[body_start..];
    let Some(name_len) = identifier_len(body) else {
        return Ok(None);
    };
    match body[name_len..].chars().next() {
        Some(c) if c == ']' || c.is_whitespace() => {}
        _ => return Ok(None),
    }

    let mut depth = 1usize;
    let mut single = false;
    let mut double = false;
    let mut chars = body.char_indices().skip(name_len);

    while let Some((i, c)) = chars.next() {
        match c {
            ESCAPE if !single => {
                chars.next();
            }
            '\'' if !double => single = !single,
            '"' if !single => double = !double,
            '[' if !single && !double => depth += 1,
            ']' if !single && !double => {
                depth -= 1;
                if depth == 0 {
                    return Ok(Some((&body[..i], body_start + i + 1)));
                }
            }
            _ => {}
        }
    }

    Err(Error::unterminated(RegionKind::Invocation, &src[start..]))
}

/// Match a command region starting at the back-quote at `start`
fn command_at(src: &str, start: usize) -> Result<(&str, usize)> {
    let body_start = start + TICK.len_utf8();
    let body = &src[body_start..];
    let mut chars = body.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            ESCAPE => {
                chars.next();
            }
            TICK => return Ok((&body[..i], body_start + i + 1)),
            _ => {}
        }
    }

    Err(Error::unterminated(RegionKind::Command, &src[start..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_single_node() {
        let nodes = parse("rule cc\n  command = $cc $in\n", Mode::Invocations).unwrap();
        assert_eq!(nodes, vec![Node::Text("rule cc\n  command = $cc $in\n")]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("", Mode::Commands).unwrap().is_empty());
    }

    #[test]
    fn test_invocation_region() {
        let nodes = parse("a @[greet world] b", Mode::Invocations).unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::Text("a "),
                Node::Region("greet world"),
                Node::Text(" b"),
            ]
        );
    }

    #[test]
    fn test_invocation_without_arguments() {
        let nodes = parse("@[cflags]", Mode::Invocations).unwrap();
        assert_eq!(nodes, vec![Node::Region("cflags")]);
    }

    #[test]
    fn test_nested_invocation_kept_whole() {
        let nodes = parse("@[outer \"@[inner x]\" y]", Mode::Invocations).unwrap();
        assert_eq!(nodes, vec![Node::Region("outer \"@[inner x]\" y")]);
    }

    #[test]
    fn test_quoted_and_escaped_brackets() {
        let nodes = parse(r#"@[m "a]b" c\]d]"#, Mode::Invocations).unwrap();
        assert_eq!(nodes, vec![Node::Region(r#"m "a]b" c\]d"#)]);
    }

    #[test]
    fn test_escaped_invocation() {
        let nodes = parse(r"x \@[greet] y", Mode::Invocations).unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::Text("x "),
                Node::Escaped('@'),
                Node::Text("[greet] y"),
            ]
        );
    }

    #[test]
    fn test_at_sign_without_name_is_text() {
        for src in ["user@host", "@[]", "@[1abc]", "@[name(x)]", "trailing @"] {
            let nodes = parse(src, Mode::Invocations).unwrap();
            assert_eq!(nodes, vec![Node::Text(src)], "input: {src}");
        }
    }

    #[test]
    fn test_unterminated_invocation() {
        let err = parse("@[greet world", Mode::Invocations).unwrap_err();
        assert!(matches!(
            err,
            Error::UnterminatedRegion {
                kind: RegionKind::Invocation,
                ..
            }
        ));
    }

    #[test]
    fn test_ticks_ignored_in_invocation_mode() {
        let nodes = parse("`echo hi`", Mode::Invocations).unwrap();
        assert_eq!(nodes, vec![Node::Text("`echo hi`")]);
    }

    #[test]
    fn test_invocations_inside_ticks_left_alone() {
        let nodes = parse("a `echo '\\@[x]' @[y]` @[z]", Mode::Invocations).unwrap();
        assert_eq!(
            nodes,
            vec![Node::Text("a `echo '\\@[x]' @[y]` "), Node::Region("z")]
        );
    }

    #[test]
    fn test_escaped_tick_does_not_open_span_in_invocation_mode() {
        let nodes = parse("\\` @[x] \\`", Mode::Invocations).unwrap();
        assert_eq!(
            nodes,
            vec![Node::Text("\\` "), Node::Region("x"), Node::Text(" \\`")]
        );
    }

    #[test]
    fn test_unpaired_tick_in_invocation_mode_is_text() {
        let nodes = parse("`oops @[x]", Mode::Invocations).unwrap();
        assert_eq!(nodes, vec![Node::Text("`oops "), Node::Region("x")]);
    }

    #[test]
    fn test_split_words_keeps_hash_words() {
        assert_eq!(
            split_words("color #ff0000 a#b").unwrap(),
            vec!["color", "#ff0000", "a#b"]
        );
        assert_eq!(split_words("#first").unwrap(), vec!["#first"]);
        assert_eq!(split_words("'#q' \"#d\"").unwrap(), vec!["#q", "#d"]);
        assert_eq!(split_words("\\#x").unwrap(), vec!["#x"]);
    }

    #[test]
    fn test_split_words_quoting() {
        assert_eq!(
            split_words("greet \"big world\" it\\'s").unwrap(),
            vec!["greet", "big world", "it's"]
        );
        assert_eq!(split_words("\"\"").unwrap(), vec![""]);
        assert!(split_words("\"open").is_none());
    }

    #[test]
    fn test_command_regions() {
        let nodes = parse("cc = `which cc` and `echo x`", Mode::Commands).unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::Text("cc = "),
                Node::Region("which cc"),
                Node::Text(" and "),
                Node::Region("echo x"),
            ]
        );
    }

    #[test]
    fn test_escaped_tick_inside_command() {
        let nodes = parse(r"`echo \`date\``", Mode::Commands).unwrap();
        assert_eq!(nodes, vec![Node::Region(r"echo \`date\`")]);
    }

    #[test]
    fn test_escaped_tick_outside_command() {
        let nodes = parse(r"it\`s", Mode::Commands).unwrap();
        assert_eq!(
            nodes,
            vec![Node::Text("it"), Node::Escaped('`'), Node::Text("s")]
        );
    }

    #[test]
    fn test_unterminated_command() {
        let err = parse("ok `echo", Mode::Commands).unwrap_err();
        assert!(err.to_string().contains("unterminated command region"));
    }

    #[test]
    fn test_other_backslashes_untouched() {
        let nodes = parse(r"a\nb \\ c", Mode::Commands).unwrap();
        assert_eq!(nodes, vec![Node::Text(r"a\nb \\ c")]);
    }

    #[test]
    fn test_identifier_len() {
        assert_eq!(identifier_len("greet world"), Some(5));
        assert_eq!(identifier_len("_x9]"), Some(3));
        assert_eq!(identifier_len("abc"), Some(3));
        assert_eq!(identifier_len("9abc"), None);
        assert_eq!(identifier_len(""), None);
    }
}

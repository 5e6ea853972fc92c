/// Positional argument binding for macro bodies
///
/// Bodies use format-string placeholders: `{0}` is the macro's own name,
/// `{1}`..`{N}` are the call-site arguments, `{}` takes the next position,
/// and `{{`/`}}` produce literal braces.
use crate::error::{Error, Result};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Numbering {
    Unknown,
    Automatic,
    Manual,
}

/// Substitute `name` and `args` into `body`
pub fn bind(body: &str, name: &str, args: &[String]) -> Result<String> {
    let invalid = |reason: String| Error::InvalidPlaceholder {
        name: name.to_string(),
        reason,
    };

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    let mut numbering = Numbering::Unknown;
    let mut next_auto = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(invalid("single '}' encountered".to_string())),
            '{' => {
                let mut field = String::new();
                let mut closed = false;
                for ch in chars.by_ref() {
                    if ch == '}' {
                        closed = true;
                        break;
                    }
                    field.push(ch);
                }
                if !closed {
                    return Err(invalid("unmatched '{'".to_string()));
                }

                let index = if field.is_empty() {
                    if numbering == Numbering::Manual {
                        return Err(invalid(
                            "cannot switch from manual to automatic numbering".to_string(),
                        ));
                    }
                    numbering = Numbering::Automatic;
                    next_auto += 1;
                    next_auto - 1
                } else {
                    let index: usize = field
                        .parse()
                        .map_err(|_| invalid(format!("'{{{}}}' is not a positional field", field)))?;
                    if numbering == Numbering::Automatic {
                        return Err(invalid(
                            "cannot switch from automatic to manual numbering".to_string(),
                        ));
                    }
                    numbering = Numbering::Manual;
                    index
                };

                match index {
                    0 => out.push_str(name),
                    i => {
                        let arg = args.get(i - 1).ok_or_else(|| Error::ArgumentCount {
                            name: name.to_string(),
                            index: i,
                            supplied: args.len(),
                        })?;
                        out.push_str(arg);
                    }
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

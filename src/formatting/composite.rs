//! Composite template substitution.
//!
//! Templates use positional items of the form `{index[,alignment][:format]}`.
//! `{{` and `}}` produce literal braces. Arguments are already strings, so the
//! `:format` part is accepted and ignored. A positive alignment pads on the
//! left, a negative one on the right.
//!
//! Positions in errors are byte offsets into the template.

use std::iter;

use crate::error::FormatError;

/// Largest accepted argument index (exclusive).
pub const INDEX_LIMIT: usize = 1_000_000;
/// Largest accepted alignment width (exclusive).
pub const WIDTH_LIMIT: usize = 1_000_000;

struct FormatItem {
    index: usize,
    alignment: isize,
    end: usize,
}

/// Substitute `args` into `template`.
pub fn format_composite<S: AsRef<str>>(template: &str, args: &[S]) -> Result<String, FormatError> {
    let bytes = template.as_bytes();
    let arg_len: usize = args.iter().map(|a| a.as_ref().len()).sum();
    let mut out = String::with_capacity(template.len() + arg_len);

    let mut pos = 0;
    let mut literal_start = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => {
                out.push_str(&template[literal_start..pos]);
                if bytes.get(pos + 1) == Some(&b'{') {
                    out.push('{');
                    pos += 2;
                } else {
                    let item = parse_item(bytes, pos)?;
                    let arg = args.get(item.index).ok_or(FormatError::IndexOutOfRange {
                        index: item.index,
                        count: args.len(),
                    })?;
                    push_aligned(&mut out, arg.as_ref(), item.alignment);
                    pos = item.end;
                }
                literal_start = pos;
            }
            b'}' => {
                if bytes.get(pos + 1) != Some(&b'}') {
                    return Err(FormatError::Malformed {
                        position: pos,
                        reason: "unescaped closing brace",
                    });
                }
                out.push_str(&template[literal_start..pos]);
                out.push('}');
                pos += 2;
                literal_start = pos;
            }
            _ => pos += 1,
        }
    }
    out.push_str(&template[literal_start..]);
    Ok(out)
}

fn parse_item(bytes: &[u8], open: usize) -> Result<FormatItem, FormatError> {
    let mut pos = open + 1;

    let index = parse_number(bytes, &mut pos, INDEX_LIMIT)?.ok_or(FormatError::Malformed {
        position: pos,
        reason: "expected argument index",
    })?;
    skip_spaces(bytes, &mut pos);

    let mut alignment = 0;
    if bytes.get(pos) == Some(&b',') {
        pos += 1;
        skip_spaces(bytes, &mut pos);
        let left = bytes.get(pos) == Some(&b'-');
        if left {
            pos += 1;
        }
        let width = parse_number(bytes, &mut pos, WIDTH_LIMIT)?.ok_or(FormatError::Malformed {
            position: pos,
            reason: "expected alignment width",
        })? as isize;
        alignment = if left { -width } else { width };
        skip_spaces(bytes, &mut pos);
    }

    if bytes.get(pos) == Some(&b':') {
        pos += 1;
        while let Some(&b) = bytes.get(pos) {
            match b {
                b'}' => break,
                b'{' => {
                    return Err(FormatError::Malformed {
                        position: pos,
                        reason: "opening brace inside format string",
                    })
                }
                _ => pos += 1,
            }
        }
    }

    match bytes.get(pos) {
        Some(b'}') => Ok(FormatItem {
            index,
            alignment,
            end: pos + 1,
        }),
        Some(_) => Err(FormatError::Malformed {
            position: pos,
            reason: "expected closing brace",
        }),
        None => Err(FormatError::Malformed {
            position: pos,
            reason: "unterminated format item",
        }),
    }
}

fn parse_number(bytes: &[u8], pos: &mut usize, limit: usize) -> Result<Option<usize>, FormatError> {
    let start = *pos;
    let mut value: usize = 0;
    while let Some(&b) = bytes.get(*pos) {
        if !b.is_ascii_digit() {
            break;
        }
        value = value * 10 + usize::from(b - b'0');
        if value >= limit {
            return Err(FormatError::LimitExceeded {
                position: start,
                limit,
            });
        }
        *pos += 1;
    }
    Ok((*pos > start).then_some(value))
}

fn skip_spaces(bytes: &[u8], pos: &mut usize) {
    while bytes.get(*pos) == Some(&b' ') {
        *pos += 1;
    }
}

fn push_aligned(out: &mut String, value: &str, alignment: isize) {
    let fill = alignment.unsigned_abs().saturating_sub(value.chars().count());
    if alignment > 0 {
        out.extend(iter::repeat(' ').take(fill));
        out.push_str(value);
    } else {
        out.push_str(value);
        out.extend(iter::repeat(' ').take(fill));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(template: &str, args: &[&str]) -> Result<String, FormatError> {
        format_composite(template, args)
    }

    #[test]
    fn test_positional() {
        assert_eq!(
            fmt("{0} items for {1}", &["5", "alice@example.com"]).unwrap(),
            "5 items for alice@example.com"
        );
        assert_eq!(fmt("{1}-{0}-{1}", &["a", "b"]).unwrap(), "b-a-b");
        assert_eq!(fmt("no items", &["unused"]).unwrap(), "no items");
    }

    #[test]
    fn test_escaped_braces() {
        assert_eq!(fmt("{{{0}}}", &["x"]).unwrap(), "{x}");
        assert_eq!(fmt("{{0}}", &["x"]).unwrap(), "{0}");
    }

    #[test]
    fn test_alignment_and_format() {
        assert_eq!(fmt("[{0,5}]", &["ab"]).unwrap(), "[   ab]");
        assert_eq!(fmt("[{0, -5 }]", &["ab"]).unwrap(), "[ab   ]");
        assert_eq!(fmt("[{0,1}]", &["abc"]).unwrap(), "[abc]");
        assert_eq!(fmt("{0:N2}", &["1.5"]).unwrap(), "1.5");
        assert_eq!(fmt("[{0,4:x}]", &["é"]).unwrap(), "[   é]");
    }

    #[test]
    fn test_non_ascii_literals() {
        assert_eq!(fmt("héllo {0} ✓", &["wörld"]).unwrap(), "héllo wörld ✓");
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(fmt("{0", &["x"]), Err(FormatError::Malformed { .. })));
        assert!(matches!(fmt("{x}", &["x"]), Err(FormatError::Malformed { .. })));
        assert!(matches!(fmt("{}", &["x"]), Err(FormatError::Malformed { .. })));
        assert!(matches!(fmt("{0,}", &["x"]), Err(FormatError::Malformed { .. })));
        assert!(matches!(fmt("{0:a{b}", &["x"]), Err(FormatError::Malformed { .. })));
        assert_eq!(
            fmt("a}b", &["x"]),
            Err(FormatError::Malformed {
                position: 1,
                reason: "unescaped closing brace",
            })
        );
    }

    #[test]
    fn test_index_out_of_range() {
        assert_eq!(
            fmt("{0} {2}", &["a"]),
            Err(FormatError::IndexOutOfRange { index: 2, count: 1 })
        );
    }

    #[test]
    fn test_limits() {
        assert_eq!(
            fmt("{1000000}", &["a"]),
            Err(FormatError::LimitExceeded {
                position: 1,
                limit: INDEX_LIMIT,
            })
        );
        assert!(matches!(
            fmt("{0,-1000000}", &["a"]),
            Err(FormatError::LimitExceeded { .. })
        ));
    }
}

//! Line-level parsing helpers shared by the preprocessor and both
//! assembler passes: comment stripping, label peeling, operand
//! splitting, numeric literals and string-literal decoding.

/// Strip a `;` comment and surrounding whitespace.
///
/// The comment scan is textual: a `;` inside a string literal also
/// terminates the line. The assembler is strict about this on purpose.
pub fn strip_comment(line: &str) -> &str {
    let code = match line.find(';') {
        Some(pos) => &line[..pos],
        None => line,
    };
    code.trim()
}

/// Label / identifier syntax: leading letter or underscore, then
/// alphanumerics or underscores. Case-sensitive.
pub fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Peel leading `IDENT:` patterns off a code line. Returns the peeled
/// labels in order and the remaining text.
pub fn peel_labels(code: &str) -> (Vec<&str>, &str) {
    let mut labels = Vec::new();
    let mut rest = code;
    loop {
        let Some(pos) = rest.find(':') else { break };
        let label = rest[..pos].trim();
        if !is_ident(label) {
            break;
        }
        labels.push(label);
        rest = rest[pos + 1..].trim();
        if rest.is_empty() {
            break;
        }
    }
    (labels, rest)
}

/// Comma-split an operand field, trimming each piece. A trailing comma
/// leaves an empty last operand, which is dropped.
pub fn split_operands(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a numeric literal: `0x...` hexadecimal, `0b...` binary,
/// otherwise base-10.
pub fn parse_int_literal(s: &str) -> Option<u32> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        u32::from_str_radix(bin, 2).ok()
    } else {
        s.parse().ok()
    }
}

/// Why a `.string` literal failed to decode.
#[derive(Debug, PartialEq, Eq)]
pub enum StringLitError {
    /// Not a fully quoted `"..."` operand.
    Syntax,
    /// Unknown or truncated escape sequence.
    BadEscape(String),
    /// A character above 0x7F.
    NonAscii,
}

/// Decode a quoted `.string` literal into its bytes (without the
/// implicit NUL terminator). Supported escapes: `\\`, `\"`, `\n`, `\r`,
/// `\t`, `\0` and `\xHH`. Only 7-bit ASCII is allowed.
pub fn decode_string_literal(quoted: &str) -> Result<Vec<u8>, StringLitError> {
    let bytes = quoted.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'"' || bytes[bytes.len() - 1] != b'"' {
        return Err(StringLitError::Syntax);
    }
    let inner = &bytes[1..bytes.len() - 1];

    let mut out = Vec::with_capacity(inner.len());
    let mut i = 0;
    while i < inner.len() {
        let c = inner[i];
        if c == b'\\' {
            i += 1;
            let Some(&esc) = inner.get(i) else {
                return Err(StringLitError::BadEscape(
                    "escape at end of string".to_string(),
                ));
            };
            match esc {
                b'\\' => out.push(b'\\'),
                b'"' => out.push(b'"'),
                b'n' => out.push(0x0A),
                b'r' => out.push(0x0D),
                b't' => out.push(0x09),
                b'0' => out.push(0x00),
                b'x' => {
                    let hi = inner.get(i + 1).copied();
                    let lo = inner.get(i + 2).copied();
                    match (hi.and_then(hex_val), lo.and_then(hex_val)) {
                        (Some(h), Some(l)) => {
                            out.push((h << 4) | l);
                            i += 2;
                        }
                        _ => {
                            return Err(StringLitError::BadEscape(
                                "\\xNN needs two hex digits".to_string(),
                            ))
                        }
                    }
                }
                other => {
                    return Err(StringLitError::BadEscape(format!(
                        "unknown escape sequence: \\{}",
                        other as char
                    )))
                }
            }
        } else if c > 0x7F {
            return Err(StringLitError::NonAscii);
        } else {
            out.push(c);
        }
        i += 1;
    }
    Ok(out)
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(10 + c - b'a'),
        b'A'..=b'F' => Some(10 + c - b'A'),
        _ => None,
    }
}

use crate::{constants::TRUE_VALUE, types::AttributeMap};
use std::mem::take;

/// Parses the attributes of a directive line, e.g. `voice=H0_001 text="a b" mode_c`.
///
/// - Whitespace outside quotes separates attributes.
/// - A bare key is a flag with the value `"true"`.
/// - A value starting with `"` runs to the next unescaped `"`. The quotes aren't included.
/// - `\` makes the next character literal; the backslash itself is kept.
///
/// Malformed input never fails: an unterminated quote captures the rest of the line.
///
/// # Example
///
/// ```
/// use tlextract::parse_tag;
///
/// let tag = parse_tag(r#"voice=H0_001 text="a b" mode_c"#);
/// assert_eq!(tag["voice"], "H0_001");
/// assert_eq!(tag["text"], "a b");
/// assert_eq!(tag["mode_c"], "true");
/// ```
#[must_use]
pub fn parse_tag(line: &str) -> AttributeMap {
    let mut result = AttributeMap::new();
    let mut key = String::new();
    let mut value = String::new();

    let mut capture_value = false;
    let mut quoted = false;
    let mut escape_next = false;

    for char in line.chars() {
        if capture_value {
            if value.is_empty() && !quoted && char == '"' {
                quoted = true;
                continue;
            }

            if escape_next {
                escape_next = false;
                value.push(char);
                continue;
            }

            if char == '\\' {
                escape_next = true;
                value.push(char);
                continue;
            }

            if (!quoted && char.is_whitespace()) || (quoted && char == '"') {
                result.insert(take(&mut key), take(&mut value));
                quoted = false;
                capture_value = false;
                continue;
            }

            value.push(char);
        } else {
            if char.is_whitespace() {
                if !key.is_empty() {
                    result.insert(take(&mut key), TRUE_VALUE.to_owned());
                }

                continue;
            }

            if char == '=' {
                capture_value = true;
                continue;
            }

            key.push(char);
        }
    }

    if !key.is_empty() {
        let value = if value.is_empty() && !quoted {
            TRUE_VALUE.to_owned()
        } else {
            value
        };

        result.insert(key, value);
    }

    result
}

/// Parses the attributes following a directive name, e.g. the tail of `@PlayVoice voice=...`.
///
/// `line` must start with `directive` (compared case-insensitively by the caller).
#[must_use]
pub fn parse_directive(line: &str, directive: &str) -> AttributeMap {
    parse_tag(line.get(directive.len()..).unwrap_or_default())
}

/// Case-insensitive ASCII prefix check used for directive names.
#[must_use]
pub fn starts_with_directive(line: &str, directive: &str) -> bool {
    line.len() >= directive.len()
        && line.as_bytes()[..directive.len()]
            .eq_ignore_ascii_case(directive.as_bytes())
}

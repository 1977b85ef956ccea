use crate::{
    constants::{
        ASCII_ELLIPSIS, ELLIPSIS, INLINE_MARKER, STRAY_MARKER, UTF8_BOM,
    },
    types::{BilingualLine, Error},
};
use encoding_rs::SHIFT_JIS;
use regex::Regex;
use std::{
    borrow::Cow,
    fs::write,
    path::Path,
    sync::LazyLock,
};

static JAPANESE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Hiragana}\p{Katakana}\u{4E00}-\u{9FFF}]").unwrap()
});

/// Escapes a string for a CSV field. Fields containing a line break, a quote or a comma are wrapped in quotes, with inner quotes doubled.
///
/// # Example
///
/// ```
/// use tlextract::escape_csv_item;
///
/// assert_eq!(escape_csv_item("a,b"), "\"a,b\"");
/// assert_eq!(escape_csv_item("plain"), "plain");
/// ```
#[must_use]
pub fn escape_csv_item(str: &str) -> Cow<'_, str> {
    if str.contains(['\n', '\r', '"', ',']) {
        Cow::Owned(format!("\"{}\"", str.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(str)
    }
}

/// Like [`escape_csv_item`], but the result is always wrapped in quotes.
#[must_use]
pub fn quote_csv_item(str: &str) -> String {
    let escaped = escape_csv_item(str);

    if escaped.starts_with('"') {
        escaped.into_owned()
    } else {
        format!("\"{escaped}\"")
    }
}

/// Byte offset of the first case-insensitive occurrence of the inline marker.
fn find_inline_marker(text: &str) -> Option<usize> {
    let marker = INLINE_MARKER.as_bytes();

    text.as_bytes()
        .windows(marker.len())
        .position(|window| window.eq_ignore_ascii_case(marker))
}

/// Splits raw text into its source segment and the inline translation after the `<e>` marker.
///
/// A marker at the very start of the text isn't treated as a separator.
///
/// # Example
///
/// ```
/// use tlextract::split_translation;
///
/// let line = split_translation("日本語<e>English");
/// assert_eq!(line.source, "日本語");
/// assert_eq!(line.translation, "English");
/// ```
#[must_use]
pub fn split_translation(text: &str) -> BilingualLine {
    match find_inline_marker(text) {
        Some(pos) if pos > 0 => {
            let source = text[..pos].trim();
            let translation = text[pos + INLINE_MARKER.len()..]
                .replace(ELLIPSIS, ASCII_ELLIPSIS)
                .replace(STRAY_MARKER, "");

            BilingualLine::new(source, translation.trim())
        }
        _ => BilingualLine::new(text.trim(), String::new()),
    }
}

/// Checks whether text contains hiragana, katakana or CJK ideographs.
#[must_use]
pub fn contains_japanese(text: &str) -> bool {
    JAPANESE_RE.is_match(text)
}

/// Decodes Shift-JIS script bytes, the encoding `.ks` files are stored in.
#[must_use]
pub fn decode_shift_jis(bytes: &[u8]) -> String {
    let (decoded, _, _) = SHIFT_JIS.decode(bytes);
    decoded.into_owned()
}

#[inline]
/// Strips a leading UTF-8 Byte Order Mark, if there's any.
#[must_use]
pub fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(&UTF8_BOM).unwrap_or(bytes)
}

/// Writes `content` to `path` as UTF-8 prefixed with a Byte Order Mark.
///
/// # Errors
///
/// - [`Error::Io`] - if writing fails.
pub fn write_with_bom<P: AsRef<Path>>(
    path: P,
    content: &str,
) -> Result<(), Error> {
    let path = path.as_ref();
    let mut bytes: Vec<u8> = Vec::with_capacity(UTF8_BOM.len() + content.len());
    bytes.extend_from_slice(&UTF8_BOM);
    bytes.extend_from_slice(content.as_bytes());

    write(path, bytes).map_err(|e| Error::Io(path.to_path_buf(), e))
}

/// Joins lines with `\n`, terminating the last one too.
pub(crate) fn join_lines<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines.into_iter().fold(String::new(), |mut output, line| {
        output.push_str(line.as_ref());
        output.push('\n');
        output
    })
}

//! Filename derivation for extracted assets.

use crate::kind::AssetKind;

/// Strip characters that are unsafe in filenames.
///
/// Keeps ASCII alphanumerics, `_`, `.`, `-`, space, and any non-ASCII
/// word characters; everything else is dropped, then the result is
/// trimmed.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | ' '))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Filename stem for an object: its sanitized name, or
/// `{Kind}_{path_id}` when the bundle gives it no usable name.
pub fn display_name(name: Option<&str>, kind: AssetKind, path_id: i64) -> String {
    match name.map(sanitize_filename) {
        Some(clean) if !clean.is_empty() => clean,
        _ => format!("{}_{}", kind, path_id),
    }
}

/// Guess a file extension for TextAsset content.
///
/// UTF-8 text starting with `{` or `[` is JSON, text containing both `<`
/// and `>` is XML, other text is plain; undecodable content gets the
/// Unity convention `.bytes`.
pub fn guess_extension(content: &[u8]) -> &'static str {
    match std::str::from_utf8(content) {
        Ok(text) => {
            let trimmed = text.trim_start();
            if trimmed.starts_with('{') || trimmed.starts_with('[') {
                ".json"
            } else if text.contains('<') && text.contains('>') {
                ".xml"
            } else {
                ".txt"
            }
        }
        Err(_) => ".bytes",
    }
}

/// Extensions tried when matching an edited TextAsset file on disk.
pub const TEXT_ASSET_EXTENSIONS: [&str; 4] = [".txt", ".json", ".xml", ".bytes"];

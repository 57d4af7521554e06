//! Status-bar path formatting and small path predicates.

use std::path::Path;

/// Width of the status text when the caller has no preference.
pub const DEFAULT_MAX_LEN: usize = 60;

/// Shortens `path` to at most `max_len` characters plus an ellipsis.
///
/// Paths that fit are returned unchanged. Longer paths keep the first 60%
/// and the last 40% of `max_len` characters (rounded down) around `"..."`.
/// `None` stands for a value that is not a string and yields `""`.
///
/// Lengths are counted in `char`s, so a cut never lands inside a multi-byte
/// character.
pub fn format_path(path: Option<&str>, max_len: usize) -> String {
    let Some(path) = path else {
        return String::new();
    };

    let len = path.chars().count();
    if len <= max_len {
        return path.to_owned();
    }

    let head_len = max_len * 3 / 5;
    let tail_len = max_len * 2 / 5;

    let head: String = path.chars().take(head_len).collect();
    let tail: String = path.chars().skip(len - tail_len).collect();

    format!("{head}...{tail}")
}

/// [`format_path`] for file system paths. Paths that are not valid UTF-8
/// format to an empty string.
pub fn format_display_path(path: &Path, max_len: usize) -> String {
    format_path(path.to_str(), max_len)
}

/// True for an existing regular file whose extension is `pdf`, any case.
pub fn is_pdf(path: &Path) -> bool {
    has_pdf_extension(path) && path.is_file()
}

pub(crate) fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

//! Helpers for OS-stored command lines and installation paths.

use camino::{Utf8Path, Utf8PathBuf};

/// Extracts the executable path from an OS-stored invocation template.
///
/// The OS keeps commands such as `"C:\Program Files\App\app.exe" "%1"`;
/// this returns `C:\Program Files\App\app.exe`. See
/// [`stripped_command_line_with`] for the exact rules. Existence is checked
/// against the local filesystem.
#[must_use]
pub fn stripped_command_line(raw: &str) -> Utf8PathBuf {
    stripped_command_line_with(raw, |candidate| Utf8Path::new(candidate).exists())
}

/// Extracts the executable path from a command line using `exists` to probe
/// candidate paths.
///
/// - Surrounding whitespace is ignored.
/// - A leading `"` selects everything up to the matching `"` (or the end of
///   the input when the quote is unterminated).
/// - Otherwise the shortest whitespace-delimited prefix for which `exists`
///   holds is returned, so unquoted paths containing spaces survive.
/// - When no prefix exists on disk, the first whitespace-delimited token is
///   returned.
#[must_use]
pub fn stripped_command_line_with(raw: &str, exists: impl Fn(&str) -> bool) -> Utf8PathBuf {
    let trimmed = raw.trim();

    if let Some(quoted) = trimmed.strip_prefix('"') {
        let path = quoted.split_once('"').map_or(quoted, |(path, _)| path);
        return Utf8PathBuf::from(path.trim());
    }

    let mut first_token: Option<&str> = None;
    for (index, character) in trimmed.char_indices() {
        if !character.is_whitespace() {
            continue;
        }
        let Some(candidate) = trimmed.get(..index).map(str::trim_end) else {
            continue;
        };
        if candidate.is_empty() {
            continue;
        }
        if first_token.is_none() {
            first_token = Some(candidate);
        }
        if exists(candidate) {
            return Utf8PathBuf::from(candidate);
        }
    }

    match first_token {
        Some(token) if !exists(trimmed) => Utf8PathBuf::from(token),
        _ => Utf8PathBuf::from(trimmed),
    }
}

/// Returns whether two paths name the same location.
///
/// Trailing separators are ignored. On Windows the comparison is
/// case-insensitive and treats `/` and `\` alike.
#[must_use]
pub fn same_location(left: &Utf8Path, right: &Utf8Path) -> bool {
    let left_trimmed = trim_separators(left.as_str());
    let right_trimmed = trim_separators(right.as_str());

    if cfg!(windows) {
        left_trimmed.replace('/', "\\").eq_ignore_ascii_case(&right_trimmed.replace('/', "\\"))
    } else {
        left_trimmed == right_trimmed
    }
}

fn trim_separators(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() { path } else { trimmed }
}

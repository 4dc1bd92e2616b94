use unicode_normalization::UnicodeNormalization;

/// Name used when sanitizing leaves nothing behind.
pub const FALLBACK_NAME: &str = "upload";

/// Reduce a client-supplied filename to a safe, flat on-disk name.
///
/// The name is NFKD-decomposed first, so accented letters keep their base
/// letter (`é` becomes `e`). Path separators become word breaks, whitespace
/// runs collapse to `_`, and anything outside `[A-Za-z0-9_.-]` is dropped.
/// Leading and trailing dots and underscores are stripped so the result can
/// never be `..` or a dotfile.
pub fn sanitize_filename(name: &str) -> String {
    let spaced: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

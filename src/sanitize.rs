//! Title-to-filesystem-name sanitization shared by folder and artifact naming.

/// Sanitize a site-reported title into a filesystem name: spaces become `_`,
/// filesystem-illegal characters are dropped, and the result is truncated to
/// 255 code points. Distinct titles may sanitize identically; callers accept
/// the resulting collision.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => None,
            _ => Some(c),
        })
        .take(255)
        .collect()
}

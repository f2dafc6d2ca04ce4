//! HTML output sanitization.

/// Escape a string for safe interpolation into HTML.
///
/// Ampersand is substituted first so the entities introduced by the later
/// substitutions are not themselves re-escaped.
pub fn sanitize_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

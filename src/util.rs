//! Small code-point classifiers shared by the parser and the host/path modules.

/// An ASCII tab or newline is U+0009 TAB, U+000A LF, or U+000D CR.
pub(crate) fn is_ascii_tab_or_newline(c: char) -> bool {
    matches!(c, '\u{0009}' | '\u{000A}' | '\u{000D}')
}

/// A C0 control or space is a C0 control (U+0000..=U+001F) or U+0020 SPACE.
pub(crate) fn is_c0_or_space(c: char) -> bool {
    matches!(c, '\u{0000}'..='\u{001F}' | ' ')
}

/// <https://url.spec.whatwg.org/#c0-control>
pub(crate) fn is_c0_control(c: char) -> bool {
    matches!(c, '\u{0000}'..='\u{001F}')
}

/// <https://url.spec.whatwg.org/#url-code-points>
///
/// We only need this to decide whether to emit a validation error, never to
/// reject input, so an approximation (ASCII alphanumeric, a handful of safe
/// punctuation, or any non-ASCII code point) is sufficient.
pub(crate) fn is_url_codepoint(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '$'
                | '&'
                | '\''
                | '('
                | ')'
                | '*'
                | '+'
                | ','
                | '-'
                | '.'
                | '/'
                | ':'
                | ';'
                | '='
                | '?'
                | '@'
                | '_'
                | '~'
        )
        || !c.is_ascii()
}

/// `is_url_codepoint` plus U+0025 (%), for the parser's per-code-point
/// validation-error check (which always allows `%` itself and separately
/// flags a `%` not followed by two hex digits).
pub(crate) fn is_url_codepoint_or_percent(c: char) -> bool {
    c == '%' || is_url_codepoint(c)
}

/// <https://url.spec.whatwg.org/#windows-drive-letter>
///
/// A Windows drive letter is two code points, of which the first is an ASCII
/// alpha and the second is either U+003A (:) or U+007C (|).
pub(crate) fn is_windows_drive_letter(segment: &str) -> bool {
    let mut chars = segment.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(a), Some(':' | '|'), None) if a.is_ascii_alphabetic()
    )
}

/// <https://url.spec.whatwg.org/#normalized-windows-drive-letter>
///
/// A normalized Windows drive letter is a Windows drive letter whose second
/// code point is U+003A (:).
pub(crate) fn is_normalized_windows_drive_letter(segment: &str) -> bool {
    let mut chars = segment.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(a), Some(':'), None) if a.is_ascii_alphabetic()
    )
}

/// <https://url.spec.whatwg.org/#start-with-a-windows-drive-letter>
pub(crate) fn starts_with_windows_drive_letter(input: &str) -> bool {
    let mut chars = input.chars();
    let Some(a) = chars.next() else { return false };
    let Some(b) = chars.next() else { return false };

    if !a.is_ascii_alphabetic() || !matches!(b, ':' | '|') {
        return false;
    }

    match chars.next() {
        None => true,
        Some(c) => matches!(c, '/' | '\\' | '?' | '#'),
    }
}

/// A single-dot path segment is `.` or an ASCII case-insensitive match for `%2e`.
pub(crate) fn is_single_dot_path_segment(segment: &str) -> bool {
    segment == "." || segment.eq_ignore_ascii_case("%2e")
}

/// A double-dot path segment is `..` or any ASCII case-insensitive two-dot
/// combination of `.`/`%2e`.
pub(crate) fn is_double_dot_path_segment(segment: &str) -> bool {
    segment == ".."
        || segment.eq_ignore_ascii_case(".%2e")
        || segment.eq_ignore_ascii_case("%2e.")
        || segment.eq_ignore_ascii_case("%2e%2e")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_letters() {
        assert!(is_windows_drive_letter("C:"));
        assert!(is_windows_drive_letter("c|"));
        assert!(!is_windows_drive_letter("C"));
        assert!(!is_windows_drive_letter("CC:"));

        assert!(is_normalized_windows_drive_letter("C:"));
        assert!(!is_normalized_windows_drive_letter("C|"));

        assert!(starts_with_windows_drive_letter("C:/tmp"));
        assert!(starts_with_windows_drive_letter("C|"));
        assert!(!starts_with_windows_drive_letter("CC:/tmp"));
    }

    #[test]
    fn dot_segments() {
        assert!(is_single_dot_path_segment("."));
        assert!(is_single_dot_path_segment("%2E"));
        assert!(is_double_dot_path_segment(".."));
        assert!(is_double_dot_path_segment("%2e."));
        assert!(is_double_dot_path_segment(".%2E"));
        assert!(is_double_dot_path_segment("%2e%2E"));
        assert!(!is_double_dot_path_segment("..."));
    }
}

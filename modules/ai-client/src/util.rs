/// Truncate a string to at most `max_bytes` bytes at a character boundary.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

/// Strip markdown code blocks from a response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Reduce a one-word model answer to a bare lowercase label.
///
/// Models asked to "respond only with X" still wrap answers in code fences,
/// quotes or a trailing period. Interior characters (e.g. the hyphen in
/// `public-safety`) are kept.
pub fn normalize_label(response: &str) -> String {
    strip_code_blocks(response)
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '.' | '*'))
        .to_lowercase()
}

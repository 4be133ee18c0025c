/// Display text helpers shared by the background and content contexts

/// Longest string shown in a menu label or preview
pub const MAX_DISPLAY_LEN: usize = 64;

/// Marker appended to truncated text
pub const ELLIPSIS: &str = "...";

/// Truncate text for display
///
/// Strings of at most 64 characters are returned unchanged. Longer strings keep
/// their first 61 characters followed by "...", so the result is exactly 64
/// characters long.
///
/// Examples:
/// - "Cat" → "Cat"
/// - 100 x 'a' → 61 x 'a' + "..."
pub fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_DISPLAY_LEN {
        return text.to_string();
    }

    let keep = MAX_DISPLAY_LEN - ELLIPSIS.len();
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Escape text for use inside HTML content or a single-quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate(""), "");
        assert_eq!(truncate("Cat"), "Cat");
        assert_eq!(truncate("https://example.com/"), "https://example.com/");
    }

    #[test]
    fn test_truncate_exactly_at_limit() {
        let text = "x".repeat(64);
        assert_eq!(truncate(&text), text);
    }

    #[test]
    fn test_truncate_long_text() {
        let text = "a".repeat(61) + "bcdefghij";
        let truncated = truncate(&text);

        assert_eq!(truncated.chars().count(), 64);
        assert_eq!(truncated, "a".repeat(61) + "...");
    }

    #[test]
    fn test_truncate_one_over_limit() {
        let text = "y".repeat(65);
        assert_eq!(truncate(&text), "y".repeat(61) + "...");
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        let text = "é".repeat(70);
        let truncated = truncate(&text);

        assert_eq!(truncated.chars().count(), 64);
        assert!(truncated.starts_with(&"é".repeat(61)));
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("plain"), "plain");
        assert_eq!(
            escape_html("<b>Tom & 'Jerry'</b>"),
            "&lt;b&gt;Tom &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("say \"hi\""), "say &quot;hi&quot;");
    }
}

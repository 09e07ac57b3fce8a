pub mod time;

pub use time::{format_api_datetime, parse_instant, sort_millis};

/// Truncate a string for table cells, appending "..." when shortened.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate("abc", 10), "abc");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("configuración", 8), "confi...");
    }
}

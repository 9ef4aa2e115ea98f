//! Char filters that rewrite raw text before tokenization.

/// Trait for filters applied to the raw text ahead of the tokenizer.
pub trait CharFilter: Send + Sync {
    /// Rewrite the given text.
    fn filter(&self, text: &str) -> String;

    /// Get the name of this char filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

/// Lowercases text and collapses every run of whitespace into one space,
/// trimming both ends.
///
/// ```
/// use phishnot::analysis::char_filter::{CharFilter, NormalizeCharFilter};
///
/// let filter = NormalizeCharFilter;
/// assert_eq!(filter.filter("  Urgent:\n\tVERIFY  now "), "urgent: verify now");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct NormalizeCharFilter;

impl CharFilter for NormalizeCharFilter {
    fn filter(&self, text: &str) -> String {
        normalize(text)
    }

    fn name(&self) -> &'static str {
        "normalize"
    }
}

/// Lowercase and collapse whitespace.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for word in lowered.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Hello   WORLD"), "hello world");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("a\r\nb"), "a b");
    }

    #[test]
    fn test_normalize_unicode() {
        assert_eq!(normalize("ÉCOLE  Ü"), "école ü");
    }
}

//! Small string helpers shared by the extractors and the assembler.

/// Longest prefix of `text` with at most `max_chars` chars.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Collapse every whitespace run (including NBSP) to one space and trim.
pub fn squeeze_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split(|c: char| c.is_whitespace()) {
        if word.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Rough token estimate: about four characters per token, rounded up.
pub fn estimate_tokens(text: &str) -> usize {
    tokens_for_chars(char_len(text))
}

pub(crate) fn tokens_for_chars(chars: usize) -> usize {
    chars.div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_squeeze_whitespace() {
        assert_eq!(squeeze_whitespace("  a \n\t b\u{a0}\u{a0}c  "), "a b c");
        assert_eq!(squeeze_whitespace("   "), "");
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }
}

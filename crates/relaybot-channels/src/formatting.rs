//! Outbound message splitting for platform length limits.
//!
//! Telegram caps messages at 4096 characters; longer replies are split into
//! chunks, preferring to break at a newline, then at a space, before falling
//! back to a hard cut.

/// Split `text` into chunks of at most `max_len` characters.
///
/// Splits prefer the last newline inside the window, then the last space,
/// and only then cut mid-word. Char-based, so multi-byte text never gets
/// cut inside a code point.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if max_len == 0 {
        return vec![text.to_string()];
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let remaining = chars.len() - start;
        if remaining <= max_len {
            chunks.push(chars[start..].iter().collect());
            break;
        }

        let window = &chars[start..start + max_len];
        let cut = window
            .iter()
            .rposition(|&c| c == '\n')
            .or_else(|| window.iter().rposition(|&c| c == ' '))
            .map(|pos| pos + 1)
            .unwrap_or(max_len);

        chunks.push(chars[start..start + cut].iter().collect::<String>());
        start += cut;
    }

    chunks
        .into_iter()
        .map(|chunk: String| chunk.trim_end_matches('\n').to_string())
        .filter(|chunk| !chunk.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = split_message("hello", 4096);
        assert_eq!(chunks, vec!["hello"]);
    }

    #[test]
    fn exact_limit_is_one_chunk() {
        let text = "a".repeat(10);
        let chunks = split_message(&text, 10);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn splits_at_newline() {
        let text = format!("{}\n{}", "a".repeat(6), "b".repeat(6));
        let chunks = split_message(&text, 10);
        assert_eq!(chunks, vec!["a".repeat(6), "b".repeat(6)]);
    }

    #[test]
    fn splits_at_space_when_no_newline() {
        let text = format!("{} {}", "a".repeat(6), "b".repeat(6));
        let chunks = split_message(&text, 10);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].trim_end(), "a".repeat(6));
        assert_eq!(chunks[1], "b".repeat(6));
    }

    #[test]
    fn hard_cut_without_separators() {
        let text = "a".repeat(25);
        let chunks = split_message(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 10);
        assert_eq!(chunks[1].len(), 10);
        assert_eq!(chunks[2].len(), 5);
    }

    #[test]
    fn every_chunk_respects_the_limit() {
        let text = "word ".repeat(2000);
        for chunk in split_message(&text, 4096) {
            assert!(chunk.chars().count() <= 4096);
        }
    }

    #[test]
    fn multibyte_text_is_not_cut_inside_a_code_point() {
        let text = "日本語のテキスト".repeat(10);
        let chunks = split_message(&text, 16);
        let rejoined: String = chunks.concat();
        assert_eq!(rejoined, text);
    }
}

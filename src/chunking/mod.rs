//! Word-budget chunking for document text.
//!
//! Splits extracted document text into word-boundary chunks under a
//! per-chunk character budget, for embedding generation.

/// Split text into word-boundary chunks of at most `max_chars` characters.
///
/// Words are accumulated into the current chunk; a word that would push the
/// chunk over the budget closes it and starts the next one. A single word
/// longer than the budget is emitted verbatim as its own chunk. Word order
/// is preserved and chunks never overlap.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars {
            if current.is_empty() {
                // Word is longer than the budget, emit it unmodified
                chunks.push(word.to_string());
            } else {
                chunks.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_respect_budget_and_preserve_order() {
        let words: Vec<String> = (0..3000).map(|_| "a".to_string()).collect();
        let text = words.join(" ");

        let chunks = split_into_chunks(&text, 1000);

        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.len() <= 1000);
        }

        // Rejoining with single spaces reproduces the word sequence exactly
        let rejoined = chunks.join(" ");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn test_word_longer_than_budget_is_kept_verbatim() {
        let long_word = "x".repeat(1500);
        let text = format!("short {} tail", long_word);

        let chunks = split_into_chunks(&text, 1000);

        assert_eq!(chunks, vec!["short".to_string(), long_word, "tail".to_string()]);
    }

    #[test]
    fn test_short_text_is_a_single_chunk() {
        let chunks = split_into_chunks("just a few words", 1000);
        assert_eq!(chunks, vec!["just a few words"]);
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(split_into_chunks("", 1000).is_empty());
        assert!(split_into_chunks("   \n\t ", 1000).is_empty());
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        let chunks = split_into_chunks("alpha\n\nbeta   gamma", 1000);
        assert_eq!(chunks, vec!["alpha beta gamma"]);
    }

    #[test]
    fn test_boundary_word_starts_next_chunk() {
        // "ab cd" fills the budget exactly, "ef" starts the next chunk
        let chunks = split_into_chunks("ab cd ef", 5);
        assert_eq!(chunks, vec!["ab cd".to_string(), "ef".to_string()]);
    }
}

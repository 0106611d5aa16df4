//! Text chunking.
//!
//! Splits extracted document text into bounded-size segments for embedding.
//! The split is lossless: concatenating the chunks in index order
//! reconstructs the input exactly. Split points prefer a whitespace boundary
//! inside the size window but never drop or trim characters.

use tracing::debug;

/// Configuration for text chunking.
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 4000 }
    }
}

/// One chunk of a source document.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    /// Position of this chunk within the document.
    pub index: i32,
    pub content: String,
}

/// Split `text` into chunks of at most `chunk_size` characters.
///
/// Empty input yields no chunks; input within the size bound yields exactly
/// one.
pub fn split_text(text: &str, config: &ChunkingConfig) -> Vec<TextChunk> {
    if text.is_empty() {
        return vec![];
    }

    let chunk_size = config.chunk_size.max(1);
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let total = chars.len();

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < total {
        let end = if total - start <= chunk_size {
            total
        } else {
            // Prefer to break just after the last whitespace inside the
            // window; fall back to a hard cut at the window edge.
            let window_end = start + chunk_size;
            let break_at = (start + 1..window_end)
                .rev()
                .find(|&i| chars[i].1.is_whitespace())
                .map(|i| i + 1)
                .unwrap_or(window_end);
            break_at
        };

        let byte_start = chars[start].0;
        let byte_end = if end == total { text.len() } else { chars[end].0 };

        chunks.push(TextChunk {
            index: chunks.len() as i32,
            content: text[byte_start..byte_end].to_string(),
        });

        start = end;
    }

    debug!(
        input_chars = total,
        chunk_count = chunks.len(),
        chunk_size,
        "Text chunked"
    );

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(chunk_size: usize) -> ChunkingConfig {
        ChunkingConfig { chunk_size }
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(split_text("", &ChunkingConfig::default()).is_empty());
    }

    #[test]
    fn small_input_yields_single_chunk() {
        let chunks = split_text("short document", &config(100));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "short document");
        assert_eq!(chunks[0].index, 0);
    }

    #[test]
    fn concatenation_reconstructs_input() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(50);
        let chunks = split_text(&text, &config(120));
        assert!(chunks.len() > 1);

        let rebuilt: String = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn chunks_respect_size_bound() {
        let text = "word ".repeat(1000);
        for chunk in split_text(&text, &config(64)) {
            assert!(chunk.content.chars().count() <= 64);
        }
    }

    #[test]
    fn indices_are_sequential() {
        let text = "a b c d e f g h i j".repeat(20);
        let chunks = split_text(&text, &config(16));
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i as i32);
        }
    }

    #[test]
    fn text_without_whitespace_hard_cuts() {
        let text = "x".repeat(300);
        let chunks = split_text(&text, &config(100));
        assert_eq!(chunks.len(), 3);
        let rebuilt: String = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn multibyte_input_splits_on_char_boundaries() {
        let text = "héllo wörld ünïcode ".repeat(30);
        let chunks = split_text(&text, &config(25));
        let rebuilt: String = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(rebuilt, text);
        for chunk in chunks {
            assert!(chunk.content.chars().count() <= 25);
        }
    }
}

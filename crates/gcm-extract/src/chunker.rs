//! Chunker (spec §4.2): splits cleaned text into overlapping,
//! word-bounded chunks honoring sentence boundaries. Two strategies
//! share one contract — `Semantic` (default, sentence-aware) and
//! `Fixed` (hard word boundaries) — selected by a parameter rather than
//! passed around as a callable, per the source-language redesign in
//! spec §9 (no callable-dict strategy parameters).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

const MIN_SENTENCE_LEN: usize = 10;

static SENTENCE_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]\s+").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub word_count: usize,
    pub sentence_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStrategy {
    /// Default: chunk boundaries fall on sentence boundaries, overlap
    /// realized by repeating trailing sentences of the prior chunk.
    Semantic,
    /// Hard word-count boundaries with word-level overlap, ignoring
    /// sentence structure.
    Fixed,
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Splits `text` into sentences on `[.!?]\s+`, discarding fragments
/// shorter than [`MIN_SENTENCE_LEN`] characters.
fn split_sentences(text: &str) -> Vec<String> {
    SENTENCE_BOUNDARY
        .split(text.trim())
        .map(str::trim)
        .filter(|s| s.len() >= MIN_SENTENCE_LEN)
        .map(str::to_string)
        .collect()
}

pub fn chunk(text: &str, chunk_words: usize, overlap_words: usize) -> Vec<Chunk> {
    chunk_with_strategy(text, chunk_words, overlap_words, ChunkStrategy::Semantic)
}

pub fn chunk_with_strategy(
    text: &str,
    chunk_words: usize,
    overlap_words: usize,
    strategy: ChunkStrategy,
) -> Vec<Chunk> {
    match strategy {
        ChunkStrategy::Semantic => chunk_semantic(text, chunk_words, overlap_words),
        ChunkStrategy::Fixed => chunk_fixed(text, chunk_words, overlap_words),
    }
}

/// Sentence-aware chunking: a chunk is finalized either when the next
/// sentence would push it over `chunk_words`, or at input end. Overlap
/// is realized by seeding the next chunk with the trailing sentences of
/// the previous one whose cumulative word count is `<= overlap_words`.
fn chunk_semantic(text: &str, chunk_words: usize, overlap_words: usize) -> Vec<Chunk> {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_words = 0usize;
    let mut i = 0usize;

    while i < sentences.len() {
        let sentence = &sentences[i];
        let sentence_words = word_count(sentence);

        if !current.is_empty() && current_words + sentence_words > chunk_words {
            chunks.push(finalize_chunk(&current));
            current = trailing_overlap_sentences(&current, overlap_words);
            current_words = current.iter().map(|s| word_count(s)).sum();
            continue;
        }

        current.push(sentence.clone());
        current_words += sentence_words;
        i += 1;
    }

    if !current.is_empty() {
        chunks.push(finalize_chunk(&current));
    }

    chunks
}

fn trailing_overlap_sentences(sentences: &[String], overlap_words: usize) -> Vec<String> {
    let mut tail = Vec::new();
    let mut tail_words = 0usize;
    for sentence in sentences.iter().rev() {
        let words = word_count(sentence);
        if tail_words + words > overlap_words && !tail.is_empty() {
            break;
        }
        tail.push(sentence.clone());
        tail_words += words;
    }
    tail.reverse();
    tail
}

fn finalize_chunk(sentences: &[String]) -> Chunk {
    let text = sentences.join(" ");
    Chunk { word_count: word_count(&text), sentence_count: sentences.len(), text }
}

/// Hard word-boundary chunking: splits on whitespace-delimited words
/// directly, ignoring sentence structure. `sentence_count` is still
/// reported (via the same `[.!?]\s+` split) for contract parity with
/// the semantic strategy.
fn chunk_fixed(text: &str, chunk_words: usize, overlap_words: usize) -> Vec<Chunk> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() || chunk_words == 0 {
        return Vec::new();
    }

    let step = chunk_words.saturating_sub(overlap_words).max(1);
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < words.len() {
        let end = (start + chunk_words).min(words.len());
        let slice = &words[start..end];
        let text = slice.join(" ");
        let sentence_count = split_sentences(&text).len().max(1);
        chunks.push(Chunk { word_count: slice.len(), sentence_count, text });
        if end == words.len() {
            break;
        }
        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_sentence(words: usize, marker: &str) -> String {
        let mut s = format!("{marker} ");
        s.push_str(&"word ".repeat(words.saturating_sub(1)));
        s.trim_end().to_string() + "."
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk("", 1000, 200).is_empty());
        assert!(chunk("short", 1000, 200).is_empty());
    }

    #[test]
    fn fragments_under_ten_chars_are_discarded() {
        let text = "Ok. This is a real sentence with enough length to survive filtering.";
        let sentences = split_sentences(text);
        assert!(sentences.iter().all(|s| s.len() >= MIN_SENTENCE_LEN));
        assert!(!sentences.iter().any(|s| s == "Ok"));
    }

    #[test]
    fn single_short_document_becomes_one_chunk() {
        let text = "The quick brown fox jumps over the lazy dog repeatedly today. \
                    It is a sentence used for tests.";
        let chunks = chunk(text, 1000, 200);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].sentence_count, 2);
    }

    #[test]
    fn sum_of_chunk_words_is_at_least_input_word_count() {
        let a = long_sentence(150, "Alpha");
        let b = long_sentence(150, "Bravo");
        let c = long_sentence(150, "Charlie");
        let text = format!("{a} {b} {c}");
        let input_words = word_count(&text);

        let chunks = chunk(&text, 200, 50);
        let total: usize = chunks.iter().map(|c| c.word_count).sum();
        assert!(total >= input_words, "total {total} < input {input_words}");
    }

    #[test]
    fn consecutive_chunks_share_a_sentence_when_input_has_multiple_sentences() {
        let a = long_sentence(120, "Alpha");
        let b = long_sentence(120, "Bravo");
        let c = long_sentence(120, "Charlie");
        let text = format!("{a} {b} {c}");

        let chunks = chunk(&text, 150, 100);
        assert!(chunks.len() >= 2, "expected at least two chunks, got {}", chunks.len());
        for pair in chunks.windows(2) {
            let prev_last_sentence = split_sentences(&pair[0].text).last().cloned();
            let next_first_sentence = split_sentences(&pair[1].text).first().cloned();
            assert_eq!(prev_last_sentence, next_first_sentence);
        }
    }

    #[test]
    fn overlap_between_consecutive_chunks_never_exceeds_overlap_words() {
        let a = long_sentence(80, "Alpha");
        let b = long_sentence(80, "Bravo");
        let c = long_sentence(80, "Charlie");
        let d = long_sentence(80, "Delta");
        let text = format!("{a} {b} {c} {d}");

        let chunks = chunk(&text, 100, 60);
        for pair in chunks.windows(2) {
            let prev_sentences: Vec<String> = split_sentences(&pair[0].text);
            let next_sentences: Vec<String> = split_sentences(&pair[1].text);
            let shared: Vec<&String> = next_sentences
                .iter()
                .take_while(|s| prev_sentences.contains(s))
                .collect();
            let overlap_words: usize = shared.iter().map(|s| word_count(s)).sum();
            assert!(overlap_words <= 60, "overlap {overlap_words} exceeds budget");
        }
    }

    #[test]
    fn fixed_strategy_uses_hard_word_boundaries() {
        let text = "one two three four five six seven eight nine ten";
        let chunks = chunk_with_strategy(text, 4, 1, ChunkStrategy::Fixed);
        assert_eq!(chunks[0].word_count, 4);
        assert_eq!(chunks[0].text, "one two three four");
    }
}

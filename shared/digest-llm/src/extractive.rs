//! LexRank extractive summarization
//!
//! Sentences are graph nodes. Two sentences are linked when the
//! idf-modified cosine similarity of their term vectors exceeds
//! [`SIMILARITY_THRESHOLD`]. Each row of the adjacency matrix is divided by
//! its degree and the stationary distribution found by power iteration is
//! the sentence score.

use crate::{LLMError, Result};
use regex::Regex;
use std::collections::HashMap;

const SIMILARITY_THRESHOLD: f64 = 0.1;
const EPSILON: f64 = 0.1;
const MAX_ITERATIONS: usize = 100;

/// Selects the most central sentences of a text
#[derive(Debug, Clone)]
pub struct ExtractiveSummarizer {
    sentence_count: usize,
    sentence_re: Regex,
    word_re: Regex,
}

impl ExtractiveSummarizer {
    pub fn new(sentence_count: usize) -> Result<Self> {
        let compile =
            |pattern: &str| Regex::new(pattern).map_err(|e| LLMError::Configuration(e.to_string()));

        Ok(Self {
            sentence_count,
            sentence_re: compile(r#"[^.!?]*[.!?]+["')\]]*|[^.!?]+$"#)?,
            word_re: compile(r"[\p{L}\p{N}']+")?,
        })
    }

    pub fn sentence_count(&self) -> usize {
        self.sentence_count
    }

    /// Sentences in document order, trimmed, without word-less fragments
    pub fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.sentence_re
            .find_iter(text)
            .map(|m| m.as_str().trim())
            .filter(|s| self.word_re.is_match(s))
            .collect()
    }

    fn terms(&self, sentence: &str) -> Vec<String> {
        self.word_re
            .find_iter(sentence)
            .map(|m| m.as_str().to_lowercase())
            .collect()
    }

    /// Rank sentences by LexRank centrality and return the top `n` of them.
    ///
    /// The selection is returned in document order. Equal scores prefer the
    /// earlier sentence.
    pub fn rank_and_select(&self, text: &str, n: usize) -> Vec<String> {
        let sentences = self.sentences(text);
        if n == 0 || sentences.is_empty() {
            return Vec::new();
        }
        if sentences.len() <= n {
            return sentences.into_iter().map(str::to_string).collect();
        }

        let scores = self.scores(&sentences);

        let mut order: Vec<usize> = (0..sentences.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        let mut chosen: Vec<usize> = order.into_iter().take(n).collect();
        chosen.sort_unstable();

        chosen
            .into_iter()
            .map(|idx| sentences[idx].to_string())
            .collect()
    }

    /// Summary text: the selected sentences joined with single spaces
    pub fn summarize_text(&self, text: &str) -> String {
        self.rank_and_select(text, self.sentence_count).join(" ")
    }

    /// LexRank score per sentence
    pub fn scores(&self, sentences: &[&str]) -> Vec<f64> {
        let tokenized: Vec<Vec<String>> = sentences.iter().map(|s| self.terms(s)).collect();
        let tf: Vec<HashMap<&str, f64>> = tokenized.iter().map(|words| term_frequencies(words)).collect();
        let idf = inverse_document_frequencies(&tokenized);

        let count = sentences.len();
        let mut matrix = vec![vec![0.0; count]; count];
        let mut degrees = vec![0usize; count];

        for row in 0..count {
            for col in 0..count {
                if cosine_similarity(&tf[row], &tf[col], &idf) > SIMILARITY_THRESHOLD {
                    matrix[row][col] = 1.0;
                    degrees[row] += 1;
                }
            }
        }

        for (row, degree) in degrees.iter().enumerate() {
            let degree = (*degree).max(1) as f64;
            for value in matrix[row].iter_mut() {
                *value /= degree;
            }
        }

        power_method(&matrix)
    }
}

/// Term counts divided by the largest count in the sentence
fn term_frequencies(words: &[String]) -> HashMap<&str, f64> {
    let mut counts: HashMap<&str, f64> = HashMap::new();
    for word in words {
        *counts.entry(word.as_str()).or_insert(0.0) += 1.0;
    }

    let max = counts.values().cloned().fold(0.0, f64::max);
    if max > 0.0 {
        for value in counts.values_mut() {
            *value /= max;
        }
    }
    counts
}

/// `ln(N / (1 + df))` over sentences as documents
fn inverse_document_frequencies(sentences: &[Vec<String>]) -> HashMap<&str, f64> {
    let mut df: HashMap<&str, usize> = HashMap::new();
    for words in sentences {
        let mut seen: Vec<&str> = words.iter().map(String::as_str).collect();
        seen.sort_unstable();
        seen.dedup();
        for word in seen {
            *df.entry(word).or_insert(0) += 1;
        }
    }

    let total = sentences.len() as f64;
    df.into_iter()
        .map(|(word, freq)| (word, (total / (1.0 + freq as f64)).ln()))
        .collect()
}

fn cosine_similarity(
    tf1: &HashMap<&str, f64>,
    tf2: &HashMap<&str, f64>,
    idf: &HashMap<&str, f64>,
) -> f64 {
    let idf_of = |word: &str| idf.get(word).copied().unwrap_or(0.0);

    let numerator: f64 = tf1
        .iter()
        .filter_map(|(word, a)| tf2.get(word).map(|b| a * b * idf_of(*word).powi(2)))
        .sum();

    let norm = |tf: &HashMap<&str, f64>| {
        tf.iter()
            .map(|(word, value)| (value * idf_of(*word)).powi(2))
            .sum::<f64>()
            .sqrt()
    };
    let denominator = norm(tf1) * norm(tf2);

    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Stationary distribution of the row-normalized matrix
fn power_method(matrix: &[Vec<f64>]) -> Vec<f64> {
    let count = matrix.len();
    let mut p = vec![1.0 / count as f64; count];

    for _ in 0..MAX_ITERATIONS {
        let mut next = vec![0.0; count];
        for (row, weights) in matrix.iter().enumerate() {
            for (col, weight) in weights.iter().enumerate() {
                next[col] += weight * p[row];
            }
        }

        let delta = next
            .iter()
            .zip(&p)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt();
        p = next;
        if delta < EPSILON {
            break;
        }
    }

    p
}

//! Bigram phrase detection.
//!
//! Frequent adjacent token pairs are merged into single `a_b` tokens before
//! vectorization, so multi-word concepts ("climate_change") survive the
//! bag-of-words step. Scoring follows the familiar
//! `(count(ab) - min_count) * N / (count(a) * count(b))` formulation.

use std::collections::HashMap;

/// A fitted phrase model: the accepted bigrams and their scores.
#[derive(Debug, Clone, Default)]
pub struct PhraseModel {
    accepted: HashMap<(String, String), f64>,
}

impl PhraseModel {
    /// Fit a phrase model over tokenized documents.
    pub fn fit(documents: &[Vec<String>], min_count: usize, threshold: f64) -> Self {
        let mut unigram_counts: HashMap<&str, usize> = HashMap::new();
        let mut bigram_counts: HashMap<(&str, &str), usize> = HashMap::new();
        let mut total_tokens = 0usize;

        for doc in documents {
            total_tokens += doc.len();
            for token in doc {
                *unigram_counts.entry(token.as_str()).or_insert(0) += 1;
            }
            for pair in doc.windows(2) {
                *bigram_counts
                    .entry((pair[0].as_str(), pair[1].as_str()))
                    .or_insert(0) += 1;
            }
        }

        let mut accepted = HashMap::new();
        for ((first, second), count) in bigram_counts {
            if count < min_count {
                continue;
            }
            let first_count = unigram_counts[first] as f64;
            let second_count = unigram_counts[second] as f64;
            let score =
                (count as f64 - min_count as f64) * total_tokens as f64 / (first_count * second_count);
            if score > threshold {
                accepted.insert((first.to_string(), second.to_string()), score);
            }
        }

        Self { accepted }
    }

    /// Number of accepted phrases.
    pub fn phrase_count(&self) -> usize {
        self.accepted.len()
    }

    /// Merge accepted bigrams in a token sequence, greedily left to right.
    pub fn transform(&self, tokens: &[String]) -> Vec<String> {
        if self.accepted.is_empty() {
            return tokens.to_vec();
        }

        let mut merged = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            if i + 1 < tokens.len() {
                let key = (tokens[i].clone(), tokens[i + 1].clone());
                if self.accepted.contains_key(&key) {
                    merged.push(format!("{}_{}", tokens[i], tokens[i + 1]));
                    i += 2;
                    continue;
                }
            }
            merged.push(tokens[i].clone());
            i += 1;
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    #[test]
    fn frequent_pair_becomes_phrase() {
        // "climate change" occurs constantly together, other tokens vary
        let docs: Vec<Vec<String>> = (0..10)
            .map(|i| doc(&["climate", "change", &format!("filler{i}")]))
            .collect();

        let model = PhraseModel::fit(&docs, 2, 1.0);
        assert!(model.phrase_count() >= 1);

        let transformed = model.transform(&doc(&["climate", "change", "policy"]));
        assert_eq!(transformed[0], "climate_change");
        assert_eq!(transformed[1], "policy");
    }

    #[test]
    fn rare_pair_not_merged() {
        let docs = vec![doc(&["space", "travel"]), doc(&["cooking", "pasta"])];
        let model = PhraseModel::fit(&docs, 5, 10.0);
        assert_eq!(model.phrase_count(), 0);

        let transformed = model.transform(&doc(&["space", "travel"]));
        assert_eq!(transformed, vec!["space", "travel"]);
    }

    #[test]
    fn empty_model_is_identity() {
        let model = PhraseModel::default();
        let tokens = doc(&["a", "b", "c"]);
        assert_eq!(model.transform(&tokens), tokens);
    }
}

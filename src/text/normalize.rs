//! Text normalization: lowercasing, tokenization, stopword removal, and
//! rule-based lemmatization.
//!
//! Mirrors the preprocessing applied to every transcript before
//! vectorization: non-alphabetic characters become whitespace, tokens shorter
//! than the configured minimum are dropped, English stopwords (plus any
//! corpus-specific extras) are removed, and plural/verbal suffixes are
//! stripped by rule.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use tracing::warn;
use unicode_segmentation::UnicodeSegmentation;

use crate::core::config::TextConfig;
use crate::core::corpus::{Corpus, TokenizedCorpus};
use crate::text::phrases::PhraseModel;

/// Built-in English stopword set.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any",
        "are", "aren", "as", "at", "be", "because", "been", "before", "being", "below",
        "between", "both", "but", "by", "can", "cannot", "could", "couldn", "did", "didn",
        "do", "does", "doesn", "doing", "don", "down", "during", "each", "few", "for", "from",
        "further", "had", "hadn", "has", "hasn", "have", "haven", "having", "he", "her",
        "here", "hers", "herself", "him", "himself", "his", "how", "i", "if", "in", "into",
        "is", "isn", "it", "its", "itself", "just", "me", "more", "most", "my", "myself",
        "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our",
        "ours", "ourselves", "out", "over", "own", "same", "she", "should", "shouldn", "so",
        "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves",
        "then", "there", "these", "they", "this", "those", "through", "to", "too", "under",
        "until", "up", "very", "was", "wasn", "we", "were", "weren", "what", "when", "where",
        "which", "while", "who", "whom", "why", "will", "with", "won", "would", "wouldn",
        "you", "your", "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

/// Corpus-specific filler words that dominate talk transcripts without
/// carrying topical signal. Applied on top of [`STOPWORDS`] by default.
pub const TALK_FILLER_WORDS: &[&str] = &[
    "said", "thing", "things", "like", "one", "get", "people", "going", "make", "think",
    "know", "see", "way", "say", "really", "actually", "world", "life", "well", "also",
    "story", "time",
];

/// Normalizer built from a [`TextConfig`], scoped to a single pipeline run.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    config: TextConfig,
    stopwords: HashSet<String>,
}

impl TextNormalizer {
    /// Build a normalizer from configuration.
    pub fn new(config: &TextConfig) -> Self {
        let mut stopwords: HashSet<String> =
            STOPWORDS.iter().map(|w| (*w).to_string()).collect();
        stopwords.extend(TALK_FILLER_WORDS.iter().map(|w| (*w).to_string()));
        stopwords.extend(config.extra_stopwords.iter().map(|w| w.to_lowercase()));

        Self {
            config: config.clone(),
            stopwords,
        }
    }

    /// Normalize a single document into a token sequence.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        let alpha_only: String = text
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphabetic() { c } else { ' ' })
            .collect();

        alpha_only
            .unicode_words()
            .filter(|tok| tok.len() >= self.config.min_token_len)
            .filter(|tok| !self.stopwords.contains(*tok))
            .map(|tok| {
                if self.config.lemmatize {
                    lemmatize(tok)
                } else {
                    tok.to_string()
                }
            })
            .filter(|tok| tok.len() >= self.config.min_token_len)
            .collect()
    }

    /// Normalize a whole corpus, skipping documents that come out empty.
    ///
    /// Empty documents are logged and excluded (never fatal to the batch);
    /// the returned corpus keeps ids aligned with token sequences.
    pub fn normalize_corpus(&self, corpus: &Corpus) -> TokenizedCorpus {
        let mut tokenized = TokenizedCorpus::default();

        for document in corpus.iter() {
            let tokens = self.normalize(&document.text);
            if tokens.is_empty() {
                warn!(
                    "Skipping document '{}': no tokens after preprocessing",
                    document.file_name
                );
                continue;
            }
            tokenized.ids.push(document.file_name.clone());
            tokenized.documents.push(tokens);
        }

        if self.config.detect_phrases && !tokenized.is_empty() {
            let model = PhraseModel::fit(
                &tokenized.documents,
                self.config.phrase_min_count,
                self.config.phrase_threshold,
            );
            tokenized.documents = tokenized
                .documents
                .iter()
                .map(|doc| model.transform(doc))
                .collect();
        }

        tokenized
    }
}

/// Rule-based lemmatizer covering the regular English plural and a handful of
/// verbal suffixes. Deliberately conservative: unknown shapes pass through.
pub fn lemmatize(token: &str) -> String {
    let len = token.len();

    if len > 4 && token.ends_with("ies") {
        return format!("{}y", &token[..len - 3]);
    }
    if len > 4 && (token.ends_with("sses") || token.ends_with("shes") || token.ends_with("ches"))
    {
        return token[..len - 2].to_string();
    }
    if len > 3 && token.ends_with('s') && !token.ends_with("ss") && !token.ends_with("us")
        && !token.ends_with("is")
    {
        return token[..len - 1].to_string();
    }

    token.to_string()
}

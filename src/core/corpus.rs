//! Corpus entities: documents and their derived representations.
//!
//! A [`Corpus`] holds documents in discovery order. Each pipeline stage
//! derives new data (cleaned text, token sequences, matrices) without mutating
//! earlier stages' output.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Unique identifier for documents: the transcript file name.
pub type DocumentId = String;

/// A single transcript in the corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// File name of the transcript (the document identifier)
    pub file_name: DocumentId,

    /// Path the document was read from
    pub path: PathBuf,

    /// Raw or cleaned transcript text
    pub text: String,
}

impl Document {
    /// Create a new document.
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            file_name,
            path,
            text: text.into(),
        }
    }

    /// True if the document has no text content.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// An ordered collection of documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    /// Documents in discovery order
    pub documents: Vec<Document>,
}

impl Corpus {
    /// Create an empty corpus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document, preserving insertion order.
    pub fn push(&mut self, document: Document) {
        self.documents.push(document);
    }

    /// Number of documents in the corpus.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True if the corpus holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterate over documents in order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    /// File names of all documents, in order.
    pub fn file_names(&self) -> Vec<DocumentId> {
        self.documents.iter().map(|d| d.file_name.clone()).collect()
    }
}

/// A corpus after normalization: token sequences aligned with document ids.
///
/// Documents that were empty after preprocessing are absent here; the
/// normalizer logs and skips them without failing the batch.
#[derive(Debug, Clone, Default)]
pub struct TokenizedCorpus {
    /// Document ids, aligned with `documents`
    pub ids: Vec<DocumentId>,

    /// Token sequences, aligned with `ids`
    pub documents: Vec<Vec<String>>,
}

impl TokenizedCorpus {
    /// Number of tokenized documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True if no document survived normalization.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Join each document's tokens back into a single whitespace-separated
    /// string (the form sentence-embedding models expect).
    pub fn joined_texts(&self) -> Vec<String> {
        self.documents.iter().map(|tokens| tokens.join(" ")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_id_from_path() {
        let doc = Document::new("/data/stm/AlGore_2009.stm", "climate talk");
        assert_eq!(doc.file_name, "AlGore_2009.stm");
        assert!(!doc.is_empty());
    }

    #[test]
    fn corpus_preserves_order() {
        let mut corpus = Corpus::new();
        corpus.push(Document::new("b.stm", "second"));
        corpus.push(Document::new("a.stm", "first"));

        assert_eq!(corpus.file_names(), vec!["b.stm", "a.stm"]);
    }

    #[test]
    fn tokenized_corpus_joined_texts() {
        let corpus = TokenizedCorpus {
            ids: vec!["a.stm".to_string()],
            documents: vec![vec!["space".to_string(), "travel".to_string()]],
        };
        assert_eq!(corpus.joined_texts(), vec!["space travel"]);
    }
}

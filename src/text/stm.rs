//! STM transcript parsing and annotation stripping.
//!
//! STM files (TEDLIUM corpus convention) hold one timestamped segment per
//! line:
//!
//! ```text
//! AlGore_2009 1 AlGore_2009 15.71 30.21 <o,f0,male> thank you so much chris
//! ```
//!
//! Cleaning keeps only the spoken words: everything up to and including the
//! speaker-label tag is dropped, along with `<unk>` placeholders and the
//! `ignore_time_segment_in_scoring` marker.

use std::path::Path;

use tracing::{debug, warn};

use crate::core::corpus::{Corpus, Document};
use crate::core::errors::{Result, SkaldError};

/// Markers that never carry spoken content.
const IGNORE_MARKERS: &[&str] = &["ignore_time_segment_in_scoring", "<unk>", "<NA>"];

/// A single parsed STM segment.
#[derive(Debug, Clone, PartialEq)]
pub struct StmSegment {
    /// Talk identifier (first field)
    pub talk_id: String,
    /// Speaker identifier (third field)
    pub speaker: String,
    /// Segment start time in seconds
    pub start: f64,
    /// Segment end time in seconds
    pub end: f64,
    /// Spoken words with annotation markers removed
    pub text: String,
}

/// Parse one STM line into a segment.
///
/// Returns a parse error for lines with fewer than the six mandatory fields;
/// callers treat these as malformed input (logged and skipped).
pub fn parse_line(line: &str) -> Result<StmSegment> {
    let mut fields = line.split_whitespace();

    let talk_id = fields
        .next()
        .ok_or_else(|| SkaldError::parse("empty STM line"))?
        .to_string();
    let _channel = fields
        .next()
        .ok_or_else(|| SkaldError::parse("STM line missing channel field"))?;
    let speaker = fields
        .next()
        .ok_or_else(|| SkaldError::parse("STM line missing speaker field"))?
        .to_string();

    let start: f64 = fields
        .next()
        .ok_or_else(|| SkaldError::parse("STM line missing start time"))?
        .parse()
        .map_err(|_| SkaldError::parse("STM start time is not a number"))?;
    let end: f64 = fields
        .next()
        .ok_or_else(|| SkaldError::parse("STM line missing end time"))?
        .parse()
        .map_err(|_| SkaldError::parse("STM end time is not a number"))?;

    let rest: Vec<&str> = fields.collect();
    // The label tag (<o,f0,male> and friends) leads the word sequence when present
    let words_start = usize::from(rest.first().is_some_and(|tok| tok.starts_with('<')));

    let text = rest[words_start..]
        .iter()
        .filter(|tok| !IGNORE_MARKERS.contains(&tok.trim()))
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    Ok(StmSegment {
        talk_id,
        speaker,
        start,
        end,
        text,
    })
}

/// Strip annotation markup from a whole STM file's contents, returning the
/// concatenated spoken text.
///
/// Lines that fail to parse as STM segments are kept verbatim after marker
/// removal; transcripts that were already cleaned pass through unchanged.
pub fn clean_text(content: &str) -> String {
    let mut spoken = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() || line.trim_start().starts_with(";;") {
            continue;
        }

        match parse_line(line) {
            Ok(segment) => {
                if !segment.text.is_empty() {
                    spoken.push(segment.text);
                }
            }
            Err(_) => {
                let fallback = strip_markers(line);
                if !fallback.is_empty() {
                    spoken.push(fallback);
                }
            }
        }
    }

    spoken.join("\n")
}

/// Remove annotation markers and tags from a free-form line.
fn strip_markers(line: &str) -> String {
    line.split_whitespace()
        .filter(|tok| !tok.starts_with('<') && !IGNORE_MARKERS.contains(&tok.trim()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Clean every transcript in `input_dir`, writing cleaned files with the same
/// names into `output_dir`. Returns the cleaned corpus in file order.
pub fn clean_directory(
    input_dir: &Path,
    output_dir: &Path,
    transcripts: &[std::path::PathBuf],
) -> Result<Corpus> {
    std::fs::create_dir_all(output_dir).map_err(|e| {
        SkaldError::io(
            format!("Failed to create output directory {}", output_dir.display()),
            e,
        )
    })?;

    let mut corpus = Corpus::new();
    for path in transcripts {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Skipping unreadable transcript {}: {e}", path.display());
                continue;
            }
        };

        let cleaned = clean_text(&content);
        let document = Document::new(path.clone(), cleaned);

        let target = output_dir.join(&document.file_name);
        std::fs::write(&target, &document.text).map_err(|e| {
            SkaldError::io(format!("Failed to write {}", target.display()), e)
        })?;

        corpus.push(document);
    }

    debug!(
        "Cleaned {} transcripts from {} into {}",
        corpus.len(),
        input_dir.display(),
        output_dir.display()
    );
    Ok(corpus)
}

/// Read and clean transcripts in memory, without writing cleaned files.
pub fn clean_files(transcripts: &[std::path::PathBuf]) -> Corpus {
    let mut corpus = Corpus::new();
    for path in transcripts {
        match std::fs::read_to_string(path) {
            Ok(content) => corpus.push(Document::new(path.clone(), clean_text(&content))),
            Err(e) => warn!("Skipping unreadable transcript {}: {e}", path.display()),
        }
    }
    corpus
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_segment() {
        let line =
            "AlGore_2009 1 AlGore_2009 15.71 30.21 <o,f0,male> thank you so much chris";
        let segment = parse_line(line).unwrap();

        assert_eq!(segment.talk_id, "AlGore_2009");
        assert_eq!(segment.speaker, "AlGore_2009");
        assert!((segment.start - 15.71).abs() < 1e-9);
        assert_eq!(segment.text, "thank you so much chris");
    }

    #[test]
    fn drops_unk_and_scoring_markers() {
        let line = "Talk 1 Talk 0.0 5.0 <o,f0,female> ignore_time_segment_in_scoring hello <unk> world";
        let segment = parse_line(line).unwrap();
        assert_eq!(segment.text, "hello world");
    }

    #[test]
    fn rejects_truncated_line() {
        assert!(parse_line("Talk 1").is_err());
        assert!(parse_line("").is_err());
    }

    #[test]
    fn clean_text_concatenates_segments() {
        let content = "\
Talk 1 Talk 0.0 5.0 <o,f0,male> first segment
;; a comment line
Talk 1 Talk 5.0 9.0 <o,,unknown> second segment";
        let cleaned = clean_text(content);
        assert_eq!(cleaned, "first segment\nsecond segment");
    }

    #[test]
    fn clean_text_passes_plain_text_through() {
        let cleaned = clean_text("already cleaned spoken words");
        assert_eq!(cleaned, "already cleaned spoken words");
    }

    #[test]
    fn clean_directory_writes_cleaned_files() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        let path = input.path().join("talk.stm");
        std::fs::write(&path, "Talk 1 Talk 0.0 5.0 <o,f0,male> hello there").unwrap();

        let corpus = clean_directory(input.path(), output.path(), &[path]).unwrap();
        assert_eq!(corpus.len(), 1);

        let written = std::fs::read_to_string(output.path().join("talk.stm")).unwrap();
        assert_eq!(written, "hello there");
    }
}

//! Manuscript text extraction.
//!
//! Reviews run on plain text. PDF manuscripts go through `pdf-extract`;
//! plain-text and Markdown files are read as-is.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

/// Extracts the full text of a manuscript file.
///
/// Supported formats are `.pdf`, `.txt`, `.md`, and `.text`. Fails when
/// the file yields no text at all, since every downstream prompt would
/// be empty.
pub fn manuscript_text(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    let text = match extension.as_str() {
        "pdf" => pdf_extract::extract_text(path)
            .with_context(|| format!("Failed to extract text from PDF: {}", path.display()))?,
        "txt" | "md" | "text" => fs::read_to_string(path)
            .with_context(|| format!("Failed to read manuscript: {}", path.display()))?,
        other => bail!(
            "Unsupported manuscript format '.{}' (expected .pdf, .txt, or .md)",
            other
        ),
    };

    if text.trim().is_empty() {
        bail!("No text could be extracted from {}", path.display());
    }

    info!(
        "Extracted {} characters from {}",
        text.len(),
        path.display()
    );

    Ok(text)
}

/// First `max_chars` characters of `text`, cut on a char boundary.
///
/// Prompt budgets are given in characters, and manuscripts routinely
/// contain multi-byte punctuation, so byte slicing is not safe here.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_excerpt_shorter_than_limit() {
        assert_eq!(excerpt("short", 100), "short");
    }

    #[test]
    fn test_excerpt_cuts_at_limit() {
        assert_eq!(excerpt("abcdef", 3), "abc");
        assert_eq!(excerpt("abcdef", 0), "");
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        let text = "héllo wörld";
        let cut = excerpt(text, 4);
        assert_eq!(cut, "héll");
        assert_eq!(cut.chars().count(), 4);
    }

    #[test]
    fn test_manuscript_text_reads_plain_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.md");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "# A Study of Things\n\nSome content.").unwrap();

        let text = manuscript_text(&path).unwrap();
        assert!(text.contains("A Study of Things"));
    }

    #[test]
    fn test_manuscript_text_reads_bundled_sample() {
        let path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures/sample_manuscript.md");

        let text = manuscript_text(&path).unwrap();
        assert!(text.contains("Blue Light Exposure"));
        assert!(text.contains("References"));
    }

    #[test]
    fn test_manuscript_text_rejects_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.docx");
        fs::write(&path, "binary-ish").unwrap();

        let err = manuscript_text(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported manuscript format"));
    }

    #[test]
    fn test_manuscript_text_rejects_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "   \n\t").unwrap();

        let err = manuscript_text(&path).unwrap_err();
        assert!(err.to_string().contains("No text could be extracted"));
    }
}

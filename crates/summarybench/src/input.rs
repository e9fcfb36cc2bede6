use anyhow::{bail, Context, Result};
use std::path::Path;

/// Extensions read as plain text
pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md"];

/// Text pulled from an input file
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    /// Lowercased extension, as recorded in the usage log
    pub file_type: String,
}

fn file_type_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Read a document's text; PDF/DOCX/PPTX extraction is not built in
pub async fn extract_text(path: &Path) -> Result<ExtractedText> {
    let file_type = file_type_of(path).unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&file_type.as_str()) {
        bail!(
            "Cannot read {}: unsupported file type '{}' (supported: {})",
            path.display(),
            file_type,
            SUPPORTED_EXTENSIONS.join(", ")
        );
    }

    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if text.trim().is_empty() {
        bail!("{} contains no text", path.display());
    }

    Ok(ExtractedText { text, file_type })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_plain_text_and_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("notes.TXT");
        std::fs::write(&txt, "Quarterly revenue grew.").unwrap();
        let md = dir.path().join("report.md");
        std::fs::write(&md, "# Report\n\nAll good.").unwrap();

        let extracted = extract_text(&txt).await.unwrap();
        assert_eq!(extracted.text, "Quarterly revenue grew.");
        assert_eq!(extracted.file_type, "txt");

        assert_eq!(extract_text(&md).await.unwrap().file_type, "md");
    }

    #[tokio::test]
    async fn test_rejects_unsupported_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("paper.pdf");
        std::fs::write(&pdf, "%PDF-1.7").unwrap();
        let err = extract_text(&pdf).await.unwrap_err();
        assert!(err.to_string().contains("unsupported file type 'pdf'"));

        let blank = dir.path().join("blank.txt");
        std::fs::write(&blank, "  \n").unwrap();
        assert!(extract_text(&blank).await.is_err());

        assert!(extract_text(&dir.path().join("missing.txt")).await.is_err());
    }
}

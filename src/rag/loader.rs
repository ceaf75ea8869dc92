//! Document loading.
//!
//! PDFs go through `pdf-extract` page by page; `.txt` and `.md` files are
//! read as UTF-8.
//! Extraction runs on the blocking pool because `pdf-extract` is synchronous
//! and may panic on malformed input, which surfaces here as a load error.

use crate::storage::file_name_of;
use crate::types::{AppError, Document, DocumentMetadata, Result};
use std::path::Path;

/// Load a file into one or more page-level documents.
///
/// PDF pages keep their 1-based page number, including when blank pages
/// around them are skipped. Text files become a single document with no page.
pub async fn load_document(path: &Path) -> Result<Vec<Document>> {
    let source = file_name_of(path);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let bytes = tokio::fs::read(path).await?;

    let (pages, paged) = match extension.as_str() {
        "pdf" => {
            let pages = tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_from_mem_by_pages(&bytes)
                    .map_err(|e| AppError::InvalidInput(format!("PDF extraction failed: {}", e)))
            })
            .await
            .map_err(|e| AppError::InvalidInput(format!("PDF extraction aborted: {}", e)))??;
            (pages, true)
        }
        "txt" | "md" | "markdown" => (vec![String::from_utf8_lossy(&bytes).into_owned()], false),
        other => {
            return Err(AppError::InvalidInput(format!(
                "No loader for '.{}' files",
                other
            )))
        }
    };

    let documents = pages
        .into_iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(i, text)| Document {
            id: format!("{}#{}", source, i + 1),
            content: text,
            metadata: DocumentMetadata {
                source: source.clone(),
                page: paged.then_some(i as u32 + 1),
                chunk_index: 0,
            },
            embedding: None,
        })
        .collect();

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// A minimal PDF with one Helvetica text line per page.
    fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
        let first_page = 4;
        let kids: Vec<String> = (0..pages.len())
            .map(|i| format!("{} 0 R", first_page + 2 * i))
            .collect();

        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                pages.len()
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        ];
        for (i, text) in pages.iter().enumerate() {
            let content = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text);
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                first_page + 2 * i + 1
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                content.len(),
                content
            ));
        }

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, object) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, object).as_bytes());
        }
        let xref_at = pdf.len();
        let xref_header = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        pdf.extend_from_slice(xref_header.as_bytes());
        for offset in offsets {
            pdf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_at
            )
            .as_bytes(),
        );
        pdf
    }

    #[tokio::test]
    async fn test_load_pdf_one_document_per_page() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("two.pdf");
        std::fs::write(&path, pdf_with_pages(&["Alpha page one", "Beta page two"])).unwrap();

        let docs = load_document(&path).await.unwrap();

        assert_eq!(docs.len(), 2);
        assert!(docs[0].content.contains("Alpha page one"));
        assert!(!docs[0].content.contains("Beta"));
        assert!(docs[1].content.contains("Beta page two"));
        assert_eq!(docs[0].metadata.page, Some(1));
        assert_eq!(docs[1].metadata.page, Some(2));
        assert_eq!(docs[1].id, "two.pdf#2");
        assert_eq!(docs[1].metadata.source, "two.pdf");
    }

    #[tokio::test]
    async fn test_single_page_pdf_keeps_page_number() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("one.pdf");
        std::fs::write(&path, pdf_with_pages(&["Only page"])).unwrap();

        let docs = load_document(&path).await.unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].metadata.page, Some(1));
    }

    #[tokio::test]
    async fn test_load_text_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Rust is a systems language.").unwrap();

        let docs = load_document(&path).await.unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, "Rust is a systems language.");
        assert_eq!(docs[0].metadata.source, "notes.txt");
        assert_eq!(docs[0].metadata.page, None);
    }

    #[tokio::test]
    async fn test_blank_text_file_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blank.md");
        std::fs::write(&path, "  \n\t").unwrap();

        assert!(load_document(&path).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        assert!(load_document(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("image.png");
        std::fs::write(&path, [0u8; 4]).unwrap();

        assert!(matches!(
            load_document(&path).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = load_document(Path::new("/nonexistent/file.pdf")).await;
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}

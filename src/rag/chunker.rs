use crate::types::{AppError, Document, Result};
use text_splitter::{ChunkConfig, TextSplitter};

/// Character-window splitter with overlap, backed by `text-splitter`.
///
/// The splitter prefers semantic boundaries (paragraphs, sentences, words)
/// and only falls back to raw characters when a unit exceeds `chunk_size`.
pub struct TextChunker {
    splitter: TextSplitter<text_splitter::Characters>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(AppError::InvalidInput(
                "chunk_size must be greater than zero".into(),
            ));
        }

        let config = ChunkConfig::new(chunk_size)
            .with_overlap(chunk_overlap)
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;

        Ok(Self {
            splitter: TextSplitter::new(config),
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        self.splitter
            .chunks(text)
            .filter(|c| !c.trim().is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Split every document, copying its metadata onto each chunk.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        documents
            .iter()
            .flat_map(|doc| {
                self.chunk(&doc.content)
                    .into_iter()
                    .enumerate()
                    .map(move |(i, content)| {
                        let mut metadata = doc.metadata.clone();
                        metadata.chunk_index = i;
                        Document {
                            id: format!("{}-{}", doc.id, i),
                            content,
                            metadata,
                            embedding: None,
                        }
                    })
            })
            .collect()
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            splitter: TextSplitter::new(
                ChunkConfig::new(1000)
                    .with_overlap(150)
                    .unwrap_or_else(|_| ChunkConfig::new(1000)),
            ),
            chunk_size: 1000,
            chunk_overlap: 150,
        }
    }
}

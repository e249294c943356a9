/// A contiguous slice of a source document used as a retrieval unit.
/// Immutable once created; chunks are discarded and replaced wholesale
/// on every index rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChunk {
    pub text: String,
    pub source: String,
}

impl DocumentChunk {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
        }
    }
}

/// An in-memory similarity-searchable index: chunks paired positionally
/// with their embedding vectors. Every vector was produced by the same
/// embedding model; mixing embedding spaces is undefined.
#[derive(Debug)]
pub struct DocumentIndex {
    chunks: Vec<DocumentChunk>,
    vectors: Vec<Vec<f32>>,
    embedding_model: String,
}

impl DocumentIndex {
    pub fn new(
        chunks: Vec<DocumentChunk>,
        vectors: Vec<Vec<f32>>,
        embedding_model: impl Into<String>,
    ) -> Self {
        debug_assert_eq!(chunks.len(), vectors.len());
        Self {
            chunks,
            vectors,
            embedding_model: embedding_model.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[DocumentChunk] {
        &self.chunks
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }
}

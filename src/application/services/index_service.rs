//! Builds the in-memory retrieval index from a watched docs folder and
//! owns the shared handle chat requests read it through.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::application::ports::{EmbeddingProvider, EmbeddingProviderError};
use crate::domain::entities::{DocumentChunk, DocumentIndex};
use crate::text::chunking::OverlapSplitter;

#[derive(Debug)]
pub enum IndexServiceError {
    Embedding(EmbeddingProviderError),
    Io(std::io::Error),
}

impl std::fmt::Display for IndexServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexServiceError::Embedding(e) => write!(f, "Embedding error: {}", e),
            IndexServiceError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for IndexServiceError {}

/// Replace-on-write handle to the current index. Readers observe either
/// the previous index or a fully built new one, never a partial build;
/// publication is a single Arc swap under the write lock.
#[derive(Default)]
pub struct IndexHandle {
    current: RwLock<Option<Arc<DocumentIndex>>>,
}

impl IndexHandle {
    pub async fn current(&self) -> Option<Arc<DocumentIndex>> {
        self.current.read().await.clone()
    }

    async fn publish(&self, index: Option<Arc<DocumentIndex>>) {
        *self.current.write().await = index;
    }
}

pub struct IndexService {
    docs_dir: PathBuf,
    splitter: OverlapSplitter,
    embeddings: Arc<dyn EmbeddingProvider>,
    handle: Arc<IndexHandle>,
}

impl IndexService {
    pub fn new(
        docs_dir: PathBuf,
        splitter: OverlapSplitter,
        embeddings: Arc<dyn EmbeddingProvider>,
        handle: Arc<IndexHandle>,
    ) -> Self {
        Self {
            docs_dir,
            splitter,
            embeddings,
            handle,
        }
    }

    pub fn handle(&self) -> Arc<IndexHandle> {
        self.handle.clone()
    }

    /// Rebuilds the index from every `.txt` file in the docs folder and
    /// publishes the result. On failure the previously published index
    /// (or its absence) is left untouched. Returns whether an index is
    /// present after the rebuild.
    pub async fn rebuild(&self) -> Result<bool, IndexServiceError> {
        let index = self.build_index().await?;
        let present = index.is_some();
        self.handle.publish(index.map(Arc::new)).await;

        if present {
            tracing::info!("document index rebuilt");
        } else {
            tracing::info!("no documents found, running without retrieval index");
        }
        Ok(present)
    }

    /// Scans the folder (non-recursive) for `.txt` files, chunks them,
    /// and embeds all chunks in one batch. No readable `.txt` files
    /// yields `Ok(None)`: a valid mode in which chat falls back to
    /// non-augmented prompts. Per-file read failures are logged and the
    /// file skipped.
    async fn build_index(&self) -> Result<Option<DocumentIndex>, IndexServiceError> {
        tokio::fs::create_dir_all(&self.docs_dir)
            .await
            .map_err(IndexServiceError::Io)?;

        let mut chunks: Vec<DocumentChunk> = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.docs_dir)
            .await
            .map_err(IndexServiceError::Io)?;

        while let Some(entry) = entries.next_entry().await.map_err(IndexServiceError::Io)? {
            let path = entry.path();
            if !is_txt_file(&path) {
                continue;
            }
            let source = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            match tokio::fs::read_to_string(&path).await {
                Ok(text) => {
                    for piece in self.splitter.split_text(&text) {
                        chunks.push(DocumentChunk::new(piece, source.clone()));
                    }
                }
                Err(e) => {
                    tracing::warn!("skipping document {}: {}", path.display(), e);
                }
            }
        }

        if chunks.is_empty() {
            return Ok(None);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self
            .embeddings
            .embed_batch(&texts)
            .await
            .map_err(IndexServiceError::Embedding)?;

        if vectors.len() != chunks.len() {
            return Err(IndexServiceError::Embedding(
                EmbeddingProviderError::ApiError(format!(
                    "embedding count mismatch: {} chunks, {} vectors",
                    chunks.len(),
                    vectors.len()
                )),
            ));
        }

        Ok(Some(DocumentIndex::new(
            chunks,
            vectors,
            self.embeddings.model_name(),
        )))
    }
}

fn is_txt_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "txt")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Deterministic embedder: vector = [byte length, 1.0].
    struct FakeEmbeddings {
        fail: AtomicBool,
    }

    impl FakeEmbeddings {
        fn new() -> Self {
            Self {
                fail: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for FakeEmbeddings {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingProviderError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(EmbeddingProviderError::ApiError("down".into()));
            }
            Ok(vec![text.len() as f32, 1.0])
        }

        async fn embed_batch(
            &self,
            texts: &[String],
        ) -> Result<Vec<Vec<f32>>, EmbeddingProviderError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(EmbeddingProviderError::ApiError("down".into()));
            }
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn model_name(&self) -> &str {
            "fake-embed"
        }
    }

    fn service(dir: &Path, embeddings: Arc<FakeEmbeddings>) -> IndexService {
        IndexService::new(
            dir.to_path_buf(),
            OverlapSplitter::new(50, 10),
            embeddings,
            Arc::new(IndexHandle::default()),
        )
    }

    #[tokio::test]
    async fn empty_folder_publishes_no_index() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path(), Arc::new(FakeEmbeddings::new()));
        assert!(!svc.rebuild().await.unwrap());
        assert!(svc.handle().current().await.is_none());
    }

    #[tokio::test]
    async fn txt_files_are_indexed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello retrieval world").unwrap();
        std::fs::write(dir.path().join("ignored.pdf"), "binary").unwrap();

        let svc = service(dir.path(), Arc::new(FakeEmbeddings::new()));
        assert!(svc.rebuild().await.unwrap());

        let index = svc.handle().current().await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.chunks()[0].source, "notes.txt");
        assert_eq!(index.embedding_model(), "fake-embed");
    }

    #[tokio::test]
    async fn failed_rebuild_keeps_previous_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "first document").unwrap();

        let embeddings = Arc::new(FakeEmbeddings::new());
        let svc = service(dir.path(), embeddings.clone());
        svc.rebuild().await.unwrap();
        let before = svc.handle().current().await.unwrap();

        embeddings.fail.store(true, Ordering::SeqCst);
        std::fs::write(dir.path().join("b.txt"), "second document").unwrap();
        assert!(svc.rebuild().await.is_err());

        let after = svc.handle().current().await.unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[tokio::test]
    async fn long_document_produces_multiple_chunks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("long.txt"), "lorem ipsum ".repeat(40)).unwrap();

        let svc = service(dir.path(), Arc::new(FakeEmbeddings::new()));
        svc.rebuild().await.unwrap();

        let index = svc.handle().current().await.unwrap();
        assert!(index.len() > 1);
        assert_eq!(index.chunks().len(), index.vectors().len());
    }
}

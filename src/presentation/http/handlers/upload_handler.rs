use axum::Json;
use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::services::IndexService;
use crate::presentation::http::errors::AppError;

const ALLOWED_EXTENSIONS: [&str; 4] = ["txt", "pdf", "doc", "docx"];

pub struct UploadHandler {
    docs_dir: PathBuf,
    index_service: Arc<IndexService>,
}

impl UploadHandler {
    pub fn new(docs_dir: PathBuf, index_service: Arc<IndexService>) -> Self {
        Self {
            docs_dir,
            index_service,
        }
    }

    /// `POST /upload` — accepts a single `.txt` file and rebuilds the
    /// retrieval index immediately.
    pub async fn upload_document(
        State(handler): State<Arc<UploadHandler>>,
        mut multipart: Multipart,
    ) -> Result<impl IntoResponse, AppError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            if field.name() != Some("file") {
                continue;
            }

            let filename = field.file_name().unwrap_or_default().to_string();
            if filename.is_empty() {
                return Err(AppError::BadRequest("No selected file".to_string()));
            }
            if !filename.ends_with(".txt") {
                return Err(AppError::BadRequest(
                    "Only .txt files are supported".to_string(),
                ));
            }

            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;

            handler.save_file(&filename, &data).await?;

            handler
                .index_service
                .rebuild()
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;

            return Ok(Json(json!({
                "message": "File uploaded and processed successfully"
            })));
        }

        Err(AppError::BadRequest("No file part".to_string()))
    }

    /// `POST /upload_knowledge` — accepts a wider set of document types
    /// and stores them without touching the index. Only `.txt` files
    /// are picked up by the next rebuild.
    pub async fn upload_knowledge(
        State(handler): State<Arc<UploadHandler>>,
        mut multipart: Multipart,
    ) -> Result<impl IntoResponse, AppError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            if field.name() != Some("file") {
                continue;
            }

            let filename = field.file_name().unwrap_or_default().to_string();
            if filename.is_empty() {
                return Err(AppError::BadRequest("没有选择文件".to_string()));
            }
            if !allowed_file(&filename) {
                return Err(AppError::BadRequest("不支持的文件类型".to_string()));
            }

            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;

            let saved = handler.save_file(&filename, &data).await?;

            return Ok(Json(json!({
                "message": "文件上传成功",
                "filename": saved
            })));
        }

        Err(AppError::BadRequest("没有文件部分".to_string()))
    }

    async fn save_file(&self, filename: &str, data: &[u8]) -> Result<String, AppError> {
        let safe = sanitize_filename(filename)
            .ok_or_else(|| AppError::BadRequest("没有选择文件".to_string()))?;

        tokio::fs::create_dir_all(&self.docs_dir)
            .await
            .map_err(|e| AppError::Internal(format!("保存文件时出错: {}", e)))?;

        tokio::fs::write(self.docs_dir.join(&safe), data)
            .await
            .map_err(|e| AppError::Internal(format!("保存文件时出错: {}", e)))?;

        Ok(safe)
    }
}

fn allowed_file(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Keeps only the final path component, so an uploaded name can never
/// escape the docs folder.
fn sanitize_filename(filename: &str) -> Option<String> {
    Path::new(filename)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_string)
}

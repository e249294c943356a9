use axum::Json;
use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{ChatMessage, GenerationParams};
use crate::llm::ProviderRegistry;
use crate::presentation::http::errors::{AppError, sanitize_upstream_message};
use crate::text::math_format;

const MAX_DIMENSION: u32 = 1024;
const JPEG_QUALITY: u8 = 85;

pub struct VisionHandler {
    registry: ProviderRegistry,
}

impl VisionHandler {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    /// `POST /chat_with_image` — multipart with an `image` file and a
    /// `question` field. The answer is returned non-streamed, after
    /// math-notation cleanup.
    pub async fn chat_with_image(
        State(handler): State<Arc<VisionHandler>>,
        mut multipart: Multipart,
    ) -> Result<impl IntoResponse, AppError> {
        let mut image: Option<axum::body::Bytes> = None;
        let mut question: Option<String> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            match field.name() {
                Some("image") => {
                    image = Some(
                        field
                            .bytes()
                            .await
                            .map_err(|e| AppError::BadRequest(e.to_string()))?,
                    );
                }
                Some("question") => {
                    question = Some(
                        field
                            .text()
                            .await
                            .map_err(|e| AppError::BadRequest(e.to_string()))?,
                    );
                }
                _ => {}
            }
        }

        let image = image.ok_or_else(|| AppError::BadRequest("请提供图片".to_string()))?;
        let question = question.ok_or_else(|| AppError::BadRequest("请提供问题".to_string()))?;
        if image.is_empty() {
            return Err(AppError::BadRequest("图片文件为空".to_string()));
        }

        let data_url = tokio::task::spawn_blocking(move || encode_image(&image))
            .await
            .map_err(|e| AppError::Internal(format!("图片处理失败: {}", e)))?
            .map_err(|e| AppError::Internal(format!("图片处理失败: {}", e)))?;

        let provider = handler.registry.vision().map_err(|e| {
            AppError::Upstream(format!(
                "调用AI服务失败: {}",
                sanitize_upstream_message(&e.to_string())
            ))
        })?;

        let messages = vec![ChatMessage::user_with_image(question, data_url)];
        let params = GenerationParams {
            temperature: None,
            max_tokens: Some(1024),
        };

        let answer = provider.chat(&messages, params).await.map_err(|e| {
            AppError::Upstream(format!(
                "调用AI服务失败: {}",
                sanitize_upstream_message(&e.to_string())
            ))
        })?;

        Ok(Json(json!({ "response": math_format::normalize(&answer) })))
    }
}

/// Re-encodes any supported input image as an RGB JPEG data URL,
/// downscaling to fit within 1024x1024 while keeping the aspect ratio.
fn encode_image(data: &[u8]) -> Result<String, image::ImageError> {
    let decoded = image::load_from_memory(data)?;
    let resized = decoded.thumbnail(MAX_DIMENSION, MAX_DIMENSION);
    let rgb = image::DynamicImage::ImageRgb8(resized.to_rgb8());

    let mut buf = std::io::Cursor::new(Vec::new());
    rgb.write_with_encoder(image::codecs::jpeg::JpegEncoder::new_with_quality(
        &mut buf,
        JPEG_QUALITY,
    ))?;

    Ok(format!(
        "data:image/jpeg;base64,{}",
        STANDARD.encode(buf.into_inner())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_pixel(width, height, Rgb::<u8>([200, 30, 30]));
        let mut buf = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn encodes_a_jpeg_data_url() {
        let url = encode_image(&png_bytes(8, 8)).unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));

        let payload = STANDARD
            .decode(url.trim_start_matches("data:image/jpeg;base64,"))
            .unwrap();
        let reloaded = image::load_from_memory(&payload).unwrap();
        assert_eq!(reloaded.width(), 8);
        assert_eq!(reloaded.height(), 8);
    }

    #[test]
    fn oversized_images_are_downscaled() {
        let url = encode_image(&png_bytes(2048, 1024)).unwrap();
        let payload = STANDARD
            .decode(url.trim_start_matches("data:image/jpeg;base64,"))
            .unwrap();
        let reloaded = image::load_from_memory(&payload).unwrap();
        assert!(reloaded.width() <= MAX_DIMENSION);
        assert!(reloaded.height() <= MAX_DIMENSION);
        // Aspect ratio survives the resize.
        assert_eq!(reloaded.width(), reloaded.height() * 2);
    }

    #[test]
    fn garbage_bytes_are_an_error() {
        assert!(encode_image(b"definitely not an image").is_err());
    }
}

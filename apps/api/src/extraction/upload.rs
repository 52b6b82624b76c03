use axum::extract::Multipart;
use bytes::Bytes;

use crate::errors::AppError;

/// Multipart field that carries the document.
pub const FILE_FIELD: &str = "file";

/// An uploaded document held in memory until extraction finishes.
#[derive(Debug)]
pub struct Upload {
    pub filename: String,
    pub data: Bytes,
}

/// Reads the `file` field out of a multipart form; other fields are ignored.
pub async fn parse_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read form field: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read form field: {e}")))?;
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read file data: {e}")))?;

        upload = Some(Upload { filename, data });
    }

    let upload = upload.ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;
    if upload.data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    Ok(upload)
}

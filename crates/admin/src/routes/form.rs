//! Multipart form reading for catalog records with an optional image.
//!
//! Catalog forms post `multipart/form-data` with text fields, an `image_url`
//! text field and an `image` file input. A chosen file wins over the text
//! URL; an empty file input (nothing chosen) is ignored.

use std::collections::HashMap;

use axum::extract::Multipart;

use crate::error::Result;
use crate::services::storage::{ImageUpload, ObjectStore, StorageError, store_image};

/// Name of the file input.
pub const IMAGE_FIELD: &str = "image";

/// Name of the text input holding an existing or external image URL.
pub const IMAGE_URL_FIELD: &str = "image_url";

/// Text fields plus the optional image part of a submitted form.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    image: Option<ImageUpload>,
}

impl MultipartForm {
    /// Read every part of the body.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Multipart` for malformed bodies or bodies over the
    /// route's size limit.
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if name == IMAGE_FIELD {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let bytes = field.bytes().await?;
                if !file_name.is_empty() && !bytes.is_empty() {
                    form.image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Trimmed text value; empty when the field was not sent.
    #[must_use]
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map_or("", |value| value.trim())
    }

    /// A form with only text fields.
    #[cfg(test)]
    pub(crate) fn with_fields(fields: &[(&str, &str)]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
                .collect(),
            image: None,
        }
    }

    /// Trimmed text value, `None` when blank.
    #[must_use]
    pub fn optional(&self, name: &str) -> Option<String> {
        Some(self.text(name))
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    }

    /// Whether a checkbox was ticked.
    #[must_use]
    pub fn checked(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Whether a file was chosen.
    #[must_use]
    pub const fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Upload the chosen file, or fall back to the `image_url` text field.
    ///
    /// # Errors
    ///
    /// Returns the upload's `StorageError`; the caller must not write the
    /// record.
    pub async fn image_url(
        &mut self,
        store: &dyn ObjectStore,
    ) -> std::result::Result<Option<String>, StorageError> {
        match self.image.take() {
            Some(upload) => store_image(store, upload).await.map(Some),
            None => Ok(self.optional(IMAGE_URL_FIELD)),
        }
    }
}

/// [`MultipartForm::image_url`] with failures turned into a flash code.
///
/// # Errors
///
/// Returns the flash code for the failed upload.
pub async fn resolve_image(
    form: &mut MultipartForm,
    store: &dyn ObjectStore,
) -> std::result::Result<Option<String>, &'static str> {
    form.image_url(store)
        .await
        .map_err(|e| upload_error_code(&e))
}

/// Flash code for a failed upload. Store failures are logged here.
#[must_use]
pub fn upload_error_code(err: &StorageError) -> &'static str {
    match err {
        StorageError::NotAnImage(content_type) => {
            tracing::info!(content_type = %content_type, "Rejected non-image upload");
            "invalid_image"
        }
        StorageError::TooLarge(size) => {
            tracing::info!(size, "Rejected oversized upload");
            "image_too_large"
        }
        StorageError::InvalidKey(_) | StorageError::Io(_) | StorageError::Http(_) => {
            let event_id = sentry::capture_error(err);
            tracing::error!(error = %err, sentry_event_id = %event_id, "Image upload failed");
            "upload_failed"
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{Request, header};

    use super::*;
    use crate::services::LocalObjectStore;

    const BOUNDARY: &str = "halwa-boundary";

    fn text_part(name: &str, value: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
    }

    fn file_part(file_name: &str, content_type: &str, content: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n{content}\r\n"
        )
    }

    async fn read(parts: &[String]) -> MultipartForm {
        let body = format!("{}--{BOUNDARY}--\r\n", parts.concat());
        let request = Request::post("/offers")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let multipart = Multipart::from_request(request, &()).await.unwrap();
        MultipartForm::read(multipart).await.unwrap()
    }

    #[tokio::test]
    async fn test_reads_text_fields_and_checkboxes() {
        let form = read(&[
            text_part("title", "  Diwali Special  "),
            text_part("button_text", ""),
            text_part("enabled", "on"),
        ])
        .await;

        assert_eq!(form.text("title"), "Diwali Special");
        assert_eq!(form.optional("button_text"), None);
        assert_eq!(form.text("missing"), "");
        assert!(form.checked("enabled"));
        assert!(!form.checked("featured"));
        assert!(!form.has_image());
    }

    #[tokio::test]
    async fn test_empty_file_input_is_ignored() {
        let mut form = read(&[
            file_part("", "application/octet-stream", ""),
            text_part("image_url", "https://cdn.example.com/halwa.jpg"),
        ])
        .await;
        assert!(!form.has_image());

        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "/uploads");
        assert_eq!(
            form.image_url(&store).await.unwrap().as_deref(),
            Some("https://cdn.example.com/halwa.jpg")
        );
    }

    #[tokio::test]
    async fn test_chosen_file_replaces_text_url() {
        let mut form = read(&[
            file_part("kaju katli.png", "image/png", "png-bytes"),
            text_part("image_url", "/uploads/old.png"),
        ])
        .await;
        assert!(form.has_image());

        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "/uploads");
        let url = form.image_url(&store).await.unwrap().unwrap();

        assert!(url.starts_with("/uploads/admin_uploads/"));
        assert!(url.ends_with("_kaju_katli.png"));
    }

    #[tokio::test]
    async fn test_non_image_file_is_rejected() {
        let mut form = read(&[file_part("notes.txt", "text/plain", "hello")]).await;

        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "/uploads");
        let err = form.image_url(&store).await.unwrap_err();

        assert_eq!(upload_error_code(&err), "invalid_image");
    }
}

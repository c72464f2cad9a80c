//! Multipart form intake
//!
//! The frontend submits uploads as multipart forms: one optional `file` field
//! plus flat text fields, with nested sub-objects flattened into bracket
//! notation (`emergencyContact[name]`). Files land in the media directory
//! under a uuid-prefixed name and are served back read-only from `/media`.
//! There is no de-duplication or locking; distinct names never collide.

use axum::extract::Multipart;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;

/// Parsed multipart form: text fields by name plus the stored filename of the
/// uploaded file, if any.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    pub file: Option<String>,
}

impl UploadForm {
    /// Get a text field, treating empty strings as absent
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Get a required text field
    pub fn required(&self, name: &str) -> Result<&str, ApiError> {
        self.text(name)
            .ok_or_else(|| ApiError::BadRequest(format!("Missing field: {}", name)))
    }

    /// Get an optional field parsed into another type
    pub fn parsed<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>, ApiError> {
        self.text(name)
            .map(|s| {
                s.parse()
                    .map_err(|_| ApiError::BadRequest(format!("Invalid value for field: {}", name)))
            })
            .transpose()
    }

    /// Get a required field parsed into another type
    pub fn required_parsed<T: std::str::FromStr>(&self, name: &str) -> Result<T, ApiError> {
        self.parsed(name)?
            .ok_or_else(|| ApiError::BadRequest(format!("Missing field: {}", name)))
    }

    #[cfg(test)]
    pub(crate) fn with_fields(pairs: &[(&str, &str)]) -> Self {
        Self {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            file: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn and_file(mut self, name: &str) -> Self {
        self.file = Some(name.to_string());
        self
    }
}

/// Keep the client-supplied filename readable but safe to store.
fn sanitize_filename(name: &str) -> String {
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Remove a stored upload that ended up unused, e.g. because the request was
/// denied after the stream had already been drained. Best effort.
pub async fn discard(media_dir: &Path, stored: Option<&str>) {
    if let Some(name) = stored {
        if let Err(e) = tokio::fs::remove_file(media_dir.join(name)).await {
            tracing::warn!("Failed to remove unused upload {}: {}", name, e);
        }
    }
}

/// Drain a multipart stream into an [`UploadForm`], writing the `file` field
/// (if present) into the media directory.
pub async fn collect(mut multipart: Multipart, media_dir: &Path) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Malformed multipart payload: {}", e))
    })? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "file" {
            let original = field.file_name().map(sanitize_filename).unwrap_or_default();
            let stored = if original.is_empty() {
                Uuid::new_v4().to_string()
            } else {
                format!("{}-{}", Uuid::new_v4(), original)
            };

            let bytes = field.bytes().await.map_err(|e| {
                ApiError::BadRequest(format!("Failed to read uploaded file: {}", e))
            })?;

            tokio::fs::write(media_dir.join(&stored), &bytes)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to store uploaded file: {}", e);
                    ApiError::InternalServerError
                })?;

            info!("Stored uploaded file as {}", stored);
            form.file = Some(stored);
        } else {
            let value = field.text().await.map_err(|e| {
                ApiError::BadRequest(format!("Malformed multipart payload: {}", e))
            })?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_strips_paths_and_odd_characters() {
        assert_eq!(sanitize_filename("notes.pdf"), "notes.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("a b&c.png"), "a_b_c.png");
        assert_eq!(sanitize_filename("C:\\photos\\me.jpg"), "me.jpg");
    }

    #[test]
    fn test_bracket_notation_fields_are_plain_keys() {
        let form = UploadForm::with_fields(&[
            ("firstName", "Asha"),
            ("emergencyContact[name]", "Ravi"),
            ("emergencyContact[phone]", ""),
        ]);

        assert_eq!(form.text("firstName"), Some("Asha"));
        assert_eq!(form.text("emergencyContact[name]"), Some("Ravi"));
        // Empty strings are treated as absent.
        assert_eq!(form.text("emergencyContact[phone]"), None);
        assert!(form.required("emergencyContact[relationship]").is_err());
    }

    #[test]
    fn test_parsed_fields() {
        let form = UploadForm::with_fields(&[("semester", "3"), ("credits", "four")]);

        assert_eq!(form.required_parsed::<i16>("semester").unwrap(), 3);
        assert!(form.parsed::<i16>("credits").is_err());
        assert_eq!(form.parsed::<i16>("absent").unwrap(), None);
    }

    #[tokio::test]
    async fn test_discard_removes_stored_file() {
        let dir = std::env::temp_dir();
        let name = format!("{}-discard-test", Uuid::new_v4());
        tokio::fs::write(dir.join(&name), b"orphan").await.unwrap();

        discard(&dir, Some(&name)).await;
        assert!(!dir.join(&name).exists());

        // Absent file and absent name are both quiet no-ops.
        discard(&dir, Some(&name)).await;
        discard(&dir, None).await;
    }
}

// handlers/extract.rs - Request extractors shared by public and protected handlers

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Multipart, Request},
    Json,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::database::models::DocumentField;
use crate::error::ApiError;
use crate::media::UploadedFile;

/// JSON body whose rejections render as 400 validation errors in the API envelope
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::bad_request("Expected request with `Content-Type: application/json`")
        }
        other => ApiError::validation_error(other.body_text(), None),
    }
}

/// Files and field names collected from a multipart upload.
///
/// Every part carrying a file name is a file, in request order; `field_names`
/// holds a comma-delimited list naming the document slot for each file.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<UploadedFile>,
    pub field_names: Vec<String>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "field_names" {
                let text = field.text().await?;
                form.field_names.extend(
                    text.split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(str::to_string),
                );
            } else if let Some(file_name) = field.file_name().map(str::to_string) {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await?.to_vec();
                form.files.push(UploadedFile {
                    file_name,
                    content_type,
                    data,
                });
            } else {
                tracing::debug!("Ignoring multipart part '{}'", name);
            }
        }

        Ok(form)
    }

    /// The single file of a one-file upload such as an image or profile scan
    pub fn single_file(mut self, part: &str) -> Result<UploadedFile, ApiError> {
        match self.files.len() {
            1 => Ok(self.files.remove(0)),
            0 => Err(ApiError::bad_request(format!("Missing file part '{}'", part))),
            n => Err(ApiError::bad_request(format!(
                "Expected exactly one file, received {}",
                n
            ))),
        }
    }

    /// Pair each file with its document slot.
    ///
    /// Counts must match and every name must be a known slot; files sent with
    /// an empty file name are dropped after pairing.
    pub fn into_documents<F: DocumentField>(self) -> Result<Vec<(F, UploadedFile)>, ApiError> {
        if self.files.len() != self.field_names.len() {
            return Err(ApiError::bad_request(format!(
                "Number of files ({}) must match number of field names ({}). Field names: [{}]",
                self.files.len(),
                self.field_names.len(),
                self.field_names.join(", ")
            )));
        }

        let mut unknown = HashMap::new();
        let mut pairs = Vec::with_capacity(self.files.len());
        for (file, name) in self.files.into_iter().zip(self.field_names) {
            match name.parse::<F>() {
                Ok(slot) => pairs.push((slot, file)),
                Err(err) => {
                    unknown.insert(name, err.to_string());
                }
            }
        }

        if !unknown.is_empty() {
            let mut names: Vec<&String> = unknown.keys().collect();
            names.sort();
            let listed = names
                .iter()
                .map(|n| n.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ApiError::validation_error(
                format!("Invalid field name: {}", listed),
                Some(unknown),
            ));
        }

        pairs.retain(|(_, file)| !file.file_name.is_empty());
        Ok(pairs)
    }
}

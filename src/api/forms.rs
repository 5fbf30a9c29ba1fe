//! Multipart form collection for the file-bearing endpoints.

use std::collections::HashMap;

use actix_multipart::Multipart;
use futures::TryStreamExt;

use crate::error::ApiError;
use crate::services::mutations::FileUpload;

#[derive(Default)]
pub struct MultipartForm {
    texts: HashMap<String, String>,
    files: HashMap<String, FileUpload>,
}

impl MultipartForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(String::as_str)
    }

    pub fn require_text(&self, name: &str) -> Result<&str, ApiError> {
        self.text(name)
            .ok_or_else(|| ApiError::BadRequest(format!("Field '{name}' is required")))
    }

    pub fn take_file(&mut self, name: &str) -> Option<FileUpload> {
        self.files.remove(name)
    }

    pub fn require_file(&mut self, name: &str) -> Result<FileUpload, ApiError> {
        self.take_file(name)
            .ok_or_else(|| ApiError::BadRequest(format!("File '{name}' is required")))
    }
}

/// Drains the multipart payload into named text fields and buffered files.
/// Unnamed fields are skipped.
pub async fn read_form(mut payload: Multipart) -> Result<MultipartForm, ApiError> {
    let mut form = MultipartForm::default();

    while let Ok(Some(mut field)) = payload.try_next().await {
        let (name, filename) = {
            let Some(cd) = field.content_disposition() else {
                continue;
            };
            (
                cd.get_name().map(str::to_owned),
                cd.get_filename().map(str::to_owned),
            )
        };
        let Some(name) = name else {
            // Skip unnamed fields
            while (field.try_next().await.ok().flatten()).is_some() {}
            continue;
        };

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|_| ApiError::BadRequest("Invalid multipart payload".into()))?
        {
            bytes.extend_from_slice(&chunk);
        }

        match filename {
            Some(filename) => {
                form.files.insert(name, FileUpload { filename, bytes });
            }
            None => {
                let text = String::from_utf8(bytes)
                    .map_err(|_| ApiError::BadRequest("Invalid UTF-8 in form field".into()))?;
                form.texts.insert(name, text);
            }
        }
    }

    Ok(form)
}

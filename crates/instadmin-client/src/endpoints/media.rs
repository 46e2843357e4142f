use crate::client::{ApiClient, transport_error};
use instadmin_core::types::{ActionResponse, Media, MediaId, MediaQuery, MediaUpdate};
use instadmin_core::utils::{media_mime_type, validate_media_file};
use instadmin_core::{Error, Result};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use std::path::Path;

impl ApiClient {
    /// Upload a media file from disk
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unsupported extension, an I/O
    /// error if the file cannot be read, or the API error.
    pub async fn upload_media(&self, path: &Path, alt_text: Option<&str>) -> Result<Media> {
        validate_media_file(path)?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::validation("file", "File name is not valid UTF-8"))?
            .to_string();
        let data = tokio::fs::read(path).await?;

        self.upload_media_bytes(&file_name, data, alt_text).await
    }

    /// Upload in-memory media as multipart `file` plus optional `alt_text`
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unsupported extension or the API error.
    pub async fn upload_media_bytes(
        &self,
        file_name: &str,
        data: Vec<u8>,
        alt_text: Option<&str>,
    ) -> Result<Media> {
        let name = Path::new(file_name);
        validate_media_file(name)?;

        let part = Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(media_mime_type(name))
            .map_err(transport_error)?;
        let mut form = Form::new().part("file", part);
        if let Some(alt_text) = alt_text {
            form = form.text("alt_text", alt_text.to_string());
        }

        self.send_json(self.request(Method::POST, "/media/upload").multipart(form))
            .await
    }

    /// List uploaded media, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn list_media(&self, query: &MediaQuery) -> Result<Vec<Media>> {
        self.get_with("/media", query).await
    }

    /// Get one media file's metadata
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown ID.
    pub async fn get_media(&self, id: MediaId) -> Result<Media> {
        self.get(&format!("/media/{id}")).await
    }

    /// Update alt text or carousel position
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_media(&self, id: MediaId, update: &MediaUpdate) -> Result<Media> {
        self.put(&format!("/media/{id}"), update).await
    }

    /// Delete a media file
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_media(&self, id: MediaId) -> Result<ActionResponse> {
        self.delete(&format!("/media/{id}")).await
    }
}

//! HTTP implementation of [`GalleryApi`] on top of `reqwest`.
//!
//! reqwest only accepts absolute URLs. On `wasm32` an empty `base_url` is
//! replaced by the page origin when the client is built; natively it is
//! rejected.

use std::collections::HashMap;

use reqwest::{Client, Response, StatusCode};

use super::{BatchRequest, CleanupRequest, DeleteRequest, GalleryApi, TagLinkRequest};
use crate::config::{Endpoints, GalleryConfig};
use crate::error::{GalleryError, GalleryResult};
use crate::tags::TagData;

/// Talks to the gallery routes of a running server.
#[derive(Debug, Clone)]
pub struct HttpGalleryApi {
    client: Client,
    base_url: String,
    endpoints: Endpoints,
}

impl HttpGalleryApi {
    /// Create a client for the server described by `config`.
    pub fn new(config: &GalleryConfig) -> GalleryResult<Self> {
        let base_url = resolve_base_url(&config.base_url)?;
        let client = Client::builder().build()?;
        log::debug!("Gallery backend at {}", base_url);
        Ok(Self {
            client,
            base_url,
            endpoints: config.endpoints.clone(),
        })
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    fn check(response: Response, route: &str) -> GalleryResult<Response> {
        check_status(response.status(), route)?;
        Ok(response)
    }
}

/// Absolute origin every route is appended to, without a trailing slash.
fn resolve_base_url(configured: &str) -> GalleryResult<String> {
    let trimmed = configured.trim().trim_end_matches('/');
    if !trimmed.is_empty() {
        return Ok(trimmed.to_string());
    }
    page_origin()
}

#[cfg(target_arch = "wasm32")]
fn page_origin() -> GalleryResult<String> {
    let origin = web_sys::window()
        .and_then(|window| window.location().origin().ok())
        .ok_or(GalleryError::MissingBaseUrl)?;
    let origin = origin.trim_end_matches('/');
    // Opaque origins (file://, sandboxed frames) serialize as "null"
    if origin.is_empty() || origin == "null" {
        return Err(GalleryError::MissingBaseUrl);
    }
    Ok(origin.to_string())
}

#[cfg(not(target_arch = "wasm32"))]
fn page_origin() -> GalleryResult<String> {
    Err(GalleryError::MissingBaseUrl)
}

/// Turn non-success statuses into errors.
fn check_status(status: StatusCode, route: &str) -> GalleryResult<()> {
    if status.is_success() {
        Ok(())
    } else {
        log::warn!("{} answered {}", route, status);
        Err(GalleryError::status(route, status.as_u16()))
    }
}

/// Whether a single-thumbnail response carries an image. A 404 only means
/// the server has no thumbnail for that key.
fn thumbnail_status(status: StatusCode, route: &str) -> GalleryResult<bool> {
    if status == StatusCode::NOT_FOUND {
        return Ok(false);
    }
    check_status(status, route)?;
    Ok(true)
}

impl GalleryApi for HttpGalleryApi {
    async fn fetch_thumbnails_batch(
        &self,
        filenames: &[String],
    ) -> GalleryResult<HashMap<String, String>> {
        let route = &self.endpoints.thumbnails_batch;
        let body = BatchRequest {
            filenames: filenames.iter().map(String::as_str).collect(),
        };
        let response = self.client.post(self.url(route)).json(&body).send().await?;
        let map = Self::check(response, route)?
            .json::<HashMap<String, String>>()
            .await?;
        Ok(map)
    }

    async fn fetch_thumbnail(&self, key: &str) -> GalleryResult<Option<Vec<u8>>> {
        let route = &self.endpoints.thumbnail;
        let url = format!("{}/{}", self.url(route), urlencoding::encode(key));
        let response = self.client.get(url).send().await?;
        if !thumbnail_status(response.status(), route)? {
            return Ok(None);
        }
        let bytes = response.bytes().await?;
        Ok(Some(bytes.to_vec()))
    }

    async fn check_service(&self) -> bool {
        let route = &self.endpoints.service_check;
        match self.client.get(self.url(route)).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                log::error!("Thumbnail service unreachable: {}", e);
                false
            }
        }
    }

    async fn cleanup_thumbnails(&self, active_files: &[String]) -> GalleryResult<String> {
        let route = &self.endpoints.cleanup;
        let body = CleanupRequest {
            active_files: active_files.iter().map(String::as_str).collect(),
        };
        let response = self.client.post(self.url(route)).json(&body).send().await?;
        Ok(Self::check(response, route)?.text().await?)
    }

    async fn delete_file(&self, filename: &str) -> GalleryResult<()> {
        let route = &self.endpoints.delete_file;
        let response = self
            .client
            .post(self.url(route))
            .json(&DeleteRequest { filename })
            .send()
            .await?;
        Self::check(response, route)?;
        Ok(())
    }

    async fn load_tags(&self) -> GalleryResult<TagData> {
        let route = &self.endpoints.tags;
        let response = self.client.get(self.url(route)).send().await?;
        Ok(Self::check(response, route)?.json::<TagData>().await?)
    }

    async fn save_tags(&self, data: &TagData) -> GalleryResult<()> {
        let route = &self.endpoints.tags_save;
        let response = self.client.post(self.url(route)).json(data).send().await?;
        Self::check(response, route)?;
        Ok(())
    }

    async fn add_image_tag(&self, filename: &str, tag: &str) -> GalleryResult<()> {
        let route = &self.endpoints.tag_add_image;
        let response = self
            .client
            .post(self.url(route))
            .json(&TagLinkRequest { filename, tag })
            .send()
            .await?;
        Self::check(response, route)?;
        Ok(())
    }

    async fn remove_image_tag(&self, filename: &str, tag: &str) -> GalleryResult<()> {
        let route = &self.endpoints.tag_remove_image;
        let response = self
            .client
            .post(self.url(route))
            .json(&TagLinkRequest { filename, tag })
            .send()
            .await?;
        Self::check(response, route)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_use_configured_routes() {
        let mut config = GalleryConfig::new().with_base_url("http://127.0.0.1:8188/");
        config.endpoints.delete_file = "/custom/delete".to_string();

        let api = HttpGalleryApi::new(&config).unwrap();
        assert_eq!(
            api.url(&api.endpoints.delete_file),
            "http://127.0.0.1:8188/custom/delete"
        );
        assert_eq!(
            api.url(&api.endpoints.thumbnails_batch),
            "http://127.0.0.1:8188/get_thumbnails_batch"
        );
    }

    #[test]
    fn test_base_url_resolution() {
        assert_eq!(
            resolve_base_url("http://127.0.0.1:8188").unwrap(),
            "http://127.0.0.1:8188"
        );
        assert_eq!(
            resolve_base_url(" http://localhost:8188// ").unwrap(),
            "http://localhost:8188"
        );
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_default_config_needs_base_url() {
        let result = HttpGalleryApi::new(&GalleryConfig::default());
        assert!(matches!(result, Err(GalleryError::MissingBaseUrl)));
        assert!(matches!(
            resolve_base_url(" / "),
            Err(GalleryError::MissingBaseUrl)
        ));

        let config = GalleryConfig::new().with_base_url("http://host:1/");
        let api = HttpGalleryApi::new(&config).unwrap();
        assert_eq!(api.url("/view"), "http://host:1/view");
    }

    #[test]
    fn test_status_mapping() {
        assert!(check_status(StatusCode::OK, "/delete_file").is_ok());
        assert!(check_status(StatusCode::NO_CONTENT, "/delete_file").is_ok());
        match check_status(StatusCode::INTERNAL_SERVER_ERROR, "/delete_file") {
            Err(GalleryError::Status { endpoint, status }) => {
                assert_eq!(endpoint, "/delete_file");
                assert_eq!(status, 500);
            }
            other => panic!("expected status error, got {:?}", other),
        }
        // Only the single-thumbnail route treats 404 as "no image"
        assert!(matches!(
            check_status(StatusCode::NOT_FOUND, "/delete_file"),
            Err(GalleryError::Status { status: 404, .. })
        ));
    }

    #[test]
    fn test_thumbnail_status_mapping() {
        assert!(thumbnail_status(StatusCode::OK, "/get_thumbnail").unwrap());
        assert!(!thumbnail_status(StatusCode::NOT_FOUND, "/get_thumbnail").unwrap());
        assert!(matches!(
            thumbnail_status(StatusCode::BAD_GATEWAY, "/get_thumbnail"),
            Err(GalleryError::Status { status: 502, .. })
        ));
    }
}

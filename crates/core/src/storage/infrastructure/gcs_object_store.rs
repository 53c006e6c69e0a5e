use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use thiserror::Error;

use crate::auth::domain::token_provider::TokenProvider;
use crate::shared::constants::DEFAULT_STORAGE_BASE_URL;
use crate::storage::domain::object_store::ObjectStore;
use crate::BoxError;

#[derive(Error, Debug)]
pub enum GcsError {
    #[error("invalid storage base URL '{url}'")]
    BaseUrl { url: String },
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Object store backed by the Cloud Storage JSON API.
pub struct GcsObjectStore {
    base_url: Url,
    http: Client,
    tokens: Box<dyn TokenProvider>,
}

impl GcsObjectStore {
    pub fn new(tokens: Box<dyn TokenProvider>) -> Result<Self, GcsError> {
        Self::with_base_url(DEFAULT_STORAGE_BASE_URL, tokens)
    }

    /// Point the store at another endpoint, e.g. a local emulator.
    pub fn with_base_url(base_url: &str, tokens: Box<dyn TokenProvider>) -> Result<Self, GcsError> {
        let parsed = Url::parse(base_url)
            .ok()
            .filter(|u| !u.cannot_be_a_base())
            .ok_or_else(|| GcsError::BaseUrl {
                url: base_url.to_string(),
            })?;
        Ok(Self {
            base_url: parsed,
            http: Client::new(),
            tokens,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn bucket_url(&self, bucket: &str) -> Url {
        self.endpoint(&["storage", "v1", "b", bucket])
    }

    fn object_url(&self, bucket: &str, object: &str) -> Url {
        self.endpoint(&["storage", "v1", "b", bucket, "o", object])
    }

    fn media_url(&self, bucket: &str, object: &str) -> Url {
        let mut url = self.object_url(bucket, object);
        url.query_pairs_mut().append_pair("alt", "media");
        url
    }

    fn upload_url(&self, bucket: &str, object: &str) -> Url {
        let mut url = self.endpoint(&["upload", "storage", "v1", "b", bucket, "o"]);
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", object);
        url
    }

    fn send(
        &self,
        method: &'static str,
        request: RequestBuilder,
        url: &Url,
    ) -> Result<Response, BoxError> {
        let token = self.tokens.access_token()?;
        log::debug!("{method} {url}");
        let response = request
            .bearer_auth(token)
            .send()
            .map_err(|e| GcsError::Request {
                url: url.to_string(),
                source: e,
            })?;
        Ok(response)
    }

    fn exists(&self, url: Url) -> Result<bool, BoxError> {
        let response = self.send("GET", self.http.get(url.clone()), &url)?;
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(status_error("GET", &url, response).into()),
        }
    }
}

fn status_error(method: &'static str, url: &Url, response: Response) -> GcsError {
    GcsError::Status {
        method,
        url: url.to_string(),
        status: response.status().as_u16(),
        body: response.text().unwrap_or_default(),
    }
}

impl ObjectStore for GcsObjectStore {
    fn bucket_exists(&self, bucket: &str) -> Result<bool, BoxError> {
        self.exists(self.bucket_url(bucket))
    }

    fn object_exists(&self, bucket: &str, object: &str) -> Result<bool, BoxError> {
        self.exists(self.object_url(bucket, object))
    }

    fn download_to_file(&self, bucket: &str, object: &str, dest: &Path) -> Result<(), BoxError> {
        let url = self.media_url(bucket, object);
        let mut response = self.send("GET", self.http.get(url.clone()), &url)?;
        if !response.status().is_success() {
            return Err(status_error("GET", &url, response).into());
        }

        let write_err = |e| GcsError::Write {
            path: dest.to_path_buf(),
            source: e,
        };
        let mut file = File::create(dest).map_err(write_err)?;
        let bytes = response.copy_to(&mut file).map_err(|e| GcsError::Request {
            url: url.to_string(),
            source: e,
        })?;
        file.flush().map_err(write_err)?;

        log::debug!("Downloaded {bytes} bytes to {}", dest.display());
        Ok(())
    }

    fn upload(&self, bucket: &str, object: &str, content: &str) -> Result<(), BoxError> {
        let url = self.upload_url(bucket, object);
        let request = self
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(content.to_string());
        let response = self.send("POST", request, &url)?;
        if !response.status().is_success() {
            return Err(status_error("POST", &url, response).into());
        }
        Ok(())
    }
}

use reqwest::Client;
use std::path::{Path, PathBuf};
use url::Url;

use super::normalize::LookupResponse;
use crate::error::ClientResult;
use crate::models::Certificate;

const LOOKUP_PATH: &str = "api/certificates";

/// Result of a design download. A failed fetch falls back to the link
/// itself so the user can still open it.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadOutcome {
    Saved(PathBuf),
    Fallback { url: String, reason: String },
}

/// HTTP client for the registry lookup endpoint / 查询客户端
#[derive(Clone)]
pub struct RegistryClient {
    inner: Client,
    base_url: Url,
}

impl RegistryClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let mut base_url = Url::parse(base_url)?;
        // Url::join drops the last segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let inner = Client::builder()
            .user_agent(concat!("certreg-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { inner, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn lookup(&self, params: &[(&str, &str)]) -> ClientResult<LookupResponse> {
        let url = self.base_url.join(LOOKUP_PATH)?;
        tracing::debug!("GET {} {:?}", url, params);

        let response = self.inner.get(url).query(params).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        LookupResponse::from_body(status, &body)
    }

    /// Free-text search across all searchable fields
    pub async fn search(&self, term: &str) -> ClientResult<LookupResponse> {
        self.lookup(&[("search", term)]).await
    }

    pub async fn by_id(&self, id: &str) -> ClientResult<LookupResponse> {
        self.lookup(&[("id", id)]).await
    }

    pub async fn by_certificate_number(&self, number: &str) -> ClientResult<LookupResponse> {
        self.lookup(&[("certificateNumber", number)]).await
    }

    /// Save a certificate's design asset into `dir`
    pub async fn download_design(&self, certificate: &Certificate, dir: &Path) -> DownloadOutcome {
        let url = certificate.design_url.trim();
        if url.is_empty() {
            return DownloadOutcome::Fallback {
                url: String::new(),
                reason: "certificate has no design link".to_string(),
            };
        }

        match self.fetch_to_file(url, &dir.join(design_file_name(certificate))).await {
            Ok(path) => {
                tracing::info!("Saved design for {} to {:?}", certificate.certificate_number, path);
                DownloadOutcome::Saved(path)
            }
            Err(e) => {
                tracing::warn!("Design download for {} failed: {}", certificate.certificate_number, e);
                DownloadOutcome::Fallback {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn fetch_to_file(&self, url: &str, path: &Path) -> ClientResult<PathBuf> {
        let url = Url::parse(url)?;
        let bytes = self.inner.get(url).send().await?.error_for_status()?.bytes().await?;
        tokio::fs::write(path, &bytes).await?;
        Ok(path.to_path_buf())
    }
}

/// `<certificate number>-<last url segment>`, with anything outside
/// `[A-Za-z0-9._-]` replaced by `_`
pub fn design_file_name(certificate: &Certificate) -> String {
    let segment = Url::parse(&certificate.design_url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "design".to_string());

    format!("{}-{}", certificate.certificate_number, segment)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect()
}

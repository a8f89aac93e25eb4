//! Quota API client
//!
//! `GET {base}/guest/quota` with the fingerprint header. The response body
//! is the camelCase [`GuestQuotaInfo`] JSON.

use http::header::{HeaderMap, HeaderName};
use http::StatusCode;
use kernel::error::app_error::AppError;

use crate::application::config::GuestConfig;
use crate::domain::entities::GuestQuotaInfo;
use crate::domain::repository::QuotaSource;
use crate::domain::value_objects::DeviceFingerprint;
use crate::error::{GuestError, GuestResult};
use crate::presentation::header::{header_name, insert_fingerprint};

/// HTTP-backed quota source
#[derive(Debug, Clone)]
pub struct HttpQuotaSource {
    client: reqwest::Client,
    endpoint: String,
    header: HeaderName,
}

impl HttpQuotaSource {
    pub fn new(config: &GuestConfig) -> GuestResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: config.quota_endpoint(),
            header: header_name(&config.fingerprint_header)?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl QuotaSource for HttpQuotaSource {
    async fn fetch(&self, fingerprint: &DeviceFingerprint) -> GuestResult<GuestQuotaInfo> {
        let mut headers = HeaderMap::new();
        insert_fingerprint(&mut headers, &self.header, fingerprint)?;

        let response = self
            .client
            .get(&self.endpoint)
            .headers(headers)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GuestError::QuotaExceeded);
        }
        if !status.is_success() {
            let message = format!("quota request failed with status {status}");
            return Err(GuestError::Api(AppError::from_status(status.as_u16(), message)));
        }

        let body = response.text().await?;
        let info: GuestQuotaInfo = serde_json::from_str(&body)?;
        tracing::debug!(endpoint = %self.endpoint, "Fetched guest quota");
        Ok(info)
    }
}

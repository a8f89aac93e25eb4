//! Load Quota Use Case

use std::sync::Arc;

use crate::domain::entities::{GuestQuotaInfo, QuotaState};
use crate::domain::repository::QuotaSource;
use crate::domain::services::derive_quota_state;
use crate::domain::value_objects::DeviceFingerprint;

/// Load Quota Use Case
///
/// A failed fetch is treated as "not loaded yet", so the UI keeps
/// rendering the default figures.
pub struct LoadQuotaUseCase<Q>
where
    Q: QuotaSource,
{
    source: Arc<Q>,
}

impl<Q> LoadQuotaUseCase<Q>
where
    Q: QuotaSource,
{
    pub fn new(source: Arc<Q>) -> Self {
        Self { source }
    }

    /// Fetch the counters, `None` when they could not be loaded
    pub async fn fetch(&self, fingerprint: &DeviceFingerprint) -> Option<GuestQuotaInfo> {
        match self.source.fetch(fingerprint).await {
            Ok(info) => {
                tracing::debug!(
                    daily_count = info.daily_count,
                    daily_limit = info.daily_limit,
                    pdf_downloads = info.pdf_downloads,
                    pdf_limit = info.pdf_limit,
                    "Loaded guest quota"
                );
                Some(info)
            }
            Err(e) => {
                e.log();
                None
            }
        }
    }

    /// Fetch and derive the remaining quota
    pub async fn execute(&self, fingerprint: &DeviceFingerprint) -> QuotaState {
        let info = self.fetch(fingerprint).await;
        derive_quota_state(info.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GuestError, GuestResult};
    use kernel::error::app_error::AppError;
    use std::sync::Mutex;

    /// In-memory quota source recording the fingerprints it was asked about
    struct StubQuotaSource {
        response: Mutex<Option<GuestResult<GuestQuotaInfo>>>,
        seen: Mutex<Vec<String>>,
    }

    impl StubQuotaSource {
        fn new(response: GuestResult<GuestQuotaInfo>) -> Self {
            Self {
                response: Mutex::new(Some(response)),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl QuotaSource for StubQuotaSource {
        async fn fetch(&self, fingerprint: &DeviceFingerprint) -> GuestResult<GuestQuotaInfo> {
            self.seen.lock().unwrap().push(fingerprint.to_string());
            self.response
                .lock()
                .unwrap()
                .take()
                .unwrap_or(Err(GuestError::Config("no response".into())))
        }
    }

    fn fingerprint() -> DeviceFingerprint {
        DeviceFingerprint::parse("fp_abc_123").unwrap()
    }

    #[tokio::test]
    async fn test_loaded_counters_are_derived() {
        let source = Arc::new(StubQuotaSource::new(Ok(GuestQuotaInfo {
            daily_count: 3,
            daily_limit: 3,
            pdf_downloads: 0,
            pdf_limit: 1,
        })));
        let use_case = LoadQuotaUseCase::new(source.clone());

        let state = use_case.execute(&fingerprint()).await;
        assert!(state.daily_exhausted);
        assert_eq!(state.pdf_remaining, 1);
        assert_eq!(source.seen.lock().unwrap().as_slice(), ["fp_abc_123"]);
    }

    #[tokio::test]
    async fn test_failed_fetch_falls_back_to_defaults() {
        let source = Arc::new(StubQuotaSource::new(Err(GuestError::Api(
            AppError::service_unavailable("down"),
        ))));
        let use_case = LoadQuotaUseCase::new(source);

        assert_eq!(use_case.fetch(&fingerprint()).await, None);
        let state = use_case.execute(&fingerprint()).await;
        assert_eq!(state.daily_remaining, 3);
        assert_eq!(state.pdf_remaining, 1);
    }
}

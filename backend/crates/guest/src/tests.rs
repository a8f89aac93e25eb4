//! Cross-module tests for the guest crate

#[cfg(test)]
mod fingerprint_tests {
    use crate::application::config::GuestConfig;
    use crate::application::fingerprint_cache::GetFingerprintUseCase;
    use crate::application::generate_fingerprint::FingerprintGenerator;
    use crate::domain::services::rolling_hash;
    use crate::domain::value_objects::DeviceFingerprint;
    use platform::client::{HostSignals, ScreenInfo};
    use platform::storage::{BlockedStorage, MemoryStorage, StorageFacade};
    use std::sync::Arc;

    fn signals() -> HostSignals {
        HostSignals::default()
            .with_screen(ScreenInfo::new(2560, 1440, 24))
            .with_language("fr-FR")
            .with_user_agent("Mozilla/5.0 AppleWebKit/605.1.15 Version/17.2 Safari/605.1.15")
    }

    fn use_case(storage: &StorageFacade) -> GetFingerprintUseCase<HostSignals> {
        let config = Arc::new(GuestConfig::default());
        GetFingerprintUseCase::new(
            FingerprintGenerator::new(Arc::new(signals()), &config),
            storage.session().clone(),
            config,
        )
    }

    #[test]
    fn test_token_format() {
        let storage = StorageFacade::in_memory();
        let fingerprint = tokio_test::block_on(use_case(&storage).execute());

        let token = fingerprint.as_str();
        assert!(token.starts_with("fp_"));
        let (hash, timestamp) = token["fp_".len()..].split_once('_').unwrap();
        assert!(
            hash.chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
        assert!(
            timestamp
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[test]
    fn test_hash_depends_only_on_signals() {
        let config = GuestConfig::default();
        let generator = FingerprintGenerator::new(Arc::new(signals()), &config);
        let joined = generator.collect_signals().join("|");

        let fp = generator.generate_at(1_700_000_000_000);
        assert_eq!(
            fp,
            DeviceFingerprint::from_parts(rolling_hash(&joined).unsigned_abs(), 1_700_000_000_000)
        );
        assert_eq!(fp.timestamp_token(), "loyw3v28");
        assert_eq!(fp.hash_token(), generator.generate_at(0).hash_token());
    }

    #[tokio::test]
    async fn test_session_blocked_but_persistent_fine() {
        let storage = StorageFacade::new(
            Arc::new(BlockedStorage::new("session storage disabled")),
            Arc::new(MemoryStorage::new()),
        );
        let use_case = use_case(&storage);

        let first = use_case.execute().await;
        let second = use_case.execute().await;

        // Without a session cache only the environment hash is stable
        assert_eq!(first.hash_token(), second.hash_token());
        assert_eq!(storage.persistent().read("guest_fingerprint"), None);
    }

    #[tokio::test]
    async fn test_independent_sessions_share_hash() {
        let a = StorageFacade::in_memory();
        let b = StorageFacade::in_memory();

        let fa = use_case(&a).execute().await;
        let fb = use_case(&b).execute().await;

        assert_eq!(fa.hash_token(), fb.hash_token());
    }
}

#[cfg(test)]
mod quota_api_tests {
    use crate::application::config::GuestConfig;
    use crate::application::load_quota::LoadQuotaUseCase;
    use crate::domain::repository::QuotaSource;
    use crate::domain::value_objects::DeviceFingerprint;
    use crate::error::GuestError;
    use crate::infra::quota_api::HttpQuotaSource;
    use crate::presentation::header::FINGERPRINT_HEADER;
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use kernel::error::kind::ErrorKind;
    use std::sync::Arc;

    /// Serves `/api/guest/quota` on an ephemeral port and returns the base URL
    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    fn source(base_url: String) -> HttpQuotaSource {
        HttpQuotaSource::new(&GuestConfig {
            api_base_url: base_url,
            ..GuestConfig::default()
        })
        .unwrap()
    }

    fn fingerprint() -> DeviceFingerprint {
        DeviceFingerprint::parse("fp_1x2y_loyw3v28").unwrap()
    }

    async fn quota_handler(headers: HeaderMap) -> (StatusCode, String) {
        match headers.get(FINGERPRINT_HEADER).and_then(|v| v.to_str().ok()) {
            Some("fp_1x2y_loyw3v28") => (
                StatusCode::OK,
                r#"{"dailyCount":3,"dailyLimit":3,"pdfDownloads":0,"pdfLimit":1}"#.to_string(),
            ),
            _ => (StatusCode::BAD_REQUEST, "missing fingerprint".to_string()),
        }
    }

    #[tokio::test]
    async fn test_fetch_sends_header_and_decodes() {
        let app = Router::new().route("/api/guest/quota", get(quota_handler));
        let source = source(spawn_server(app).await);

        let info = source.fetch(&fingerprint()).await.unwrap();
        assert_eq!(info.daily_count, 3);
        assert_eq!(info.pdf_limit, 1);

        let state = LoadQuotaUseCase::new(Arc::new(source))
            .execute(&fingerprint())
            .await;
        assert!(state.daily_exhausted);
        assert!(!state.pdf_exhausted);
    }

    #[tokio::test]
    async fn test_missing_limits_use_defaults() {
        let app = Router::new().route(
            "/api/guest/quota",
            get(|| async { r#"{"dailyCount":1}"# }),
        );
        let info = source(spawn_server(app).await)
            .fetch(&fingerprint())
            .await
            .unwrap();

        assert_eq!(info.daily_limit, 3);
        assert_eq!(info.pdf_limit, 1);
    }

    #[tokio::test]
    async fn test_error_statuses_are_classified() {
        let app = Router::new()
            .route(
                "/limited/guest/quota",
                get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
            )
            .route(
                "/down/guest/quota",
                get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
            )
            .route("/garbled/guest/quota", get(|| async { "{not json" }));
        let base = spawn_server(app).await;
        let root = base.trim_end_matches("/api");

        let err = source(format!("{root}/limited"))
            .fetch(&fingerprint())
            .await
            .unwrap_err();
        assert!(matches!(err, GuestError::QuotaExceeded));

        let err = source(format!("{root}/down"))
            .fetch(&fingerprint())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);

        let err = source(format!("{root}/garbled"))
            .fetch(&fingerprint())
            .await
            .unwrap_err();
        assert!(matches!(err, GuestError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_degrades_to_defaults() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = source(format!("http://{addr}/api"))
            .fetch(&fingerprint())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);

        let use_case = LoadQuotaUseCase::new(Arc::new(source(format!("http://{addr}/api"))));
        assert_eq!(use_case.fetch(&fingerprint()).await, None);

        let state = use_case.execute(&fingerprint()).await;
        assert_eq!(state.daily_remaining, 3);
        assert_eq!(state.pdf_remaining, 1);
    }
}

#[cfg(test)]
mod banner_flow_tests {
    use crate::application::countdown::CountdownPresenter;
    use crate::domain::clock::{Clock, FixedClock};
    use crate::domain::entities::GuestQuotaInfo;
    use crate::domain::services::{derive_quota_state, next_daily_reset};
    use crate::presentation::banner::{BannerStatus, GuestBanner};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_lockout_banner_counts_down_to_reset() {
        let clock = Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2024, 3, 9, 23, 58, 30).unwrap(),
        ));
        let state = derive_quota_state(Some(&GuestQuotaInfo {
            daily_count: 5,
            ..GuestQuotaInfo::default()
        }));
        assert_eq!(state.daily_remaining, 0);

        let mut presenter = CountdownPresenter::new(clock.clone(), Duration::from_secs(1));
        presenter.activate(next_daily_reset(clock.now()), None);

        let banner = GuestBanner::build(&state, Some(&presenter.current()));
        assert_eq!(banner.status, BannerStatus::DailyLimitReached);
        assert_eq!(banner.detail.as_deref(), Some("Resets in 01:30"));

        tokio::time::sleep(Duration::from_secs(91)).await;
        let banner = GuestBanner::build(&state, Some(&presenter.current()));
        assert_eq!(banner.detail.as_deref(), Some("Available now"));
    }
}

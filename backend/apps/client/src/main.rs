//! Guest Client Entry Point
//!
//! Resolves the guest identity, loads the guest quota and renders the
//! banner. While locked out, counts down to the daily reset.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::env;
use std::sync::Arc;

use guest::domain::clock::{Clock, SystemClock};
use guest::domain::services::next_daily_reset;
use guest::{
    CountdownPresenter, FingerprintGenerator, GetFingerprintUseCase, GuestBanner, GuestConfig,
    HttpQuotaSource, LoadQuotaUseCase, Preferences, derive_quota_state,
};
use kernel::error::app_error::AppError;
use platform::client::{HostSignals, ScreenInfo};
use platform::storage::{FileStorage, MemoryStorage, StorageFacade};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "client=info,guest=info,platform=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(GuestConfig::from_env()?);

    // Session scope lives for this process only
    let storage = StorageFacade::new(
        Arc::new(MemoryStorage::new()),
        Arc::new(FileStorage::new(&config.preferences_path)),
    );

    let preferences = Preferences::load(storage.persistent(), &config.preferences_storage_key);
    if !preferences.save(storage.persistent(), &config.preferences_storage_key) {
        tracing::warn!(
            path = %config.preferences_path.display(),
            "Preferences will not persist across runs"
        );
    }

    let mut signals = HostSignals::detect();
    if let Some(screen) = env::var("GUEST_SCREEN")
        .ok()
        .and_then(|s| ScreenInfo::parse(&s))
    {
        signals = signals.with_screen(screen);
    }

    let fingerprint = GetFingerprintUseCase::new(
        FingerprintGenerator::new(Arc::new(signals), &config),
        storage.session().clone(),
        config.clone(),
    )
    .execute()
    .await;

    tracing::info!(
        fingerprint = %fingerprint,
        locale = %preferences.locale,
        currency = %preferences.currency,
        "Resolved guest identity"
    );

    let state = match HttpQuotaSource::new(&config) {
        Ok(source) => {
            LoadQuotaUseCase::new(Arc::new(source))
                .execute(&fingerprint)
                .await
        }
        Err(e) => {
            let err = AppError::from(e);
            tracing::warn!(
                error = %err,
                status = err.status_code(),
                "Quota API unavailable, using default limits"
            );
            derive_quota_state(None)
        }
    };

    let banner = GuestBanner::build(&state, None);
    println!("{}", banner.headline);
    if !banner.is_locked_out() {
        return Ok(());
    }
    println!("{}", banner.call_to_action);

    let clock = Arc::new(SystemClock);
    let reset = next_daily_reset(clock.now());
    let mut presenter = CountdownPresenter::new(clock, config.countdown_tick);
    let mut views = presenter.subscribe();
    presenter.activate(
        reset,
        Some(Box::new(|| tracing::info!("Guest quota has reset"))),
    );

    loop {
        let view = *views.borrow_and_update();
        let banner = GuestBanner::build(&state, Some(&view));
        if let Some(detail) = &banner.detail {
            println!("{detail}");
        }
        if view.is_complete() {
            break;
        }

        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Countdown interrupted");
                break;
            }
        }
    }

    presenter.deactivate();
    Ok(())
}

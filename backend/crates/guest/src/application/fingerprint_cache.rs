//! Get Fingerprint Use Case
//!
//! Returns the session's cached fingerprint, generating and caching one on
//! first use. When session storage is unavailable every call generates a
//! fresh token; callers needing stability across a request sequence must
//! hold on to the value themselves.

use std::sync::Arc;

use platform::client::SignalSource;
use platform::storage::ResilientStorage;

use crate::application::config::GuestConfig;
use crate::application::generate_fingerprint::FingerprintGenerator;
use crate::domain::value_objects::DeviceFingerprint;

/// Get Fingerprint Use Case
pub struct GetFingerprintUseCase<S>
where
    S: SignalSource,
{
    generator: FingerprintGenerator<S>,
    session: ResilientStorage,
    config: Arc<GuestConfig>,
}

impl<S> GetFingerprintUseCase<S>
where
    S: SignalSource,
{
    pub fn new(
        generator: FingerprintGenerator<S>,
        session: ResilientStorage,
        config: Arc<GuestConfig>,
    ) -> Self {
        Self {
            generator,
            session,
            config,
        }
    }

    pub async fn execute(&self) -> DeviceFingerprint {
        let key = &self.config.fingerprint_storage_key;

        // Only well-formed tokens are reused; anything else is regenerated
        if let Some(stored) = self.session.read(key).filter(|v| !v.is_empty()) {
            match DeviceFingerprint::parse(&stored) {
                Ok(fingerprint) => return fingerprint,
                Err(e) => tracing::debug!(error = %e, "Discarding malformed cached fingerprint"),
            }
        }

        let fingerprint = self.generator.generate();
        // Best effort: a failed write is already logged by the facade
        if self.session.write(key, fingerprint.as_str()).is_some() {
            tracing::debug!(fingerprint = %fingerprint, "Cached new device fingerprint");
        }
        fingerprint
    }
}

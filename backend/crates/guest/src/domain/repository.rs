//! Repository Traits
//!
//! Interfaces for external collaborators. Implementations are in the
//! infrastructure layer.

use crate::domain::entities::GuestQuotaInfo;
use crate::domain::value_objects::DeviceFingerprint;
use crate::error::GuestResult;

/// Source of server-side guest quota counters
#[trait_variant::make(QuotaSource: Send)]
pub trait LocalQuotaSource {
    /// Fetch the usage counters keyed by the given fingerprint
    async fn fetch(&self, fingerprint: &DeviceFingerprint) -> GuestResult<GuestQuotaInfo>;
}

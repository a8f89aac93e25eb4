//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (GuestQuotaInfo, QuotaState, CountdownView)
//! - Domain value objects (DeviceFingerprint, BrowserFamily)
//! - Domain services (rolling hash, quota derivation, countdown math)
//! - Repository traits (quota source, clock)

pub mod clock;
pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;

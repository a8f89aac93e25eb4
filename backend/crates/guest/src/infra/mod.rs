//! Infrastructure Layer - External service clients

pub mod quota_api;

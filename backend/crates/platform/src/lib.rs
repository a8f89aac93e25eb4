//! Platform Crate - Technical Infrastructure
//!
//! This crate provides the host-facing foundations the guest client runs on:
//! - Encoding utilities (Base64, Base36, Adler-32)
//! - Fail-soft key/value storage with session and persistent scopes
//! - Environment signal access (screen, locale, user agent, ...)
//! - An offscreen software raster surface

pub mod canvas;
pub mod client;
pub mod encoding;
pub mod storage;

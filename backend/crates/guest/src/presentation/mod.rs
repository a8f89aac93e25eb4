//! Presentation Layer - Identity header and guest UI view models

pub mod banner;
pub mod header;

//! Core types and trait definitions for the GroupEats review platform.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod feed;
pub mod format;
pub mod geo;
pub mod place;
pub mod profile;
pub mod review;
pub mod store;
pub mod validate;

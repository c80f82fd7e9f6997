//! media-converter - declarative ffmpeg conversions
//!
//! This library crate exposes configuration loading for the binary and
//! integration tests.

pub mod config;

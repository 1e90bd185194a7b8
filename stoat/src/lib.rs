//! Stoat property-based testing library.
//!
//! This is the main entry point for the Stoat library, providing
//! a convenient API for property-based testing in Rust.

pub use stoat_core::*;

//! Core functionality for Stoat property-based testing.
//!
//! This crate provides the fundamental building blocks for property-based
//! testing with Stoat: lazy shrink trees, generator combinators, and the
//! counterexample search engine.

pub mod data;
pub mod gen;
pub mod lazy;
pub mod property;
pub mod report;
pub mod shrink;
pub mod tree;

// Re-export the main types
pub use data::*;
pub use gen::*;
pub use lazy::*;
pub use property::*;
pub use report::*;
pub use shrink::*;
pub use tree::*;

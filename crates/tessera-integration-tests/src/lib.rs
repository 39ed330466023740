//! Integration test crate for the Tessera commission and lottery engine.
//!
//! This crate has no library code — it only contains integration tests
//! that exercise end-to-end flows across multiple workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p tessera-integration-tests
//! ```

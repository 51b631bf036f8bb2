//! # Snapshot Testing Support
//!
//! Helpers for asserting on compiled documents.
//!
//! - **`render`**: a stable, indented text listing of a document, used with
//!   `insta` inline snapshots
//! - **`invariants`**: interval checks every compiled document must pass
//!   (blocks in bounds, sorted, no overlap within an exclusive category)

pub mod invariants;
pub mod render;

pub use invariants::check as check_invariants;
pub use render::render;

//! Core domain logic for coldkey balance and stake history.
//!
//! This crate provides:
//! - Core domain types and unit conversion (`types` module)
//! - Block height and timestamp arithmetic for sampling (`sampling` module)
//! - Daily series aggregation (`aggregate` module)
//! - Display helpers for charts and logs (`display` module)
//!
//! Nothing in here performs I/O.

pub mod aggregate;
pub mod display;
pub mod sampling;
pub mod types;

pub use aggregate::*;
pub use display::*;
pub use sampling::*;
pub use types::*;

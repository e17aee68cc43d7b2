//! # Domain Models
//!
//! Pure configuration models and constants shared by every crate in the workspace.
//! Keep it lean: `serde` only, no I/O or validation logic. Binding and schema
//! enforcement live in `myproduct-kernel`.

pub mod config;
pub mod constants;

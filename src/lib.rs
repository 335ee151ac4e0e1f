//
// lib.rs
// Dicom-Viewer-rs
//
// Exposes the crate's modules and re-exports the CLI entry point for both binary and library consumers.
//
// Thales Matheus Mendonça Santos - February 2026

// Public surface of the library: each module mirrors a CLI verb or shared utility.
pub mod cli;
pub mod dicom_access;
pub mod error;
pub mod export;
pub mod metadata;
pub mod models;
pub mod pixels;
pub mod render;
pub mod session;
pub mod stats;
pub mod windowing;

pub use cli::{run as run_cli, Cli, Commands};
pub use error::ViewerError;
pub use windowing::WindowParams;

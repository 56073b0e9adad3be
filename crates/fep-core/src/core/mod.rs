//! # Core Module
//!
//! Stateless building blocks for free-energy perturbation input preparation.
//!
//! - **Models** ([`models`]) - lambda ranges, windows, schedules and process assignments
//! - **File I/O** ([`io`]) - directive documents, result streams and file naming
//! - **Numerics** ([`utils`]) - the lambda comparison tolerance and formatting
//!
//! Nothing here holds global state; every value is built explicitly and passed
//! down to the [`crate::engine`] layer.

pub mod io;
pub mod models;
pub mod utils;

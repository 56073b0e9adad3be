//! # fepforge Core Library
//!
//! Input preparation and result merging for bidirectional free-energy
//! perturbation (FEP) runs with NAMD.
//!
//! The alchemical coordinate lambda is cut into stratified windows, the
//! windows are handed out to a fixed number of independent NAMD processes,
//! and each process gets a forward and a mirrored backward configuration.
//! After the runs finish, the per-process `.fepout` streams are stitched
//! back together in lambda order.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Immutable data models (`LambdaRange`,
//!   `WindowSchedule`, `ProcessAssignment`), the lambda tolerance, and text I/O.
//!
//! - **[`engine`]: The Logic Core.** Pure scheduling: configuration
//!   validation, window partitioning, schedule generation and configuration
//!   assembly.
//!
//! - **[`workflows`]: The Public API.** `prepare` and `merge`, which read
//!   templates and result streams and write the generated files.

pub mod core;
pub mod engine;
pub mod workflows;

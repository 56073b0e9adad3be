//! # Workflows Module
//!
//! End-to-end entry points that tie the [`crate::engine`] scheduling logic to
//! the filesystem.
//!
//! - **Preparation** ([`prepare`]) - partition, plan, assemble and write every
//!   configuration plus the orchestration script
//! - **Merging** ([`merge`]) - reassemble per-process result streams into one
//!   ordered stream per direction
//!
//! Both workflows compute everything they need before writing, so a failure
//! never leaves a partial set of outputs behind.

pub mod merge;
pub mod prepare;

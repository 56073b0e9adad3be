//! # Engine Module
//!
//! The scheduling logic of the preparation workflow: validated run settings,
//! the lambda-window partitioner, the forward/backward schedule generator and
//! the configuration assembler that turns a schedule into NAMD directives.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - `RunConfig`, its builder and validation errors
//! - **Partitioning** ([`partition`]) - one contiguous lambda sub-range per process
//! - **Scheduling** ([`schedule`], [`plan`]) - window sequences and per-segment run control
//! - **Assembly** ([`assembler`], [`script`]) - configuration documents, command lines and the run script
//! - **Progress Monitoring** ([`progress`]) - optional progress callbacks
//! - **Error Handling** ([`error`]) - the umbrella `EngineError`
//!
//! Everything except error and progress plumbing is a pure function of its
//! inputs; file access lives in [`crate::workflows`].

pub mod assembler;
pub mod config;
pub mod error;
pub mod partition;
pub mod plan;
pub mod progress;
pub mod schedule;
pub mod script;

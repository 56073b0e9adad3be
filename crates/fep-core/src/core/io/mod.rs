//! Provides input/output functionality for the text files exchanged with NAMD.
//!
//! This module contains the directive-document model used for templates and
//! generated configurations, the `.fepout` result-stream reader, and the
//! index-qualified naming convention both sides agree on. A common trait
//! provides the path-based read/write helpers.

pub mod fepout;
pub mod namd;
pub mod naming;
pub mod traits;

//! # Core Models Module
//!
//! Plain data types describing how the alchemical coordinate is cut into
//! windows and handed out to worker processes.
//!
//! ## Key Components
//!
//! - [`lambda`] - `LambdaRange`, `Window` and the contiguous `WindowSchedule`
//! - [`assignment`] - `ProcessAssignment`, one worker's lambda sub-range and device
//! - [`direction`] - forward/backward traversal marker
//!
//! All types here are immutable values; nothing in this module performs I/O.

pub mod assignment;
pub mod direction;
pub mod lambda;

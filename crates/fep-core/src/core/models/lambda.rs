use crate::core::utils::numeric::{LAMBDA_TOLERANCE, is_close};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum LambdaError {
    #[error("Lambda bounds must be finite (got {from} -> {to})")]
    NonFinite { from: f64, to: f64 },
    #[error("Lambda range {from} -> {to} is empty (bounds equal within {tolerance})")]
    Empty { from: f64, to: f64, tolerance: f64 },
    #[error("Window size must be a positive finite number (got {0})")]
    InvalidWindowSize(f64),
}

/// A traversal of the alchemical coordinate from `from` to `to`.
///
/// The magnitude is `|to - from|`; the sign of `to - from` gives the direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LambdaRange {
    from: f64,
    to: f64,
}

impl LambdaRange {
    pub fn new(from: f64, to: f64) -> Result<Self, LambdaError> {
        if !from.is_finite() || !to.is_finite() {
            return Err(LambdaError::NonFinite { from, to });
        }
        if is_close(from, to) {
            return Err(LambdaError::Empty {
                from,
                to,
                tolerance: LAMBDA_TOLERANCE,
            });
        }
        Ok(Self { from, to })
    }

    #[inline]
    pub fn from(&self) -> f64 {
        self.from
    }

    #[inline]
    pub fn to(&self) -> f64 {
        self.to
    }

    /// Signed span `to - from`.
    #[inline]
    pub fn span(&self) -> f64 {
        self.to - self.from
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.span().abs()
    }

    #[inline]
    pub fn is_increasing(&self) -> bool {
        self.to > self.from
    }

    pub fn lower(&self) -> f64 {
        self.from.min(self.to)
    }

    pub fn upper(&self) -> f64 {
        self.from.max(self.to)
    }

    pub fn reversed(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }
}

/// One simulation leg, sampling the perturbation from `lambda1` to `lambda2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub lambda1: f64,
    pub lambda2: f64,
}

impl Window {
    pub fn new(lambda1: f64, lambda2: f64) -> Self {
        Self { lambda1, lambda2 }
    }

    /// Signed width `lambda2 - lambda1`.
    pub fn width(&self) -> f64 {
        self.lambda2 - self.lambda1
    }

    pub fn swapped(&self) -> Self {
        Self {
            lambda1: self.lambda2,
            lambda2: self.lambda1,
        }
    }
}

/// An ordered, contiguous sequence of windows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowSchedule {
    windows: Vec<Window>,
}

impl WindowSchedule {
    pub fn new(windows: Vec<Window>) -> Self {
        Self { windows }
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Window> {
        self.windows.iter()
    }

    pub fn first(&self) -> Option<&Window> {
        self.windows.first()
    }

    pub fn last(&self) -> Option<&Window> {
        self.windows.last()
    }

    /// Sum of the signed widths of all windows.
    pub fn span(&self) -> f64 {
        self.windows.iter().map(Window::width).sum()
    }

    /// Returns `true` if every window starts where the previous one ended.
    pub fn is_contiguous(&self) -> bool {
        self.windows
            .windows(2)
            .all(|pair| is_close(pair[0].lambda2, pair[1].lambda1))
    }

    /// The same legs traversed in the opposite direction: order reversed and
    /// each window's endpoints swapped.
    pub fn mirrored(&self) -> Self {
        Self {
            windows: self.windows.iter().rev().map(Window::swapped).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a WindowSchedule {
    type Item = &'a Window;
    type IntoIter = std::slice::Iter<'a, Window>;

    fn into_iter(self) -> Self::IntoIter {
        self.windows.iter()
    }
}

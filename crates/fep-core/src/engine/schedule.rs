use crate::core::models::lambda::{LambdaError, LambdaRange, Window, WindowSchedule};
use crate::core::utils::numeric::is_close;

/// Number of full-width windows and the leftover margin for a range.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Stratification {
    full_windows: usize,
    margin: f64,
}

/// Returns the window size with the sign of the range's direction.
fn signed_stride(range: &LambdaRange, window_size: f64) -> Result<f64, LambdaError> {
    let magnitude = window_size.abs();
    if !magnitude.is_finite() || is_close(magnitude, 0.0) {
        return Err(LambdaError::InvalidWindowSize(window_size));
    }
    Ok(if range.is_increasing() {
        magnitude
    } else {
        -magnitude
    })
}

fn stratify(range: &LambdaRange, stride: f64) -> Stratification {
    let span = range.span();
    let mut full_windows = (span / stride).floor() as usize;
    let mut margin = span - full_windows as f64 * stride;
    // A boundary that lands within tolerance of the next full window counts
    // as that window.
    if is_close(margin.abs(), stride.abs()) {
        full_windows += 1;
        margin = 0.0;
    }
    Stratification {
        full_windows,
        margin,
    }
}

/// Builds the forward schedule for one sub-range.
///
/// Emits contiguous windows of `window_size` starting at `range.from()`. If
/// the span is not an exact multiple, one final margin window covers the
/// remainder so the schedule always ends exactly at `range.to()`.
///
/// # Errors
///
/// Returns [`LambdaError::InvalidWindowSize`] if `window_size` is zero or not
/// finite.
pub fn generate_forward(range: &LambdaRange, window_size: f64) -> Result<WindowSchedule, LambdaError> {
    let stride = signed_stride(range, window_size)?;
    let Stratification {
        full_windows,
        margin,
    } = stratify(range, stride);
    let has_margin = !is_close(margin, 0.0);

    let boundaries: Vec<f64> = (0..=full_windows)
        .map(|k| {
            if k == full_windows && !has_margin {
                range.to()
            } else {
                range.from() + stride * k as f64
            }
        })
        .collect();

    let mut windows: Vec<Window> = boundaries
        .windows(2)
        .map(|pair| Window::new(pair[0], pair[1]))
        .collect();
    if has_margin {
        windows.push(Window::new(boundaries[full_windows], range.to()));
    }

    Ok(WindowSchedule::new(windows))
}

/// Builds the backward schedule for the same sub-range.
///
/// Traverses from `range.to()` back to `range.from()`. The margin window, if
/// any, comes first so the backward run starts exactly where the forward run
/// of the same sub-range ended. Boundaries are the forward boundaries, so
/// mirroring one schedule yields the other.
///
/// # Errors
///
/// Returns [`LambdaError::InvalidWindowSize`] if `window_size` is zero or not
/// finite.
pub fn generate_backward(range: &LambdaRange, window_size: f64) -> Result<WindowSchedule, LambdaError> {
    Ok(generate_forward(range, window_size)?.mirrored())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(from: f64, to: f64) -> LambdaRange {
        LambdaRange::new(from, to).unwrap()
    }

    fn assert_windows(schedule: &WindowSchedule, expected: &[(f64, f64)]) {
        assert_eq!(schedule.len(), expected.len(), "{:?}", schedule);
        for (window, &(l1, l2)) in schedule.iter().zip(expected) {
            assert!(
                is_close(window.lambda1, l1) && is_close(window.lambda2, l2),
                "expected ({l1}, {l2}), got {window:?}"
            );
        }
    }

    #[test]
    fn forward_appends_margin_window_for_inexact_division() {
        let schedule = generate_forward(&range(0.0, 0.1), 0.03).unwrap();
        assert_windows(
            &schedule,
            &[(0.0, 0.03), (0.03, 0.06), (0.06, 0.09), (0.09, 0.1)],
        );
        assert_eq!(schedule.last().unwrap().lambda2, 0.1);
    }

    #[test]
    fn forward_has_no_margin_window_for_exact_division() {
        let schedule = generate_forward(&range(0.0, 0.06), 0.02).unwrap();
        assert_windows(&schedule, &[(0.0, 0.02), (0.02, 0.04), (0.04, 0.06)]);
        assert_eq!(schedule.last().unwrap().lambda2, 0.06);
    }

    #[test]
    fn forward_includes_boundary_window_lost_to_rounding() {
        // 0.1 / 0.02 evaluates just below 5 in floating point.
        let schedule = generate_forward(&range(0.9, 1.0), 0.02).unwrap();
        assert_eq!(schedule.len(), 5);
        assert!(schedule.iter().all(|w| is_close(w.width(), 0.02)));
        assert_eq!(schedule.last().unwrap().lambda2, 1.0);
    }

    #[test]
    fn forward_on_range_narrower_than_window_is_a_single_margin_window() {
        let schedule = generate_forward(&range(0.2, 0.25), 0.1).unwrap();
        assert_windows(&schedule, &[(0.2, 0.25)]);
    }

    #[test]
    fn forward_follows_decreasing_ranges() {
        let schedule = generate_forward(&range(1.0, 0.9), 0.04).unwrap();
        assert_windows(&schedule, &[(1.0, 0.96), (0.96, 0.92), (0.92, 0.9)]);
    }

    #[test]
    fn backward_emits_margin_window_first() {
        let schedule = generate_backward(&range(0.0, 0.1), 0.03).unwrap();
        assert_windows(
            &schedule,
            &[(0.1, 0.09), (0.09, 0.06), (0.06, 0.03), (0.03, 0.0)],
        );
    }

    #[test]
    fn backward_starts_where_forward_ends() {
        let r = range(0.36, 0.42);
        let forward = generate_forward(&r, 0.02).unwrap();
        let backward = generate_backward(&r, 0.02).unwrap();
        assert_eq!(
            forward.last().unwrap().lambda2,
            backward.first().unwrap().lambda1
        );
        assert_eq!(
            backward.last().unwrap().lambda2,
            forward.first().unwrap().lambda1
        );
    }

    #[test]
    fn negative_window_size_is_treated_as_magnitude() {
        let a = generate_forward(&range(0.0, 0.1), -0.03).unwrap();
        let b = generate_forward(&range(0.0, 0.1), 0.03).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_window_sizes_are_rejected() {
        for size in [0.0, 1e-12, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                generate_forward(&range(0.0, 1.0), size),
                Err(LambdaError::InvalidWindowSize(_))
            ));
        }
    }

    #[test]
    fn schedules_reproduce_span_and_mirror_each_other_across_sweep() {
        let ranges = [
            range(0.0, 1.0),
            range(0.0, 0.1),
            range(0.9, 1.0),
            range(0.123, 0.987),
            range(1.0, 0.0),
        ];
        for r in ranges {
            for divisions in 1..=80 {
                let window_size = 1.0 / divisions as f64;
                let forward = generate_forward(&r, window_size).unwrap();
                let backward = generate_backward(&r, window_size).unwrap();

                assert!(forward.is_contiguous());
                assert!(backward.is_contiguous());
                assert!(is_close(forward.span(), r.span()));
                assert!(is_close(backward.span(), -r.span()));
                assert_eq!(forward.first().unwrap().lambda1, r.from());
                assert_eq!(forward.last().unwrap().lambda2, r.to());
                assert_eq!(backward.first().unwrap().lambda1, r.to());
                assert_eq!(backward.mirrored(), forward);
                assert!(
                    forward
                        .iter()
                        .all(|w| w.width().abs() <= window_size + 2e-9)
                );
            }
        }
    }
}

/// Absolute and relative tolerance used for every lambda boundary comparison.
///
/// Lambda values carry seven decimal digits of intended precision, so this
/// must stay well below `1e-7` and must not be replaced by `f64::EPSILON`.
pub const LAMBDA_TOLERANCE: f64 = 1e-9;

/// Returns `true` if `a` and `b` are equal within [`LAMBDA_TOLERANCE`].
///
/// The comparison uses the larger of a relative bound (scaled by the larger
/// magnitude) and an absolute bound, both set to the same tolerance.
pub fn is_close(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    let diff = (a - b).abs();
    let bound = (LAMBDA_TOLERANCE * a.abs().max(b.abs())).max(LAMBDA_TOLERANCE);
    diff <= bound
}

/// Formats a lambda value with seven decimals, never printing negative zero.
pub fn format_lambda(value: f64) -> String {
    let value = if is_close(value, 0.0) { 0.0 } else { value };
    format!("{:.7}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_close_accepts_differences_within_tolerance() {
        assert!(is_close(0.3, 0.1 + 0.2));
        assert!(is_close(1.0, 1.0 + 5e-10));
        assert!(is_close(0.0, -1e-12));
    }

    #[test]
    fn is_close_rejects_differences_beyond_tolerance() {
        assert!(!is_close(0.0, 1e-8));
        assert!(!is_close(0.5, 0.5000001));
    }

    #[test]
    fn is_close_handles_non_finite_values() {
        assert!(is_close(f64::INFINITY, f64::INFINITY));
        assert!(!is_close(f64::NAN, f64::NAN));
        assert!(!is_close(f64::INFINITY, 1.0));
    }

    #[test]
    fn format_lambda_uses_seven_decimals() {
        assert_eq!(format_lambda(0.02), "0.0200000");
        assert_eq!(format_lambda(1.0), "1.0000000");
    }

    #[test]
    fn format_lambda_never_prints_negative_zero() {
        assert_eq!(format_lambda(-0.0), "0.0000000");
        assert_eq!(format_lambda(-3e-17), "0.0000000");
    }
}

//! A helper macro to ensure that a syntax element is within the specified [$lower, $upper] bounds.

/// Enforces that a syntax element is within the specified \[LOWER, UPPER\] bounds.
///
/// The brackets indicate that this range is inclusive on both sides.
/// Evaluates to `Result<(), NaluError>` with [`NaluError::OutOfRange`](crate::NaluError::OutOfRange)
/// naming the checked expression.
#[macro_export]
macro_rules! range_check {
    ($n:expr, $lower:expr, $upper:expr) => {{
        let n = $n;

        #[allow(unused_comparisons, clippy::manual_range_contains)]
        let out_of_range = n < $lower || n > $upper;
        if out_of_range {
            ::std::result::Result::Err($crate::NaluError::OutOfRange {
                element: stringify!($n),
                value: n as i64,
                lower: $lower as i64,
                upper: $upper as i64,
            })
        } else {
            ::std::result::Result::Ok(())
        }
    }};
}

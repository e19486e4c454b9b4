//! Shared test utilities for the field layer workspace.
//!
//! This crate provides:
//! - Node array generators for regular and skewed grids
//! - Sample field values with verifiable patterns
//! - Hourly timestamp sequences
//! - Approximate float assertions
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod generators;

pub use generators::*;

/// Macro for approximate floating-point equality assertions.
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro asserting that every element of a float slice is within epsilon
/// of the matching element of another.
///
/// ```ignore
/// use test_utils::assert_slice_approx_eq;
///
/// assert_slice_approx_eq!(&[0.5_f32, 1.0], &[0.5_f32, 1.0], 1e-6);
/// ```
#[macro_export]
macro_rules! assert_slice_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left = $left;
        let right = $right;
        assert_eq!(left.len(), right.len(), "slice lengths differ");
        for (idx, (l, r)) in left.iter().zip(right.iter()).enumerate() {
            let diff = (*l as f64 - *r as f64).abs();
            if diff > $epsilon as f64 {
                panic!(
                    "assertion failed at index {}: `{:?}` vs `{:?}` (diff {:?})",
                    idx, l, r, diff
                );
            }
        }
    }};
}

//! Easing curves.

/// Cubic ease-in-out.
///
/// Maps `[0, 1]` onto `[0, 1]`: slow start, fast middle, slow end. The two
/// halves meet at `(0.5, 0.5)` with matching slope.
#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    extern crate std;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn easing_fixes_endpoints_and_midpoint() {
        assert!((ease_in_out_cubic(0.0) - 0.0).abs() < EPSILON);
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < EPSILON);
        assert!((ease_in_out_cubic(1.0) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn easing_is_monotonic() {
        let mut previous = ease_in_out_cubic(0.0);
        for i in 1..=1000 {
            let value = ease_in_out_cubic(i as f32 / 1000.0);
            assert!(value >= previous, "decreased at step {}", i);
            previous = value;
        }
    }

    #[test]
    fn easing_is_symmetric() {
        for i in 0..=100 {
            let t = i as f32 / 100.0;
            let mirrored = 1.0 - ease_in_out_cubic(1.0 - t);
            assert!((ease_in_out_cubic(t) - mirrored).abs() < 1e-5);
        }
    }
}

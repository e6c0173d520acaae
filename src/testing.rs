//! Testing helpers.

use assert_float_eq::*;

/// Asserts that two slices agree element-wise within a relative `epsilon`.
pub fn assert_slice_f64_relative(expected: &[f64], actual: &[f64], epsilon: f64) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (&expected, &actual) in expected.iter().zip(actual) {
        if actual != expected {
            assert_float_relative_eq!(expected, actual, epsilon);
        }
    }
}

/// Builds a combined play-by-play block from `(clock, play, home, away)` rows.
pub fn play_by_play(rows: &[(&str, &str, u32, u32)]) -> String {
    rows.iter()
        .map(|(clock, play, home, away)| format!("{clock}\t{play}\t{home}\t{away}\n"))
        .collect()
}

//! Symmetric tapering windows.

use std::f64::consts::PI;

/// Symmetric Tukey (tapered cosine) window of `length` samples.
///
/// `alpha` is the tapered fraction of the window: `0` gives a rectangular
/// window and `1` a Hann window. Values outside `[0, 1]` are clamped; callers
/// validate the range before reaching here.
pub fn tukey(length: usize, alpha: f64) -> Vec<f64> {
    if length == 0 {
        return Vec::new();
    }
    if length == 1 {
        return vec![1.0];
    }
    if alpha <= 0.0 {
        return vec![1.0; length];
    }
    if alpha >= 1.0 {
        return hann(length);
    }

    let span = (length - 1) as f64;
    let width = (alpha * span / 2.0).floor() as usize;

    (0..length)
        .map(|index| {
            let n = index as f64;
            if index <= width {
                0.5 * (1.0 + (PI * (-1.0 + 2.0 * n / alpha / span)).cos())
            } else if index < length - width - 1 {
                1.0
            } else {
                0.5 * (1.0 + (PI * (-2.0 / alpha + 1.0 + 2.0 * n / alpha / span)).cos())
            }
        })
        .collect()
}

/// Symmetric Hann window of `length` samples.
pub fn hann(length: usize) -> Vec<f64> {
    if length == 0 {
        return Vec::new();
    }
    if length == 1 {
        return vec![1.0];
    }

    let span = (length - 1) as f64;
    (0..length)
        .map(|index| 0.5 - 0.5 * (2.0 * PI * index as f64 / span).cos())
        .collect()
}

/// Sum of squared window samples.
pub fn window_energy(window: &[f64]) -> f64 {
    window.iter().map(|value| value * value).sum()
}

#[cfg(test)]
mod tests {
    use super::{hann, tukey, window_energy};

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (index, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!((a - e).abs() < 1.0e-12, "sample {index}: {a} != {e}");
        }
    }

    #[test]
    fn zero_alpha_is_rectangular() {
        assert_close(&tukey(5, 0.0), &[1.0; 5]);
        assert_eq!(window_energy(&tukey(8, 0.0)), 8.0);
    }

    #[test]
    fn unit_alpha_matches_hann() {
        assert_close(&tukey(9, 1.0), &hann(9));
        assert_close(&hann(5), &[0.0, 0.5, 1.0, 0.5, 0.0]);
    }

    #[test]
    fn half_alpha_matches_reference_values() {
        // scipy.signal.windows.tukey(7, alpha=0.5, sym=True)
        assert_close(&tukey(7, 0.5), &[0.0, 0.75, 1.0, 1.0, 1.0, 0.75, 0.0]);

        // scipy.signal.windows.tukey(10, alpha=0.5, sym=True)
        let window = tukey(10, 0.5);
        assert!((window[0]).abs() < 1.0e-12);
        assert!((window[1] - 0.4131759111665348).abs() < 1.0e-12);
        assert!((window[2] - 0.9698463103929542).abs() < 1.0e-12);
        assert_close(&window[3..7], &[1.0; 4]);
        assert!((window[8] - window[1]).abs() < 1.0e-12);
    }

    #[test]
    fn windows_are_symmetric() {
        for alpha in [0.1, 0.25, 0.5, 0.9] {
            let window = tukey(33, alpha);
            for index in 0..window.len() {
                let mirrored = window[window.len() - 1 - index];
                assert!((window[index] - mirrored).abs() < 1.0e-12);
            }
        }
    }

    #[test]
    fn degenerate_lengths() {
        assert!(tukey(0, 0.5).is_empty());
        assert_eq!(tukey(1, 0.5), vec![1.0]);
    }
}

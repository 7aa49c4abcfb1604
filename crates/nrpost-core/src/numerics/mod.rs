pub mod linalg;
pub mod savgol;
pub mod spectrum;
pub mod window;

pub use linalg::{
    DenseMatrix, LuDecomposition, LuError, evaluate_polynomial, lu_factorize, lu_solve,
    polynomial_least_squares,
};
pub use savgol::{DEFAULT_POLY_ORDER, DEFAULT_WINDOW_LENGTH, SavgolError, SavitzkyGolay, savgol_smooth};
pub use spectrum::{
    PeakReport, SpectralParameters, Spectrum, SpectrumError, fft_frequencies, fft_magnitude,
    fft_shift, forward_fft, peak_report, power_spectral_density, sample_spacing,
};
pub use window::{hann, tukey, window_energy};

/// Linear interpolation weight of `value` between `lower` and `upper`.
pub fn interpolation_weight(lower: f64, upper: f64, value: f64) -> f64 {
    if upper == lower {
        0.0
    } else {
        (value - lower) / (upper - lower)
    }
}

/// `[min, max]` of the finite entries, if any.
pub fn finite_bounds(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|value| value.is_finite())
        .fold(None, |bounds, value| match bounds {
            None => Some((value, value)),
            Some((low, high)) => Some((low.min(value), high.max(value))),
        })
}

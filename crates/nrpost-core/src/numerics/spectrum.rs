//! Windowed FFT and power spectral density of uniformly sampled data.
//!
//! Frequencies follow the `fftfreq` bin order and are zero-centered with an
//! `fftshift` style rotation before any positive-frequency filtering.

use super::window::{tukey, window_energy};
use crate::domain::PostError;
use num_complex::Complex64;
use rustfft::FftPlanner;
use std::f64::consts::PI;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpectrumError {
    #[error("Tukey window alpha must lie in [0, 1], got {alpha}")]
    InvalidAlpha { alpha: f64 },
    #[error("at least two samples are needed to infer the sampling interval, got {samples}")]
    TooFewSamples { samples: usize },
    #[error("x and y columns differ in length ({x_len} vs {y_len})")]
    LengthMismatch { x_len: usize, y_len: usize },
}

impl From<SpectrumError> for PostError {
    fn from(error: SpectrumError) -> Self {
        match error {
            SpectrumError::InvalidAlpha { .. } => {
                PostError::invalid_argument("ARG.TUKEY_ALPHA", error.to_string())
            }
            _ => PostError::invalid_input("INPUT.SPECTRUM", error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralParameters {
    alpha: f64,
    positive: bool,
}

impl SpectralParameters {
    pub fn new(alpha: f64, positive: bool) -> Result<Self, SpectrumError> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(SpectrumError::InvalidAlpha { alpha });
        }
        Ok(Self { alpha, positive })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn positive(&self) -> bool {
        self.positive
    }
}

/// Frequency bins and the value attached to each bin.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Spectrum {
    pub frequencies: Vec<f64>,
    pub values: Vec<f64>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    fn retain_frequencies(self, keep: impl Fn(f64) -> bool, scale: f64) -> Self {
        let (frequencies, values) = self
            .frequencies
            .into_iter()
            .zip(self.values)
            .filter(|(frequency, _)| keep(*frequency))
            .map(|(frequency, value)| (frequency, value * scale))
            .unzip();
        Self {
            frequencies,
            values,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeakReport {
    pub value: f64,
    pub index: usize,
    /// Angular frequency of every bin holding the maximum value.
    pub angular_frequencies: Vec<f64>,
    pub upper_neighbor: Option<f64>,
    pub lower_neighbor: Option<f64>,
}

/// Sampling interval taken from the first two abscissae.
pub fn sample_spacing(x: &[f64]) -> Result<f64, SpectrumError> {
    match x {
        [first, second, ..] => Ok(second - first),
        _ => Err(SpectrumError::TooFewSamples { samples: x.len() }),
    }
}

/// Bin frequencies in `fftfreq` order: `[0, 1, ..., -n/2, ..., -1] / (n dt)`.
pub fn fft_frequencies(length: usize, spacing: f64) -> Vec<f64> {
    let scale = 1.0 / (length as f64 * spacing);
    let positive_count = length.div_ceil(2);
    (0..length)
        .map(|index| {
            let bin = if index < positive_count {
                index as f64
            } else {
                index as f64 - length as f64
            };
            bin * scale
        })
        .collect()
}

/// Rotates the zero-frequency bin to index `len / 2`.
pub fn fft_shift<T>(values: &mut [T]) {
    let half = values.len() / 2;
    values.rotate_right(half);
}

pub fn forward_fft(samples: &[f64]) -> Vec<Complex64> {
    let mut buffer: Vec<Complex64> = samples
        .iter()
        .map(|sample| Complex64::new(*sample, 0.0))
        .collect();
    if buffer.is_empty() {
        return buffer;
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(buffer.len());
    fft.process(&mut buffer);
    buffer
}

struct ShiftedTransform {
    spacing: f64,
    window: Vec<f64>,
    frequencies: Vec<f64>,
    transform: Vec<Complex64>,
}

fn shifted_transform(
    x: &[f64],
    y: &[f64],
    parameters: SpectralParameters,
) -> Result<ShiftedTransform, SpectrumError> {
    if x.len() != y.len() {
        return Err(SpectrumError::LengthMismatch {
            x_len: x.len(),
            y_len: y.len(),
        });
    }
    let spacing = sample_spacing(x)?;

    let window = tukey(y.len(), parameters.alpha);
    let windowed: Vec<f64> = y.iter().zip(&window).map(|(value, w)| value * w).collect();

    let mut transform = forward_fft(&windowed);
    let mut frequencies = fft_frequencies(y.len(), spacing);
    fft_shift(&mut transform);
    fft_shift(&mut frequencies);

    Ok(ShiftedTransform {
        spacing,
        window,
        frequencies,
        transform,
    })
}

/// `|dt * FFT(w y)|` against zero-centered frequency. Positive-only output
/// keeps strictly positive frequencies.
pub fn fft_magnitude(
    x: &[f64],
    y: &[f64],
    parameters: SpectralParameters,
) -> Result<Spectrum, SpectrumError> {
    let shifted = shifted_transform(x, y, parameters)?;
    let values = shifted
        .transform
        .iter()
        .map(|coefficient| (coefficient * shifted.spacing).norm())
        .collect();
    let spectrum = Spectrum {
        frequencies: shifted.frequencies,
        values,
    };

    if parameters.positive {
        Ok(spectrum.retain_frequencies(|frequency| frequency > 0.0, 1.0))
    } else {
        Ok(spectrum)
    }
}

/// `dt / S * |FFT(w y)|^2`, `S` the window energy. Positive-only output keeps
/// non-negative frequencies and doubles them (one-sided density).
pub fn power_spectral_density(
    x: &[f64],
    y: &[f64],
    parameters: SpectralParameters,
) -> Result<Spectrum, SpectrumError> {
    let shifted = shifted_transform(x, y, parameters)?;
    let normalization = shifted.spacing / window_energy(&shifted.window);
    let values = shifted
        .transform
        .iter()
        .map(|coefficient| normalization * coefficient.norm_sqr())
        .collect();
    let spectrum = Spectrum {
        frequencies: shifted.frequencies,
        values,
    };

    if parameters.positive {
        Ok(spectrum.retain_frequencies(|frequency| frequency >= 0.0, 2.0))
    } else {
        Ok(spectrum)
    }
}

/// Locates the maximum of the spectrum. Neighbor frequencies are `None` when
/// the peak sits on the first or last bin.
pub fn peak_report(spectrum: &Spectrum) -> Option<PeakReport> {
    let (index, value) = spectrum
        .values
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, value)| !value.is_nan())
        .fold(None, |best: Option<(usize, f64)>, (index, value)| match best {
            Some((_, best_value)) if best_value >= value => best,
            _ => Some((index, value)),
        })?;

    let angular = |bin: usize| 2.0 * PI * spectrum.frequencies[bin];
    let angular_frequencies = spectrum
        .values
        .iter()
        .enumerate()
        .filter(|(_, candidate)| **candidate == value)
        .map(|(bin, _)| angular(bin))
        .collect();

    Some(PeakReport {
        value,
        index,
        angular_frequencies,
        upper_neighbor: (index + 1 < spectrum.len()).then(|| angular(index + 1)),
        lower_neighbor: index.checked_sub(1).map(angular),
    })
}

use super::linalg::{
    DenseMatrix, LuError, evaluate_polynomial, lu_solve, monomials, polynomial_least_squares,
};
use crate::domain::PostError;

pub const DEFAULT_WINDOW_LENGTH: usize = 21;
pub const DEFAULT_POLY_ORDER: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SavgolError {
    #[error("window length must be odd and positive, got {window_length}")]
    InvalidWindow { window_length: usize },
    #[error("polynomial order {poly_order} must be less than window length {window_length}")]
    OrderTooLarge {
        poly_order: usize,
        window_length: usize,
    },
    #[error("signal has {samples} samples but the smoothing window needs {window_length}")]
    SignalTooShort {
        samples: usize,
        window_length: usize,
    },
    #[error(transparent)]
    Fit(#[from] LuError),
}

impl From<SavgolError> for PostError {
    fn from(error: SavgolError) -> Self {
        match error {
            SavgolError::SignalTooShort { .. } => {
                PostError::invalid_input("INPUT.SMOOTHING", error.to_string())
            }
            _ => PostError::internal("INTERNAL.SMOOTHING", error.to_string()),
        }
    }
}

/// Savitzky-Golay smoother: a least-squares polynomial of order `poly_order`
/// fitted over a sliding window of `window_length` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SavitzkyGolay {
    window_length: usize,
    poly_order: usize,
    coefficients: Vec<f64>,
}

impl SavitzkyGolay {
    pub fn new(window_length: usize, poly_order: usize) -> Result<Self, SavgolError> {
        if window_length == 0 || window_length % 2 == 0 {
            return Err(SavgolError::InvalidWindow { window_length });
        }
        if poly_order >= window_length {
            return Err(SavgolError::OrderTooLarge {
                poly_order,
                window_length,
            });
        }

        let coefficients = smoothing_coefficients(window_length, poly_order)?;
        Ok(Self {
            window_length,
            poly_order,
            coefficients,
        })
    }

    pub fn window_length(&self) -> usize {
        self.window_length
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Smooths `data`. Interior samples use the convolution coefficients; the
    /// first and last half-windows are replaced by the polynomial fitted to the
    /// first and last full windows.
    pub fn apply(&self, data: &[f64]) -> Result<Vec<f64>, SavgolError> {
        let window = self.window_length;
        if data.len() < window {
            return Err(SavgolError::SignalTooShort {
                samples: data.len(),
                window_length: window,
            });
        }

        let half = window / 2;
        let mut smoothed = data.to_vec();
        for center in half..data.len() - half {
            let segment = &data[center - half..=center + half];
            smoothed[center] = segment
                .iter()
                .zip(&self.coefficients)
                .map(|(sample, coefficient)| sample * coefficient)
                .sum();
        }

        self.fit_edge(data, 0, 0..half, &mut smoothed)?;
        let tail_start = data.len() - window;
        self.fit_edge(data, tail_start, window - half..window, &mut smoothed)?;

        Ok(smoothed)
    }

    fn fit_edge(
        &self,
        data: &[f64],
        window_start: usize,
        positions: std::ops::Range<usize>,
        smoothed: &mut [f64],
    ) -> Result<(), SavgolError> {
        let half = (self.window_length / 2) as f64;
        // Centered abscissae keep the normal equations well conditioned.
        let abscissae: Vec<f64> = (0..self.window_length)
            .map(|offset| offset as f64 - half)
            .collect();
        let segment = &data[window_start..window_start + self.window_length];
        let polynomial = polynomial_least_squares(&abscissae, segment, self.poly_order)?;

        for position in positions {
            smoothed[window_start + position] =
                evaluate_polynomial(&polynomial, position as f64 - half);
        }
        Ok(())
    }
}

/// Smoothing with the fixed 21-point, third-order filter.
pub fn savgol_smooth(data: &[f64]) -> Result<Vec<f64>, SavgolError> {
    SavitzkyGolay::new(DEFAULT_WINDOW_LENGTH, DEFAULT_POLY_ORDER)?.apply(data)
}

fn smoothing_coefficients(window_length: usize, poly_order: usize) -> Result<Vec<f64>, LuError> {
    let half = (window_length / 2) as f64;
    let terms = poly_order + 1;
    let rows: Vec<Vec<f64>> = (0..window_length)
        .map(|offset| monomials(offset as f64 - half, terms))
        .collect();

    let mut gram = DenseMatrix::zeros(terms, terms);
    for row in &rows {
        for i in 0..terms {
            for j in 0..terms {
                gram[(i, j)] += row[i] * row[j];
            }
        }
    }

    let mut unit = vec![0.0; terms];
    unit[0] = 1.0;
    let weights = lu_solve(&gram, &unit)?;

    Ok(rows
        .iter()
        .map(|row| row.iter().zip(&weights).map(|(power, weight)| power * weight).sum())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{SavgolError, SavitzkyGolay, savgol_smooth};

    #[test]
    fn five_point_quadratic_coefficients_match_reference() {
        // scipy.signal.savgol_coeffs(5, 2)
        let filter = SavitzkyGolay::new(5, 2).expect("parameters should be valid");
        let expected = [-3.0, 12.0, 17.0, 12.0, -3.0].map(|value| value / 35.0);
        for (actual, expected) in filter.coefficients().iter().zip(expected) {
            assert!((actual - expected).abs() < 1.0e-12);
        }
    }

    #[test]
    fn default_coefficients_sum_to_one() {
        let filter = SavitzkyGolay::new(21, 3).expect("parameters should be valid");
        let sum: f64 = filter.coefficients().iter().sum();
        assert!((sum - 1.0).abs() < 1.0e-12);
        let first = filter.coefficients()[0];
        let last = filter.coefficients()[20];
        assert!((first - last).abs() < 1.0e-12);
    }

    #[test]
    fn cubic_signals_pass_through_unchanged() {
        let data: Vec<f64> = (0..40)
            .map(|i| {
                let x = i as f64 * 0.1;
                1.0 + x - 0.3 * x * x + 0.05 * x * x * x
            })
            .collect();
        let smoothed = savgol_smooth(&data).expect("smoothing should succeed");
        for (index, (actual, expected)) in smoothed.iter().zip(&data).enumerate() {
            assert!(
                (actual - expected).abs() < 1.0e-9,
                "sample {index}: {actual} != {expected}"
            );
        }
    }

    #[test]
    fn smoothing_reduces_alternating_noise() {
        let data: Vec<f64> = (0..60)
            .map(|i| if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        let smoothed = savgol_smooth(&data).expect("smoothing should succeed");
        let interior_peak = smoothed[10..50].iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        assert!(interior_peak < 0.2, "interior peak was {interior_peak}");
    }

    #[test]
    fn invalid_parameters_and_short_signals_are_rejected() {
        assert_eq!(
            SavitzkyGolay::new(4, 2),
            Err(SavgolError::InvalidWindow { window_length: 4 })
        );
        assert_eq!(
            SavitzkyGolay::new(5, 5),
            Err(SavgolError::OrderTooLarge {
                poly_order: 5,
                window_length: 5
            })
        );
        assert_eq!(
            savgol_smooth(&[1.0; 20]),
            Err(SavgolError::SignalTooShort {
                samples: 20,
                window_length: 21
            })
        );
    }
}

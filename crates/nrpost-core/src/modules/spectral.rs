//! Raw, FFT and PSD plots of a two-column dataset.

use super::PipelineExecutor;
use crate::common::RunConfig;
use crate::dataset::{ColumnPair, load_columns};
use crate::domain::{ArtifactKind, Pipeline, PipelineArtifact, PipelineResult};
use crate::numerics::{
    PeakReport, SpectralParameters, Spectrum, fft_magnitude, peak_report, power_spectral_density,
    savgol_smooth,
};
use crate::plot::{
    AxisLimits, AxisScale, Figure, FigureTarget, Series, SeriesStyle, VerticalMarker, emit_figure,
};
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub const SPECTRAL_FONT_SIZE: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpectralMode {
    Plot,
    Fft,
    Psd,
}

impl SpectralMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plot => "plt",
            Self::Fft => "fft",
            Self::Psd => "psd",
        }
    }

    pub const fn pipeline(self) -> Pipeline {
        match self {
            Self::Plot => Pipeline::PlotData,
            Self::Fft => Pipeline::PlotFft,
            Self::Psd => Pipeline::PlotPsd,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpectralRequest {
    pub mode: SpectralMode,
    pub input: PathBuf,
    pub x_column: usize,
    pub y_column: usize,
    /// Tukey window shape, checked before any data is read.
    pub alpha: f64,
    pub positive: bool,
    pub peak: bool,
    pub smooth: bool,
    pub style: SeriesStyle,
    pub abslog: bool,
    pub mark: Option<f64>,
    pub x_label: String,
    pub y_label: String,
    pub limits: AxisLimits,
    pub save: Option<PathBuf>,
}

impl SpectralRequest {
    pub fn new(mode: SpectralMode, input: impl Into<PathBuf>, x_column: usize, y_column: usize) -> Self {
        Self {
            mode,
            input: input.into(),
            x_column,
            y_column,
            alpha: 0.0,
            positive: false,
            peak: false,
            smooth: false,
            style: SeriesStyle::Points,
            abslog: false,
            mark: None,
            x_label: "x".to_string(),
            y_label: "y".to_string(),
            limits: AxisLimits::default(),
            save: None,
        }
    }

    fn target(&self, config: &RunConfig) -> PipelineResult<FigureTarget> {
        match &self.save {
            Some(name) => FigureTarget::save_as(config, name),
            None => {
                let stem = self
                    .input
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "data".to_string());
                Ok(FigureTarget::show(&format!("{stem}_{}", self.mode.as_str())))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpectralOutcome {
    pub artifact: PipelineArtifact,
    pub saved: bool,
    pub peak: Option<PeakReport>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpectralPipeline;

impl PipelineExecutor for SpectralPipeline {
    type Request = SpectralRequest;
    type Output = SpectralOutcome;

    /// The `plot` family as a whole; the per-request stage is
    /// [`SpectralMode::pipeline`].
    fn pipeline(&self) -> Pipeline {
        Pipeline::PlotData
    }

    fn execute(&self, config: &RunConfig, request: &SpectralRequest) -> PipelineResult<SpectralOutcome> {
        let parameters = match request.mode {
            SpectralMode::Plot => None,
            SpectralMode::Fft | SpectralMode::Psd => {
                Some(SpectralParameters::new(request.alpha, request.positive)?)
            }
        };
        let target = request.target(config)?;

        debug!(
            mode = request.mode.as_str(),
            input = %request.input.display(),
            "loading dataset"
        );
        let columns = load_columns(&request.input, request.x_column, request.y_column)?;

        let (figure, peak) = match parameters {
            None => (data_figure(request, &columns), None),
            Some(parameters) => spectral_figure(request, &columns, parameters)?,
        };

        let path = emit_figure(&figure, &target)?;
        info!(
            pipeline = %request.mode.pipeline(),
            path = %path.display(),
            "rendered figure"
        );
        Ok(SpectralOutcome {
            artifact: PipelineArtifact::new(ArtifactKind::Figure, path),
            saved: target.is_saved(),
            peak,
        })
    }
}

fn base_figure(request: &SpectralRequest) -> Figure {
    Figure {
        x_label: request.x_label.clone(),
        y_label: request.y_label.clone(),
        limits: request.limits,
        font_size: SPECTRAL_FONT_SIZE,
        ..Figure::default()
    }
}

fn data_figure(request: &SpectralRequest, columns: &ColumnPair) -> Figure {
    let mut figure = base_figure(request);
    if request.abslog {
        let magnitudes: Vec<f64> = columns.y.iter().map(|value| value.abs()).collect();
        figure.series.push(Series::new(&columns.x, &magnitudes).with_style(request.style));
        figure.y_scale = AxisScale::Log10;
    } else {
        figure
            .series
            .push(Series::new(&columns.x, &columns.y).with_style(request.style));
    }
    figure
}

fn spectral_figure(
    request: &SpectralRequest,
    columns: &ColumnPair,
    parameters: SpectralParameters,
) -> PipelineResult<(Figure, Option<PeakReport>)> {
    let mut peak = None;
    let spectrum = match request.mode {
        SpectralMode::Psd => {
            let mut spectrum = power_spectral_density(&columns.x, &columns.y, parameters)?;
            if request.peak {
                peak = peak_report(&spectrum);
                if peak.is_none() {
                    warn!(
                        bins = spectrum.len(),
                        "no finite power spectral density value, peak not reported"
                    );
                }
            }
            if request.smooth && request.style == SeriesStyle::Line {
                debug!("applying Savitzky-Golay smoothing");
                spectrum = Spectrum {
                    values: savgol_smooth(&spectrum.values)?,
                    ..spectrum
                };
            }
            spectrum
        }
        _ => fft_magnitude(&columns.x, &columns.y, parameters)?,
    };
    debug!(bins = spectrum.len(), "computed spectrum");

    let mut figure = base_figure(request);
    figure.series.push(
        Series::new(&spectrum.frequencies, &spectrum.values).with_style(request.style),
    );
    if let (SpectralMode::Psd, Some(mark)) = (request.mode, request.mark) {
        figure.markers.push(VerticalMarker {
            x: mark,
            label: Some(format!("x = {mark:.6}")),
        });
    }
    Ok((figure, peak))
}

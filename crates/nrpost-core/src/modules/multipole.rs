//! Klein-Gordon multipole series: plotted as a figure or saved as ASCII.

use super::PipelineExecutor;
use super::serialization::{format_table, timestamped_file_name, write_text_artifact};
use crate::common::RunConfig;
use crate::domain::{
    ArtifactKind, MultipoleKey, Pipeline, PipelineArtifact, PipelineResult, ReaderResult,
};
use crate::plot::{
    DEFAULT_FONT_SIZE, Figure, FigureOptions, FigureTarget, Series, SeriesColor, SeriesStyle,
    emit_figure,
};
use crate::simdir::{MultipoleSeries, SimDir};
use chrono::Local;
use tracing::{debug, info};

pub const MULTIPOLE_EXTENSION: &str = "ascii";

#[derive(Debug, Clone, PartialEq)]
pub struct PlotMultipoleRequest {
    pub key: MultipoleKey,
    /// Plot `ln|Phi|` instead of the real and imaginary parts.
    pub log_abs: bool,
    pub font_size: u32,
    pub figure: FigureOptions,
}

impl PlotMultipoleRequest {
    pub fn new(key: MultipoleKey) -> Self {
        Self {
            key,
            log_abs: false,
            font_size: DEFAULT_FONT_SIZE,
            figure: FigureOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveMultipoleRequest {
    pub key: MultipoleKey,
}

/// Looks a multipole up in the simulation directory, logging the
/// alternatives whenever one level of the key is missing.
fn read_multipole(config: &RunConfig, key: &MultipoleKey) -> ReaderResult<MultipoleSeries> {
    let simdir = SimDir::from_config(config)?;
    debug!("Prepared SimDir");

    let catalog = simdir.multipoles();
    debug!(radius = key.radius, "Using radius");
    if let Ok(radii) = catalog.radii(&key.name) {
        if !radii.contains(&key.radius) {
            debug!(?radii, "Available radii");
        } else if let Ok(available) = catalog.available_lm(&key.name, key.radius) {
            if !available.contains(&(key.l, key.m)) {
                debug!(?available, "Available multipoles");
            }
        }
    }
    catalog.load(key)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlotMultipolePipeline;

impl PipelineExecutor for PlotMultipolePipeline {
    type Request = PlotMultipoleRequest;
    type Output = PipelineArtifact;

    fn pipeline(&self) -> Pipeline {
        Pipeline::PlotMultipole
    }

    fn execute(
        &self,
        config: &RunConfig,
        request: &PlotMultipoleRequest,
    ) -> PipelineResult<PipelineArtifact> {
        let figname = request.figure.figname_or(request.key.file_stem());
        debug!(%figname, "Using figname");
        let target = FigureTarget::resolve(config, &request.figure, &figname)?;

        let series = read_multipole(config, &request.key)?;
        debug!(name = %request.key.name, "Plotting");
        let figure = multipole_figure(request, &series);

        let path = emit_figure(&figure, &target)?;
        info!(pipeline = %self.pipeline(), path = %path.display(), "rendered figure");
        Ok(PipelineArtifact::new(ArtifactKind::Figure, path))
    }
}

pub fn multipole_figure(request: &PlotMultipoleRequest, series: &MultipoleSeries) -> Figure {
    let key = &request.key;
    let lm = format!("{}{}", key.l, key.m);
    let mut figure = Figure {
        title: Some(format!("Klein-Gordon Φ({:.3}, t) Multipole", key.radius)),
        x_label: "t".to_string(),
        limits: request.figure.limits,
        font_size: request.font_size,
        ..Figure::default()
    };

    if request.log_abs {
        let log_abs: Vec<f64> = series.abs().into_iter().map(f64::ln).collect();
        figure.y_label = format!("ln|Φ_{lm}(r, t)|");
        figure.series.push(
            Series::new(&series.times, &log_abs)
                .with_style(SeriesStyle::Line)
                .with_color(SeriesColor::Black),
        );
    } else {
        figure.y_label = format!("Φ_{lm}(r, t)");
        figure.series.push(
            Series::new(&series.times, &series.real())
                .with_style(SeriesStyle::Line)
                .with_color(SeriesColor::Black)
                .with_label(format!("Re(Φ_{lm})")),
        );
        figure.series.push(
            Series::new(&series.times, &series.imag())
                .with_style(SeriesStyle::Line)
                .with_color(SeriesColor::Red)
                .with_label(format!("Im(Φ_{lm})")),
        );
    }
    figure
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SaveMultipolePipeline;

impl PipelineExecutor for SaveMultipolePipeline {
    type Request = SaveMultipoleRequest;
    type Output = PipelineArtifact;

    fn pipeline(&self) -> Pipeline {
        Pipeline::SaveMultipole
    }

    fn execute(
        &self,
        config: &RunConfig,
        request: &SaveMultipoleRequest,
    ) -> PipelineResult<PipelineArtifact> {
        let file_name = timestamped_file_name(
            &request.key.file_stem(),
            &Local::now(),
            MULTIPOLE_EXTENSION,
        );
        debug!(%file_name, "Using file name");

        let series = read_multipole(config, &request.key)?;
        let path = config.output_path(&file_name);
        debug!("Saving");
        write_text_artifact(&path, &multipole_table(&series))?;
        info!(
            pipeline = %self.pipeline(),
            path = %path.display(),
            samples = series.len(),
            "wrote multipole series"
        );
        Ok(PipelineArtifact::new(ArtifactKind::TimeSeries, path))
    }
}

/// `t Re Im` rows in `%.18e` format.
pub fn multipole_table(series: &MultipoleSeries) -> String {
    format_table(
        series
            .times
            .iter()
            .zip(&series.values)
            .map(|(time, value)| vec![*time, value.re, value.im]),
    )
}

use super::PipelineExecutor;
use crate::common::RunConfig;
use crate::domain::{ArtifactKind, Pipeline, PipelineArtifact, PipelineResult, Reduction};
use crate::plot::{
    AxisScale, DEFAULT_FONT_SIZE, Figure, FigureOptions, FigureTarget, Series, SeriesColor,
    SeriesStyle, emit_figure,
};
use crate::simdir::{SimDir, TimeSeries};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct PlotTimeseriesRequest {
    pub variable: String,
    pub reduction: Reduction,
    pub log_x: bool,
    pub log_y: bool,
    pub font_size: u32,
    pub figure: FigureOptions,
}

impl PlotTimeseriesRequest {
    pub fn new(variable: impl Into<String>, reduction: Reduction) -> Self {
        Self {
            variable: variable.into(),
            reduction,
            log_x: false,
            log_y: false,
            font_size: DEFAULT_FONT_SIZE,
            figure: FigureOptions::default(),
        }
    }

    /// `{variable}` for scalars, `{variable}_{reduction}` otherwise.
    pub fn default_figname(&self) -> String {
        match self.reduction {
            Reduction::Scalar => self.variable.clone(),
            reduction => format!("{}_{reduction}", self.variable),
        }
    }

    fn y_label(&self) -> String {
        match self.reduction {
            Reduction::Scalar => self.variable.clone(),
            reduction => format!("{reduction} {}", self.variable),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlotTimeseriesPipeline;

impl PipelineExecutor for PlotTimeseriesPipeline {
    type Request = PlotTimeseriesRequest;
    type Output = PipelineArtifact;

    fn pipeline(&self) -> Pipeline {
        Pipeline::PlotTimeseries
    }

    fn execute(
        &self,
        config: &RunConfig,
        request: &PlotTimeseriesRequest,
    ) -> PipelineResult<PipelineArtifact> {
        let figname = request.figure.figname_or(request.default_figname());
        debug!(%figname, "Using figname");
        let target = FigureTarget::resolve(config, &request.figure, &figname)?;

        debug!(variable = %request.variable, "Reading variable");
        let simdir = SimDir::from_config(config)?;
        debug!("Prepared SimDir");
        let catalog = simdir.timeseries(request.reduction)?;
        debug!(available = ?catalog.names(), "Available variables");
        let series = catalog.load(&request.variable)?;

        debug!("Plotting timeseries");
        let figure = timeseries_figure(request, &series);
        let path = emit_figure(&figure, &target)?;
        info!(pipeline = %self.pipeline(), path = %path.display(), "rendered figure");
        Ok(PipelineArtifact::new(ArtifactKind::Figure, path))
    }
}

pub fn timeseries_figure(request: &PlotTimeseriesRequest, series: &TimeSeries) -> Figure {
    let scale = |log: bool| if log { AxisScale::Log10 } else { AxisScale::Linear };
    Figure {
        x_label: "Simulation time".to_string(),
        y_label: request.y_label(),
        series: vec![
            Series::new(&series.times, &series.values)
                .with_style(SeriesStyle::Line)
                .with_color(SeriesColor::Black),
        ],
        x_scale: scale(request.log_x),
        y_scale: scale(request.log_y),
        limits: request.figure.limits,
        font_size: request.font_size,
        ..Figure::default()
    }
}

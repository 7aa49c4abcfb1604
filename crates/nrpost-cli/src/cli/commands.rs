use super::CliError;
use super::helpers::{RunFlags, init_logging, peak_report_lines};
use nrpost_core::common::RunConfig;
use nrpost_core::domain::{GridDimension, MultipoleKey, PointCoordinates, Reduction};
use nrpost_core::modules::{
    ExtractPointPipeline, ExtractPointRequest, PipelineExecutor, PlotMultipolePipeline,
    PlotMultipoleRequest, PlotTimeseriesPipeline, PlotTimeseriesRequest, SaveMultipolePipeline,
    SaveMultipoleRequest, SpectralMode, SpectralPipeline, SpectralRequest,
};
use nrpost_core::plot::{AxisLimits, DEFAULT_FONT_SIZE, FigureOptions, SeriesStyle};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(clap::Args)]
pub(super) struct ExtractPointArgs {
    /// Variable to save
    #[arg(long)]
    variable: String,

    /// Type of data
    #[arg(long = "type", default_value = "xyz", value_parser = clap::value_parser!(GridDimension))]
    dimension: GridDimension,

    /// Name of the output file (`.npz` for an archive, `.npy` otherwise)
    #[arg(long)]
    outname: Option<String>,

    /// The x value of the point to extract
    #[arg(short = 'x', long = "origin-x", alias = "origin_x", allow_hyphen_values = true)]
    origin_x: Option<f64>,

    /// The y value of the point to extract
    #[arg(short = 'y', long = "origin-y", alias = "origin_y", allow_hyphen_values = true)]
    origin_y: Option<f64>,

    /// The z value of the point to extract
    #[arg(short = 'z', long = "origin-z", alias = "origin_z", allow_hyphen_values = true)]
    origin_z: Option<f64>,

    #[command(flatten)]
    run: RunFlags,
}

#[derive(clap::Args, Default)]
pub(super) struct LimitFlags {
    /// Chop the x axis to start at this value
    #[arg(long, allow_hyphen_values = true)]
    xmin: Option<f64>,

    /// Chop the x axis to end at this value
    #[arg(long, allow_hyphen_values = true)]
    xmax: Option<f64>,

    /// Chop the y axis to start at this value
    #[arg(long, allow_hyphen_values = true)]
    ymin: Option<f64>,

    /// Chop the y axis to end at this value
    #[arg(long, allow_hyphen_values = true)]
    ymax: Option<f64>,
}

impl LimitFlags {
    fn limits(&self) -> AxisLimits {
        AxisLimits {
            xmin: self.xmin,
            xmax: self.xmax,
            ymin: self.ymin,
            ymax: self.ymax,
        }
    }
}

#[derive(clap::Args)]
pub(super) struct FigureFlags {
    /// Save the figure into the output directory instead of only showing it
    #[arg(long)]
    save: bool,

    /// Name of the figure, without extension
    #[arg(long)]
    figname: Option<String>,

    /// Extension of saved figures
    #[arg(long)]
    fig_extension: Option<String>,

    /// Base font size
    #[arg(long, default_value_t = DEFAULT_FONT_SIZE)]
    font_size: u32,

    #[command(flatten)]
    limits: LimitFlags,
}

impl FigureFlags {
    fn options(&self) -> FigureOptions {
        FigureOptions {
            figname: self.figname.clone(),
            limits: self.limits.limits(),
            save: self.save,
        }
    }
}

#[derive(clap::Subcommand)]
pub(super) enum PlotCommand {
    /// Plot y against x
    Plt(PltArgs),
    /// Plot the FFT magnitude of y sampled at x
    Fft(FftArgs),
    /// Plot the power spectral density of y sampled at x
    Psd(PsdArgs),
}

#[derive(clap::Args)]
pub(super) struct DatasetArgs {
    /// Column holding the x values
    #[arg(value_name = "x_axis")]
    x_axis: usize,

    /// Column holding the y values
    #[arg(value_name = "y_axis")]
    y_axis: usize,

    /// Text table or `.npy`/`.npz` array dump
    #[arg(value_name = "file")]
    file: PathBuf,

    /// Save the figure under this name in the output directory
    #[arg(long, value_name = "name")]
    save: Option<PathBuf>,

    /// The plot label on the x axis
    #[arg(long, default_value = "x")]
    xlabel: String,

    /// The plot label on the y axis
    #[arg(long, default_value = "y")]
    ylabel: String,

    #[command(flatten)]
    limits: LimitFlags,

    #[command(flatten)]
    run: RunFlags,
}

impl DatasetArgs {
    fn request(&self, mode: SpectralMode) -> SpectralRequest {
        let mut request = SpectralRequest::new(mode, &self.file, self.x_axis, self.y_axis);
        request.x_label = self.xlabel.clone();
        request.y_label = self.ylabel.clone();
        request.limits = self.limits.limits();
        request.save = self.save.clone();
        request
    }
}

#[derive(clap::Args)]
pub(super) struct PltArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// Plot |y| on a logarithmic y axis
    #[arg(long)]
    abslog: bool,

    /// Use lines instead of points
    #[arg(long)]
    lines: bool,
}

#[derive(clap::Args)]
pub(super) struct SpectralFlags {
    /// Only plot positive frequencies
    #[arg(long)]
    positive: bool,

    /// Shape of the Tukey window, in [0, 1]
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    alpha: f64,

    /// Apply the Savitzky-Golay smoothing filter (with --lines)
    #[arg(long)]
    smooth: bool,

    /// Use lines instead of points
    #[arg(long, conflicts_with = "linespoints")]
    lines: bool,

    /// Use lines and points
    #[arg(long)]
    linespoints: bool,
}

impl SpectralFlags {
    fn style(&self) -> SeriesStyle {
        if self.lines {
            SeriesStyle::Line
        } else if self.linespoints {
            SeriesStyle::LinesPoints
        } else {
            SeriesStyle::Points
        }
    }

    fn apply(&self, request: &mut SpectralRequest) {
        request.positive = self.positive;
        request.alpha = self.alpha;
        request.smooth = self.smooth;
        request.style = self.style();
    }
}

#[derive(clap::Args)]
pub(super) struct FftArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    #[command(flatten)]
    spectral: SpectralFlags,
}

#[derive(clap::Args)]
pub(super) struct PsdArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    #[command(flatten)]
    spectral: SpectralFlags,

    /// Compute and print the peak of the spectrum
    #[arg(long)]
    peak: bool,

    /// Mark this x value with a vertical line
    #[arg(long, allow_hyphen_values = true)]
    mark: Option<f64>,
}

#[derive(clap::Args)]
pub(super) struct MultipoleArgs {
    /// The actual name of the multipole grid function
    #[arg(long, default_value = "phi")]
    name: String,

    /// Radius of the multipole extraction
    #[arg(long)]
    radius: f64,

    /// Multipole number l
    #[arg(long, default_value_t = 0)]
    mult_l: u32,

    /// Multipole number m
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    mult_m: i32,
}

impl MultipoleArgs {
    fn key(&self) -> MultipoleKey {
        MultipoleKey::new(self.name.clone(), self.radius, self.mult_l, self.mult_m)
    }
}

#[derive(clap::Args)]
pub(super) struct PlotMultipoleArgs {
    #[command(flatten)]
    multipole: MultipoleArgs,

    /// Plot the natural log of |Phi| instead of its real and imaginary parts
    #[arg(long)]
    log_abs: bool,

    #[command(flatten)]
    figure: FigureFlags,

    #[command(flatten)]
    run: RunFlags,
}

#[derive(clap::Args)]
pub(super) struct SaveMultipoleArgs {
    #[command(flatten)]
    multipole: MultipoleArgs,

    #[command(flatten)]
    run: RunFlags,
}

#[derive(clap::Args)]
pub(super) struct PlotTimeseriesArgs {
    /// Variable to plot
    #[arg(long)]
    variable: String,

    /// Reduction to plot
    #[arg(
        long,
        default_value = "scalar",
        value_parser = clap::value_parser!(Reduction)
    )]
    reduction: Reduction,

    /// Use a logarithmic x axis
    #[arg(long)]
    logxaxis: bool,

    /// Use a logarithmic y axis
    #[arg(long)]
    logyaxis: bool,

    #[command(flatten)]
    figure: FigureFlags,

    #[command(flatten)]
    run: RunFlags,
}

fn prepare(run: &RunFlags, fig_extension: Option<&str>) -> Result<RunConfig, CliError> {
    let config = run.resolve(fig_extension)?;
    init_logging(config.verbose);
    debug!(
        datadir = %config.datadir.display(),
        outdir = %config.outdir.display(),
        "resolved run configuration"
    );
    Ok(config)
}

fn report_figure(path: &Path, saved: bool) {
    if saved {
        println!("Saved figure: {}", path.display());
    } else {
        println!("Figure written to {}", path.display());
    }
}

pub(super) fn run_extract_point_command(args: ExtractPointArgs) -> Result<i32, CliError> {
    let config = prepare(&args.run, None)?;
    let mut request = ExtractPointRequest::new(args.variable, args.dimension);
    request.coordinates = PointCoordinates::new(args.origin_x, args.origin_y, args.origin_z);
    request.outname = args.outname;

    let artifact = ExtractPointPipeline.execute(&config, &request)?;
    println!("Wrote {}", artifact.path.display());
    Ok(0)
}

pub(super) fn run_plot_command(command: PlotCommand) -> Result<i32, CliError> {
    let (dataset, request) = match &command {
        PlotCommand::Plt(args) => {
            let mut request = args.dataset.request(SpectralMode::Plot);
            request.abslog = args.abslog;
            if args.lines {
                request.style = SeriesStyle::Line;
            }
            (&args.dataset, request)
        }
        PlotCommand::Fft(args) => {
            let mut request = args.dataset.request(SpectralMode::Fft);
            args.spectral.apply(&mut request);
            (&args.dataset, request)
        }
        PlotCommand::Psd(args) => {
            let mut request = args.dataset.request(SpectralMode::Psd);
            args.spectral.apply(&mut request);
            request.peak = args.peak;
            request.mark = args.mark;
            (&args.dataset, request)
        }
    };

    let config = prepare(&dataset.run, None)?;
    let outcome = SpectralPipeline.execute(&config, &request)?;
    if let Some(peak) = &outcome.peak {
        for line in peak_report_lines(peak) {
            println!("{line}");
        }
    }
    report_figure(&outcome.artifact.path, outcome.saved);
    Ok(0)
}

pub(super) fn run_plot_multipole_command(args: PlotMultipoleArgs) -> Result<i32, CliError> {
    let config = prepare(&args.run, args.figure.fig_extension.as_deref())?;
    let request = PlotMultipoleRequest {
        key: args.multipole.key(),
        log_abs: args.log_abs,
        font_size: args.figure.font_size,
        figure: args.figure.options(),
    };

    let artifact = PlotMultipolePipeline.execute(&config, &request)?;
    report_figure(&artifact.path, request.figure.save);
    Ok(0)
}

pub(super) fn run_save_multipole_command(args: SaveMultipoleArgs) -> Result<i32, CliError> {
    let config = prepare(&args.run, None)?;
    let request = SaveMultipoleRequest {
        key: args.multipole.key(),
    };

    let artifact = SaveMultipolePipeline.execute(&config, &request)?;
    println!("Wrote {}", artifact.path.display());
    Ok(0)
}

pub(super) fn run_plot_timeseries_command(args: PlotTimeseriesArgs) -> Result<i32, CliError> {
    let config = prepare(&args.run, args.figure.fig_extension.as_deref())?;
    let mut request = PlotTimeseriesRequest::new(args.variable, args.reduction);
    request.log_x = args.logxaxis;
    request.log_y = args.logyaxis;
    request.font_size = args.figure.font_size;
    request.figure = args.figure.options();

    let artifact = PlotTimeseriesPipeline.execute(&config, &request)?;
    report_figure(&artifact.path, request.figure.save);
    Ok(0)
}

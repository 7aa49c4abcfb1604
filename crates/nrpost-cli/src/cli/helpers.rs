use super::CliError;
use anyhow::Context;
use nrpost_core::common::RunConfig;
use nrpost_core::numerics::PeakReport;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(clap::Args, Default)]
pub(super) struct RunFlags {
    /// Directory holding the simulation output
    #[arg(long)]
    datadir: Option<PathBuf>,

    /// Directory where output files are written
    #[arg(long)]
    outdir: Option<PathBuf>,

    /// Skip symlinked files while scanning the data directory
    #[arg(long)]
    ignore_symlinks: bool,

    /// Print debug progress messages
    #[arg(short = 'v', long)]
    verbose: bool,

    /// JSON run configuration whose keys act as defaults for these flags
    #[arg(long, value_name = "path")]
    config: Option<PathBuf>,
}

impl RunFlags {
    /// Seeds from `--config` when given and lets explicit flags win.
    pub(super) fn resolve(&self, fig_extension: Option<&str>) -> Result<RunConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_json_file(path)
                .with_context(|| format!("failed to load --config '{}'", path.display()))?,
            None => RunConfig::default(),
        };

        if let Some(datadir) = &self.datadir {
            config.datadir = datadir.clone();
        }
        if let Some(outdir) = &self.outdir {
            config.outdir = outdir.clone();
        }
        if let Some(extension) = fig_extension {
            config.fig_extension = extension.trim_start_matches('.').to_string();
        }
        config.ignore_symlinks |= self.ignore_symlinks;
        config.verbose |= self.verbose;
        Ok(config)
    }
}

/// Installs the stderr subscriber: `warn` by default, `debug` when verbose,
/// `RUST_LOG` overrides both. Later calls keep the first subscriber.
pub(super) fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub(super) fn peak_report_lines(peak: &PeakReport) -> Vec<String> {
    let neighbor = |value: Option<f64>| value.map_or_else(|| "none".to_string(), |v| v.to_string());
    let frequencies = peak
        .angular_frequencies
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    vec![
        format!("Peak values: {}", peak.value),
        format!("Peak frequencies: [{frequencies}]"),
        neighbor(peak.upper_neighbor),
        neighbor(peak.lower_neighbor),
    ]
}

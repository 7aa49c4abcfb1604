mod commands;
mod dispatch;
mod helpers;

use clap::Parser;
use dispatch::command_alias_from_program_name;
use nrpost_core::domain::PostError;

const PROGRAM_NAME: &str = "nrpost";

pub fn run_from_env() -> i32 {
    let mut args = std::env::args();
    let program_name = args.next().unwrap_or_else(|| PROGRAM_NAME.to_string());
    let remaining: Vec<String> = args.collect();

    match run_with_program_name(&program_name, remaining) {
        Ok(code) => code,
        Err(error) => {
            let post_error = error.as_post_error();
            eprintln!("{}", post_error.diagnostic_line());
            if let Some(summary_line) = post_error.fatal_exit_line() {
                eprintln!("{}", summary_line);
            }
            post_error.exit_code()
        }
    }
}

#[cfg(test)]
pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once(PROGRAM_NAME.to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn run_with_program_name(program_name: &str, args: Vec<String>) -> Result<i32, CliError> {
    let alias = command_alias_from_program_name(program_name);
    let full_args = std::iter::once(PROGRAM_NAME.to_string())
        .chain(alias.map(str::to_string))
        .chain(args)
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "nrpost",
    version,
    about = "Post-processing pipelines for numerical-relativity simulation output"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Save the value of a grid function at one point over all iterations
    ExtractPoint(commands::ExtractPointArgs),
    /// Plot a two-column dataset, its FFT or its power spectral density
    #[command(subcommand)]
    Plot(commands::PlotCommand),
    /// Plot a Klein-Gordon multipole at a given radius and (l, m)
    PlotMultipole(commands::PlotMultipoleArgs),
    /// Save a Klein-Gordon multipole at a given radius and (l, m) as ASCII
    SaveMultipole(commands::SaveMultipoleArgs),
    /// Plot a reduced time series as output by CarpetIOScalar
    PlotTimeseries(commands::PlotTimeseriesArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::ExtractPoint(args) => commands::run_extract_point_command(args),
        CliCommand::Plot(command) => commands::run_plot_command(command),
        CliCommand::PlotMultipole(args) => commands::run_plot_multipole_command(args),
        CliCommand::SaveMultipole(args) => commands::run_save_multipole_command(args),
        CliCommand::PlotTimeseries(args) => commands::run_plot_timeseries_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Pipeline(PostError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<PostError> for CliError {
    fn from(error: PostError) -> Self {
        Self::Pipeline(error)
    }
}

impl CliError {
    fn as_post_error(&self) -> PostError {
        match self {
            Self::Usage(message) => {
                PostError::invalid_argument("ARG.CLI_USAGE", message.trim_end().to_string())
            }
            Self::Pipeline(error) => error.clone(),
            Self::Internal(error) => PostError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CliError, run};
    use nrpost_core::domain::PostErrorCategory;

    #[test]
    fn help_exits_cleanly() {
        assert_eq!(run(["--help"]).expect("help should succeed"), 0);
        assert_eq!(run(["plot", "psd", "--help"]).expect("help should succeed"), 0);
    }

    #[test]
    fn unknown_subcommands_are_usage_errors() {
        let error = run(["plot", "spectrogram"]).expect_err("unknown plot kind");
        assert!(matches!(error, CliError::Usage(_)));
        let post_error = error.as_post_error();
        assert_eq!(post_error.category(), PostErrorCategory::InvalidArgument);
        assert_eq!(post_error.exit_code(), 2);
    }

    #[test]
    fn conflicting_styles_are_rejected() {
        let error = run(["plot", "fft", "0", "1", "data.txt", "--lines", "--linespoints"])
            .expect_err("lines and linespoints conflict");
        assert!(matches!(error, CliError::Usage(_)));
    }

    #[test]
    fn missing_coordinates_fail_before_reading_data() {
        let error = run([
            "extract-point",
            "--variable",
            "rho",
            "--type",
            "xy",
            "-x",
            "1.0",
            "--datadir",
            "/nonexistent/simulation",
        ])
        .expect_err("y coordinate is missing");
        let post_error = error.as_post_error();
        assert_eq!(post_error.code(), "ARG.POINT_COORDINATES");
        assert!(post_error.message().contains("-x <value> -y <value>"));
    }
}

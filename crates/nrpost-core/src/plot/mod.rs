//! Figure model and SVG rendering.
//!
//! Log axes are drawn by projecting the data onto `log10` positions and
//! labelling ticks with the original values, so every chart shares one linear
//! coordinate system.

mod figure;
mod render;

pub use figure::{
    AxisLimits, AxisScale, DEFAULT_FIGURE_SIZE, DEFAULT_FONT_SIZE, Figure, FigureFormat,
    FigureOptions, Series, SeriesColor, SeriesStyle, VerticalMarker,
};
pub use render::{render_svg, write_svg};

use crate::common::RunConfig;
use crate::domain::PostResult;
use std::path::{Path, PathBuf};

/// Where a finished figure goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FigureTarget {
    /// Written to the system temporary directory for the user to open.
    Show(PathBuf),
    /// Written to the output directory.
    Save(PathBuf),
}

impl FigureTarget {
    /// Saved figures go to `outdir/figname.ext` with the configured extension;
    /// shown figures always render SVG into the temporary directory.
    pub fn resolve(config: &RunConfig, options: &FigureOptions, figname: &str) -> PostResult<Self> {
        if options.save {
            let format: FigureFormat = config.fig_extension.parse()?;
            Ok(Self::Save(
                config.output_path(format!("{figname}.{}", format.extension())),
            ))
        } else {
            Ok(Self::show(figname))
        }
    }

    /// Saves under an explicit file name relative to the output directory.
    /// A name without an extension gets `.svg`.
    pub fn save_as(config: &RunConfig, file_name: &Path) -> PostResult<Self> {
        let path = config.output_path(file_name);
        match path.extension().and_then(|extension| extension.to_str()) {
            Some(extension) => {
                extension.parse::<FigureFormat>()?;
                Ok(Self::Save(path))
            }
            None => Ok(Self::Save(
                path.with_extension(FigureFormat::Svg.extension()),
            )),
        }
    }

    pub fn show(stem: &str) -> Self {
        Self::Show(
            std::env::temp_dir().join(format!("{stem}.{}", FigureFormat::Svg.extension())),
        )
    }

    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Show(path) | Self::Save(path) => path,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Save(_))
    }
}

/// Renders `figure` to `target` and returns the written path.
pub fn emit_figure(figure: &Figure, target: &FigureTarget) -> PostResult<PathBuf> {
    write_svg(figure, target.path())?;
    Ok(target.path().clone())
}

#[cfg(test)]
mod tests {
    use super::{FigureOptions, FigureTarget};
    use crate::common::RunConfig;
    use crate::domain::PostErrorCategory;
    use std::path::{Path, PathBuf};

    #[test]
    fn saved_figures_use_outdir_and_extension() {
        let config = RunConfig {
            outdir: PathBuf::from("plots"),
            ..RunConfig::default()
        };
        let options = FigureOptions {
            save: true,
            ..FigureOptions::default()
        };
        let target = FigureTarget::resolve(&config, &options, "phi_00_r10.0").unwrap();
        assert_eq!(target, FigureTarget::Save(PathBuf::from("plots/phi_00_r10.0.svg")));
    }

    #[test]
    fn shown_figures_land_in_the_temp_dir() {
        let config = RunConfig {
            fig_extension: "png".to_string(),
            ..RunConfig::default()
        };
        let target = FigureTarget::resolve(&config, &FigureOptions::default(), "rho").unwrap();
        assert_eq!(target, FigureTarget::Show(std::env::temp_dir().join("rho.svg")));
    }

    #[test]
    fn explicit_names_keep_or_gain_the_svg_extension() {
        let config = RunConfig::default();
        let target = FigureTarget::save_as(&config, Path::new("psd")).unwrap();
        assert_eq!(target.path(), &PathBuf::from("./psd.svg"));
        assert!(target.is_saved());

        let target = FigureTarget::save_as(&config, Path::new("/tmp/out/psd.svg")).unwrap();
        assert_eq!(target.path(), &PathBuf::from("/tmp/out/psd.svg"));

        let error = FigureTarget::save_as(&config, Path::new("psd.png")).unwrap_err();
        assert_eq!(error.code(), "ARG.FIG_EXTENSION");
    }

    #[test]
    fn unsupported_save_extension_is_rejected() {
        let config = RunConfig {
            fig_extension: "pdf".to_string(),
            ..RunConfig::default()
        };
        let options = FigureOptions {
            save: true,
            ..FigureOptions::default()
        };
        let error = FigureTarget::resolve(&config, &options, "rho").unwrap_err();
        assert_eq!(error.category(), PostErrorCategory::InvalidArgument);
    }
}

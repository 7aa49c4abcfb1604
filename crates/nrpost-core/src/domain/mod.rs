pub mod errors;

pub use errors::{
    ExitStatus, PipelineResult, PostError, PostErrorCategory, PostResult, ReaderResult,
};

use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pipeline {
    ExtractPoint,
    PlotData,
    PlotFft,
    PlotPsd,
    PlotMultipole,
    SaveMultipole,
    PlotTimeseries,
}

impl Pipeline {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExtractPoint => "EXTRACT_POINT",
            Self::PlotData => "PLOT",
            Self::PlotFft => "FFT",
            Self::PlotPsd => "PSD",
            Self::PlotMultipole => "PLOT_MULTIPOLE",
            Self::SaveMultipole => "SAVE_MULTIPOLE",
            Self::PlotTimeseries => "PLOT_TIMESERIES",
        }
    }
}

impl Display for Pipeline {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    ArrayDump,
    Figure,
    TimeSeries,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

impl PipelineArtifact {
    pub fn new(kind: ArtifactKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    pub const fn flag(self) -> &'static str {
        match self {
            Self::X => "-x <value>",
            Self::Y => "-y <value>",
            Self::Z => "-z <value>",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }
}

/// Spatial sampling of a grid function output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GridDimension {
    X,
    Y,
    Z,
    Xy,
    Xz,
    Yz,
    Xyz,
}

impl GridDimension {
    pub const ALL: [GridDimension; 7] = [
        Self::X,
        Self::Y,
        Self::Z,
        Self::Xy,
        Self::Xz,
        Self::Yz,
        Self::Xyz,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::Xy => "xy",
            Self::Xz => "xz",
            Self::Yz => "yz",
            Self::Xyz => "xyz",
        }
    }

    pub const fn axes(self) -> &'static [Axis] {
        match self {
            Self::X => &[Axis::X],
            Self::Y => &[Axis::Y],
            Self::Z => &[Axis::Z],
            Self::Xy => &[Axis::X, Axis::Y],
            Self::Xz => &[Axis::X, Axis::Z],
            Self::Yz => &[Axis::Y, Axis::Z],
            Self::Xyz => &[Axis::X, Axis::Y, Axis::Z],
        }
    }

    pub const fn rank(self) -> usize {
        self.axes().len()
    }

    fn usage_hint(self) -> String {
        let flags = self
            .axes()
            .iter()
            .map(|axis| axis.flag())
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "To extract 0D data from {}D {} data, use {}",
            self.rank(),
            self.as_str(),
            flags
        )
    }
}

impl Display for GridDimension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for GridDimension {
    type Err = PostError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|dimension| dimension.as_str() == token)
            .ok_or_else(|| {
                PostError::invalid_argument(
                    "ARG.GRID_DIMENSION",
                    format!("unknown grid dimension '{token}'; expected one of x, y, z, xy, xz, yz, xyz"),
                )
            })
    }
}

/// Optional point coordinates as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointCoordinates {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

impl PointCoordinates {
    pub fn new(x: Option<f64>, y: Option<f64>, z: Option<f64>) -> Self {
        Self { x, y, z }
    }

    pub fn get(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Picks the coordinates the dimension needs, in axis order. Extra
    /// coordinates are ignored.
    pub fn point_for(&self, dimension: GridDimension) -> PostResult<Vec<f64>> {
        dimension
            .axes()
            .iter()
            .map(|axis| self.get(*axis))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                PostError::invalid_argument("ARG.POINT_COORDINATES", dimension.usage_hint())
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reduction {
    Scalar,
    Minimum,
    Maximum,
    Norm1,
    Norm2,
    Average,
    InfNorm,
}

impl Reduction {
    pub const ALL: [Reduction; 7] = [
        Self::Scalar,
        Self::Minimum,
        Self::Maximum,
        Self::Norm1,
        Self::Norm2,
        Self::Average,
        Self::InfNorm,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
            Self::Norm1 => "norm1",
            Self::Norm2 => "norm2",
            Self::Average => "average",
            Self::InfNorm => "infnorm",
        }
    }

    /// Maps the reduction token found in a CarpetIOScalar file name.
    pub fn from_file_token(token: &str) -> Option<Self> {
        match token {
            "" | "scalars" => Some(Self::Scalar),
            "minimum" => Some(Self::Minimum),
            "maximum" => Some(Self::Maximum),
            "norm1" => Some(Self::Norm1),
            "norm2" => Some(Self::Norm2),
            "average" => Some(Self::Average),
            "infnorm" | "norm_inf" => Some(Self::InfNorm),
            _ => None,
        }
    }
}

impl Display for Reduction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for Reduction {
    type Err = PostError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|reduction| reduction.as_str() == token)
            .ok_or_else(|| {
                PostError::invalid_argument(
                    "ARG.REDUCTION",
                    format!("unknown reduction '{token}'"),
                )
            })
    }
}

/// Identifies a multipole coefficient series.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipoleKey {
    pub name: String,
    pub radius: f64,
    pub l: u32,
    pub m: i32,
}

impl MultipoleKey {
    pub fn new(name: impl Into<String>, radius: f64, l: u32, m: i32) -> Self {
        Self {
            name: name.into(),
            radius,
            l,
            m,
        }
    }

    /// `phi_00_r100` style stem shared by figure and time-series names.
    pub fn file_stem(&self) -> String {
        format!("{}_{}{}_r{}", self.name, self.l, self.m, format_float_token(self.radius))
    }
}

/// Renders a float the way Python's `str(float)` does for the values that
/// show up in file names (`100.0`, `1.5`, `-2.0`).
pub fn format_float_token(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1.0e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Axis, GridDimension, MultipoleKey, PointCoordinates, PostErrorCategory, Reduction,
        format_float_token,
    };

    #[test]
    fn every_dimension_rejects_missing_coordinates() {
        for dimension in GridDimension::ALL {
            for missing in dimension.axes() {
                let mut coordinates = PointCoordinates::new(Some(1.0), Some(2.0), Some(3.0));
                match missing {
                    Axis::X => coordinates.x = None,
                    Axis::Y => coordinates.y = None,
                    Axis::Z => coordinates.z = None,
                }
                let error = coordinates
                    .point_for(dimension)
                    .expect_err("missing coordinate should be rejected");
                assert_eq!(error.category(), PostErrorCategory::InvalidArgument);
                assert_eq!(error.code(), "ARG.POINT_COORDINATES");
            }
        }
    }

    #[test]
    fn required_coordinates_with_extras_are_accepted() {
        let coordinates = PointCoordinates::new(Some(1.0), Some(2.0), Some(3.0));
        assert_eq!(coordinates.point_for(GridDimension::X).unwrap(), vec![1.0]);
        assert_eq!(coordinates.point_for(GridDimension::Yz).unwrap(), vec![2.0, 3.0]);
        assert_eq!(
            coordinates.point_for(GridDimension::Xyz).unwrap(),
            vec![1.0, 2.0, 3.0]
        );

        let only_y = PointCoordinates::new(None, Some(-4.5), None);
        assert_eq!(only_y.point_for(GridDimension::Y).unwrap(), vec![-4.5]);
    }

    #[test]
    fn usage_hint_names_the_needed_flags() {
        let error = PointCoordinates::default()
            .point_for(GridDimension::Xy)
            .expect_err("empty point should be rejected");
        assert_eq!(
            error.message(),
            "To extract 0D data from 2D xy data, use -x <value> -y <value>"
        );
    }

    #[test]
    fn dimension_and_reduction_tokens_parse() {
        assert_eq!("xz".parse::<GridDimension>().unwrap(), GridDimension::Xz);
        assert!("xx".parse::<GridDimension>().is_err());
        assert_eq!("norm2".parse::<Reduction>().unwrap(), Reduction::Norm2);
        assert_eq!(Reduction::from_file_token("norm_inf"), Some(Reduction::InfNorm));
        assert_eq!(Reduction::from_file_token(""), Some(Reduction::Scalar));
        assert_eq!(Reduction::from_file_token("sum"), None);
    }

    #[test]
    fn multipole_stem_uses_python_float_rendering() {
        let key = MultipoleKey::new("phi", 100.0, 2, -1);
        assert_eq!(key.file_stem(), "phi_2-1_r100.0");
        assert_eq!(format_float_token(1.25), "1.25");
    }
}

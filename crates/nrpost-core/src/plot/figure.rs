use crate::domain::{PostError, PostResult};
use crate::numerics::finite_bounds;
use std::str::FromStr;

pub const DEFAULT_FONT_SIZE: u32 = 20;
pub const DEFAULT_FIGURE_SIZE: (u32, u32) = (1000, 800);

const AUTO_MARGIN_FRACTION: f64 = 0.05;

/// Image formats the renderer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FigureFormat {
    Svg,
}

impl FigureFormat {
    pub const ALL: [FigureFormat; 1] = [Self::Svg];

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
        }
    }
}

impl FromStr for FigureFormat {
    type Err = PostError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let normalized = token.trim_start_matches('.').to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|format| format.extension() == normalized)
            .ok_or_else(|| {
                PostError::invalid_argument(
                    "ARG.FIG_EXTENSION",
                    format!("unsupported figure extension '{token}'; supported: svg"),
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SeriesStyle {
    #[default]
    Line,
    Points,
    LinesPoints,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SeriesColor {
    #[default]
    Black,
    Red,
    Blue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AxisScale {
    #[default]
    Linear,
    Log10,
}

impl AxisScale {
    /// Position of `value` on the rendered axis; `None` when a logarithmic
    /// axis cannot show it.
    pub fn project(self, value: f64) -> Option<f64> {
        let projected = match self {
            Self::Linear => value,
            Self::Log10 if value > 0.0 => value.log10(),
            Self::Log10 => return None,
        };
        projected.is_finite().then_some(projected)
    }

    pub fn unproject(self, position: f64) -> f64 {
        match self {
            Self::Linear => position,
            Self::Log10 => 10.0_f64.powf(position),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    pub label: Option<String>,
    pub points: Vec<(f64, f64)>,
    pub style: SeriesStyle,
    pub color: SeriesColor,
}

impl Series {
    pub fn new(x: &[f64], y: &[f64]) -> Self {
        Self {
            points: x.iter().copied().zip(y.iter().copied()).collect(),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_style(mut self, style: SeriesStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_color(mut self, color: SeriesColor) -> Self {
        self.color = color;
        self
    }
}

/// Vertical guide line across the whole plot.
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalMarker {
    pub x: f64,
    pub label: Option<String>,
}

/// Explicit axis bounds; unset bounds keep the automatic ones.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisLimits {
    pub xmin: Option<f64>,
    pub xmax: Option<f64>,
    pub ymin: Option<f64>,
    pub ymax: Option<f64>,
}

/// Caller-facing figure choices shared by every plotting pipeline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FigureOptions {
    pub figname: Option<String>,
    pub limits: AxisLimits,
    pub save: bool,
}

impl FigureOptions {
    pub fn figname_or(&self, default: impl Into<String>) -> String {
        self.figname.clone().unwrap_or_else(|| default.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: Option<String>,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    pub markers: Vec<VerticalMarker>,
    pub x_scale: AxisScale,
    pub y_scale: AxisScale,
    pub limits: AxisLimits,
    pub font_size: u32,
    pub size: (u32, u32),
}

impl Default for Figure {
    fn default() -> Self {
        Self {
            title: None,
            x_label: String::new(),
            y_label: String::new(),
            series: Vec::new(),
            markers: Vec::new(),
            x_scale: AxisScale::Linear,
            y_scale: AxisScale::Linear,
            limits: AxisLimits::default(),
            font_size: DEFAULT_FONT_SIZE,
            size: DEFAULT_FIGURE_SIZE,
        }
    }
}

/// A series already projected onto the axes and stripped of points the axes
/// cannot show.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ProjectedSeries<'a> {
    pub(crate) source: &'a Series,
    pub(crate) points: Vec<(f64, f64)>,
}

/// Axis ranges in projected coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Frame {
    pub(crate) x: (f64, f64),
    pub(crate) y: (f64, f64),
}

impl Figure {
    pub fn has_legend(&self) -> bool {
        self.series.iter().any(|series| series.label.is_some())
            || self.markers.iter().any(|marker| marker.label.is_some())
    }

    pub(crate) fn projected_series(&self) -> Vec<ProjectedSeries<'_>> {
        self.series
            .iter()
            .map(|series| ProjectedSeries {
                source: series,
                points: series
                    .points
                    .iter()
                    .filter_map(|(x, y)| Some((self.x_scale.project(*x)?, self.y_scale.project(*y)?)))
                    .collect(),
            })
            .collect()
    }

    /// Data range of every drawable point padded by 5% on each side, then
    /// overridden bound by bound from the explicit limits.
    pub(crate) fn frame(&self, projected: &[ProjectedSeries<'_>]) -> PostResult<Frame> {
        let xs: Vec<f64> = projected
            .iter()
            .flat_map(|series| series.points.iter().map(|(x, _)| *x))
            .chain(self.markers.iter().filter_map(|marker| self.x_scale.project(marker.x)))
            .collect();
        let ys: Vec<f64> = projected
            .iter()
            .flat_map(|series| series.points.iter().map(|(_, y)| *y))
            .collect();

        let (Some(x_bounds), Some(y_bounds)) = (finite_bounds(&xs), finite_bounds(&ys)) else {
            return Err(PostError::invalid_input(
                "INPUT.EMPTY_FIGURE",
                "figure has no finite points to draw on the requested axes",
            ));
        };

        let x = resolve_axis(
            padded(x_bounds),
            self.limits.xmin,
            self.limits.xmax,
            self.x_scale,
            "x",
        )?;
        let y = resolve_axis(
            padded(y_bounds),
            self.limits.ymin,
            self.limits.ymax,
            self.y_scale,
            "y",
        )?;
        Ok(Frame { x, y })
    }
}

fn padded((low, high): (f64, f64)) -> (f64, f64) {
    let span = high - low;
    let pad = if span > 0.0 {
        span * AUTO_MARGIN_FRACTION
    } else if low != 0.0 {
        low.abs() * AUTO_MARGIN_FRACTION
    } else {
        1.0
    };
    (low - pad, high + pad)
}

fn resolve_axis(
    automatic: (f64, f64),
    min: Option<f64>,
    max: Option<f64>,
    scale: AxisScale,
    axis: &str,
) -> PostResult<(f64, f64)> {
    let explicit = |bound: Option<f64>, name: &str| -> PostResult<Option<f64>> {
        bound
            .map(|value| {
                scale.project(value).ok_or_else(|| {
                    PostError::invalid_argument(
                        "ARG.AXIS_LIMITS",
                        format!("{axis}{name} = {value} cannot be shown on a logarithmic axis"),
                    )
                })
            })
            .transpose()
    };

    let low = explicit(min, "min")?.unwrap_or(automatic.0);
    let high = explicit(max, "max")?.unwrap_or(automatic.1);
    if low >= high {
        return Err(PostError::invalid_argument(
            "ARG.AXIS_LIMITS",
            format!(
                "{axis} axis range is empty: [{}, {}]",
                scale.unproject(low),
                scale.unproject(high)
            ),
        ));
    }
    Ok((low, high))
}

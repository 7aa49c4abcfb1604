use super::figure::{AxisScale, Figure, Frame, ProjectedSeries, SeriesColor, SeriesStyle};
use crate::domain::{PostError, PostResult};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fs;
use std::path::Path;

const FONT_FAMILY: &str = "sans-serif";
const LINE_WIDTH: u32 = 2;
const POINT_RADIUS: u32 = 3;

impl SeriesColor {
    fn rgb(self) -> RGBColor {
        match self {
            Self::Black => BLACK,
            Self::Red => RED,
            Self::Blue => BLUE,
        }
    }
}

/// Renders `figure` as an SVG document.
pub fn render_svg(figure: &Figure) -> PostResult<String> {
    let projected = figure.projected_series();
    let frame = figure.frame(&projected)?;

    let mut document = String::new();
    {
        let root = SVGBackend::with_string(&mut document, figure.size).into_drawing_area();
        draw(&root, figure, &projected, frame).map_err(|error| {
            PostError::internal("RENDER.BACKEND", format!("failed to draw figure: {error}"))
        })?;
    }
    Ok(document)
}

/// Renders `figure` and writes it to `path`.
pub fn write_svg(figure: &Figure, path: &Path) -> PostResult<()> {
    let document = render_svg(figure)?;
    fs::write(path, document).map_err(|error| {
        PostError::io_system(
            "IO.FIGURE_WRITE",
            format!("failed to write figure '{}': {error}", path.display()),
        )
    })
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    projected: &[ProjectedSeries<'_>],
    frame: Frame,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let font_size = figure.font_size;
    let mut builder = ChartBuilder::on(root);
    builder
        .margin(20)
        .x_label_area_size(font_size * 3)
        .y_label_area_size(font_size * 5);
    if let Some(title) = &figure.title {
        builder.caption(title, (FONT_FAMILY, font_size));
    }
    let mut chart = builder.build_cartesian_2d(frame.x.0..frame.x.1, frame.y.0..frame.y.1)?;

    let x_ticks = |position: &f64| tick_label(figure.x_scale, *position);
    let y_ticks = |position: &f64| tick_label(figure.y_scale, *position);
    chart
        .configure_mesh()
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str())
        .label_style((FONT_FAMILY, font_size * 3 / 4))
        .axis_desc_style((FONT_FAMILY, font_size))
        .x_label_formatter(&x_ticks)
        .y_label_formatter(&y_ticks)
        .draw()?;

    for series in projected {
        let color = series.source.color.rgb();
        let points = series.points.clone();

        let annotation = match series.source.style {
            SeriesStyle::Line => {
                chart.draw_series(LineSeries::new(points, color.stroke_width(LINE_WIDTH)))?
            }
            SeriesStyle::Points => chart.draw_series(
                points
                    .into_iter()
                    .map(|point| Circle::new(point, POINT_RADIUS, color.filled())),
            )?,
            SeriesStyle::LinesPoints => chart.draw_series(
                LineSeries::new(points, color.stroke_width(LINE_WIDTH))
                    .point_size(POINT_RADIUS),
            )?,
        };
        if let Some(label) = &series.source.label {
            annotation
                .label(label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
    }

    for marker in &figure.markers {
        let Some(x) = figure.x_scale.project(marker.x) else {
            continue;
        };
        let annotation = chart.draw_series(std::iter::once(PathElement::new(
            vec![(x, frame.y.0), (x, frame.y.1)],
            RED.stroke_width(LINE_WIDTH),
        )))?;
        if let Some(label) = &marker.label {
            annotation
                .label(label.as_str())
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
        }
    }

    if figure.has_legend() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font((FONT_FAMILY, font_size * 3 / 4))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn tick_label(scale: AxisScale, position: f64) -> String {
    match scale {
        AxisScale::Linear => format_tick(position),
        AxisScale::Log10 => format!("{:.1e}", scale.unproject(position)),
    }
}

/// Short tick text: plain decimals for moderate magnitudes, scientific
/// notation otherwise.
fn format_tick(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1.0e-3..1.0e4).contains(&magnitude) {
        return format!("{value:.2e}");
    }
    let text = format!("{value:.4}");
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{format_tick, render_svg, write_svg};
    use crate::plot::{AxisScale, Figure, Series, SeriesColor, SeriesStyle, VerticalMarker};
    use std::fs;
    use tempfile::TempDir;

    fn labelled_figure() -> Figure {
        let x: Vec<f64> = (0..50).map(|i| i as f64 * 0.1).collect();
        let y: Vec<f64> = x.iter().map(|t| t.sin()).collect();
        Figure {
            title: Some("Klein-Gordon multipole".to_string()),
            x_label: "t".to_string(),
            y_label: "value".to_string(),
            series: vec![
                Series::new(&x, &y).with_label("Re"),
                Series::new(&x, &x)
                    .with_label("Im")
                    .with_color(SeriesColor::Red)
                    .with_style(SeriesStyle::LinesPoints),
            ],
            markers: vec![VerticalMarker {
                x: 1.5,
                label: Some("x = 1.5".to_string()),
            }],
            ..Figure::default()
        }
    }

    #[test]
    fn svg_document_contains_labels_and_legend() {
        let document = render_svg(&labelled_figure()).expect("figure should render");
        assert!(document.contains("<svg"));
        assert!(document.contains("Klein-Gordon multipole"));
        let text_lines: Vec<&str> = document.lines().map(str::trim).collect();
        assert!(text_lines.contains(&"Re"));
        assert!(text_lines.contains(&"Im"));
        assert!(document.contains("x = 1.5"));
    }

    #[test]
    fn log_axes_and_points_render() {
        let mut figure = labelled_figure();
        figure.series[0].style = SeriesStyle::Points;
        figure.x_scale = AxisScale::Log10;
        assert!(render_svg(&figure).is_ok());
    }

    #[test]
    fn figures_are_written_to_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("figure.svg");
        write_svg(&labelled_figure(), &path).expect("figure should be written");
        let document = fs::read_to_string(&path).unwrap();
        assert!(document.contains("</svg>"));

        let missing = temp.path().join("absent").join("figure.svg");
        let error = write_svg(&labelled_figure(), &missing).expect_err("parent is missing");
        assert_eq!(error.code(), "IO.FIGURE_WRITE");
    }

    #[test]
    fn tick_labels_are_compact() {
        assert_eq!(format_tick(0.5), "0.5");
        assert_eq!(format_tick(2.0), "2");
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(12345.0), "1.23e4");
        assert_eq!(format_tick(-0.00001), "-1.00e-5");
    }
}

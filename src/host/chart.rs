//! SVG chart rendering.
//!
//! Bar and line charts over one x column and one numeric y column: a linear
//! y scale with "nice" ticks, a band scale for bar positions, grid lines,
//! axis rules and labels, and a title. Geometry is built with `kurbo` and
//! serialized directly to SVG, which keeps the output self-contained (no
//! font rasterization, no raster encoder).

use std::fmt::Write as _;

use anyhow::{bail, ensure, Result};
use kurbo::{BezPath, Line, Point, Rect};

use crate::lang::ast::ChartKind;
use crate::lang::caps::ChartRequest;
use crate::table::Value;

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_BOTTOM: f64 = 64.0;
const TICK_COUNT: usize = 6;
const TICK_LEN: f64 = 6.0;
const MAX_X_LABELS: usize = 16;

const MARK_COLOR: &str = "#4682b4";
const GRID_COLOR: &str = "#cccccc";
const AXIS_COLOR: &str = "#333333";

/// A linear mapping from a continuous domain to a continuous range
struct ScaleLinear {
    domain: (f64, f64),
    range: (f64, f64),
}

impl ScaleLinear {
    fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    fn map(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }

        r0 + (x - d0) / (d1 - d0) * (r1 - r0)
    }
}

/// A discrete band scale for bar positions
struct ScaleBand {
    range: (f64, f64),
    count: usize,
    padding_inner: f64,
    padding_outer: f64,
}

impl ScaleBand {
    fn new(range: (f64, f64), count: usize) -> Self {
        Self {
            range,
            count,
            padding_inner: 0.1,
            padding_outer: 0.1,
        }
    }

    fn band_width(&self) -> f64 {
        let n = self.count as f64;
        if n <= 0.0 {
            return 0.0;
        }

        let span = (self.range.1 - self.range.0).abs();
        let denom = n + self.padding_inner * (n - 1.0) + 2.0 * self.padding_outer;
        if denom == 0.0 {
            0.0
        } else {
            span / denom
        }
    }

    /// Left edge of the band at `index`
    fn x(&self, index: usize) -> f64 {
        let bw = self.band_width();
        let step = bw * (1.0 + self.padding_inner);

        self.range.0.min(self.range.1) + bw * self.padding_outer + step * index as f64
    }

    fn center(&self, index: usize) -> f64 {
        self.x(index) + self.band_width() / 2.0
    }
}

/// Evenly spaced tick values covering `[min, max]` on round-number steps
fn nice_ticks(mut min: f64, mut max: f64, count: usize) -> Vec<f64> {
    if min > max {
        std::mem::swap(&mut min, &mut max);
    }
    if min == max {
        return vec![min];
    }

    let step = nice_step((max - min) / count.max(1) as f64);
    if step == 0.0 {
        return vec![min, max];
    }

    let start = (min / step).floor() * step;
    let stop = (max / step).ceil() * step;
    let n = ((stop - start) / step).round() as usize;

    (0..=n).map(|i| start + step * i as f64).collect()
}

/// Round a raw step up to 1, 2 or 5 times a power of ten
fn nice_step(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }

    let base = 10_f64.powf(step.log10().floor());
    let error = step / base;
    let nice = if error >= 7.5 {
        10.0
    } else if error >= 3.5 {
        5.0
    } else if error >= 1.5 {
        2.0
    } else {
        1.0
    };

    nice * base
}

/// Format a tick value with just enough decimals for its step
fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 || step <= 0.0 {
        0
    } else {
        (-step.log10()).ceil() as usize
    };

    format!("{:.*}", decimals.min(6), value)
}

fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }

    escaped
}

/// The plottable rows of a request: label per row, numeric y, numeric x
/// when every kept x cell is a number
struct Series {
    labels: Vec<String>,
    xs: Option<Vec<f64>>,
    ys: Vec<f64>,
}

fn series(request: &ChartRequest<'_>) -> Result<Series> {
    let mut labels = Vec::new();
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut numeric_x = true;

    for (x, y) in request.x.iter().zip(request.y.iter()) {
        let y = match y {
            Value::Number(n) => *n,
            // Rows with a missing coordinate are left out of the chart
            Value::Missing => continue,
            Value::Str(_) => bail!(
                "column '{}' contains non-numeric values",
                request.y_label
            ),
        };
        if x.is_missing() {
            continue;
        }

        match x.as_number() {
            Some(n) => xs.push(n),
            None => numeric_x = false,
        }
        labels.push(x.to_string());
        ys.push(y);
    }

    ensure!(!ys.is_empty(), "nothing to plot: every row has a missing value");

    Ok(Series {
        labels,
        xs: if numeric_x { Some(xs) } else { None },
        ys,
    })
}

/// Render a chart request into SVG bytes
pub fn render(request: &ChartRequest<'_>) -> Result<Vec<u8>> {
    let series = series(request)?;
    let plot = Rect::new(
        MARGIN_LEFT,
        MARGIN_TOP,
        WIDTH - MARGIN_RIGHT,
        HEIGHT - MARGIN_BOTTOM,
    );

    // Bars stand on a zero baseline, lines float on the data extent
    let mut y_min = series.ys.iter().cloned().fold(f64::INFINITY, f64::min);
    let mut y_max = series.ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if let ChartKind::Bar = request.kind {
        y_min = y_min.min(0.0);
        y_max = y_max.max(0.0);
    }
    if y_min == y_max {
        y_min -= 1.0;
        y_max += 1.0;
    }

    let ticks = nice_ticks(y_min, y_max, TICK_COUNT);
    let domain = (
        ticks.first().copied().unwrap_or(y_min).min(y_min),
        ticks.last().copied().unwrap_or(y_max).max(y_max),
    );
    let tick_step = if ticks.len() > 1 { ticks[1] - ticks[0] } else { 1.0 };
    let y_scale = ScaleLinear::new(domain, (plot.max_y(), plot.min_y()));

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        WIDTH, HEIGHT, WIDTH, HEIGHT
    );
    let _ = writeln!(
        svg,
        r#"<rect x="0" y="0" width="{}" height="{}" fill="white"/>"#,
        WIDTH, HEIGHT
    );

    // Title
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle" font-family="sans-serif" font-size="16">{}</text>"#,
        WIDTH / 2.0,
        MARGIN_TOP / 2.0 + 6.0,
        xml_escape(&request.title)
    );

    // Horizontal grid lines and y tick labels
    for tick in &ticks {
        if *tick < domain.0 || *tick > domain.1 {
            continue;
        }

        let y = y_scale.map(*tick);
        if request.grid {
            let grid = Line::new(Point::new(plot.min_x(), y), Point::new(plot.max_x(), y));
            let _ = writeln!(
                svg,
                r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="1"/>"#,
                grid.p0.x, grid.p0.y, grid.p1.x, grid.p1.y, GRID_COLOR
            );
        }

        let _ = writeln!(
            svg,
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="1"/>"#,
            plot.min_x() - TICK_LEN,
            y,
            plot.min_x(),
            y,
            AXIS_COLOR
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-family="sans-serif" font-size="11">{}</text>"#,
            plot.min_x() - TICK_LEN - 4.0,
            y + 4.0,
            format_tick(*tick, tick_step)
        );
    }

    // Marks
    match request.kind {
        ChartKind::Bar => {
            let bands = ScaleBand::new((plot.min_x(), plot.max_x()), series.ys.len());
            let baseline = y_scale.map(0.0_f64.max(domain.0).min(domain.1));

            for (i, y) in series.ys.iter().enumerate() {
                let top = y_scale.map(*y);
                let bar = Rect::new(
                    bands.x(i),
                    top.min(baseline),
                    bands.x(i) + bands.band_width(),
                    top.max(baseline),
                );
                let _ = writeln!(
                    svg,
                    r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
                    bar.min_x(),
                    bar.min_y(),
                    bar.width(),
                    bar.height(),
                    MARK_COLOR
                );
            }

            write_x_labels(&mut svg, &series.labels, &plot, |i| bands.center(i));
        }
        ChartKind::Line => {
            let positions: Vec<f64> = match &series.xs {
                Some(xs) => {
                    let mut x_min = xs.iter().cloned().fold(f64::INFINITY, f64::min);
                    let mut x_max = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                    if x_min == x_max {
                        x_min -= 1.0;
                        x_max += 1.0;
                    }
                    let x_scale =
                        ScaleLinear::new((x_min, x_max), (plot.min_x(), plot.max_x()));
                    xs.iter().map(|x| x_scale.map(*x)).collect()
                }
                // Categorical x: evenly spaced in row order
                None => {
                    let bands = ScaleBand::new((plot.min_x(), plot.max_x()), series.ys.len());
                    (0..series.ys.len()).map(|i| bands.center(i)).collect()
                }
            };

            let mut path = BezPath::new();
            for (i, (x, y)) in positions.iter().zip(series.ys.iter()).enumerate() {
                let p = Point::new(*x, y_scale.map(*y));
                if i == 0 {
                    path.move_to(p);
                } else {
                    path.line_to(p);
                }
            }
            let _ = writeln!(
                svg,
                r#"<path d="{}" fill="none" stroke="{}" stroke-width="2"/>"#,
                path.to_svg(),
                MARK_COLOR
            );

            write_x_labels(&mut svg, &series.labels, &plot, |i| positions[i]);
        }
    }

    // Axis rules
    let _ = writeln!(
        svg,
        r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="1"/>"#,
        plot.min_x(),
        plot.min_y(),
        plot.min_x(),
        plot.max_y(),
        AXIS_COLOR
    );
    let _ = writeln!(
        svg,
        r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="1"/>"#,
        plot.min_x(),
        plot.max_y(),
        plot.max_x(),
        plot.max_y(),
        AXIS_COLOR
    );

    // Axis titles
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-family="sans-serif" font-size="13">{}</text>"#,
        (plot.min_x() + plot.max_x()) / 2.0,
        HEIGHT - 12.0,
        xml_escape(request.x_label)
    );
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-family="sans-serif" font-size="13" transform="rotate(-90 {:.1} {:.1})">{}</text>"#,
        18.0,
        (plot.min_y() + plot.max_y()) / 2.0,
        18.0,
        (plot.min_y() + plot.max_y()) / 2.0,
        xml_escape(request.y_label)
    );

    let _ = writeln!(svg, "</svg>");

    Ok(svg.into_bytes())
}

/// Write tick labels under the x axis, thinned so at most [`MAX_X_LABELS`]
/// appear
fn write_x_labels<F>(svg: &mut String, labels: &[String], plot: &Rect, position: F)
where
    F: Fn(usize) -> f64,
{
    let stride = (labels.len() + MAX_X_LABELS - 1) / MAX_X_LABELS.max(1);
    for (i, label) in labels.iter().enumerate() {
        if i % stride.max(1) != 0 {
            continue;
        }

        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-family="sans-serif" font-size="11">{}</text>"#,
            position(i),
            plot.max_y() + 18.0,
            xml_escape(label)
        );
    }
}

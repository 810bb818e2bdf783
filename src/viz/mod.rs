//! Visualization: render the daily chart and the marker map to **SVG** or **PNG**.
//!
//! - Output format follows the file extension (`.svg`, anything else is a bitmap)
//! - Locale-aware tick labels (`30,000` vs `30.000`) and thousands/millions axis scaling
//! - The map uses the same projection as [`crate::view::Viewport`], so a file and the GUI agree

pub mod text;
pub mod types;
pub mod util;

pub use types::{ChartKind, DEFAULT_CHART_SIZE, DEFAULT_MAP_SIZE};

use crate::format::{MARKER_FILL_OPACITY, metric_color};
use crate::models::MetricKind;
use crate::view::MapView;
use anyhow::{Result, anyhow};
use chrono::{Duration, NaiveDate};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::{AreaSeries, LineSeries};
use plotters::style::FontFamily;

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::Path;
use std::sync::Once;

use text::truncate_to_width;
use types::GRATICULE_STEP_DEG;
use util::{choose_axis_scale, compute_left_label_area_px, map_locale, plot_color, y_tick_label};

/// One-time registration for a fallback "sans-serif" font when using the `ab_glyph` text path.
/// Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
    });
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|e| e.eq_ignore_ascii_case("svg"))
        .unwrap_or(false)
}

/// Convenience: English labels, filled area chart.
pub fn plot_daily<P: AsRef<Path>>(
    series: &[(NaiveDate, i64)],
    metric: MetricKind,
    out_path: P,
    width: u32,
    height: u32,
) -> Result<()> {
    plot_chart(
        series,
        metric,
        out_path,
        width,
        height,
        "en",
        ChartKind::Area,
    )
}

/// Render a daily-new series of `metric`.
pub fn plot_chart<P: AsRef<Path>>(
    series: &[(NaiveDate, i64)],
    metric: MetricKind,
    out_path: P,
    width: u32,
    height: u32,
    locale_tag: &str,
    kind: ChartKind,
) -> Result<()> {
    if series.is_empty() {
        return Err(anyhow!("no data to plot"));
    }
    ensure_fonts_registered();
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();

    if is_svg(out_path) {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_chart(root, series, metric, locale_tag, kind)
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_chart(root, series, metric, locale_tag, kind)
    }
}

fn draw_chart<DB>(
    root: DrawingArea<DB, Shift>,
    series: &[(NaiveDate, i64)],
    metric: MetricKind,
    locale_tag: &str,
    kind: ChartKind,
) -> Result<()>
where
    DB: DrawingBackend,
{
    const MARGIN: u32 = 16;
    let locale = map_locale(locale_tag);
    let first_day = series[0].0;
    let day_x = |d: NaiveDate| (d - first_day).num_days() as f64;

    let x_max = day_x(series[series.len() - 1].0).max(1.0);
    let min_val = series.iter().map(|(_, v)| *v).min().unwrap_or(0).min(0) as f64;
    let mut max_val = series.iter().map(|(_, v)| *v).max().unwrap_or(0).max(0) as f64;
    if (max_val - min_val).abs() < f64::EPSILON {
        max_val += 1.0;
    }

    let (yscale, scale_word) = choose_axis_scale(min_val.abs().max(max_val.abs()));
    let scaled = yscale > 1.0;
    let y_axis_title = if scale_word.is_empty() {
        format!("New {metric}")
    } else {
        format!("New {metric} ({scale_word})")
    };

    let x_label_fmt = |x: &f64| {
        (first_day + Duration::days(x.round() as i64))
            .format("%b %d")
            .to_string()
    };
    let y_label_fmt = |v: &f64| y_tick_label(*v, scaled, locale);
    let y_label_count = 10usize;
    let left_label_width_px = compute_left_label_area_px(
        min_val / yscale,
        max_val / yscale,
        y_label_count,
        12,
        |v| y_tick_label(v, scaled, locale),
    );

    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(MARGIN)
        .caption(
            format!("Worldwide New {metric}"),
            (FontFamily::SansSerif, 24),
        )
        .set_label_area_size(LabelAreaPosition::Left, left_label_width_px)
        .set_label_area_size(LabelAreaPosition::Bottom, 56)
        .build_cartesian_2d(0f64..x_max, (min_val / yscale)..(max_val / yscale))
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc(y_axis_title)
        .x_labels(8)
        .y_labels(y_label_count)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 16))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let color = plot_color(metric_color(metric));
    let points: Vec<(f64, f64)> = series
        .iter()
        .map(|(d, v)| (day_x(*d), *v as f64 / yscale))
        .collect();

    match kind {
        ChartKind::Line => {
            let style = ShapeStyle {
                color: color.to_rgba(),
                filled: false,
                stroke_width: 2,
            };
            chart
                .draw_series(LineSeries::new(points, style))
                .map_err(|e| anyhow!("{:?}", e))?;
        }
        ChartKind::Area => {
            let fill = color.mix(0.5).filled();
            let border = color.stroke_width(2);
            chart
                .draw_series(AreaSeries::new(points, 0.0, fill).border_style(border))
                .map_err(|e| anyhow!("{:?}", e))?;
        }
    }

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Render the marker map of `view` on a canvas centered on its viewport.
pub fn render_map<P: AsRef<Path>>(view: &MapView, out_path: P, width: u32, height: u32) -> Result<()> {
    if view.markers.is_empty() {
        return Err(anyhow!("no data to plot"));
    }
    ensure_fonts_registered();
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();

    if is_svg(out_path) {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_map(root, view)
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_map(root, view)
    }
}

/// Ocean background.
const SEA: RGBColor = RGBColor(170, 211, 223);
/// Number of largest markers that get a name label.
const LABELLED_MARKERS: usize = 5;

fn draw_map<DB>(root: DrawingArea<DB, Shift>, view: &MapView) -> Result<()>
where
    DB: DrawingBackend,
{
    let (w, h) = root.dim_in_pixel();
    let vp = view.viewport;
    let (lng_min, lng_max, lat_min, lat_max) = vp.bounds(w as f64, h as f64);

    root.fill(&SEA).map_err(|e| anyhow!("{:?}", e))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(0)
        .build_cartesian_2d(lng_min..lng_max, lat_min..lat_max)
        .map_err(|e| anyhow!("{:?}", e))?;

    // Graticule
    let grid = WHITE.mix(0.6).stroke_width(1);
    let mut m = (lng_min / GRATICULE_STEP_DEG).ceil() * GRATICULE_STEP_DEG;
    while m <= lng_max {
        chart
            .draw_series(LineSeries::new(vec![(m, lat_min), (m, lat_max)], grid))
            .map_err(|e| anyhow!("{:?}", e))?;
        m += GRATICULE_STEP_DEG;
    }
    let mut p = (lat_min / GRATICULE_STEP_DEG).ceil() * GRATICULE_STEP_DEG;
    while p <= lat_max {
        chart
            .draw_series(LineSeries::new(vec![(lng_min, p), (lng_max, p)], grid))
            .map_err(|e| anyhow!("{:?}", e))?;
        p += GRATICULE_STEP_DEG;
    }

    let color = plot_color(metric_color(view.metric));
    let fill = color.mix(MARKER_FILL_OPACITY).filled();
    let outline = color.stroke_width(1);

    let mut sized: Vec<(f64, f64, i32, &str)> = view
        .markers
        .iter()
        .filter(|m| m.style.radius > 0.0)
        .map(|m| {
            let r = vp.meters_to_pixels(m.style.radius).round().max(1.0) as i32;
            let name = m.tooltip.lines().next().unwrap_or_default();
            (vp.unwrap_lng(m.position.lng), m.position.lat, r, name)
        })
        .collect();
    // Big circles first so small ones stay on top.
    sized.sort_by(|a, b| b.2.cmp(&a.2));

    chart
        .draw_series(
            sized
                .iter()
                .map(|(x, y, r, _)| Circle::new((*x, *y), *r, fill)),
        )
        .map_err(|e| anyhow!("{:?}", e))?;
    chart
        .draw_series(
            sized
                .iter()
                .map(|(x, y, r, _)| Circle::new((*x, *y), *r, outline)),
        )
        .map_err(|e| anyhow!("{:?}", e))?;

    for (x, y, _, name) in sized.iter().take(LABELLED_MARKERS) {
        let label = truncate_to_width(name, 12, 140);
        chart
            .draw_series(std::iter::once(Text::new(
                label,
                (*x, *y),
                (FontFamily::SansSerif, 12),
            )))
            .map_err(|e| anyhow!("{:?}", e))?;
    }

    root.draw(&Text::new(
        format!("COVID-19 {} by country", view.metric),
        (12, 12),
        (FontFamily::SansSerif, 18),
    ))
    .map_err(|e| anyhow!("{:?}", e))?;

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

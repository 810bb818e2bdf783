//! Display formatting for counters and map marker styling.

use crate::models::MetricKind;
use num_format::{Locale, ToFormattedString};
use serde::{Deserialize, Serialize};

/// Opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Fill opacity used for map markers.
pub const MARKER_FILL_OPACITY: f64 = 0.4;

/// Palette entry and radius multiplier (meters per sqrt(count)) for each metric.
const CASES: (Rgb, f64) = (Rgb::new(0xCC, 0x10, 0x34), 800.0);
const RECOVERED: (Rgb, f64) = (Rgb::new(0x7D, 0xD7, 0x1D), 1200.0);
const DEATHS: (Rgb, f64) = (Rgb::new(0x55, 0x55, 0x55), 2000.0);

fn palette(metric: MetricKind) -> (Rgb, f64) {
    match metric {
        MetricKind::Cases => CASES,
        MetricKind::Recovered => RECOVERED,
        MetricKind::Deaths => DEATHS,
    }
}

/// Fixed color for a metric.
pub fn metric_color(metric: MetricKind) -> Rgb {
    palette(metric).0
}

/// Format a counter for the summary cards and table.
///
/// `None` renders as a bare `"0"`; any value, zero included, gets a leading `+` and
/// comma thousands separators: `1234` -> `"+1,234"`.
pub fn pretty_print_stat(value: Option<u64>) -> String {
    match value {
        Some(v) => format!("+{}", v.to_formatted_string(&Locale::en)),
        None => "0".to_string(),
    }
}

/// Plain total with thousands separators and no sign: `1234` -> `"1,234"`, `None` -> `"0"`.
pub fn format_total(value: Option<u64>) -> String {
    value.unwrap_or(0).to_formatted_string(&Locale::en)
}

/// Circle styling for one map marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    /// Radius in meters on the ground.
    pub radius: f64,
    pub fill_color: Rgb,
}

/// Radius grows with the square root of the count so small and huge outbreaks both stay
/// readable; the color depends only on the metric.
pub fn marker_style(case_count: Option<u64>, metric: MetricKind) -> MarkerStyle {
    let (fill_color, multiplier) = palette(metric);
    let count = case_count.unwrap_or(0) as f64;
    MarkerStyle {
        radius: count.sqrt() * multiplier,
        fill_color,
    }
}

//! Widget-facing data: what the selector, summary cards, table, map and chart consume.
//!
//! Everything here is derived from fetched records on demand and never mutated in place.
//! The CLI prints these structures; the GUI paints them.

use crate::format::{MarkerStyle, Rgb, format_total, marker_style, metric_color, pretty_print_stat};
use crate::models::{Coordinates, CountryStat, Counts, MetricKind};
use crate::stats::sort_descending_by_cases;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// Selector value meaning "no specific country".
pub const WORLDWIDE: &str = "worldwide";

/// Default map center (mid-Atlantic, so the Americas, Europe and Africa are in view).
pub const WORLD_CENTER: Coordinates = Coordinates::new(34.80746, -40.4796);
pub const WORLD_ZOOM: u8 = 3;
/// Zoom applied when a single country is selected.
pub const COUNTRY_ZOOM: u8 = 4;

/// Rough length of one degree of latitude.
const METERS_PER_DEGREE: f64 = 111_320.0;
/// Tile size of the slippy-map convention the zoom levels refer to.
const TILE_PX: f64 = 256.0;

/// Map center and zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: Coordinates,
    pub zoom: u8,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::world()
    }
}

impl Viewport {
    pub fn world() -> Self {
        Self {
            center: WORLD_CENTER,
            zoom: WORLD_ZOOM,
        }
    }

    pub fn country(center: Coordinates) -> Self {
        Self {
            center,
            zoom: COUNTRY_ZOOM,
        }
    }

    /// Degrees of longitude (and, in this equirectangular projection, latitude) per pixel.
    pub fn degrees_per_pixel(&self) -> f64 {
        360.0 / (TILE_PX * 2f64.powi(self.zoom as i32))
    }

    /// Shift `lng` by whole turns so it lies within 180 degrees of the center.
    pub fn unwrap_lng(&self, lng: f64) -> f64 {
        let mut d = lng - self.center.lng;
        while d > 180.0 {
            d -= 360.0;
        }
        while d < -180.0 {
            d += 360.0;
        }
        self.center.lng + d
    }

    /// Pixel position of `pos` on a `width` x `height` canvas centered on the viewport.
    pub fn project(&self, pos: Coordinates, width: f64, height: f64) -> (f64, f64) {
        let dpp = self.degrees_per_pixel();
        let x = width / 2.0 + (self.unwrap_lng(pos.lng) - self.center.lng) / dpp;
        let y = height / 2.0 - (pos.lat - self.center.lat) / dpp;
        (x, y)
    }

    /// Convert a ground distance to pixels at this zoom.
    pub fn meters_to_pixels(&self, meters: f64) -> f64 {
        meters / (METERS_PER_DEGREE * self.degrees_per_pixel())
    }

    /// `(lng_min, lng_max, lat_min, lat_max)` visible on a canvas of the given size.
    pub fn bounds(&self, width: f64, height: f64) -> (f64, f64, f64, f64) {
        let dpp = self.degrees_per_pixel();
        let half_w = width / 2.0 * dpp;
        let half_h = height / 2.0 * dpp;
        (
            self.center.lng - half_w,
            self.center.lng + half_w,
            self.center.lat - half_h,
            self.center.lat + half_h,
        )
    }
}

/// One dropdown entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryOption {
    pub name: String,
    pub value: String,
}

/// Worldwide first, then one entry per country in API order.
pub fn country_options(countries: &[CountryStat]) -> Vec<CountryOption> {
    let mut seen: AHashSet<&str> = AHashSet::with_capacity(countries.len() + 1);
    seen.insert(WORLDWIDE);
    let mut out = vec![CountryOption {
        name: "Worldwide".into(),
        value: WORLDWIDE.into(),
    }];
    for c in countries {
        let value = c.selector_value();
        if seen.insert(value) {
            out.push(CountryOption {
                name: c.name.clone(),
                value: value.to_string(),
            });
        }
    }
    out
}

/// Props of one summary card. `metric` is what the card reports back when activated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCard {
    pub metric: MetricKind,
    pub title: &'static str,
    pub current_value: String,
    pub delta_value: String,
    pub highlight: Rgb,
    pub is_active: bool,
}

pub fn card_title(metric: MetricKind) -> &'static str {
    match metric {
        MetricKind::Cases => "Coronavirus Cases",
        MetricKind::Recovered => "Recovered Cases",
        MetricKind::Deaths => "Death",
    }
}

/// Cards for cases, recovered and deaths, in that order.
pub fn summary_cards(counts: &Counts, active: MetricKind) -> [SummaryCard; 3] {
    MetricKind::ALL.map(|metric| SummaryCard {
        metric,
        title: card_title(metric),
        current_value: pretty_print_stat(metric.total(counts)),
        delta_value: pretty_print_stat(metric.today(counts)),
        highlight: metric_color(metric),
        is_active: metric == active,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub name: String,
    pub formatted_case_count: String,
}

/// Sorted table, highest case count first.
pub fn table_rows(countries: &[CountryStat]) -> Vec<TableRow> {
    sort_descending_by_cases(countries)
        .into_iter()
        .map(|c| TableRow {
            formatted_case_count: pretty_print_stat(c.counts.cases),
            name: c.name,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub position: Coordinates,
    pub style: MarkerStyle,
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub viewport: Viewport,
    pub metric: MetricKind,
    pub markers: Vec<MapMarker>,
}

pub fn marker_tooltip(country: &CountryStat) -> String {
    format!(
        "{}\nCases: {}\nRecovered: {}\nDeaths: {}",
        country.name,
        format_total(country.counts.cases),
        format_total(country.counts.recovered),
        format_total(country.counts.deaths),
    )
}

/// One marker per country that has coordinates.
pub fn map_view(countries: &[CountryStat], metric: MetricKind, viewport: Viewport) -> MapView {
    let markers = countries
        .iter()
        .filter_map(|c| {
            c.position.map(|position| MapMarker {
                position,
                style: marker_style(metric.total(&c.counts), metric),
                tooltip: marker_tooltip(c),
            })
        })
        .collect();
    MapView {
        viewport,
        metric,
        markers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_centers_viewport() {
        let v = Viewport::world();
        let (x, y) = v.project(WORLD_CENTER, 800.0, 600.0);
        assert!((x - 400.0).abs() < 1e-9);
        assert!((y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn north_is_up_and_east_is_right() {
        let v = Viewport::country(Coordinates::new(0.0, 0.0));
        let (x, y) = v.project(Coordinates::new(1.0, 1.0), 100.0, 100.0);
        assert!(x > 50.0);
        assert!(y < 50.0);
    }

    #[test]
    fn longitudes_wrap_towards_center() {
        let v = Viewport::country(Coordinates::new(0.0, 170.0));
        assert!((v.unwrap_lng(-175.0) - 185.0).abs() < 1e-9);
        assert!((v.unwrap_lng(10.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn higher_zoom_means_bigger_pixels() {
        let world = Viewport::world();
        let near = Viewport::country(WORLD_CENTER);
        assert!(near.meters_to_pixels(50_000.0) > world.meters_to_pixels(50_000.0));
    }
}

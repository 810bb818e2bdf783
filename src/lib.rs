//! covid_tracker
//!
//! A lightweight Rust library for fetching, shaping and rendering global and per-country
//! COVID-19 statistics from the disease.sh API. Pairs with the `covid` CLI and the
//! `covid-gui` desktop dashboard.
//!
//! ### Features
//! - Read worldwide totals, the full country list, one country, or the worldwide history
//! - Sort countries by case count and format counters for display
//! - Map marker styling (radius by magnitude, color by metric)
//! - A dashboard state holder with last-request-wins sequencing and visible fetch errors
//! - Export the country list as CSV or JSON; render the chart and the map to SVG/PNG
//!
//! ### Example
//! ```no_run
//! use covid_tracker::{Client, Dashboard, MetricKind};
//!
//! let mut dash = Dashboard::new(Client::default());
//! dash.initialize();
//! dash.settle();
//! dash.select_metric(MetricKind::Deaths);
//! covid_tracker::storage::save_csv(dash.countries(), "countries.csv")?;
//! covid_tracker::viz::plot_daily(&dash.chart(), MetricKind::Deaths, "deaths.svg", 1000, 600)?;
//! covid_tracker::viz::render_map(&dash.map(), "map.svg", 1200, 700)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod dashboard;
pub mod format;
pub mod models;
pub mod stats;
pub mod storage;
pub mod view;
pub mod viz;

pub use api::{Client, FetchError, StatsSource};
pub use dashboard::{Dashboard, Phase, Selection, SelectionState, Slice, Subject};
pub use format::{MarkerStyle, format_total, marker_style, pretty_print_stat};
pub use models::{Coordinates, CountryStat, Counts, GlobalStat, History, MetricKind};
pub use stats::sort_descending_by_cases;
pub use view::{Viewport, WORLDWIDE};

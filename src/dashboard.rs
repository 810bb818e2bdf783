//! Application state holder behind every presentation layer.
//!
//! A [`Dashboard`] owns the selection, the fetched records and the per-slice error state.
//! Reads run on worker threads and report back over a channel; nothing is mutated until
//! the owner calls [`Dashboard::poll`], [`Dashboard::wait_next`] or [`Dashboard::settle`],
//! so all state changes happen on the owner's thread.
//!
//! Each slice (summary, countries, history) numbers its requests. A completion is applied
//! only when it answers the latest request issued for that slice; anything older has been
//! superseded and is dropped, even if the latest request is still running.
//! A failed read keeps the previous data and records the error for that slice.
//!
//! ```no_run
//! use covid_tracker::{Client, Dashboard, MetricKind};
//!
//! let mut dash = Dashboard::new(Client::default());
//! dash.initialize();
//! dash.settle();
//! dash.select_country("DE");
//! dash.select_metric(MetricKind::Deaths);
//! dash.settle();
//! for row in dash.table().iter().take(5) {
//!     println!("{} {}", row.name, row.formatted_case_count);
//! }
//! ```

use crate::api::{DEFAULT_HISTORY_DAYS, FetchError, StatsSource};
use crate::models::{CountryStat, Counts, GlobalStat, History, MetricKind};
use crate::stats::daily_new;
use crate::view::{
    COUNTRY_ZOOM, CountryOption, MapView, SummaryCard, TableRow, Viewport, WORLDWIDE,
    country_options, map_view, summary_cards, table_rows,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

/// Chosen country, or the worldwide sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Worldwide,
    Country(String),
}

impl Selection {
    /// Interpret a selector value. Blank input and `"worldwide"` (any case) mean worldwide.
    pub fn parse(value: &str) -> Self {
        let v = value.trim();
        if v.is_empty() || v.eq_ignore_ascii_case(WORLDWIDE) {
            Selection::Worldwide
        } else {
            Selection::Country(v.to_string())
        }
    }

    /// Selector value for this selection.
    pub fn value(&self) -> &str {
        match self {
            Selection::Worldwide => WORLDWIDE,
            Selection::Country(code) => code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionState {
    pub country: Selection,
    pub metric: MetricKind,
    pub viewport: Viewport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Global totals or the country list not yet received.
    Idle,
    Loaded,
}

/// Independently owned parts of the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slice {
    /// Whatever the summary cards show: global totals or one country.
    Summary,
    /// The full country list behind the table, map and selector.
    Countries,
    /// Worldwide time series behind the chart.
    History,
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Slice::Summary => "summary",
            Slice::Countries => "countries",
            Slice::History => "history",
        })
    }
}

/// What the summary cards currently describe.
#[derive(Debug, Clone, PartialEq)]
pub enum Subject {
    Global(GlobalStat),
    Country(CountryStat),
}

impl Subject {
    pub fn counts(&self) -> &Counts {
        match self {
            Subject::Global(g) => &g.counts,
            Subject::Country(c) => &c.counts,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Subject::Global(_) => "Worldwide",
            Subject::Country(c) => &c.name,
        }
    }
}

enum Payload {
    Summary(Subject),
    Countries(Vec<CountryStat>),
    History(History),
}

struct Completion {
    slice: Slice,
    ticket: u64,
    result: Result<Payload, FetchError>,
}

pub struct Dashboard<S: StatsSource + 'static> {
    source: Arc<S>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    in_flight: usize,
    /// Latest ticket issued per slice.
    issued: BTreeMap<Slice, u64>,
    history_days: u32,

    selection: SelectionState,
    summary: Option<Subject>,
    countries: Option<Vec<CountryStat>>,
    history: Option<History>,
    errors: BTreeMap<Slice, FetchError>,
}

impl<S: StatsSource + 'static> Dashboard<S> {
    pub fn new(source: S) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source: Arc::new(source),
            tx,
            rx,
            in_flight: 0,
            issued: BTreeMap::new(),
            history_days: DEFAULT_HISTORY_DAYS,
            selection: SelectionState::default(),
            summary: None,
            countries: None,
            history: None,
            errors: BTreeMap::new(),
        }
    }

    /// Length of the chart's look-back window.
    pub fn with_history_days(mut self, days: u32) -> Self {
        self.history_days = days.max(2);
        self
    }

    /// Start the global, country-list and history reads. They complete independently.
    pub fn initialize(&mut self) {
        self.spawn(Slice::Summary, |src| {
            src.fetch_global()
                .map(|g| Payload::Summary(Subject::Global(g)))
        });
        self.spawn(Slice::Countries, |src| {
            src.fetch_all_countries().map(Payload::Countries)
        });
        let days = self.history_days;
        self.spawn(Slice::History, move |src| {
            src.fetch_history(days).map(Payload::History)
        });
    }

    /// Switch the summary cards to a country (or back to worldwide).
    ///
    /// Worldwide resets the viewport right away; a country recenters once its data arrives.
    /// The country list is never filtered by the selection.
    pub fn select_country(&mut self, value: &str) {
        let selection = Selection::parse(value);
        match &selection {
            Selection::Worldwide => {
                self.selection.viewport = Viewport::world();
                self.spawn(Slice::Summary, |src| {
                    src.fetch_global()
                        .map(|g| Payload::Summary(Subject::Global(g)))
                });
            }
            Selection::Country(code) => {
                let code = code.clone();
                self.spawn(Slice::Summary, move |src| {
                    src.fetch_country(&code)
                        .map(|c| Payload::Summary(Subject::Country(c)))
                });
            }
        }
        self.selection.country = selection;
    }

    /// Change which metric drives card highlight, marker coloring and the chart. No fetch.
    pub fn select_metric(&mut self, metric: MetricKind) {
        self.selection.metric = metric;
    }

    fn spawn<F>(&mut self, slice: Slice, job: F)
    where
        F: FnOnce(&S) -> Result<Payload, FetchError> + Send + 'static,
    {
        let latest = self.issued.entry(slice).or_default();
        *latest += 1;
        let ticket = *latest;
        self.in_flight += 1;
        log::debug!("{slice} request #{ticket} issued");

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = catch_unwind(AssertUnwindSafe(|| job(&*source))).unwrap_or_else(|_| {
                Err(FetchError::Network(format!("{slice} worker panicked")))
            });
            // The receiver lives as long as the dashboard; a send error means it is gone.
            let _ = tx.send(Completion {
                slice,
                ticket,
                result,
            });
        });
    }

    fn apply(&mut self, c: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let latest = self.issued.get(&c.slice).copied().unwrap_or_default();
        if c.ticket < latest {
            log::warn!(
                "discarding stale {} response #{} (superseded by #{latest})",
                c.slice,
                c.ticket
            );
            return;
        }

        match c.result {
            Ok(payload) => {
                self.errors.remove(&c.slice);
                match payload {
                    Payload::Summary(subject) => {
                        self.selection.viewport = match &subject {
                            Subject::Global(_) => Viewport::world(),
                            Subject::Country(country) => match country.position {
                                Some(p) => Viewport::country(p),
                                None => Viewport {
                                    zoom: COUNTRY_ZOOM,
                                    ..self.selection.viewport
                                },
                            },
                        };
                        self.summary = Some(subject);
                    }
                    Payload::Countries(list) => {
                        log::debug!("country list replaced ({} entries)", list.len());
                        self.countries = Some(list);
                    }
                    Payload::History(history) => self.history = Some(history),
                }
            }
            Err(e) => {
                log::warn!("{} request #{} failed: {e}", c.slice, c.ticket);
                self.errors.insert(c.slice, e);
            }
        }
    }

    /// Apply every completion that has already arrived. Returns how many were taken.
    pub fn poll(&mut self) -> usize {
        let mut n = 0;
        while let Ok(c) = self.rx.try_recv() {
            self.apply(c);
            n += 1;
        }
        n
    }

    /// Block until the next completion arrives and apply it.
    /// Returns `false` immediately when nothing is in flight.
    pub fn wait_next(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.rx.recv() {
            Ok(c) => {
                self.apply(c);
                true
            }
            Err(_) => false,
        }
    }

    /// Block until every issued request has completed.
    pub fn settle(&mut self) {
        while self.wait_next() {}
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn phase(&self) -> Phase {
        if self.summary.is_some() && self.countries.is_some() {
            Phase::Loaded
        } else {
            Phase::Idle
        }
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn summary(&self) -> Option<&Subject> {
        self.summary.as_ref()
    }

    /// Most recently fetched country list, in API order.
    pub fn countries(&self) -> &[CountryStat] {
        self.countries.as_deref().unwrap_or(&[])
    }

    pub fn history(&self) -> Option<&History> {
        self.history.as_ref()
    }

    pub fn errors(&self) -> &BTreeMap<Slice, FetchError> {
        &self.errors
    }

    pub fn error(&self, slice: Slice) -> Option<&FetchError> {
        self.errors.get(&slice)
    }

    pub fn options(&self) -> Vec<CountryOption> {
        country_options(self.countries())
    }

    pub fn cards(&self) -> Option<[SummaryCard; 3]> {
        self.summary
            .as_ref()
            .map(|s| summary_cards(s.counts(), self.selection.metric))
    }

    pub fn table(&self) -> Vec<TableRow> {
        table_rows(self.countries())
    }

    pub fn map(&self) -> MapView {
        map_view(
            self.countries(),
            self.selection.metric,
            self.selection.viewport,
        )
    }

    /// Daily new values of the selected metric, oldest first.
    pub fn chart(&self) -> Vec<(NaiveDate, i64)> {
        self.history
            .as_ref()
            .map(|h| daily_new(h, self.selection.metric))
            .unwrap_or_default()
    }
}

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Which figure drives the card highlight, marker coloring and chart series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    #[default]
    Cases,
    Recovered,
    Deaths,
}

impl MetricKind {
    pub const ALL: [MetricKind; 3] = [MetricKind::Cases, MetricKind::Recovered, MetricKind::Deaths];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Cases => "cases",
            MetricKind::Recovered => "recovered",
            MetricKind::Deaths => "deaths",
        }
    }

    /// Cumulative total for this metric.
    pub fn total(&self, counts: &Counts) -> Option<u64> {
        match self {
            MetricKind::Cases => counts.cases,
            MetricKind::Recovered => counts.recovered,
            MetricKind::Deaths => counts.deaths,
        }
    }

    /// Day-over-day delta for this metric.
    pub fn today(&self, counts: &Counts) -> Option<u64> {
        match self {
            MetricKind::Cases => counts.today_cases,
            MetricKind::Recovered => counts.today_recovered,
            MetricKind::Deaths => counts.today_deaths,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cases" => Ok(MetricKind::Cases),
            "recovered" => Ok(MetricKind::Recovered),
            "deaths" => Ok(MetricKind::Deaths),
            other => Err(format!(
                "unknown metric '{other}', expected cases, recovered or deaths"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// The six counters shared by global and per-country snapshots.
/// `None` means the API reported no figure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub cases: Option<u64>,
    pub today_cases: Option<u64>,
    pub recovered: Option<u64>,
    pub today_recovered: Option<u64>,
    pub deaths: Option<u64>,
    pub today_deaths: Option<u64>,
}

/// `countryInfo` block of a country entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountryInfo {
    #[serde(rename = "_id")]
    pub id: Option<u32>,
    pub iso2: Option<String>,
    pub iso3: Option<String>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    pub flag: Option<String>,
}

/// Raw element of `/countries` (and the body of `/countries/{code}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryEntry {
    pub country: String,
    #[serde(default)]
    pub country_info: CountryInfo,
    pub updated: Option<i64>,
    pub cases: Option<u64>,
    pub today_cases: Option<u64>,
    pub deaths: Option<u64>,
    pub today_deaths: Option<u64>,
    pub recovered: Option<u64>,
    pub today_recovered: Option<u64>,
    pub population: Option<u64>,
}

/// Raw body of `/all`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalEntry {
    pub updated: Option<i64>,
    pub cases: Option<u64>,
    pub today_cases: Option<u64>,
    pub deaths: Option<u64>,
    pub today_deaths: Option<u64>,
    pub recovered: Option<u64>,
    pub today_recovered: Option<u64>,
    pub population: Option<u64>,
    pub affected_countries: Option<u32>,
    /// Not sent by the live API; tolerated when present.
    pub country_info: Option<CountryInfo>,
}

/// Raw body of `/historical/all`: metric -> (`M/D/YY` -> cumulative value).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub cases: BTreeMap<String, u64>,
    #[serde(default)]
    pub deaths: BTreeMap<String, u64>,
    #[serde(default)]
    pub recovered: BTreeMap<String, u64>,
}

/// One country's snapshot. Replaced wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryStat {
    pub name: String,
    /// ISO2, absent for a few non-country entries.
    pub code: Option<String>,
    pub iso3: Option<String>,
    pub flag: Option<String>,
    pub position: Option<Coordinates>,
    pub counts: Counts,
    pub population: Option<u64>,
    pub updated: Option<DateTime<Utc>>,
}

impl CountryStat {
    /// Value to hand back to `select_country`: ISO2 when known, otherwise the name.
    pub fn selector_value(&self) -> &str {
        self.code.as_deref().unwrap_or(&self.name)
    }
}

/// Worldwide aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalStat {
    pub position: Option<Coordinates>,
    pub counts: Counts,
    pub population: Option<u64>,
    pub affected_countries: Option<u32>,
    pub updated: Option<DateTime<Utc>>,
}

fn millis_to_utc(ms: Option<i64>) -> Option<DateTime<Utc>> {
    ms.and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}

fn position_of(info: &CountryInfo) -> Option<Coordinates> {
    match (info.lat, info.long) {
        (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
        _ => None,
    }
}

impl From<CountryEntry> for CountryStat {
    fn from(e: CountryEntry) -> Self {
        let position = position_of(&e.country_info);
        Self {
            name: e.country,
            code: e.country_info.iso2,
            iso3: e.country_info.iso3,
            flag: e.country_info.flag,
            position,
            counts: Counts {
                cases: e.cases,
                today_cases: e.today_cases,
                recovered: e.recovered,
                today_recovered: e.today_recovered,
                deaths: e.deaths,
                today_deaths: e.today_deaths,
            },
            population: e.population,
            updated: millis_to_utc(e.updated),
        }
    }
}

impl From<GlobalEntry> for GlobalStat {
    fn from(e: GlobalEntry) -> Self {
        Self {
            position: e.country_info.as_ref().and_then(position_of),
            counts: Counts {
                cases: e.cases,
                today_cases: e.today_cases,
                recovered: e.recovered,
                today_recovered: e.today_recovered,
                deaths: e.deaths,
                today_deaths: e.today_deaths,
            },
            population: e.population,
            affected_countries: e.affected_countries,
            updated: millis_to_utc(e.updated),
        }
    }
}

/// Cumulative worldwide series keyed by calendar day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub cases: BTreeMap<NaiveDate, u64>,
    pub deaths: BTreeMap<NaiveDate, u64>,
    pub recovered: BTreeMap<NaiveDate, u64>,
}

impl History {
    pub fn series(&self, metric: MetricKind) -> &BTreeMap<NaiveDate, u64> {
        match metric {
            MetricKind::Cases => &self.cases,
            MetricKind::Recovered => &self.recovered,
            MetricKind::Deaths => &self.deaths,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty() && self.deaths.is_empty() && self.recovered.is_empty()
    }
}

/// Parse an API day key such as `"1/22/20"`.
pub fn parse_history_date(key: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(key.trim(), "%m/%d/%y")
}

fn convert_series(raw: BTreeMap<String, u64>) -> Result<BTreeMap<NaiveDate, u64>, String> {
    raw.into_iter()
        .map(|(k, v)| {
            parse_history_date(&k)
                .map(|d| (d, v))
                .map_err(|e| format!("bad history date '{k}': {e}"))
        })
        .collect()
}

impl TryFrom<HistoryEntry> for History {
    type Error = String;

    fn try_from(e: HistoryEntry) -> Result<Self, Self::Error> {
        Ok(Self {
            cases: convert_series(e.cases)?,
            deaths: convert_series(e.deaths)?,
            recovered: convert_series(e.recovered)?,
        })
    }
}

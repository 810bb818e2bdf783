use chrono::NaiveDate;
use covid_tracker::api::{parse_countries, parse_country, parse_global, parse_history};
use covid_tracker::{FetchError, MetricKind, stats};

const ALL: &str = r#"
{
  "updated": 1618412345678,
  "cases": 138562543,
  "todayCases": 412345,
  "deaths": 2978212,
  "todayDeaths": 6789,
  "recovered": 111422435,
  "todayRecovered": 398765,
  "active": 24161896,
  "population": 7834519410,
  "affectedCountries": 221
}
"#;

const COUNTRIES: &str = r#"
[
  {
    "updated": 1618412345678,
    "country": "Germany",
    "countryInfo": {"_id": 276, "iso2": "DE", "iso3": "DEU", "lat": 51, "long": 9,
                    "flag": "https://disease.sh/assets/img/flags/de.png"},
    "cases": 3044016, "todayCases": 1234,
    "deaths": 79381, "todayDeaths": 12,
    "recovered": 2736500, "todayRecovered": 900,
    "population": 83900471
  },
  {
    "updated": 1618412345678,
    "country": "MS Zaandam",
    "countryInfo": {"_id": null, "iso2": null, "iso3": null, "lat": 0, "long": 0,
                    "flag": "https://disease.sh/assets/img/flags/unknown.png"},
    "cases": 9, "todayCases": 0,
    "deaths": 2, "todayDeaths": 0,
    "recovered": null, "todayRecovered": 0,
    "population": null
  }
]
"#;

#[test]
fn global_totals() {
    let g = parse_global(ALL).unwrap();
    assert_eq!(g.counts.cases, Some(138_562_543));
    assert_eq!(g.counts.today_deaths, Some(6_789));
    assert_eq!(g.affected_countries, Some(221));
    assert!(g.position.is_none());
    assert!(g.updated.is_some());
}

#[test]
fn country_list_keeps_order_and_tolerates_nulls() {
    let list = parse_countries(COUNTRIES).unwrap();
    assert_eq!(list.len(), 2);

    let de = &list[0];
    assert_eq!(de.name, "Germany");
    assert_eq!(de.code.as_deref(), Some("DE"));
    assert_eq!(de.iso3.as_deref(), Some("DEU"));
    let pos = de.position.unwrap();
    assert_eq!((pos.lat, pos.lng), (51.0, 9.0));
    assert_eq!(de.counts.recovered, Some(2_736_500));

    let ship = &list[1];
    assert_eq!(ship.code, None);
    assert_eq!(ship.selector_value(), "MS Zaandam");
    assert_eq!(ship.counts.recovered, None);
    assert_eq!(ship.population, None);
}

#[test]
fn single_country_body() {
    let body = r#"{"country":"Chad","countryInfo":{"iso2":"TD","lat":15,"long":19},
                   "cases":4000,"todayCases":3,"deaths":180,"todayDeaths":0,
                   "recovered":3700,"todayRecovered":1}"#;
    let c = parse_country(body).unwrap();
    assert_eq!(c.name, "Chad");
    assert_eq!(c.code.as_deref(), Some("TD"));
    assert_eq!(c.counts.today_recovered, Some(1));
    assert!(c.updated.is_none());
}

#[test]
fn country_without_info_block_has_no_position() {
    let c = parse_country(r#"{"country":"Nowhere","cases":1}"#).unwrap();
    assert!(c.position.is_none());
    assert!(c.code.is_none());
}

#[test]
fn history_becomes_daily_changes() {
    let body = r#"{
      "cases":     {"12/30/20": 100, "12/31/20": 130, "1/1/21": 180},
      "deaths":    {"12/30/20": 10,  "12/31/20": 11,  "1/1/21": 15},
      "recovered": {"12/30/20": 50,  "12/31/20": 70,  "1/1/21": 70}
    }"#;
    let h = parse_history(body).unwrap();
    let first = NaiveDate::from_ymd_opt(2020, 12, 30).unwrap();
    assert_eq!(h.cases.keys().next(), Some(&first));

    let daily = stats::daily_new(&h, MetricKind::Cases);
    assert_eq!(
        daily,
        vec![
            (NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(), 30),
            (NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(), 50),
        ]
    );
    assert_eq!(
        stats::daily_new(&h, MetricKind::Recovered)
            .iter()
            .map(|(_, v)| *v)
            .collect::<Vec<_>>(),
        vec![20, 0]
    );
}

#[test]
fn wrong_shapes_are_parse_errors() {
    assert!(matches!(parse_global("42"), Err(FetchError::Parse(_))));
    assert!(matches!(
        parse_countries(r#"{"message":"nope"}"#),
        Err(FetchError::Parse(_))
    ));
    assert!(matches!(parse_country("not json"), Err(FetchError::Parse(_))));
    assert!(matches!(
        parse_history(r#"{"cases":{"yesterday":1}}"#),
        Err(FetchError::Parse(_))
    ));
}

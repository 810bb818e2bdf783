use covid_tracker::view::{
    COUNTRY_ZOOM, WORLD_ZOOM, card_title, country_options, map_view, marker_tooltip,
    summary_cards, table_rows,
};
use covid_tracker::{Coordinates, CountryStat, Counts, MetricKind, Viewport, WORLDWIDE};

fn stat(name: &str, code: Option<&str>, cases: Option<u64>, pos: Option<(f64, f64)>) -> CountryStat {
    CountryStat {
        name: name.into(),
        code: code.map(str::to_string),
        iso3: None,
        flag: None,
        position: pos.map(|(lat, lng)| Coordinates::new(lat, lng)),
        counts: Counts {
            cases,
            recovered: cases.map(|c| c / 2),
            deaths: Some(3),
            ..Default::default()
        },
        population: None,
        updated: None,
    }
}

#[test]
fn options_start_with_worldwide_and_skip_duplicates() {
    let list = vec![
        stat("Germany", Some("DE"), Some(1), None),
        stat("Diamond Princess", None, Some(2), None),
        stat("Germany (dup)", Some("DE"), Some(3), None),
    ];
    let opts = country_options(&list);
    assert_eq!(opts[0].value, WORLDWIDE);
    assert_eq!(opts[0].name, "Worldwide");
    let values: Vec<_> = opts.iter().map(|o| o.value.as_str()).collect();
    assert_eq!(values, [WORLDWIDE, "DE", "Diamond Princess"]);
}

#[test]
fn cards_come_in_fixed_order_with_one_active() {
    let counts = Counts {
        cases: Some(1_500),
        today_cases: Some(20),
        recovered: None,
        today_recovered: Some(0),
        deaths: Some(7),
        today_deaths: None,
    };
    let cards = summary_cards(&counts, MetricKind::Recovered);
    let titles: Vec<_> = cards.iter().map(|c| c.title).collect();
    assert_eq!(titles, ["Coronavirus Cases", "Recovered Cases", "Death"]);
    assert_eq!(cards.iter().filter(|c| c.is_active).count(), 1);
    assert!(cards[1].is_active);

    assert_eq!(cards[0].current_value, "+1,500");
    assert_eq!(cards[0].delta_value, "+20");
    assert_eq!(cards[1].current_value, "0");
    assert_eq!(cards[1].delta_value, "+0");
    assert_eq!(cards[2].delta_value, "0");
    assert_eq!(cards[2].highlight.hex(), "#555555");
    assert_eq!(card_title(MetricKind::Deaths), "Death");
}

#[test]
fn table_is_sorted_and_formatted() {
    let list = vec![
        stat("Low", None, Some(5), None),
        stat("Unknown", None, None, None),
        stat("High", None, Some(12_345), None),
    ];
    let rows = table_rows(&list);
    let pairs: Vec<_> = rows
        .iter()
        .map(|r| (r.name.as_str(), r.formatted_case_count.as_str()))
        .collect();
    assert_eq!(pairs, [("High", "+12,345"), ("Low", "+5"), ("Unknown", "0")]);
}

#[test]
fn map_skips_countries_without_coordinates() {
    let list = vec![
        stat("Here", Some("HR"), Some(100), Some((45.0, 15.0))),
        stat("Nowhere", None, Some(100), None),
    ];
    let view = map_view(&list, MetricKind::Cases, Viewport::world());
    assert_eq!(view.markers.len(), 1);
    assert_eq!(view.metric, MetricKind::Cases);
    assert_eq!(view.viewport.zoom, WORLD_ZOOM);

    let m = &view.markers[0];
    assert_eq!(m.position, Coordinates::new(45.0, 15.0));
    assert!((m.style.radius - 8_000.0).abs() < 1e-9);
    assert_eq!(m.tooltip, "Here\nCases: 100\nRecovered: 50\nDeaths: 3");
}

#[test]
fn tooltip_uses_plain_totals() {
    let t = marker_tooltip(&stat("Big", None, Some(2_000_000), None));
    assert!(t.starts_with("Big\nCases: 2,000,000\n"));
}

#[test]
fn viewport_bounds_match_projection() {
    let vp = Viewport::country(Coordinates::new(10.0, 20.0));
    assert_eq!(vp.zoom, COUNTRY_ZOOM);
    let (lng_min, lng_max, lat_min, lat_max) = vp.bounds(400.0, 200.0);
    let (x0, y0) = vp.project(Coordinates::new(lat_max, lng_min), 400.0, 200.0);
    let (x1, y1) = vp.project(Coordinates::new(lat_min, lng_max), 400.0, 200.0);
    assert!(x0.abs() < 1e-6 && y0.abs() < 1e-6);
    assert!((x1 - 400.0).abs() < 1e-6 && (y1 - 200.0).abs() < 1e-6);
}

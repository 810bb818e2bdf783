use covid_tracker::format::metric_color;
use covid_tracker::{MetricKind, format_total, marker_style, pretty_print_stat};

#[test]
fn missing_value_prints_plain_zero() {
    assert_eq!(pretty_print_stat(None), "0");
    assert_eq!(format_total(None), "0");
}

#[test]
fn present_values_get_sign_and_grouping() {
    assert_eq!(pretty_print_stat(Some(0)), "+0");
    assert_eq!(pretty_print_stat(Some(999)), "+999");
    assert_eq!(pretty_print_stat(Some(1_234_567)), "+1,234,567");
    assert_eq!(format_total(Some(1_234_567)), "1,234,567");
}

#[test]
fn marker_radius_grows_with_count() {
    for metric in MetricKind::ALL {
        let small = marker_style(Some(10), metric).radius;
        let mid = marker_style(Some(10_000), metric).radius;
        let big = marker_style(Some(10_000_000), metric).radius;
        assert!(small < mid && mid < big, "{metric}: {small} {mid} {big}");
    }
}

#[test]
fn marker_color_depends_only_on_metric() {
    for metric in MetricKind::ALL {
        let a = marker_style(Some(1), metric).fill_color;
        let b = marker_style(Some(50_000_000), metric).fill_color;
        let c = marker_style(None, metric).fill_color;
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a, metric_color(metric));
    }
    assert_ne!(
        metric_color(MetricKind::Cases),
        metric_color(MetricKind::Recovered)
    );
    assert_ne!(
        metric_color(MetricKind::Recovered),
        metric_color(MetricKind::Deaths)
    );
}

#[test]
fn deaths_markers_outsize_cases_for_equal_counts() {
    let cases = marker_style(Some(40_000), MetricKind::Cases).radius;
    let recovered = marker_style(Some(40_000), MetricKind::Recovered).radius;
    let deaths = marker_style(Some(40_000), MetricKind::Deaths).radius;
    assert!(cases < recovered && recovered < deaths);
}

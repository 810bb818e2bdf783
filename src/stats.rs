use crate::models::{CountryStat, History, MetricKind};
use chrono::NaiveDate;

/// Order countries by total cases, highest first.
///
/// Missing case counts sort as zero. The sort is stable, so equal counts keep their
/// input order. The input slice is left untouched.
pub fn sort_descending_by_cases(records: &[CountryStat]) -> Vec<CountryStat> {
    let mut out = records.to_vec();
    out.sort_by(|a, b| {
        let ka = a.counts.cases.unwrap_or(0);
        let kb = b.counts.cases.unwrap_or(0);
        kb.cmp(&ka)
    });
    out
}

/// Day-over-day change of a cumulative series.
///
/// The first day has no predecessor and is skipped. Values may be negative when the
/// source revises a cumulative figure downwards.
pub fn daily_new(history: &History, metric: MetricKind) -> Vec<(NaiveDate, i64)> {
    let mut out = Vec::new();
    let mut last: Option<u64> = None;
    for (day, value) in history.series(metric) {
        if let Some(prev) = last {
            out.push((*day, *value as i64 - prev as i64));
        }
        last = Some(*value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Counts;

    fn c(name: &str, cases: Option<u64>) -> CountryStat {
        CountryStat {
            name: name.into(),
            code: None,
            iso3: None,
            flag: None,
            position: None,
            counts: Counts {
                cases,
                ..Default::default()
            },
            population: None,
            updated: None,
        }
    }

    #[test]
    fn null_sorts_with_zero_and_keeps_order() {
        let input = vec![c("Z", Some(0)), c("N", None), c("X", Some(5))];
        let names: Vec<String> = sort_descending_by_cases(&input)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["X", "Z", "N"]);
    }

    #[test]
    fn daily_new_skips_first_day() {
        let mut h = History::default();
        let d = |day| NaiveDate::from_ymd_opt(2021, 3, day).unwrap();
        h.deaths.insert(d(1), 100);
        h.deaths.insert(d(2), 130);
        h.deaths.insert(d(3), 125);
        assert_eq!(daily_new(&h, MetricKind::Deaths), vec![(d(2), 30), (d(3), -5)]);
        assert!(daily_new(&h, MetricKind::Cases).is_empty());
    }
}

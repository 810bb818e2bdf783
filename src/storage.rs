use crate::models::CountryStat;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Neutralize text that a spreadsheet would evaluate as a formula.
fn safe_cell(s: &str) -> String {
    match s.chars().next() {
        Some('=' | '+' | '-' | '@') => format!("'{s}"),
        _ => s.to_string(),
    }
}

fn opt_cell(s: Option<&str>) -> String {
    s.map(safe_cell).unwrap_or_default()
}

/// Save the country list as CSV with header.
pub fn save_csv<P: AsRef<Path>>(countries: &[CountryStat], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    wtr.serialize((
        "country",
        "iso2",
        "iso3",
        "lat",
        "long",
        "cases",
        "today_cases",
        "recovered",
        "today_recovered",
        "deaths",
        "today_deaths",
        "population",
    ))?;
    for c in countries {
        let n = &c.counts;
        wtr.serialize((
            safe_cell(&c.name),
            opt_cell(c.code.as_deref()),
            opt_cell(c.iso3.as_deref()),
            c.position.map(|p| p.lat),
            c.position.map(|p| p.lng),
            n.cases,
            n.today_cases,
            n.recovered,
            n.today_recovered,
            n.deaths,
            n.today_deaths,
            c.population,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save the country list as a pretty JSON array.
pub fn save_json<P: AsRef<Path>>(countries: &[CountryStat], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let s = serde_json::to_string_pretty(countries)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Counts;
    use tempfile::tempdir;

    #[test]
    fn write_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        let rows = vec![CountryStat {
            name: "Germany".into(),
            code: Some("DE".into()),
            iso3: Some("DEU".into()),
            flag: None,
            position: None,
            counts: Counts {
                cases: Some(12),
                ..Default::default()
            },
            population: None,
            updated: None,
        }];
        save_csv(&rows, &csvp).unwrap();
        save_json(&rows, &jsonp).unwrap();
        assert!(csvp.exists());
        assert!(jsonp.exists());
    }

    #[test]
    fn formula_starters_are_quoted() {
        assert_eq!(safe_cell("=1+1"), "'=1+1");
        assert_eq!(safe_cell("-5"), "'-5");
        assert_eq!(safe_cell("Chad"), "Chad");
        assert_eq!(opt_cell(None), "");
    }
}

//! Utility functions for visualization: colors, scaling, locale mapping, label sizing.

use crate::format::Rgb;
use num_format::{Locale, ToFormattedString};
use plotters::prelude::*;

use super::text::estimate_text_width_px;

/// Convert a palette color to a plotters color.
#[inline]
pub fn plot_color(c: Rgb) -> RGBColor {
    RGBColor(c.r, c.g, c.b)
}

/// Pick a single Y-axis scale and its human label based on the overall magnitude.
/// Returns (scale, label), e.g. (1e6, "millions").
pub fn choose_axis_scale(max_abs: f64) -> (f64, &'static str) {
    if max_abs >= 1.0e9 {
        (1.0e9, "billions")
    } else if max_abs >= 1.0e6 {
        (1.0e6, "millions")
    } else if max_abs >= 1.0e3 {
        (1.0e3, "thousands")
    } else {
        (1.0, "")
    }
}

/// Map a user-provided locale tag to a `num_format::Locale`.
///
/// Supported tags (case-insensitive): `en`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> &'static Locale {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => &Locale::de,
        "fr" | "fr_fr" => &Locale::fr,
        "es" | "es_es" => &Locale::es,
        "it" | "it_it" => &Locale::it,
        "pt" | "pt_pt" | "pt_br" => &Locale::pt,
        "nl" | "nl_nl" => &Locale::nl,
        _ => &Locale::en,
    }
}

/// Y tick label: whole numbers with the locale's grouping when unscaled,
/// otherwise up to two decimals of the scaled value.
pub fn y_tick_label(v: f64, scaled: bool, locale: &Locale) -> String {
    if !scaled {
        return (v.round() as i64).to_formatted_string(locale);
    }
    let a = v.abs();
    let prec = if a >= 100.0 {
        0
    } else if a >= 10.0 {
        1
    } else {
        2
    };
    format!("{:.*}", prec, v)
}

/// Compute a tight left label area width for the Y axis (in pixels),
/// based on the formatted tick labels that will appear.
///
/// Returns a width clamped to a sensible range to avoid extremes.
pub fn compute_left_label_area_px(
    ymin_scaled: f64,
    ymax_scaled: f64,
    ticks: usize,
    font_px: u32,
    label: impl Fn(f64) -> String,
) -> u32 {
    let mut max_px = 0u32;
    // Sample the same number of tick positions as you request from Plotters.
    for i in 0..=ticks {
        let t = if ticks == 0 {
            0.0
        } else {
            i as f64 / ticks as f64
        };
        let v = ymin_scaled + (ymax_scaled - ymin_scaled) * t;
        max_px = max_px.max(estimate_text_width_px(&label(v), font_px));
    }

    // Padding for tick marks and the axis description.
    let with_padding = max_px.saturating_add(34);
    with_padding.clamp(56, 160)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_by_magnitude() {
        assert_eq!(choose_axis_scale(999.0), (1.0, ""));
        assert_eq!(choose_axis_scale(250_000.0).1, "thousands");
        assert_eq!(choose_axis_scale(3.2e6).1, "millions");
    }

    #[test]
    fn unscaled_ticks_use_locale_grouping() {
        assert_eq!(y_tick_label(12345.4, false, map_locale("en")), "12,345");
        assert_eq!(y_tick_label(12345.4, false, map_locale("de")), "12.345");
        assert_eq!(y_tick_label(1.234, true, map_locale("en")), "1.23");
    }

    #[test]
    fn label_area_is_clamped() {
        let w = compute_left_label_area_px(0.0, 1.0, 10, 12, |v| format!("{v:.2}"));
        assert!((56..=160).contains(&w));
    }
}

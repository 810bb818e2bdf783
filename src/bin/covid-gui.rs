/*!
 * Desktop dashboard for covid-tracker-rs
 *
 * A single window showing:
 * - A country selector (worldwide by default)
 * - Summary cards for cases, recovered and deaths (click to switch metric)
 * - A marker map, a table sorted by cases, and the worldwide daily chart
 *
 * Platform support: Windows, macOS, Linux
 */

use covid_tracker::format::{MARKER_FILL_OPACITY, Rgb, metric_color};
use chrono::NaiveDate;
use covid_tracker::view::{CountryOption, MapView, SummaryCard, TableRow};
use covid_tracker::viz::{DEFAULT_CHART_SIZE, DEFAULT_MAP_SIZE};
use covid_tracker::{Client, Coordinates, Dashboard, MetricKind, WORLDWIDE, storage, viz};
use eframe::egui;
use egui::{Align2, Color32, FontId, RichText, Sense, Stroke};
use std::path::PathBuf;
use std::time::Duration;

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("COVID-19 Tracker"),
        ..Default::default()
    };

    eframe::run_native(
        "COVID-19 Tracker",
        options,
        Box::new(|_cc| Ok(Box::new(TrackerApp::new()))),
    )
}

struct TrackerApp {
    dash: Dashboard<Client>,
    /// Selector value currently shown in the dropdown.
    selected: String,
    export_dir: String,
    status_message: String,
    error_message: String,

    // Derived views, rebuilt only when the dashboard changes.
    options: Vec<CountryOption>,
    rows: Vec<TableRow>,
    map_view: MapView,
    chart: Vec<(NaiveDate, i64)>,
}

fn color32(c: Rgb) -> Color32 {
    Color32::from_rgb(c.r, c.g, c.b)
}

impl TrackerApp {
    fn new() -> Self {
        let export_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .to_string_lossy()
            .to_string();

        let base_url = std::env::var("COVID_API_URL")
            .unwrap_or_else(|_| covid_tracker::api::DEFAULT_BASE_URL.to_string());
        let mut dash = Dashboard::new(Client::default().with_base_url(base_url));
        dash.initialize();

        let mut app = Self {
            options: Vec::new(),
            rows: Vec::new(),
            map_view: dash.map(),
            chart: Vec::new(),
            dash,
            selected: WORLDWIDE.to_string(),
            export_dir,
            status_message: String::new(),
            error_message: String::new(),
        };
        app.refresh();
        app
    }

    fn refresh(&mut self) {
        self.options = self.dash.options();
        self.rows = self.dash.table();
        self.map_view = self.dash.map();
        self.chart = self.dash.chart();
    }

    fn header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("COVID-19 TRACKER");
            ui.add_space(20.0);

            let shown = self
                .options
                .iter()
                .find(|o| o.value == self.selected)
                .map(|o| o.name.clone())
                .unwrap_or_else(|| self.selected.clone());
            let before = self.selected.clone();
            egui::ComboBox::from_id_salt("country_selector")
                .selected_text(shown)
                .width(240.0)
                .show_ui(ui, |ui| {
                    for o in &self.options {
                        ui.selectable_value(&mut self.selected, o.value.clone(), o.name.as_str());
                    }
                });
            if self.selected != before {
                self.dash.select_country(&self.selected);
                self.refresh();
            }

            if self.dash.is_busy() {
                ui.spinner();
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Export").clicked()
                    && let Some(path) = rfd::FileDialog::new()
                        .set_directory(&self.export_dir)
                        .pick_folder()
                {
                    self.export_dir = path.to_string_lossy().to_string();
                    self.export();
                }
            });
        });

        for (slice, err) in self.dash.errors() {
            ui.colored_label(Color32::RED, format!("Could not load {slice}: {err}"));
        }
        if !self.error_message.is_empty() {
            ui.colored_label(Color32::RED, &self.error_message);
        }
        if !self.status_message.is_empty() {
            ui.colored_label(Color32::DARK_GREEN, &self.status_message);
        }
    }

    fn cards(&mut self, ui: &mut egui::Ui) {
        let Some(cards) = self.dash.cards() else {
            ui.label("Loading totals...");
            return;
        };
        let mut activated: Option<MetricKind> = None;
        ui.horizontal(|ui| {
            for card in &cards {
                if card_widget(ui, card) {
                    activated = Some(card.metric);
                }
            }
        });
        if let Some(metric) = activated {
            self.dash.select_metric(metric);
            self.refresh();
        }
    }

    fn export(&mut self) {
        let dir = PathBuf::from(&self.export_dir);
        let metric = self.dash.selection().metric;
        let mut written = Vec::new();
        let mut failures = Vec::new();

        let csv_path = dir.join("covid_countries.csv");
        match storage::save_csv(self.dash.countries(), &csv_path) {
            Ok(()) => written.push(csv_path),
            Err(e) => failures.push(format!("CSV: {e}")),
        }

        let chart_path = dir.join(format!("covid_new_{metric}.png"));
        let (cw, ch) = DEFAULT_CHART_SIZE;
        match viz::plot_daily(&self.chart, metric, &chart_path, cw, ch) {
            Ok(()) => written.push(chart_path),
            Err(e) => failures.push(format!("chart: {e}")),
        }

        let map_path = dir.join(format!("covid_map_{metric}.png"));
        let (mw, mh) = DEFAULT_MAP_SIZE;
        match viz::render_map(&self.map_view, &map_path, mw, mh) {
            Ok(()) => written.push(map_path),
            Err(e) => failures.push(format!("map: {e}")),
        }

        self.status_message = if written.is_empty() {
            String::new()
        } else {
            format!(
                "Files created:\n{}",
                written
                    .iter()
                    .map(|p| p.to_string_lossy().to_string())
                    .collect::<Vec<_>>()
                    .join("\n")
            )
        };
        self.error_message = if failures.is_empty() {
            String::new()
        } else {
            format!("Export failed for {}", failures.join("; "))
        };
    }
}

/// Draw one summary card; returns true when it was clicked.
fn card_widget(ui: &mut egui::Ui, card: &SummaryCard) -> bool {
    let color = color32(card.highlight);
    let stroke = if card.is_active {
        Stroke::new(3.0, color)
    } else {
        Stroke::new(1.0, Color32::GRAY)
    };
    let response = egui::Frame::group(ui.style())
        .stroke(stroke)
        .inner_margin(10.0)
        .show(ui, |ui| {
            ui.set_min_width(180.0);
            ui.label(card.title);
            ui.label(RichText::new(&card.delta_value).size(24.0).color(color));
            ui.label(format!("{} Total", card.current_value));
        })
        .response;
    response.interact(Sense::click()).clicked()
}

fn paint_map(ui: &mut egui::Ui, view: &MapView) {
    let size = egui::vec2(ui.available_width(), ui.available_height().max(300.0));
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let rect = response.rect;
    painter.rect_filled(rect, 4.0, Color32::from_rgb(170, 211, 223));

    let vp = view.viewport;
    let (w, h) = (rect.width() as f64, rect.height() as f64);
    let to_screen = |c: Coordinates| {
        let (x, y) = vp.project(c, w, h);
        egui::pos2(rect.left() + x as f32, rect.top() + y as f32)
    };

    let grid = Stroke::new(1.0, Color32::from_white_alpha(120));
    for i in -6..=6 {
        let lng = vp.center.lng + i as f64 * 30.0 - (vp.center.lng % 30.0);
        painter.line_segment(
            [
                to_screen(Coordinates::new(85.0, lng)),
                to_screen(Coordinates::new(-85.0, lng)),
            ],
            grid,
        );
    }
    for i in -2..=2 {
        let lat = i as f64 * 30.0;
        painter.line_segment(
            [
                to_screen(Coordinates::new(lat, vp.center.lng - 180.0)),
                to_screen(Coordinates::new(lat, vp.center.lng + 180.0)),
            ],
            grid,
        );
    }

    let base = color32(metric_color(view.metric));
    let fill = Color32::from_rgba_unmultiplied(
        base.r(),
        base.g(),
        base.b(),
        (MARKER_FILL_OPACITY * 255.0) as u8,
    );
    let mut hovered: Option<(f32, &str)> = None;
    let hover = response.hover_pos();
    for m in view.markers.iter().filter(|m| m.style.radius > 0.0) {
        let center = to_screen(m.position);
        let r = (vp.meters_to_pixels(m.style.radius) as f32).max(1.0);
        painter.circle(center, r, fill, Stroke::new(1.0, base));
        if let Some(p) = hover
            && p.distance(center) <= r.max(4.0)
            && hovered.is_none_or(|(best, _)| r < best)
        {
            hovered = Some((r, m.tooltip.as_str()));
        }
    }

    if let Some((_, tooltip)) = hovered {
        response.on_hover_text(tooltip);
    }
}

fn paint_chart(ui: &mut egui::Ui, series: &[(NaiveDate, i64)], metric: MetricKind) {
    let size = egui::vec2(ui.available_width(), 220.0);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let rect = response.rect;
    painter.rect_stroke(rect, 2.0, Stroke::new(1.0, Color32::LIGHT_GRAY));

    if series.len() < 2 {
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            "No history yet",
            FontId::proportional(14.0),
            Color32::GRAY,
        );
        return;
    }

    let min = series.iter().map(|(_, v)| *v).min().unwrap_or(0).min(0) as f32;
    let max = series.iter().map(|(_, v)| *v).max().unwrap_or(0).max(1) as f32;
    let span = (max - min).max(1.0);
    let n = (series.len() - 1) as f32;
    let to_screen = |i: usize, v: i64| {
        egui::pos2(
            rect.left() + rect.width() * i as f32 / n,
            rect.bottom() - rect.height() * (v as f32 - min) / span,
        )
    };

    let color = color32(metric_color(metric));
    painter.line_segment(
        [to_screen(0, 0), to_screen(series.len() - 1, 0)],
        Stroke::new(1.0, Color32::GRAY),
    );
    let points: Vec<egui::Pos2> = series
        .iter()
        .enumerate()
        .map(|(i, (_, v))| to_screen(i, *v))
        .collect();
    painter.line(points, Stroke::new(2.0, color));

    let last = series[series.len() - 1];
    painter.text(
        rect.left_top() + egui::vec2(6.0, 4.0),
        Align2::LEFT_TOP,
        format!(
            "{} new {metric} on {}",
            covid_tracker::format_total(Some(last.1.max(0) as u64)),
            last.0.format("%b %d")
        ),
        FontId::proportional(12.0),
        Color32::DARK_GRAY,
    );
}

impl eframe::App for TrackerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply completed fetches
        if self.dash.poll() > 0 {
            self.refresh();
        }

        if self.dash.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(6.0);
            self.header(ui);
            ui.add_space(6.0);
        });

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(380.0)
            .show(ctx, |ui| {
                ui.heading("Live Cases by Country");
                egui::ScrollArea::vertical()
                    .max_height((ui.available_height() - 280.0).max(120.0))
                    .show(ui, |ui| {
                        egui::Grid::new("country_table")
                            .striped(true)
                            .num_columns(2)
                            .show(ui, |ui| {
                                for row in &self.rows {
                                    ui.label(row.name.as_str());
                                    ui.label(RichText::new(&row.formatted_case_count).strong());
                                    ui.end_row();
                                }
                            });
                    });
                ui.add_space(10.0);
                let metric = self.dash.selection().metric;
                ui.heading(format!("Worldwide New {metric}"));
                paint_chart(ui, &self.chart, metric);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.cards(ui);
            ui.add_space(10.0);
            paint_map(ui, &self.map_view);
        });
    }
}

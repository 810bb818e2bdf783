use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use covid_tracker::api::{DEFAULT_BASE_URL, DEFAULT_HISTORY_DAYS};
use covid_tracker::viz::{ChartKind, DEFAULT_CHART_SIZE, DEFAULT_MAP_SIZE};
use covid_tracker::{Client, Dashboard, MetricKind, Slice, format_total, storage, viz};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "covid",
    version,
    about = "Fetch, summarize, chart & map COVID-19 statistics"
)]
struct Cli {
    /// API base URL.
    #[arg(long, global = true, env = "COVID_API_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the summary cards for worldwide or one country.
    Summary(SummaryArgs),
    /// Print countries sorted by total cases.
    Table(TableArgs),
    /// Render the worldwide daily-new chart.
    Chart(ChartArgs),
    /// Render the marker map.
    Map(MapArgs),
    /// Save the country list as CSV or JSON.
    Export(ExportArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Metric {
    Cases,
    Recovered,
    Deaths,
}

impl From<Metric> for MetricKind {
    fn from(m: Metric) -> Self {
        match m {
            Metric::Cases => MetricKind::Cases,
            Metric::Recovered => MetricKind::Recovered,
            Metric::Deaths => MetricKind::Deaths,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Line,
    Area,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct SummaryArgs {
    /// ISO2 code or country name; omit for worldwide.
    #[arg(short, long)]
    country: Option<String>,
    /// Card to mark as active.
    #[arg(short, long, value_enum, default_value_t = Metric::Cases)]
    metric: Metric,
}

#[derive(Args, Debug)]
struct TableArgs {
    /// Show only the first N rows.
    #[arg(short = 'n', long)]
    limit: Option<usize>,
}

#[derive(Args, Debug)]
struct ChartArgs {
    /// Output path (.svg or .png).
    #[arg(long)]
    out: PathBuf,
    #[arg(short, long, value_enum, default_value_t = Metric::Cases)]
    metric: Metric,
    /// Days of history to fetch.
    #[arg(long, default_value_t = DEFAULT_HISTORY_DAYS)]
    days: u32,
    #[arg(long, value_enum, default_value_t = Kind::Area)]
    kind: Kind,
    #[arg(long, default_value_t = DEFAULT_CHART_SIZE.0)]
    width: u32,
    #[arg(long, default_value_t = DEFAULT_CHART_SIZE.1)]
    height: u32,
    /// Locale for tick labels (en, de, fr, es, it, pt, nl).
    #[arg(long, default_value = "en")]
    locale: String,
}

#[derive(Args, Debug)]
struct MapArgs {
    /// Output path (.svg or .png).
    #[arg(long)]
    out: PathBuf,
    #[arg(short, long, value_enum, default_value_t = Metric::Cases)]
    metric: Metric,
    /// Center the map on this country instead of the world view.
    #[arg(short, long)]
    country: Option<String>,
    #[arg(long, default_value_t = DEFAULT_MAP_SIZE.0)]
    width: u32,
    #[arg(long, default_value_t = DEFAULT_MAP_SIZE.1)]
    height: u32,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Output file.
    #[arg(long)]
    out: PathBuf,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let client = Client::default().with_base_url(cli.base_url);
    match cli.cmd {
        Command::Summary(args) => cmd_summary(client, args),
        Command::Table(args) => cmd_table(client, args),
        Command::Chart(args) => cmd_chart(client, args),
        Command::Map(args) => cmd_map(client, args),
        Command::Export(args) => cmd_export(client, args),
    }
}

/// Load everything, optionally switch country, and wait for all reads.
fn load(dash: &mut Dashboard<Client>, country: Option<&str>) {
    dash.initialize();
    dash.settle();
    if let Some(code) = country {
        dash.select_country(code);
        dash.settle();
    }
}

fn require(dash: &Dashboard<Client>, slice: Slice) -> Result<()> {
    if let Some(err) = dash.error(slice) {
        bail!("failed to load {slice}: {err}");
    }
    Ok(())
}

fn cmd_summary(client: Client, args: SummaryArgs) -> Result<()> {
    let mut dash = Dashboard::new(client);
    load(&mut dash, args.country.as_deref());
    dash.select_metric(args.metric.into());
    require(&dash, Slice::Summary)?;

    let (Some(subject), Some(cards)) = (dash.summary(), dash.cards()) else {
        bail!("no summary data received");
    };
    println!("{}", subject.label());
    for card in cards {
        let marker = if card.is_active { "*" } else { " " };
        println!(
            "{marker} {:<18} {:>16} today  {:>16} total",
            card.title, card.delta_value, card.current_value
        );
    }
    Ok(())
}

fn cmd_table(client: Client, args: TableArgs) -> Result<()> {
    let mut dash = Dashboard::new(client);
    load(&mut dash, None);
    require(&dash, Slice::Countries)?;

    let rows = dash.table();
    let limit = args.limit.unwrap_or(rows.len());
    for row in rows.iter().take(limit) {
        println!("{:<40} {:>16}", row.name, row.formatted_case_count);
    }
    eprintln!("{} of {} countries", limit.min(rows.len()), rows.len());
    Ok(())
}

fn cmd_chart(client: Client, args: ChartArgs) -> Result<()> {
    let mut dash = Dashboard::new(client).with_history_days(args.days);
    load(&mut dash, None);
    require(&dash, Slice::History)?;
    let metric: MetricKind = args.metric.into();
    dash.select_metric(metric);

    let kind = match args.kind {
        Kind::Line => ChartKind::Line,
        Kind::Area => ChartKind::Area,
    };
    viz::plot_chart(
        &dash.chart(),
        metric,
        &args.out,
        args.width,
        args.height,
        &args.locale,
        kind,
    )?;
    eprintln!("Wrote chart to {}", args.out.display());
    Ok(())
}

fn cmd_map(client: Client, args: MapArgs) -> Result<()> {
    let mut dash = Dashboard::new(client);
    load(&mut dash, args.country.as_deref());
    require(&dash, Slice::Countries)?;
    if args.country.is_some() {
        require(&dash, Slice::Summary)?;
    }
    dash.select_metric(args.metric.into());

    let view = dash.map();
    viz::render_map(&view, &args.out, args.width, args.height)?;
    eprintln!(
        "Wrote map with {} markers to {}",
        format_total(Some(view.markers.len() as u64)),
        args.out.display()
    );
    Ok(())
}

fn cmd_export(client: Client, args: ExportArgs) -> Result<()> {
    let mut dash = Dashboard::new(client);
    load(&mut dash, None);
    require(&dash, Slice::Countries)?;

    let fmt = match args.format {
        Some(OutFormat::Csv) => "csv".to_string(),
        Some(OutFormat::Json) => "json".to_string(),
        None => args
            .out
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("csv")
            .to_ascii_lowercase(),
    };
    match fmt.as_str() {
        "csv" => storage::save_csv(dash.countries(), &args.out)?,
        "json" => storage::save_json(dash.countries(), &args.out)?,
        other => bail!("unsupported format: {}", other),
    }
    eprintln!(
        "Saved {} countries to {}",
        dash.countries().len(),
        args.out.display()
    );
    Ok(())
}

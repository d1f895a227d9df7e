// src/main.rs

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use demand_planner::io::demand;
use demand_planner::io::loader::load_table_file;
use demand_planner::io::reporting::{
    self, write_forecast_csv, write_history_csv, write_order_report, OrderReport,
};
use demand_planner::{ModelKind, PlannerConfig, PlanningPipeline, ServiceLevel};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "demand-planner")]
#[command(about = "30-day demand forecast and replenishment order from a sales CSV")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Forecast one item and recommend an order quantity
    Plan(PlanArgs),
    /// Show detected delimiter, column roles and ABC classes
    Inspect(InputArgs),
    /// Write a synthetic multi-item sales CSV
    Demo {
        /// Output path
        #[arg(short, long, default_value = "demo_sales.csv")]
        out: PathBuf,
        /// First day of the generated history (YYYY-MM-DD)
        #[arg(long, default_value = "2024-01-01")]
        start: NaiveDate,
        /// Seed for the noisy item
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Sales export (CSV, any delimiter)
    input: PathBuf,

    /// JSON config file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Force the date column
    #[arg(long)]
    date_col: Option<String>,

    /// Force the item column
    #[arg(long)]
    item_col: Option<String>,

    /// Force the sales column
    #[arg(long)]
    sales_col: Option<String>,
}

#[derive(Args)]
struct PlanArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Item to plan (defaults to the first item in the file)
    #[arg(short, long)]
    item: Option<String>,

    /// Target service level: 0.80, 0.90, 0.95 or 0.99
    #[arg(short, long)]
    service_level: Option<f64>,

    /// Forecasting model
    #[arg(long, value_enum)]
    model: Option<ModelArg>,

    /// Write the order report here instead of stdout
    #[arg(long)]
    report: Option<PathBuf>,

    /// Export fitted and future forecast values as CSV
    #[arg(long)]
    forecast_csv: Option<PathBuf>,

    /// Export the daily history with its 7-day average as CSV
    #[arg(long)]
    history_csv: Option<PathBuf>,

    /// Print the full run as JSON instead of the text report
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModelArg {
    Seasonal,
    Mean,
}

impl From<ModelArg> for ModelKind {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Seasonal => ModelKind::Seasonal,
            ModelArg::Mean => ModelKind::Mean,
        }
    }
}

fn load_config(args: &InputArgs) -> Result<PlannerConfig> {
    let mut config = match &args.config {
        Some(path) => PlannerConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PlannerConfig::default(),
    };
    if let Some(col) = &args.date_col {
        config.columns.date_col = Some(col.clone());
    }
    if let Some(col) = &args.item_col {
        config.columns.item_col = Some(col.clone());
    }
    if let Some(col) = &args.sales_col {
        config.columns.sales_col = Some(col.clone());
    }
    Ok(config)
}

fn run_plan(args: PlanArgs) -> Result<()> {
    let mut config = load_config(&args.input)?;
    if let Some(level) = args.service_level {
        config.service_level = ServiceLevel::try_from(level)?;
    }
    if let Some(model) = args.model {
        config.model = model.into();
    }
    let horizon_days = config.horizon_days;

    let pipeline = PlanningPipeline::new(config)?;
    let table = load_table_file(&args.input.input)
        .with_context(|| format!("reading {}", args.input.input.display()))?;
    let outcome = pipeline.run(table, args.item.as_deref())?;
    let run = &outcome.run;

    if let Some(path) = &args.forecast_csv {
        match &run.forecast {
            Some(forecast) => write_forecast_csv(path, forecast)?,
            None => info!("no forecast to export for '{}'", run.item),
        }
    }
    if let Some(path) = &args.history_csv {
        write_history_csv(path, &run.series)?;
    }

    if args.json {
        println!("{}", reporting::run_report_json(&outcome)?);
        return Ok(());
    }

    let report = OrderReport {
        run,
        horizon_days,
        report_date: Local::now().date_naive(),
    };
    match &args.report {
        Some(path) => {
            write_order_report(path, &report)?;
            println!("Report written to {}", path.display());
        }
        None => print!("{}", report),
    }
    Ok(())
}

fn run_inspect(args: InputArgs) -> Result<()> {
    let config = load_config(&args)?;
    let pipeline = PlanningPipeline::new(config)?;
    let table = load_table_file(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let delimiter = table.delimiter;
    let headers = table.headers.clone();
    let dataset = pipeline.prepare(table)?;

    println!("Delimiter:       {:?}", delimiter as char);
    println!("Columns:         {}", headers.join(", "));
    println!("Numeric columns: {}", dataset.numeric_columns.join(", "));
    println!(
        "Mapping:         date='{}' item='{}' sales='{}'",
        dataset.mapping.date_col, dataset.mapping.item_col, dataset.mapping.sales_col
    );
    println!(
        "Dates:           {:?} pass, {} of {} rows dropped",
        dataset.dated.summary.pass,
        dataset.dated.summary.dropped_rows,
        dataset.dated.summary.total_rows
    );
    println!("\n=== ABC Classification ===");
    for entry in &dataset.abc.ranked {
        println!(
            "{:<24} {:>12.2} {:>7.1}%  {}",
            entry.item,
            entry.total_sales,
            entry.cumulative_share * 100.0,
            entry.class
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Plan(args) => run_plan(args),
        Command::Inspect(args) => run_inspect(args),
        Command::Demo { out, start, seed } => {
            let records = demand::demo_dataset(start, seed)?;
            demand::write_sales_csv(&out, &records)?;
            println!("Success! {} rows written to {}", records.len(), out.display());
            Ok(())
        }
    }
}

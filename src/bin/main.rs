//! Sales dashboard CLI
//!
//! Usage:
//!   sales-dashboard overview [--region <region>] [--year <year>] [--seller <name>]... [--top <k>] [--json]
//!   sales-dashboard raw [filters...] [--columns <name>]... [--output <name>] [--out-dir <dir>]
//!   sales-dashboard options <field> [--region <region>] [--year <year>]
//!
//! Examples:
//!   sales-dashboard overview --region sudeste --year 2022 --top 7
//!   sales-dashboard raw --category livros --price-max 500 --output livros
//!   sales-dashboard options Vendedor --region sul --year 2021

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use sales_dashboard::filter::{self, Constraint, FilterCriteria};
use sales_dashboard::present::{Chart, DashboardView};
use sales_dashboard::{
    config, Field, OverviewRequest, Region, Result, SalesDashboard, SourceQuery,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "sales-dashboard")]
#[command(about = "Sales dashboard - filter, aggregate and export sales records")]
#[command(version)]
struct Cli {
    /// URL the sales records are fetched from
    #[arg(long, global = true, default_value = config::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// HTTP timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Revenue, sales and seller rankings for a region and period
    Overview {
        /// Region (Brasil, Centro-Oeste, Nordeste, Norte, Sudeste, Sul)
        #[arg(short, long, default_value = "Brasil", value_parser = parse_region)]
        region: Region,

        /// Year (2020-2023); every period when omitted
        #[arg(short, long)]
        year: Option<i32>,

        /// Restrict to these sellers (repeatable)
        #[arg(short, long)]
        seller: Vec<String>,

        /// Number of sellers in the rankings (2-10)
        #[arg(short, long, default_value_t = config::DEFAULT_TOP_K)]
        top: usize,

        /// Print the whole view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Filter the raw records and export them as CSV
    Raw(RawArgs),

    /// List the distinct values of a text column
    Options {
        /// Column name, e.g. "Vendedor"
        #[arg(value_parser = parse_field)]
        field: Field,

        /// Only consider records of this region
        #[arg(short, long, default_value = "Brasil", value_parser = parse_region)]
        region: Region,

        /// Only consider records of this year (2020-2023)
        #[arg(short, long)]
        year: Option<i32>,
    },
}

#[derive(Args)]
struct RawArgs {
    #[arg(long)]
    product: Vec<String>,
    #[arg(long)]
    category: Vec<String>,
    #[arg(long)]
    seller: Vec<String>,
    #[arg(long)]
    location: Vec<String>,
    #[arg(long)]
    payment_type: Vec<String>,

    #[arg(long)]
    price_min: Option<f64>,
    #[arg(long)]
    price_max: Option<f64>,
    #[arg(long)]
    freight_min: Option<f64>,
    #[arg(long)]
    freight_max: Option<f64>,
    #[arg(long)]
    rating_min: Option<i64>,
    #[arg(long)]
    rating_max: Option<i64>,
    #[arg(long)]
    installments_min: Option<i64>,
    #[arg(long)]
    installments_max: Option<i64>,

    /// First purchase date (YYYY-MM-DD)
    #[arg(long)]
    date_from: Option<NaiveDate>,
    /// Last purchase date (YYYY-MM-DD)
    #[arg(long)]
    date_to: Option<NaiveDate>,

    /// Columns to keep (repeatable); all when omitted
    #[arg(long)]
    columns: Vec<String>,

    /// Base name of the CSV file
    #[arg(short, long, default_value = config::DEFAULT_EXPORT_NAME)]
    output: String,

    /// Directory the CSV is written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

impl RawArgs {
    fn criteria(&self) -> Result<FilterCriteria> {
        let mut criteria = FilterCriteria::new();

        for (field, values) in [
            (Field::Product, &self.product),
            (Field::Category, &self.category),
            (Field::Seller, &self.seller),
            (Field::Location, &self.location),
            (Field::PaymentType, &self.payment_type),
        ] {
            if !values.is_empty() {
                criteria = criteria.with(field, Constraint::one_of(values.iter().cloned()))?;
            }
        }

        for (field, lo, hi) in [
            (Field::Price, self.price_min, self.price_max),
            (Field::Freight, self.freight_min, self.freight_max),
        ] {
            if lo.is_some() || hi.is_some() {
                criteria = criteria.with(
                    field,
                    Constraint::Between(
                        lo.unwrap_or(f64::NEG_INFINITY),
                        hi.unwrap_or(f64::INFINITY),
                    ),
                )?;
            }
        }

        for (field, lo, hi) in [
            (Field::Rating, self.rating_min, self.rating_max),
            (Field::Installments, self.installments_min, self.installments_max),
        ] {
            if lo.is_some() || hi.is_some() {
                criteria = criteria.with(
                    field,
                    Constraint::IntBetween(lo.unwrap_or(i64::MIN), hi.unwrap_or(i64::MAX)),
                )?;
            }
        }

        if self.date_from.is_some() || self.date_to.is_some() {
            criteria = criteria.with(
                Field::PurchaseDate,
                Constraint::DateBetween(
                    self.date_from.unwrap_or(NaiveDate::MIN),
                    self.date_to.unwrap_or(NaiveDate::MAX),
                ),
            )?;
        }

        Ok(criteria)
    }
}

fn parse_region(s: &str) -> std::result::Result<Region, String> {
    s.parse().map_err(|e: sales_dashboard::DashboardError| e.to_string())
}

fn parse_field(s: &str) -> std::result::Result<Field, String> {
    s.parse().map_err(|e: sales_dashboard::DashboardError| e.to_string())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let dashboard = SalesDashboard::builder()
        .endpoint(cli.endpoint)
        .timeout(Duration::from_secs(cli.timeout))
        .build();

    let result = match cli.command {
        Commands::Overview {
            region,
            year,
            seller,
            top,
            json,
        } => run_overview(&dashboard, region, year, seller, top, json),
        Commands::Raw(args) => run_raw(&dashboard, &args),
        Commands::Options {
            field,
            region,
            year,
        } => run_options(&dashboard, field, region, year),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_overview(
    dashboard: &SalesDashboard,
    region: Region,
    year: Option<i32>,
    sellers: Vec<String>,
    top: usize,
    json: bool,
) -> Result<()> {
    let request = OverviewRequest::new(region, year)?
        .sellers(sellers)
        .top_k(top);
    let view = dashboard.overview(&request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_view(&view);
    }
    Ok(())
}

fn run_raw(dashboard: &SalesDashboard, args: &RawArgs) -> Result<()> {
    let criteria = args.criteria()?;
    let columns = if args.columns.is_empty() {
        filter::all_columns()
    } else {
        filter::parse_columns(&args.columns)?
    };

    let table = dashboard.raw_table(&criteria, &columns)?;
    println!(
        "The table has {} rows and {} columns.",
        table.len(),
        table.columns().len()
    );

    let download = dashboard.download(&table, &args.output)?;
    let path = download.write_to(&args.out_dir)?;
    println!("Saved {} ({}) to {}", download.file_name, download.mime, path.display());
    Ok(())
}

fn run_options(
    dashboard: &SalesDashboard,
    field: Field,
    region: Region,
    year: Option<i32>,
) -> Result<()> {
    let query = SourceQuery::new(region, year)?;
    for value in dashboard.options(&query, field)? {
        println!("{}", value);
    }
    Ok(())
}

fn print_view(view: &DashboardView) {
    println!("{}: {}", view.revenue.label, view.revenue.display);
    println!("{}: {}", view.sales.label, view.sales.display);
    for chart in [
        &view.top_locations,
        &view.monthly_revenue,
        &view.category_revenue,
        &view.top_sellers_by_revenue,
        &view.top_sellers_by_sales,
    ] {
        print_chart(chart);
    }
}

fn print_chart(chart: &Chart) {
    println!("\n{}", chart.title);
    for point in &chart.points {
        match &point.series {
            Some(series) => println!("  {:<24} {:<6} {:>14.2}", point.label, series, point.value),
            None => println!("  {:<24} {:>14.2}", point.label, point.value),
        }
    }
}

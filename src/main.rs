use clap::{Parser, Subcommand, ValueEnum};
use fca_toolset::cli;
use fca_toolset::core::{SeriesMetric, TechAggregation};
use fca_toolset::error::FcaResult;
use fca_toolset::layout::{load_layout, SheetLayout};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fca")]
#[command(about = "Functional cost analysis: extract, score and compare product workbooks.")]
#[command(long_about = "FCA - Functional cost analysis toolset
Reads positional cost-structure workbooks (H1 main functions, H2 sub-functions,
weights and costs at fixed rows) and compares products.

COMMANDS:
  inspect  - H1/H2 tables, tech scores and cost check of one workbook
  tech     - Technical evaluation per main function across workbooks
  compare  - Top cost deviations between two workbooks
  matrix   - Sub-function costs or tech scores across workbooks

DEFAULT LAYOUT (0-based, override with --layout):
  cost sheet: 'SLAVE_Funktions-Kostenstruktur' or *funktion*kosten*
    start column I (8); rows H1=0 H2=1 H1 weight=3 H2 weight=4
    H1 cost=6 H2 cost=7
  tech sheet: 'SLAVE_Techn.Bewertung' or *techn*/*bewert*
    label column B (1), score column R (17), 4 header rows

EXAMPLES:
  fca inspect produkt_a.xlsx
  fca compare produkt_a.xlsx produkt_b.xlsx --top 5 -o report.json
  fca tech produkt_a.xlsx produkt_b.xlsx --mode weighted
  fca --layout layout.yaml matrix *.xlsx --metric cost

Logging: RUST_LOG=fca_toolset=debug")]
#[command(version)]
struct Cli {
    /// YAML layout file overriding the default row/column contract
    #[arg(short, long, global = true, env = "FCA_LAYOUT")]
    layout: Option<PathBuf>,

    /// Log parsing decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show H1/H2 tables, tech scores and cost check of one workbook
    Inspect {
        /// Path to workbook (.xlsx, .xlsm, .xls, .ods)
        file: PathBuf,
    },

    /// Technical evaluation per main function across workbooks
    Tech {
        /// Workbooks, one per product
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Highlighted H1 aggregation
        #[arg(short, long, value_enum, default_value = "mean")]
        mode: ModeArg,
    },

    #[command(long_about = "Rank sub-function cost deviations between two products.

Sub-functions are matched on (H1, H2). A sub-function missing in one product
counts as zero cost. Delta = cost B - cost A, ranked by absolute delta.

OUTPUT FORMATS:
  Terminal table (default)
  JSON:  fca compare a.xlsx b.xlsx -o report.json
  YAML:  fca compare a.xlsx b.xlsx -o report.yaml
  Excel: fca compare a.xlsx b.xlsx -o report.xlsx")]
    /// Top cost deviations between two workbooks
    Compare {
        /// Workbook of product A
        product_a: PathBuf,

        /// Workbook of product B
        product_b: PathBuf,

        /// Number of deviations to keep (default from layout: 10)
        #[arg(short, long)]
        top: Option<usize>,

        /// Also show H1 deviations
        #[arg(long)]
        h1: bool,

        /// Export the report (.json, .yaml or .xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Free-text annotation stored with the exported report (repeatable)
        #[arg(short, long)]
        note: Vec<String>,
    },

    /// Sub-function costs or tech scores across workbooks
    Matrix {
        /// Workbooks, one per product
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Value per sub-function
        #[arg(short, long, value_enum, default_value = "cost")]
        metric: MetricArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Mean,
    Weighted,
}

impl From<ModeArg> for TechAggregation {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Mean => TechAggregation::Mean,
            ModeArg::Weighted => TechAggregation::Weighted,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum MetricArg {
    Cost,
    Tech,
}

impl From<MetricArg> for SeriesMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Cost => SeriesMetric::Cost,
            MetricArg::Tech => SeriesMetric::Tech,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "fca_toolset=debug"
    } else {
        "fca_toolset=error"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> FcaResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let layout = match &cli.layout {
        Some(path) => load_layout(path)?,
        None => SheetLayout::default(),
    };

    match cli.command {
        Commands::Inspect { file } => cli::inspect(file, &layout),

        Commands::Tech { files, mode } => cli::tech(files, &layout, mode.into()),

        Commands::Compare {
            product_a,
            product_b,
            top,
            h1,
            output,
            note,
        } => cli::compare(product_a, product_b, &layout, top, h1, output, note),

        Commands::Matrix { files, metric } => cli::matrix(files, &layout, metric.into()),
    }
}

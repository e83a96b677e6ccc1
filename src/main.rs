use clap::{Args, Parser, Subcommand};
use royalbit_sitebw::cli;
use royalbit_sitebw::config::LoaderConfig;
use royalbit_sitebw::dashboard::{FilterSelection, DEFAULT_PREVIEW_ROWS};
use royalbit_sitebw::error::SiteBwResult;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sitebw")]
#[command(about = "Site bandwidth spreadsheet loader and dashboard data views")]
#[command(long_about = "sitebw - Site bandwidth spreadsheet loader

Loads a site bandwidth workbook (xlsx/xls/ods/csv), cleans numeric columns
(\"100 mbps\", \"Rs. 1,250\"), normalizes headers and resolves column aliases.
Missing columns disable the views that need them instead of failing.

COMMANDS:
  load      - Load and report resolved columns and diagnostics
  columns   - List cleaned headers
  options   - Show BW Group / Site Name filter values
  kpis      - Total sites, average May usage, average allocation
  charts    - Chart datasets (text or --json)
  preview   - First rows of the filtered table
  export    - Write the cleaned (filtered) table to .xlsx
  watch     - Reload whenever the source file changes

EXAMPLES:
  sitebw load
  sitebw --source data/sites.xlsx kpis --bw-group A --bw-group B
  sitebw charts --json > charts.json
  sitebw export cleaned.xlsx --site Kandy")]
#[command(version)]
struct Cli {
    /// YAML loader config (sources, column specs, renames)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Candidate source path, tried in order (overrides config sources)
    #[arg(
        short,
        long = "source",
        global = true,
        env = "SITEBW_DATA",
        value_delimiter = ','
    )]
    sources: Vec<PathBuf>,

    /// Show verbose output and debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Keep only these BW groups (repeatable)
    #[arg(long = "bw-group")]
    bw_groups: Vec<String>,

    /// Keep only these sites (repeatable)
    #[arg(long = "site")]
    sites: Vec<String>,
}

impl From<FilterArgs> for FilterSelection {
    fn from(args: FilterArgs) -> Self {
        FilterSelection {
            bw_groups: args.bw_groups,
            sites: args.sites,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Load the source and report resolved columns and diagnostics
    Load,

    /// List cleaned headers and their canonical names
    Columns,

    /// Show filter option values
    Options,

    /// Show key metrics for the filtered data
    Kpis {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Show chart datasets for the filtered data
    Charts {
        #[command(flatten)]
        filters: FilterArgs,

        /// Print JSON instead of a text summary
        #[arg(long)]
        json: bool,
    },

    /// Show the first rows of the filtered data
    Preview {
        #[command(flatten)]
        filters: FilterArgs,

        /// Number of rows to show
        #[arg(short = 'n', long, default_value_t = DEFAULT_PREVIEW_ROWS)]
        limit: usize,
    },

    /// Export the cleaned (filtered) table to Excel .xlsx
    Export {
        /// Output Excel file path (.xlsx)
        output: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,
    },

    #[command(long_about = "Watch the source file and reload on changes.

The cached load result is invalidated whenever the resolved source file is
written, then reloaded and summarized.

Press Ctrl+C to stop watching.")]
    /// Reload whenever the source file changes
    Watch,
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "royalbit_sitebw=debug"
    } else {
        "royalbit_sitebw=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> SiteBwResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => LoaderConfig::from_file(path)?,
        None => LoaderConfig::default(),
    }
    .with_sources(cli.sources);

    match cli.command {
        Commands::Load => cli::load(&config, cli.verbose),
        Commands::Columns => cli::columns(&config),
        Commands::Options => cli::options(&config),
        Commands::Kpis { filters } => cli::kpis(&config, &filters.into()),
        Commands::Charts { filters, json } => cli::charts(&config, &filters.into(), json),
        Commands::Preview { filters, limit } => cli::preview(&config, &filters.into(), limit),
        Commands::Export { output, filters } => {
            cli::export(&config, &filters.into(), output, cli.verbose)
        }
        Commands::Watch => cli::watch(&config, cli.verbose),
    }
}

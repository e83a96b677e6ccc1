//! Site bandwidth data API binary
//!
//! Serves cleaned site bandwidth data and dashboard views over HTTP.

use clap::Parser;
use royalbit_sitebw::api::{run_api_server, ApiConfig};
use royalbit_sitebw::config::LoaderConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sitebw-server")]
#[command(version)]
#[command(author = "RoyalBit Inc. <admin@royalbit.ca>")]
#[command(about = "Site bandwidth data API - HTTP views over the cleaned spreadsheet")]
#[command(long_about = r#"
Site bandwidth data API

Endpoints:
  - GET  /api/v1/columns   - Load summary, headers, resolved columns, diagnostics
  - GET  /api/v1/options   - BW Group / Site Name filter values
  - GET  /api/v1/kpis      - Key metrics (?bw_group=A,B&site=Kandy)
  - GET  /api/v1/charts    - Chart datasets (same filters)
  - GET  /api/v1/preview   - First rows (?limit=100 plus filters)
  - POST /api/v1/reload    - Invalidate the cached load and reload

Additional endpoints:
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                 - API documentation

Example usage:
  sitebw-server                                   # Start on localhost:8080
  sitebw-server --source /srv/data/sites.xlsx --port 3000

  curl "http://localhost:8080/api/v1/kpis?bw_group=A"
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "SITEBW_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "SITEBW_PORT")]
    port: u16,

    /// YAML loader config (sources, column specs, renames)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Candidate source path, tried in order (overrides config sources)
    #[arg(short, long = "source", env = "SITEBW_DATA", value_delimiter = ',')]
    sources: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let loader = match &args.config {
        Some(path) => LoaderConfig::from_file(path)?,
        None => LoaderConfig::default(),
    }
    .with_sources(args.sources);

    let config = ApiConfig {
        host: args.host,
        port: args.port,
    };

    run_api_server(config, loader).await
}

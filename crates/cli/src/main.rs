// ABOUTME: CLI for scraping one SDAT property detail page.
// ABOUTME: Takes a parcel id (or a saved HTML file) and prints owner and transfer information as text or JSON.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use sdat_detail::{Client, PropertyDetails, PropertyQuery, DEFAULT_BASE_URL, DETAIL_TABLE_ID};
use tracing::debug;

/// Scrape owner and transfer information for one parcel.
#[derive(Parser, Debug)]
#[command(name = "sdat")]
#[command(about = "Scrape owner and transfer information from an SDAT property detail page", long_about = None)]
struct Args {
    /// Parcel as COUNTY-WARD-SECTION-BLOCK-LOT, e.g. 03-16-10-0097-054
    #[arg()]
    parcel: Option<String>,

    /// County code (2 digits)
    #[arg(long)]
    county: Option<u32>,

    /// Ward code (2 digits)
    #[arg(long)]
    ward: Option<u32>,

    /// Section code (2 digits)
    #[arg(long)]
    section: Option<u32>,

    /// Block code (4 digits)
    #[arg(long)]
    block: Option<u32>,

    /// Lot code (3 digits)
    #[arg(long)]
    lot: Option<u32>,

    /// Extract from a saved detail page instead of fetching
    #[arg(long = "html")]
    html: Option<PathBuf>,

    /// URL recorded in the result when using --html
    #[arg(long = "url", requires = "html")]
    url: Option<String>,

    /// Detail page URL that query parameters are appended to
    #[arg(long, env = "SDAT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Id of the table holding the owner and transfer sections
    #[arg(long, default_value = DETAIL_TABLE_ID)]
    table_id: String,

    /// Request timeout in seconds
    #[arg(long, env = "SDAT_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Output JSON instead of text
    #[arg(long = "json")]
    json_output: bool,

    /// Output compact JSON instead of pretty (implies --json).
    #[arg(long, default_value_t = false)]
    compact: bool,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .try_init();
}

fn has_parcel_args(args: &Args) -> bool {
    args.parcel.is_some()
        || [args.county, args.ward, args.section, args.block, args.lot]
            .iter()
            .any(Option::is_some)
}

/// Resolve the parcel from the positional id or the five field flags.
fn resolve_query(args: &Args) -> Result<PropertyQuery> {
    let fields = [args.county, args.ward, args.section, args.block, args.lot];
    let any_field = fields.iter().any(Option::is_some);

    match (&args.parcel, any_field) {
        (Some(_), true) => bail!("give the parcel either positionally or with field flags, not both"),
        (Some(parcel), false) => Ok(parcel.parse::<PropertyQuery>()?),
        (None, true) => match fields {
            [Some(county), Some(ward), Some(section), Some(block), Some(lot)] => {
                Ok(PropertyQuery::new(county, ward, section, block, lot)?)
            }
            _ => bail!("--county, --ward, --section, --block and --lot must all be given"),
        },
        (None, false) => {
            bail!("a parcel is required: pass COUNTY-WARD-SECTION-BLOCK-LOT or use --html")
        }
    }
}

fn format_output(details: &PropertyDetails, args: &Args) -> Result<String> {
    if args.compact {
        Ok(serde_json::to_string(details)?)
    } else if args.json_output {
        Ok(serde_json::to_string_pretty(details)?)
    } else {
        Ok(details.format_text())
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let client = Client::builder()
        .base_url(args.base_url.clone())
        .table_id(args.table_id.clone())
        .timeout(Duration::from_secs(args.timeout_secs))
        .build();

    let start = Instant::now();

    let details = if let Some(html_path) = &args.html {
        if has_parcel_args(&args) {
            bail!("cannot use --html together with a parcel id or field flags");
        }
        let html = fs::read_to_string(html_path)
            .with_context(|| format!("error reading file {:?}", html_path))?;
        let url = args
            .url
            .clone()
            .unwrap_or_else(|| html_path.display().to_string());
        client.parse_html(&html, &url)?
    } else {
        let query = resolve_query(&args)?;
        debug!(parcel = %query, "resolved parcel");
        client.scrape(&query)?
    };

    let elapsed = start.elapsed();
    let output = format_output(&details, &args)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)
            .with_context(|| format!("error writing to {:?}", output_path))?;
    } else {
        print!("{}", output);
        if !output.ends_with('\n') {
            println!();
        }
    }

    if args.timing {
        let _ = writeln!(io::stderr(), "elapsed: {}ms", elapsed.as_millis());
    }

    Ok(())
}

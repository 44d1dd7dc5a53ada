// ABOUTME: CLI binary for the unipage extraction engine.
// ABOUTME: Extracts configured fields from saved profile pages and prints the merged JSON result.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use unipage_engine::{
    page_prefix_for_file, resource, validate, Engine, ExtractError, ExtractionConfig,
    ExtractionResult, DEFAULT_RANKINGS_FIELD,
};

#[derive(Parser, Debug)]
#[command(name = "unipage")]
#[command(about = "Extract structured fields from saved university profile pages")]
struct Args {
    /// JSON extraction configuration
    #[arg(short = 'c', long = "config")]
    config: PathBuf,

    /// Page prefix to use for every file (default: derived from each file name)
    #[arg(short = 'p', long = "page")]
    page: Option<String>,

    /// Normalize the ranking list into a label -> rank map
    #[arg(long = "rankings")]
    rankings: bool,

    /// Report values whose type differs from the declared one on stderr
    #[arg(long = "validate")]
    validate: bool,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Saved HTML pages to extract from
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Extracts one page with the fields configured for its prefix.
///
/// Returns `Ok(None)` when no configured field belongs to the page.
fn extract_page(
    args: &Args,
    config: &ExtractionConfig,
    file: &Path,
) -> Result<Option<ExtractionResult>, ExtractError> {
    let prefix = args
        .page
        .clone()
        .unwrap_or_else(|| page_prefix_for_file(file));
    let page_config = config.for_page(&prefix);
    if page_config.is_empty() {
        warn!(file = %file.display(), prefix = %prefix, "no configured fields for page, skipped");
        return Ok(None);
    }

    let engine = Engine::builder().config(page_config).build()?;
    let html = resource::read_html(file)?;
    let result = engine.extract(&html);

    if args.validate {
        for mismatch in validate::check(&result, engine.config()) {
            eprintln!("{}: {}", file.display(), mismatch);
        }
    }
    Ok(Some(result))
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let config = match ExtractionConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error loading config: {}", e);
            return ExitCode::from(1);
        }
    };

    let mut merged = ExtractionResult::new();
    for file in &args.files {
        match extract_page(&args, &config, file) {
            Ok(Some(result)) => merged.merge(result),
            Ok(None) => {}
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::from(1);
            }
        }
    }

    if args.rankings {
        merged = merged.process_rankings(DEFAULT_RANKINGS_FIELD);
    }

    let output_str = match serde_json::to_string_pretty(&merged) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error serializing result: {}", e);
            return ExitCode::from(1);
        }
    };

    if let Some(output_path) = &args.output {
        if let Err(e) = fs::write(output_path, &output_str) {
            eprintln!("error writing to {:?}: {}", output_path, e);
            return ExitCode::from(1);
        }
    } else {
        println!("{}", output_str);
    }

    ExitCode::SUCCESS
}

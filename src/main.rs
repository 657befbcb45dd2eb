//! steamguide - Steam Workshop guide to Markdown converter

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use steamguide::cli::init_tracing;
use steamguide::{ConvertConfig, DEFAULT_OUTPUT_DIR, GuideConverter};

#[derive(Parser)]
#[command(name = "steamguide")]
#[command(version, about = "Download and convert Steam guides to Markdown", long_about = None)]
#[command(after_help = "EXAMPLES:
    steamguide 'https://steamcommunity.com/sharedfiles/filedetails/?id=123'
    steamguide -o guides --cdn https://cdn.example.com 'https://...?id=123'
    steamguide -i 'https://...?id=123'      Show guide metadata as JSON")]
struct Cli {
    /// Steam guide URL
    #[arg(value_name = "URL")]
    url: String,

    /// Output directory
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// CDN base URL for images
    #[arg(long, value_name = "URL")]
    cdn: Option<String>,

    /// Include Steam UI images (default: skip them)
    #[arg(long)]
    include_ui: bool,

    /// Pause before each image download, in milliseconds
    #[arg(long, value_name = "N", default_value_t = 500)]
    delay_ms: u64,

    /// Print guide metadata as JSON without converting
    #[arg(short, long)]
    info: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log per-element detail
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.quiet, cli.verbose) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    let result = if cli.info {
        show_info(&cli)
    } else {
        convert(&cli)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn converter(cli: &Cli) -> steamguide::Result<GuideConverter> {
    let config = ConvertConfig::default()
        .with_output_dir(&cli.output)
        .with_cdn_base(cli.cdn.clone())
        .with_skip_ui(!cli.include_ui)
        .with_delay(Duration::from_millis(cli.delay_ms));
    GuideConverter::new(config)
}

fn show_info(cli: &Cli) -> steamguide::Result<()> {
    let metadata = converter(cli)?.info(&cli.url)?;
    let json = serde_json::to_string_pretty(&metadata)
        .map_err(|e| steamguide::Error::Unknown(e.to_string()))?;
    println!("{json}");
    Ok(())
}

fn convert(cli: &Cli) -> steamguide::Result<()> {
    let outcome = converter(cli)?.process(&cli.url)?;
    if !cli.quiet {
        println!();
        println!("Success! Guide converted to: {}", outcome.path.display());
        println!("Images downloaded: {}", outcome.images);
    }
    Ok(())
}

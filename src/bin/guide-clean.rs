//! guide-clean - download a page and strip navigation divs

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use steamguide::cli::init_tracing;
use steamguide::prune::DEFAULT_IDS;
use steamguide::{CleanConfig, PageCleaner, PruneList};

#[derive(Parser)]
#[command(name = "guide-clean")]
#[command(version, about = "Download a webpage and remove specified div elements", long_about = None)]
#[command(after_help = "EXAMPLES:
    guide-clean 'https://steamcommunity.com/sharedfiles/filedetails/?id=123'
    guide-clean URL --ids global_header footer --classes sidebar --output page.html")]
struct Cli {
    /// The URL of the webpage to process
    #[arg(value_name = "URL")]
    url: String,

    /// Div IDs to remove
    #[arg(long, num_args = 0.., value_name = "ID", allow_negative_numbers = true, default_values_t = DEFAULT_IDS.iter().map(|id| id.to_string()))]
    ids: Vec<String>,

    /// Div class names to remove
    #[arg(long, num_args = 0.., value_name = "CLASS")]
    classes: Vec<String>,

    /// Output HTML file (default: derived from the guide title, else cleaned_page.html)
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

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

    let config = CleanConfig::default()
        .with_prune_list(PruneList::new(cli.ids, cli.classes))
        .with_output(cli.output);

    match PageCleaner::new(config).and_then(|cleaner| cleaner.process(&cli.url)) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use ufcstats_scraper::{
    load_recent_events, load_single_event, print_event_records, Config, CsvSink, HttpFetcher,
    Result, SystemClock,
};

#[derive(Parser, Debug)]
#[command(name = "ufcstats_scraper", version, about = "Scrape ufcstats.com events into CSV tables")]
struct Cli {
    /// Log filter, e.g. "info" or "ufcstats_scraper=debug" (overrides LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Site root (overrides UFCSTATS_BASE)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Directory for fighters.csv, fights.csv and fighter_stats.csv (overrides OUTPUT_DIR)
    #[arg(short, long, global = true)]
    output_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print completed event URLs, newest first
    Events {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Scrape one event-details page and replace the CSV tables with it
    Event {
        url: String,
        /// Print the parsed records instead of writing CSV
        #[arg(long)]
        print: bool,
    },
    /// Scrape the most recent completed events into the CSV tables
    Load {
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };
    if let Some(level) = cli.log_level.clone() {
        config.log_level = level;
    }
    if let Some(base) = cli.base_url.clone() {
        config.base_url = base.trim_end_matches('/').to_string();
    }
    if let Some(dir) = cli.output_dir.clone() {
        config.output_dir = dir;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .init();

    if let Err(e) = run(cli.command, &config).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Command, config: &Config) -> Result<()> {
    let fetcher = HttpFetcher::new(config)?;

    match command {
        Command::Events { limit } => {
            let urls = ufcstats_scraper::list_completed_event_urls(&fetcher, config, limit).await?;
            for url in urls {
                println!("{url}");
            }
        }
        Command::Event { url, print } => {
            if print {
                let records = ufcstats_scraper::parse_event(&fetcher, &SystemClock, &url).await?;
                print_event_records(&records);
            } else {
                let mut sink = CsvSink::new(&config.output_dir)?;
                let records = load_single_event(&fetcher, &SystemClock, &mut sink, &url).await?;
                println!(
                    "Wrote {} fighters, {} fights, {} stat rows to {}",
                    records.fighters.len(),
                    records.fights.len(),
                    records.fighter_stats.len(),
                    sink.dir().display()
                );
            }
        }
        Command::Load { limit } => {
            let mut sink = CsvSink::new(&config.output_dir)?;
            let summary =
                load_recent_events(&fetcher, &SystemClock, &mut sink, config, Some(limit)).await?;
            println!(
                "Loaded {}/{} events: {} fighters, {} fights, {} stat rows ({} skipped, {} failed)",
                summary.events_loaded,
                summary.events_listed,
                summary.fighters,
                summary.fights,
                summary.fighter_stats,
                summary.events_skipped,
                summary.events_failed
            );
        }
    }

    Ok(())
}

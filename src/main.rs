use clap::Parser;

use squash_court_checker::checker::SquashChecker;
use squash_court_checker::config::CheckerConfig;

#[derive(Parser, Debug)]
#[command(
    name = "squash-court-checker",
    version,
    about = "Check Places Leisure squash court availability"
)]
struct Cli {
    /// Target date (YYYY-MM-DD); defaults to today at the facility
    #[arg(long)]
    date: Option<String>,

    /// Start time (HH:MM); checks the 40-minute slot and the 40 minutes before it
    #[arg(long)]
    start_time: String,

    /// Override the slot feed base URL
    #[arg(long)]
    feed_url: Option<String>,
}

fn main() {
    // Logs go to stderr; the JSON report owns stdout.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    let cli = Cli::parse();

    let mut config = CheckerConfig::default();
    if let Some(feed_url) = cli.feed_url {
        config.feed_url = feed_url;
    }

    let date = cli.date.unwrap_or_else(|| {
        chrono::Utc::now()
            .with_timezone(&config.timezone)
            .date_naive()
            .format("%Y-%m-%d")
            .to_string()
    });

    let checker = SquashChecker::new(config);
    let report = checker.check(&date, &cli.start_time);

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize report: {}", e);
            std::process::exit(1);
        }
    }
}

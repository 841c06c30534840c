//! vrijeme.hr poller CLI
//!
//! Usage:
//!   vrijeme_node run -c config.yaml          # Poll until Ctrl+C, print snapshots as JSON
//!   vrijeme_node run --city Zagreb-Grič      # Same, without a config file
//!   vrijeme_node once --city Split-Marjan    # Single refresh, print sensor table
//!   vrijeme_node cities                      # List city names in the feed

use argh::FromArgs;
use vrijeme::config::Config;
use vrijeme::feed::{available_cities, HttpFeed, CROATIA_URL, FETCH_TIMEOUT};
use vrijeme::runner::{setup_logging, shutdown_on_ctrlc, start};
use vrijeme::{Coordinator, NodeError, Reading, SENSORS};

/// Current-conditions poller for the DHMZ vrijeme.hr feed
#[derive(FromArgs)]
struct Args {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Run(RunArgs),
    Once(OnceArgs),
    Cities(CitiesArgs),
}

/// Poll one city until Ctrl+C
#[derive(FromArgs)]
#[argh(subcommand, name = "run")]
struct RunArgs {
    /// path to YAML configuration file
    #[argh(option, short = 'c')]
    config: Option<String>,

    /// city name as spelled in the feed (overrides config)
    #[argh(option)]
    city: Option<String>,

    /// seconds between refreshes (overrides config)
    #[argh(option, short = 'i')]
    interval: Option<u64>,
}

/// Refresh once and print the reading
#[derive(FromArgs)]
#[argh(subcommand, name = "once")]
struct OnceArgs {
    /// path to YAML configuration file
    #[argh(option, short = 'c')]
    config: Option<String>,

    /// city name as spelled in the feed (overrides config)
    #[argh(option)]
    city: Option<String>,

    /// print raw JSON instead of the sensor table
    #[argh(switch)]
    json: bool,
}

/// List city names available in the feed
#[derive(FromArgs)]
#[argh(subcommand, name = "cities")]
struct CitiesArgs {
    /// feed URL (default: the Croatian current-conditions feed)
    #[argh(option, default = "String::from(CROATIA_URL)")]
    url: String,
}

fn resolve_config(path: Option<&str>, city: Option<String>) -> Result<Config, NodeError> {
    let mut config = match (path, city.as_deref()) {
        (Some(path), _) => {
            log::info!("Loading config from: {}", path);
            Config::from_file(path)?
        }
        (None, Some(city)) => Config::for_city(city),
        (None, None) => {
            return Err(NodeError::Init(
                "either --config or --city is required".to_string(),
            ))
        }
    };
    if let Some(city) = city {
        config.city = city;
    }
    config.validate()?;
    Ok(config)
}

fn print_reading(reading: &Reading) {
    for sensor in SENSORS {
        let value = sensor
            .value(reading)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<18} {} {}",
            sensor.label,
            value,
            sensor.unit.unwrap_or_default()
        );
    }
}

async fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = resolve_config(args.config.as_deref(), args.city)?;
    if let Some(interval) = args.interval {
        config.update_interval = interval;
        config.validate()?;
    }

    let shutdown = shutdown_on_ctrlc()?;
    let mut updates = shutdown.clone();
    let (coordinator, handle) = start(&config, shutdown).await?;

    let mut snapshots = coordinator.subscribe();
    if let Some(reading) = snapshots.borrow_and_update().clone() {
        println!("{}", serde_json::to_string(&*reading)?);
    }

    log::info!("Poller running. Press Ctrl+C to stop.");
    loop {
        tokio::select! {
            _ = updates.changed() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if let Some(reading) = snapshot {
                    println!("{}", serde_json::to_string(&*reading)?);
                }
            }
        }
    }

    handle.await?;
    log::info!("Poller stopped");
    Ok(())
}

async fn once(args: OnceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(args.config.as_deref(), args.city)?;
    let coordinator = Coordinator::from_config(&config)?;
    let reading = coordinator.refresh().await.map_err(NodeError::from)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&*reading)?);
    } else {
        println!("{}", coordinator.city());
        print_reading(&reading);
    }
    Ok(())
}

async fn cities(args: CitiesArgs) -> Result<(), Box<dyn std::error::Error>> {
    let feed = HttpFeed::new(args.url, FETCH_TIMEOUT)?;
    let names = available_cities(&feed).await.map_err(NodeError::from)?;
    log::info!("Found {} cities at {}", names.len(), feed.url());
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_logging();
    let args: Args = argh::from_env();

    match args.command {
        Command::Run(args) => run(args).await,
        Command::Once(args) => once(args).await,
        Command::Cities(args) => cities(args).await,
    }
}

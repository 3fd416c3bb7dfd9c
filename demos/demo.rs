//! Demo application simulating an enqueue relay that counts its traffic.
//!
//! Run with:
//! ```bash
//! cargo run --example demo --features demo -- --help
//! RUST_LOG=shardcount=debug cargo run --example demo --features demo -- --threads 2
//! ```

use clap::{Parser, ValueEnum};
use shardcount::adapters::{MemoryCache, MemoryStore};
use shardcount::observers::json::JsonObserver;
use shardcount::observers::table::{TableObserver, TableStyle};
use shardcount::{CacheAdjust, CounterService};
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

/// Output format for counter totals.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Pretty ASCII table
    Table,
    /// JSON format
    Json,
}

/// Table style selection.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum StyleChoice {
    Ascii,
    #[default]
    Rounded,
    Sharp,
    Modern,
    Markdown,
    Dots,
    Blank,
}

impl From<StyleChoice> for TableStyle {
    fn from(choice: StyleChoice) -> Self {
        match choice {
            StyleChoice::Ascii => TableStyle::Ascii,
            StyleChoice::Rounded => TableStyle::Rounded,
            StyleChoice::Sharp => TableStyle::Sharp,
            StyleChoice::Modern => TableStyle::Modern,
            StyleChoice::Markdown => TableStyle::Markdown,
            StyleChoice::Dots => TableStyle::Dots,
            StyleChoice::Blank => TableStyle::Blank,
        }
    }
}

/// Cache update after each increment.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum AdjustChoice {
    #[default]
    Amount,
    Unit,
    Off,
}

impl From<AdjustChoice> for CacheAdjust {
    fn from(choice: AdjustChoice) -> Self {
        match choice {
            AdjustChoice::Amount => CacheAdjust::ByAmount,
            AdjustChoice::Unit => CacheAdjust::Unit,
            AdjustChoice::Off => CacheAdjust::Disabled,
        }
    }
}

/// Demo application for shardcount - store-backed sharded counters.
///
/// Simulates worker threads enqueueing tasks on a few queues, counting every
/// enqueue and error both all-time and per day, then prints the totals.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Table style (for table format)
    #[arg(short, long, value_enum, default_value = "rounded")]
    style: StyleChoice,

    /// Pretty print JSON output
    #[arg(long)]
    pretty: bool,

    /// Include timestamp in JSON output
    #[arg(long)]
    timestamp: bool,

    /// Number of concurrent worker threads
    #[arg(short, long, default_value = "8")]
    threads: usize,

    /// Number of enqueues per thread
    #[arg(long, default_value = "500")]
    iterations: usize,

    /// Shards given to new counters
    #[arg(long, default_value = "20")]
    shards: usize,

    /// Raise the shard count of the hottest counter to this value first
    #[arg(long)]
    hot_shards: Option<usize>,

    /// Cache TTL in milliseconds
    #[arg(long, default_value = "60000")]
    ttl_ms: u64,

    /// Cache adjustment on increment
    #[arg(long, value_enum, default_value = "amount")]
    adjust: AdjustChoice,

    /// Add a title to the output (table format)
    #[arg(long)]
    title: Option<String>,

    /// Hide header in table output
    #[arg(long)]
    no_header: bool,
}

const QUEUES: [&str; 3] = ["default", "mail", "reports"];

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Simulates concurrent enqueues, about 5% of which fail.
fn simulate_traffic(
    counters: &CounterService<MemoryStore, MemoryCache>,
    num_threads: usize,
    iterations: usize,
) -> shardcount::Result<()> {
    let mut handles = vec![];

    for i in 0..num_threads {
        let counters = counters.clone();
        handles.push(thread::spawn(move || -> shardcount::Result<()> {
            for j in 0..iterations {
                let now = OffsetDateTime::now_utc();
                let queue = QUEUES[(i + j) % QUEUES.len()];

                counters.increment_with_daily("Enqueue", now, 1)?;
                counters.increment_with_daily(&format!("Enqueue{queue}"), now, 1)?;

                if (i * iterations + j) % 20 == 0 {
                    counters.increment_with_daily("Error", now, 1)?;
                }
            }
            Ok(())
        }));
    }

    for handle in handles {
        match handle.join() {
            Ok(result) => result?,
            Err(_) => tracing::error!("worker thread panicked"),
        }
    }
    Ok(())
}

fn render_output(
    args: &Args,
    counters: &CounterService<MemoryStore, MemoryCache>,
) -> shardcount::observers::Result<String> {
    let totals = counters.totals()?;

    let output = match args.format {
        OutputFormat::Table => {
            let mut observer = TableObserver::new()
                .with_style(args.style.into())
                .with_header(!args.no_header);

            if let Some(ref title) = args.title {
                observer = observer.with_title(title.clone());
            }
            observer.render(&totals)
        }

        OutputFormat::Json => JsonObserver::new()
            .pretty(args.pretty)
            .wrap_in_snapshot(args.timestamp)
            .include_timestamp(args.timestamp)
            .to_json(&totals)?,
    };
    Ok(output)
}

fn run(args: &Args) -> shardcount::observers::Result<()> {
    let store = Arc::new(MemoryStore::new().with_max_attempts(1_000));
    let cache = Arc::new(MemoryCache::new());
    let counters = CounterService::new(store, cache)
        .with_default_shards(args.shards)
        .with_cache_ttl(Duration::from_millis(args.ttl_ms))
        .with_cache_adjust(args.adjust.into());

    if let Some(shards) = args.hot_shards {
        counters.increase_shards("Enqueue", shards)?;
    }

    tracing::info!(
        threads = args.threads,
        iterations = args.iterations,
        "simulating traffic"
    );
    simulate_traffic(&counters, args.threads, args.iterations)?;

    println!("{}", render_output(args, &counters)?);
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "demo failed");
            ExitCode::FAILURE
        }
    }
}

use std::error::Error;
use std::time::{Duration, Instant};

use clap::Parser;
use hdrhistogram::Histogram;
use slot_book::{BookConfig, CapacityMode, IndexedBook, Side, SlotIndex, TickPolicy, Ticked, NPOS};
use tracing::{info, warn};

/// Environment variable holding a JSON [`BookConfig`]
const CONFIG_ENV: &str = "SLOT_BOOK_CONFIG";

#[derive(Parser)]
#[command(name = "latency-report")]
#[command(about = "Latency histogram of push/remove/sort/search on one book")]
struct Cli {
    /// Levels per side (overrides SLOT_BOOK_CONFIG)
    #[arg(long)]
    capacity: Option<i64>,
    /// Clamp an invalid capacity to 0 instead of failing
    #[arg(long)]
    clamp: bool,
    /// Number of push operations to run
    #[arg(long, default_value_t = 1_000_000)]
    iterations: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Level {
    ticks: i64,
    size: i64,
}

impl Ticked for Level {
    fn ticks(&self) -> i64 {
        self.ticks
    }
}

type Book<'a> = IndexedBook<'a, Level, TickPolicy<Level>>;

struct Recorder {
    name: &'static str,
    histogram: Histogram<u64>,
    total: Duration,
}

impl Recorder {
    fn new(name: &'static str) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            name,
            histogram: Histogram::new_with_bounds(1, 100_000, 3)?,
            total: Duration::ZERO,
        })
    }

    #[inline]
    fn time<T>(&mut self, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = std::hint::black_box(f());
        let elapsed = start.elapsed();
        // Saturate outliers instead of failing the run
        self.histogram.saturating_record(elapsed.as_nanos() as u64);
        self.total += elapsed;
        out
    }

    fn report(&self) {
        let h = &self.histogram;
        let ops = h.len();
        println!("\n=== {} (ns) ===", self.name);
        println!("Total Ops:  {}", ops);
        if ops == 0 {
            return;
        }
        println!("Throughput: {:.2} ops/sec", ops as f64 / self.total.as_secs_f64());
        println!("---------------------------");
        println!("Min:    {:6} ns", h.min());
        println!("P50:    {:6} ns", h.value_at_quantile(0.50));
        println!("P90:    {:6} ns", h.value_at_quantile(0.90));
        println!("P99:    {:6} ns", h.value_at_quantile(0.99));
        println!("P99.9:  {:6} ns", h.value_at_quantile(0.999));
        println!("Max:    {:6} ns", h.max());
    }
}

fn load_config() -> BookConfig {
    match std::env::var(CONFIG_ENV) {
        Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "unreadable {CONFIG_ENV}, using defaults");
            BookConfig::default()
        }),
        Err(_) => BookConfig::default(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = load_config();
    if let Some(capacity) = cli.capacity {
        config.capacity = capacity;
    }
    if cli.clamp {
        config.mode = CapacityMode::Clamp;
    }
    let len = config.table_len()?;
    info!(capacity = config.capacity, mode = ?config.mode, "preparing latency run");

    let mut levels = vec![Level::default(); len];
    let mut sides: Vec<SlotIndex> = vec![0; len];
    let mut free: Vec<SlotIndex> = vec![0; len];
    let mut book = Book::with_mode(&mut levels, &mut sides, &mut free, config.capacity, config.mode)?;

    let mut push = Recorder::new("push")?;
    let mut remove = Recorder::new("remove")?;
    let mut sort = Recorder::new("sort")?;
    let mut search = Recorder::new("lower_bound")?;

    info!(iterations = cli.iterations, "running");

    for n in 0..cli.iterations {
        let side = if n % 2 == 0 { Side::Bid } else { Side::Ask };
        let ticks = 10_000 + (n.wrapping_mul(7_919) % 100) as i64;

        if book.is_full(side) && book.capacity() > 0 {
            let pos = (n % book.capacity() as u64) as SlotIndex;
            remove.time(|| book.remove(side, pos));
        }
        let pos = push.time(|| book.push(side, Level { ticks, size: 10 }));
        if pos == NPOS && book.capacity() > 0 {
            warn!(?side, "push declined below capacity");
        }

        if n % 16 == 0 {
            sort.time(|| book.sort(side));
            search.time(|| book.lower_bound(side, &ticks));
        }
    }

    println!("\n=== Latency Report: capacity {} ===", book.capacity());
    for recorder in [&push, &remove, &sort, &search] {
        recorder.report();
    }

    let depth = book.top(Side::Bid, 5);
    info!(best_bids = ?depth.iter().map(|l| (l.ticks, l.size)).collect::<Vec<_>>(), "final book");
    Ok(())
}

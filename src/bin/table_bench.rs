use std::{
    io::{self, Write},
    time::{Duration, Instant},
};

use colfam::{Catalog, CreateMode, FamilyValues, RowId, StoreOptions};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Benchmark configuration
struct BenchConfig {
    num_rows: usize,
    updates_per_row: usize,
    properties_per_row: usize,
    value_size: usize,
    max_versions: usize,
    sync_writes: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            num_rows: 2_000,
            updates_per_row: 4,
            properties_per_row: 4,
            value_size: 64,
            max_versions: 3,
            sync_writes: false,
        }
    }
}

/// Statistics for a benchmark run
struct BenchStats {
    duration: Duration,
    operations: usize,
    latencies: Vec<Duration>,
}

impl BenchStats {
    fn new() -> Self {
        BenchStats {
            duration: Duration::ZERO,
            operations: 0,
            latencies: Vec::new(),
        }
    }

    fn ops_per_sec(&self) -> f64 {
        self.operations as f64 / self.duration.as_secs_f64()
    }

    fn avg_latency_us(&self) -> f64 {
        if self.latencies.is_empty() {
            return 0.0;
        }
        let sum: u128 = self.latencies.iter().map(|d| d.as_micros()).sum();
        sum as f64 / self.latencies.len() as f64
    }

    fn percentile_latency_us(&mut self, percentile: f64) -> f64 {
        if self.latencies.is_empty() {
            return 0.0;
        }
        self.latencies.sort();
        let idx = ((self.latencies.len() as f64 * percentile / 100.0) as usize)
            .min(self.latencies.len() - 1);
        self.latencies[idx].as_micros() as f64
    }

    fn print_summary(&mut self, name: &str) {
        println!("\n{}", "=".repeat(60));
        println!("Benchmark: {}", name);
        println!("{}", "=".repeat(60));
        println!("Operations:     {:>12}", format_number(self.operations));
        println!("Duration:       {:>12.2} sec", self.duration.as_secs_f64());
        println!("Throughput:     {:>12.0} ops/sec", self.ops_per_sec());
        println!("\nLatency (microseconds):");
        println!("  Average:      {:>12.2}", self.avg_latency_us());
        println!("  P50:          {:>12.2}", self.percentile_latency_us(50.0));
        println!("  P95:          {:>12.2}", self.percentile_latency_us(95.0));
        println!("  P99:          {:>12.2}", self.percentile_latency_us(99.0));
        println!("{}", "=".repeat(60));
    }
}

fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Progress indicator
struct ProgressBar {
    total: usize,
    current: usize,
    last_update: Instant,
}

impl ProgressBar {
    fn new(total: usize) -> Self {
        ProgressBar {
            total,
            current: 0,
            last_update: Instant::now(),
        }
    }

    fn update(&mut self, current: usize) {
        self.current = current;
        if self.last_update.elapsed() > Duration::from_millis(100) {
            self.display();
            self.last_update = Instant::now();
        }
    }

    fn finish(&mut self) {
        self.current = self.total;
        self.display();
        println!();
    }

    fn display(&self) {
        let total = self.total.max(1);
        let percent = self.current * 100 / total;
        let bar_width = 40;
        let filled = (bar_width * self.current) / total;
        let bar = "=".repeat(filled) + &" ".repeat(bar_width - filled);
        print!(
            "\r[{}] {:>3}% ({}/{})",
            bar,
            percent,
            format_number(self.current),
            format_number(self.total)
        );
        let _ = io::stdout().flush();
    }
}

/// Generate a printable value of the given size
fn generate_value(size: usize, seed: usize) -> String {
    let mut x = seed;
    (0..size)
        .map(|_| {
            x = x.wrapping_mul(1103515245).wrapping_add(12345);
            char::from(b'a' + ((x >> 16) % 26) as u8)
        })
        .collect()
}

fn row_values(config: &BenchConfig, seed: usize) -> FamilyValues {
    let mut values = FamilyValues::new();
    let props = values.entry("data".to_string()).or_default();
    for p in 0..config.properties_per_row {
        props.insert(format!("p{p}"), generate_value(config.value_size, seed + p));
    }
    values
}

/// Insert benchmark
fn bench_insert(catalog: &Catalog, config: &BenchConfig) -> (BenchStats, Vec<RowId>) {
    println!("\n📝 Running insert benchmark...");
    let mut stats = BenchStats::new();
    let mut progress = ProgressBar::new(config.num_rows);
    let mut ids = Vec::with_capacity(config.num_rows);

    let start = Instant::now();
    for i in 0..config.num_rows {
        let values = row_values(config, i);

        let op_start = Instant::now();
        ids.push(catalog.insert("bench", &values).unwrap());
        stats.latencies.push(op_start.elapsed());
        stats.operations += 1;

        if i % 100 == 0 {
            progress.update(i);
        }
    }
    progress.finish();
    stats.duration = start.elapsed();

    (stats, ids)
}

/// Update benchmark, writing past the version cap
fn bench_update(catalog: &Catalog, config: &BenchConfig, ids: &[RowId]) -> BenchStats {
    println!("\n🔁 Running update benchmark...");
    let total = ids.len() * config.updates_per_row;
    let mut stats = BenchStats::new();
    let mut progress = ProgressBar::new(total);

    let start = Instant::now();
    for round in 0..config.updates_per_row {
        for (i, id) in ids.iter().enumerate() {
            let values = row_values(config, (round + 1) * ids.len() + i);

            let op_start = Instant::now();
            catalog.update("bench", id, &values).unwrap();
            stats.latencies.push(op_start.elapsed());
            stats.operations += 1;

            if stats.operations % 100 == 0 {
                progress.update(stats.operations);
            }
        }
    }
    progress.finish();
    stats.duration = start.elapsed();

    stats
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("\n🚀 colfam table benchmark");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    let config = BenchConfig::default();

    println!("Configuration:");
    println!("  Rows:           {}", format_number(config.num_rows));
    println!("  Updates/row:    {}", config.updates_per_row);
    println!("  Props/row:      {}", config.properties_per_row);
    println!("  Value size:     {} bytes", config.value_size);
    println!("  Max versions:   {}", config.max_versions);
    println!("  Sync writes:    {}", config.sync_writes);

    let temp_dir = TempDir::new().unwrap();
    let options = StoreOptions {
        sync_writes: config.sync_writes,
        ..Default::default()
    };
    let catalog = Catalog::open(temp_dir.path().join("bench_tables"), options).unwrap();
    catalog
        .create(
            "bench",
            &["data"],
            Some(config.max_versions),
            CreateMode::FailIfExists,
        )
        .unwrap();

    let (mut insert_stats, ids) = bench_insert(&catalog, &config);
    insert_stats.print_summary("Insert");

    let mut update_stats = bench_update(&catalog, &config, &ids);
    update_stats.print_summary("Update (versioned)");

    println!("\n📈 Store Statistics:\n");
    for line in catalog.statistics().report().lines() {
        println!("    {}", line);
    }

    println!("\n✅ Benchmark completed!");
}

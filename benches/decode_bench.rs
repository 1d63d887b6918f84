// Standalone benchmark for table decoding entry points
//
// Run: cargo bench --bench decode_bench
//
// Compares bulk, lazy iterator, rayon-parallel and count-only reads across:
//   - Clean data (no quoting)
//   - Mixed data (quoted cells, doubled quotes, embedded newlines)
//   - Various sizes (1K, 10K, 100K rows)

use std::time::{Duration, Instant};

use texttable::{ColumnDescriptor, Dialect, Result, Schema, Table};

type Record<'a> = (u64, i32, &'a [u8], String, f64);

fn header() -> String {
    "id,delta,raw,text,score\n".to_string()
}

/// Rows where no cell needs quoting
fn generate_clean(num_rows: usize) -> String {
    let mut out = header();
    for i in 0..num_rows {
        out.push_str(&format!(
            "{},{},raw_{},text_{}_value,{}.5\n",
            i,
            i as i64 - 500,
            i,
            i,
            i % 1000
        ));
    }
    out
}

/// Rows where some cells are quoted
fn generate_mixed(num_rows: usize) -> String {
    let mut out = header();
    for i in 0..num_rows {
        let text = match i % 4 {
            0 => format!("plain_{}", i),
            1 => format!("\"has,comma_{}\"", i),
            2 => format!("\"has \"\"quote\"\" {}\"", i),
            _ => format!("\"has\nnewline_{}\"", i),
        };
        out.push_str(&format!("{},{},\"raw_{}\",{},{}.25\n", i, -(i as i64), i, text, i));
    }
    out
}

fn table() -> Table {
    Table::new(
        Schema::new()
            .column(ColumnDescriptor::number::<u64>("id"))
            .column(ColumnDescriptor::number::<i32>("delta"))
            .column(ColumnDescriptor::raw("raw"))
            .column(ColumnDescriptor::string("text"))
            .column(ColumnDescriptor::number::<f64>("score")),
        Dialect::csv(),
    )
    .unwrap()
}

struct BenchResult {
    name: String,
    iterations: u64,
    total_time: Duration,
    input_size: usize,
}

impl BenchResult {
    fn avg_ns(&self) -> f64 {
        self.total_time.as_nanos() as f64 / self.iterations as f64
    }

    fn throughput_mb_s(&self) -> f64 {
        let secs_per_iter = self.avg_ns() / 1_000_000_000.0;
        self.input_size as f64 / secs_per_iter / 1_000_000.0
    }
}

fn bench_fn<F: Fn() -> usize>(
    name: &str,
    input_size: usize,
    f: F,
    warmup_secs: f64,
    bench_secs: f64,
) -> BenchResult {
    // Warmup
    let warmup_deadline = Instant::now() + Duration::from_secs_f64(warmup_secs);
    while Instant::now() < warmup_deadline {
        let _ = f();
    }

    // Benchmark
    let mut iterations: u64 = 0;
    let start = Instant::now();
    let deadline = start + Duration::from_secs_f64(bench_secs);
    while Instant::now() < deadline {
        let _ = f();
        iterations += 1;
    }

    BenchResult {
        name: name.to_string(),
        iterations,
        total_time: start.elapsed(),
        input_size,
    }
}

fn print_results(results: &[BenchResult]) {
    let max_name_len = results.iter().map(|r| r.name.len()).max().unwrap_or(0);
    let fastest_ns = results
        .iter()
        .map(|r| r.avg_ns())
        .fold(f64::MAX, f64::min);

    for r in results {
        let avg = r.avg_ns();
        let speedup = avg / fastest_ns;
        let marker = if (speedup - 1.0).abs() < 0.01 { " (fastest)" } else { "" };
        println!(
            "  {:<width$}  {:>10.2} us/iter  {:>8.1} MB/s  {:>6.2}x{}",
            r.name,
            avg / 1000.0,
            r.throughput_mb_s(),
            speedup,
            marker,
            width = max_name_len,
        );
    }
}

fn run_benchmark_suite(label: &str, input: &str, warmup: f64, time: f64) {
    let table = table();
    let bytes = input.as_bytes();

    println!("\n--- {} ---", label);

    let results = vec![
        bench_fn("Bulk", bytes.len(), || {
            table.parse::<Record>(bytes).unwrap().len()
        }, warmup, time),
        bench_fn("Iterator", bytes.len(), || {
            table.rows::<Record>(bytes).unwrap().filter(|r| r.is_ok()).count()
        }, warmup, time),
        bench_fn("Parallel", bytes.len(), || {
            table.parse_parallel::<Record>(bytes).unwrap().len()
        }, warmup, time),
        bench_fn("Count", bytes.len(), || table.row_count(bytes).unwrap(), warmup, time),
    ];

    // Verify all entry points agree
    let bulk = table.parse::<Record>(bytes).unwrap();
    let lazy = table.rows::<Record>(bytes).unwrap().collect::<Result<Vec<_>>>().unwrap();
    let parallel = table.parse_parallel::<Record>(bytes).unwrap();
    assert_eq!(bulk, lazy, "iterator output differs from bulk!");
    assert_eq!(bulk, parallel, "parallel output differs from bulk!");
    println!("  Rows: {} (all entry points match)", bulk.len());

    print_results(&results);
}

fn main() {
    println!("=== texttable Decoding Benchmark ===");
    println!(
        "Entry points: Bulk (Vec), Iterator (lazy), Parallel (rayon), Count (boundaries only)"
    );
    println!(
        "Heap after setup: {} bytes (0 unless built with memory_tracking)",
        texttable::memory::allocated()
    );

    let warmup = 1.0;
    let time = 3.0;

    let input = generate_clean(1_000);
    run_benchmark_suite("1K rows (clean)", &input, warmup, time);

    let input = generate_clean(10_000);
    run_benchmark_suite("10K rows (clean)", &input, warmup, time);

    let input = generate_mixed(10_000);
    run_benchmark_suite("10K rows (mixed, with quoting)", &input, warmup, time);

    let input = generate_clean(100_000);
    run_benchmark_suite("100K rows (clean)", &input, warmup, time);

    let input = generate_mixed(100_000);
    run_benchmark_suite("100K rows (mixed, with quoting)", &input, warmup, time);

    println!("\nDone.");
}

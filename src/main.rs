//! # chatsift CLI
//!
//! Command-line interface for chatsift library.

use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use chatsift::ChatsiftError;
use chatsift::cli::Args;
use chatsift::core::{
    AnnotatedRecord, InitiationTable, OutputConfig, clean, segment,
};
use chatsift::format::{OutputFormat, write_to_format};
use chatsift::input::read_records;

fn main() {
    let args = <Args as ClapParser>::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

/// Logs go to stderr so stdout stays the report.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "chatsift=debug" } else { "chatsift=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), ChatsiftError> {
    let total_start = Instant::now();
    let output_path = args.output_path();
    let lib_format: OutputFormat = args.format.into();

    // Print header
    println!("🔎 chatsift v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Input:   {}", args.input.display());
    if args.no_clean {
        println!("📜 Rules:   (cleaning disabled)");
    } else {
        println!("📜 Rules:   {}", args.rules.display());
    }
    println!("⏱️  Gap:     {} min", args.gap);
    println!("💾 Output:  {}", output_path);
    println!("📄 Format:  {}", lib_format);
    println!();

    // Step 1: Read
    println!("⏳ Reading records...");
    let read_start = Instant::now();
    let records = read_records(&args.input, args.input_format)?;
    let original_count = records.len();
    println!(
        "   Found {} records ({:.2}s)",
        original_count,
        read_start.elapsed().as_secs_f64()
    );

    // Step 2: Clean
    let records = if args.no_clean {
        println!("⏭️  Skipping cleaning (--no-clean)");
        records
    } else {
        println!("🧹 Cleaning records...");
        let clean_start = Instant::now();
        let cleaned = clean(records, &args.rule_source())?;
        let stats = cleaned.stats;
        println!(
            "   {} incomplete, {} excluded by {} patterns",
            stats.incomplete_dropped(),
            stats.excluded(),
            stats.pattern_count
        );
        println!(
            "   Kept {} records ({:.1}% removed, {:.2}s)",
            stats.kept_count,
            stats.removal_ratio(),
            clean_start.elapsed().as_secs_f64()
        );
        cleaned.into_records()
    };

    // Step 3: Segment
    println!("🔀 Segmenting sessions...");
    let segment_start = Instant::now();
    let result = segment(&records, &args.session_config())?;
    println!(
        "   {} sessions, {} counted initiations ({:.2}s)",
        result.session_count,
        result.initiators.len(),
        segment_start.elapsed().as_secs_f64()
    );

    println!();
    print_table(&result.table);

    if args.show_initiators {
        println!();
        print_initiators(&result.initiators);
    }

    // Step 4: Write
    println!();
    println!("💾 Writing {}...", lib_format);
    let write_start = Instant::now();
    let mut output_config = OutputConfig::new();
    if !args.no_extra {
        output_config = output_config.with_extra();
    }
    write_to_format(&records, &output_path, lib_format, &output_config)?;

    if let Some(ref table_path) = args.initiations {
        write_to_format(result.table.rows(), table_path, lib_format, &OutputConfig::new())?;
    }
    println!("   Written in {:.2}s", write_start.elapsed().as_secs_f64());

    let total_time = total_start.elapsed();

    println!();
    println!("✅ Done! Cleaned records saved to {}", output_path);
    if let Some(ref table_path) = args.initiations {
        println!("   Initiation table saved to {}", table_path);
    }

    // Summary
    println!();
    println!("📊 Summary:");
    println!("   Original:  {} records", original_count);
    println!("   Final:     {} records", records.len());
    println!("   Sessions:  {}", result.session_count);
    println!("   Senders:   {} initiating", result.table.len());

    // Performance stats
    println!();
    println!("⚡ Performance:");
    println!("   Total time:  {:.2}s", total_time.as_secs_f64());
    let per_sec = original_count as f64 / total_time.as_secs_f64();
    println!("   Throughput:  {:.0} records/sec", per_sec);

    Ok(())
}

fn print_table(table: &InitiationTable) {
    println!("👥 Session initiations:");
    if table.is_empty() {
        println!("   (no session was initiated)");
        return;
    }

    let width = table.iter().map(|row| row.user.chars().count()).max().unwrap_or(0);
    for row in table {
        println!(
            "   {:<width$}  {:>5}  {:>6.1}%",
            row.user,
            row.count,
            row.proportion * 100.0,
            width = width
        );
    }
}

fn print_initiators(initiators: &[AnnotatedRecord]) {
    println!("🚩 Initiating messages:");
    for rec in initiators {
        let ts = rec
            .timestamp()
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "   {}  {} (+{} min): {}",
            ts,
            rec.user(),
            rec.time_diff.num_minutes(),
            rec.record.message().unwrap_or_default()
        );
    }
}

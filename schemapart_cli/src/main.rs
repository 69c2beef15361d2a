mod pg;

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use schemapart_codecs::{codec_for, transcoder};
use schemapart_core::format::{Format, LegacyFormat, OverflowPolicy, TargetFormat};
use schemapart_core::mapblock::{self, LayoutSummary};
use schemapart_core::transcode;
use schemapart_core::{Driver, MigrationPlan};

use crate::pg::{DbArgs, PgStore};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "schemapart-migrate",
    about = "Recompress schemapart blobs and migrate mapblock layouts",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every row of the schemapart table in place
    ///
    /// Rows are written back one at a time; the run stops at the first
    /// error with earlier rows already committed. The --mapblock migration is
    /// NOT idempotent: re-running it over migrated rows corrupts them unless
    /// --skip-converted is given. Take a backup first.
    Migrate {
        #[command(flatten)]
        db: DbArgs,
        /// Table holding id, data, and metadata columns
        #[arg(long, default_value = "schemapart")]
        table: String,
        /// Format of the data column: gzip | zlib
        #[arg(long, default_value = "gzip")]
        content_from: LegacyFormat,
        /// Format to write the data column in: deflate | zstd
        #[arg(long, default_value = "deflate")]
        content_to: TargetFormat,
        /// Format of the metadata column: gzip | zlib
        #[arg(long, default_value = "gzip")]
        metadata_from: LegacyFormat,
        /// Format to write the metadata column in: deflate | zstd
        #[arg(long, default_value = "deflate")]
        metadata_to: TargetFormat,
        /// Compression level for the target format (default: 3 for deflate and zstd)
        #[arg(short, long, allow_negative_numbers = true)]
        level: Option<i32>,
        /// Also migrate the mapblock layout of the data column
        #[arg(long)]
        mapblock: bool,
        /// Node ids that overflow 16 bits after the shift: error | wrap
        #[arg(long, default_value = "error")]
        overflow: OverflowPolicy,
        /// Re-decode every output and compare digests before writing
        #[arg(long)]
        verify: bool,
        /// Leave rows whose data column lacks the source header untouched
        #[arg(long)]
        skip_converted: bool,
        /// Convert every row but write nothing back
        #[arg(long)]
        dry_run: bool,
    },
    /// Convert a single blob file
    Transcode {
        /// Compressed source blob
        input: PathBuf,
        /// Destination file
        output: PathBuf,
        /// Source format: gzip | zlib
        #[arg(long, default_value = "gzip")]
        from: LegacyFormat,
        /// Target format: deflate | zstd
        #[arg(long, default_value = "deflate")]
        to: TargetFormat,
        #[arg(short, long, allow_negative_numbers = true)]
        level: Option<i32>,
        /// Migrate the mapblock layout of the decoded blob
        #[arg(long)]
        mapblock: bool,
        #[arg(long, default_value = "error")]
        overflow: OverflowPolicy,
    },
    /// Decode a blob and print its sizes and a hex preview
    Inspect {
        file: PathBuf,
        /// Format of the blob: gzip | zlib | deflate | zstd
        #[arg(short, long, default_value = "gzip")]
        format: Format,
        /// Print mapblock layout statistics
        #[arg(long)]
        mapblock: bool,
    },
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {}", v, UNITS[unit])
    }
}

fn ratio(before: u64, after: u64) -> f64 {
    if after == 0 {
        return 1.0;
    }
    before as f64 / after as f64
}

fn print_hex_preview(raw: &[u8]) {
    let preview = &raw[..raw.len().min(256)];
    println!("--- decoded ({} bytes, first {} shown) ---", raw.len(), preview.len());
    for (i, chunk) in preview.chunks(16).enumerate() {
        print!("  {:04x}  ", i * 16);
        for b in chunk {
            print!("{:02x} ", b);
        }
        for _ in chunk.len()..16 {
            print!("   ");
        }
        print!("  |");
        for b in chunk {
            if b.is_ascii_graphic() || *b == b' ' {
                print!("{}", *b as char);
            } else {
                print!(".");
            }
        }
        println!("|");
    }
    if raw.len() > 256 {
        println!("  ... ({} bytes remaining not shown)", raw.len() - 256);
    }
}

fn print_layout(summary: &LayoutSummary) {
    println!("  elements       : {}", summary.elements);
    match (summary.min_id, summary.max_id) {
        (Some(min), Some(max)) => println!("  node ids       : {min}..={max}"),
        _ => println!("  node ids       : -"),
    }
    println!("  overflowing    : {}", summary.overflowing);
    println!(
        "  migratable     : {}",
        if summary.migratable() { "yes" } else { "only with --overflow wrap" }
    );
}

// ── Subcommand implementations ─────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn run_migrate(
    db: DbArgs,
    table: String,
    content: (LegacyFormat, TargetFormat),
    metadata: (LegacyFormat, TargetFormat),
    level: Option<i32>,
    layout: Option<OverflowPolicy>,
    verify: bool,
    skip_converted: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let plan = MigrationPlan {
        content: transcoder(content.0, content.1, level)?,
        metadata: transcoder(metadata.0, metadata.1, level)?,
        layout,
        verify,
        skip_converted,
        dry_run,
    };
    let store = PgStore::connect(&db, &table)
        .with_context(|| format!("opening table {table} on {}:{}", db.host, db.port))?;

    let t0 = Instant::now();
    let report = Driver::new(store, plan).run()?;
    let elapsed = t0.elapsed();

    eprintln!("  records     : {}", report.records);
    eprintln!("  converted   : {}", report.converted);
    eprintln!("  skipped     : {}", report.skipped);
    eprintln!(
        "  data        : {} -> {}",
        human_bytes(report.content_in),
        human_bytes(report.content_out)
    );
    eprintln!(
        "  metadata    : {} -> {}",
        human_bytes(report.metadata_in),
        human_bytes(report.metadata_out)
    );
    eprintln!("  ratio       : {:.2}x", report.ratio());
    eprintln!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
    if dry_run {
        eprintln!("  dry run: nothing was written");
    }
    Ok(())
}

fn run_transcode(
    input: PathBuf,
    output: PathBuf,
    from: LegacyFormat,
    to: TargetFormat,
    level: Option<i32>,
    layout: Option<OverflowPolicy>,
) -> anyhow::Result<()> {
    let compressed =
        fs::read(&input).with_context(|| format!("reading input file {:?}", input))?;
    let t = transcoder(from, to, level)?;

    let out = match layout {
        Some(policy) => {
            let mut plain = t.decode(&compressed)?;
            mapblock::migrate(&mut plain, policy)?;
            t.encode(&plain)?
        }
        None => t.transcode(&compressed)?,
    };
    fs::write(&output, &out.bytes)
        .with_context(|| format!("writing output file {:?}", output))?;

    eprintln!("  {} -> {}", t.source().name(), t.target().name());
    eprintln!("  decoded     : {}", human_bytes(out.plain_len));
    eprintln!(
        "  size        : {} -> {}",
        human_bytes(compressed.len() as u64),
        human_bytes(out.bytes.len() as u64)
    );
    eprintln!("  xxh3        : {:016x}", out.digest);
    Ok(())
}

fn run_inspect(file: PathBuf, format: Format, show_layout: bool) -> anyhow::Result<()> {
    let compressed = fs::read(&file).with_context(|| format!("reading {:?}", file))?;
    let codec = codec_for(format, None)?;
    if !codec.recognizes(&compressed) {
        eprintln!("warning: {:?} does not start with a {} header", file, codec.name());
    }
    let raw = transcode::decode(codec.as_ref(), &compressed)?;

    println!("=== {} blob: {:?} ===", codec.name(), file);
    println!();
    println!("  compressed     : {}", human_bytes(compressed.len() as u64));
    println!("  decoded        : {}", human_bytes(raw.len() as u64));
    println!("  ratio          : {:.2}x", ratio(raw.len() as u64, compressed.len() as u64));
    if show_layout {
        print_layout(&LayoutSummary::scan(&raw)?);
    }
    println!();
    print_hex_preview(&raw);
    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Migrate {
            db,
            table,
            content_from,
            content_to,
            metadata_from,
            metadata_to,
            level,
            mapblock,
            overflow,
            verify,
            skip_converted,
            dry_run,
        } => run_migrate(
            db,
            table,
            (content_from, content_to),
            (metadata_from, metadata_to),
            level,
            mapblock.then_some(overflow),
            verify,
            skip_converted,
            dry_run,
        ),
        Commands::Transcode {
            input,
            output,
            from,
            to,
            level,
            mapblock,
            overflow,
        } => run_transcode(input, output, from, to, level, mapblock.then_some(overflow)),
        Commands::Inspect {
            file,
            format,
            mapblock,
        } => run_inspect(file, format, mapblock),
    };
    if let Err(e) = result {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}

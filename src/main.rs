use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use gestalign::{
    AlignmentReport, OUTPUT_COLUMNS, OutputWriter, Speaker, align, apply_deictic_tags, normalize,
    parse_annotation_file, write_report,
};

#[derive(Parser)]
#[command(name = "gestalign")]
#[command(author, version, about = "Multimodal annotation alignment pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Align speech and gesture layers into a flat tagged table
    Process {
        /// Input annotation export (tab-separated, no header)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the aligned table (comma-separated)
        #[arg(short, long)]
        output: PathBuf,

        /// Optional JSON report with per-anchor diagnostics
        #[arg(long)]
        report: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Inspect an annotation export without writing output
    Analyze {
        /// Input annotation export (tab-separated, no header)
        #[arg(short, long)]
        input: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            input,
            output,
            report,
            verbose,
        } => {
            setup_logging(verbose);
            process_annotations(input, output, report)
        }
        Commands::Analyze { input, verbose } => {
            setup_logging(verbose);
            analyze_annotations(input)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn process_annotations(input: PathBuf, output: PathBuf, report: Option<PathBuf>) -> Result<()> {
    info!("Loading annotations from {:?}", input);
    let parsed = parse_annotation_file(&input).context("Failed to load annotation export")?;
    info!(
        "Loaded {} rows ({} malformed lines skipped)",
        parsed.rows.len(),
        parsed.skipped
    );

    info!("Stage 0: Normalizing layer labels...");
    let norm_result = normalize(&parsed.rows);
    info!(
        "Normalized {} rows: {} trimmed, {} typos fixed, {} dotted, {} despaced",
        norm_result.table.len(),
        norm_result.layers_trimmed,
        norm_result.typos_fixed,
        norm_result.layers_dotted,
        norm_result.layers_despaced
    );

    info!("Stage 1: Aligning annotation layers...");
    let align_result = align(&norm_result.table);
    info!(
        "Aligned {} anchors into {} rows ({} anchors skipped, {} phrases skipped)",
        align_result.anchors_processed,
        align_result.rows.len(),
        align_result.anchors_skipped,
        align_result.phrases_skipped
    );

    let writer = OutputWriter::create(&output, &OUTPUT_COLUMNS)?;
    for row in &align_result.rows {
        writer.append(row)?;
    }

    info!("Stage 2: Tagging deictic lemmas...");
    let summary = apply_deictic_tags(&output, &OUTPUT_COLUMNS)?;
    info!(
        "Tagged {} rows: {} deictic, {} non-deictic",
        summary.rows, summary.deictic, summary.non_deictic
    );

    if let Some(report_path) = report {
        let report = AlignmentReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            input_rows: parsed.rows.len(),
            input_rows_skipped: parsed.skipped,
            rows_written: align_result.rows.len(),
            anchors_processed: align_result.anchors_processed,
            anchors_skipped: align_result.anchors_skipped,
            phrases_skipped: align_result.phrases_skipped,
            diagnostics: &align_result.diagnostics,
        };
        write_report(&report_path, &report)?;
        info!("Report written to {:?}", report_path);
    } else if !align_result.diagnostics.is_empty() {
        warn!(
            "{} diagnostics collected; rerun with --report to persist them",
            align_result.diagnostics.len()
        );
    }

    info!("Output written to {:?}", output);
    Ok(())
}

fn analyze_annotations(input: PathBuf) -> Result<()> {
    info!("Analyzing annotations from {:?}", input);
    let parsed = parse_annotation_file(&input).context("Failed to load annotation export")?;
    let norm_result = normalize(&parsed.rows);
    let table = &norm_result.table;

    println!("Annotation Table Analysis");
    println!("=========================");
    println!("Total rows: {}", table.len());
    println!("Malformed lines skipped: {}", parsed.skipped);
    println!("Recordings: {}", table.filenames().len());
    println!();

    println!("Layer Cleanup");
    println!("-------------");
    println!("Labels trimmed: {}", norm_result.layers_trimmed);
    println!("Typos fixed: {}", norm_result.typos_fixed);
    println!("Labels dotted: {}", norm_result.layers_dotted);
    println!("Labels despaced: {}", norm_result.layers_despaced);
    println!();

    println!("Speakers");
    println!("--------");
    for speaker in [Speaker::Router, Speaker::Follower] {
        println!("{}: {} rows", speaker, table.speaker_count(speaker));
    }
    println!();

    println!("Anchors");
    println!("-------");
    let anchor_count = table.anchors().count();
    println!("Speech-form anchors: {}", anchor_count);
    for filename in table.filenames() {
        let per_file = table
            .anchors()
            .filter(|a| a.filename == filename)
            .count();
        println!("  {}: {} anchors", filename, per_file);
    }

    Ok(())
}

mod db;
mod document;
mod parser;
mod profile;
mod report;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use document::{DocumentText, OrganizationContext};

#[derive(Parser)]
#[command(name = "coach_import", about = "Import coach contacts from athletics staff directories")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse directory documents, write review reports, upsert coach profiles
    Import {
        /// A document file or a directory of documents
        input: PathBuf,
        /// SQLite database path
        #[arg(long, default_value = "data/coaches.sqlite")]
        db: PathBuf,
        /// Directory for review reports
        #[arg(short, long, default_value = "review-output")]
        output_dir: PathBuf,
        /// Parse and report only, no database writes
        #[arg(long)]
        dry_run: bool,
        /// Max documents to process
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show import statistics
    Stats {
        /// SQLite database path
        #[arg(long, default_value = "data/coaches.sqlite")]
        db: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Import { input, db, output_dir, dry_run, limit } => {
            run_import(&input, &db, &output_dir, dry_run, limit)
        }
        Commands::Stats { db } => {
            let conn = db::connect(&db)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Coaches:   {}", s.coaches);
            println!("Claimed:   {}", s.claimed);
            println!("Unclaimed: {}", s.unclaimed);
            println!("Documents: {}", s.documents);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

#[derive(Default)]
struct BatchSummary {
    documents: usize,
    empty: usize,
    quarantined: usize,
    failed: usize,
    uploaded: usize,
    skipped_claimed: usize,
    upload_errors: usize,
}

impl BatchSummary {
    fn print(&self) {
        println!(
            "Processed {} documents: {} uploaded, {} skipped (claimed), {} upload errors.",
            self.documents, self.uploaded, self.skipped_claimed, self.upload_errors
        );
        if self.empty > 0 {
            println!("No coaches found in {} document(s).", self.empty);
        }
        if self.quarantined > 0 {
            println!("Quarantined {} report(s); uploads skipped for those documents.", self.quarantined);
        }
        if self.failed > 0 {
            println!("{} document(s) failed to parse.", self.failed);
        }
    }
}

fn run_import(
    input: &Path,
    db_path: &Path,
    output_dir: &Path,
    dry_run: bool,
    limit: Option<usize>,
) -> Result<()> {
    let mut paths = collect_documents(input)?;
    if let Some(n) = limit {
        paths.truncate(n);
    }
    if paths.is_empty() {
        println!("No documents found under {}.", input.display());
        return Ok(());
    }

    let conn = if dry_run {
        None
    } else {
        let conn = db::connect(db_path)?;
        db::init_schema(&conn)?;
        Some(conn)
    };

    println!("Importing {} document(s)...", paths.len());
    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut summary = BatchSummary::default();
    for path in &paths {
        pb.set_message(path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default());
        // One bad document never halts the batch.
        match process_one(path, output_dir, conn.as_ref(), &mut summary) {
            Ok(()) => {}
            Err(err) => {
                warn!(document = %path.display(), error = %err, "failed to process document");
                summary.failed += 1;
            }
        }
        summary.documents += 1;
        pb.inc(1);
    }
    pb.finish_and_clear();

    summary.print();
    Ok(())
}

fn process_one(
    path: &Path,
    output_dir: &Path,
    conn: Option<&rusqlite::Connection>,
    summary: &mut BatchSummary,
) -> Result<()> {
    let doc = DocumentText::load(path)?;
    let org = OrganizationContext::detect(path, &doc.lines);
    info!(
        document = %path.display(),
        organization = %org.organization,
        "detected organization"
    );

    let extraction = parser::process_document(&doc);
    if extraction.records.is_empty() {
        println!("No coaches found in {}.", path.display());
        summary.empty += 1;
        return Ok(());
    }

    let report_path = output_dir.join(report_file_name(path));
    let rendered = report::render(&extraction.records, &extraction.coach_lines, &org);
    report::write_report(&report_path, &rendered)?;

    let validation = report::validate_file(&report_path)?;
    if !validation.passed {
        let moved = report::quarantine(&report_path)?;
        warn!(
            document = %path.display(),
            report = %moved.display(),
            issues = validation.issues,
            "report failed validation, upload skipped"
        );
        summary.quarantined += 1;
        return Ok(());
    }

    let profiles: Vec<_> = extraction
        .records
        .iter()
        .filter(|r| r.uploadable)
        .map(|r| profile::map_to_profile(r, &org))
        .collect();

    match conn {
        Some(conn) => {
            let outcome = db::upsert_profiles(conn, &profiles)?;
            db::record_document(conn, &doc.source, profiles.len(), true)?;
            summary.uploaded += outcome.uploaded;
            summary.skipped_claimed += outcome.skipped_claimed;
            summary.upload_errors += outcome.errors;
        }
        None => {
            println!("DRY RUN - {} profile(s) from {}:", profiles.len(), path.display());
            for p in &profiles {
                println!("  {} ({}) - {}", p.display_name, p.username, p.role);
            }
        }
    }
    Ok(())
}

fn collect_documents(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    let mut paths = Vec::new();
    collect_txt_files(input, &mut paths)
        .with_context(|| format!("scanning {}", input.display()))?;
    paths.sort();
    Ok(paths)
}

fn collect_txt_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_txt_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("txt")) {
            out.push(path);
        }
    }
    Ok(())
}

fn report_file_name(document: &Path) -> String {
    let stem = document
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    format!("{}-coaches.txt", stem)
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

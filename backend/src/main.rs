//! Foodload CLI - check food-composition uploads against stored data
//!
//! # Main Commands
//!
//! ```bash
//! foodload check upload.xlsx --snapshot db.json          # Annotated change-set as JSON
//! foodload check foods.csv -r references.csv -s db.json  # Two text files
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! foodload parse upload.xlsx        # Dump the sheets as cell grids
//! foodload snapshot db.json         # Validate a lookup snapshot
//! foodload locales                  # Show accepted spellings
//! ```
//!
//! Progress goes to stderr, results to stdout (or `--output`).

use clap::{Parser, Subcommand};
use foodload::api::{error_response, ReviewResponse, LOG_BROADCASTER};
use foodload::cache::MemoryStore;
use foodload::config::{parse_delimiter, BatchOptions};
use foodload::models::locale_description;
use foodload::parser::workbook::{format_delimiter, load_upload};
use foodload::transform::check_upload;
use foodload::validation::validate_snapshot_document;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "foodload")]
#[command(about = "Parse, validate and diff food-composition uploads", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Upload options shared by `check` and `parse`.
#[derive(clap::Args)]
struct UploadArgs {
    /// Foods file (.xlsx, .xls, .ods or .csv)
    input: PathBuf,

    /// Separate references file (text uploads)
    #[arg(short, long)]
    references: Option<PathBuf>,

    /// Delimiter for text files: a single character or 'tab' (auto-detect if not specified)
    #[arg(short, long, value_parser = delimiter_arg)]
    delimiter: Option<char>,

    /// Foods sheet name (default: first sheet)
    #[arg(long)]
    foods_sheet: Option<String>,

    /// References sheet name (default: second sheet)
    #[arg(long)]
    references_sheet: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check an upload and print the annotated change-set
    Check {
        #[command(flatten)]
        upload: UploadArgs,

        /// Lookup snapshot (JSON) to check against
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Parse an upload and output its cell grids as JSON
    Parse {
        #[command(flatten)]
        upload: UploadArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a lookup snapshot against its schema
    Snapshot {
        /// Snapshot JSON file
        input: PathBuf,
    },

    /// Show accepted spellings for data types and reference types
    Locales,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            upload,
            snapshot,
            output,
            quiet,
        } => cmd_check(&upload, &snapshot, output.as_deref(), quiet).await,

        Commands::Parse { upload, output } => cmd_parse(&upload, output.as_deref()),

        Commands::Snapshot { input } => cmd_snapshot(&input),

        Commands::Locales => {
            println!("{}", locale_description());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn delimiter_arg(value: &str) -> Result<char, String> {
    parse_delimiter(value).ok_or_else(|| format!("invalid delimiter '{}'", value))
}

/// Environment defaults, overridden by command-line flags.
fn batch_options(upload: &UploadArgs) -> Result<BatchOptions, Box<dyn std::error::Error>> {
    let mut options = BatchOptions::from_env()?;
    if let Some(sheet) = &upload.foods_sheet {
        options = options.with_foods_sheet(sheet.as_str());
    }
    if let Some(sheet) = &upload.references_sheet {
        options = options.with_references_sheet(sheet.as_str());
    }
    if let Some(delimiter) = upload.delimiter {
        options = options.with_delimiter(delimiter);
    }
    Ok(options)
}

async fn cmd_check(
    upload: &UploadArgs,
    snapshot: &Path,
    output: Option<&Path>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = batch_options(upload)?;
    let options = if quiet { options.quiet(true) } else { options };
    LOG_BROADCASTER.set_echo(!options.quiet);

    eprintln!("📄 Checking: {}", upload.input.display());
    let store = MemoryStore::from_file(snapshot)?;

    let result = check_upload(
        &upload.input,
        upload.references.as_deref(),
        &store,
        &options,
    )
    .await;

    match result {
        Ok(result) => {
            let response = ReviewResponse::from(result);
            let json = serde_json::to_string_pretty(&response)?;
            write_output(&json, output)?;
            eprintln!("\n✨ Done!");
            Ok(())
        }
        Err(e) => {
            // The reviewer still gets a payload; the exit code reports the failure
            let json = serde_json::to_string_pretty(&error_response(&e.to_string()))?;
            write_output(&json, output)?;
            Err(e.into())
        }
    }
}

fn cmd_parse(upload: &UploadArgs, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let options = batch_options(upload)?;
    let workbook = load_upload(
        &upload.input,
        upload.references.as_deref(),
        &options.selection(),
        options.delimiter,
    )?;

    if let Some(d) = options.delimiter {
        eprintln!("   Delimiter: '{}'", format_delimiter(d));
    }
    eprintln!("✅ Parsed {} foods rows", workbook.foods.rows().len());

    let json = serde_json::to_string_pretty(&json!({
        "foods": workbook.foods.rows(),
        "references": workbook.references.as_ref().map(|g| g.rows()),
    }))?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_snapshot(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let content = fs::read_to_string(input)?;
    let document: Value = serde_json::from_str(&content)?;

    match validate_snapshot_document(&document) {
        Ok(()) => {
            eprintln!("✅ Snapshot valid");
            Ok(())
        }
        Err(errors) => {
            for err in errors.iter().take(5) {
                eprintln!("   - {}", err);
            }
            Err(format!("{} schema errors", errors.len()).into())
        }
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

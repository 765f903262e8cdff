#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the resume ledger.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use resume_ledger_ingest::{
    IngestError, Pipeline, ProcessedUpload, document_info, load_extractor, render,
    resolve_store_path, resolve_vocabulary_path,
};
use resume_ledger_pdf::{
    assemble::{assemble_with_page_markers, page_text},
    open_document,
};
use resume_ledger_store::{CsvRecordStore, InMemoryRecordStore, RecordStore};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "resume_ledger_ingest", about = "Resume parsing and master CSV tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a resume PDF and append its record to the master CSV
    Parse {
        /// Path to the PDF
        pdf: PathBuf,
        /// Master CSV path (overrides `RESUME_LEDGER_STORE`)
        #[arg(long)]
        store: Option<PathBuf>,
        /// Vocabulary TOML (overrides `RESUME_LEDGER_VOCABULARY`)
        #[arg(long)]
        vocabulary: Option<PathBuf>,
        /// Extract and show the record without writing the master CSV
        #[arg(long)]
        dry_run: bool,
        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show page count, size, encryption, and metadata of a PDF
    Info {
        /// Path to the PDF
        pdf: PathBuf,
    },
    /// Print the text of one page, or of the whole document with page markers
    Text {
        /// Path to the PDF
        pdf: PathBuf,
        /// 1-based page number
        #[arg(long)]
        page: Option<usize>,
        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export the master CSV
    Export {
        /// Master CSV path (overrides `RESUME_LEDGER_STORE`)
        #[arg(long)]
        store: Option<PathBuf>,
        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the rows of the master CSV
    Rows {
        /// Master CSV path (overrides `RESUME_LEDGER_STORE`)
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct ParseOutput<'a> {
    #[serde(flatten)]
    upload: &'a ProcessedUpload,
    rows: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            pdf,
            store,
            vocabulary,
            dry_run,
            json,
        } => {
            let bytes = read_pdf(&pdf)?;
            let extractor = load_extractor(resolve_vocabulary_path(vocabulary).as_deref())?;
            let csv_store = CsvRecordStore::at(resolve_store_path(store));

            let result = if dry_run {
                let existing = csv_store.load().map_err(|source| IngestError::Persist {
                    source,
                    table: None,
                })?;
                let memory = match existing {
                    Some(table) => InMemoryRecordStore::with_table(table),
                    None => InMemoryRecordStore::new(),
                };
                Pipeline::new(extractor, memory).process_upload(&bytes)
            } else {
                Pipeline::new(extractor, csv_store).process_upload(&bytes)
            };

            match result {
                Ok(upload) => print_upload(&upload, json, dry_run)?,
                Err(IngestError::Persist {
                    source,
                    table: Some(table),
                }) => {
                    eprintln!("persist stage failed: {source}");
                    eprintln!("Writing the unsaved master table to stdout instead");
                    std::io::stdout().write_all(&table.to_csv_bytes()?)?;
                    return Err(source.into());
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Info { pdf } => {
            let bytes = read_pdf(&pdf)?;
            let info = document_info(&bytes)?;
            print!("{}", render::info(&info)?);
        }
        Commands::Text { pdf, page, out } => {
            let bytes = read_pdf(&pdf)?;
            let document = open_document(&bytes).map_err(IngestError::from)?;

            let text = match page {
                Some(n) => {
                    let text = n
                        .checked_sub(1)
                        .and_then(|index| page_text(&document, index))
                        .ok_or_else(|| {
                            format!(
                                "Page {n} is out of range (document has {} pages)",
                                document.page_count()
                            )
                        })?;
                    if text.trim().is_empty() {
                        eprintln!("{}", render::no_text_warning(n - 1));
                    }
                    text.to_owned()
                }
                None => {
                    for index in document.pages_without_text() {
                        eprintln!("{}", render::no_text_warning(index));
                    }
                    assemble_with_page_markers(&document)
                }
            };

            write_output(out.as_deref(), text.as_bytes())?;
        }
        Commands::Export { store, out } => {
            let store = CsvRecordStore::at(resolve_store_path(store));
            let table = store.load()?.unwrap_or_default();
            log::info!(
                "Exporting {} rows from {}",
                table.len(),
                store.path().display()
            );
            write_output(out.as_deref(), &table.to_csv_bytes()?)?;
        }
        Commands::Rows { store } => {
            let store = CsvRecordStore::at(resolve_store_path(store));
            let table = store.load()?.unwrap_or_default();
            print!("{}", render::rows(&table));
        }
    }

    Ok(())
}

fn read_pdf(path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    std::fs::read(path).map_err(|e| format!("Failed to read {}: {e}", path.display()).into())
}

fn print_upload(
    upload: &ProcessedUpload,
    json: bool,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    for &index in &upload.pages_without_text {
        eprintln!("{}", render::no_text_warning(index));
    }

    if json {
        let output = ParseOutput {
            upload,
            rows: upload.table.len(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render::record(&upload.record));
        println!();
        if dry_run {
            println!(
                "Dry run: master table would have {} rows (nothing written)",
                upload.table.len()
            );
        } else {
            println!("Master table: {} rows", upload.table.len());
        }
    }
    Ok(())
}

fn write_output(out: Option<&Path>, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
    match out {
        Some(path) => {
            std::fs::write(path, bytes)
                .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
            log::info!("Wrote {} bytes to {}", bytes.len(), path.display());
        }
        None => std::io::stdout().write_all(bytes)?,
    }
    Ok(())
}

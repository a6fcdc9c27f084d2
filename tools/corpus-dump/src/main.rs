use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use thaitag_core::reader::load_rules;
use thaitag_core::{CharUnit, CorpusReader, ReaderConfig, ReaderVariant, SentenceBoundary};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Variant {
    Legacy,
    SpanAware,
}

impl From<Variant> for ReaderVariant {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Legacy => ReaderVariant::Legacy,
            Variant::SpanAware => ReaderVariant::SpanAware,
        }
    }
}

/// Parse a corpus directory and print one JSON record per line.
#[derive(Parser)]
#[command(name = "corpus-dump")]
#[command(version)]
struct Cli {
    /// Directory containing *.txt annotation files
    dir: PathBuf,

    /// Reader config (JSON); flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reader variant
    #[arg(long, value_enum)]
    variant: Option<Variant>,

    /// Cleaning rules (JSON list of {pattern, replacement})
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Split files into sentences at blank lines
    #[arg(long)]
    blank_line_sentences: bool,

    /// Count characters as code points instead of grapheme clusters
    #[arg(long)]
    code_points: bool,

    /// Skip the character-level view
    #[arg(long)]
    no_chars: bool,

    /// Omit label sequences
    #[arg(long)]
    unlabeled: bool,
}

fn reader_config(cli: &Cli) -> Result<ReaderConfig> {
    let mut config = match &cli.config {
        Some(path) => ReaderConfig::from_json_file(path)?,
        None => ReaderConfig::default(),
    };
    if let Some(variant) = cli.variant {
        config = config.with_variant(variant.into());
    }
    if let Some(path) = &cli.rules {
        config = config.with_rules(load_rules(path)?);
    }
    if cli.blank_line_sentences {
        config = config.with_sentence_boundary(SentenceBoundary::BlankLine);
    }
    if cli.code_points {
        config = config.with_char_unit(CharUnit::CodePoint);
    }
    if cli.no_chars {
        config = config.with_character_view(false);
    }
    if cli.unlabeled {
        config = config.with_labels(false);
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let reader = CorpusReader::new(reader_config(&cli)?)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (i, record) in reader.corpus(&cli.dir).iter().enumerate() {
        if let Err(reason) = record.check_alignment() {
            warn!("record {} is misaligned: {}", i, reason);
        }
        let json = serde_json::to_string(&record)?;
        writeln!(out, "{json}").context("failed to write record")?;
    }

    Ok(())
}

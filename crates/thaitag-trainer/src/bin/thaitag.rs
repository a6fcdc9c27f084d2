//! thaitag CLI
//!
//! Train, evaluate and run the LSTM NE tagger on BEST2010-style corpora.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use candle_core::Device;
use clap::{Parser, Subcommand};
use serde::Serialize;
use thaitag_core::{CorpusReader, ReaderConfig, SentenceRecord};
use thaitag_trainer::{TrainedModel, Trainer, TrainerConfig, evaluate, predict};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CLI arguments
#[derive(Parser)]
#[command(name = "thaitag")]
#[command(about = "Train and run a Thai named-entity tagger")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new model
    Train {
        /// Directory of training *.txt files
        #[arg(long)]
        train_dir: PathBuf,

        /// Directory of validation *.txt files
        #[arg(long)]
        validation_dir: Option<PathBuf>,

        /// Trainer config (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output model directory
        #[arg(short, long)]
        output: PathBuf,

        /// Override the number of epochs
        #[arg(long)]
        epochs: Option<usize>,

        /// Override the batch size
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Report loss and span F1 on a labelled corpus
    Evaluate {
        /// Model directory written by `train`
        #[arg(short, long)]
        model: PathBuf,

        /// Directory of *.txt files
        #[arg(long)]
        data_dir: PathBuf,
    },
    /// Print predicted NE labels as JSON lines
    Predict {
        /// Model directory written by `train`
        #[arg(short, long)]
        model: PathBuf,

        /// Directory of *.txt files
        #[arg(long)]
        data_dir: PathBuf,
    },
}

#[derive(Serialize)]
struct Prediction<'a> {
    tokens: Vec<&'a str>,
    ne_tags: &'a [String],
}

fn read_corpus(reader_config: &ReaderConfig, dir: &Path) -> Result<Vec<SentenceRecord>> {
    let reader = CorpusReader::new(reader_config.clone())?;
    let records: Vec<SentenceRecord> = reader.corpus(dir).iter().collect();
    info!("Read {} records from {}", records.len(), dir.display());
    Ok(records)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let device = Device::Cpu;

    match cli.command {
        Commands::Train {
            train_dir,
            validation_dir,
            config,
            output,
            epochs,
            batch_size,
        } => {
            let mut config = match config {
                Some(path) => TrainerConfig::from_json_file(path)?,
                None => TrainerConfig::default(),
            };
            if let Some(epochs) = epochs {
                config.epochs = epochs;
            }
            if let Some(batch_size) = batch_size {
                config.batch_size = batch_size;
            }

            let train = read_corpus(&config.reader, &train_dir)?;
            let validation = validation_dir
                .map(|dir| read_corpus(&config.reader, &dir))
                .transpose()?;

            info!("Starting training...");
            let trainer = Trainer::new(config, device);
            let trained = trainer.train(&train, validation.as_deref())?;
            trained.save(&output)?;
        }
        Commands::Evaluate { model, data_dir } => {
            let mut trained = TrainedModel::load(&model, &device)?;
            let records = read_corpus(&trained.config.reader, &data_dir)?;
            let report = evaluate(
                &mut trained.model,
                &trained.vocab,
                &records,
                trained.config.batch_size,
                &device,
            )?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Predict { model, data_dir } => {
            let mut trained = TrainedModel::load(&model, &device)?;
            let reader = CorpusReader::new(trained.config.reader.clone().with_labels(false))?;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let tagged = predict(
                &mut trained.model,
                &trained.vocab,
                &reader.corpus(&data_dir),
                trained.config.batch_size,
                &device,
                |record, ne_tags| {
                    let prediction = Prediction {
                        tokens: record.words().collect(),
                        ne_tags,
                    };
                    writeln!(out, "{}", serde_json::to_string(&prediction)?)
                        .context("failed to write prediction")
                },
            )?;
            info!("Tagged {} records", tagged);
        }
    }

    Ok(())
}

//! Training loop, evaluation and model persistence.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use candle_core::{DType, Device};
use candle_nn::{AdamW, Optimizer, ParamsAdamW, VarBuilder, VarMap};
use serde::Serialize;
use thaitag_core::{LabelVocabulary, SentenceRecord};
use tracing::{debug, info};

use crate::config::TrainerConfig;
use crate::data::Batch;
use crate::model::TaggingModel;

pub const WEIGHTS_FILE: &str = "model.safetensors";
pub const VOCABULARY_FILE: &str = "vocabulary.json";
pub const CONFIG_FILE: &str = "config.json";

/// Loss and span metrics over one pass of a dataset.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    /// Mean batch loss
    pub loss: f64,
    pub metrics: BTreeMap<String, f64>,
}

impl EvaluationReport {
    pub fn f1(&self) -> f64 {
        self.metrics
            .get("f1-measure-overall")
            .copied()
            .unwrap_or_default()
    }
}

/// A model together with its weights, vocabulary and configuration.
pub struct TrainedModel {
    pub model: TaggingModel,
    pub vocab: LabelVocabulary,
    pub config: TrainerConfig,
    varmap: VarMap,
}

impl TrainedModel {
    /// Write weights, vocabulary and config into `dir`.
    pub fn save(&self, dir: impl AsRef<Path>) -> anyhow::Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        self.varmap
            .save(dir.join(WEIGHTS_FILE))
            .context("failed to save model weights")?;
        self.vocab.save_json(dir.join(VOCABULARY_FILE))?;
        self.config.save_json(dir.join(CONFIG_FILE))?;
        info!("Model saved to {}", dir.display());
        Ok(())
    }

    /// Rebuild a model saved with [`TrainedModel::save`].
    pub fn load(dir: impl AsRef<Path>, device: &Device) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        let config = TrainerConfig::from_json_file(dir.join(CONFIG_FILE))?;
        let vocab = LabelVocabulary::load_json(dir.join(VOCABULARY_FILE))?;

        let mut varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let model = TaggingModel::new(vb, &vocab, &config.model)?;
        varmap
            .load(dir.join(WEIGHTS_FILE))
            .with_context(|| format!("failed to load weights from {}", dir.display()))?;

        Ok(Self {
            model,
            vocab,
            config,
            varmap,
        })
    }
}

pub struct Trainer {
    config: TrainerConfig,
    device: Device,
}

impl Trainer {
    pub fn new(config: TrainerConfig, device: Device) -> Self {
        Self { config, device }
    }

    /// Train on `train`, reporting span F1 on `validation` after every epoch.
    ///
    /// The vocabulary covers both datasets so validation labels are known.
    pub fn train(
        &self,
        train: &[SentenceRecord],
        validation: Option<&[SentenceRecord]>,
    ) -> anyhow::Result<TrainedModel> {
        self.config.validate()?;
        anyhow::ensure!(!train.is_empty(), "training corpus is empty");
        info!("Loaded {} training records", train.len());

        let vocab = LabelVocabulary::from_records(train.iter().chain(validation.unwrap_or_default()));
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &self.device);
        let mut model = TaggingModel::new(vb, &vocab, &self.config.model)?;
        info!("Tagging {} NE labels", model.num_labels());

        let params = ParamsAdamW {
            lr: self.config.learning_rate,
            ..ParamsAdamW::default()
        };
        let mut optimizer = AdamW::new(varmap.all_vars(), params)?;
        let mut rng = oorandom::Rand64::new(u128::from(self.config.seed));

        let epochs = self.config.epochs;
        for epoch in 0..epochs {
            let order = shuffled(train.len(), &mut rng);
            let mut total_loss = 0.0;
            let mut batches = 0usize;

            for (step, indices) in order.chunks(self.config.batch_size).enumerate() {
                let records = indices.iter().map(|&i| &train[i]);
                let batch = Batch::from_records(records, &vocab, &self.device, true)?;
                let output = model.forward(&batch)?;
                let Some(loss) = output.loss else {
                    debug!("batch {} has no labels, skipping update", step);
                    continue;
                };
                optimizer.backward_step(&loss)?;

                total_loss += f64::from(loss.to_scalar::<f32>()?);
                batches += 1;

                if self.config.log_every > 0 && (step + 1) % self.config.log_every == 0 {
                    info!(
                        "Epoch {}/{}, Step {}, Loss: {:.4}",
                        epoch + 1,
                        epochs,
                        step + 1,
                        total_loss / batches as f64
                    );
                }
            }

            let metrics = model.get_metrics(true);
            info!(
                "Epoch {}/{} complete - Loss: {:.4}, Span F1: {:.2}%",
                epoch + 1,
                epochs,
                total_loss / batches.max(1) as f64,
                metrics.get("f1-measure-overall").copied().unwrap_or_default() * 100.0
            );

            if let Some(validation) = validation.filter(|v| !v.is_empty()) {
                let report =
                    evaluate(&mut model, &vocab, validation, self.config.batch_size, &self.device)?;
                info!(
                    "Validation - Loss: {:.4}, Span F1: {:.2}%",
                    report.loss,
                    report.f1() * 100.0
                );
            }
        }

        Ok(TrainedModel {
            model,
            vocab,
            config: self.config.clone(),
            varmap,
        })
    }
}

/// Fisher-Yates shuffle of `0..len`.
fn shuffled(len: usize, rng: &mut oorandom::Rand64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..len).collect();
    for i in (1..len).rev() {
        let j = rng.rand_range(0..(i as u64 + 1)) as usize;
        indices.swap(i, j);
    }
    indices
}

/// Score `records` without updating weights. Resets the model's span counts.
///
/// Every record must carry NE tags.
pub fn evaluate(
    model: &mut TaggingModel,
    vocab: &LabelVocabulary,
    records: &[SentenceRecord],
    batch_size: usize,
    device: &Device,
) -> anyhow::Result<EvaluationReport> {
    model.get_metrics(true);
    let mut total_loss = 0.0;
    let mut batches = 0usize;

    for chunk in records.chunks(batch_size.max(1)) {
        let batch = Batch::from_records(chunk, vocab, device, true)?;
        anyhow::ensure!(
            batch.labels.is_some(),
            "evaluation records must carry NE tags"
        );
        let output = model.forward(&batch)?;
        if let Some(loss) = output.loss {
            total_loss += f64::from(loss.to_scalar::<f32>()?);
            batches += 1;
        }
    }

    Ok(EvaluationReport {
        loss: total_loss / batches.max(1) as f64,
        metrics: model.get_metrics(true),
    })
}

/// Tag `records` batch by batch, handing each record and its predicted NE
/// labels to `sink` as soon as its batch is decoded. At most `batch_size`
/// records are held at once. Returns the number of records tagged.
pub fn predict<I, F>(
    model: &mut TaggingModel,
    vocab: &LabelVocabulary,
    records: I,
    batch_size: usize,
    device: &Device,
    mut sink: F,
) -> anyhow::Result<usize>
where
    I: IntoIterator<Item = SentenceRecord>,
    F: FnMut(&SentenceRecord, &[String]) -> anyhow::Result<()>,
{
    let batch_size = batch_size.max(1);
    let mut tagged = 0usize;
    let mut pending = Vec::with_capacity(batch_size);
    let mut records = records.into_iter().peekable();

    while records.peek().is_some() {
        pending.extend(records.by_ref().take(batch_size));
        let batch = Batch::from_records(&pending, vocab, device, false)?;
        let output = model.forward(&batch)?;
        for (record, labels) in pending.iter().zip(&output.predictions) {
            sink(record, labels)?;
        }
        tagged += pending.len();
        pending.clear();
    }

    Ok(tagged)
}

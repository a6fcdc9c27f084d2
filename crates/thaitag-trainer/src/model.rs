//! LSTM sequence tagger for NE labels.
//! Token embedding, a left-to-right LSTM and a linear layer producing
//! per-token label logits.

use std::collections::BTreeMap;

use candle_core::{D, Tensor};
use candle_nn::{Embedding, LSTM, LSTMConfig, Linear, Module, RNN, VarBuilder};
use thaitag_core::tags::OUTSIDE;
use thaitag_core::{LabelVocabulary, Namespace, SpanBasedF1};

use crate::config::ModelConfig;
use crate::data::Batch;

/// Embedding -> LSTM -> linear.
pub struct LstmTagger {
    embedding: Embedding,
    encoder: LSTM,
    classifier: Linear,
}

impl LstmTagger {
    pub fn new(
        vb: VarBuilder,
        vocab_size: usize,
        num_labels: usize,
        config: &ModelConfig,
    ) -> candle_core::Result<Self> {
        let embedding = candle_nn::embedding(vocab_size, config.embedding_dim, vb.pp("embedder"))?;
        let encoder = candle_nn::lstm(
            config.embedding_dim,
            config.hidden_dim,
            LSTMConfig::default(),
            vb.pp("encoder"),
        )?;
        let classifier = candle_nn::linear(config.hidden_dim, num_labels, vb.pp("classifier"))?;

        Ok(Self {
            embedding,
            encoder,
            classifier,
        })
    }

    /// `token_ids`: (batch, seq_len) u32. Returns (batch, seq_len, num_labels) logits.
    pub fn forward(&self, token_ids: &Tensor) -> candle_core::Result<Tensor> {
        let embedded = self.embedding.forward(token_ids)?;
        let states = self.encoder.seq(&embedded)?;
        let encoded = self.encoder.states_to_tensor(&states)?;
        self.classifier.forward(&encoded)
    }
}

/// Cross-entropy averaged over the positions where `mask` is 1.
///
/// `logits`: (batch, seq_len, num_labels), `labels`: (batch, seq_len) u32,
/// `mask`: (batch, seq_len) f32.
pub fn masked_cross_entropy(
    logits: &Tensor,
    labels: &Tensor,
    mask: &Tensor,
) -> candle_core::Result<Tensor> {
    let (batch, seq_len, num_labels) = logits.dims3()?;
    let n = batch * seq_len;

    let log_probs = candle_nn::ops::log_softmax(&logits.reshape((n, num_labels))?, D::Minus1)?;
    let picked = log_probs.gather(&labels.reshape((n, 1))?, 1)?.squeeze(1)?;
    let mask = mask.reshape(n)?;

    let count = mask.sum_all()?.to_scalar::<f32>()?;
    let total = (picked * &mask)?.sum_all()?;
    total.affine(-1.0 / f64::from(count.max(1.0)), 0.0)
}

/// Result of one forward pass.
#[derive(Debug)]
pub struct ForwardOutput {
    pub logits: Tensor,
    /// Present only when the batch carried labels
    pub loss: Option<Tensor>,
    /// Predicted NE labels, one sequence per record, unpadded
    pub predictions: Vec<Vec<String>>,
}

/// The tagger plus its label set and running span F1.
pub struct TaggingModel {
    net: LstmTagger,
    ne_labels: Vec<String>,
    f1: SpanBasedF1,
}

impl TaggingModel {
    /// Build the network sized for `vocab`.
    pub fn new(vb: VarBuilder, vocab: &LabelVocabulary, config: &ModelConfig) -> anyhow::Result<Self> {
        let ne_labels = vocab.labels(Namespace::NeTags).to_vec();
        anyhow::ensure!(!ne_labels.is_empty(), "vocabulary has no NE labels");

        let net = LstmTagger::new(vb, vocab.size(Namespace::Tokens), ne_labels.len(), config)?;
        Ok(Self {
            net,
            ne_labels,
            f1: SpanBasedF1::new(),
        })
    }

    pub fn num_labels(&self) -> usize {
        self.ne_labels.len()
    }

    /// Run the network. With labels, also compute the loss and update the
    /// span F1 counts.
    pub fn forward(&mut self, batch: &Batch) -> anyhow::Result<ForwardOutput> {
        let logits = self.net.forward(&batch.token_ids)?;

        let loss = match (&batch.labels, &batch.label_mask) {
            (Some(labels), Some(label_mask)) => {
                Some(masked_cross_entropy(&logits, labels, label_mask)?)
            }
            _ => None,
        };

        let predictions = self.decode(&logits, &batch.lengths)?;
        if let Some(gold) = &batch.gold_tags {
            for (predicted, gold) in predictions.iter().zip(gold) {
                self.f1.update(predicted, gold);
            }
        }

        Ok(ForwardOutput {
            logits,
            loss,
            predictions,
        })
    }

    /// Argmax labels per position, cut to each record's length.
    pub fn decode(&self, logits: &Tensor, lengths: &[usize]) -> anyhow::Result<Vec<Vec<String>>> {
        let ids = logits.argmax(D::Minus1)?.to_vec2::<u32>()?;
        Ok(ids
            .into_iter()
            .zip(lengths)
            .map(|(row, &len)| {
                row.into_iter()
                    .take(len)
                    .map(|id| {
                        self.ne_labels
                            .get(id as usize)
                            .cloned()
                            .unwrap_or_else(|| OUTSIDE.to_string())
                    })
                    .collect()
            })
            .collect())
    }

    /// Span F1 accumulated since the last reset.
    pub fn get_metrics(&mut self, reset: bool) -> BTreeMap<String, f64> {
        self.f1.get_metric(reset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;
    use thaitag_core::{CorpusReader, ReaderConfig};

    fn small_config() -> ModelConfig {
        ModelConfig {
            embedding_dim: 8,
            hidden_dim: 6,
        }
    }

    #[test]
    fn test_forward_shapes_and_loss() {
        let reader = CorpusReader::new(ReaderConfig::default()).unwrap();
        let records = vec![
            reader.parse_sentence("สม/NR/PER_B|ชาย/NR/PER_I|กิน/VV/O"),
            reader.parse_sentence("ปลา/NN/O"),
        ];
        let vocab = LabelVocabulary::from_records(&records);
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let mut model = TaggingModel::new(vb, &vocab, &small_config()).unwrap();

        let batch = Batch::from_records(&records, &vocab, &device, true).unwrap();
        let output = model.forward(&batch).unwrap();

        assert_eq!(output.logits.dims(), &[2, 3, model.num_labels()]);
        let loss = output.loss.unwrap().to_scalar::<f32>().unwrap();
        assert!(loss.is_finite() && loss > 0.0);
        assert_eq!(output.predictions[0].len(), 3);
        assert_eq!(output.predictions[1].len(), 1);
        assert!(model.get_metrics(true).contains_key("f1-measure-overall"));
    }

    #[test]
    fn test_no_loss_without_labels() {
        let reader = CorpusReader::new(ReaderConfig::default()).unwrap();
        let records = vec![reader.parse_sentence("ปลา/NN/O")];
        let vocab = LabelVocabulary::from_records(&records);
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let mut model = TaggingModel::new(vb, &vocab, &small_config()).unwrap();

        let batch = Batch::from_records(&records, &vocab, &device, false).unwrap();
        let output = model.forward(&batch).unwrap();
        assert!(output.loss.is_none());
        assert_eq!(output.predictions, vec![vec!["O".to_string()]]);
    }

    #[test]
    fn test_masked_cross_entropy_uniform_logits() {
        let device = Device::Cpu;
        let logits = Tensor::zeros((1, 2, 4), DType::F32, &device).unwrap();
        let labels = Tensor::from_vec(vec![1u32, 3], (1, 2), &device).unwrap();
        let mask = Tensor::from_vec(vec![1f32, 0.0], (1, 2), &device).unwrap();

        let loss = masked_cross_entropy(&logits, &labels, &mask)
            .unwrap()
            .to_scalar::<f32>()
            .unwrap();
        assert!((loss - 4f32.ln()).abs() < 1e-5);
    }
}

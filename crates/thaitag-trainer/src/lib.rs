//! # thaitag Trainer
//!
//! LSTM named-entity tagger over records produced by the `thaitag-core`
//! reader: batching, masked cross-entropy training, span-F1 evaluation,
//! prediction and model persistence.

pub mod config;
pub mod data;
pub mod model;
pub mod trainer;

pub use config::{ModelConfig, TrainerConfig};
pub use data::{Batch, EncodedSentence, encode};
pub use model::{ForwardOutput, LstmTagger, TaggingModel, masked_cross_entropy};
pub use trainer::{EvaluationReport, TrainedModel, Trainer, evaluate, predict};

//! Encoding sentence records into padded id tensors.

use candle_core::{Device, Tensor};
use thaitag_core::vocab::PADDING_INDEX;
use thaitag_core::{LabelVocabulary, Namespace, SentenceRecord};

/// Ids for one record.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedSentence {
    pub token_ids: Vec<u32>,
    /// NE label ids; `None` for a label outside the vocabulary
    pub ne_ids: Option<Vec<Option<u32>>>,
}

/// Look up token ids (unknown tokens map to the unknown id) and, when the
/// record carries them, NE label ids.
pub fn encode(record: &SentenceRecord, vocab: &LabelVocabulary) -> EncodedSentence {
    let token_ids = record
        .tokens
        .iter()
        .map(|token| {
            vocab
                .index_of(Namespace::Tokens, &token.text)
                .map_or(thaitag_core::vocab::UNKNOWN_INDEX as u32, |id| id as u32)
        })
        .collect();

    let ne_ids = record.ne_tags.as_ref().map(|tags| {
        tags.iter()
            .map(|tag| vocab.get_index(Namespace::NeTags, tag).map(|id| id as u32))
            .collect()
    });

    EncodedSentence { token_ids, ne_ids }
}

/// A padded mini-batch.
///
/// Padding sits at the end of each row; `mask` is 1.0 on real tokens.
/// `label_mask` additionally zeroes positions whose gold label is unknown to
/// the vocabulary, so they add no loss but still count for span F1.
#[derive(Debug)]
pub struct Batch {
    /// (batch, max_len) u32
    pub token_ids: Tensor,
    /// (batch, max_len) f32
    pub mask: Tensor,
    /// (batch, max_len) u32
    pub labels: Option<Tensor>,
    /// (batch, max_len) f32
    pub label_mask: Option<Tensor>,
    pub lengths: Vec<usize>,
    pub gold_tags: Option<Vec<Vec<String>>>,
}

impl Batch {
    /// Encode and pad `records`. Labels are included only when `labeled` is
    /// set and every record carries NE tags.
    pub fn from_records<'a, I>(
        records: I,
        vocab: &LabelVocabulary,
        device: &Device,
        labeled: bool,
    ) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = &'a SentenceRecord>,
    {
        let records: Vec<&SentenceRecord> = records.into_iter().collect();
        anyhow::ensure!(!records.is_empty(), "cannot build an empty batch");

        let encoded: Vec<EncodedSentence> = records.iter().map(|&r| encode(r, vocab)).collect();
        let lengths: Vec<usize> = encoded.iter().map(|e| e.token_ids.len()).collect();
        let max_len = lengths.iter().copied().max().unwrap_or(0).max(1);
        let batch_size = records.len();

        let mut token_ids = vec![PADDING_INDEX as u32; batch_size * max_len];
        let mut mask = vec![0f32; batch_size * max_len];
        for (row, sentence) in encoded.iter().enumerate() {
            let offset = row * max_len;
            token_ids[offset..offset + sentence.token_ids.len()].copy_from_slice(&sentence.token_ids);
            mask[offset..offset + sentence.token_ids.len()].fill(1.0);
        }

        let labeled = labeled && encoded.iter().all(|e| e.ne_ids.is_some());
        let (labels, label_mask, gold_tags) = if labeled {
            let mut labels = vec![0u32; batch_size * max_len];
            let mut label_mask = vec![0f32; batch_size * max_len];
            for (row, sentence) in encoded.iter().enumerate() {
                let offset = row * max_len;
                for (i, id) in sentence.ne_ids.iter().flatten().enumerate() {
                    if let Some(id) = id {
                        labels[offset + i] = *id;
                        label_mask[offset + i] = 1.0;
                    }
                }
            }
            let gold = records
                .iter()
                .map(|r| r.ne_tags.clone().unwrap_or_default())
                .collect();
            (
                Some(Tensor::from_vec(labels, (batch_size, max_len), device)?),
                Some(Tensor::from_vec(label_mask, (batch_size, max_len), device)?),
                Some(gold),
            )
        } else {
            (None, None, None)
        };

        Ok(Self {
            token_ids: Tensor::from_vec(token_ids, (batch_size, max_len), device)?,
            mask: Tensor::from_vec(mask, (batch_size, max_len), device)?,
            labels,
            label_mask,
            lengths,
            gold_tags,
        })
    }
}

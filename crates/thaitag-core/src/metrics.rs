//! # Span-based F1
//!
//! Compares predicted and gold entity spans (not per-token labels). Counts
//! accumulate across calls to [`SpanBasedF1::update`] until reset.

use std::collections::{BTreeMap, BTreeSet};

use crate::tags::{Span, bio_to_spans};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Counts {
    true_positives: usize,
    false_positives: usize,
    false_negatives: usize,
}

impl Counts {
    fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Accumulating span-level precision, recall and F1 over prefix-BIO labels.
#[derive(Debug, Clone, Default)]
pub struct SpanBasedF1 {
    counts: BTreeMap<String, Counts>,
}

impl SpanBasedF1 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score one sequence. `predicted` and `gold` must be aligned; only the
    /// common prefix is compared if their lengths differ.
    pub fn update<P, G>(&mut self, predicted: &[P], gold: &[G])
    where
        P: AsRef<str>,
        G: AsRef<str>,
    {
        let len = predicted.len().min(gold.len());
        let predicted: BTreeSet<Span> = bio_to_spans(&predicted[..len]).into_iter().collect();
        let gold: BTreeSet<Span> = bio_to_spans(&gold[..len]).into_iter().collect();

        for span in &predicted {
            let counts = self.counts.entry(span.label.clone()).or_default();
            if gold.contains(span) {
                counts.true_positives += 1;
            } else {
                counts.false_positives += 1;
            }
        }
        for span in gold.difference(&predicted) {
            self.counts.entry(span.label.clone()).or_default().false_negatives += 1;
        }
    }

    /// Per-label and overall metrics, keyed `precision-X`, `recall-X`,
    /// `f1-measure-X` with `X` a label or `overall`. Clears the counts when
    /// `reset` is set.
    pub fn get_metric(&mut self, reset: bool) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();
        let mut overall = Counts::default();

        for (label, counts) in &self.counts {
            insert_metrics(&mut metrics, label, counts);
            overall.true_positives += counts.true_positives;
            overall.false_positives += counts.false_positives;
            overall.false_negatives += counts.false_negatives;
        }
        insert_metrics(&mut metrics, "overall", &overall);

        if reset {
            self.reset();
        }
        metrics
    }

    pub fn reset(&mut self) {
        self.counts.clear();
    }
}

fn insert_metrics(metrics: &mut BTreeMap<String, f64>, label: &str, counts: &Counts) {
    metrics.insert(format!("precision-{label}"), counts.precision());
    metrics.insert(format!("recall-{label}"), counts.recall());
    metrics.insert(format!("f1-measure-{label}"), counts.f1());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_prediction() {
        let mut f1 = SpanBasedF1::new();
        let gold = ["B-PER", "I-PER", "O", "B-LOC"];
        f1.update(&gold, &gold);
        let metrics = f1.get_metric(false);
        assert_eq!(metrics["f1-measure-overall"], 1.0);
        assert_eq!(metrics["precision-PER"], 1.0);
    }

    #[test]
    fn test_partial_span_counts_as_miss() {
        let mut f1 = SpanBasedF1::new();
        f1.update(&["B-PER", "O", "O"], &["B-PER", "I-PER", "O"]);
        let metrics = f1.get_metric(false);
        assert_eq!(metrics["precision-overall"], 0.0);
        assert_eq!(metrics["recall-overall"], 0.0);
    }

    #[test]
    fn test_mixed_results() {
        let mut f1 = SpanBasedF1::new();
        // one hit, one false positive, one miss
        f1.update(
            &["B-PER", "O", "B-LOC", "O"],
            &["B-PER", "O", "O", "B-ORG"],
        );
        let metrics = f1.get_metric(false);
        assert!((metrics["precision-overall"] - 0.5).abs() < 1e-9);
        assert!((metrics["recall-overall"] - 0.5).abs() < 1e-9);
        assert!((metrics["f1-measure-overall"] - 0.5).abs() < 1e-9);
        assert_eq!(metrics["recall-ORG"], 0.0);
    }

    #[test]
    fn test_counts_accumulate_until_reset() {
        let mut f1 = SpanBasedF1::new();
        f1.update(&["B-PER"], &["B-PER"]);
        f1.update(&["O"], &["B-PER"]);
        let metrics = f1.get_metric(true);
        assert!((metrics["recall-overall"] - 0.5).abs() < 1e-9);

        let metrics = f1.get_metric(false);
        assert_eq!(metrics["f1-measure-overall"], 0.0);
        assert!(!metrics.contains_key("f1-measure-PER"));
    }

    #[test]
    fn test_outside_only_sequences() {
        let mut f1 = SpanBasedF1::new();
        f1.update(&["O", "space"], &["O", "O"]);
        assert_eq!(f1.get_metric(false)["f1-measure-overall"], 0.0);
    }
}

//! Sequence classifier seam.
//!
//! The trained model is external: anything that maps a padded batch of
//! vocabulary indices to class indices and probabilities can be plugged in
//! through [`SequenceClassifier`]. This module pads the batch, invokes the
//! model once for the whole batch and validates the shapes it returns.

use anyhow::Result;
use ndarray::{Array2, ArrayView2};
use std::path::Path;
use std::sync::Arc;

use crate::config::UNKNOWN_INDEX;

/// A trained classifier over fixed-width index sequences.
///
/// Implementations must be stateless from the caller's point of view: the same
/// batch always yields the same output. Both methods receive the whole batch.
pub trait SequenceClassifier: Send + Sync {
    /// Most likely class index for every row.
    fn predict_label(&self, batch: ArrayView2<'_, i64>) -> Result<Vec<usize>>;

    /// Probabilities per row: one column for binary models, one per class otherwise.
    fn predict_proba(&self, batch: ArrayView2<'_, i64>) -> Result<Array2<f32>>;
}

/// Turns a downloaded model artifact into a classifier.
pub trait ModelLoader: Send + Sync {
    /// Loads the model stored at `path`.
    fn load(&self, path: &Path) -> Result<Arc<dyn SequenceClassifier>>;
}

/// Output of one batched classifier call.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Most likely class index per row
    pub labels: Vec<usize>,
    /// Probability matrix with one row per input row
    pub probabilities: Array2<f32>,
}

impl Prediction {
    /// Probability of the positive class per row.
    ///
    /// Uses the second column of a two-column output, or the only column of a
    /// single-output (sigmoid) model.
    pub fn positive_probability(&self) -> Result<Vec<f32>> {
        let column = match self.probabilities.ncols() {
            1 => 0,
            2 => 1,
            n => {
                return Err(anyhow::anyhow!(
                    "Binary classifier returned {} probability columns",
                    n
                ))
            }
        };
        Ok(self.probabilities.column(column).to_vec())
    }
}

/// Pads sequences into a `(rows, max_len)` batch.
///
/// Short sequences are left-padded with the unknown index; long sequences lose
/// their leading elements so the last `max_len` values are kept.
pub fn pad_sequences(sequences: &[Vec<i64>], max_len: usize) -> Array2<i64> {
    let mut batch = Array2::from_elem((sequences.len(), max_len), UNKNOWN_INDEX);
    for (mut row, sequence) in batch.rows_mut().into_iter().zip(sequences) {
        let kept = &sequence[sequence.len().saturating_sub(max_len)..];
        let offset = max_len - kept.len();
        for (slot, value) in row.iter_mut().skip(offset).zip(kept) {
            *slot = *value;
        }
    }
    batch
}

/// Pads `sequences` to `max_len` and runs the classifier once over the batch.
///
/// An empty batch never reaches the model.
pub fn classify(
    sequences: &[Vec<i64>],
    model: &dyn SequenceClassifier,
    max_len: usize,
) -> Result<Prediction> {
    if sequences.is_empty() {
        return Ok(Prediction {
            labels: Vec::new(),
            probabilities: Array2::zeros((0, 0)),
        });
    }

    let batch = pad_sequences(sequences, max_len);
    log::debug!(
        "Classifying batch of {} sequences (width {})",
        batch.nrows(),
        batch.ncols()
    );

    let labels = model.predict_label(batch.view())?;
    let probabilities = model.predict_proba(batch.view())?;

    if labels.len() != sequences.len() {
        return Err(anyhow::anyhow!(
            "Classifier returned {} labels for {} rows",
            labels.len(),
            sequences.len()
        ));
    }
    if probabilities.nrows() != sequences.len() {
        return Err(anyhow::anyhow!(
            "Classifier returned {} probability rows for {} rows",
            probabilities.nrows(),
            sequences.len()
        ));
    }

    Ok(Prediction {
        labels,
        probabilities,
    })
}

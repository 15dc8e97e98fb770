//! Prediction pipelines.
//!
//! A pipeline couples a trained sequence classifier with the vocabulary it was
//! trained on and, for multi-class models, the ordered category names of its
//! output classes. Each pipeline has deterministic artifact names per year.

mod predict;

use anyhow::{Context, Result};
use std::io::Read;
use std::sync::Arc;
use strum_macros::{Display, EnumIter};

use crate::classifier::SequenceClassifier;
use crate::ngram::Vocabulary;

pub use predict::predict_frame;

/// Shape of a pipeline's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// `_lab` holds 0/1 and `_prob` the positive-class probability.
    Binary,
    /// `_lab` holds a category name and there is one `_prob_{category}` per class.
    MultiClass,
}

/// Classifier-backed pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum Pipeline {
    /// Phishing likelihood, trained on the phishing list.
    #[strum(serialize = "pred_phish")]
    Phish,
    /// Malware likelihood, trained on the blacklist's malware entries.
    #[strum(serialize = "pred_malware")]
    Malware,
    /// Content category, trained on the Toulouse blacklist.
    #[strum(serialize = "pred_toulouse")]
    Toulouse,
    /// Content category, trained on the aggregated blacklist.
    #[strum(serialize = "pred_shalla")]
    Shalla,
}

impl Pipeline {
    /// Column prefix, also the pipeline's public name (e.g. `pred_phish`).
    pub fn prefix(&self) -> &'static str {
        match self {
            Pipeline::Phish => "pred_phish",
            Pipeline::Malware => "pred_malware",
            Pipeline::Toulouse => "pred_toulouse",
            Pipeline::Shalla => "pred_shalla",
        }
    }

    /// Year used when the caller does not ask for one.
    pub fn default_year(&self) -> u16 {
        match self {
            Pipeline::Phish => 2016,
            Pipeline::Malware | Pipeline::Toulouse | Pipeline::Shalla => 2017,
        }
    }

    /// Binary or multi-class output.
    pub fn output_kind(&self) -> OutputKind {
        match self {
            Pipeline::Phish | Pipeline::Malware => OutputKind::Binary,
            Pipeline::Toulouse | Pipeline::Shalla => OutputKind::MultiClass,
        }
    }

    fn stem(&self) -> &'static str {
        match self {
            Pipeline::Phish => "phish_cat",
            Pipeline::Malware => "malware_cat",
            Pipeline::Toulouse => "toulouse_cat",
            Pipeline::Shalla => "shalla_cat",
        }
    }

    fn artifact(&self, kind: &str, year: u16, extension: &str) -> String {
        let others = match self.output_kind() {
            OutputKind::Binary => "",
            OutputKind::MultiClass => "_others",
        };
        format!("{}_{}{}_{}.{}", self.stem(), kind, others, year, extension)
    }

    /// Model artifact file name, e.g. `phish_cat_lstm_2016.h5`.
    ///
    /// The file is handed to the installed [`ModelLoader`](crate::ModelLoader)
    /// as is, so the loader must understand the published Keras format (or the
    /// models endpoint must point at a mirror serving a format it does).
    pub fn model_file(&self, year: u16) -> String {
        self.artifact("lstm", year, "h5")
    }

    /// Vocabulary file name, e.g. `toulouse_cat_vocab_others_2017.csv`.
    pub fn vocab_file(&self, year: u16) -> String {
        self.artifact("vocab", year, "csv")
    }

    /// Category-name file name; only multi-class pipelines have one.
    pub fn names_file(&self, year: u16) -> Option<String> {
        match self.output_kind() {
            OutputKind::Binary => None,
            OutputKind::MultiClass => Some(self.artifact("names", year, "csv")),
        }
    }

    /// Column holding category names in the names file.
    pub fn names_column(&self) -> &'static str {
        self.stem()
    }
}

/// Everything a pipeline needs to score a batch.
#[derive(Clone)]
pub struct ModelBundle {
    /// The trained classifier
    pub model: Arc<dyn SequenceClassifier>,
    /// Vocabulary it was trained with
    pub vocabulary: Vocabulary,
    /// Category names in class-index order (multi-class pipelines only)
    pub categories: Option<Vec<String>>,
}

impl std::fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBundle")
            .field("vocabulary_len", &self.vocabulary.len())
            .field("categories", &self.categories)
            .finish_non_exhaustive()
    }
}

/// Reads ordered category names from a names file.
///
/// Uses `column` when the header has it, otherwise the first column.
pub fn read_category_names<R: Read>(reader: R, column: &str) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers().context("Failed to read names header")?;
    if headers.is_empty() {
        return Err(anyhow::anyhow!("Category names file has no columns"));
    }
    let position = headers.iter().position(|h| h == column).unwrap_or(0);

    let mut names = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to read names row")?;
        if let Some(name) = record.get(position).filter(|n| !n.is_empty()) {
            names.push(name.to_string());
        }
    }

    if names.is_empty() {
        return Err(anyhow::anyhow!("Category names file is empty"));
    }
    Ok(names)
}

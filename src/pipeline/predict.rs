//! Scoring a batch with a pipeline's classifier.

use anyhow::anyhow;

use super::{ModelBundle, OutputKind, Pipeline};
use crate::assemble::{ColumnPrefix, DerivedColumns};
use crate::classifier::classify;
use crate::config::{FEATURE_LEN, NGRAMS};
use crate::domain::{normalize, ExcludeSubdomains};
use crate::error_handling::CategoryError;
use crate::frame::{Frame, Value};
use crate::ngram::encode;

/// Appends `_domain`, `_lab` and the probability columns for `pipeline` to a
/// copy of `frame`.
///
/// Domains are normalized with only a literal `www` subdomain dropped. The
/// classifier runs once over the whole batch. Any shape problem in its output
/// fails the call; no partially annotated batch is ever returned.
pub fn predict_frame(
    frame: &Frame,
    column: &str,
    pipeline: Pipeline,
    year: u16,
    bundle: &ModelBundle,
) -> Result<Frame, CategoryError> {
    let values = frame
        .column(column)
        .ok_or_else(|| CategoryError::MissingColumn(column.to_string()))?;

    let exclude = ExcludeSubdomains::only(["www"]);
    let domains: Vec<String> = values
        .iter()
        .map(|value| {
            value
                .as_str()
                .map(|raw| normalize(raw, &exclude))
                .unwrap_or_default()
        })
        .collect();
    let sequences: Vec<Vec<i64>> = domains
        .iter()
        .map(|domain| encode(domain, &bundle.vocabulary, NGRAMS))
        .collect();

    let prediction = classify(&sequences, bundle.model.as_ref(), FEATURE_LEN)
        .map_err(CategoryError::ResolutionError)?;

    let mut derived = DerivedColumns::new(ColumnPrefix::new(pipeline.prefix(), year));
    derived.push("domain", domains);

    match pipeline.output_kind() {
        OutputKind::Binary => {
            let probabilities = if frame.is_empty() {
                Vec::new()
            } else {
                prediction
                    .positive_probability()
                    .map_err(CategoryError::ResolutionError)?
            };
            derived
                .push(
                    "lab",
                    prediction.labels.iter().map(|&label| label as i64),
                )
                .push("prob", probabilities);
        }
        OutputKind::MultiClass => {
            let categories = bundle.categories.as_deref().ok_or_else(|| {
                CategoryError::ResolutionError(anyhow!(
                    "{} has no category names loaded",
                    pipeline
                ))
            })?;
            if !frame.is_empty() && prediction.probabilities.ncols() != categories.len() {
                return Err(CategoryError::ResolutionError(anyhow!(
                    "{} returned {} probability columns for {} categories",
                    pipeline,
                    prediction.probabilities.ncols(),
                    categories.len()
                )));
            }

            let labels = prediction
                .labels
                .iter()
                .map(|&label| {
                    categories
                        .get(label)
                        .map(|name| Value::Text(name.clone()))
                        .ok_or_else(|| {
                            CategoryError::ResolutionError(anyhow!(
                                "{} predicted class {} but only {} categories are known",
                                pipeline,
                                label,
                                categories.len()
                            ))
                        })
                })
                .collect::<Result<Vec<Value>, CategoryError>>()?;
            derived.push("lab", labels);

            for (class, category) in categories.iter().enumerate() {
                let field = format!("prob_{}", category);
                if frame.is_empty() {
                    derived.push(&field, Vec::<f32>::new());
                } else {
                    derived.push(&field, prediction.probabilities.column(class).to_vec());
                }
            }
        }
    }

    log::debug!("{} {} scored {} rows", pipeline, year, frame.len());
    derived.apply(frame)
}

// Pipeline tests. The classifiers below are deterministic stand-ins.

use super::*;
use crate::error_handling::CategoryError;
use crate::frame::{Frame, Value};
use ndarray::{Array2, ArrayView2};
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

/// Scores each row by how many of its features are known n-grams.
struct KnownShareModel {
    classes: usize,
    calls: AtomicUsize,
}

impl KnownShareModel {
    fn new(classes: usize) -> Self {
        Self {
            classes,
            calls: AtomicUsize::new(0),
        }
    }

    fn known(row: ndarray::ArrayView1<'_, i64>) -> usize {
        row.iter().filter(|&&v| v != 0).count()
    }
}

impl SequenceClassifier for KnownShareModel {
    fn predict_label(&self, batch: ArrayView2<'_, i64>) -> Result<Vec<usize>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(batch
            .rows()
            .into_iter()
            .map(|row| Self::known(row).min(self.classes - 1))
            .collect())
    }

    fn predict_proba(&self, batch: ArrayView2<'_, i64>) -> Result<Array2<f32>> {
        let labels = self.predict_label(batch)?;
        Ok(Array2::from_shape_fn((batch.nrows(), self.classes), |(r, c)| {
            if labels[r] == c {
                0.7
            } else {
                0.3 / (self.classes - 1) as f32
            }
        }))
    }
}

fn bundle(model: Arc<dyn SequenceClassifier>, categories: Option<Vec<String>>) -> ModelBundle {
    ModelBundle {
        model,
        vocabulary: Vocabulary::from_ngrams(["go", "oo", "og"]),
        categories,
    }
}

fn urls() -> Frame {
    Frame::from_rows(
        &["url"],
        vec![
            vec!["http://www.google.com".into()],
            vec!["http://m.zzz.net".into()],
            vec![Value::Null],
        ],
    )
    .unwrap()
}

#[test]
fn test_artifact_names() {
    assert_eq!(Pipeline::Phish.model_file(2016), "phish_cat_lstm_2016.h5");
    assert_eq!(Pipeline::Phish.vocab_file(2016), "phish_cat_vocab_2016.csv");
    assert_eq!(Pipeline::Phish.names_file(2016), None);
    assert_eq!(
        Pipeline::Toulouse.model_file(2017),
        "toulouse_cat_lstm_others_2017.h5"
    );
    assert_eq!(
        Pipeline::Toulouse.names_file(2017).as_deref(),
        Some("toulouse_cat_names_others_2017.csv")
    );
    assert_eq!(Pipeline::Shalla.names_column(), "shalla_cat");
}

#[test]
fn test_prefix_matches_display() {
    for pipeline in Pipeline::iter() {
        assert_eq!(pipeline.to_string(), pipeline.prefix());
    }
}

#[test]
fn test_read_category_names_by_column() {
    let data = "id,toulouse_cat\n0,adult\n1,news\n2,shopping\n";
    let names = read_category_names(data.as_bytes(), "toulouse_cat").unwrap();
    assert_eq!(names, vec!["adult", "news", "shopping"]);
}

#[test]
fn test_read_category_names_falls_back_to_first_column() {
    let names = read_category_names("category\nadv\nnews\n".as_bytes(), "shalla_cat").unwrap();
    assert_eq!(names, vec!["adv", "news"]);
}

#[test]
fn test_read_category_names_empty_file() {
    assert!(read_category_names("shalla_cat\n".as_bytes(), "shalla_cat").is_err());
}

#[test]
fn test_binary_prediction_columns() {
    let model = Arc::new(KnownShareModel::new(2));
    let bundle = bundle(model.clone(), None);
    let result = predict_frame(&urls(), "url", Pipeline::Phish, 2016, &bundle).unwrap();

    assert_eq!(
        result.column_names(),
        vec!["url", "pred_phish_2016_domain", "pred_phish_2016_lab", "pred_phish_2016_prob"]
    );
    assert_eq!(
        result.column("pred_phish_2016_domain").unwrap(),
        &[
            Value::Text("google.com".into()),
            Value::Text("m.zzz.net".into()),
            Value::Text(String::new()),
        ]
    );
    // "google.com" contains known n-grams, the others encode to all zeros.
    assert_eq!(
        result.column("pred_phish_2016_lab").unwrap(),
        &[Value::Int(1), Value::Int(0), Value::Int(0)]
    );
    let prob = result.get(0, "pred_phish_2016_prob").and_then(Value::as_f64).unwrap();
    assert!((prob - 0.7).abs() < 1e-6);
    assert_eq!(model.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_multiclass_prediction_uses_category_names() {
    let categories = vec!["none".to_string(), "few".to_string(), "many".to_string()];
    let bundle = bundle(Arc::new(KnownShareModel::new(3)), Some(categories));
    let result = predict_frame(&urls(), "url", Pipeline::Toulouse, 2017, &bundle).unwrap();

    assert_eq!(
        result.column_names(),
        vec![
            "url",
            "pred_toulouse_2017_domain",
            "pred_toulouse_2017_lab",
            "pred_toulouse_2017_prob_none",
            "pred_toulouse_2017_prob_few",
            "pred_toulouse_2017_prob_many",
        ]
    );
    assert_eq!(
        result.get(0, "pred_toulouse_2017_lab"),
        Some(&Value::Text("many".into()))
    );
    assert_eq!(
        result.get(1, "pred_toulouse_2017_lab"),
        Some(&Value::Text("none".into()))
    );
}

#[test]
fn test_multiclass_shape_mismatch_fails_whole_batch() {
    let categories = vec!["a".to_string(), "b".to_string()];
    let bundle = bundle(Arc::new(KnownShareModel::new(3)), Some(categories));
    let err = predict_frame(&urls(), "url", Pipeline::Shalla, 2017, &bundle).unwrap_err();
    assert!(matches!(err, CategoryError::ResolutionError(_)));
}

#[test]
fn test_multiclass_without_names_fails() {
    let bundle = bundle(Arc::new(KnownShareModel::new(3)), None);
    assert!(matches!(
        predict_frame(&urls(), "url", Pipeline::Shalla, 2017, &bundle),
        Err(CategoryError::ResolutionError(_))
    ));
}

#[test]
fn test_missing_column_does_not_call_model() {
    let model = Arc::new(KnownShareModel::new(2));
    let bundle = bundle(model.clone(), None);
    let err = predict_frame(&urls(), "domain_names", Pipeline::Malware, 2017, &bundle).unwrap_err();
    assert!(matches!(err, CategoryError::MissingColumn(_)));
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_empty_batch_skips_model() {
    let model = Arc::new(KnownShareModel::new(2));
    let bundle = bundle(model.clone(), None);
    let frame = Frame::from_rows(&["url"], Vec::new()).unwrap();
    let result = predict_frame(&frame, "url", Pipeline::Phish, 2016, &bundle).unwrap();
    assert!(result.is_empty());
    assert!(result.has_column("pred_phish_2016_prob"));
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_pipelines_and_years_compose() {
    let binary = bundle(Arc::new(KnownShareModel::new(2)), None);
    let frame = urls();
    let first = predict_frame(&frame, "url", Pipeline::Phish, 2016, &binary).unwrap();
    let second = predict_frame(&first, "url", Pipeline::Phish, 2017, &binary).unwrap();
    let third = predict_frame(&second, "url", Pipeline::Malware, 2017, &binary).unwrap();
    assert_eq!(third.column_names().len(), 1 + 3 * 3);
}

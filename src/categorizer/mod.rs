//! Process-wide entry point.
//!
//! A [`Categorizer`] owns the artifact store and the two in-process caches:
//! parsed reference tables keyed by `(Dataset, year)` and model bundles keyed
//! by `(Pipeline, year)`. Each is loaded at most once per key, even under
//! concurrent first use, and shared read-only afterwards.

use anyhow::Context;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::artifact::{ArtifactKind, ArtifactStore};
use crate::classifier::ModelLoader;
use crate::config::Config;
use crate::error_handling::{CategoryError, InitializationError};
use crate::frame::Frame;
use crate::ngram::Vocabulary;
use crate::pipeline::{predict_frame, read_category_names, ModelBundle, Pipeline};
use crate::reference::{parse_table, Dataset, ReferenceTable};
use crate::registry::Registry;
use crate::resolve::resolve;

static GLOBAL: LazyLock<Result<Categorizer, InitializationError>> =
    LazyLock::new(|| Categorizer::new(Config::from_env()));

/// Categorizes batches of domains by table lookup or classifier prediction.
pub struct Categorizer {
    store: ArtifactStore,
    tables: Registry<(Dataset, u16), ReferenceTable>,
    models: Registry<(Pipeline, u16), ModelBundle>,
    model_loader: RwLock<Option<Arc<dyn ModelLoader>>>,
}

impl Categorizer {
    /// Creates a categorizer with empty caches.
    pub fn new(config: Config) -> Result<Self, InitializationError> {
        let store = ArtifactStore::new(&config)?;
        log::debug!("Artifact cache at {}", store.cache_dir().display());
        Ok(Self {
            store,
            tables: Registry::default(),
            models: Registry::default(),
            model_loader: RwLock::new(None),
        })
    }

    /// Creates a categorizer that can load classifier models.
    pub fn with_model_loader(
        config: Config,
        loader: Arc<dyn ModelLoader>,
    ) -> Result<Self, InitializationError> {
        let categorizer = Self::new(config)?;
        categorizer.set_model_loader(loader);
        Ok(categorizer)
    }

    /// The shared instance, configured from the environment on first use.
    pub fn global() -> Result<&'static Categorizer, &'static InitializationError> {
        GLOBAL.as_ref()
    }

    /// Installs (or replaces) the loader used for model artifacts.
    ///
    /// Bundles already loaded keep their classifier.
    pub fn set_model_loader(&self, loader: Arc<dyn ModelLoader>) {
        *self
            .model_loader
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(loader);
    }

    fn model_loader(&self) -> Option<Arc<dyn ModelLoader>> {
        self.model_loader
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the reference table for `(dataset, year)`, fetching it on first use.
    ///
    /// With `refresh` set the cached file and in-process table are replaced.
    pub async fn reference_table(
        &self,
        dataset: Dataset,
        year: u16,
        refresh: bool,
    ) -> Result<Arc<ReferenceTable>, CategoryError> {
        let file_name = dataset.file_name(year);
        let file = file_name.as_str();
        self.tables
            .get_or_try_load((dataset, year), refresh, || async move {
                let bytes = self.store.fetch(ArtifactKind::Data, file, refresh).await?;
                parse_table(dataset, year, &bytes)
            })
            .await
            .map_err(|e| {
                log::warn!("{} table for {} unavailable: {:#}", dataset, year, e);
                CategoryError::unavailable(file_name.as_str(), e)
            })
    }

    /// Returns the model bundle for `(pipeline, year)`, fetching it on first use.
    pub async fn model_bundle(
        &self,
        pipeline: Pipeline,
        year: u16,
        refresh: bool,
    ) -> Result<Arc<ModelBundle>, CategoryError> {
        let model_file = pipeline.model_file(year);
        let loader = self.model_loader().ok_or_else(|| {
            CategoryError::unavailable(
                model_file.as_str(),
                anyhow::anyhow!("No model loader installed"),
            )
        })?;

        self.models
            .get_or_try_load((pipeline, year), refresh, || {
                self.load_bundle(pipeline, year, refresh, loader)
            })
            .await
            .map_err(|(artifact, e)| {
                log::warn!("{} model for {} unavailable: {:#}", pipeline, year, e);
                CategoryError::unavailable(artifact, e)
            })
    }

    async fn load_bundle(
        &self,
        pipeline: Pipeline,
        year: u16,
        refresh: bool,
        loader: Arc<dyn ModelLoader>,
    ) -> Result<ModelBundle, (String, anyhow::Error)> {
        let vocab_file = pipeline.vocab_file(year);
        let vocabulary = async {
            let bytes = self
                .store
                .fetch(ArtifactKind::Model, &vocab_file, refresh)
                .await?;
            Vocabulary::read_csv(bytes.as_slice())
        }
        .await
        .map_err(|e| (vocab_file.clone(), e))?;

        let categories = match pipeline.names_file(year) {
            Some(names_file) => Some(
                async {
                    let bytes = self
                        .store
                        .fetch(ArtifactKind::Model, &names_file, refresh)
                        .await?;
                    read_category_names(bytes.as_slice(), pipeline.names_column())
                }
                .await
                .map_err(|e| (names_file.clone(), e))?,
            ),
            None => None,
        };

        let model_file = pipeline.model_file(year);
        let model = async {
            let path: PathBuf = self
                .store
                .fetch_path(ArtifactKind::Model, &model_file, refresh)
                .await?;
            tokio::task::spawn_blocking(move || loader.load(&path))
                .await
                .context("Model loading task failed")?
        }
        .await
        .map_err(|e| (model_file.clone(), e))?;

        log::info!(
            "Loaded {} model for {} ({} n-grams)",
            pipeline,
            year,
            vocabulary.len() - 1
        );
        Ok(ModelBundle {
            model,
            vocabulary,
            categories,
        })
    }

    /// Two-tier lookup of `column` against `(dataset, year)`.
    ///
    /// Appends `{dataset}_{year}_domain` and `{dataset}_{year}_cat`. The column
    /// is checked before anything is fetched. On `DataUnavailable` the caller's
    /// frame is untouched and can be used as is.
    pub async fn lookup(
        &self,
        frame: &Frame,
        column: &str,
        dataset: Dataset,
        year: u16,
        refresh: bool,
    ) -> Result<Frame, CategoryError> {
        if !frame.has_column(column) {
            return Err(CategoryError::MissingColumn(column.to_string()));
        }
        let table = self.reference_table(dataset, year, refresh).await?;
        resolve(frame, column, &table)
    }

    /// Scores `column` with `(pipeline, year)`.
    ///
    /// Returns either a frame carrying every derived column or an error; a
    /// model that cannot be loaded yields `DataUnavailable`.
    pub async fn predict(
        &self,
        frame: &Frame,
        column: &str,
        pipeline: Pipeline,
        year: u16,
        refresh: bool,
    ) -> Result<Frame, CategoryError> {
        if !frame.has_column(column) {
            return Err(CategoryError::MissingColumn(column.to_string()));
        }
        let bundle = self.model_bundle(pipeline, year, refresh).await?;
        predict_frame(frame, column, pipeline, year, &bundle)
    }

    /// Open-directory category, default year.
    pub async fn dmoz_cat(&self, frame: &Frame, column: &str) -> Result<Frame, CategoryError> {
        let dataset = Dataset::Dmoz;
        self.lookup(frame, column, dataset, dataset.default_year(), false)
            .await
    }

    /// Aggregated blacklist categories, default year.
    pub async fn shalla_cat(&self, frame: &Frame, column: &str) -> Result<Frame, CategoryError> {
        let dataset = Dataset::Shalla;
        self.lookup(frame, column, dataset, dataset.default_year(), false)
            .await
    }

    /// Verified phishing flag, default year.
    pub async fn phish_cat(&self, frame: &Frame, column: &str) -> Result<Frame, CategoryError> {
        let dataset = Dataset::Phish;
        self.lookup(frame, column, dataset, dataset.default_year(), false)
            .await
    }

    /// Phishing prediction, default year.
    pub async fn pred_phish(&self, frame: &Frame, column: &str) -> Result<Frame, CategoryError> {
        self.predict_default(frame, column, Pipeline::Phish).await
    }

    /// Malware prediction, default year.
    pub async fn pred_malware(&self, frame: &Frame, column: &str) -> Result<Frame, CategoryError> {
        self.predict_default(frame, column, Pipeline::Malware).await
    }

    /// Toulouse content category prediction, default year.
    pub async fn pred_toulouse(&self, frame: &Frame, column: &str) -> Result<Frame, CategoryError> {
        self.predict_default(frame, column, Pipeline::Toulouse).await
    }

    /// Aggregated blacklist category prediction, default year.
    pub async fn pred_shalla(&self, frame: &Frame, column: &str) -> Result<Frame, CategoryError> {
        self.predict_default(frame, column, Pipeline::Shalla).await
    }

    async fn predict_default(
        &self,
        frame: &Frame,
        column: &str,
        pipeline: Pipeline,
    ) -> Result<Frame, CategoryError> {
        self.predict(frame, column, pipeline, pipeline.default_year(), false)
            .await
    }

    #[cfg(test)]
    pub(crate) fn is_table_cached(&self, dataset: Dataset, year: u16) -> bool {
        self.tables.is_loaded(&(dataset, year))
    }
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}

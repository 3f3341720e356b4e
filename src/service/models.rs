use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, instrument};

use super::error::ServiceError;
use crate::config::Config;
use crate::embedding::{SentenceEmbedder, SentenceEmbedderConfig, TextEmbedder};
use crate::generation::{GeneratorConfig, Seq2SeqGenerator, TextGenerator};

/// Model directories; `None` selects the stub backend.
#[derive(Debug, Clone, Default)]
pub struct ModelPaths {
    pub embedder: Option<PathBuf>,
    pub generator: Option<PathBuf>,
}

impl From<&Config> for ModelPaths {
    fn from(config: &Config) -> Self {
        Self {
            embedder: config.embedder_path.clone(),
            generator: config.generator_path.clone(),
        }
    }
}

#[derive(Clone)]
pub struct LoadedModels {
    pub embedder: Arc<dyn TextEmbedder>,
    pub generator: Arc<dyn TextGenerator>,
}

impl std::fmt::Debug for LoadedModels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModels")
            .field("embedder_stub", &self.embedder.is_stub())
            .field("generator_stub", &self.generator.is_stub())
            .finish()
    }
}

/// Process-wide model pair, loaded on first use and shared read-only afterwards.
#[derive(Debug)]
pub struct ModelHub {
    paths: ModelPaths,
    models: OnceCell<LoadedModels>,
}

impl ModelHub {
    pub fn new(paths: ModelPaths) -> Self {
        Self {
            paths,
            models: OnceCell::new(),
        }
    }

    /// A hub whose models are already in place.
    pub fn preloaded(embedder: Arc<dyn TextEmbedder>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            paths: ModelPaths::default(),
            models: OnceCell::new_with(Some(LoadedModels {
                embedder,
                generator,
            })),
        }
    }

    /// A hub backed by both stub models.
    pub fn stub() -> Self {
        Self::preloaded(
            Arc::new(SentenceEmbedder::stub()),
            Arc::new(Seq2SeqGenerator::stub()),
        )
    }

    pub fn paths(&self) -> &ModelPaths {
        &self.paths
    }

    pub fn is_loaded(&self) -> bool {
        self.models.initialized()
    }

    /// Loaded models, if initialization already happened.
    pub fn loaded(&self) -> Option<&LoadedModels> {
        self.models.get()
    }

    /// Returns the models, loading them on a blocking thread the first time.
    ///
    /// A failed load is not remembered; the next call tries again.
    pub async fn models(&self) -> Result<&LoadedModels, ServiceError> {
        self.models
            .get_or_try_init(|| {
                let paths = self.paths.clone();
                async move { tokio::task::spawn_blocking(move || load_models(&paths)).await? }
            })
            .await
    }
}

#[instrument(skip_all)]
fn load_models(paths: &ModelPaths) -> Result<LoadedModels, ServiceError> {
    let embedder_config = match &paths.embedder {
        Some(dir) => SentenceEmbedderConfig::new(dir),
        None => SentenceEmbedderConfig::stub(),
    };
    let generator_config = match &paths.generator {
        Some(dir) => GeneratorConfig::new(dir),
        None => GeneratorConfig::stub(),
    };

    let embedder = SentenceEmbedder::load(embedder_config)?;
    let generator = Seq2SeqGenerator::load(generator_config)?;

    info!(
        embedder_stub = embedder.is_stub(),
        generator_stub = generator.is_stub(),
        "Models ready"
    );

    Ok(LoadedModels {
        embedder: Arc::new(embedder),
        generator: Arc::new(generator),
    })
}

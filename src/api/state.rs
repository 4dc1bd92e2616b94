use std::sync::Arc;

use crate::config::Config;
use crate::convert::ConverterRegistry;
use crate::observability::Metrics;
use crate::tools::ToolCatalog;

/// Shared, read-only request context. Only the metric counters change.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<ToolCatalog>,
    pub converters: Arc<ConverterRegistry>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// State with the built-in catalog and converters.
    pub fn new(config: Config) -> Self {
        let converters =
            ConverterRegistry::with_defaults(&config.external, &config.uploads.scratch_dir());
        Self::with_parts(config, ToolCatalog::builtin(), converters)
    }

    pub fn with_parts(config: Config, catalog: ToolCatalog, converters: ConverterRegistry) -> Self {
        Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            converters: Arc::new(converters),
            metrics: Arc::new(Metrics::new()),
        }
    }
}

use std::sync::Arc;

use tracing::info;

use nodeflow_core::config::AppConfig;
use nodeflow_core::error::{EngineError, Result};
use nodeflow_core::traits::ResultAdapter;
use nodeflow_core::types::ValueMap;

use crate::adapter::{self, AdapterChain};
use crate::catalog::ModuleCatalog;
use crate::driver::Driver;
use crate::node::Module;
use crate::registry::NodeRegistry;

enum ModuleSource {
    Direct(Module),
    Named(String),
}

enum AdapterSource {
    Direct(Arc<dyn ResultAdapter>),
    Named(String),
}

/// Fluent constructor for [`Driver`].
///
/// Modules and adapters keep the order they were added in, whether given
/// directly or by name. Named entries are resolved in [`build`](Self::build).
#[derive(Default)]
pub struct Builder {
    modules: Vec<ModuleSource>,
    catalog: ModuleCatalog,
    config: ValueMap,
    adapters: Vec<AdapterSource>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, module: Module) -> Self {
        self.modules.push(ModuleSource::Direct(module));
        self
    }

    pub fn with_modules(mut self, modules: impl IntoIterator<Item = Module>) -> Self {
        self.modules
            .extend(modules.into_iter().map(ModuleSource::Direct));
        self
    }

    /// Add modules by catalog identifier.
    pub fn with_module_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modules
            .extend(names.into_iter().map(|n| ModuleSource::Named(n.into())));
        self
    }

    /// Catalog used to resolve module identifiers. Repeated calls merge.
    pub fn with_catalog(mut self, catalog: ModuleCatalog) -> Self {
        self.catalog.extend(catalog);
        self
    }

    /// Merge default values; later calls win on key collision.
    pub fn with_config(mut self, config: ValueMap) -> Self {
        self.config.extend(config);
        self
    }

    pub fn with_adapter(mut self, adapter: impl ResultAdapter) -> Self {
        self.adapters.push(AdapterSource::Direct(Arc::new(adapter)));
        self
    }

    pub fn with_adapters(mut self, adapters: impl IntoIterator<Item = Arc<dyn ResultAdapter>>) -> Self {
        self.adapters
            .extend(adapters.into_iter().map(AdapterSource::Direct));
        self
    }

    /// Add adapters by name (`dict`, `keys`, `select:<keys>`).
    pub fn with_adapter_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.adapters
            .extend(names.into_iter().map(|n| AdapterSource::Named(n.into())));
        self
    }

    /// Apply the `[engine]` and `[defaults]` sections of a loaded config.
    pub fn with_app_config(self, config: &AppConfig) -> Self {
        self.with_module_names(config.engine.modules.iter().cloned())
            .with_adapter_names(config.engine.adapters.iter().cloned())
            .with_config(config.defaults.clone())
    }

    /// Freeze the accumulated state into a driver.
    ///
    /// Fails with [`EngineError::Configuration`] when no module was added or
    /// a module or adapter name is unknown, and with
    /// [`EngineError::UnsupportedParameter`] when a computation is variadic.
    pub fn build(self) -> Result<Driver> {
        if self.modules.is_empty() {
            return Err(EngineError::Configuration(
                "at least one module is required to build a driver".to_string(),
            ));
        }

        let mut modules = Vec::with_capacity(self.modules.len());
        for source in self.modules {
            match source {
                ModuleSource::Direct(module) => modules.push(module),
                ModuleSource::Named(name) => modules.push(self.catalog.resolve(&name)?),
            }
        }

        let mut adapters = Vec::with_capacity(self.adapters.len());
        for source in self.adapters {
            match source {
                AdapterSource::Direct(adapter) => adapters.push(adapter),
                AdapterSource::Named(name) => adapters.push(adapter::by_name(&name)?),
            }
        }

        let registry = NodeRegistry::from_modules(&modules)?;
        let module_names: Vec<String> = modules.iter().map(|m| m.name().to_string()).collect();
        let adapters = AdapterChain::new(adapters);

        info!(
            modules = ?module_names,
            nodes = registry.len(),
            adapters = ?adapters.names(),
            defaults = self.config.len(),
            "Driver built"
        );

        Ok(Driver::new(registry, self.config, adapters, module_names))
    }
}

//! Model classes and their datasets.
//!
//! A [`Model`] maps to a table through its dataset, a [`QueryDefinition`].
//! Datasets always enter a model through [`Model::set_dataset`], which runs
//! the attached plugins' conversion hooks first.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use lifeguard_column_select::{Model, StaticSchema};
//!
//! let schema = Arc::new(StaticSchema::new().with_table("albums", ["id", "name"]));
//! let mut album = Model::with_table("Album", "albums", schema)?;
//! assert_eq!(album.select_sql().as_deref(), Some(r#"SELECT * FROM "albums""#));
//!
//! album.plugin_named("column_select")?;
//! assert_eq!(
//!     album.select_sql().as_deref(),
//!     Some(r#"SELECT "albums"."id", "albums"."name" FROM "albums""#)
//! );
//! # Ok::<(), lifeguard_column_select::LifeError>(())
//! ```

use crate::executor::LifeError;
use crate::plugins;
use crate::query::{QueryDefinition, TableRef};
use crate::schema::SharedIntrospector;
use std::fmt;
use std::sync::Arc;

pub mod plugin;
#[doc(inline)]
pub use plugin::ModelPlugin;

/// A data-model class: a name, an optional dataset, and its plugins.
pub struct Model {
    name: String,
    dataset: Option<QueryDefinition>,
    plugins: Vec<Arc<dyn ModelPlugin>>,
    introspector: SharedIntrospector,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("dataset", &self.dataset)
            .field("plugins", &self.plugins().collect::<Vec<_>>())
            .finish()
    }
}

impl Model {
    /// A model without a dataset.
    pub fn new(name: impl Into<String>, introspector: SharedIntrospector) -> Self {
        Self {
            name: name.into(),
            dataset: None,
            plugins: Vec::new(),
            introspector,
        }
    }

    /// A model selecting from `table`.
    pub fn with_table(
        name: impl Into<String>,
        table: impl Into<TableRef>,
        introspector: SharedIntrospector,
    ) -> Result<Self, LifeError> {
        let mut model = Self::new(name, introspector);
        model.set_table(table)?;
        Ok(model)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dataset(&self) -> Option<&QueryDefinition> {
        self.dataset.as_ref()
    }

    pub fn introspector(&self) -> &SharedIntrospector {
        &self.introspector
    }

    /// Convert `dataset` through the plugin chain and make it the model's dataset.
    ///
    /// # Errors
    ///
    /// Any error raised by a plugin hook. The previous dataset is kept.
    pub fn set_dataset(&mut self, dataset: QueryDefinition) -> Result<&mut Self, LifeError> {
        let dataset = self.convert_input_dataset(dataset)?;
        self.dataset = Some(dataset);
        Ok(self)
    }

    /// Shorthand for `set_dataset(QueryDefinition::from_table(table))`.
    pub fn set_table(&mut self, table: impl Into<TableRef>) -> Result<&mut Self, LifeError> {
        self.set_dataset(QueryDefinition::from_table(table))
    }

    /// Run `dataset` through every plugin's conversion hook without storing it.
    pub fn convert_input_dataset(&self, dataset: QueryDefinition) -> Result<QueryDefinition, LifeError> {
        let introspector = self.introspector.as_ref();
        self.plugins
            .iter()
            .try_fold(dataset, |ds, plugin| plugin.convert_input_dataset(ds, introspector))
    }

    /// Attach a plugin, then run its `configure` hook.
    ///
    /// A plugin already attached under the same name is not added twice, but is
    /// configured again.
    pub fn plugin<P: ModelPlugin + 'static>(&mut self, plugin: P) -> Result<&mut Self, LifeError> {
        self.attach(Arc::new(plugin))
    }

    /// Attach a built-in plugin by name, e.g. `"column_select"`.
    ///
    /// # Errors
    ///
    /// [`LifeError::UnknownPlugin`] if no built-in plugin has that name.
    pub fn plugin_named(&mut self, name: &str) -> Result<&mut Self, LifeError> {
        let plugin = plugins::lookup(name).ok_or_else(|| LifeError::UnknownPlugin(name.to_string()))?;
        self.attach(plugin)
    }

    fn attach(&mut self, plugin: Arc<dyn ModelPlugin>) -> Result<&mut Self, LifeError> {
        let existing = self.plugins.iter().find(|p| p.name() == plugin.name()).cloned();
        let plugin = match existing {
            Some(existing) => existing,
            None => {
                log::debug!("attaching plugin {} to {}", plugin.name(), self.name);
                self.plugins.push(Arc::clone(&plugin));
                plugin
            }
        };
        plugin.configure(self)?;
        Ok(self)
    }

    /// Names of attached plugins, in attachment order.
    pub fn plugins(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.plugins.iter().map(|p| p.name())
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name() == name)
    }

    /// Derive a subclass that inherits the plugins and introspector.
    ///
    /// With a `table`, the subclass builds a fresh dataset for it, so the
    /// plugins evaluate that table on their own. Without one, it inherits this
    /// model's dataset, which is converted again (a no-op for already
    /// converted datasets).
    pub fn subclass(
        &self,
        name: impl Into<String>,
        table: Option<TableRef>,
    ) -> Result<Model, LifeError> {
        let mut child = Model {
            name: name.into(),
            dataset: None,
            plugins: self.plugins.clone(),
            introspector: Arc::clone(&self.introspector),
        };
        let dataset = match table {
            Some(table) => Some(QueryDefinition::from_table(table)),
            None => self.dataset.clone(),
        };
        if let Some(dataset) = dataset {
            child.set_dataset(dataset)?;
        }
        Ok(child)
    }

    /// Columns of the model's dataset.
    ///
    /// # Errors
    ///
    /// [`LifeError::Other`] when the model has no dataset, or the introspector's error.
    pub fn columns(&self) -> Result<Vec<String>, LifeError> {
        let dataset = self
            .dataset
            .as_ref()
            .ok_or_else(|| LifeError::Other(format!("model {} has no dataset", self.name)))?;
        dataset.columns(self.introspector.as_ref())
    }

    /// SQL of the model's dataset, if it has one.
    pub fn select_sql(&self) -> Option<String> {
        self.dataset.as_ref().map(QueryDefinition::to_sql)
    }
}

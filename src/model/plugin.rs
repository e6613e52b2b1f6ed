//! The plugin hook chain.

use crate::executor::LifeError;
use crate::model::Model;
use crate::query::QueryDefinition;
use crate::schema::ColumnIntrospector;

/// An optional behavior attached to a [`Model`].
///
/// Both hooks default to doing nothing. When a dataset is set on a model,
/// every attached plugin's [`convert_input_dataset`](Self::convert_input_dataset)
/// runs in attachment order, each receiving the previous plugin's output.
pub trait ModelPlugin: Send + Sync {
    /// Name the plugin is registered and deduplicated under.
    fn name(&self) -> &'static str;

    /// Runs each time the plugin is attached, after it joins the chain.
    fn configure(&self, model: &mut Model) -> Result<(), LifeError> {
        let _ = model;
        Ok(())
    }

    /// Transforms a dataset on its way into a model.
    fn convert_input_dataset(
        &self,
        dataset: QueryDefinition,
        introspector: &dyn ColumnIntrospector,
    ) -> Result<QueryDefinition, LifeError> {
        let _ = introspector;
        Ok(dataset)
    }
}

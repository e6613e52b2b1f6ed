//! Built-in model plugins, looked up by name.

use crate::model::ModelPlugin;
use std::sync::Arc;

pub mod column_select;
#[doc(inline)]
pub use column_select::ColumnSelect;

/// The built-in plugin registered as `name`, if any.
pub fn lookup(name: &str) -> Option<Arc<dyn ModelPlugin>> {
    match name {
        column_select::NAME => Some(Arc::new(ColumnSelect)),
        _ => None,
    }
}

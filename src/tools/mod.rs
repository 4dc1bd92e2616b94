//! Tool registry: the static table of conversion tools and their form metadata.

mod catalog;

pub use catalog::{NotFound, ToolCatalog, ToolDescriptor};

//! Ports: traits at the boundary between the discovery core and the outside
//! world.

pub mod catalog;

pub use catalog::{CatalogFilter, CatalogSource, Cursor, Page, PageQuery};

//! Restaurant menu browsing: catalog loading, filtering, and rendering.

pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod i18n;
pub mod input;
pub mod menu;
pub mod orders;
pub mod preferences;
pub mod render;
pub mod specials;
pub mod voice;

pub use catalog::{load, CatalogSource};
pub use error::{FeatureUnavailable, LoadError, OrderError};
pub use filter::{filter, FilterAction, FilterOutcome, FilterState, Pipeline};
pub use menu::{Catalog, Category, MenuItem};
pub use render::{render, MenuView};

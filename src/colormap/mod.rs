//! Label colormaps.
//!
//! This module provides:
//! - `LabelFileParser`: label description file → [`LabelTable`]
//! - `apply` / `select`: push a table onto the label layers of a viewer
//! - `LastColormapCache`: single-slot copy of the last loaded file
//! - `ColormapLoader`: the three above wired together with the current table
//!
//! # Example
//!
//! ```ignore
//! use medical_toolbox::colormap::{ColormapLoader, LoaderConfig};
//!
//! let mut loader = ColormapLoader::new(LoaderConfig::new().cache_path(cache));
//! loader.restore_last(&mut viewer)?;
//! loader.load(Path::new("labels.txt"), &mut viewer)?;
//! loader.select("7", &mut viewer)?;
//! ```

mod cache;
mod error;
mod loader;
mod parser;
mod table;

pub use cache::LastColormapCache;
pub use error::ColormapError;
pub use loader::{ColormapLoader, LoaderConfig, apply, select};
pub use parser::{LabelFileParser, LabelRecord, parse_record};
pub use table::{BACKGROUND_COLOR, Choice, ChoiceList, Colormap, LabelTable, Rgba};

//! Medical Toolbox - image processing widgets for a layered image viewer.
//!
//! The crate does not draw anything itself. It works against the [`Viewer`]
//! trait, which a host application implements over its own layer list;
//! [`LayerStack`] is the in-memory implementation used for scripting and tests.
//!
//! Widgets:
//! - [`ColormapLoader`]: apply label colormap files to every labels layer
//! - [`ImageThreshold`]: threshold an image layer into a labels layer
//! - [`MultiChannelProcessor`]: concatenate, split or average channels

pub mod colormap;
pub mod config;
pub mod constants;
pub mod data;
pub mod multichannel;
pub mod threshold;
pub mod viewer;

pub use colormap::{ColormapError, ColormapLoader, LabelTable, LoaderConfig};
pub use config::{ConfigError, LogLevel, ToolboxConfig};
pub use data::ImageData;
pub use multichannel::{ChannelOperation, MultiChannelProcessor, ProcessError};
pub use threshold::{ImageThreshold, ThresholdDirection, ThresholdError};
pub use viewer::{ImageLayer, LabelLayer, LayerStack, Viewer};

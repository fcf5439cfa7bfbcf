//! Multi-channel image processing.
//!
//! Operates on channel-first image layers, typically 4D NIfTI volumes loaded
//! as `(channels, z, y, x)`:
//!
//! - **Concatenate**: stack all channels along z into one 3D volume, with the
//!   spatial metadata reduced from 4D to 3D
//! - **Split**: one image layer per channel
//! - **Average**: the per-voxel channel mean

use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, ArrayD, Axis};
use serde_json::Value;
use thiserror::Error;

use crate::data::{ImageData, with_array};
use crate::viewer::{ImageLayer, Metadata, Viewer};

/// Indices of the spatial 3x3 block within a row-major 4x4 direction matrix.
const DIRECTION_3X3: [usize; 9] = [0, 1, 2, 4, 5, 6, 8, 9, 10];

/// Errors from multi-channel processing.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The selected image layer does not exist
    #[error("Image layer not found: {name}")]
    LayerNotFound {
        /// Name of the missing layer
        name: String,
    },

    /// The image does not have the dimensionality the operation needs
    #[error("Layer '{name}' has shape {shape:?}, expected {expected}")]
    UnsupportedShape {
        /// Layer name
        name: String,
        /// Actual shape
        shape: Vec<usize>,
        /// Description of the expected layout
        expected: &'static str,
    },

    /// A required metadata entry is absent
    #[error("Missing metadata entry '{key}'")]
    MissingMetadata {
        /// Metadata key
        key: &'static str,
    },

    /// A metadata entry has the wrong type or length
    #[error("Invalid metadata entry '{key}': {reason}")]
    InvalidMetadata {
        /// Metadata key
        key: &'static str,
        /// Description of the problem
        reason: String,
    },

    /// Unknown operation name
    #[error("Unknown operation '{0}' (expected concatenate, split or average)")]
    UnknownOperation(String),

    /// Array shape error from ndarray
    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Operation applied to a multi-channel image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOperation {
    /// Join channels along the first spatial axis
    #[default]
    Concatenate,
    /// One layer per channel
    Split,
    /// Channel mean
    Average,
}

impl ChannelOperation {
    /// Name shown in the operation picker.
    pub fn name(&self) -> &'static str {
        match self {
            ChannelOperation::Concatenate => "concatenate",
            ChannelOperation::Split => "split",
            ChannelOperation::Average => "average",
        }
    }

    /// All operations in picker order.
    pub fn all() -> &'static [ChannelOperation] {
        &[
            ChannelOperation::Concatenate,
            ChannelOperation::Split,
            ChannelOperation::Average,
        ]
    }
}

impl fmt::Display for ChannelOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChannelOperation {
    type Err = ProcessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|op| op.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ProcessError::UnknownOperation(s.to_string()))
    }
}

/// Run `operation` on the image layer `name` and add the results to the
/// viewer. Returns the names the layers were added under.
pub fn process(
    viewer: &mut dyn Viewer,
    name: &str,
    operation: ChannelOperation,
) -> Result<Vec<String>, ProcessError> {
    let image = viewer
        .image_layer(name)
        .ok_or_else(|| ProcessError::LayerNotFound {
            name: name.to_string(),
        })?;

    let outputs = match operation {
        ChannelOperation::Concatenate => vec![concatenate(image)?],
        ChannelOperation::Split => split(image)?,
        ChannelOperation::Average => vec![average(image)?],
    };

    let names: Vec<String> = outputs
        .into_iter()
        .map(|layer| viewer.add_image(layer))
        .collect();
    log::info!("{} '{}' -> {:?}", operation, name, names);
    Ok(names)
}

/// Concatenate a `(channels, z, y, x)` image into `(channels * z, y, x)`.
///
/// The metadata must carry `spacing`, `origin` (3+ values each) and a 4x4
/// `direction`. The result has unit scale, the spacing moved into the
/// affine diagonal (reversed to z, y, x order), and 3D metadata.
pub fn concatenate(image: &ImageLayer) -> Result<ImageLayer, ProcessError> {
    require_shape(image, |ndim| ndim == 4, "(channels, z, y, x)")?;

    let spacing = numbers(&image.metadata, "spacing", 3)?;
    let origin = numbers(&image.metadata, "origin", 3)?;
    let direction = numbers(&image.metadata, "direction", DIRECTION_3X3[8] + 1)?;

    let data = with_array!(&image.data, arr => concatenate_channels(arr).map(ImageData::from))?;

    let mut affine = Array2::eye(4);
    affine[[0, 0]] = spacing[2];
    affine[[1, 1]] = spacing[1];
    affine[[2, 2]] = spacing[0];

    let mut metadata = image.metadata.clone();
    metadata.insert("dim[4]".to_string(), Value::from("1"));
    metadata.insert("pixdim[4]".to_string(), Value::from("1"));
    metadata.insert("origin".to_string(), Value::from(origin[..3].to_vec()));
    metadata.insert("spacing".to_string(), Value::from(spacing[..3].to_vec()));
    metadata.insert(
        "direction".to_string(),
        Value::from(DIRECTION_3X3.iter().map(|&i| direction[i]).collect::<Vec<_>>()),
    );

    Ok(
        ImageLayer::new(format!("{}_concatenated", image.name), data)
            .with_scale(vec![1.0; 3])
            .with_affine(affine)
            .with_metadata(metadata),
    )
}

/// Split a channel-first image into one layer per channel.
pub fn split(image: &ImageLayer) -> Result<Vec<ImageLayer>, ProcessError> {
    require_shape(image, |ndim| ndim >= 2, "(channels, ...)")?;

    let channels: Vec<ImageData> = with_array!(&image.data, arr => arr
        .outer_iter()
        .map(|channel| ImageData::from(channel.to_owned()))
        .collect());

    let scale = spatial_scale(image);
    Ok(channels
        .into_iter()
        .enumerate()
        .map(|(idx, data)| {
            let mut layer = ImageLayer::new(format!("{}_channel{}", image.name, idx), data)
                .with_scale(scale.clone())
                .with_metadata(image.metadata.clone());
            layer.affine = image.affine.clone();
            layer
        })
        .collect())
}

/// Average the channels of a channel-first image into an `f32` layer.
pub fn average(image: &ImageLayer) -> Result<ImageLayer, ProcessError> {
    require_shape(image, |ndim| ndim >= 2, "(channels, ...)")?;

    let mean = image
        .data
        .to_f32()
        .mean_axis(Axis(0))
        .ok_or_else(|| ProcessError::UnsupportedShape {
            name: image.name.clone(),
            shape: image.data.shape().to_vec(),
            expected: "at least one channel",
        })?;

    let mut layer = ImageLayer::new(format!("{}_average", image.name), mean)
        .with_scale(spatial_scale(image))
        .with_metadata(image.metadata.clone());
    layer.affine = image.affine.clone();
    Ok(layer)
}

fn concatenate_channels<T: Clone>(array: &ArrayD<T>) -> Result<ArrayD<T>, ndarray::ShapeError> {
    let channels: Vec<_> = array.outer_iter().collect();
    ndarray::concatenate(Axis(0), &channels)
}

fn require_shape(
    image: &ImageLayer,
    accept: impl Fn(usize) -> bool,
    expected: &'static str,
) -> Result<(), ProcessError> {
    if accept(image.data.ndim()) {
        Ok(())
    } else {
        Err(ProcessError::UnsupportedShape {
            name: image.name.clone(),
            shape: image.data.shape().to_vec(),
            expected,
        })
    }
}

/// Scale of the axes left after dropping the channel axis.
fn spatial_scale(image: &ImageLayer) -> Vec<f64> {
    if image.scale.len() == image.data.ndim() {
        image.scale[1..].to_vec()
    } else {
        Vec::new()
    }
}

fn numbers(metadata: &Metadata, key: &'static str, min_len: usize) -> Result<Vec<f64>, ProcessError> {
    let invalid = |reason: String| ProcessError::InvalidMetadata { key, reason };

    let values = metadata
        .get(key)
        .ok_or(ProcessError::MissingMetadata { key })?
        .as_array()
        .ok_or_else(|| invalid("expected an array of numbers".to_string()))?;

    let numbers = values
        .iter()
        .map(Value::as_f64)
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| invalid("expected an array of numbers".to_string()))?;

    if numbers.len() < min_len {
        return Err(invalid(format!(
            "expected at least {} values, found {}",
            min_len,
            numbers.len()
        )));
    }
    Ok(numbers)
}

/// Multi-channel widget: an image layer picker, an operation picker and a
/// "Process" button.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiChannelProcessor {
    /// Selected image layer
    pub image_layer: Option<String>,
    /// Selected operation
    pub operation: ChannelOperation,
}

impl MultiChannelProcessor {
    /// Create a processor with no layer selected and `Concatenate` picked.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the selected operation. Does nothing without a selected layer.
    pub fn process(&self, viewer: &mut dyn Viewer) -> Result<Vec<String>, ProcessError> {
        match &self.image_layer {
            Some(name) => process(viewer, name, self.operation),
            None => Ok(Vec::new()),
        }
    }
}

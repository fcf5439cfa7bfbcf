//! Image thresholding into label layers.
//!
//! Images are converted to floating point first (unsigned integers to 0.0-1.0,
//! signed integers to -1.0-1.0, floats unchanged), so a threshold of 0.5 means
//! "brighter than half of the type range" for integer images.

use ndarray::ArrayD;
use thiserror::Error;

use crate::constants::{DEFAULT_THRESHOLD, THRESHOLD_SUFFIX};
use crate::data::ImageData;
use crate::viewer::{LabelsData, Viewer};

/// Errors from the threshold widgets.
#[derive(Error, Debug)]
pub enum ThresholdError {
    /// The selected image layer does not exist
    #[error("Image layer not found: {name}")]
    LayerNotFound {
        /// Name of the missing layer
        name: String,
    },
}

/// Which side of the threshold is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdDirection {
    /// Keep pixels strictly above the threshold
    #[default]
    Above,
    /// Keep pixels strictly below the threshold
    Below,
}

/// Boolean mask of the pixels strictly above `threshold`.
pub fn threshold(image: &ImageData, threshold: f32) -> ArrayD<bool> {
    image.to_float().mapv(|v| v > threshold)
}

/// Label mask (1 = kept, 0 = background) for either side of the threshold.
pub fn threshold_labels(
    image: &ImageData,
    threshold: f32,
    direction: ThresholdDirection,
) -> LabelsData {
    image.to_float().mapv(|v| {
        let keep = match direction {
            ThresholdDirection::Above => v > threshold,
            ThresholdDirection::Below => v < threshold,
        };
        u32::from(keep)
    })
}

/// Name of the label layer that receives the threshold of `image_layer`.
pub fn output_layer_name(image_layer: &str) -> String {
    format!("{}{}", image_layer, THRESHOLD_SUFFIX)
}

/// Threshold the image layer `name` into its output label layer.
///
/// Returns the name of the label layer that was written.
pub fn threshold_layer(
    viewer: &mut dyn Viewer,
    name: &str,
    value: f32,
    direction: ThresholdDirection,
) -> Result<String, ThresholdError> {
    threshold_into(viewer, name, &output_layer_name(name), value, direction)
}

fn threshold_into(
    viewer: &mut dyn Viewer,
    name: &str,
    output: &str,
    value: f32,
    direction: ThresholdDirection,
) -> Result<String, ThresholdError> {
    let image = viewer
        .image_layer(name)
        .ok_or_else(|| ThresholdError::LayerNotFound {
            name: name.to_string(),
        })?;
    let labels = threshold_labels(&image.data, value, direction);
    let kept = labels.iter().filter(|&&v| v != 0).count();

    log::debug!(
        "Threshold {:?} {} at {}: kept {} of {} pixels",
        name,
        match direction {
            ThresholdDirection::Above => "above",
            ThresholdDirection::Below => "below",
        },
        value,
        kept,
        labels.len()
    );
    Ok(viewer.set_labels(output, labels))
}

/// Interactive threshold widget: a layer picker, a 0-1 slider and a
/// "keep pixels below threshold" checkbox. Every change re-runs the
/// threshold and updates the output layer in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageThreshold {
    image_layer: Option<String>,
    output_layer: Option<String>,
    threshold: f32,
    keep_below: bool,
}

impl ImageThreshold {
    /// Create a widget with no layer selected.
    pub fn new() -> Self {
        Self {
            image_layer: None,
            output_layer: None,
            threshold: DEFAULT_THRESHOLD,
            keep_below: false,
        }
    }

    /// Start from the given slider position and checkbox state.
    pub fn with_settings(mut self, threshold: f32, keep_below: bool) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self.keep_below = keep_below;
        self
    }

    /// Currently selected image layer.
    pub fn image_layer(&self) -> Option<&str> {
        self.image_layer.as_deref()
    }

    /// Label layer written by the last run.
    pub fn output_layer(&self) -> Option<&str> {
        self.output_layer.as_deref()
    }

    /// Current threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Whether pixels below the threshold are kept.
    pub fn keep_below(&self) -> bool {
        self.keep_below
    }

    /// Current direction.
    pub fn direction(&self) -> ThresholdDirection {
        if self.keep_below {
            ThresholdDirection::Below
        } else {
            ThresholdDirection::Above
        }
    }

    /// Pick the image layer. Does not run the threshold.
    pub fn set_image_layer(&mut self, name: Option<String>) {
        if name != self.image_layer {
            self.output_layer = None;
        }
        self.image_layer = name;
    }

    /// Move the slider (clamped to 0-1) and re-run.
    pub fn set_threshold(
        &mut self,
        threshold: f32,
        viewer: &mut dyn Viewer,
    ) -> Result<Option<String>, ThresholdError> {
        self.threshold = threshold.clamp(0.0, 1.0);
        self.run(viewer)
    }

    /// Toggle the checkbox and re-run.
    pub fn set_keep_below(
        &mut self,
        keep_below: bool,
        viewer: &mut dyn Viewer,
    ) -> Result<Option<String>, ThresholdError> {
        self.keep_below = keep_below;
        self.run(viewer)
    }

    /// Threshold the selected layer. Does nothing without a selection.
    ///
    /// Later runs keep writing to the label layer the first run wrote.
    pub fn run(&mut self, viewer: &mut dyn Viewer) -> Result<Option<String>, ThresholdError> {
        let Some(name) = self.image_layer.clone() else {
            return Ok(None);
        };
        let target = self
            .output_layer
            .clone()
            .unwrap_or_else(|| output_layer_name(&name));

        let written = threshold_into(viewer, &name, &target, self.threshold, self.direction())?;
        self.output_layer = Some(written.clone());
        Ok(Some(written))
    }
}

impl Default for ImageThreshold {
    fn default() -> Self {
        Self::new()
    }
}

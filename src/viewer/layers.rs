//! Concrete layer payloads exchanged with the host viewer.

use ndarray::{Array2, ArrayD};

use super::{LabelsLayer, Layer};
use crate::colormap::Colormap;
use crate::data::ImageData;

/// Free-form layer metadata (spacing, origin, direction, header fields...).
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Integer label volume.
pub type LabelsData = ArrayD<u32>;

/// An image layer: pixel data plus display metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageLayer {
    /// Layer name
    pub name: String,
    /// Pixel data
    pub data: ImageData,
    /// Per-axis scale factors (empty means unit scale)
    pub scale: Vec<f64>,
    /// Homogeneous spatial transform (None means identity)
    pub affine: Option<Array2<f64>>,
    /// Free-form metadata
    pub metadata: Metadata,
}

impl ImageLayer {
    /// Create an image layer with unit scale, identity transform and no metadata.
    pub fn new(name: impl Into<String>, data: impl Into<ImageData>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            scale: Vec::new(),
            affine: None,
            metadata: Metadata::new(),
        }
    }

    /// Set the per-axis scale factors.
    pub fn with_scale(mut self, scale: Vec<f64>) -> Self {
        self.scale = scale;
        self
    }

    /// Set the spatial transform.
    pub fn with_affine(mut self, affine: Array2<f64>) -> Self {
        self.affine = Some(affine);
        self
    }

    /// Set the metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl Layer for ImageLayer {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A label layer: integer label data plus its color lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayer {
    /// Layer name
    pub name: String,
    /// Label data
    pub data: LabelsData,
    /// Color lookup, None until a colormap is applied
    pub colormap: Option<Colormap>,
    /// Currently highlighted label
    pub selected_label: u32,
}

impl LabelLayer {
    /// Create a label layer without a colormap. Label 1 starts selected.
    pub fn new(name: impl Into<String>, data: LabelsData) -> Self {
        Self {
            name: name.into(),
            data,
            colormap: None,
            selected_label: 1,
        }
    }
}

impl Layer for LabelLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_labels(&self) -> Option<&dyn LabelsLayer> {
        Some(self)
    }

    fn as_labels_mut(&mut self) -> Option<&mut dyn LabelsLayer> {
        Some(self)
    }
}

impl LabelsLayer for LabelLayer {
    fn colormap(&self) -> Option<&Colormap> {
        self.colormap.as_ref()
    }

    fn set_colormap(&mut self, colormap: &Colormap) {
        self.colormap = Some(colormap.clone());
    }

    fn selected_label(&self) -> u32 {
        self.selected_label
    }

    fn set_selected_label(&mut self, label: u32) {
        self.selected_label = label;
    }
}

//! Host viewer interface.
//!
//! The widgets in this crate never own the layers they operate on; they talk
//! to whatever viewer hosts them through the traits below. Label layers are
//! found through a capability query ([`Layer::as_labels_mut`]) rather than by
//! concrete type, so a host can expose any layer type that carries labels.
//!
//! [`LayerStack`] is a plain in-memory implementation.

mod layers;
mod stack;

pub use layers::{ImageLayer, LabelLayer, LabelsData, Metadata};
pub use stack::{LayerStack, StackLayer};

use crate::colormap::Colormap;

/// A layer in the host viewer.
pub trait Layer {
    /// Layer name, unique within the viewer.
    fn name(&self) -> &str;

    /// Label capability, if this layer displays integer labels.
    fn as_labels(&self) -> Option<&dyn LabelsLayer> {
        None
    }

    /// Mutable label capability.
    fn as_labels_mut(&mut self) -> Option<&mut dyn LabelsLayer> {
        None
    }
}

/// Properties of a layer that displays integer labels.
pub trait LabelsLayer {
    /// Active color lookup.
    fn colormap(&self) -> Option<&Colormap>;

    /// Replace the active color lookup.
    fn set_colormap(&mut self, colormap: &Colormap);

    /// Currently highlighted label.
    fn selected_label(&self) -> u32;

    /// Change the highlighted label.
    fn set_selected_label(&mut self, label: u32);
}

/// The layer container of a host viewer.
pub trait Viewer {
    /// All layers, bottom to top.
    fn layers(&self) -> Vec<&dyn Layer>;

    /// All layers, bottom to top, mutably.
    fn layers_mut(&mut self) -> Vec<&mut dyn Layer>;

    /// Look up an image layer by name.
    fn image_layer(&self, name: &str) -> Option<&ImageLayer>;

    /// Add an image layer on top. Returns the name it was added under,
    /// which differs from `layer.name` when that name is already taken.
    fn add_image(&mut self, layer: ImageLayer) -> String;

    /// Replace the data of the label layer `name`, adding the layer if it
    /// does not exist yet. Returns the name of the layer written.
    fn set_labels(&mut self, name: &str, data: LabelsData) -> String;

    /// Layers exposing the label capability.
    fn labels_layers_mut(&mut self) -> Vec<&mut dyn LabelsLayer> {
        self.layers_mut()
            .into_iter()
            .filter_map(|layer| layer.as_labels_mut())
            .collect()
    }

    /// Check whether a layer with the given name exists.
    fn contains(&self, name: &str) -> bool {
        self.layers().iter().any(|layer| layer.name() == name)
    }
}

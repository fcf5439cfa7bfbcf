//! In-memory layer container.

use super::{ImageLayer, LabelLayer, LabelsData, LabelsLayer, Layer, Viewer};

/// A layer held by a [`LayerStack`].
#[derive(Debug, Clone, PartialEq)]
pub enum StackLayer {
    /// Image layer
    Image(ImageLayer),
    /// Label layer
    Labels(LabelLayer),
}

impl Layer for StackLayer {
    fn name(&self) -> &str {
        match self {
            StackLayer::Image(layer) => layer.name(),
            StackLayer::Labels(layer) => layer.name(),
        }
    }

    fn as_labels(&self) -> Option<&dyn LabelsLayer> {
        match self {
            StackLayer::Image(layer) => layer.as_labels(),
            StackLayer::Labels(layer) => layer.as_labels(),
        }
    }

    fn as_labels_mut(&mut self) -> Option<&mut dyn LabelsLayer> {
        match self {
            StackLayer::Image(layer) => layer.as_labels_mut(),
            StackLayer::Labels(layer) => layer.as_labels_mut(),
        }
    }
}

/// Ordered list of layers, bottom to top.
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<StackLayer>,
}

impl LayerStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label layer on top. Returns the name it was added under.
    pub fn add_labels(&mut self, mut layer: LabelLayer) -> String {
        layer.name = self.unique_name(&layer.name);
        log::debug!("Adding label layer '{}'", layer.name);
        let name = layer.name.clone();
        self.layers.push(StackLayer::Labels(layer));
        name
    }

    /// `name`, or `name [n]` with the smallest free `n` if it is taken.
    pub fn unique_name(&self, name: &str) -> String {
        if self.get(name).is_none() {
            return name.to_string();
        }
        let mut n = 1;
        loop {
            let candidate = format!("{} [{}]", name, n);
            if self.get(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    /// Look up any layer by name.
    pub fn get(&self, name: &str) -> Option<&StackLayer> {
        self.layers.iter().find(|layer| layer.name() == name)
    }

    /// Look up a label layer by name.
    pub fn labels(&self, name: &str) -> Option<&LabelLayer> {
        self.layers.iter().find_map(|layer| match layer {
            StackLayer::Labels(labels) if labels.name == name => Some(labels),
            _ => None,
        })
    }

    /// Remove a layer by name, returning it.
    pub fn remove(&mut self, name: &str) -> Option<StackLayer> {
        let idx = self.layers.iter().position(|layer| layer.name() == name)?;
        Some(self.layers.remove(idx))
    }

    /// Layer names, bottom to top.
    pub fn names(&self) -> Vec<&str> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the stack holds no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Viewer for LayerStack {
    fn layers(&self) -> Vec<&dyn Layer> {
        self.layers.iter().map(|layer| layer as &dyn Layer).collect()
    }

    fn layers_mut(&mut self) -> Vec<&mut dyn Layer> {
        self.layers
            .iter_mut()
            .map(|layer| layer as &mut dyn Layer)
            .collect()
    }

    fn image_layer(&self, name: &str) -> Option<&ImageLayer> {
        self.layers.iter().find_map(|layer| match layer {
            StackLayer::Image(image) if image.name == name => Some(image),
            _ => None,
        })
    }

    fn add_image(&mut self, mut layer: ImageLayer) -> String {
        layer.name = self.unique_name(&layer.name);
        log::debug!(
            "Adding image layer '{}' with shape {:?}",
            layer.name,
            layer.data.shape()
        );
        let name = layer.name.clone();
        self.layers.push(StackLayer::Image(layer));
        name
    }

    fn set_labels(&mut self, name: &str, data: LabelsData) -> String {
        let existing = self.layers.iter_mut().find_map(|layer| match layer {
            StackLayer::Labels(labels) if labels.name == name => Some(labels),
            _ => None,
        });

        match existing {
            Some(labels) => {
                log::trace!("Updating label layer '{}'", name);
                labels.data = data;
                name.to_string()
            }
            None => self.add_labels(LabelLayer::new(name, data)),
        }
    }
}

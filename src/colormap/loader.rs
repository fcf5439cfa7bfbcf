//! Applying label tables to a viewer, and the stateful colormap loader.

use std::path::{Path, PathBuf};

use super::cache::LastColormapCache;
use super::error::ColormapError;
use super::parser::LabelFileParser;
use super::table::{ChoiceList, Colormap, LabelTable};
use crate::config::ColormapSettings;
use crate::constants::DEFAULT_LABEL_ALPHA;
use crate::viewer::Viewer;

/// Hand `colormap` to every label layer of the viewer.
///
/// Returns the number of layers updated. Layers without the label
/// capability are left untouched.
pub fn apply(colormap: &Colormap, viewer: &mut dyn Viewer) -> usize {
    let mut updated = 0;
    for layer in viewer.labels_layers_mut() {
        layer.set_colormap(colormap);
        updated += 1;
    }
    log::debug!("Applied colormap with {} labels to {} layers", colormap.len(), updated);
    updated
}

/// Highlight the label `value` in every label layer.
///
/// Fails without touching any layer when `value` is not in `choices`.
pub fn select(
    choices: &ChoiceList,
    value: &str,
    viewer: &mut dyn Viewer,
) -> Result<u32, ColormapError> {
    let invalid = || ColormapError::InvalidSelection {
        value: value.to_string(),
    };
    if !choices.contains(value) {
        return Err(invalid());
    }
    let label: u32 = value.parse().map_err(|_| invalid())?;

    for layer in viewer.labels_layers_mut() {
        layer.set_selected_label(label);
    }
    log::debug!("Selected label {}", label);
    Ok(label)
}

/// Construction parameters for [`ColormapLoader`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    /// Alpha assigned to every parsed label color
    pub alpha: f32,
    /// Where to keep a copy of the last loaded file (None disables the cache)
    pub cache_path: Option<PathBuf>,
}

impl LoaderConfig {
    /// Create a config with the default alpha and no cache.
    pub fn new() -> Self {
        Self {
            alpha: DEFAULT_LABEL_ALPHA,
            cache_path: None,
        }
    }

    /// Set the label alpha.
    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the cache slot path.
    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Loads label description files and keeps the current label table.
///
/// The table is replaced wholesale on every successful load; a failed load
/// leaves both the table and the viewer unchanged.
#[derive(Debug, Clone)]
pub struct ColormapLoader {
    parser: LabelFileParser,
    cache: Option<LastColormapCache>,
    table: LabelTable,
    source: Option<PathBuf>,
}

impl ColormapLoader {
    /// Create a loader holding only the background label.
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            parser: LabelFileParser::new(config.alpha),
            cache: config.cache_path.map(LastColormapCache::new),
            table: LabelTable::background_only(),
            source: None,
        }
    }

    /// Create a loader from config settings, reloading the last colormap
    /// into the viewer when `restore_last` is set.
    ///
    /// A cached file that fails to load is logged and the loader starts with
    /// only the background label.
    pub fn from_settings(settings: &ColormapSettings, viewer: &mut dyn Viewer) -> Self {
        let mut loader = Self::new(settings.loader_config());
        if !settings.restore_last {
            return loader;
        }
        if let Err(e) = loader.restore_last(viewer) {
            log::warn!("Could not load last colormap: {}", e);
        }
        loader
    }

    /// Current label table.
    pub fn table(&self) -> &LabelTable {
        &self.table
    }

    /// Current colormap.
    pub fn colormap(&self) -> &Colormap {
        &self.table.colormap
    }

    /// Current choice list.
    pub fn choices(&self) -> &ChoiceList {
        &self.table.choices
    }

    /// File the current table was loaded from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// The last-colormap cache, if configured.
    pub fn cache(&self) -> Option<&LastColormapCache> {
        self.cache.as_ref()
    }

    /// Parse a file without changing the loader state.
    pub fn parse(&self, path: &Path) -> Result<LabelTable, ColormapError> {
        self.parser.parse_file(path)
    }

    /// Parse `path`, apply it to the viewer's label layers and remember it.
    ///
    /// Failing to copy the file into the cache is logged, not returned.
    pub fn load(
        &mut self,
        path: &Path,
        viewer: &mut dyn Viewer,
    ) -> Result<&LabelTable, ColormapError> {
        let table = self.parse(path)?;
        let layers = apply(&table.colormap, viewer);
        log::info!(
            "Loaded {} labels from {:?} into {} label layers",
            table.len() - 1,
            path,
            layers
        );

        self.table = table;
        self.source = Some(path.to_path_buf());

        if let Some(Err(e)) = self.cache.as_ref().map(|cache| cache.store(path)) {
            log::warn!("{}", e);
        }

        Ok(&self.table)
    }

    /// Reload the cached copy of the last colormap, if one exists.
    pub fn restore_last(
        &mut self,
        viewer: &mut dyn Viewer,
    ) -> Result<Option<&LabelTable>, ColormapError> {
        let Some(cache) = &self.cache else {
            return Ok(None);
        };
        if !cache.exists() {
            log::debug!("No cached colormap at {:?}", cache.path());
            return Ok(None);
        }

        let path = cache.path().to_path_buf();
        self.load(&path, viewer).map(Some)
    }

    /// Re-apply the current colormap, e.g. after label layers were added.
    pub fn reapply(&self, viewer: &mut dyn Viewer) -> usize {
        apply(&self.table.colormap, viewer)
    }

    /// Highlight a label from the current choice list.
    pub fn select(&self, value: &str, viewer: &mut dyn Viewer) -> Result<u32, ColormapError> {
        select(&self.table.choices, value, viewer)
    }
}

impl Default for ColormapLoader {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LABEL_FILE_DELIMITER;
    use crate::viewer::{ImageLayer, LabelLayer, LayerStack};
    use ndarray::{ArrayD, IxDyn};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "medical-toolbox-loader-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_label_file(path: &Path, records: &[&str]) {
        let mut content = format!(
            "{0}\n# Label Description File\n{0}\n# IDX -R- -G- -B- -A-- VIS MSH LABEL\n",
            LABEL_FILE_DELIMITER
        );
        for record in records {
            content.push_str(record);
            content.push('\n');
        }
        std::fs::write(path, content).unwrap();
    }

    fn viewer() -> LayerStack {
        let mut stack = LayerStack::new();
        stack.add_image(ImageLayer::new("ct", ArrayD::<i16>::zeros(IxDyn(&[4, 4]))));
        stack.add_labels(LabelLayer::new("seg", ArrayD::zeros(IxDyn(&[4, 4]))));
        stack
    }

    #[test]
    fn test_load_applies_and_caches() {
        let dir = scratch_dir("load");
        let file = dir.join("labels.txt");
        write_label_file(&file, &["7 255 0 0 0 0 0 0 \"Tumor\""]);

        let mut viewer = viewer();
        let mut loader = ColormapLoader::new(LoaderConfig::new().cache_path(dir.join("last.txt")));
        let table = loader.load(&file, &mut viewer).unwrap();

        assert_eq!(table.colormap.get(7), Some([1.0, 0.0, 0.0, 0.5]));
        let seg = viewer.labels("seg").unwrap();
        assert_eq!(seg.colormap.as_ref(), Some(loader.colormap()));
        assert_eq!(loader.source(), Some(file.as_path()));
        assert!(loader.cache().unwrap().exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_restore_last_reads_cached_copy() {
        let dir = scratch_dir("restore");
        let file = dir.join("labels.txt");
        write_label_file(&file, &["3 0 0 255 1 1 1 \"Kidney\""]);

        let config = LoaderConfig::new().alpha(1.0).cache_path(dir.join("cache").join("last.txt"));
        let mut first = ColormapLoader::new(config.clone());
        first.load(&file, &mut viewer()).unwrap();

        // Only the cached copy is left
        std::fs::remove_file(&file).unwrap();

        let mut viewer = viewer();
        let mut second = ColormapLoader::new(config);
        let table = second.restore_last(&mut viewer).unwrap().unwrap();
        assert_eq!(table.choices.key_for("3"), Some("3 - Kidney"));
        assert_eq!(table.colormap.get(3), Some([0.0, 0.0, 1.0, 1.0]));
        assert!(viewer.labels("seg").unwrap().colormap.is_some());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_from_settings_honours_restore_flag() {
        let dir = scratch_dir("settings");
        let slot = dir.join("last.txt");
        write_label_file(&slot, &["5 0 255 0 1 1 1 \"Spleen\""]);

        let mut settings = ColormapSettings {
            label_alpha: 1.0,
            cache_path: Some(slot.clone()),
            restore_last: true,
        };
        let mut restored = viewer();
        let loader = ColormapLoader::from_settings(&settings, &mut restored);
        assert_eq!(loader.source(), Some(slot.as_path()));
        assert_eq!(loader.colormap().get(5), Some([0.0, 1.0, 0.0, 1.0]));
        assert!(restored.labels("seg").unwrap().colormap.is_some());

        settings.restore_last = false;
        let mut untouched = viewer();
        let loader = ColormapLoader::from_settings(&settings, &mut untouched);
        assert!(loader.source().is_none());
        assert_eq!(loader.table().len(), 1);
        assert!(untouched.labels("seg").unwrap().colormap.is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_from_settings_survives_broken_cache() {
        let dir = scratch_dir("broken");
        let slot = dir.join("last.txt");
        std::fs::write(&slot, "no delimiters here\n").unwrap();

        let settings = ColormapSettings {
            label_alpha: 0.5,
            cache_path: Some(slot),
            restore_last: true,
        };
        let mut viewer = viewer();
        let loader = ColormapLoader::from_settings(&settings, &mut viewer);
        assert!(loader.source().is_none());
        assert_eq!(loader.table(), &LabelTable::background_only());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_restore_without_cache() {
        let mut loader = ColormapLoader::default();
        assert!(loader.restore_last(&mut viewer()).unwrap().is_none());

        let dir = scratch_dir("empty");
        let mut loader = ColormapLoader::new(LoaderConfig::new().cache_path(dir.join("last.txt")));
        assert!(loader.restore_last(&mut viewer()).unwrap().is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_failed_load_keeps_state() {
        let dir = scratch_dir("failed");
        let good = dir.join("good.txt");
        let bad = dir.join("bad.txt");
        write_label_file(&good, &["2 0 255 0 1 1 1 \"Liver\""]);
        std::fs::write(&bad, format!("{}\n2 0 255 0\n", LABEL_FILE_DELIMITER)).unwrap();

        let mut viewer = viewer();
        let mut loader = ColormapLoader::default();
        loader.load(&good, &mut viewer).unwrap();
        let before = loader.table().clone();

        let err = loader.load(&bad, &mut viewer).unwrap_err();
        assert!(err.is_parse_error());
        assert_eq!(loader.table(), &before);
        assert_eq!(loader.source(), Some(good.as_path()));
        assert_eq!(viewer.labels("seg").unwrap().colormap.as_ref(), Some(&before.colormap));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_cache_failure_does_not_block_load() {
        let dir = scratch_dir("blocked");
        let file = dir.join("labels.txt");
        write_label_file(&file, &["1 1 1 1 1 1 1 \"A\""]);
        // A directory where the cache file should go
        let slot = dir.join("slot");
        std::fs::create_dir_all(&slot).unwrap();

        let mut loader = ColormapLoader::new(LoaderConfig::new().cache_path(&slot));
        assert!(loader.load(&file, &mut viewer()).is_ok());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_select_valid_and_invalid() {
        let dir = scratch_dir("select");
        let file = dir.join("labels.txt");
        write_label_file(&file, &["7 255 0 0 0 0 0 0 \"Tumor\""]);

        let mut viewer = viewer();
        let mut loader = ColormapLoader::default();
        loader.load(&file, &mut viewer).unwrap();

        assert_eq!(loader.select("7", &mut viewer).unwrap(), 7);
        assert_eq!(viewer.labels("seg").unwrap().selected_label, 7);

        let err = loader.select("8", &mut viewer).unwrap_err();
        assert!(matches!(err, ColormapError::InvalidSelection { ref value } if value == "8"));
        assert_eq!(viewer.labels("seg").unwrap().selected_label, 7);

        assert_eq!(loader.select("0", &mut viewer).unwrap(), 0);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_apply_skips_image_layers() {
        let mut viewer = viewer();
        viewer.add_labels(LabelLayer::new("extra", ArrayD::zeros(IxDyn(&[1]))));
        assert_eq!(apply(&Colormap::new(), &mut viewer), 2);
        assert_eq!(ColormapLoader::default().reapply(&mut viewer), 2);
    }
}

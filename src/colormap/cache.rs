//! Single-slot cache of the most recently loaded label description file.

use std::path::{Path, PathBuf};

use super::error::ColormapError;

/// On-disk copy of the last colormap file, reloaded on the next start.
#[derive(Debug, Clone)]
pub struct LastColormapCache {
    path: PathBuf,
}

impl LastColormapCache {
    /// Create a cache that stores its copy at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the cached copy.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a cached copy exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Copy `source` into the cache slot, overwriting any previous copy.
    ///
    /// Returns `Ok(false)` without touching the disk when `source` already is
    /// the cache slot.
    pub fn store(&self, source: &Path) -> Result<bool, ColormapError> {
        if self.is_same_file(source) {
            log::trace!("Colormap cache: {:?} is already cached", source);
            return Ok(false);
        }

        let write_err = |source: std::io::Error| ColormapError::CacheWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::copy(source, &self.path).map_err(write_err)?;

        log::debug!("Cached colormap {:?} at {:?}", source, self.path);
        Ok(true)
    }

    /// Remove the cached copy if present.
    pub fn clear(&self) -> Result<(), ColormapError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ColormapError::CacheWrite {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn is_same_file(&self, source: &Path) -> bool {
        if source == self.path {
            return true;
        }
        match (source.canonicalize(), self.path.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "medical-toolbox-cache-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_store_copies_contents() {
        let dir = scratch_dir("store");
        let source = dir.join("labels.txt");
        std::fs::write(&source, "first").unwrap();

        let cache = LastColormapCache::new(dir.join("nested").join("last.txt"));
        assert!(!cache.exists());
        assert!(cache.store(&source).unwrap());
        assert_eq!(std::fs::read_to_string(cache.path()).unwrap(), "first");

        // Overwrites rather than appends
        std::fs::write(&source, "second").unwrap();
        assert!(cache.store(&source).unwrap());
        assert_eq!(std::fs::read_to_string(cache.path()).unwrap(), "second");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_store_same_file_is_skipped() {
        let dir = scratch_dir("same");
        let slot = dir.join("last.txt");
        std::fs::write(&slot, "cached").unwrap();

        let cache = LastColormapCache::new(&slot);
        assert!(!cache.store(&slot).unwrap());
        assert_eq!(std::fs::read_to_string(&slot).unwrap(), "cached");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_store_missing_source_fails() {
        let dir = scratch_dir("missing");
        let cache = LastColormapCache::new(dir.join("last.txt"));
        let err = cache.store(&dir.join("nope.txt")).unwrap_err();
        assert!(matches!(err, ColormapError::CacheWrite { .. }));

        cache.clear().unwrap();
        let _ = std::fs::remove_dir_all(&dir);
    }
}

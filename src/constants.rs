//! Global constants for the medical toolbox

/// Delimiter line that brackets the preamble of a label description file.
pub const LABEL_FILE_DELIMITER: &str = "################################################";

/// Label id reserved for the background.
pub const BACKGROUND_LABEL: u32 = 0;

/// Display name of the background label.
pub const BACKGROUND_NAME: &str = "Background";

/// Alpha applied to every parsed label color unless configured otherwise.
pub const DEFAULT_LABEL_ALPHA: f32 = 0.5;

/// File name of the last-used colormap copy.
pub const LAST_COLORMAP_FILENAME: &str = "last_colormap.txt";

/// Directory name used under the platform config/cache directories.
pub const APP_DIR_NAME: &str = "medical-toolbox";

/// Default threshold for the image threshold widget.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Suffix appended to the source layer name for threshold output.
pub const THRESHOLD_SUFFIX: &str = "_thresholded";

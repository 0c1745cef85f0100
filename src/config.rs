//! Configuration file support for the gallery menu.
//!
//! Every section has serde defaults, so a partial JSON file (or an empty
//! `{}` with just a version) yields a usable configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{grid, routes, DEFAULT_CLEANUP_SESSION_KEY, DEFAULT_OUTPUT_PREFIX};

/// Verbosity of the gallery's log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Maximum level passed to the logger backend.
    pub fn to_level_filter(self) -> log::LevelFilter {
        self.to_level().to_level_filter()
    }

    /// The matching `log` level.
    pub fn to_level(self) -> log::Level {
        match self {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Routes of the gallery backend, relative to `base_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub thumbnails_batch: String,
    pub thumbnail: String,
    pub service_check: String,
    pub cleanup: String,
    pub delete_file: String,
    pub tags: String,
    pub tags_save: String,
    pub tag_add_image: String,
    pub tag_remove_image: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            thumbnails_batch: routes::THUMBNAILS_BATCH.to_string(),
            thumbnail: routes::THUMBNAIL.to_string(),
            service_check: routes::SERVICE_CHECK.to_string(),
            cleanup: routes::CLEANUP.to_string(),
            delete_file: routes::DELETE_FILE.to_string(),
            tags: routes::TAGS.to_string(),
            tags_save: routes::TAGS_SAVE.to_string(),
            tag_add_image: routes::TAG_ADD_IMAGE.to_string(),
            tag_remove_image: routes::TAG_REMOVE_IMAGE.to_string(),
        }
    }
}

/// Grid sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of one gallery cell (pixels)
    pub cell_width: f32,
    /// Minimum number of grid columns
    pub min_columns: usize,
    /// Maximum number of grid columns
    pub max_columns: usize,
    /// Ask the host to reposition menus with more rows than this
    pub reposition_threshold: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cell_width: grid::CELL_WIDTH,
            min_columns: grid::MIN_COLUMNS,
            max_columns: grid::MAX_COLUMNS,
            reposition_threshold: grid::REPOSITION_THRESHOLD,
        }
    }
}

/// What to show for an identifier missing from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FallbackMode {
    /// Point at the single-thumbnail route and let the browser fetch it
    #[default]
    RemoteUrl,
    /// Show a fixed transparent placeholder
    Placeholder,
}

/// Thumbnail cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Fallback for cache misses
    pub fallback: FallbackMode,
    /// Prefix marking identifiers relative to the output directory
    pub output_prefix: String,
    /// Session key of the one-shot stale-thumbnail cleanup marker
    pub cleanup_session_key: String,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            fallback: FallbackMode::default(),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            cleanup_session_key: DEFAULT_CLEANUP_SESSION_KEY.to_string(),
        }
    }
}

/// Folder tab settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Only build folders when at least one value contains a `.`
    pub require_dot: bool,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self { require_dot: true }
    }
}

/// Which menus get tabs and which get the image gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityConfig {
    /// CSS class of combo-value menus
    pub menu_class: String,
    /// Node types starting with this prefix are image loaders
    pub gallery_node_prefix: String,
    /// Additional image loader node types
    pub gallery_node_types: Vec<String>,
    /// Node type whose combo may list channels instead of files
    pub channel_node_type: String,
    /// Reserved channel names
    pub channel_names: Vec<String>,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            menu_class: "dark".to_string(),
            gallery_node_prefix: "LoadImage".to_string(),
            gallery_node_types: vec!["LoadImageOutput".to_string()],
            channel_node_type: "LoadImageMask".to_string(),
            channel_names: ["alpha", "red", "green", "blue"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Gallery configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Origin of the backend. Empty means the page origin on `wasm32`;
    /// native clients must set it.
    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub endpoints: Endpoints,

    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub thumbnails: ThumbnailConfig,

    #[serde(default)]
    pub hierarchy: HierarchyConfig,

    #[serde(default)]
    pub eligibility: EligibilityConfig,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl GalleryConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            base_url: String::new(),
            endpoints: Endpoints::default(),
            layout: LayoutConfig::default(),
            thumbnails: ThumbnailConfig::default(),
            hierarchy: HierarchyConfig::default(),
            eligibility: EligibilityConfig::default(),
            log_level: LogLevel::default(),
        }
    }

    /// Set the backend origin.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Absolute URL of a route.
    pub fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), route)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                found: config.version,
                supported: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// File name of the configuration file.
    pub const FILE_NAME: &'static str = "gallery-menu.json";

    /// Location of the configuration file under the platform config dir
    /// (`~/.config` when the platform has none).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))?;
        Some(base.join("gallery-menu").join(Self::FILE_NAME))
    }

    /// Read a configuration file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write this configuration, creating parent directories.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved gallery configuration to {}", path.display());
        Ok(())
    }

    /// Load the stored configuration, or defaults when there is none.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_or_default() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_or_default_from(&path),
            None => Self::default(),
        }
    }

    /// Load `path`, or defaults when it is missing. An unreadable or newer
    /// file is reported and replaced by defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_or_default_from(path: &std::path::Path) -> Self {
        if !path.exists() {
            log::debug!("No gallery configuration at {}", path.display());
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_stored(&json, &path.display().to_string()),
            Err(e) => {
                log::warn!("Could not read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// `localStorage` key of the stored configuration.
    #[cfg(target_arch = "wasm32")]
    pub const STORAGE_KEY: &'static str = "gallery-menu-config";

    /// Load the stored configuration, or defaults when there is none.
    #[cfg(target_arch = "wasm32")]
    pub fn load_or_default() -> Self {
        let stored = web_sys::window()
            .ok_or_else(|| ConfigError::Storage("no window".to_string()))
            .and_then(|window| {
                window
                    .local_storage()
                    .map_err(|e| ConfigError::Storage(format!("{:?}", e)))?
                    .ok_or_else(|| ConfigError::Storage("localStorage disabled".to_string()))
            })
            .and_then(|storage| {
                storage
                    .get_item(Self::STORAGE_KEY)
                    .map_err(|e| ConfigError::Storage(format!("{:?}", e)))
            });
        match stored {
            Ok(Some(json)) => Self::from_stored(&json, "localStorage"),
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("{}", e);
                Self::default()
            }
        }
    }

    fn from_stored(json: &str, source: &str) -> Self {
        Self::from_json(json).unwrap_or_else(|e| {
            log::warn!("Ignoring gallery configuration from {}: {}", source, e);
            Self::default()
        })
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors while reading or writing the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid gallery configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Configuration version {found} is newer than {supported}")]
    VersionTooNew { found: u32, supported: u32 },

    #[error("Configuration I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration storage unavailable: {0}")]
    Storage(String),
}

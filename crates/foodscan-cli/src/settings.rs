//! Settings file and platform directories.
//!
//! Settings live in the platform config folder:
//! - Linux: ~/.config/foodscan/settings.toml
//! - macOS: ~/Library/Application Support/org.openfoodfacts.foodscan/settings.toml
//! - Windows: %APPDATA%/openfoodfacts/foodscan/config/settings.toml
//!
//! The installation identifier lives in the matching data folder.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use foodscan_lookup::{INSTALLATION_ID_FILE, LookupSettings};
use foodscan_model::{DecoderConfig, Symbology};
use serde::{Deserialize, Serialize};

const APP_QUALIFIER: &str = "org";
const APP_ORG: &str = "openfoodfacts";
const APP_NAME: &str = "foodscan";
const CONFIG_FILENAME: &str = "settings.toml";

/// Default V4L2 capture device.
pub const DEFAULT_CAMERA_DEVICE: &str = "/dev/video0";

/// Everything read from `settings.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where the installation identifier is kept (default: platform data dir).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installation_id_file: Option<PathBuf>,
    pub lookup: LookupSettings,
    pub scanner: ScannerSettings,
}

/// `[scanner]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerSettings {
    /// Symbologies to recognize, in priority order.
    pub symbologies: Vec<Symbology>,
    /// `zbarimg` executable.
    pub zbarimg: PathBuf,
    /// `zbarcam` executable.
    pub zbarcam: PathBuf,
    /// Video device for live scanning.
    pub camera_device: PathBuf,
    /// How long `foodscan live` waits for a detection, in seconds.
    pub live_timeout_secs: u64,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            symbologies: Symbology::ALL.to_vec(),
            zbarimg: PathBuf::from("zbarimg"),
            zbarcam: PathBuf::from("zbarcam"),
            camera_device: PathBuf::from(DEFAULT_CAMERA_DEVICE),
            live_timeout_secs: 30,
        }
    }
}

impl ScannerSettings {
    #[must_use]
    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig::with_symbologies(self.symbologies.iter().copied())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
}

/// Default location of `settings.toml`.
///
/// Returns `None` if the platform directory cannot be determined.
#[must_use]
pub fn settings_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Default location of the installation identifier.
#[must_use]
pub fn installation_id_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join(INSTALLATION_ID_FILE))
}

impl Settings {
    /// Load from `explicit`, or from [`settings_path`] when `None`.
    ///
    /// A missing default file yields defaults. A missing explicit file is an
    /// error, as is a file that does not parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::read(path);
        }
        let Some(path) = settings_path() else {
            tracing::warn!("could not determine settings path, using defaults");
            return Ok(Self::default());
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        Self::read(&path)
    }

    fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read settings file {}", path.display()))?;
        let settings = toml::from_str(&content)
            .with_context(|| format!("parse settings file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Write to `path`, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create config directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("serialize settings")?;
        fs::write(path, content)
            .with_context(|| format!("write settings file {}", path.display()))?;
        tracing::info!(path = %path.display(), "saved settings");
        Ok(())
    }
}

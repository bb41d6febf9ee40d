//! Validated, self-healing user settings
//!
//! Settings live in `<config dir>/snapcap/settings.json`. Loading never
//! fails: a missing or unparseable file yields defaults, and each invalid
//! field is reset on its own. Whenever anything was healed the file is
//! rewritten.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    encoder::ImageFormat,
    error::{SettingsError, SettingsResult},
};

pub const SETTINGS_FILE: &str = "settings.json";
const APP_DIR: &str = "snapcap";

pub const DEFAULT_FILE_NAME_PATTERN: &str = "Screenshot_{yyyy-MM-dd_HH-mm-ss}";
pub const DEFAULT_QUALITY: u8 = 95;
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 200;
pub const MAX_SETTLE_DELAY_MS: u64 = 2000;

/// Characters that may not appear in a file name pattern
const INVALID_NAME_CHARS: &[char] = &['/', '\\', '<', '>', ':', '"', '|', '?', '*'];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub save_directory: PathBuf,
    pub file_name_pattern: String,
    pub default_format: ImageFormat,
    /// JPEG / WebP quality, 1-100
    pub quality: u8,
    pub auto_save: bool,
    pub copy_to_clipboard: bool,
    pub enable_ocr: bool,
    /// Wait between raising a window and copying its pixels
    pub settle_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            save_directory: default_save_directory(),
            file_name_pattern: DEFAULT_FILE_NAME_PATTERN.to_string(),
            default_format: ImageFormat::Png,
            quality: DEFAULT_QUALITY,
            auto_save: true,
            copy_to_clipboard: true,
            enable_ocr: false,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }
}

impl Settings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Build settings from a parsed document, resetting every missing or
    /// invalid field. Returns the names of the fields that were reset.
    pub fn from_value_healing(value: Value) -> (Self, Vec<&'static str>) {
        let defaults = Settings::default();
        let mut healed = Vec::new();

        let Value::Object(map) = value else {
            return (defaults, vec!["<document>"]);
        };

        let save_directory = field::<PathBuf>(&map, "save_directory", &mut healed)
            .filter(|dir| !dir.as_os_str().is_empty())
            .or_else(|| heal(&mut healed, "save_directory"));

        let file_name_pattern = field::<String>(&map, "file_name_pattern", &mut healed)
            .filter(|pattern| is_valid_pattern(pattern))
            .or_else(|| heal(&mut healed, "file_name_pattern"));

        let quality = field::<u8>(&map, "quality", &mut healed)
            .filter(|q| (1..=100).contains(q))
            .or_else(|| heal(&mut healed, "quality"));

        let settle_delay_ms = field::<u64>(&map, "settle_delay_ms", &mut healed)
            .filter(|ms| *ms <= MAX_SETTLE_DELAY_MS)
            .or_else(|| heal(&mut healed, "settle_delay_ms"));

        let settings = Settings {
            save_directory: save_directory.unwrap_or(defaults.save_directory),
            file_name_pattern: file_name_pattern.unwrap_or(defaults.file_name_pattern),
            default_format: field(&map, "default_format", &mut healed)
                .unwrap_or(defaults.default_format),
            quality: quality.unwrap_or(defaults.quality),
            auto_save: field(&map, "auto_save", &mut healed).unwrap_or(defaults.auto_save),
            copy_to_clipboard: field(&map, "copy_to_clipboard", &mut healed)
                .unwrap_or(defaults.copy_to_clipboard),
            enable_ocr: field(&map, "enable_ocr", &mut healed).unwrap_or(defaults.enable_ocr),
            settle_delay_ms: settle_delay_ms.unwrap_or(defaults.settle_delay_ms),
        };

        healed.dedup();
        (settings, healed)
    }
}

/// Read `key`, recording it as healed when it is missing or has the wrong type
fn field<T: DeserializeOwned>(
    map: &Map<String, Value>,
    key: &'static str,
    healed: &mut Vec<&'static str>,
) -> Option<T> {
    let parsed = map.get(key).and_then(|value| T::deserialize(value).ok());
    if parsed.is_none() {
        healed.push(key);
    }
    parsed
}

/// Record a field that parsed but failed validation
fn heal<T>(healed: &mut Vec<&'static str>, key: &'static str) -> Option<T> {
    if healed.last() != Some(&key) {
        healed.push(key);
    }
    None
}

/// A pattern is valid when it is non-empty, its `{}` groups are balanced and
/// not nested, and it contains no character forbidden in file names.
pub fn is_valid_pattern(pattern: &str) -> bool {
    if pattern.trim().is_empty() || pattern.contains(INVALID_NAME_CHARS) {
        return false;
    }

    let mut in_group = false;
    for c in pattern.chars() {
        match (c, in_group) {
            ('{', false) => in_group = true,
            ('}', true) => in_group = false,
            ('{', true) | ('}', false) => return false,
            _ => {}
        }
    }
    !in_group
}

fn default_save_directory() -> PathBuf {
    dirs::picture_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Loads and saves [`Settings`] at a fixed path
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<config dir>/snapcap/settings.json`
    pub fn default_location() -> Self {
        let dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);
        Self::new(dir.join(SETTINGS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, healing whatever is missing or invalid
    pub fn load(&self) -> Settings {
        let (settings, healed) = match std::fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(value) => Settings::from_value_healing(value),
                Err(e) => {
                    log::warn!("settings file {:?} is unreadable, using defaults: {}", self.path, e);
                    (Settings::default(), vec!["<document>"])
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no settings file at {:?}, using defaults", self.path);
                (Settings::default(), vec!["<document>"])
            }
            Err(e) => {
                // Unreadable but present: keep defaults in memory, leave the file alone
                log::warn!("failed to read settings {:?}: {}", self.path, e);
                return Settings::default();
            }
        };

        for key in healed.iter().filter(|key| **key != "<document>") {
            log::warn!("settings field '{}' was missing or invalid, reset to default", key);
        }

        if !healed.is_empty() {
            if let Err(e) = self.save(&settings) {
                log::warn!("failed to persist healed settings: {}", e);
            }
        }

        settings
    }

    /// Write settings as pretty JSON, creating the parent directory
    pub fn save(&self, settings: &Settings) -> SettingsResult<()> {
        let io = |source| SettingsError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io)?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, json).map_err(io)?;
        log::debug!("saved settings to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_document() -> Value {
        serde_json::to_value(Settings {
            save_directory: PathBuf::from("/tmp/shots"),
            ..Settings::default()
        })
        .unwrap()
    }

    #[test]
    fn test_pattern_validation() {
        assert!(is_valid_pattern(DEFAULT_FILE_NAME_PATTERN));
        assert!(is_valid_pattern("plain"));
        assert!(!is_valid_pattern(""));
        assert!(!is_valid_pattern("   "));
        assert!(!is_valid_pattern("shots/{yyyy}"));
        assert!(!is_valid_pattern("a?b"));
        assert!(!is_valid_pattern("{HH:mm}"));
        assert!(!is_valid_pattern("{yyyy"));
        assert!(!is_valid_pattern("yyyy}"));
        assert!(!is_valid_pattern("{{yyyy}}"));
    }

    #[test]
    fn test_valid_document_heals_nothing() {
        let (settings, healed) = Settings::from_value_healing(valid_document());
        assert!(healed.is_empty(), "healed: {:?}", healed);
        assert_eq!(settings.save_directory, PathBuf::from("/tmp/shots"));
    }

    #[test]
    fn test_invalid_fields_heal_individually() {
        let mut doc = valid_document();
        doc["quality"] = json!(0);
        doc["default_format"] = json!("tiff");
        doc["file_name_pattern"] = json!("bad|name");
        doc["settle_delay_ms"] = json!(60_000);
        doc["auto_save"] = json!(false);

        let (settings, healed) = Settings::from_value_healing(doc);
        assert_eq!(settings.quality, DEFAULT_QUALITY);
        assert_eq!(settings.default_format, ImageFormat::Png);
        assert_eq!(settings.file_name_pattern, DEFAULT_FILE_NAME_PATTERN);
        assert_eq!(settings.settle_delay_ms, DEFAULT_SETTLE_DELAY_MS);
        // Valid values survive
        assert!(!settings.auto_save);
        assert_eq!(settings.save_directory, PathBuf::from("/tmp/shots"));

        for key in ["quality", "default_format", "file_name_pattern", "settle_delay_ms"] {
            assert!(healed.contains(&key), "{} not healed", key);
        }
        assert_eq!(healed.len(), 4);
    }

    #[test]
    fn test_non_object_document() {
        let (settings, healed) = Settings::from_value_healing(json!([1, 2, 3]));
        assert_eq!(healed, vec!["<document>"]);
        assert_eq!(settings.quality, DEFAULT_QUALITY);
    }

    #[test]
    fn test_settle_delay() {
        let settings = Settings {
            settle_delay_ms: 150,
            ..Settings::default()
        };
        assert_eq!(settings.settle_delay(), Duration::from_millis(150));
    }
}

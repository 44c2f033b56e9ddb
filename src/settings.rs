use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use anyhow::{bail, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum CaptureSourceKind {
    /// The real pointer (macOS only)
    System,
    /// A random walk, for demos and machines without a pointer
    Simulated,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureSettings {
    pub sample_interval_ms: u64,
    pub source: CaptureSourceKind,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            sample_interval_ms: 16,
            source: CaptureSourceKind::System,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportSettings {
    pub width: u32,
    pub height: u32,
    pub padding: u32,
    pub line_width: u32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            padding: 20,
            line_width: 2,
        }
    }
}

/// Largest accepted canvas side, in pixels.
pub const MAX_EXPORT_DIMENSION: u32 = 16_384;
/// Largest accepted canvas area (about 128 MB of RGBA).
pub const MAX_EXPORT_PIXELS: u64 = 32_000_000;

impl ExportSettings {
    /// Rejects canvases that are empty or too large to allocate.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!("export size must be non-zero, got {}x{}", self.width, self.height);
        }
        if self.width > MAX_EXPORT_DIMENSION || self.height > MAX_EXPORT_DIMENSION {
            bail!(
                "export size {}x{} exceeds the {MAX_EXPORT_DIMENSION} px limit per side",
                self.width,
                self.height
            );
        }
        let pixels = u64::from(self.width) * u64::from(self.height);
        if pixels > MAX_EXPORT_PIXELS {
            bail!(
                "export size {}x{} is {pixels} pixels, above the {MAX_EXPORT_PIXELS} limit",
                self.width,
                self.height
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct UserSettings {
    capture: CaptureSettings,
    export: ExportSettings,
}

/// Settings persisted as pretty JSON next to the database.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring unreadable settings at {}: {err}", path.display());
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn capture(&self) -> CaptureSettings {
        self.read().capture.clone()
    }

    pub fn export(&self) -> ExportSettings {
        self.read().export.clone()
    }

    pub fn update_capture(&self, settings: CaptureSettings) -> Result<()> {
        let mut guard = self.write();
        guard.capture = settings;
        self.persist(&guard)
    }

    pub fn update_export(&self, settings: ExportSettings) -> Result<()> {
        let mut guard = self.write();
        guard.export = settings;
        self.persist(&guard)
    }

    fn read(&self) -> RwLockReadGuard<'_, UserSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_size_limits() {
        assert!(ExportSettings::default().validate().is_ok());

        let square = |side| ExportSettings {
            width: side,
            height: side,
            ..ExportSettings::default()
        };
        assert!(square(0).validate().is_err());
        assert!(square(5_000).validate().is_ok());
        assert!(square(6_000).validate().is_err());
        assert!(square(u32::MAX).validate().is_err());

        let strip = ExportSettings {
            width: MAX_EXPORT_DIMENSION + 1,
            height: 1,
            ..ExportSettings::default()
        };
        assert!(strip.validate().is_err());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.capture(), CaptureSettings::default());
        assert_eq!(store.export(), ExportSettings::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "capture": { "source": "simulated" } }"#).unwrap();

        let store = SettingsStore::new(path).unwrap();
        let capture = store.capture();
        assert_eq!(capture.source, CaptureSourceKind::Simulated);
        assert_eq!(capture.sample_interval_ms, 16);
        assert_eq!(store.export().width, 800);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.capture(), CaptureSettings::default());
    }

    #[test]
    fn updates_persist_across_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone()).unwrap();
        store
            .update_capture(CaptureSettings {
                sample_interval_ms: 5,
                source: CaptureSourceKind::Simulated,
            })
            .unwrap();
        store
            .update_export(ExportSettings {
                width: 320,
                ..ExportSettings::default()
            })
            .unwrap();

        let reloaded = SettingsStore::new(path).unwrap();
        assert_eq!(reloaded.capture().sample_interval_ms, 5);
        assert_eq!(reloaded.export().width, 320);
    }
}

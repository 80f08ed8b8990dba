//! Annotator configuration, stored as JSON.

use crate::error::AnnotateResult;
use crate::items::ItemProperties;
use crate::undo::DEFAULT_UNDO_LIMIT;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings shared by every canvas of an annotator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Commands kept in each canvas history.
    pub undo_limit: usize,
    /// Whether undo/redo is available.
    pub undo_enabled: bool,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Properties given to newly drawn items.
    pub default_properties: ItemProperties,
    /// Upper bound on highlight opacity.
    pub highlight_opacity: f64,
    /// Pointer hit tolerance in screen pixels.
    pub hit_tolerance: f64,
    /// Extra sticker bitmaps offered by the sticker tool.
    pub sticker_paths: Vec<PathBuf>,
    /// Offer the built-in stickers alongside `sticker_paths`.
    pub keep_default_stickers: bool,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            undo_limit: DEFAULT_UNDO_LIMIT,
            undo_enabled: true,
            min_zoom: 0.1,
            max_zoom: 10.0,
            default_properties: ItemProperties::default(),
            highlight_opacity: 0.4,
            hit_tolerance: 4.0,
            sticker_paths: Vec::new(),
            keep_default_stickers: true,
        }
    }
}

impl AnnotatorConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> AnnotateResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the config to pretty JSON.
    pub fn to_json(&self) -> AnnotateResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a config file.
    pub fn load(path: &Path) -> AnnotateResult<Self> {
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the config file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> AnnotateResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        log::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Decode every configured sticker. Unreadable files are skipped with a warning.
    pub fn load_stickers(&self) -> Vec<(PathBuf, RgbaImage)> {
        self.sticker_paths
            .iter()
            .filter_map(|path| match image::open(path) {
                Ok(image) => Some((path.clone(), image.to_rgba8())),
                Err(e) => {
                    log::warn!("Skipping sticker {}: {}", path.display(), e);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::SerializableColor;
    use image::Rgba;
    use tempfile::tempdir;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = AnnotatorConfig::from_json(r#"{ "undo_limit": 7 }"#).unwrap();
        assert_eq!(config.undo_limit, 7);
        assert!(config.undo_enabled);
        assert_eq!(config.default_properties, ItemProperties::default());
        assert!((config.highlight_opacity - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("inkmark.json");

        let config = AnnotatorConfig {
            undo_enabled: false,
            max_zoom: 4.0,
            default_properties: ItemProperties::default()
                .with_stroke_color(SerializableColor::red())
                .with_stroke_width(6.0),
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = AnnotatorConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            AnnotatorConfig::from_json("{ not json"),
            Err(crate::error::AnnotateError::Config(_))
        ));
        let dir = tempdir().unwrap();
        assert!(matches!(
            AnnotatorConfig::load(&dir.path().join("missing.json")),
            Err(crate::error::AnnotateError::Io(_))
        ));
    }

    #[test]
    fn test_load_stickers_skips_bad_files() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("star.png");
        RgbaImage::from_pixel(3, 2, Rgba([9, 9, 9, 255]))
            .save(&good)
            .unwrap();
        let bad = dir.path().join("broken.png");
        fs::write(&bad, b"not a png").unwrap();

        let config = AnnotatorConfig {
            sticker_paths: vec![good.clone(), bad],
            ..Default::default()
        };
        let stickers = config.load_stickers();
        assert_eq!(stickers.len(), 1);
        assert_eq!(stickers[0].0, good);
        assert_eq!(stickers[0].1.dimensions(), (3, 2));
    }
}

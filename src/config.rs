//! Presets and defaults, loaded from `vidascii.toml` or `vidascii.json`.

use crate::ffmpeg::FfmpegConfig;
use crate::ramp::GlyphRamp;
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_STEM: &str = "vidascii";

fn default_step() -> usize {
    1
}

/// Output grid and sampling step for a named quality level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub width: u32,
    /// 0 keeps the source aspect ratio.
    #[serde(default)]
    pub height: u32,
    #[serde(default = "default_step")]
    pub step: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub presets: BTreeMap<String, Preset>,
    pub default_preset: String,
    /// Replaces the built-in block ramp.
    pub glyph_ramp: Option<String>,
    /// Replaces the built-in plain ramp used with `-nb`.
    pub glyph_ramp_no_block: Option<String>,
    /// Worker threads for frame conversion; 0 uses one per CPU.
    pub jobs: usize,
    /// Frame rate reported for directories of still frames.
    pub sequence_fps: f64,
    pub ffmpeg: FfmpegConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let presets = [
            ("default", Preset { width: 90, height: 32, step: 1 }),
            ("small", Preset { width: 60, height: 0, step: 1 }),
            ("large", Preset { width: 160, height: 0, step: 1 }),
        ]
        .into_iter()
        .map(|(name, preset)| (name.to_string(), preset))
        .collect();

        Self {
            presets,
            default_preset: "default".to_string(),
            glyph_ramp: None,
            glyph_ramp_no_block: None,
            jobs: 0,
            sequence_fps: 30.0,
            ffmpeg: FfmpegConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse a config file; `.toml` files are read as TOML, anything else as JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
        let is_toml = path.extension().is_some_and(|e| e.eq_ignore_ascii_case("toml"));
        let cfg: AppConfig = if is_toml {
            toml::from_str(&text).with_context(|| format!("parsing config toml {}", path.display()))?
        } else {
            serde_json::from_str(&text).with_context(|| format!("parsing config json {}", path.display()))?
        };
        cfg.validate()
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(cfg)
    }

    /// Load `explicit` if given, otherwise the first config found in the
    /// candidate locations, otherwise the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        for path in Self::candidate_paths() {
            if path.is_file() {
                log::info!("using config {}", path.display());
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// `<data dir>/vidascii/vidascii.{toml,json}`, then `./vidascii.{toml,json}`.
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut dirs_to_try: Vec<PathBuf> = Vec::new();
        if let Some(d) = dirs::data_dir() {
            dirs_to_try.push(d.join(CONFIG_STEM));
        }
        dirs_to_try.push(PathBuf::from("."));

        dirs_to_try
            .into_iter()
            .flat_map(|d| {
                ["toml", "json"]
                    .into_iter()
                    .map(move |ext| d.join(format!("{}.{}", CONFIG_STEM, ext)))
            })
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        self.preset(&self.default_preset)?;
        for (name, preset) in &self.presets {
            if preset.width == 0 {
                bail!("preset '{}' has zero width", name);
            }
            if preset.step == 0 {
                bail!("preset '{}' has zero step", name);
            }
        }
        self.ramp(false)?;
        self.ramp(true)?;
        if !(self.sequence_fps > 0.0) {
            bail!("sequence_fps must be positive, got {}", self.sequence_fps);
        }
        Ok(())
    }

    pub fn preset(&self, name: &str) -> Result<&Preset> {
        self.presets.get(name).ok_or_else(|| {
            let available = self.presets.keys().cloned().collect::<Vec<_>>().join(", ");
            anyhow!("Preset '{}' not found. Available presets: {}", name, available)
        })
    }

    /// The glyph ramp for this run: plain when `no_block` is set, block otherwise.
    pub fn ramp(&self, no_block: bool) -> Result<GlyphRamp> {
        let custom = if no_block {
            self.glyph_ramp_no_block.as_deref()
        } else {
            self.glyph_ramp.as_deref()
        };
        match custom {
            Some(glyphs) => GlyphRamp::new(glyphs).with_context(|| format!("invalid glyph ramp {:?}", glyphs)),
            None if no_block => Ok(GlyphRamp::plain()),
            None => Ok(GlyphRamp::block()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = AppConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.preset("default").unwrap(), &Preset { width: 90, height: 32, step: 1 });
        assert_eq!(cfg.ramp(false).unwrap(), GlyphRamp::block());
        assert_eq!(cfg.ramp(true).unwrap(), GlyphRamp::plain());
    }

    #[test]
    fn loads_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vidascii.toml");
        fs::write(
            &path,
            r##"
jobs = 2
glyph_ramp = "#+. "

[ffmpeg]
ffmpeg = "/opt/ffmpeg/bin/ffmpeg"
"##,
        )
        .unwrap();
        let cfg = AppConfig::from_file(&path).unwrap();
        assert_eq!(cfg.jobs, 2);
        assert_eq!(cfg.ramp(false).unwrap().len(), 4);
        assert_eq!(cfg.ffmpeg.ffmpeg, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(cfg.ffmpeg.ffprobe, "ffprobe");
        assert!(cfg.presets.contains_key("small"));
    }

    #[test]
    fn loads_json_presets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vidascii.json");
        fs::write(
            &path,
            r#"{"presets": {"tiny": {"width": 20}}, "default_preset": "tiny"}"#,
        )
        .unwrap();
        let cfg = AppConfig::from_file(&path).unwrap();
        assert_eq!(cfg.preset("tiny").unwrap(), &Preset { width: 20, height: 0, step: 1 });
        assert!(cfg.preset("default").is_err());
    }

    #[test]
    fn rejects_missing_default_preset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"default_preset": "nope"}"#).unwrap();
        assert!(AppConfig::from_file(&path).is_err());
    }

    #[test]
    fn rejects_short_custom_ramp() {
        let cfg = AppConfig {
            glyph_ramp_no_block: Some("x".to_string()),
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn explicit_path_must_exist() {
        assert!(AppConfig::load(Some(Path::new("no/such/config.toml"))).is_err());
    }
}

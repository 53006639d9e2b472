use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::pack::PackLayout;
use crate::style::parse_hex_color;

/// Static presentation options, optionally read from a TOML file.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct VisualConfig {
    pub bold: bool,
    pub black_text: bool,
    pub text_shadow: bool,
    pub multicolor: bool,
    pub fallback_color: String,
    pub root_padding: f64,
    pub nested_padding: f64,
    pub transition_duration_ms: u64,
    pub slow_transition_duration_ms: u64,
    pub layout_width: f64,
    pub layout_height: f64,
    pub top_level_font_size: f32,
    pub nested_font_size: f32,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            bold: true,
            black_text: false,
            text_shadow: true,
            multicolor: true,
            fallback_color: "#0099cc".to_owned(),
            root_padding: 20.0,
            nested_padding: 5.0,
            transition_duration_ms: 750,
            slow_transition_duration_ms: 7500,
            layout_width: 1440.0,
            layout_height: 920.0,
            top_level_font_size: 30.0,
            nested_font_size: 20.0,
        }
    }
}

impl VisualConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml(&raw)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).context("failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if parse_hex_color(&self.fallback_color).is_none() {
            bail!("fallbackColor `{}` is not a #rrggbb color", self.fallback_color);
        }
        if !(self.root_padding >= 0.0 && self.nested_padding >= 0.0) {
            bail!("paddings must be non-negative");
        }
        if self.transition_duration_ms == 0 || self.slow_transition_duration_ms == 0 {
            bail!("transition durations must be positive");
        }
        if !(self.layout_width > 0.0 && self.layout_height > 0.0) {
            bail!("layout extent must be positive");
        }
        if !(self.top_level_font_size > 0.0 && self.nested_font_size > 0.0) {
            bail!("font sizes must be positive");
        }
        Ok(())
    }

    pub fn pack_layout(&self) -> PackLayout {
        PackLayout {
            width: self.layout_width,
            height: self.layout_height,
            root_padding: self.root_padding,
            nested_padding: self.nested_padding,
        }
    }

    pub fn transition_duration(&self, slow: bool) -> Duration {
        Duration::from_millis(if slow {
            self.slow_transition_duration_ms
        } else {
            self.transition_duration_ms
        })
    }
}

//! Shared configuration loader for the mmd toolchain.
//!
//! `defaults/mmd.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`MmdConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use mmd_babel::common::color::Color;
use mmd_babel::theme::Theme;
use mmd_babel::ExportOptions;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/mmd.default.toml");

/// Top-level configuration consumed by mmd applications.
#[derive(Debug, Clone, Deserialize)]
pub struct MmdConfig {
    pub export: ExportConfig,
    pub import: ImportConfig,
    pub theme: ThemeConfig,
}

/// Knobs shared by all exporters.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub max_heading_depth: usize,
    pub unfold_all: bool,
    pub draw_background: bool,
    pub generator: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    pub base_folder: String,
}

impl ImportConfig {
    /// Configured base folder; an empty value means "next to the input".
    pub fn base_folder(&self) -> Option<PathBuf> {
        let folder = self.base_folder.trim();
        (!folder.is_empty()).then(|| PathBuf::from(folder))
    }
}

/// Diagram palette and metrics for the SVG and PNG exporters.
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeConfig {
    #[serde(deserialize_with = "html_color")]
    pub paper_color: Color,
    #[serde(deserialize_with = "html_color")]
    pub root_fill: Color,
    #[serde(deserialize_with = "html_color")]
    pub first_level_fill: Color,
    #[serde(deserialize_with = "html_color")]
    pub other_level_fill: Color,
    #[serde(deserialize_with = "html_color")]
    pub root_text: Color,
    #[serde(deserialize_with = "html_color")]
    pub first_level_text: Color,
    #[serde(deserialize_with = "html_color")]
    pub other_level_text: Color,
    #[serde(deserialize_with = "html_color")]
    pub border_color: Color,
    #[serde(deserialize_with = "html_color")]
    pub connector_color: Color,
    #[serde(deserialize_with = "html_color")]
    pub jump_link_color: Color,
    pub connector_width: f32,
    pub border_width: f32,
    pub jump_link_width: f32,
    pub drop_shadow: bool,
    pub paper_margins: f32,
    pub text_margins: f32,
    pub font_family: String,
    pub font_size: f32,
    pub scale: f32,
}

fn html_color<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
    let text = String::deserialize(deserializer)?;
    Color::parse(&text).ok_or_else(|| D::Error::custom(format!("invalid color '{text}'")))
}

impl From<ThemeConfig> for Theme {
    fn from(config: ThemeConfig) -> Self {
        Theme {
            paper_color: config.paper_color,
            root_fill: config.root_fill,
            first_level_fill: config.first_level_fill,
            other_level_fill: config.other_level_fill,
            root_text: config.root_text,
            first_level_text: config.first_level_text,
            other_level_text: config.other_level_text,
            border_color: config.border_color,
            connector_color: config.connector_color,
            jump_link_color: config.jump_link_color,
            connector_width: config.connector_width,
            border_width: config.border_width,
            jump_link_width: config.jump_link_width,
            drop_shadow: config.drop_shadow,
            paper_margins: config.paper_margins,
            text_margins: config.text_margins,
            font_family: config.font_family,
            font_size: config.font_size,
            scale: config.scale,
            ..Theme::default()
        }
    }
}

impl From<ExportConfig> for ExportOptions {
    fn from(config: ExportConfig) -> Self {
        ExportOptions {
            max_heading_depth: config.max_heading_depth,
            unfold_all: config.unfold_all,
            draw_background: config.draw_background,
            generator: config.generator,
            ..ExportOptions::default()
        }
    }
}

impl MmdConfig {
    /// Export options with the configured theme applied.
    pub fn export_options(&self) -> ExportOptions {
        let options: ExportOptions = self.export.clone().into();
        ExportOptions {
            theme: self.theme.clone().into(),
            ..options
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<MmdConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<MmdConfig, ConfigError> {
    Loader::new().build()
}

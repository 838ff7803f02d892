//! Pipeline configuration
//!
//! Pipelines are described in TOML. The documented defaults in
//! `defaults/lexstack.default.toml` are compiled in and sit at the bottom of
//! every [`Loader`]; files, inline TOML and single-key overrides stack on top
//! before the result is deserialized into [`PipelineConfig`].
//!
//! A pipeline is an ordered list of layers. Each layer names either a raw
//! pattern or one of the built-in [`presets`].

use crate::tokenizer::{FlushPolicy, TokenizerOptions};
use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/lexstack.default.toml");

/// Top-level pipeline description.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Layers in application order; the first one reads the raw input.
    #[serde(default)]
    pub layers: Vec<LayerConfig>,
    pub options: OptionsConfig,
}

/// One tokenizer layer. Exactly one of `pattern` and `preset` must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LayerConfig {
    pub name: Option<String>,
    pub pattern: Option<String>,
    pub preset: Option<String>,
}

/// Options shared by every layer of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OptionsConfig {
    pub flush: FlushPolicy,
    pub elide_blank: bool,
}

impl From<OptionsConfig> for TokenizerOptions {
    fn from(options: OptionsConfig) -> Self {
        TokenizerOptions {
            flush: options.flush,
            elide_blank: options.elide_blank,
        }
    }
}

impl LayerConfig {
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            ..Self::default()
        }
    }

    pub fn preset(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            name: Some(name.clone()),
            preset: Some(name),
            ..Self::default()
        }
    }

    /// Display name: the explicit name, else the preset, else the pattern.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.preset.as_deref())
            .or(self.pattern.as_deref())
            .unwrap_or("<unnamed>")
    }
}

/// A named, ready-made pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub pattern: &'static str,
    pub description: &'static str,
}

static PRESETS: Lazy<BTreeMap<&'static str, Preset>> = Lazy::new(|| {
    [
        Preset {
            name: "number",
            pattern: r"[0-9]+",
            description: "Integer literals",
        },
        Preset {
            name: "identifier",
            pattern: r"[A-Za-z_][A-Za-z0-9_]*",
            description: "ASCII identifiers",
        },
        Preset {
            name: "operator",
            pattern: r"==|!=|<=|>=|&&|\|\||[-+*/%=<>!&|^]",
            description: "Arithmetic, comparison and logical operators",
        },
        Preset {
            name: "punctuation",
            pattern: r"[()\[\]{},;:.]",
            description: "Brackets and separators",
        },
        Preset {
            name: "string",
            pattern: r#""(?:[^"\\]|\\.)*""#,
            description: "Double-quoted strings with backslash escapes",
        },
        Preset {
            name: "whitespace",
            pattern: r"\s+",
            description: "Runs of whitespace",
        },
    ]
    .into_iter()
    .map(|preset| (preset.name, preset))
    .collect()
});

/// Look up a built-in preset by name.
pub fn preset(name: &str) -> Option<&'static Preset> {
    PRESETS.get(name)
}

/// All built-in presets, ordered by name.
pub fn presets() -> impl Iterator<Item = &'static Preset> {
    PRESETS.values()
}

/// Stacks TOML sources over the embedded defaults. Later sources win.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            builder: Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml)),
        }
    }

    /// Add a pipeline file; `build` fails if it does not exist.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.with_path(path.as_ref(), true)
    }

    /// Add a pipeline file that is skipped when absent.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.with_path(path.as_ref(), false)
    }

    fn with_path(mut self, path: &Path, required: bool) -> Self {
        tracing::debug!(path = %path.display(), required, "adding pipeline file");
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Add inline pipeline TOML.
    pub fn with_toml(mut self, toml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(toml, FileFormat::Toml));
        self
    }

    /// Force a single key, e.g. `options.flush`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let config: PipelineConfig = self.builder.build()?.try_deserialize()?;
        tracing::debug!(
            layers = config.layers.len(),
            flush = ?config.options.flush,
            elide_blank = config.options.elide_blank,
            "loaded pipeline configuration"
        );
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

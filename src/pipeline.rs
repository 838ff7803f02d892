//! Pipeline assembly and output
//!
//! Turns a [`PipelineConfig`] into a chain of layered tokenizers over one raw
//! source, and renders the resulting spans for humans or machines.

use crate::config::{self as settings, LayerConfig, PipelineConfig};
use crate::tokenizer::{CharSource, Span, TokenizeError, Tokenizer, TokenizerOptions};

/// Errors during pipeline assembly and rendering.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("the pipeline has no layers")]
    EmptyPipeline,

    #[error("layer '{0}' needs exactly one of `pattern` or `preset`")]
    AmbiguousLayer(String),

    #[error("unknown preset '{0}'")]
    UnknownPreset(String),

    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Output formats for span listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One span per line: kind, byte range, escaped text.
    Text,
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

/// Resolve a layer to the pattern it runs.
pub fn resolve_pattern(layer: &LayerConfig) -> Result<String, PipelineError> {
    match (&layer.pattern, &layer.preset) {
        (Some(pattern), None) => Ok(pattern.clone()),
        (None, Some(name)) => settings::preset(name)
            .map(|preset| preset.pattern.to_string())
            .ok_or_else(|| PipelineError::UnknownPreset(name.clone())),
        _ => Err(PipelineError::AmbiguousLayer(layer.label().to_string())),
    }
}

/// Build the tokenizer chain described by `config` over `source`.
///
/// The first layer reads `source`; each following layer re-scans the spans
/// left unrecognized by the one before it.
pub fn build<S: CharSource>(
    source: S,
    config: &PipelineConfig,
) -> Result<Tokenizer<S>, PipelineError> {
    let options = TokenizerOptions::from(config.options);
    let (first, rest) = config
        .layers
        .split_first()
        .ok_or(PipelineError::EmptyPipeline)?;

    let mut tokenizer = Tokenizer::new(source, &resolve_pattern(first)?)?.with_options(options);
    for layer in rest {
        tokenizer = Tokenizer::layered(tokenizer, &resolve_pattern(layer)?)?;
    }

    tracing::debug!(layers = config.layers.len(), "built pipeline");
    Ok(tokenizer)
}

/// Render spans in the requested format.
pub fn render(spans: &[Span], format: OutputFormat) -> Result<String, PipelineError> {
    match format {
        OutputFormat::Text => Ok(render_text(spans)),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(spans)?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Yaml => Ok(serde_yaml::to_string(spans)?),
    }
}

fn render_text(spans: &[Span]) -> String {
    let mut out = String::new();
    for span in spans {
        let range = span.range();
        out.push_str(&format!(
            "{:<5} {:>5}..{:<5} {:?}\n",
            span.kind(),
            range.start,
            range.end,
            span.text()
        ));
    }
    out
}

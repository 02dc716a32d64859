pub mod canvas;
pub mod color;
pub mod config;
pub mod header;
pub mod layout;
pub mod output;
pub mod plots;
pub mod primitives;
pub mod text;
pub mod theme;

use config::VizConfig;
use output::OutputFormat;
use thiserror::Error;

pub use output::book::PageBook;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown artifact kind: {0}")]
    UnknownKind(String),
    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("layout error: {0}")]
    Layout(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "pdf")]
    #[error("PDF conversion error: {0}")]
    Pdf(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Artifact kinds understood by [`render_svg`].
pub const KINDS: &[&str] = &["page", "resolution", "slices", "quantile_bins"];

/// Render an artifact JSON to SVG string.
pub fn render_svg(artifact_json: &str, kind: &str, config: &VizConfig) -> Result<String> {
    let svg = match kind {
        "page" => {
            let art: cp_viz::PageArtifact = serde_json::from_str(artifact_json)?;
            plots::page::render(&art, config)?
        }
        "resolution" => {
            let art: cp_viz::ResolutionArtifact = serde_json::from_str(artifact_json)?;
            plots::resolution::render(&art, config)?
        }
        "slices" => {
            let art: cp_viz::SlicesArtifact = serde_json::from_str(artifact_json)?;
            plots::slices::render(&art, config)?
        }
        "quantile_bins" | "bins" => {
            let art: cp_viz::QuantileBinsArtifact = serde_json::from_str(artifact_json)?;
            plots::bins::render(&art, config)?
        }
        other => return Err(RenderError::UnknownKind(other.to_string())),
    };
    Ok(svg)
}

/// Render an artifact JSON to bytes in the specified format.
pub fn render_to_bytes(artifact_json: &str, kind: &str, format: &str, config: &VizConfig) -> Result<Vec<u8>> {
    let format: OutputFormat = format.parse()?;
    format.encode(render_svg(artifact_json, kind, config)?)
}

/// Render an artifact JSON to a file (format inferred from extension).
pub fn render_to_file(artifact_json: &str, kind: &str, path: &std::path::Path, config: &VizConfig) -> Result<()> {
    let format = OutputFormat::from_path(path)?;
    let bytes = format.encode(render_svg(artifact_json, kind, config)?)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

use anyhow::{Context, Result};
use cp_viz::{PageArtifact, QuantileBinsArtifact, ResolutionArtifact, SlicesArtifact};
use cp_viz_render::config::{VizConfig, resolve_config};
use cp_viz_render::output::OutputFormat;
use cp_viz_render::{PageBook, plots};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Artifacts the renderer can draw directly.
pub trait Drawable: Serialize {
    fn draw(&self, config: &VizConfig) -> cp_viz_render::Result<String>;
}

impl Drawable for PageArtifact {
    fn draw(&self, config: &VizConfig) -> cp_viz_render::Result<String> {
        plots::page::render(self, config)
    }
}

impl Drawable for ResolutionArtifact {
    fn draw(&self, config: &VizConfig) -> cp_viz_render::Result<String> {
        plots::resolution::render(self, config)
    }
}

impl Drawable for SlicesArtifact {
    fn draw(&self, config: &VizConfig) -> cp_viz_render::Result<String> {
        plots::slices::render(self, config)
    }
}

impl Drawable for QuantileBinsArtifact {
    fn draw(&self, config: &VizConfig) -> cp_viz_render::Result<String> {
        plots::bins::render(self, config)
    }
}

/// Style, output format and output directory shared by every command.
pub struct Renderer {
    pub config: VizConfig,
    pub format: OutputFormat,
    dir: PathBuf,
}

impl Renderer {
    pub fn new(theme: Option<&str>, config_path: Option<&PathBuf>, format: Option<&str>, dir: &Path) -> Result<Self> {
        let config = load_config(theme, config_path)?;
        let format: OutputFormat = format.unwrap_or(&config.output.format).parse()?;
        std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
        Ok(Self { config, format, dir: dir.to_path_buf() })
    }

    pub fn path(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{stem}.{}", self.format.extension()))
    }

    /// Draw `artifact` and write it to `<dir>/<stem>.<ext>`.
    pub fn write<T: Drawable>(&self, artifact: &T, stem: &str) -> Result<PathBuf> {
        let bytes = self.format.encode(artifact.draw(&self.config)?)?;
        let path = self.path(stem);
        std::fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote");
        Ok(path)
    }

    /// Write `artifact` as pretty JSON to `<dir>/<stem>.json`.
    pub fn write_json<T: Serialize>(&self, artifact: &T, stem: &str) -> Result<PathBuf> {
        let path = self.dir.join(format!("{stem}.json"));
        std::fs::write(&path, serde_json::to_string_pretty(artifact)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn book(&self, stem: &str) -> PageBook {
        PageBook::new(&self.dir, stem, self.format)
    }
}

fn load_config(theme: Option<&str>, config_path: Option<&PathBuf>) -> Result<VizConfig> {
    let mut doc = match config_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_yaml_ng::from_str(&raw).with_context(|| format!("failed to parse config YAML {}", path.display()))?
        }
        None => serde_yaml_ng::Value::Null,
    };
    if let Some(theme) = theme {
        if !doc.is_mapping() {
            doc = serde_yaml_ng::Value::Mapping(Default::default());
        }
        if let Some(map) = doc.as_mapping_mut() {
            map.insert("theme".into(), theme.into());
        }
    }
    let yaml = serde_yaml_ng::to_string(&doc)?;
    Ok(resolve_config(Some(&yaml))?)
}

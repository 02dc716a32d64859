use serde::{Deserialize, Serialize};

use crate::color::{Color, Colormap};
use crate::theme::BuiltinTheme;

/// Top-level rendering configuration (YAML or programmatic).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    pub theme: String,
    pub figure: FigureConfig,
    pub font: FontConfig,
    pub axes: AxesConfig,
    pub grid: GridConfig,
    pub experiment: ExperimentConfig,
    pub colors: ColorsConfig,
    pub palette: String,
    pub colormap: String,
    pub output: OutputConfig,
}

impl Default for VizConfig {
    fn default() -> Self {
        BuiltinTheme::Clas12.base_config()
    }
}

impl VizConfig {
    pub fn palette_colors(&self) -> Vec<Color> {
        crate::color::palette_colors(&self.palette)
    }

    pub fn colormap(&self) -> Colormap {
        Colormap::parse(&self.colormap)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    /// Width of single-panel plots.
    pub width: f64,
    pub height: f64,
    /// Size of one cell of a multi-panel page.
    pub panel_width: f64,
    pub panel_height: f64,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: 432.0,  // 6" * 72
            height: 288.0, // 4" * 72
            panel_width: 288.0,
            panel_height: 216.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub size: f64,
    pub label_size: f64,
    pub tick_size: f64,
    pub title_size: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self { size: 10.0, label_size: 11.0, tick_size: 8.5, title_size: 12.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesConfig {
    pub tick_direction: String,
    pub show_top_ticks: bool,
    pub show_right_ticks: bool,
    pub tick_length: f64,
    pub minor_tick_length: f64,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            tick_direction: "in".into(),
            show_top_ticks: true,
            show_right_ticks: true,
            tick_length: 5.0,
            minor_tick_length: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub show: bool,
    pub color: Color,
    pub alpha: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { show: true, color: Color::rgb(128, 128, 128), alpha: 0.2 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub name: String,
    pub status: String,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self { name: "CLAS12".into(), status: "Preliminary".into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    /// Data series and markers.
    pub data: Color,
    /// Simulation series.
    pub sim: Color,
    /// Fill of single histograms.
    pub fill: Color,
    /// Fitted Gaussian curves.
    pub fit: Color,
    pub zero_line: Color,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            data: Color::BLACK,
            sim: Color::rgb(255, 0, 0),
            fill: crate::color::root_color(55).unwrap_or(Color::BLACK).with_alpha(0.65),
            fit: Color::rgb(255, 0, 0),
            zero_line: Color::rgb(128, 128, 128),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { format: "pdf".into() }
    }
}

/// Resolve a VizConfig from an optional YAML string.
///
/// Keys missing from the YAML take the defaults of the theme it names
/// (`theme: root`), or of the CLAS12 theme.
pub fn resolve_config(user_yaml: Option<&str>) -> crate::Result<VizConfig> {
    let Some(yaml) = user_yaml else {
        return Ok(VizConfig::default());
    };
    let value: serde_yaml_ng::Value =
        serde_yaml_ng::from_str(yaml).map_err(|e| crate::RenderError::Config(e.to_string()))?;
    let theme = value.get("theme").and_then(|t| t.as_str()).map(BuiltinTheme::parse).unwrap_or(BuiltinTheme::Clas12);
    if value.is_null() {
        return Ok(theme.base_config());
    }

    let mut merged =
        serde_yaml_ng::to_value(theme.base_config()).map_err(|e| crate::RenderError::Config(e.to_string()))?;
    merge_yaml(&mut merged, value);
    serde_yaml_ng::from_value(merged).map_err(|e| crate::RenderError::Config(e.to_string()))
}

fn merge_yaml(base: &mut serde_yaml_ng::Value, over: serde_yaml_ng::Value) {
    use serde_yaml_ng::Value;
    match (base, over) {
        (Value::Mapping(b), Value::Mapping(o)) => {
            for (k, v) in o {
                match b.get_mut(&k) {
                    Some(slot) => merge_yaml(slot, v),
                    None => {
                        b.insert(k, v);
                    }
                }
            }
        }
        (slot, v) => *slot = v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_yaml() {
        let c = resolve_config(None).unwrap();
        assert_eq!(c.theme, "clas12");
        assert_eq!(c.experiment.name, "CLAS12");
        assert_eq!(c.output.format, "pdf");
    }

    #[test]
    fn yaml_overrides_single_keys() {
        let c = resolve_config(Some("font:\n  tick_size: 7\ncolors:\n  sim: \"#1f77b4\"\n")).unwrap();
        assert_eq!(c.font.tick_size, 7.0);
        assert_eq!(c.font.label_size, FontConfig::default().label_size);
        assert_eq!(c.colors.sim, Color::hex("#1f77b4"));
        assert!((c.colors.fill.a - 0.65).abs() < 0.01);
    }

    #[test]
    fn theme_key_selects_base() {
        let c = resolve_config(Some("theme: minimal\ngrid:\n  alpha: 0.5\n")).unwrap();
        assert_eq!(c.axes.tick_direction, "out");
        assert!(c.experiment.name.is_empty());
        assert_eq!(c.grid.alpha, 0.5);
        assert!(resolve_config(Some("")).is_ok());
    }

    #[test]
    fn bad_yaml_is_a_config_error() {
        let err = resolve_config(Some("colors:\n  data: not-a-color\n")).unwrap_err();
        assert!(matches!(err, crate::RenderError::Config(_)));
    }
}

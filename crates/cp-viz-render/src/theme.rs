use crate::color::Color;
use crate::config::*;

/// Built-in theme presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTheme {
    Clas12,
    Root,
    Minimal,
}

impl BuiltinTheme {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "root" => Self::Root,
            "minimal" => Self::Minimal,
            _ => Self::Clas12,
        }
    }

    pub fn base_config(self) -> VizConfig {
        match self {
            Self::Clas12 => clas12(),
            Self::Root => root(),
            Self::Minimal => minimal(),
        }
    }
}

fn clas12() -> VizConfig {
    VizConfig {
        theme: "clas12".into(),
        figure: FigureConfig::default(),
        font: FontConfig::default(),
        axes: AxesConfig::default(),
        grid: GridConfig::default(),
        experiment: ExperimentConfig::default(),
        colors: ColorsConfig::default(),
        palette: "clas12".into(),
        colormap: "bird".into(),
        output: OutputConfig::default(),
    }
}

/// Close to a default ROOT canvas: no grid, no header, ticks on all sides.
fn root() -> VizConfig {
    VizConfig {
        theme: "root".into(),
        figure: FigureConfig { width: 500.0, height: 360.0, panel_width: 300.0, panel_height: 225.0 },
        font: FontConfig { size: 10.0, label_size: 11.0, tick_size: 9.0, title_size: 11.0 },
        axes: AxesConfig {
            tick_direction: "in".into(),
            show_top_ticks: true,
            show_right_ticks: true,
            tick_length: 6.0,
            minor_tick_length: 3.0,
        },
        grid: GridConfig { show: false, ..GridConfig::default() },
        experiment: ExperimentConfig { name: String::new(), status: String::new() },
        ..clas12()
    }
}

fn minimal() -> VizConfig {
    VizConfig {
        theme: "minimal".into(),
        font: FontConfig { size: 9.0, label_size: 10.0, tick_size: 8.0, title_size: 10.0 },
        axes: AxesConfig {
            tick_direction: "out".into(),
            show_top_ticks: false,
            show_right_ticks: false,
            tick_length: 4.0,
            minor_tick_length: 2.0,
        },
        grid: GridConfig { show: false, color: Color::rgb(200, 200, 200), alpha: 0.5 },
        experiment: ExperimentConfig { name: String::new(), status: String::new() },
        palette: "tableau10".into(),
        colormap: "viridis".into(),
        ..clas12()
    }
}

use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::layout::axes::Axis;
use crate::primitives::TextStyle;

/// Rectangular plot area within the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Fit an axes box into `cell`, leaving room for tick labels, axis
    /// labels and a panel title.
    pub fn inside(cell: &PlotArea, canvas: &Canvas, y_axis: &Axis, x_axis: &Axis, title: bool, config: &VizConfig) -> Self {
        let tick_style = TextStyle::sized(config.font.tick_size);

        let max_tick_w = y_axis
            .tick_labels
            .iter()
            .map(|l| canvas.measure_text(l, &tick_style).width)
            .fold(0.0_f64, f64::max);
        let mut left = 10.0 + max_tick_w + 6.0;
        if !y_axis.label.is_empty() {
            left += config.font.label_size + 6.0;
        }

        let mut bottom = 8.0 + config.font.tick_size + 6.0;
        if !x_axis.label.is_empty() {
            bottom += config.font.label_size + 6.0;
        }

        let top = if title { config.font.size * 1.2 + 8.0 } else { 8.0 };
        let right = 12.0;

        Self {
            left: cell.left + left,
            top: cell.top + top,
            width: (cell.width - left - right).max(20.0),
            height: (cell.height - top - bottom).max(20.0),
        }
    }

    /// Manual margins (for multi-panel layouts).
    pub fn manual(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }
}

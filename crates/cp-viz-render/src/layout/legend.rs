use crate::canvas::Canvas;
use crate::color::Color;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

pub struct LegendEntry {
    pub label: String,
    pub color: Color,
    pub kind: LegendKind,
}

pub enum LegendKind {
    FilledRect,
    Line,
    Marker,
}

/// Draw a legend in the top-right corner of the plot area.
pub fn draw_legend(canvas: &mut Canvas, area: &PlotArea, entries: &[LegendEntry], font_size: f64, frame: bool) {
    if entries.is_empty() {
        return;
    }

    let row_height = font_size + 3.0;
    let swatch_w = 14.0;
    let swatch_h = font_size - 2.0;
    let gap = 5.0;
    let padding = 4.0;

    let text_style = TextStyle { size: font_size * 0.85, baseline: TextBaseline::Central, ..Default::default() };

    let max_w = entries.iter().map(|e| canvas.measure_text(&e.label, &text_style).width).fold(0.0_f64, f64::max);

    let legend_w = padding + swatch_w + gap + max_w + padding;
    let legend_h = padding + entries.len() as f64 * row_height + padding;

    let lx = area.right() - legend_w - 4.0;
    let ly = area.top + 4.0;

    if frame {
        let bg_style = Style::filled(Color::WHITE.with_alpha(0.9)).with_stroke(Color::rgb(200, 200, 200), 0.5);
        canvas.rect(lx, ly, legend_w, legend_h, &bg_style);
    }

    for (i, entry) in entries.iter().enumerate() {
        let ey = ly + padding + i as f64 * row_height + row_height / 2.0;
        let sx = lx + padding;

        match entry.kind {
            LegendKind::FilledRect => {
                canvas.rect(sx, ey - swatch_h / 2.0, swatch_w, swatch_h, &Style::filled(entry.color));
            }
            LegendKind::Line => {
                canvas.line(sx, ey, sx + swatch_w, ey, &LineStyle::solid(entry.color, 1.5));
            }
            LegendKind::Marker => {
                canvas.marker(sx + swatch_w / 2.0, ey, &MarkerStyle { color: entry.color, ..Default::default() });
            }
        }

        canvas.text(sx + swatch_w + gap, ey, &entry.label, &text_style);
    }
}

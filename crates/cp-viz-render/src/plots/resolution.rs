use cp_viz::resolution::{ResolutionArtifact, ResolutionPanel};

use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::VizConfig;
use crate::layout::axes::Axis;
use crate::layout::legend::{LegendEntry, LegendKind, draw_legend};
use crate::layout::margins::PlotArea;
use crate::plots::axes_draw::{draw_axes, draw_panel_title};
use crate::plots::page_canvas;
use crate::primitives::*;

/// Six sector panels on three rows; each point is a slice mean with its
/// fitted width as the error bar.
pub fn render(artifact: &ResolutionArtifact, config: &VizConfig) -> crate::Result<String> {
    let (mut canvas, grid) = page_canvas(3, 2, "", config);
    let (x_lo, x_hi) = x_limits(artifact);
    let x_axis = Axis::fixed_linear(x_lo, x_hi, 5).with_label(artifact.x_label.as_str());

    for (i, panel) in artifact.panels.iter().enumerate() {
        let Some(cell) = grid.cell(i) else {
            log::warn!("resolution '{}': no room for sector {}", artifact.name, panel.sector);
            continue;
        };
        let y_axis = y_axis(artifact, panel).with_label(artifact.y_label.as_str());
        let area = PlotArea::inside(cell, &canvas, &y_axis, &x_axis, !artifact.title.is_empty(), config);
        draw_axes(&mut canvas, &area, &x_axis, &y_axis, config);
        draw_panel_title(&mut canvas, &area, &artifact.title, config);
        draw_resolution_panel(&mut canvas, &area, &x_axis, &y_axis, panel, config);
    }
    Ok(canvas.finish_svg())
}

fn series_color(i: usize, config: &VizConfig) -> Color {
    match i {
        0 => config.colors.data,
        1 => config.colors.sim,
        _ => {
            let palette = config.palette_colors();
            palette.get(i % palette.len().max(1)).copied().unwrap_or(Color::BLACK)
        }
    }
}

fn draw_resolution_panel(
    canvas: &mut Canvas,
    area: &PlotArea,
    x_axis: &Axis,
    y_axis: &Axis,
    panel: &ResolutionPanel,
    config: &VizConfig,
) {
    let px = |x: f64| x_axis.data_to_pixel(x, area.left, area.right());
    let py = |y: f64| y_axis.data_to_pixel(y, area.bottom(), area.top);

    canvas.push_clip(area.left, area.top, area.width, area.height);
    if y_axis.min < 0.0 && y_axis.max > 0.0 {
        canvas.line(area.left, py(0.0), area.right(), py(0.0), &LineStyle::dashed(config.colors.zero_line, 0.8));
    }
    for (i, s) in panel.series.iter().enumerate() {
        let color = series_color(i, config);
        let bar = LineStyle::solid(color, 0.9);
        let marker = MarkerStyle { color, ..Default::default() };
        for ((&x, &mean), &width) in s.x.iter().zip(&s.mean).zip(&s.width) {
            canvas.error_bar(px(x), py(mean - width), py(mean + width), 4.0, &bar);
            canvas.marker(px(x), py(mean), &marker);
        }
    }
    canvas.pop_clip();

    let entries: Vec<LegendEntry> = panel
        .series
        .iter()
        .enumerate()
        .map(|(i, s)| LegendEntry { label: s.label.clone(), color: series_color(i, config), kind: LegendKind::Marker })
        .collect();
    draw_legend(canvas, area, &entries, config.font.tick_size, false);
}

/// Shared x range of all panels, padded by half a slice spacing.
fn x_limits(artifact: &ResolutionArtifact) -> (f64, f64) {
    let xs = artifact.panels.iter().flat_map(|p| &p.series).flat_map(|s| s.x.iter().copied());
    let (lo, hi) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(x), hi.max(x)));
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if hi > lo { 0.1 * (hi - lo) } else { 0.5 };
    (lo - pad, hi + pad)
}

fn y_axis(artifact: &ResolutionArtifact, panel: &ResolutionPanel) -> Axis {
    if let Some([lo, hi]) = artifact.y_range {
        return Axis::fixed_linear(lo, hi, 5);
    }
    let (lo, hi) = panel
        .series
        .iter()
        .flat_map(|s| s.mean.iter().zip(&s.width))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (&m, &w)| (lo.min(m - w), hi.max(m + w)));
    if lo.is_finite() && hi > lo { Axis::auto_linear(lo, hi, 5) } else { Axis::fixed_linear(-1.0, 1.0, 5) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cp_viz::resolution::ResolutionSeries;

    fn artifact(y_range: Option<[f64; 2]>) -> ResolutionArtifact {
        let series = |label: &str, offset: f64| ResolutionSeries {
            label: label.to_string(),
            x: vec![6.5, 7.5, 8.5],
            mean: vec![offset, 0.1 + offset, -0.1 + offset],
            width: vec![0.2, 0.2, 0.3],
            mean_err: vec![0.01; 3],
            width_err: vec![0.01; 3],
            n_dropped: 0,
        };
        ResolutionArtifact {
            schema_version: cp_viz::SCHEMA_VERSION.to_string(),
            name: "theta_electron_delta_p_electron".into(),
            title: "#Delta P_{e} from #theta_{e}".into(),
            x_label: "#theta_{e}".into(),
            y_label: "#Delta P_{e}".into(),
            y_range,
            panels: (1..=6)
                .map(|s| ResolutionPanel {
                    sector: s,
                    series: vec![series(&format!("Sector {s} (Data)"), 0.0), series(&format!("Sector {s} (Sim)"), 0.05)],
                })
                .collect(),
        }
    }

    #[test]
    fn draws_every_point_with_legend() {
        let svg = render(&artifact(Some([-0.8, 0.8])), &VizConfig::default()).unwrap();
        // 6 panels × 2 series × 3 points, plus 2 legend markers per panel.
        assert_eq!(svg.matches("<circle").count(), 36 + 12);
        assert!(svg.contains("Sector 6 (Sim)"));
        assert!(svg.contains(r#"stroke-dasharray="6 3""#));
    }

    #[test]
    fn limits() {
        let art = artifact(None);
        let (lo, hi) = x_limits(&art);
        assert!((lo - 6.3).abs() < 1e-9 && (hi - 8.7).abs() < 1e-9);
        let y = y_axis(&art, &art.panels[0]);
        assert!(y.min <= -0.4 && y.max >= 0.35);
    }
}

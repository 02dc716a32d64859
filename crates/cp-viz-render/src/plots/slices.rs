use cp_viz::series::{BinnedSeries, SeriesStyle};
use cp_viz::slices::{SlicePanel, SlicesArtifact};

use crate::config::VizConfig;
use crate::layout::grid::grid_for;
use crate::layout::margins::PlotArea;
use crate::plots::axes_draw::{draw_axes, draw_panel_title};
use crate::plots::page_canvas;
use crate::plots::panel::{draw_series, series_axes};
use crate::primitives::*;

const COLUMNS: usize = 3;
/// Samples of the drawn Gaussian.
const CURVE_POINTS: usize = 120;

/// One panel per slice projection with its fitted Gaussian over the fit
/// range.
pub fn render(artifact: &SlicesArtifact, config: &VizConfig) -> crate::Result<String> {
    let (rows, cols) = grid_for(artifact.panels.len(), COLUMNS);
    let (mut canvas, grid) = page_canvas(rows, cols, &artifact.title, config);

    for (i, panel) in artifact.panels.iter().enumerate() {
        let Some(cell) = grid.cell(i) else { break };
        let series = BinnedSeries {
            label: None,
            edges: panel.edges.clone(),
            contents: panel.contents.clone(),
            errors: panel.errors.clone(),
            color: None,
            fill: None,
            style: SeriesStyle::Bars,
        };
        let (x_axis, y_axis) = series_axes(std::slice::from_ref(&series), None, None);
        let area = PlotArea::inside(cell, &canvas, &y_axis, &x_axis, true, config);
        draw_axes(&mut canvas, &area, &x_axis, &y_axis, config);
        draw_panel_title(&mut canvas, &area, &panel.title, config);

        canvas.push_clip(area.left, area.top, area.width, area.height);
        draw_series(&mut canvas, &area, &x_axis, &y_axis, &series, config.colors.data, config);
        let curve = curve_points(panel);
        let pixels: Vec<(f64, f64)> = curve
            .iter()
            .map(|&(x, y)| {
                (x_axis.data_to_pixel(x, area.left, area.right()), y_axis.data_to_pixel(y, area.bottom(), area.top))
            })
            .collect();
        canvas.polyline(&pixels, &LineStyle::solid(config.colors.fit, 1.2));
        canvas.pop_clip();

        let fit = &panel.fit;
        let style = TextStyle::sized(config.font.tick_size).anchored(TextAnchor::End, TextBaseline::Hanging);
        let lines = [format!("#mu = {:.4}", fit.mean), format!("#sigma = {:.4}", fit.sigma)];
        for (k, line) in lines.iter().enumerate() {
            canvas.text(area.right() - 4.0, area.top + 4.0 + k as f64 * (config.font.tick_size + 2.0), line, &style);
        }
    }
    Ok(canvas.finish_svg())
}

/// The fitted Gaussian sampled across its fit range; empty for a
/// degenerate fit.
fn curve_points(panel: &SlicePanel) -> Vec<(f64, f64)> {
    let [lo, hi] = panel.fit.range;
    if panel.fit.sigma <= 0.0 || !(hi > lo) {
        return Vec::new();
    }
    (0..=CURVE_POINTS)
        .map(|i| {
            let x = lo + (hi - lo) * i as f64 / CURVE_POINTS as f64;
            (x, panel.fit.eval(x))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cp_fit::FitStatus;
    use cp_viz::slices::FitCurve;

    fn panel(sigma: f64) -> SlicePanel {
        SlicePanel {
            title: "[6.000, 6.500]".into(),
            x_low: 6.0,
            x_high: 6.5,
            edges: vec![-1.0, -0.5, 0.0, 0.5, 1.0],
            contents: vec![1.0, 8.0, 9.0, 2.0],
            errors: vec![1.0, 2.8, 3.0, 1.4],
            fit: FitCurve { amplitude: 9.0, mean: 0.0, sigma, chi2_ndf: 1.1, range: [-0.6, 0.6], status: FitStatus::Converged },
        }
    }

    #[test]
    fn curve_spans_fit_range() {
        let pts = curve_points(&panel(0.3));
        assert_eq!(pts.len(), CURVE_POINTS + 1);
        assert_eq!(pts[0].0, -0.6);
        assert!((pts[CURVE_POINTS].0 - 0.6).abs() < 1e-12);
        assert!((pts[CURVE_POINTS / 2].1 - 9.0).abs() < 1e-9);
        assert!(curve_points(&panel(0.0)).is_empty());
    }

    #[test]
    fn seven_slices_make_three_rows() {
        let art = SlicesArtifact {
            schema_version: cp_viz::SCHEMA_VERSION.to_string(),
            title: "#Delta P_{e}".into(),
            name: "slices".into(),
            panels: (0..7).map(|_| panel(0.3)).collect(),
        };
        let config = VizConfig::default();
        let svg = render(&art, &config).unwrap();
        let height = crate::header::header_height(&config, &art.title) + 3.0 * config.figure.panel_height;
        assert!(svg.contains(&format!(r#"height="{height}""#)));
        assert_eq!(svg.matches("<polyline").count(), 7);
        assert!(svg.contains("σ = 0.3000"));
    }
}

//! Drawing of single page panels: 1-D series, heat maps and placeholders.

use cp_viz::page::{Annotation, PanelArtifact, PanelContent};
use cp_viz::series::{BinnedSeries, HeatMap, SeriesStyle};

use crate::canvas::{Canvas, color_or};
use crate::color::Color;
use crate::config::VizConfig;
use crate::layout::axes::Axis;
use crate::layout::legend::{LegendEntry, LegendKind, draw_legend};
use crate::layout::margins::PlotArea;
use crate::plots::axes_draw::{draw_axes, draw_frame, draw_panel_title};
use crate::primitives::*;

const COLORBAR_WIDTH: f64 = 10.0;
const COLORBAR_GAP: f64 = 6.0;
/// Room for colorbar tick labels.
const COLORBAR_LABELS: f64 = 30.0;

/// Draw `panel` inside `cell`.
pub fn draw_panel(canvas: &mut Canvas, cell: &PlotArea, panel: &PanelArtifact, config: &VizConfig) {
    match &panel.content {
        PanelContent::Series { series, x_range, y_range, legend } => {
            let (x_axis, y_axis) = series_axes(series, *x_range, *y_range);
            let x_axis = x_axis.with_label(panel.x_label.as_str());
            let y_axis = y_axis.with_label(panel.y_label.as_str());
            let area = PlotArea::inside(cell, canvas, &y_axis, &x_axis, !panel.title.is_empty(), config);
            draw_axes(canvas, &area, &x_axis, &y_axis, config);
            draw_panel_title(canvas, &area, &panel.title, config);

            canvas.push_clip(area.left, area.top, area.width, area.height);
            let palette = config.palette_colors();
            for (i, s) in series.iter().enumerate() {
                let fallback = palette.get(i % palette.len().max(1)).copied().unwrap_or(config.colors.data);
                draw_series(canvas, &area, &x_axis, &y_axis, s, fallback, config);
            }
            canvas.pop_clip();

            if *legend {
                let entries: Vec<LegendEntry> = series
                    .iter()
                    .enumerate()
                    .filter_map(|(i, s)| {
                        let label = s.label.clone()?;
                        let fallback = palette.get(i % palette.len().max(1)).copied().unwrap_or(config.colors.data);
                        let (color, kind) = legend_swatch(s, fallback, config);
                        Some(LegendEntry { label, color, kind })
                    })
                    .collect();
                draw_legend(canvas, &area, &entries, config.font.tick_size, false);
            }
            draw_annotations(canvas, &area, &panel.annotations, *legend, config);
        }
        PanelContent::HeatMap { map, logz, z_range } => {
            draw_heat_map(canvas, cell, panel, map, *logz, *z_range, config);
        }
        PanelContent::Empty { reason } => {
            let area = PlotArea::inside(cell, canvas, &Axis::fixed_linear(0.0, 1.0, 2), &Axis::fixed_linear(0.0, 1.0, 2), true, config);
            draw_frame(canvas, &area);
            draw_panel_title(canvas, &area, &panel.title, config);
            let style = TextStyle::sized(config.font.size)
                .anchored(TextAnchor::Middle, TextBaseline::Central)
                .colored(Color::rgb(120, 120, 120));
            canvas.text(area.left + area.width / 2.0, area.top + area.height / 2.0, reason, &style);
        }
    }
}

/// Axes spanning every series' edges and contents (plus errors), unless
/// fixed ranges are given.
pub(crate) fn series_axes(series: &[BinnedSeries], x_range: Option<[f64; 2]>, y_range: Option<[f64; 2]>) -> (Axis, Axis) {
    let x_axis = match x_range {
        Some([lo, hi]) => Axis::fixed_linear(lo, hi, 6),
        None => {
            let lo = series.iter().filter_map(|s| s.edges.first().copied()).fold(f64::INFINITY, f64::min);
            let hi = series.iter().filter_map(|s| s.edges.last().copied()).fold(f64::NEG_INFINITY, f64::max);
            if lo.is_finite() && hi.is_finite() { Axis::fixed_linear(lo, hi, 6) } else { Axis::fixed_linear(0.0, 1.0, 6) }
        }
    };

    let y_axis = match y_range {
        Some([lo, hi]) => Axis::fixed_linear(lo, hi, 5),
        None => {
            let mut lo = 0.0_f64;
            let mut hi = f64::NEG_INFINITY;
            for s in series {
                for (i, &c) in s.contents.iter().enumerate() {
                    if !c.is_finite() {
                        continue;
                    }
                    let e = if s.style == SeriesStyle::Points { s.errors.get(i).copied().unwrap_or(0.0) } else { 0.0 };
                    lo = lo.min(c - e);
                    hi = hi.max(c + e);
                }
            }
            if !hi.is_finite() || hi <= lo {
                hi = lo + 1.0;
            }
            Axis::fixed_linear(lo, hi + 0.1 * (hi - lo), 5)
        }
    };
    (x_axis, y_axis)
}

fn line_color(s: &BinnedSeries, fallback: Color) -> Color {
    color_or(s.color.as_deref(), fallback)
}

fn fill_color(s: &BinnedSeries, config: &VizConfig) -> Color {
    color_or(s.fill.as_deref(), config.colors.fill)
}

fn legend_swatch(s: &BinnedSeries, fallback: Color, config: &VizConfig) -> (Color, LegendKind) {
    match s.style {
        SeriesStyle::Bars => (fill_color(s, config), LegendKind::FilledRect),
        SeriesStyle::Step => (line_color(s, fallback), LegendKind::Line),
        SeriesStyle::Points => (line_color(s, fallback), LegendKind::Marker),
    }
}

/// Draw one series in data coordinates of `x_axis`/`y_axis`.
pub(crate) fn draw_series(
    canvas: &mut Canvas,
    area: &PlotArea,
    x_axis: &Axis,
    y_axis: &Axis,
    s: &BinnedSeries,
    fallback: Color,
    config: &VizConfig,
) {
    let px = |x: f64| x_axis.data_to_pixel(x, area.left, area.right());
    let py = |y: f64| y_axis.data_to_pixel(y, area.bottom(), area.top);
    let n = s.contents.len().min(s.edges.len().saturating_sub(1));
    let base = py(0.0_f64.clamp(y_axis.min, y_axis.max));

    match s.style {
        SeriesStyle::Bars => {
            let style = match &s.color {
                Some(_) => Style::filled(fill_color(s, config)).with_stroke(line_color(s, fallback), 0.6),
                None => Style::filled(fill_color(s, config)),
            };
            for i in 0..n {
                let c = s.contents[i];
                if !c.is_finite() || c == 0.0 {
                    continue;
                }
                let x0 = px(s.edges[i]);
                let x1 = px(s.edges[i + 1]);
                let y = py(c);
                canvas.rect(x0, y, x1 - x0, base - y, &style);
            }
        }
        SeriesStyle::Step => {
            let mut points = Vec::with_capacity(2 * n + 2);
            for i in 0..n {
                let c = if s.contents[i].is_finite() { s.contents[i] } else { 0.0 };
                let y = py(c);
                if i == 0 {
                    points.push((px(s.edges[0]), base));
                }
                points.push((px(s.edges[i]), y));
                points.push((px(s.edges[i + 1]), y));
            }
            if n > 0 {
                points.push((px(s.edges[n]), base));
            }
            canvas.polyline(&points, &LineStyle::solid(line_color(s, fallback), 1.2));
        }
        SeriesStyle::Points => {
            let color = line_color(s, fallback);
            let marker = MarkerStyle { color, ..Default::default() };
            let bar = LineStyle::solid(color, 0.8);
            for (i, x) in s.centers().into_iter().enumerate().take(n) {
                let c = s.contents[i];
                if !c.is_finite() {
                    continue;
                }
                let e = s.errors.get(i).copied().unwrap_or(0.0);
                if e > 0.0 {
                    canvas.error_bar(px(x), py(c - e), py(c + e), 0.0, &bar);
                }
                canvas.marker(px(x), py(c), &marker);
            }
        }
    }
}

/// Annotations stacked in the upper right corner, or upper left when a
/// legend occupies that corner.
fn draw_annotations(canvas: &mut Canvas, area: &PlotArea, annotations: &[Annotation], legend: bool, config: &VizConfig) {
    let size = config.font.size;
    let (x, anchor) = if legend { (area.left + 6.0, TextAnchor::Start) } else { (area.right() - 6.0, TextAnchor::End) };
    for (i, a) in annotations.iter().enumerate() {
        let style = TextStyle::sized(size)
            .anchored(anchor, TextBaseline::Hanging)
            .colored(color_or(a.color.as_deref(), Color::BLACK));
        canvas.text(x, area.top + 6.0 + i as f64 * (size + 3.0), &a.text, &style);
    }
}

fn z_limits(map: &HeatMap, logz: bool, z_range: Option<[f64; 2]>) -> (f64, f64) {
    let (lo, hi) = match z_range {
        Some([lo, hi]) => (lo, hi),
        None if logz => (map.min_positive().unwrap_or(1.0), map.max()),
        None => (0.0, map.max()),
    };
    let lo = if logz && lo <= 0.0 { map.min_positive().unwrap_or(1.0).min(hi) } else { lo };
    if hi.is_finite() && hi > lo { (lo, hi) } else { (lo, lo + 1.0) }
}

fn draw_heat_map(
    canvas: &mut Canvas,
    cell: &PlotArea,
    panel: &PanelArtifact,
    map: &HeatMap,
    logz: bool,
    z_range: Option<[f64; 2]>,
    config: &VizConfig,
) {
    let x_lo = map.x_edges.first().copied().unwrap_or(0.0);
    let x_hi = map.x_edges.last().copied().unwrap_or(1.0);
    let y_lo = map.y_edges.first().copied().unwrap_or(0.0);
    let y_hi = map.y_edges.last().copied().unwrap_or(1.0);
    let x_axis = Axis::fixed_linear(x_lo, x_hi, 5).with_label(panel.x_label.as_str());
    let y_axis = Axis::fixed_linear(y_lo, y_hi, 5).with_label(panel.y_label.as_str());

    let reserved = COLORBAR_GAP + COLORBAR_WIDTH + COLORBAR_LABELS;
    let plot_cell = PlotArea::manual(cell.left, cell.top, (cell.width - reserved).max(40.0), cell.height);
    let area = PlotArea::inside(&plot_cell, canvas, &y_axis, &x_axis, !panel.title.is_empty(), config);

    let (z_lo, z_hi) = z_limits(map, logz, z_range);
    let z_axis = if logz { Axis::auto_log(z_lo, z_hi) } else { Axis::fixed_linear(z_lo, z_hi, 5) };
    let z_frac = |z: f64| {
        if logz {
            (z.ln() - z_lo.ln()) / (z_hi.ln() - z_lo.ln())
        } else {
            (z - z_lo) / (z_hi - z_lo)
        }
    };
    let cmap = config.colormap();

    canvas.push_clip(area.left, area.top, area.width, area.height);
    for (iy, row) in map.z.iter().enumerate() {
        let (Some(&y0), Some(&y1)) = (map.y_edges.get(iy), map.y_edges.get(iy + 1)) else { continue };
        for (ix, &z) in row.iter().enumerate() {
            let (Some(&x0), Some(&x1)) = (map.x_edges.get(ix), map.x_edges.get(ix + 1)) else { continue };
            // Empty and below-range bins stay white.
            if !z.is_finite() || (z <= 0.0 && (logz || z_lo >= 0.0)) || z < z_lo {
                continue;
            }
            let color = cmap.eval(z_frac(z.min(z_hi)));
            let px0 = x_axis.data_to_pixel(x0, area.left, area.right());
            let px1 = x_axis.data_to_pixel(x1, area.left, area.right());
            let py0 = y_axis.data_to_pixel(y0, area.bottom(), area.top);
            let py1 = y_axis.data_to_pixel(y1, area.bottom(), area.top);
            // Slight overlap hides hairline seams between cells in PDF viewers.
            canvas.rect(px0, py1, px1 - px0 + 0.3, py0 - py1 + 0.3, &Style::filled(color));
        }
    }
    canvas.pop_clip();

    let grid_off = VizConfig { grid: crate::config::GridConfig { show: false, ..config.grid.clone() }, ..config.clone() };
    draw_axes(canvas, &area, &x_axis, &y_axis, &grid_off);
    draw_panel_title(canvas, &area, &panel.title, config);
    draw_colorbar(canvas, &area, &z_axis, z_lo, z_hi, cmap, config);
}

fn draw_colorbar(
    canvas: &mut Canvas,
    area: &PlotArea,
    z_axis: &Axis,
    z_lo: f64,
    z_hi: f64,
    cmap: crate::color::Colormap,
    config: &VizConfig,
) {
    const STEPS: usize = 48;
    let bar = PlotArea::manual(area.right() + COLORBAR_GAP, area.top, COLORBAR_WIDTH, area.height);
    let h = bar.height / STEPS as f64;
    for i in 0..STEPS {
        let t = (i as f64 + 0.5) / STEPS as f64;
        let y = bar.bottom() - (i + 1) as f64 * h;
        canvas.rect(bar.left, y, bar.width, h + 0.3, &Style::filled(cmap.eval(t)));
    }
    draw_frame(canvas, &bar);

    let style = TextStyle::sized(config.font.tick_size * 0.9).anchored(TextAnchor::Start, TextBaseline::Central);
    let tick = LineStyle::solid(Color::BLACK, 0.5);
    for (v, label) in z_axis.tick_positions.iter().zip(&z_axis.tick_labels) {
        if *v < z_lo * (1.0 - 1e-9) - 1e-12 || *v > z_hi * (1.0 + 1e-9) + 1e-12 {
            continue;
        }
        let y = z_axis.data_to_pixel(*v, bar.bottom(), bar.top);
        canvas.line(bar.right() - 3.0, y, bar.right(), y, &tick);
        canvas.text(bar.right() + 3.0, y, label, &style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(contents: &[f64]) -> BinnedSeries {
        BinnedSeries {
            label: None,
            edges: (0..=contents.len()).map(|i| i as f64).collect(),
            contents: contents.to_vec(),
            errors: vec![0.5; contents.len()],
            color: None,
            fill: None,
            style: SeriesStyle::Step,
        }
    }

    #[test]
    fn series_axes_cover_all_series() {
        let a = series(&[1.0, 4.0]);
        let mut b = series(&[2.0, 3.0, 9.0]);
        b.edges = vec![-1.0, 0.0, 1.0, 2.0];
        let (x, y) = series_axes(&[a, b], None, None);
        assert_eq!((x.min, x.max), (-1.0, 2.0));
        assert_eq!(y.min, 0.0);
        assert!(y.max >= 9.0);
    }

    #[test]
    fn fixed_ranges_win() {
        let (x, y) = series_axes(&[series(&[100.0])], Some([0.7, 1.3]), Some([0.0, 2.0]));
        assert_eq!((x.min, x.max), (0.7, 1.3));
        assert_eq!((y.min, y.max), (0.0, 2.0));
    }

    #[test]
    fn log_limits_skip_empty_bins() {
        let map = HeatMap { x_edges: vec![0.0, 1.0, 2.0], y_edges: vec![0.0, 1.0], z: vec![vec![0.0, 40.0]] };
        assert_eq!(z_limits(&map, true, None), (40.0, 41.0));
        let map = HeatMap { x_edges: vec![0.0, 1.0, 2.0], y_edges: vec![0.0, 1.0], z: vec![vec![2.0, 40.0]] };
        assert_eq!(z_limits(&map, true, None), (2.0, 40.0));
        assert_eq!(z_limits(&map, false, Some([0.0, 2.0])), (0.0, 2.0));
    }

    #[test]
    fn heat_map_skips_zero_bins() {
        let panel = PanelArtifact {
            title: "Sector 1".into(),
            x_label: "x".into(),
            y_label: "y".into(),
            content: PanelContent::HeatMap {
                map: HeatMap { x_edges: vec![0.0, 1.0, 2.0], y_edges: vec![0.0, 1.0], z: vec![vec![0.0, 3.0]] },
                logz: false,
                z_range: None,
            },
            annotations: Vec::new(),
        };
        let config = VizConfig::default();
        let mut with_map = Canvas::new(300.0, 200.0);
        draw_panel(&mut with_map, &PlotArea::manual(0.0, 0.0, 300.0, 200.0), &panel, &config);
        let svg = with_map.finish_svg();
        // One filled cell, the colorbar steps, the clip rectangle and the background.
        assert_eq!(svg.matches("<rect").count(), 1 + 48 + 2);
    }
}
